//! Candidate Selector: from matched symptoms to adjacent diseases.
//!
//! [`CandidateSet`] is the session's `potential_diseases` mapping. It keeps
//! diseases in first-insertion order, since refinement and reporting both
//! iterate in that order, and it only ever grows: merging never drops a
//! disease nor shrinks a disease's matched-symptom set.

use std::collections::{BTreeSet, HashMap};

use serde::Serialize;

use crate::graph::KnowledgeGraph;
use crate::matcher::SymptomMatcher;

/// Ordered mapping disease → symptoms matched so far for that disease.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CandidateSet {
    entries: Vec<(String, BTreeSet<String>)>,
    #[serde(skip)]
    position: HashMap<String, usize>,
}

impl CandidateSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `symptom` matched for `disease`.
    ///
    /// Returns `true` if this added something new.
    pub fn insert(&mut self, disease: &str, symptom: &str) -> bool {
        let pos = match self.position.get(disease) {
            Some(&pos) => pos,
            None => {
                self.entries.push((disease.to_string(), BTreeSet::new()));
                let pos = self.entries.len() - 1;
                self.position.insert(disease.to_string(), pos);
                pos
            }
        };
        self.entries[pos].1.insert(symptom.to_string())
    }

    /// Union another set into this one, per disease.
    ///
    /// Diseases new to `self` are appended in `other`'s order. Returns the
    /// number of (disease, symptom) pairs that were new.
    pub fn merge(&mut self, other: &CandidateSet) -> usize {
        let mut added = 0;
        for (disease, symptoms) in &other.entries {
            for symptom in symptoms {
                if self.insert(disease, symptom) {
                    added += 1;
                }
            }
        }
        added
    }

    /// Symptoms matched for a disease, if it is a candidate.
    pub fn matched(&self, disease: &str) -> Option<&BTreeSet<String>> {
        self.position.get(disease).map(|&pos| &self.entries[pos].1)
    }

    pub fn contains(&self, disease: &str) -> bool {
        self.position.contains_key(disease)
    }

    /// Iterate `(disease, matched symptoms)` in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeSet<String>)> {
        self.entries.iter().map(|(d, s)| (d.as_str(), s))
    }

    /// The `index`-th disease in insertion order.
    pub fn get_index(&self, index: usize) -> Option<(&str, &BTreeSet<String>)> {
        self.entries.get(index).map(|(d, s)| (d.as_str(), s))
    }

    /// Disease names in insertion order.
    pub fn diseases(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(d, _)| d.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.position.clear();
    }
}

/// Find candidate diseases for a set of detected symptoms.
///
/// Each detected symptom is matched against the graph's symptom vocabulary;
/// every qualifying match is recorded for every disease adjacent to it.
/// Diseases without a qualifying match do not appear. Detected symptoms are
/// processed in the order given, which fixes disease insertion order.
pub fn select_candidates<I, S>(
    graph: &KnowledgeGraph,
    detected: I,
    matcher: &SymptomMatcher,
) -> CandidateSet
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let vocabulary = graph.symptom_vocabulary();
    let mut candidates = CandidateSet::new();
    let mut seen = 0usize;

    for text in detected {
        seen += 1;
        for found in matcher.find(text.as_ref(), vocabulary) {
            for disease in graph.diseases_with(&found.symptom) {
                candidates.insert(disease, &found.symptom);
            }
        }
    }

    tracing::debug!(
        detected = seen,
        candidates = candidates.len(),
        "selected candidate diseases"
    );
    candidates
}
