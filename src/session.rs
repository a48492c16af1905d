//! Diagnosis session: the mutable state of one conversation.
//!
//! A session borrows nothing mutable from the knowledge graph; it holds an
//! `Arc` to the shared, read-only graph and owns everything else:
//!
//! - `all_symptoms`: symptoms mentioned or confirmed so far (first-mention order)
//! - `potential_diseases`: a [`CandidateSet`] that only grows
//! - confirmed and declined answers ([`AnswerLog`])
//! - `diagnosed`: the latest scoring pass, replaced on every pass
//!
//! Sessions must not be shared between conversations; make one per user.

use std::sync::Arc;

use crate::candidates::{CandidateSet, select_candidates};
use crate::config::DxConfig;
use crate::extract::SymptomExtractor;
use crate::graph::KnowledgeGraph;
use crate::matcher::SymptomMatcher;
use crate::normalize::canonical_nonempty;
use crate::refine::{AnswerLog, AnswerSource, RefineConfig, RefinementRound, RoundOutcome};
use crate::report::Report;
use crate::score::{Diagnosis, ScoreConfig, score};

/// State and operations of one diagnosis conversation.
pub struct DiagnosisSession {
    graph: Arc<KnowledgeGraph>,
    matcher: SymptomMatcher,
    refine_config: RefineConfig,
    score_config: ScoreConfig,
    all_symptoms: Vec<String>,
    potential: CandidateSet,
    answers: AnswerLog,
    diagnosed: Vec<Diagnosis>,
}

impl DiagnosisSession {
    pub fn new(graph: Arc<KnowledgeGraph>, config: &DxConfig) -> Self {
        Self {
            graph,
            matcher: SymptomMatcher::new(config.matcher),
            refine_config: config.refinement,
            score_config: config.scoring,
            all_symptoms: Vec::new(),
            potential: CandidateSet::new(),
            answers: AnswerLog::default(),
            diagnosed: Vec::new(),
        }
    }

    /// Extract symptoms from free text, record them, and update candidates.
    ///
    /// Returns the symptoms the extractor reported. An extractor failure is
    /// logged and treated as "no new symptoms".
    pub fn describe(&mut self, text: &str, extractor: &dyn SymptomExtractor) -> Vec<String> {
        let detected = match extractor.extract(text) {
            Ok(symptoms) => symptoms,
            Err(e) => {
                tracing::warn!(extractor = extractor.name(), error = %e, "symptom extraction failed");
                Vec::new()
            }
        };
        let detected: Vec<String> = detected.iter().filter_map(|s| canonical_nonempty(s)).collect();
        self.add_symptoms(detected.as_slice());
        detected
    }

    /// Record symptoms directly and update candidates.
    ///
    /// Returns how many were new to the session.
    pub fn add_symptoms<S: AsRef<str>>(&mut self, symptoms: &[S]) -> usize {
        let mut added = 0;
        for symptom in symptoms {
            if let Some(symptom) = canonical_nonempty(symptom.as_ref()) {
                if !self.all_symptoms.contains(&symptom) {
                    self.all_symptoms.push(symptom);
                    added += 1;
                }
            }
        }
        self.analyze();
        added
    }

    /// Re-run candidate selection over all symptoms, merging into the
    /// running candidate set. Returns the number of new (disease, symptom)
    /// pairs.
    pub fn analyze(&mut self) -> usize {
        let fresh = select_candidates(&self.graph, &self.all_symptoms, &self.matcher);
        let added = self.potential.merge(&fresh);
        tracing::info!(
            symptoms = self.all_symptoms.len(),
            candidates = self.potential.len(),
            added,
            "candidate diseases updated"
        );
        added
    }

    /// Start a push-style refinement round.
    pub fn round(&mut self) -> RefinementRound<'_> {
        RefinementRound::new(&self.graph, &self.potential, &mut self.answers, &self.refine_config)
    }

    /// Run one refinement round to completion.
    ///
    /// Confirmed symptoms are folded into `all_symptoms`. On quit the caller
    /// must not score.
    pub fn refine(&mut self, source: &mut dyn AnswerSource) -> RoundOutcome {
        let outcome = self.round().run(source);
        for symptom in &outcome.confirmed {
            if !self.all_symptoms.contains(symptom) {
                self.all_symptoms.push(symptom.clone());
            }
        }
        outcome
    }

    /// Score the current candidates, replacing the previous pass.
    pub fn diagnose(&mut self) -> &[Diagnosis] {
        self.diagnosed = score(
            &self.graph,
            &self.potential,
            &self.answers.confirmed,
            &self.score_config,
        );
        tracing::info!(
            candidates = self.potential.len(),
            diagnosed = self.diagnosed.len(),
            "diagnosis pass complete"
        );
        &self.diagnosed
    }

    /// Report for the latest scoring pass.
    pub fn report(&self) -> Report {
        Report::from_diagnoses(&self.diagnosed)
    }

    /// Clear all conversation state.
    pub fn reset(&mut self) {
        self.all_symptoms.clear();
        self.potential.clear();
        self.answers.clear();
        self.diagnosed.clear();
        tracing::info!("session reset");
    }

    pub fn graph(&self) -> &KnowledgeGraph {
        &self.graph
    }

    pub fn all_symptoms(&self) -> &[String] {
        &self.all_symptoms
    }

    pub fn potential_diseases(&self) -> &CandidateSet {
        &self.potential
    }

    pub fn confirmed_symptoms(&self) -> &std::collections::BTreeSet<String> {
        &self.answers.confirmed
    }

    pub fn declined_symptoms(&self) -> &std::collections::BTreeSet<String> {
        &self.answers.declined
    }

    pub fn diagnosed(&self) -> &[Diagnosis] {
        &self.diagnosed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExtractError;
    use crate::extract::{ExtractResult, ListExtractor, StaticExtractor};
    use crate::refine::ScriptedAnswers;

    struct FailingExtractor;

    impl SymptomExtractor for FailingExtractor {
        fn name(&self) -> &str {
            "failing"
        }

        fn extract(&self, _text: &str) -> ExtractResult<Vec<String>> {
            Err(ExtractError::RequestFailed {
                message: "boom".into(),
            })
        }
    }

    fn session() -> DiagnosisSession {
        let graph = KnowledgeGraph::build([
            ("flu", "fever"),
            ("flu", "cough"),
            ("cold", "cough"),
            ("cold", "sneezing"),
            ("allergy", "sneezing"),
            ("allergy", "itchy eyes"),
        ]);
        DiagnosisSession::new(Arc::new(graph), &DxConfig::default())
    }

    #[test]
    fn describe_records_symptoms_and_candidates() {
        let mut s = session();
        let detected = s.describe("Fever, cough", &ListExtractor);
        assert_eq!(detected, vec!["fever", "cough"]);
        assert_eq!(s.all_symptoms(), &["fever", "cough"]);
        let order: Vec<_> = s.potential_diseases().diseases().collect();
        assert_eq!(order, vec!["flu", "cold"]);
    }

    #[test]
    fn extractor_failure_means_no_new_symptoms() {
        let mut s = session();
        let detected = s.describe("I feel awful", &FailingExtractor);
        assert!(detected.is_empty());
        assert!(s.potential_diseases().is_empty());
    }

    #[test]
    fn extracted_symptoms_are_canonicalized() {
        let mut s = session();
        s.describe("ignored", &StaticExtractor::new(["  Sneezing ", ""]));
        assert_eq!(s.all_symptoms(), &["sneezing"]);
        assert!(s.potential_diseases().contains("allergy"));
    }

    #[test]
    fn candidates_never_shrink_across_descriptions() {
        let mut s = session();
        s.describe("fever", &ListExtractor);
        let flu_before = s.potential_diseases().matched("flu").cloned().unwrap();
        s.describe("sneezing", &ListExtractor);
        let flu_after = s.potential_diseases().matched("flu").unwrap();
        assert!(flu_before.is_subset(flu_after));
        assert!(s.potential_diseases().contains("allergy"));
    }

    #[test]
    fn confirmations_persist_and_feed_all_symptoms() {
        let mut s = session();
        s.describe("fever, cough", &ListExtractor);
        let outcome = s.refine(&mut ScriptedAnswers::new(["yes"]));
        assert_eq!(outcome.confirmed, vec!["sneezing".to_string()]);
        assert!(s.confirmed_symptoms().contains("sneezing"));
        assert!(s.all_symptoms().contains(&"sneezing".to_string()));

        s.describe("cough", &ListExtractor);
        assert!(s.confirmed_symptoms().contains("sneezing"));
    }

    #[test]
    fn diagnose_replaces_previous_pass() {
        let mut s = session();
        s.describe("fever, cough", &ListExtractor);
        assert_eq!(s.diagnose().len(), 2);
        s.reset();
        assert!(s.diagnose().is_empty());
        assert!(s.report().is_empty());
    }

    #[test]
    fn reset_clears_everything() {
        let mut s = session();
        s.describe("fever", &ListExtractor);
        s.refine(&mut ScriptedAnswers::new(["no"]));
        s.reset();
        assert!(s.all_symptoms().is_empty());
        assert!(s.potential_diseases().is_empty());
        assert!(s.confirmed_symptoms().is_empty());
        assert!(s.declined_symptoms().is_empty());
    }
}
