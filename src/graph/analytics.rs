//! Graph analytics: size summary and symptom degree ranking.
//!
//! All functions operate on a [`KnowledgeGraph`] reference and return
//! structured results sorted by relevance (degree desc, name asc).

use serde::Serialize;

use super::NodeKind;
use super::index::KnowledgeGraph;

// ---------------------------------------------------------------------------
// Degree ranking
// ---------------------------------------------------------------------------

/// How many diseases share a symptom.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SymptomDegree {
    pub symptom: String,
    /// Number of diseases presenting this symptom.
    pub diseases: usize,
}

/// Rank symptoms by the number of diseases they connect to.
///
/// Sorted by degree desc, ties broken by name asc. Returns at most `limit`.
pub fn symptom_degrees(kg: &KnowledgeGraph, limit: usize) -> Vec<SymptomDegree> {
    let mut results: Vec<SymptomDegree> = kg
        .nodes_of_kind(NodeKind::Symptom)
        .into_iter()
        .map(|symptom| SymptomDegree {
            symptom: symptom.to_string(),
            diseases: kg.degree(NodeKind::Symptom, symptom).unwrap_or(0),
        })
        .collect();
    results.sort_by(|a, b| {
        b.diseases
            .cmp(&a.diseases)
            .then_with(|| a.symptom.cmp(&b.symptom))
    });
    results.truncate(limit);
    results
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

/// Size summary of a knowledge graph.
#[derive(Debug, Clone, Serialize)]
pub struct GraphStats {
    pub diseases: usize,
    pub symptoms: usize,
    pub edges: usize,
    pub skipped_rows: usize,
    pub top_symptoms: Vec<SymptomDegree>,
}

impl GraphStats {
    /// Collect statistics, listing the `top` most shared symptoms.
    pub fn collect(kg: &KnowledgeGraph, top: usize) -> Self {
        Self {
            diseases: kg.disease_count(),
            symptoms: kg.symptom_count(),
            edges: kg.edge_count(),
            skipped_rows: kg.skipped_rows(),
            top_symptoms: symptom_degrees(kg, top),
        }
    }
}

impl std::fmt::Display for GraphStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Graph Statistics:")?;
        writeln!(f, "-----------------")?;
        writeln!(f, "Number of disease nodes: {}", self.diseases)?;
        writeln!(f, "Number of symptom nodes: {}", self.symptoms)?;
        writeln!(f, "Number of edges (connections): {}", self.edges)?;
        if self.skipped_rows > 0 {
            writeln!(f, "Skipped malformed rows: {}", self.skipped_rows)?;
        }
        if !self.top_symptoms.is_empty() {
            writeln!(f)?;
            writeln!(f, "Top {} Most Common Symptoms:", self.top_symptoms.len())?;
            for (i, entry) in self.top_symptoms.iter().enumerate() {
                writeln!(f, "{}. {}: {} diseases", i + 1, entry.symptom, entry.diseases)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kg() -> KnowledgeGraph {
        KnowledgeGraph::build([
            ("flu", "fever"),
            ("flu", "cough"),
            ("cold", "cough"),
            ("cold", "sneezing"),
            ("covid", "cough"),
            ("covid", "fever"),
        ])
    }

    #[test]
    fn degrees_sorted_desc_then_by_name() {
        let ranked = symptom_degrees(&kg(), 10);
        let names: Vec<_> = ranked.iter().map(|d| d.symptom.as_str()).collect();
        assert_eq!(names, vec!["cough", "fever", "sneezing"]);
        assert_eq!(ranked[0].diseases, 3);
        assert_eq!(ranked[1].diseases, 2);
    }

    #[test]
    fn degrees_respect_limit() {
        assert_eq!(symptom_degrees(&kg(), 1).len(), 1);
        assert!(symptom_degrees(&kg(), 0).is_empty());
    }

    #[test]
    fn stats_summary() {
        let stats = GraphStats::collect(&kg(), 2);
        assert_eq!(stats.diseases, 3);
        assert_eq!(stats.symptoms, 3);
        assert_eq!(stats.edges, 6);
        let text = stats.to_string();
        assert!(text.contains("Number of disease nodes: 3"));
        assert!(text.contains("1. cough: 3 diseases"));
    }
}
