//! In-memory knowledge graph with per-kind name indexes.
//!
//! Uses `petgraph` for the graph structure and one `HashMap` per node kind
//! for O(1) lookups by canonical name.

use std::collections::{BTreeSet, HashMap};

use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;

use crate::error::GraphError;
use crate::normalize::canonical;

use super::{GraphNode, GraphResult, NodeKind, Relation};

/// Append-only builder for a [`KnowledgeGraph`].
///
/// Rows are normalized on the way in. A row with an empty disease or symptom
/// is rejected with [`GraphError::MalformedRow`] and counted; the builder
/// stays usable.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    graph: UnGraph<GraphNode, Relation>,
    diseases: HashMap<String, NodeIndex>,
    symptoms: HashMap<String, NodeIndex>,
    rows_seen: usize,
    skipped_rows: usize,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one `(disease, symptom)` row.
    ///
    /// Returns `Ok(true)` when a new edge was inserted and `Ok(false)` when
    /// the edge already existed.
    pub fn add_row(&mut self, disease: &str, symptom: &str) -> GraphResult<bool> {
        self.rows_seen += 1;
        let disease = canonical(disease);
        let symptom = canonical(symptom);

        let missing = match (disease.is_empty(), symptom.is_empty()) {
            (true, true) => Some("disease and symptom"),
            (true, false) => Some("disease"),
            (false, true) => Some("symptom"),
            (false, false) => None,
        };
        if let Some(missing) = missing {
            self.skipped_rows += 1;
            return Err(GraphError::MalformedRow {
                row: self.rows_seen,
                missing,
            });
        }

        let d = self.ensure_node(NodeKind::Disease, disease);
        let s = self.ensure_node(NodeKind::Symptom, symptom);
        if self.graph.find_edge(d, s).is_some() {
            return Ok(false);
        }
        self.graph.add_edge(d, s, Relation::HasSymptom);
        Ok(true)
    }

    fn ensure_node(&mut self, kind: NodeKind, name: String) -> NodeIndex {
        let index = match kind {
            NodeKind::Disease => &mut self.diseases,
            NodeKind::Symptom => &mut self.symptoms,
        };
        if let Some(&idx) = index.get(&name) {
            return idx;
        }
        let idx = self.graph.add_node(GraphNode {
            name: name.clone(),
            kind,
        });
        index.insert(name, idx);
        idx
    }

    /// Freeze the builder into a read-only graph.
    pub fn finish(self) -> KnowledgeGraph {
        let mut symptom_vocabulary: Vec<String> = self.symptoms.keys().cloned().collect();
        symptom_vocabulary.sort();

        KnowledgeGraph {
            graph: self.graph,
            diseases: self.diseases,
            symptoms: self.symptoms,
            symptom_vocabulary,
            rows_seen: self.rows_seen,
            skipped_rows: self.skipped_rows,
        }
    }
}

/// Read-only bipartite disease–symptom graph.
#[derive(Debug)]
pub struct KnowledgeGraph {
    graph: UnGraph<GraphNode, Relation>,
    diseases: HashMap<String, NodeIndex>,
    symptoms: HashMap<String, NodeIndex>,
    /// Symptom names, sorted. Matcher vocabulary.
    symptom_vocabulary: Vec<String>,
    rows_seen: usize,
    skipped_rows: usize,
}

impl KnowledgeGraph {
    /// Build a graph from `(disease, symptom)` rows.
    ///
    /// Malformed rows are skipped, logged, and counted in [`Self::skipped_rows`].
    pub fn build<I, D, S>(rows: I) -> Self
    where
        I: IntoIterator<Item = (D, S)>,
        D: AsRef<str>,
        S: AsRef<str>,
    {
        let mut builder = GraphBuilder::new();
        for (disease, symptom) in rows {
            if let Err(e) = builder.add_row(disease.as_ref(), symptom.as_ref()) {
                tracing::warn!(error = %e, "skipping knowledge base row");
            }
        }
        let graph = builder.finish();

        tracing::info!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            diseases = graph.disease_count(),
            symptoms = graph.symptom_count(),
            skipped = graph.skipped_rows(),
            "knowledge graph built"
        );
        graph
    }

    fn index_of(&self, kind: NodeKind, name: &str) -> Option<NodeIndex> {
        let index = match kind {
            NodeKind::Disease => &self.diseases,
            NodeKind::Symptom => &self.symptoms,
        };
        index.get(name).copied()
    }

    /// Whether a node of the given kind exists. `name` must be canonical.
    pub fn has_node(&self, kind: NodeKind, name: &str) -> bool {
        self.index_of(kind, name).is_some()
    }

    /// Names of all nodes adjacent to the given node.
    ///
    /// Unknown nodes have no neighbors. By the bipartite invariant, the
    /// neighbors of a disease are symptoms and vice versa.
    pub fn neighbors(&self, kind: NodeKind, name: &str) -> BTreeSet<&str> {
        let Some(idx) = self.index_of(kind, name) else {
            return BTreeSet::new();
        };
        self.graph
            .neighbors(idx)
            .filter_map(|n| self.graph.node_weight(n))
            .map(|node| node.name.as_str())
            .collect()
    }

    /// All symptoms of a disease.
    pub fn symptoms_of(&self, disease: &str) -> BTreeSet<&str> {
        self.neighbors(NodeKind::Disease, disease)
    }

    /// All diseases presenting a symptom.
    pub fn diseases_with(&self, symptom: &str) -> BTreeSet<&str> {
        self.neighbors(NodeKind::Symptom, symptom)
    }

    /// Number of edges incident to a node, or `None` if the node is unknown.
    pub fn degree(&self, kind: NodeKind, name: &str) -> Option<usize> {
        let idx = self.index_of(kind, name)?;
        Some(self.graph.edges(idx).count())
    }

    /// Names of all nodes of one kind.
    pub fn nodes_of_kind(&self, kind: NodeKind) -> BTreeSet<&str> {
        let index = match kind {
            NodeKind::Disease => &self.diseases,
            NodeKind::Symptom => &self.symptoms,
        };
        index.keys().map(String::as_str).collect()
    }

    /// Symptom names in sorted order.
    pub fn symptom_vocabulary(&self) -> &[String] {
        &self.symptom_vocabulary
    }

    /// All edges as `(disease, symptom)` pairs.
    pub fn edges(&self) -> Vec<(&str, &str)> {
        self.graph
            .edge_references()
            .filter_map(|e| {
                let a = self.graph.node_weight(e.source())?;
                let b = self.graph.node_weight(e.target())?;
                match (a.kind, b.kind) {
                    (NodeKind::Disease, NodeKind::Symptom) => Some((a.name.as_str(), b.name.as_str())),
                    (NodeKind::Symptom, NodeKind::Disease) => Some((b.name.as_str(), a.name.as_str())),
                    _ => None,
                }
            })
            .collect()
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of `has_symptom` edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn disease_count(&self) -> usize {
        self.diseases.len()
    }

    pub fn symptom_count(&self) -> usize {
        self.symptoms.len()
    }

    /// Rows offered to the builder, including skipped ones.
    pub fn rows_seen(&self) -> usize {
        self.rows_seen
    }

    /// Rows rejected as malformed during construction.
    pub fn skipped_rows(&self) -> usize {
        self.skipped_rows
    }

    pub fn is_empty(&self) -> bool {
        self.graph.edge_count() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> KnowledgeGraph {
        KnowledgeGraph::build([
            ("Flu", "Fever"),
            ("flu", "cough"),
            ("cold", "cough"),
            ("cold", "sneezing"),
        ])
    }

    #[test]
    fn build_counts_nodes_and_edges() {
        let g = sample();
        assert_eq!(g.disease_count(), 2);
        assert_eq!(g.symptom_count(), 3);
        assert_eq!(g.node_count(), 5);
        assert_eq!(g.edge_count(), 4);
        assert_eq!(g.skipped_rows(), 0);
    }

    #[test]
    fn rows_are_normalized() {
        let g = sample();
        assert!(g.has_node(NodeKind::Disease, "flu"));
        assert!(g.has_node(NodeKind::Symptom, "fever"));
        assert!(!g.has_node(NodeKind::Disease, "Flu"));
    }

    #[test]
    fn duplicate_edges_collapse() {
        let g = KnowledgeGraph::build([("flu", "fever"), (" FLU ", "Fever "), ("flu", "fever")]);
        assert_eq!(g.edge_count(), 1);
        assert_eq!(g.rows_seen(), 3);
    }

    #[test]
    fn builder_reports_new_vs_existing_edges() {
        let mut b = GraphBuilder::new();
        assert!(b.add_row("flu", "fever").unwrap());
        assert!(!b.add_row("Flu", "FEVER").unwrap());
    }

    #[test]
    fn malformed_rows_are_skipped_and_counted() {
        let g = KnowledgeGraph::build([("flu", "fever"), ("", "cough"), ("cold", "  "), ("", "")]);
        assert_eq!(g.skipped_rows(), 3);
        assert_eq!(g.edge_count(), 1);
        assert!(!g.has_node(NodeKind::Symptom, "cough"));
    }

    #[test]
    fn malformed_row_error_names_the_missing_field() {
        let mut b = GraphBuilder::new();
        b.add_row("flu", "fever").unwrap();
        let err = b.add_row("cold", "").unwrap_err();
        assert!(matches!(
            err,
            GraphError::MalformedRow {
                row: 2,
                missing: "symptom"
            }
        ));
    }

    #[test]
    fn neighbors_by_kind() {
        let g = sample();
        let flu: Vec<_> = g.symptoms_of("flu").into_iter().collect();
        assert_eq!(flu, vec!["cough", "fever"]);
        let cough: Vec<_> = g.diseases_with("cough").into_iter().collect();
        assert_eq!(cough, vec!["cold", "flu"]);
        assert!(g.neighbors(NodeKind::Disease, "measles").is_empty());
    }

    #[test]
    fn same_name_different_kind_are_distinct_nodes() {
        let g = KnowledgeGraph::build([("cough", "cough"), ("flu", "cough")]);
        assert_eq!(g.node_count(), 3);
        assert_eq!(g.edge_count(), 2);
        assert_eq!(g.diseases_with("cough").len(), 2);
    }

    #[test]
    fn edges_join_different_kinds() {
        let g = sample();
        for (d, s) in g.edges() {
            assert!(g.has_node(NodeKind::Disease, d));
            assert!(g.has_node(NodeKind::Symptom, s));
        }
        assert!(g.edge_count() <= g.rows_seen());
    }

    #[test]
    fn every_symptom_has_an_edge() {
        let g = sample();
        for s in g.nodes_of_kind(NodeKind::Symptom) {
            assert!(g.degree(NodeKind::Symptom, s).unwrap() >= 1);
        }
    }

    #[test]
    fn vocabulary_is_sorted() {
        let g = sample();
        assert_eq!(g.symptom_vocabulary(), &["cough", "fever", "sneezing"]);
    }
}
