//! Knowledge Graph: bipartite disease–symptom graph.
//!
//! The graph holds two kinds of nodes, diseases and symptoms, joined by
//! undirected `has_symptom` edges. It is built once from `(disease, symptom)`
//! rows and is read-only afterwards, so a single instance can be shared
//! (e.g. behind an `Arc`) by any number of diagnosis sessions.
//!
//! - **Index** ([`KnowledgeGraph`], [`GraphBuilder`]): `petgraph` storage plus
//!   per-kind name lookups
//! - **Analytics** ([`analytics::GraphStats`]): node/edge counts and the most
//!   widely shared symptoms

pub mod analytics;
pub mod index;

use serde::{Deserialize, Serialize};

pub use index::{GraphBuilder, KnowledgeGraph};

/// Result type for graph operations.
pub type GraphResult<T> = std::result::Result<T, crate::error::GraphError>;

/// The two node kinds of the bipartite graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Disease,
    Symptom,
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeKind::Disease => write!(f, "disease"),
            NodeKind::Symptom => write!(f, "symptom"),
        }
    }
}

/// Node weight stored on petgraph nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphNode {
    /// Canonical name; identity together with `kind`.
    pub name: String,
    pub kind: NodeKind,
}

/// Edge label. The graph only knows one relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Relation {
    #[default]
    HasSymptom,
}
