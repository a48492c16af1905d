// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # medu-dx
//!
//! An interactive differential-diagnosis engine over a disease–symptom
//! knowledge graph.
//!
//! ## Architecture
//!
//! - **Knowledge graph** (`graph`): bipartite petgraph of diseases and symptoms
//! - **Table loading** (`table`): relation and combined CSV layouts
//! - **Matching** (`matcher`): fuzzy symptom matching against the graph vocabulary
//! - **Candidates** (`candidates`): grow-only disease candidate sets
//! - **Refinement** (`refine`): budgeted yes/no/unsure questioning
//! - **Scoring** (`score`): match-ratio confidence with a threshold
//! - **Extraction** (`extract`): free text to symptom lists, plain or via an LLM
//! - **Session** (`session`): per-conversation state tying it together
//!
//! ## Library usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use medu_dx::config::DxConfig;
//! use medu_dx::extract::ListExtractor;
//! use medu_dx::graph::KnowledgeGraph;
//! use medu_dx::refine::ScriptedAnswers;
//! use medu_dx::session::DiagnosisSession;
//!
//! let graph = KnowledgeGraph::build([("flu", "fever"), ("flu", "cough"), ("cold", "cough")]);
//! let mut session = DiagnosisSession::new(Arc::new(graph), &DxConfig::default());
//! session.describe("fever, cough", &ListExtractor);
//! session.refine(&mut ScriptedAnswers::new(["no"]));
//! session.diagnose();
//! println!("{}", session.report());
//! ```

pub mod candidates;
pub mod config;
pub mod console;
pub mod error;
pub mod extract;
pub mod graph;
pub mod matcher;
pub mod normalize;
pub mod refine;
pub mod report;
pub mod score;
pub mod session;
pub mod table;
