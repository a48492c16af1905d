//! Knowledge base table loading.
//!
//! Supports two layouts, chosen by header:
//! - **Relation**: `Disease,Symptom[,Relation]`, one pair per row
//! - **Combined**: `Disease,Combined_Symptoms`, one disease per row with a
//!   comma-separated symptom list in the second column
//!
//! Fields may be double-quoted (`"a, b"`, with `""` as an escaped quote).
//! Blank lines and `#` comments are skipped. A row missing its disease or
//! symptom is still emitted with an empty field, so the graph builder
//! counts it as malformed rather than it silently disappearing here.

use std::path::Path;

use serde::Serialize;

use crate::error::{DxResult, GraphError, TableError};
use crate::graph::KnowledgeGraph;

/// Result type for table loading.
pub type TableResult<T> = std::result::Result<T, TableError>;

/// Detected table layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TableFormat {
    Relation,
    Combined,
}

/// Rows read from a table, ready for [`crate::graph::KnowledgeGraph::build`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableLoad {
    pub format: TableFormat,
    /// `(disease, symptom)` pairs, not yet normalized.
    pub rows: Vec<(String, String)>,
}

/// Read and parse a table file.
pub fn load_table(path: &Path) -> TableResult<TableLoad> {
    let content = std::fs::read_to_string(path).map_err(|e| TableError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    let load = parse_table(&content)?;
    tracing::info!(
        path = %path.display(),
        format = ?load.format,
        rows = load.rows.len(),
        "loaded knowledge base table"
    );
    Ok(load)
}

/// Load a table file and build the knowledge graph from it.
///
/// A table that yields no edges at all is an error.
pub fn load_graph(path: &Path) -> DxResult<KnowledgeGraph> {
    let load = load_table(path)?;
    let graph = KnowledgeGraph::build(load.rows.iter().map(|(d, s)| (d.as_str(), s.as_str())));
    if graph.edge_count() == 0 {
        return Err(GraphError::Empty {
            rows: graph.rows_seen(),
        }
        .into());
    }
    Ok(graph)
}

/// Parse table text.
pub fn parse_table(content: &str) -> TableResult<TableLoad> {
    let mut lines = content
        .lines()
        .map(|l| l.trim_start_matches('\u{feff}'))
        .filter(|l| {
            let t = l.trim();
            !t.is_empty() && !t.starts_with('#')
        });

    let header_line = lines.next().ok_or(TableError::MissingHeader)?;
    let delimiter = if header_line.contains('\t') && !header_line.contains(',') {
        '\t'
    } else {
        ','
    };

    let header: Vec<String> = split_record(header_line, delimiter)
        .into_iter()
        .map(|h| h.trim().to_lowercase())
        .collect();
    let format = match (header.first().map(String::as_str), header.get(1).map(String::as_str)) {
        (Some("disease"), Some("symptom")) => TableFormat::Relation,
        (Some("disease"), Some("combined_symptoms" | "symptoms" | "common_symptoms")) => {
            TableFormat::Combined
        }
        _ => {
            return Err(TableError::UnknownHeader {
                header: header_line.trim().to_string(),
            });
        }
    };

    let mut rows = Vec::new();
    for line in lines {
        let fields = split_record(line, delimiter);
        let disease = fields.first().cloned().unwrap_or_default();
        match format {
            TableFormat::Relation => {
                let symptom = fields.get(1).cloned().unwrap_or_default();
                rows.push((disease, symptom));
            }
            TableFormat::Combined => {
                // Unquoted lists spill into extra columns; rejoin them.
                let list = fields.get(1..).map(|rest| rest.join(",")).unwrap_or_default();
                let symptoms: Vec<&str> = list
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .collect();
                if symptoms.is_empty() {
                    rows.push((disease, String::new()));
                } else {
                    rows.extend(symptoms.into_iter().map(|s| (disease.clone(), s.to_string())));
                }
            }
        }
    }

    Ok(TableLoad { format, rows })
}

/// Split one record, honoring double quotes.
fn split_record(line: &str, delimiter: char) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                field.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            c if c == delimiter && !in_quotes => {
                fields.push(std::mem::take(&mut field).trim().to_string());
            }
            c => field.push(c),
        }
    }
    fields.push(field.trim().to_string());
    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relation_layout() {
        let csv = "Disease,Symptom,Relation\nFlu,Fever,has_symptom\nflu,cough,has_symptom\n";
        let load = parse_table(csv).unwrap();
        assert_eq!(load.format, TableFormat::Relation);
        assert_eq!(
            load.rows,
            vec![
                ("Flu".to_string(), "Fever".to_string()),
                ("flu".to_string(), "cough".to_string()),
            ]
        );
    }

    #[test]
    fn combined_layout_with_quotes() {
        let csv = "Disease,Combined_Symptoms\nflu,\"fever, cough, chills\"\ncold,\"sneezing\"\n";
        let load = parse_table(csv).unwrap();
        assert_eq!(load.format, TableFormat::Combined);
        assert_eq!(load.rows.len(), 4);
        assert_eq!(load.rows[2], ("flu".to_string(), "chills".to_string()));
    }

    #[test]
    fn combined_layout_unquoted_spill() {
        let load = parse_table("disease,symptoms\nflu,fever,cough\n").unwrap();
        assert_eq!(load.rows.len(), 2);
    }

    #[test]
    fn missing_fields_are_kept_for_counting() {
        let csv = "Disease,Symptom\nflu\n,cough\ncold,sneezing\n";
        let load = parse_table(csv).unwrap();
        assert_eq!(load.rows.len(), 3);
        assert_eq!(load.rows[0].1, "");
        assert_eq!(load.rows[1].0, "");
    }

    #[test]
    fn comments_blank_lines_and_tabs() {
        let tsv = "# knowledge base\n\nDisease\tSymptom\nflu\tfever\n\n# end\n";
        let load = parse_table(tsv).unwrap();
        assert_eq!(load.rows, vec![("flu".to_string(), "fever".to_string())]);
    }

    #[test]
    fn escaped_quotes() {
        let fields = split_record(r#"a,"say ""hi"", ok",c"#, ',');
        assert_eq!(fields, vec!["a", "say \"hi\", ok", "c"]);
    }

    #[test]
    fn unknown_header_is_an_error() {
        let err = parse_table("subject,predicate,object\n").unwrap_err();
        assert!(matches!(err, TableError::UnknownHeader { .. }));
        assert!(matches!(parse_table("\n# only comments\n"), Err(TableError::MissingHeader)));
    }

    #[test]
    fn load_from_disk() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("kb.csv");
        std::fs::write(&path, "Disease,Symptom\nflu,fever\n").unwrap();
        let load = load_table(&path).unwrap();
        assert_eq!(load.rows.len(), 1);

        let missing = load_table(&dir.path().join("nope.csv")).unwrap_err();
        assert!(matches!(missing, TableError::Io { .. }));
    }

    #[test]
    fn graph_without_edges_is_rejected() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("kb.csv");
        std::fs::write(&path, "Disease,Symptom\nflu,\n,cough\n").unwrap();
        let err = load_graph(&path).unwrap_err();
        assert!(matches!(
            err,
            crate::error::DxError::Graph(GraphError::Empty { rows: 2 })
        ));

        std::fs::write(&path, "Disease,Symptom\nflu,fever\nflu,\n").unwrap();
        let graph = load_graph(&path).unwrap();
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.skipped_rows(), 1);
    }
}
