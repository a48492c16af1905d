//! Rich diagnostic error types for the diagnosis engine.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes, help text, and source chains. Most anomalies in the
//! inference path are not errors at all: a malformed row is skipped, an empty
//! extraction means "no new symptoms", and no qualifying match is a valid,
//! empty outcome. What remains here are the failures that reach the edges of
//! the system (files, configuration, the extraction service).

use miette::Diagnostic;
use thiserror::Error;

/// Top-level error type for the diagnosis engine.
#[derive(Debug, Error, Diagnostic)]
pub enum DxError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Table(#[from] TableError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Extract(#[from] ExtractError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),
}

// ---------------------------------------------------------------------------
// Graph errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum GraphError {
    #[error("malformed row {row}: missing {missing}")]
    #[diagnostic(
        code(dx::graph::malformed_row),
        help(
            "Every knowledge base row needs a non-empty disease and a non-empty symptom. \
             The row was skipped; fix the source table to include it."
        )
    )]
    MalformedRow { row: usize, missing: &'static str },

    #[error("knowledge graph is empty: {rows} row(s) read, none usable")]
    #[diagnostic(
        code(dx::graph::empty),
        help("The knowledge base table produced no (disease, symptom) edges. Check its header and delimiter.")
    )]
    Empty { rows: usize },
}

// ---------------------------------------------------------------------------
// Table errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum TableError {
    #[error("failed to read knowledge base table: {path}")]
    #[diagnostic(
        code(dx::table::io),
        help("Ensure the file exists and is readable.")
    )]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("unrecognized table header: \"{header}\"")]
    #[diagnostic(
        code(dx::table::header),
        help(
            "Expected a header of `Disease,Symptom[,Relation]` (one pair per row) \
             or `Disease,Combined_Symptoms` (one disease per row)."
        )
    )]
    UnknownHeader { header: String },

    #[error("table has no header line")]
    #[diagnostic(
        code(dx::table::no_header),
        help("The first non-empty, non-comment line must be a header.")
    )]
    MissingHeader,
}

// ---------------------------------------------------------------------------
// Extraction errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ExtractError {
    #[error("symptom extraction service is not available at {url}")]
    #[diagnostic(
        code(dx::extract::unavailable),
        help("Start the service, or switch `[extractor] backend` to \"list\" for offline use.")
    )]
    Unavailable { url: String },

    #[error("symptom extraction request failed: {message}")]
    #[diagnostic(
        code(dx::extract::request_failed),
        help("Check that the service is running and the configured model is available.")
    )]
    RequestFailed { message: String },

    #[error("failed to parse extraction response: {message}")]
    #[diagnostic(
        code(dx::extract::parse_error),
        help("The model returned an unexpected response format.")
    )]
    ParseError { message: String },

    #[error("API key variable {var} is not set")]
    #[diagnostic(
        code(dx::extract::missing_key),
        help("Export {var} with the bearer token, or remove `api_key_env` from the config.")
    )]
    MissingApiKey { var: String },
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read config: {path}")]
    #[diagnostic(
        code(dx::config::read),
        help("Ensure the config file exists and is valid TOML.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {path}: {message}")]
    #[diagnostic(
        code(dx::config::parse),
        help("Check the TOML syntax. `medu-dx init-config <path>` writes a valid default.")
    )]
    Parse { path: String, message: String },

    #[error("failed to write config: {path}")]
    #[diagnostic(
        code(dx::config::write),
        help("Ensure you have write permissions to the target directory.")
    )]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {message}")]
    #[diagnostic(code(dx::config::invalid), help("{message}"))]
    Invalid { message: String },
}

/// Convenience alias for functions returning engine results.
pub type DxResult<T> = std::result::Result<T, DxError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn graph_error_converts_to_dx_error() {
        let err = GraphError::MalformedRow {
            row: 3,
            missing: "symptom",
        };
        let dx: DxError = err.into();
        assert!(matches!(dx, DxError::Graph(GraphError::MalformedRow { row: 3, .. })));
    }

    #[test]
    fn extract_error_converts_to_dx_error() {
        let err = ExtractError::Unavailable {
            url: "http://localhost:11434".into(),
        };
        let dx: DxError = err.into();
        assert!(matches!(dx, DxError::Extract(ExtractError::Unavailable { .. })));
    }

    #[test]
    fn error_display_messages_are_descriptive() {
        let err = GraphError::MalformedRow {
            row: 7,
            missing: "disease",
        };
        let msg = format!("{err}");
        assert!(msg.contains("row 7"));
        assert!(msg.contains("disease"));

        let err = ConfigError::Invalid {
            message: "min_score must be at most 100".into(),
        };
        assert!(format!("{err}").contains("min_score"));
    }
}
