//! Ollama-backed symptom extraction.
//!
//! Sends the user's description to `/api/generate` with a system prompt that
//! asks for a bare `Symptoms: a, b, c` reply, then parses it with
//! [`parse_symptom_list`]. The client is blocking; latency and failures are
//! reported as [`ExtractError`] and never retried here.

use std::time::Duration;

use crate::error::ExtractError;

use super::{ExtractResult, ExtractorConfig, SymptomExtractor, parse_symptom_list};

const SYSTEM_PROMPT: &str = "You are a medical assistant. Analyze the given text for symptoms. \
    Respond with a list of detected symptoms only, starting with 'Symptoms:'. \
    Do not provide any other explanation or analysis.";

/// Extractor that delegates to an Ollama-compatible LLM endpoint.
pub struct OllamaExtractor {
    config: ExtractorConfig,
    /// Bearer token read from `config.api_key_env` at construction.
    api_key: Option<String>,
}

impl OllamaExtractor {
    /// Create an extractor, resolving the API key variable if one is named.
    pub fn new(config: ExtractorConfig) -> ExtractResult<Self> {
        let api_key = match &config.api_key_env {
            Some(var) => Some(
                std::env::var(var).map_err(|_| ExtractError::MissingApiKey { var: var.clone() })?,
            ),
            None => None,
        };
        Ok(Self { config, api_key })
    }

    /// Create an extractor with an explicit token.
    pub fn with_api_key(config: ExtractorConfig, api_key: impl Into<String>) -> Self {
        Self {
            config,
            api_key: Some(api_key.into()),
        }
    }

    fn generate(&self, prompt: &str) -> ExtractResult<String> {
        let url = format!("{}/api/generate", self.config.base_url.trim_end_matches('/'));
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(self.config.timeout_secs))
            .build();

        let body = serde_json::json!({
            "model": self.config.model,
            "prompt": prompt,
            "system": SYSTEM_PROMPT,
            "stream": false,
            "options": {
                "num_predict": 150,
                "temperature": 0.3,
                "top_p": 0.95,
            },
        });
        let body_str = serde_json::to_string(&body).map_err(|e| ExtractError::RequestFailed {
            message: format!("JSON serialize error: {e}"),
        })?;

        let mut request = agent.post(&url).set("Content-Type", "application/json");
        if let Some(key) = &self.api_key {
            request = request.set("Authorization", &format!("Bearer {key}"));
        }

        let resp = request.send_string(&body_str).map_err(|e| match e {
            ureq::Error::Transport(_) => ExtractError::Unavailable {
                url: self.config.base_url.clone(),
            },
            ureq::Error::Status(code, _) => ExtractError::RequestFailed {
                message: format!("server returned status {code}"),
            },
        })?;

        let resp_str = resp.into_string().map_err(|e| ExtractError::ParseError {
            message: e.to_string(),
        })?;
        let json: serde_json::Value =
            serde_json::from_str(&resp_str).map_err(|e| ExtractError::ParseError {
                message: e.to_string(),
            })?;

        json["response"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| ExtractError::ParseError {
                message: "missing 'response' field".into(),
            })
    }
}

impl SymptomExtractor for OllamaExtractor {
    fn name(&self) -> &str {
        "ollama"
    }

    fn extract(&self, text: &str) -> ExtractResult<Vec<String>> {
        let reply = self.generate(text)?;
        let symptoms = parse_symptom_list(&reply);
        tracing::debug!(
            model = %self.config.model,
            symptoms = symptoms.len(),
            "extracted symptoms"
        );
        Ok(symptoms)
    }
}

impl std::fmt::Debug for OllamaExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OllamaExtractor")
            .field("base_url", &self.config.base_url)
            .field("model", &self.config.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::ExtractorBackend;

    fn unreachable_config() -> ExtractorConfig {
        ExtractorConfig {
            backend: ExtractorBackend::Ollama,
            base_url: "http://127.0.0.1:1".into(), // unreachable port
            timeout_secs: 2,
            ..Default::default()
        }
    }

    #[test]
    fn unreachable_service_is_unavailable() {
        let ex = OllamaExtractor::new(unreachable_config()).unwrap();
        let err = ex.extract("I have a fever").unwrap_err();
        assert!(matches!(err, ExtractError::Unavailable { .. }));
    }

    #[test]
    fn missing_api_key_variable_is_reported() {
        let config = ExtractorConfig {
            api_key_env: Some("MEDU_DX_TEST_KEY_THAT_IS_NOT_SET".into()),
            ..unreachable_config()
        };
        let err = OllamaExtractor::new(config).unwrap_err();
        assert!(matches!(err, ExtractError::MissingApiKey { .. }));
    }

    #[test]
    fn debug_redacts_api_key() {
        let ex = OllamaExtractor::with_api_key(unreachable_config(), "secret-token");
        let shown = format!("{ex:?}");
        assert!(!shown.contains("secret-token"));
        assert!(shown.contains("<redacted>"));
    }
}
