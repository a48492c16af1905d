//! Diagnosis report: what the user is shown at the end of a scoring pass.

use serde::Serialize;

use crate::normalize::capitalize;
use crate::score::Diagnosis;

/// One reported disease.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportEntry {
    pub disease: String,
    /// Percentage in `[0, 100]`.
    pub confidence: f64,
    pub matched_symptoms: Vec<String>,
}

/// Ordered diagnosis report. Empty means "no candidates".
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Report {
    pub entries: Vec<ReportEntry>,
}

impl Report {
    pub fn from_diagnoses(diagnoses: &[Diagnosis]) -> Self {
        Self {
            entries: diagnoses
                .iter()
                .map(|d| ReportEntry {
                    disease: d.disease.clone(),
                    confidence: d.confidence,
                    matched_symptoms: d.matched.clone(),
                })
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Display for Report {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.entries.is_empty() {
            writeln!(f, "Unable to determine a specific disease based on the provided symptoms.")?;
            return writeln!(f, "Please consult with a healthcare professional for proper diagnosis.");
        }
        writeln!(f, "Based on the symptoms provided, you may have:")?;
        for entry in &self.entries {
            writeln!(
                f,
                "- {} (Confidence: {:.2}%)",
                capitalize(&entry.disease),
                entry.confidence
            )?;
            writeln!(f, "  Matched symptoms: {}", entry.matched_symptoms.join(", "))?;
        }
        writeln!(f)?;
        writeln!(f, "Please consult with a healthcare professional for an accurate diagnosis.")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diagnosis(disease: &str, confidence: f64, matched: &[&str]) -> Diagnosis {
        Diagnosis {
            disease: disease.into(),
            confidence,
            match_ratio: confidence / 100.0,
            matched: matched.iter().map(|s| s.to_string()).collect(),
            total_symptoms: 2,
        }
    }

    #[test]
    fn renders_entries() {
        let report = Report::from_diagnoses(&[
            diagnosis("flu", 100.0, &["cough", "fever"]),
            diagnosis("common cold", 50.0, &["cough"]),
        ]);
        let text = report.to_string();
        assert!(text.contains("- Flu (Confidence: 100.00%)"));
        assert!(text.contains("  Matched symptoms: cough, fever"));
        assert!(text.contains("- Common cold (Confidence: 50.00%)"));
    }

    #[test]
    fn empty_report_signals_no_candidates() {
        let report = Report::from_diagnoses(&[]);
        assert!(report.is_empty());
        assert!(report.to_string().starts_with("Unable to determine"));
    }

    #[test]
    fn serializes_to_json() {
        let report = Report::from_diagnoses(&[diagnosis("flu", 100.0, &["fever"])]);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["entries"][0]["disease"], "flu");
        assert_eq!(json["entries"][0]["matched_symptoms"][0], "fever");
    }
}
