use crate::engine::DEFAULT_CHANGE_THRESHOLD;
use crate::error::{FinancialReviewError, Result};
use crate::keywords::KeywordIndex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

fn default_change_threshold() -> f64 {
    DEFAULT_CHANGE_THRESHOLD
}

/// Settings for one review run. Built by the caller and passed in; nothing
/// here is read from the environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ReviewConfig {
    #[schemars(description = "Company name used in the generated report")]
    pub company_name: String,

    #[schemars(
        description = "Minimum absolute period-over-period change, as a fraction of the prior amount, for an account to be reported (0.3 = 30%)"
    )]
    #[serde(default = "default_change_threshold")]
    pub change_threshold: f64,

    #[schemars(description = "Ordered keyword table used to locate line items")]
    #[serde(default)]
    pub keywords: KeywordIndex,
}

impl ReviewConfig {
    pub fn new(company_name: impl Into<String>) -> Self {
        Self {
            company_name: company_name.into(),
            change_threshold: DEFAULT_CHANGE_THRESHOLD,
            keywords: KeywordIndex::standard(),
        }
    }

    #[must_use]
    pub fn with_change_threshold(mut self, threshold: f64) -> Self {
        self.change_threshold = threshold;
        self
    }

    #[must_use]
    pub fn with_keywords(mut self, keywords: KeywordIndex) -> Self {
        self.keywords = keywords;
        self
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.change_threshold.is_finite() || self.change_threshold < 0.0 {
            return Err(FinancialReviewError::InvalidThreshold(self.change_threshold));
        }
        self.keywords.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Concept;

    #[test]
    fn test_defaults_from_json() {
        let config = ReviewConfig::from_json(r#"{ "company_name": "ACME Corp" }"#).unwrap();
        assert_eq!(config.company_name, "ACME Corp");
        assert_eq!(config.change_threshold, 0.3);
        assert_eq!(config.keywords, KeywordIndex::standard());
    }

    #[test]
    fn test_custom_keywords_from_json() {
        let json = r#"{
            "company_name": "ACME Corp",
            "change_threshold": 0.5,
            "keywords": [
                { "concept": "revenue", "keywords": ["Sales"] }
            ]
        }"#;
        let config = ReviewConfig::from_json(json).unwrap();
        assert_eq!(config.change_threshold, 0.5);
        assert_eq!(config.keywords.keywords_for(Concept::Revenue), &["Sales"]);
        assert!(config.keywords.keywords_for(Concept::NetIncome).is_empty());
    }

    #[test]
    fn test_invalid_threshold_rejected() {
        for bad in [-0.1, f64::NAN, f64::INFINITY] {
            let config = ReviewConfig::new("ACME").with_change_threshold(bad);
            assert!(matches!(
                config.validate(),
                Err(FinancialReviewError::InvalidThreshold(_))
            ));
        }
        assert!(ReviewConfig::new("ACME").with_change_threshold(0.0).validate().is_ok());
    }

    #[test]
    fn test_malformed_json_is_serialization_error() {
        let result = ReviewConfig::from_json("{ not json");
        assert!(matches!(result, Err(FinancialReviewError::SerializationError(_))));
    }
}
