use serde::{Deserialize, Serialize};

use crate::domain::{BusinessQuery, MAX_RATING};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeBusinessRequest {
    pub name: String,
    pub location: String,
}

impl From<&BusinessQuery> for AnalyzeBusinessRequest {
    fn from(query: &BusinessQuery) -> Self {
        Self {
            name: query.name.clone(),
            location: query.location.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegenerateHeadlineQuery {
    pub name: String,
    pub location: String,
}

impl From<&BusinessQuery> for RegenerateHeadlineQuery {
    fn from(query: &BusinessQuery) -> Self {
        Self {
            name: query.name.clone(),
            location: query.location.clone(),
        }
    }
}

/// Success payload of the analysis endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessAnalysis {
    pub rating: f64,
    pub reviews: u64,
    pub headline: String,
}

impl BusinessAnalysis {
    /// Checks the payload against the report contract: a finite rating in
    /// `[0, MAX_RATING]` and a non-blank headline.
    pub fn check(&self) -> Result<(), String> {
        if !self.rating.is_finite() || !(0.0..=MAX_RATING).contains(&self.rating) {
            return Err(format!(
                "rating {} outside [0, {MAX_RATING}]",
                self.rating
            ));
        }
        if self.headline.trim().is_empty() {
            return Err("headline is empty".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadlineResponse {
    pub headline: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analysis(rating: f64, headline: &str) -> BusinessAnalysis {
        BusinessAnalysis {
            rating,
            reviews: 312,
            headline: headline.to_string(),
        }
    }

    #[test]
    fn decodes_analysis_wire_names() {
        let parsed: BusinessAnalysis = serde_json::from_str(
            r#"{"rating":4.6,"reviews":312,"headline":"Austin's Coziest Corner"}"#,
        )
        .expect("decode");
        assert_eq!(parsed, analysis(4.6, "Austin's Coziest Corner"));
    }

    #[test]
    fn negative_review_count_is_rejected_at_decode() {
        let parsed = serde_json::from_str::<BusinessAnalysis>(
            r#"{"rating":4.6,"reviews":-1,"headline":"x"}"#,
        );
        assert!(parsed.is_err());
    }

    #[test]
    fn check_accepts_rating_bounds() {
        assert!(analysis(0.0, "ok").check().is_ok());
        assert!(analysis(5.0, "ok").check().is_ok());
    }

    #[test]
    fn check_rejects_out_of_range_or_blank() {
        assert!(analysis(5.1, "ok").check().is_err());
        assert!(analysis(-0.5, "ok").check().is_err());
        assert!(analysis(f64::NAN, "ok").check().is_err());
        assert!(analysis(4.0, "   ").check().is_err());
    }
}
