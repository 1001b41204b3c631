use serde::{Deserialize, Serialize};

/// Highest rating the analysis endpoint may report.
pub const MAX_RATING: f64 = 5.0;

/// A business lookup key: the name and location a report is bound to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BusinessQuery {
    pub name: String,
    pub location: String,
}

impl BusinessQuery {
    pub fn new(name: &str, location: &str) -> Self {
        Self {
            name: name.trim().to_string(),
            location: location.trim().to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputField {
    Name,
    Location,
}

impl InputField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Location => "location",
        }
    }
}

impl std::fmt::Display for InputField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_trims_both_parts() {
        let query = BusinessQuery::new("  Green Valley Cafe ", "\tAustin\n");
        assert_eq!(query.name, "Green Valley Cafe");
        assert_eq!(query.location, "Austin");
    }

    #[test]
    fn input_field_serializes_as_snake_case() {
        let json = serde_json::to_string(&InputField::Location).expect("serialize");
        assert_eq!(json, "\"location\"");
    }
}
