use std::collections::BTreeMap;

use serde::Serialize;
use shared::domain::InputField;

pub const NAME_REQUIRED: &str = "Business name is required";
pub const LOCATION_REQUIRED: &str = "Business location is required";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<InputField, String>);

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: InputField) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (InputField, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }

    fn insert(&mut self, field: InputField, message: &str) {
        self.0.insert(field, message.to_string());
    }
}

/// Validates raw form input. A field is invalid iff its trimmed value is empty.
pub fn validate_inputs(business_name: &str, location: &str) -> ValidationErrors {
    let mut errors = ValidationErrors::default();
    if business_name.trim().is_empty() {
        errors.insert(InputField::Name, NAME_REQUIRED);
    }
    if location.trim().is_empty() {
        errors.insert(InputField::Location, LOCATION_REQUIRED);
    }
    errors
}
