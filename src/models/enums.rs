//! Shared domain enums

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Gender
// ---------------------------------------------------------------------------

/// Visitor gender as recorded at the desk. Absent values (and the backend's
/// "N/A" placeholder) are modelled as `None` on the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    /// Parse a backend label. "N/A", empty and unknown labels yield `None`.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "male" => Some(Gender::Male),
            "female" => Some(Gender::Female),
            "other" => Some(Gender::Other),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
        }
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ---------------------------------------------------------------------------
// VisitorType
// ---------------------------------------------------------------------------

/// How the visitor arrived. Vehicle visitors carry a plate in `ref_number`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisitorType {
    #[default]
    Foot,
    Vehicle,
}

impl From<&str> for VisitorType {
    fn from(v: &str) -> Self {
        match v.trim().to_ascii_lowercase().as_str() {
            "vehicle" => VisitorType::Vehicle,
            _ => VisitorType::Foot,
        }
    }
}

impl std::fmt::Display for VisitorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            VisitorType::Foot => "foot",
            VisitorType::Vehicle => "vehicle",
        };
        write!(f, "{}", label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gender_labels() {
        assert_eq!(Gender::from_label("Female"), Some(Gender::Female));
        assert_eq!(Gender::from_label(" male "), Some(Gender::Male));
        assert_eq!(Gender::from_label("N/A"), None);
        assert_eq!(Gender::from_label(""), None);
    }

    #[test]
    fn test_visitor_type_defaults_to_foot() {
        assert_eq!(VisitorType::from("Vehicle"), VisitorType::Vehicle);
        assert_eq!(VisitorType::from("bicycle"), VisitorType::Foot);
        assert_eq!(VisitorType::Vehicle.to_string(), "vehicle");
    }
}
