//! Visitor record model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::Validate;

use super::enums::{Gender, VisitorType};
use super::timestamp::to_point_in_time;
use crate::error::{AppError, AppResult};

/// Placeholder the backend stores for "no value" in optional text fields
pub const NOT_AVAILABLE: &str = "N/A";

/// Visitor record as read from the document store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Visitor {
    pub id: String,
    pub visitor_name: String,
    pub phone_number: String,
    pub id_number: String,
    pub residence: String,
    pub institution_occupation: String,
    pub purpose_of_visit: String,
    pub gender: Option<Gender>,
    pub visitor_type: VisitorType,
    /// Vehicle plate, only meaningful for vehicle visitors
    pub ref_number: Option<String>,
    pub tag_number: Option<String>,
    #[serde(default)]
    pub tag_not_given: bool,
    pub time_in: DateTime<Utc>,
    pub time_out: Option<DateTime<Utc>>,
    pub is_checked_out: bool,
}

impl Visitor {
    /// Build a visitor from a raw backend document.
    ///
    /// Timestamps are coerced with [`to_point_in_time`] using `now` as the
    /// fallback, missing text fields become empty strings, and the record
    /// invariants are restored: `is_checked_out` follows `time_out`, plates
    /// are dropped for foot visitors and `tag_not_given` hides any tag.
    pub fn from_document(
        id: impl Into<String>,
        doc: &Value,
        now: DateTime<Utc>,
    ) -> AppResult<Self> {
        let map = doc
            .as_object()
            .ok_or_else(|| AppError::Validation("Visitor document must be an object".to_string()))?;

        let visitor_type = text(map, "visitorType")
            .map(|t| VisitorType::from(t.as_str()))
            .unwrap_or_default();
        let tag_not_given = map.get("tagNotGiven").and_then(Value::as_bool).unwrap_or(false);

        let ref_number = match visitor_type {
            VisitorType::Vehicle => optional_text(map, "refNumber"),
            VisitorType::Foot => None,
        };
        let tag_number = if tag_not_given {
            None
        } else {
            optional_text(map, "tagNumber")
        };

        let time_in = to_point_in_time(map.get("timeIn"), now);
        let flagged_out = map.get("isCheckedOut").and_then(Value::as_bool).unwrap_or(false);
        let time_out = match map.get("timeOut") {
            Some(v) if !v.is_null() => Some(to_point_in_time(Some(v), now)),
            _ if flagged_out => Some(now),
            _ => None,
        };

        Ok(Self {
            id: id.into(),
            visitor_name: text(map, "visitorName").unwrap_or_default(),
            phone_number: text(map, "phoneNumber").unwrap_or_default(),
            id_number: text(map, "idNumber").unwrap_or_default(),
            residence: text(map, "residence").unwrap_or_default(),
            institution_occupation: text(map, "institutionOccupation").unwrap_or_default(),
            purpose_of_visit: text(map, "purposeOfVisit").unwrap_or_default(),
            gender: text(map, "gender").and_then(|g| Gender::from_label(&g)),
            visitor_type,
            ref_number,
            tag_number,
            tag_not_given,
            time_in,
            is_checked_out: time_out.is_some(),
            time_out,
        })
    }

    /// Tag number when a physical tag was actually issued
    pub fn real_tag(&self) -> Option<&str> {
        if self.tag_not_given {
            return None;
        }
        self.tag_number
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty() && *t != NOT_AVAILABLE)
    }

    /// Apply a partial update in place
    pub fn apply(&mut self, patch: &VisitorPatch) {
        if let Some(v) = &patch.visitor_name {
            self.visitor_name = v.clone();
        }
        if let Some(v) = &patch.phone_number {
            self.phone_number = v.clone();
        }
        if let Some(v) = &patch.residence {
            self.residence = v.clone();
        }
        if let Some(v) = &patch.institution_occupation {
            self.institution_occupation = v.clone();
        }
        if let Some(v) = &patch.purpose_of_visit {
            self.purpose_of_visit = v.clone();
        }
        if let Some(v) = patch.gender {
            self.gender = v;
        }
        if let Some(v) = &patch.ref_number {
            self.ref_number = v.clone();
        }
        if let Some(v) = &patch.tag_number {
            self.tag_number = v.clone();
        }
        if let Some(v) = patch.tag_not_given {
            self.tag_not_given = v;
        }
        if let Some(v) = patch.time_out {
            self.time_out = Some(v);
            self.is_checked_out = true;
        }
    }
}

/// Read a text field, accepting numbers for fields that some clients write
/// as numeric values (phone and ID numbers).
fn text(map: &Map<String, Value>, key: &str) -> Option<String> {
    match map.get(key)? {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn optional_text(map: &Map<String, Value>, key: &str) -> Option<String> {
    text(map, key).filter(|s| !s.is_empty() && s != NOT_AVAILABLE)
}

/// Predicate for list and subscribe queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VisitorFilter {
    #[default]
    All,
    CheckedIn,
    CheckedOut,
}

impl VisitorFilter {
    pub fn matches(&self, visitor: &Visitor) -> bool {
        match self {
            VisitorFilter::All => true,
            VisitorFilter::CheckedIn => !visitor.is_checked_out,
            VisitorFilter::CheckedOut => visitor.is_checked_out,
        }
    }
}

/// Partial field set for a point update.
///
/// `Some(None)` on the double-optional fields clears the stored value.
/// Setting `time_out` also marks the record checked out.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitorPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visitor_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub residence: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub institution_occupation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purpose_of_visit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<Option<Gender>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ref_number: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_number: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_not_given: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_out: Option<DateTime<Utc>>,
}

impl VisitorPatch {
    /// Patch that records a check-out at `at`
    pub fn check_out(at: DateTime<Utc>) -> Self {
        Self {
            time_out: Some(at),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Check-in form submitted by the desk
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CheckInVisitor {
    #[validate(length(min = 1, message = "Visitor name is required"))]
    pub visitor_name: String,
    #[validate(length(min = 1, message = "Phone number is required"))]
    pub phone_number: String,
    #[validate(length(min = 1, message = "ID number is required"))]
    pub id_number: String,
    #[serde(default)]
    pub residence: String,
    #[serde(default)]
    pub institution_occupation: String,
    #[validate(length(min = 1, message = "Purpose of visit is required"))]
    pub purpose_of_visit: String,
    pub gender: Option<Gender>,
    #[serde(default)]
    pub visitor_type: VisitorType,
    pub ref_number: Option<String>,
    pub tag_number: Option<String>,
    #[serde(default)]
    pub tag_not_given: bool,
}

/// Edit form for an existing record. Identity and lifecycle fields
/// (`id`, `idNumber`, `visitorType`, `timeIn`, `timeOut`, `isCheckedOut`)
/// are not editable and have no field here.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateVisitor {
    #[validate(length(min = 1, message = "Visitor name cannot be empty"))]
    pub visitor_name: Option<String>,
    #[validate(length(min = 1, message = "Phone number cannot be empty"))]
    pub phone_number: Option<String>,
    pub residence: Option<String>,
    pub institution_occupation: Option<String>,
    #[validate(length(min = 1, message = "Purpose of visit cannot be empty"))]
    pub purpose_of_visit: Option<String>,
    pub gender: Option<Gender>,
    pub ref_number: Option<String>,
    pub tag_number: Option<String>,
    pub tag_not_given: Option<bool>,
}
