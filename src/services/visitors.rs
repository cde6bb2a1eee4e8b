//! Visitor check-in, check-out and edit flows

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        enums::VisitorType,
        visitor::{
            CheckInVisitor, UpdateVisitor, Visitor, VisitorFilter, VisitorPatch, NOT_AVAILABLE,
        },
    },
    repository::{Repository, VisitorSubscription},
};

use super::search;

/// Digits with optional leading `+` and space, dash or dot separators
static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[0-9][0-9 .\-]{5,18}[0-9]$").expect("valid phone regex"));

#[derive(Clone)]
pub struct VisitorsService {
    repository: Repository,
}

impl VisitorsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Get a visitor by ID
    pub async fn get(&self, id: &str) -> AppResult<Visitor> {
        self.repository.visitors.get(id).await
    }

    /// List visitors matching the filter
    pub async fn list(&self, filter: VisitorFilter) -> AppResult<Vec<Visitor>> {
        self.repository.visitors.list(filter).await
    }

    /// Search the full matching list with a free-text query
    pub async fn search(&self, query: &str, filter: VisitorFilter) -> AppResult<Vec<Visitor>> {
        let visitors = self.repository.visitors.list(filter).await?;
        Ok(search::filter_owned(query, visitors))
    }

    /// Observe visitors matching the filter. Drop the subscription to release it.
    pub async fn subscribe(&self, filter: VisitorFilter) -> AppResult<VisitorSubscription> {
        self.repository.visitors.subscribe(filter).await
    }

    /// Register a new arrival
    pub async fn check_in(&self, form: CheckInVisitor, now: DateTime<Utc>) -> AppResult<Visitor> {
        form.validate()?;
        validate_phone(&form.phone_number)?;

        let ref_number = clean(form.ref_number);
        match (form.visitor_type, &ref_number) {
            (VisitorType::Vehicle, None) => {
                return Err(AppError::Validation(
                    "Vehicle registration number is required for vehicle visitors".to_string(),
                ))
            }
            (VisitorType::Foot, Some(_)) => {
                return Err(AppError::Validation(
                    "Foot visitors cannot have a vehicle registration number".to_string(),
                ))
            }
            _ => {}
        }

        let tag_number = clean(form.tag_number);
        match (&tag_number, form.tag_not_given) {
            (Some(_), true) => {
                return Err(AppError::Validation(
                    "A tag number was given but the visitor is marked as having no tag".to_string(),
                ))
            }
            (None, false) => {
                return Err(AppError::Validation(
                    "Enter a tag number or mark the tag as not given".to_string(),
                ))
            }
            _ => {}
        }

        let visitor = Visitor {
            id: Uuid::new_v4().to_string(),
            visitor_name: form.visitor_name.trim().to_string(),
            phone_number: form.phone_number.trim().to_string(),
            id_number: form.id_number.trim().to_string(),
            residence: form.residence.trim().to_string(),
            institution_occupation: form.institution_occupation.trim().to_string(),
            purpose_of_visit: form.purpose_of_visit.trim().to_string(),
            gender: form.gender,
            visitor_type: form.visitor_type,
            ref_number,
            tag_number,
            tag_not_given: form.tag_not_given,
            time_in: now,
            time_out: None,
            is_checked_out: false,
        };

        let visitor = self.repository.visitors.create(visitor).await?;
        tracing::info!("Checked in visitor {} ({})", visitor.id, visitor.visitor_type);
        Ok(visitor)
    }

    /// Record a departure. A visitor can only be checked out once; the
    /// store rejects a second check-out with a conflict.
    pub async fn check_out(&self, id: &str, now: DateTime<Utc>) -> AppResult<Visitor> {
        let visitor = self.repository.visitors.check_out(id, now).await?;
        if now < visitor.time_in {
            tracing::warn!("Check-out time for visitor {} precedes check-in, clock skew?", id);
        }
        tracing::info!("Checked out visitor {}", visitor.id);
        Ok(visitor)
    }

    /// Edit the non-identity fields of a record
    pub async fn update(&self, id: &str, form: UpdateVisitor) -> AppResult<Visitor> {
        form.validate()?;
        if let Some(phone) = &form.phone_number {
            validate_phone(phone)?;
        }

        let current = self.repository.visitors.get(id).await?;
        let patch = build_patch(&current, form)?;
        if patch.is_empty() {
            return Err(AppError::Validation("No fields to update".to_string()));
        }

        let visitor = self.repository.visitors.update(id, patch).await?;
        tracing::info!("Updated visitor {}", visitor.id);
        Ok(visitor)
    }
}

fn validate_phone(phone: &str) -> AppResult<()> {
    if PHONE_RE.is_match(phone.trim()) {
        Ok(())
    } else {
        Err(AppError::Validation(format!("Invalid phone number: {}", phone)))
    }
}

/// Trim, and map empty strings and the "N/A" placeholder to `None`
fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty() && v != NOT_AVAILABLE)
}

/// Turn an edit form into a patch, keeping the tag and plate invariants
fn build_patch(current: &Visitor, form: UpdateVisitor) -> AppResult<VisitorPatch> {
    let trimmed = |v: Option<String>| v.map(|s| s.trim().to_string());

    let mut patch = VisitorPatch {
        visitor_name: trimmed(form.visitor_name),
        phone_number: trimmed(form.phone_number),
        residence: trimmed(form.residence),
        institution_occupation: trimmed(form.institution_occupation),
        purpose_of_visit: trimmed(form.purpose_of_visit),
        gender: form.gender.map(Some),
        ..Default::default()
    };

    if let Some(plate) = form.ref_number {
        let plate = clean(Some(plate));
        match (current.visitor_type, plate.is_some()) {
            (VisitorType::Foot, true) => {
                return Err(AppError::Validation(
                    "Foot visitors cannot have a vehicle registration number".to_string(),
                ))
            }
            (VisitorType::Vehicle, false) => {
                return Err(AppError::Validation(
                    "Vehicle registration number cannot be removed".to_string(),
                ))
            }
            _ => patch.ref_number = Some(plate),
        }
    }

    let tag = form.tag_number.map(|t| clean(Some(t)));
    match (tag, form.tag_not_given) {
        (Some(Some(_)), Some(true)) => {
            return Err(AppError::Validation(
                "A tag number was given but the visitor is marked as having no tag".to_string(),
            ))
        }
        (Some(Some(tag)), _) => {
            patch.tag_number = Some(Some(tag));
            patch.tag_not_given = Some(false);
        }
        (_, Some(true)) => {
            patch.tag_number = Some(None);
            patch.tag_not_given = Some(true);
        }
        (Some(None), _) | (None, Some(false)) => {
            return Err(AppError::Validation(
                "Enter a tag number or mark the tag as not given".to_string(),
            ))
        }
        (None, None) => {}
    }

    Ok(patch)
}
