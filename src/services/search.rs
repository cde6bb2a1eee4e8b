//! Free-text visitor search.
//!
//! Text fields match case-insensitively. Phone, ID and plate numbers match
//! the query as typed. Two phrases stand in for tag status: typing a prefix
//! (or any substring) of "no tag" finds visitors who were not given a tag,
//! and likewise "has tag" finds visitors holding one. Queries are always
//! literal text and are matched as typed, surrounding spaces included.

use crate::models::visitor::Visitor;

const NO_TAG: &str = "no tag";
const HAS_TAG: &str = "has tag";

/// Query prepared once per search pass
#[derive(Debug, Clone)]
pub struct SearchQuery {
    raw: String,
    lowered: String,
}

impl SearchQuery {
    /// Prepare a query. Returns `None` for empty or whitespace-only input,
    /// which matches everything.
    pub fn parse(query: &str) -> Option<Self> {
        if query.trim().is_empty() {
            return None;
        }
        Some(Self {
            raw: query.to_string(),
            lowered: query.to_lowercase(),
        })
    }

    pub fn matches(&self, visitor: &Visitor) -> bool {
        let q = self.lowered.as_str();
        let text_fields = [
            visitor.visitor_name.as_str(),
            visitor.residence.as_str(),
            visitor.institution_occupation.as_str(),
            visitor.purpose_of_visit.as_str(),
            visitor.gender.map(|g| g.as_str()).unwrap_or_default(),
        ];
        if text_fields.iter().any(|f| f.to_lowercase().contains(q)) {
            return true;
        }

        let raw = self.raw.as_str();
        if visitor.phone_number.contains(raw)
            || visitor.id_number.contains(raw)
            || visitor.ref_number.as_deref().is_some_and(|r| r.contains(raw))
        {
            return true;
        }

        match visitor.real_tag() {
            Some(tag) => tag.to_lowercase().contains(q) || HAS_TAG.contains(q),
            None => visitor.tag_not_given && NO_TAG.contains(q),
        }
    }
}

/// Visitors matching `query`, in input order. An empty query returns the
/// whole list.
pub fn filter<'a>(query: &str, visitors: &'a [Visitor]) -> Vec<&'a Visitor> {
    match SearchQuery::parse(query) {
        None => visitors.iter().collect(),
        Some(q) => visitors.iter().filter(|v| q.matches(v)).collect(),
    }
}

/// Owned variant of [`filter`]
pub fn filter_owned(query: &str, visitors: Vec<Visitor>) -> Vec<Visitor> {
    match SearchQuery::parse(query) {
        None => visitors,
        Some(q) => visitors.into_iter().filter(|v| q.matches(v)).collect(),
    }
}
