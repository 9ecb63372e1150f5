//! # Canonical Projection
//!
//! The subset of a complaint that is fingerprinted, laid out in a fixed
//! field order. Serde serializes struct fields in declaration order, so the
//! declaration below IS the canonical key order.

use serde::Serialize;
use shared_types::{ComplaintRecord, FiledBy, IncidentDetails};

/// Stable fields of a complaint in canonical order.
///
/// Optional scalars and objects are dropped when absent. Section arrays are
/// always present and always sorted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalProjection<'a> {
    /// Complaint identifier.
    pub id: &'a str,
    /// Complaint narrative.
    pub text: &'a str,
    /// Complainant identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub complainant_id: Option<&'a str>,
    /// Complainant name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub complainant_name: Option<&'a str>,
    /// Filing time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filed_at: Option<&'a str>,
    /// Filing officer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filed_by: Option<&'a FiledBy>,
    /// Incident metadata.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub incident_details: Option<&'a IncidentDetails>,
    /// Sorted legal section codes.
    pub legal_sections: Vec<&'a str>,
    /// Sorted suggested section codes.
    pub suggested_sections: Vec<&'a str>,
}

impl<'a> CanonicalProjection<'a> {
    /// Borrows the stable fields out of a complaint.
    #[must_use]
    pub fn from_complaint(complaint: &'a ComplaintRecord) -> Self {
        Self {
            id: &complaint.id,
            text: &complaint.text,
            complainant_id: complaint.complainant_id.as_deref(),
            complainant_name: complaint.complainant_name.as_deref(),
            filed_at: complaint.filed_at.as_deref(),
            filed_by: complaint.filed_by.as_ref(),
            incident_details: complaint.incident_details.as_ref(),
            legal_sections: sorted(complaint.legal_sections()),
            suggested_sections: sorted(&complaint.suggested_sections),
        }
    }
}

fn sorted(values: &[String]) -> Vec<&str> {
    let mut out: Vec<&str> = values.iter().map(String::as_str).collect();
    out.sort_unstable();
    out
}
