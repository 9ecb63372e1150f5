//! # Core Domain Entities
//!
//! ## Clusters
//!
//! - **Complaints**: `ComplaintRecord` and its nested detail objects, as
//!   exported by the complaint API.
//! - **Ledger**: `ContractHandle`, the bookkeeping for a deployed
//!   fingerprint-registry contract.

use crate::primitives::{Address, TxHash};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

// =============================================================================
// CLUSTER A: COMPLAINTS
// =============================================================================

/// Snapshot of a filed complaint (FIR) as served by the complaint API.
///
/// Only `id` and `text` are required for fingerprinting; every other field
/// is optional and defaults to absent (scalars, objects) or empty (arrays).
/// The identifier accepts the API's `id`, a raw `_id`, or an extended-JSON
/// `{"$oid": ".."}` object from a database export.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplaintRecord {
    /// Complaint identifier.
    #[serde(default, alias = "_id", deserialize_with = "deserialize_object_id")]
    pub id: String,
    /// Free-text complaint narrative.
    #[serde(default)]
    pub text: String,
    /// Language the complaint was written in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Workflow status in the complaint system (not the ledger status).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Identifier of the complainant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complainant_id: Option<String>,
    /// Display name of the complainant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complainant_name: Option<String>,
    /// Contact phone of the complainant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complainant_phone: Option<String>,
    /// ISO-8601 filing time as recorded by the complaint API.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filed_at: Option<String>,
    /// Officer who filed on the victim's behalf, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filed_by: Option<FiledBy>,
    /// Incident metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incident_details: Option<IncidentDetails>,
    /// Legal sections applied to the complaint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legal_classification: Option<LegalClassification>,
    /// Automated analysis of the complaint text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis_result: Option<AnalysisResult>,
    /// Section codes suggested by the analysis step.
    #[serde(default)]
    pub suggested_sections: Vec<String>,
    /// Short summary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Longer explanation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl ComplaintRecord {
    /// Creates a record with just an identifier and text.
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            ..Self::default()
        }
    }

    /// Legal section codes, empty when no classification exists.
    #[must_use]
    pub fn legal_sections(&self) -> &[String] {
        self.legal_classification
            .as_ref()
            .map_or(&[][..], |c| c.ipc_sections.as_slice())
    }

    /// Sets the legal section codes.
    #[must_use]
    pub fn with_legal_sections<I, S>(mut self, sections: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.legal_classification = Some(LegalClassification {
            ipc_sections: sections.into_iter().map(Into::into).collect(),
        });
        self
    }
}

/// Who filed the complaint when it was filed on someone else's behalf.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FiledBy {
    /// Account id of the filer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Role such as `officer` or `citizen`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// Where, when and what kind of incident was reported.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncidentDetails {
    /// Incident date as entered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// Free-text place.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Incident category.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// Legal classification. The field keeps the complaint API's snake-case name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegalClassification {
    /// Applicable IPC sections, e.g. `IPC 379`.
    #[serde(default, alias = "ipcSections")]
    pub ipc_sections: Vec<String>,
}

/// Output of the complaint text analysis.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Whether the offence is cognizable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_cognizable: Option<bool>,
    /// Sections the analysis matched.
    #[serde(default)]
    pub sections: Vec<SectionReference>,
    /// Short summary of the complaint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Reasoning behind the classification.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

/// One applicable legal section with its description.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionReference {
    /// Section label.
    #[serde(default)]
    pub section: String,
    /// What the section covers.
    #[serde(default)]
    pub description: String,
}

/// Accepts `"abc"` or `{"$oid": "abc"}`.
fn deserialize_object_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Plain(String),
        Extended {
            #[serde(rename = "$oid")]
            oid: String,
        },
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Plain(id) => id,
        RawId::Extended { oid } => oid,
    })
}

// =============================================================================
// CLUSTER B: LEDGER
// =============================================================================

/// A deployed fingerprint-registry contract and its deployment metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractHandle {
    /// Contract address (unique across handles).
    pub address: Address,
    /// When the deployment was recorded.
    pub deployed_at: DateTime<Utc>,
    /// Deploying identity, or a marker for hand-registered contracts.
    pub deployed_by: String,
    /// Deployment transaction reference.
    pub transaction_hash: TxHash,
    /// Whether this handle may be resolved as the active contract.
    pub is_active: bool,
}

impl ContractHandle {
    /// Creates an active handle deployed now.
    pub fn new_active(address: Address, deployed_by: impl Into<String>, tx: TxHash) -> Self {
        Self {
            address,
            deployed_at: Utc::now(),
            deployed_by: deployed_by.into(),
            transaction_hash: tx,
            is_active: true,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
