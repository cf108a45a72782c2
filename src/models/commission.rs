//! Commission summary model matching the frontend CommissionSummary interface.

use serde::{Deserialize, Serialize};

/// Lifecycle state of a commission session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommissionStatus {
    Oberta,
    Finalitzada,
}

impl CommissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommissionStatus::Oberta => "Oberta",
            CommissionStatus::Finalitzada => "Finalitzada",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Oberta" => Some(CommissionStatus::Oberta),
            "Finalitzada" => Some(CommissionStatus::Finalitzada),
            _ => None,
        }
    }
}

/// One row of the commission calendar.
///
/// Identified by the pair (numActa, dataComissio); numActa is unique within
/// a calendar year.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommissionSummary {
    pub num_acta: i64,
    pub num_temes: i64,
    pub dia_setmana: String,
    /// Session date in D/M/YYYY form.
    pub data_comissio: String,
    pub avis_email: bool,
    pub data_email: Option<String>,
    pub estat: CommissionStatus,
}

/// A deleted commission together with its detail, returned by the delete
/// endpoint and accepted back by the restore endpoint for undo.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedCommission {
    pub summary: CommissionSummary,
    #[serde(default)]
    pub detail: Option<super::CommissionDetail>,
}

/// Request body for manually creating a commission.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommissionRequest {
    pub num_acta: i64,
    /// Accepts D/M/YYYY or the date-picker YYYY-MM-DD form.
    pub data_comissio: String,
}

/// Request body for re-keying a commission (acta number and/or date).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RekeyCommissionRequest {
    pub num_acta: i64,
    pub data_comissio: String,
}

/// Request body for field-by-field commission updates.
///
/// Only the provided fields are applied. Clearing avisEmail also clears
/// dataEmail.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchCommissionRequest {
    #[serde(default)]
    pub num_temes: Option<i64>,
    #[serde(default)]
    pub avis_email: Option<bool>,
    #[serde(default, deserialize_with = "some_nullable")]
    pub data_email: Option<Option<String>>,
    #[serde(default)]
    pub estat: Option<CommissionStatus>,
}

/// Distinguishes "field absent" from an explicit null for dataEmail.
fn some_nullable<'de, D>(de: D) -> Result<Option<Option<String>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::Deserialize;
    Option::<String>::deserialize(de).map(Some)
}
