//! Commission detail and expedient models.

use serde::{Deserialize, Serialize};

use super::CommissionStatus;

/// A case file reviewed during a commission session.
///
/// The id is the secretarial case code (e.g. "3175/2024"), unique within
/// one commission but not across the whole dataset. The textual fields
/// loosely reference the admin lists by name; nothing enforces that.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expedient {
    pub id: String,
    pub peticionari: String,
    pub procediment: String,
    pub descripcio: String,
    pub indret: String,
    pub sentit_informe: String,
    pub departament: String,
    pub tecnic: String,
}

/// Full record of one session: metadata plus the ordered expedient list.
///
/// `sessio` mirrors the parent summary's dataComissio; `expedients_count`
/// is derived from the list on every save. Expedient order is significant
/// (it drives display and print order) and is re-sequenced on save.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommissionDetail {
    pub num_acta: i64,
    pub sessio: String,
    pub data_actual: String,
    pub hora: String,
    pub estat: CommissionStatus,
    pub mitja: String,
    pub expedients_count: i64,
    pub expedients: Vec<Expedient>,
}

/// Default session time for a freshly synthesized detail.
pub const DEFAULT_HORA: &str = "9:00:00";
/// Default delivery medium for a freshly synthesized detail.
pub const DEFAULT_MITJA: &str = "Via telemàtica";
