//! Biweekly session generation for the following year.

use chrono::{Datelike, Duration, NaiveDate, Weekday};

use crate::domain::dates;
use crate::errors::AppError;
use crate::models::{CommissionStatus, CommissionSummary};

/// Build the biweekly Wednesday sessions for the year after the latest one
/// present in `commissions`. Acta numbering continues from the global maximum
/// rather than restarting at 1, and a repeat call rolls forward to the year
/// after the last generated batch.
///
/// Fails when the store is empty.
pub fn generate_next_year(
    commissions: &[CommissionSummary],
) -> Result<Vec<CommissionSummary>, AppError> {
    let last_year = commissions
        .iter()
        .filter_map(|c| dates::year_of(&c.data_comissio))
        .max()
        .ok_or_else(|| {
            AppError::Validation("No hi ha comissions existents per determinar l'any".to_string())
        })?;
    let next_year = last_year + 1;

    let mut num_acta = commissions.iter().map(|c| c.num_acta).max().unwrap_or(0);

    let mut date = NaiveDate::from_ymd_opt(next_year, 1, 1)
        .ok_or_else(|| AppError::Internal(format!("invalid year {next_year}")))?;
    while date.weekday() != Weekday::Wed {
        date = date + Duration::days(1);
    }

    let mut generated = Vec::new();
    while date.year() == next_year {
        num_acta += 1;
        generated.push(CommissionSummary {
            num_acta,
            num_temes: 0,
            dia_setmana: "dimecres".to_string(),
            data_comissio: dates::format_dmy(date),
            avis_email: false,
            data_email: None,
            estat: CommissionStatus::Oberta,
        });
        date = date + Duration::days(14);
    }

    Ok(generated)
}
