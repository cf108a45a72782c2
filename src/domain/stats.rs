//! Per-year statistics over commissions and their expedients.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::domain::dates;
use crate::models::{AdminItem, CommissionDetail, CommissionStatus, CommissionSummary};

/// Chart palette shared by every distribution.
pub const PALETTE: [&str; 8] = [
    "#14b8a6", "#f97316", "#ef4444", "#8b5cf6", "#3b82f6", "#f43f5e", "#06b6d4", "#d946ef",
];

pub const UNASSIGNED_TECHNICIAN: &str = "No assignat";
pub const UNASSIGNED_STATUS: &str = "Sense estat";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DistributionSlice {
    pub name: String,
    pub value: i64,
    pub fill: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkloadPoint {
    pub date: String,
    pub load: i64,
}

/// Matrix column header: the full session date plus whether the session is
/// still open (rendered as a future column).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkloadHeader {
    pub date: String,
    pub is_future: bool,
}

/// Technician x session matrix. Rows exist only for listed technicians;
/// cells are keyed by the full D/M/YYYY session date.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechnicianWorkload {
    pub headers: Vec<WorkloadHeader>,
    pub technicians: Vec<String>,
    pub data: BTreeMap<String, BTreeMap<String, i64>>,
    pub row_totals: BTreeMap<String, i64>,
    pub column_totals: Vec<i64>,
    pub grand_total: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsData {
    pub technician_distribution: Vec<DistributionSlice>,
    pub workload_over_time: Vec<WorkloadPoint>,
    pub report_status_distribution: Vec<DistributionSlice>,
    pub technician_workload: TechnicianWorkload,
}

/// Compute the statistics for one calendar year.
///
/// A detail only counts when its acta belongs to the year's commission set
/// and its own session date falls in the year.
pub fn compute(
    commissions: &[CommissionSummary],
    details: &[CommissionDetail],
    tecnics: &[AdminItem],
    year: i32,
) -> StatisticsData {
    let mut year_commissions: Vec<&CommissionSummary> = commissions
        .iter()
        .filter(|c| dates::in_year(&c.data_comissio, year))
        .collect();
    year_commissions.sort_by_key(|c| dates::parse_dmy(&c.data_comissio));

    let year_actas: BTreeSet<i64> = year_commissions.iter().map(|c| c.num_acta).collect();
    let year_details: Vec<&CommissionDetail> = details
        .iter()
        .filter(|d| year_actas.contains(&d.num_acta) && dates::in_year(&d.sessio, year))
        .collect();

    let technician_distribution = tally(
        year_details
            .iter()
            .flat_map(|d| d.expedients.iter())
            .map(|e| label_or(&e.tecnic, UNASSIGNED_TECHNICIAN)),
        0,
    );

    let report_status_distribution = tally(
        year_details
            .iter()
            .flat_map(|d| d.expedients.iter())
            .map(|e| label_or(&e.sentit_informe, UNASSIGNED_STATUS)),
        2,
    );

    let workload_over_time = year_commissions
        .iter()
        .map(|c| WorkloadPoint {
            date: short_date(&c.data_comissio),
            load: c.num_temes,
        })
        .collect();

    let technician_workload = workload_matrix(&year_commissions, &year_details, tecnics);

    StatisticsData {
        technician_distribution,
        workload_over_time,
        report_status_distribution,
        technician_workload,
    }
}

/// Count occurrences preserving first-seen order, cycling the palette from
/// the given offset.
fn tally<'a>(labels: impl Iterator<Item = &'a str>, palette_offset: usize) -> Vec<DistributionSlice> {
    let mut counts: Vec<(String, i64)> = Vec::new();
    for label in labels {
        match counts.iter_mut().find(|(name, _)| name == label) {
            Some((_, count)) => *count += 1,
            None => counts.push((label.to_string(), 1)),
        }
    }
    counts
        .into_iter()
        .enumerate()
        .map(|(i, (name, value))| DistributionSlice {
            name,
            value,
            fill: PALETTE[(i + palette_offset) % PALETTE.len()].to_string(),
        })
        .collect()
}

fn workload_matrix(
    year_commissions: &[&CommissionSummary],
    year_details: &[&CommissionDetail],
    tecnics: &[AdminItem],
) -> TechnicianWorkload {
    let headers: Vec<WorkloadHeader> = year_commissions
        .iter()
        .map(|c| WorkloadHeader {
            date: c.data_comissio.clone(),
            is_future: c.estat == CommissionStatus::Oberta,
        })
        .collect();

    let technicians: Vec<String> = tecnics.iter().map(|t| t.name.clone()).collect();

    // Zero-filled grid: a cell exists for every listed technician and every
    // session column; expedients assigned to anyone else are not counted.
    let mut data: BTreeMap<String, BTreeMap<String, i64>> = BTreeMap::new();
    for tech in &technicians {
        let row = data.entry(tech.clone()).or_default();
        for header in &headers {
            row.insert(header.date.clone(), 0);
        }
    }

    for detail in year_details {
        for expedient in &detail.expedients {
            if let Some(cell) = data
                .get_mut(&expedient.tecnic)
                .and_then(|row| row.get_mut(&detail.sessio))
            {
                *cell += 1;
            }
        }
    }

    let mut row_totals: BTreeMap<String, i64> = BTreeMap::new();
    let mut column_totals = vec![0i64; headers.len()];
    let mut grand_total = 0;
    for tech in &technicians {
        let mut total = 0;
        for (i, header) in headers.iter().enumerate() {
            let count = data
                .get(tech)
                .and_then(|row| row.get(&header.date))
                .copied()
                .unwrap_or(0);
            total += count;
            column_totals[i] += count;
        }
        grand_total += total;
        row_totals.insert(tech.clone(), total);
    }

    TechnicianWorkload {
        headers,
        technicians,
        data,
        row_totals,
        column_totals,
        grand_total,
    }
}

fn label_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.is_empty() {
        fallback
    } else {
        value
    }
}

/// "D/M" form of a D/M/YYYY string, used as chart axis labels.
fn short_date(date_str: &str) -> String {
    match dates::parse_dmy(date_str) {
        Some(d) => format!(
            "{}/{}",
            chrono::Datelike::day(&d),
            chrono::Datelike::month(&d)
        ),
        None => date_str.to_string(),
    }
}
