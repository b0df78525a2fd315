//! Batch efficiency over an uploaded CSV file.
//!
//! Rows that cannot be used (missing columns, unparseable numbers, zero cost)
//! are dropped without failing the batch. Only an unreadable upload fails the
//! whole request.

use std::collections::HashMap;

use csv::StringRecord;
use log::debug;

use crate::error::ApiError;
use crate::models::{round_to, CsvBatchResponse, EfficiencyRecord, Upload};

pub const EFFICIENCY_MULTIPLIER: f64 = 1.5;

const SUBSTRATE_COLUMN: &str = "substrate_concentration";
const COST_COLUMN: &str = "cost";

/// Validates the upload envelope, then computes the batch.
pub fn process_upload(upload: Option<Upload>) -> Result<CsvBatchResponse, ApiError> {
    let upload = upload.ok_or_else(|| ApiError::BadRequest("No file part".to_string()))?;
    if upload.filename.is_empty() {
        return Err(ApiError::BadRequest("No selected file".to_string()));
    }
    Ok(CsvBatchResponse {
        results: efficiency_records(&upload.content)?,
    })
}

pub fn efficiency_records(content: &[u8]) -> Result<Vec<EfficiencyRecord>, ApiError> {
    let text = std::str::from_utf8(content).map_err(|e| ApiError::Server(e.to_string()))?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    // The reader is lenient: ragged rows and unbalanced quotes come back as
    // records, so its errors only cover I/O on the in-memory slice.
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| ApiError::Server(e.to_string()))?
        .clone();
    let columns = header_map(&headers);
    let substrate_idx = columns.get(SUBSTRATE_COLUMN).copied();
    let cost_idx = columns.get(COST_COLUMN).copied();

    let mut records = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let record = result.map_err(|e| ApiError::Server(e.to_string()))?;
        // header is line 1
        let line = idx + 2;

        let (Some(s_idx), Some(c_idx)) = (substrate_idx, cost_idx) else {
            continue;
        };
        let (Some(s_cell), Some(c_cell)) = (record.get(s_idx), record.get(c_idx)) else {
            debug!("CSV line {line}: missing {SUBSTRATE_COLUMN} or {COST_COLUMN}, skipped");
            continue;
        };

        match row_efficiency(s_cell, c_cell) {
            Some(entry) => records.push(entry),
            None => debug!("CSV line {line}: unusable values ({s_cell:?}, {c_cell:?}), skipped"),
        }
    }
    Ok(records)
}

/// Maps column names to positions. A repeated name resolves to its last column.
fn header_map(headers: &StringRecord) -> HashMap<&str, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (name, idx))
        .collect()
}

fn row_efficiency(substrate: &str, cost: &str) -> Option<EfficiencyRecord> {
    let s = substrate.trim().parse::<f64>().ok()?;
    let c = cost.trim().parse::<f64>().ok()?;
    if c == 0.0 {
        return None;
    }
    let eff = round_to(s * EFFICIENCY_MULTIPLIER / c, 4);
    if !eff.is_finite() {
        return None;
    }
    Some(EfficiencyRecord { s, c, eff })
}
