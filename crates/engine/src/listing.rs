#![forbid(unsafe_code)]

use jobtrack_core::{JobRecord, PairKey};
use std::collections::HashSet;

/// Keeps the first record of every case-insensitive (title, company) pair, in input order.
///
/// Fed with the store's listing order (most recent activity first), so the surviving entry of a
/// pair is the one touched last.
pub fn dedupe_by_pair(records: Vec<JobRecord>) -> Vec<JobRecord> {
    let mut seen = HashSet::<PairKey>::with_capacity(records.len());
    records
        .into_iter()
        .filter(|record| seen.insert(record.pair_key()))
        .collect()
}

pub fn encode_listing(records: &[JobRecord]) -> Result<String, serde_json::Error> {
    serde_json::to_string(records)
}

pub fn decode_listing(payload: &str) -> Result<Vec<JobRecord>, serde_json::Error> {
    serde_json::from_str(payload)
}
