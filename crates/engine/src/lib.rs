#![forbid(unsafe_code)]

//! Consistency rules around job records: duplicate detection, the status lifecycle, and the
//! read-through listing cache kept coherent with the store.

mod config;
mod detector;
mod engine;
mod error;
mod listing;

pub use config::EngineConfig;
pub use detector::{DuplicateCheck, DuplicateDetector, assess_latest_match};
pub use engine::{JobLifecycleEngine, UpdateOutcome};
pub use error::{EngineError, ErrorKind};
pub use listing::{decode_listing, dedupe_by_pair, encode_listing};
