#![forbid(unsafe_code)]

pub mod ids;
pub mod model;
pub mod pair;
pub mod status;

pub use ids::{JobId, JobIdError, OwnerId, OwnerIdError};
pub use model::{JobChanges, JobInput, JobPatch, JobRecord, NewJob};
pub use pair::PairKey;
pub use status::{IllegalTransition, JobStatus, UnknownStatus};
