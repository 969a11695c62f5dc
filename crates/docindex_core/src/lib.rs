//! Docindex core: pure record model and transformer.
mod record;
mod transform;

pub use record::{CandidateRecord, Hierarchy, VersionSpec, Weight, HIERARCHY_LEVELS};
pub use transform::{item_priority, transform, MalformedRecordError, NormalizedDocument};
