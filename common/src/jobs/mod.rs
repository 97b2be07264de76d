use serde::{Deserialize, Serialize};

/// Lifecycle of a background job (e.g. a full-sheet geocode reprocess).
/// `InProgress` carries a 0-100 percentage; `Completed` and `Failed` carry a
/// human-readable message.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum JobStatus {
    Pending,
    InProgress(u32),
    Completed(String),
    Failed(String),
}
