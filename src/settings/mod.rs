//! Public site settings: the shared store and the task that keeps it fresh.

pub mod refetch;
pub mod store;

pub use refetch::{RefetchHandle, RefetchPolicy, RefetchTrigger, spawn_refetch_task};
pub use store::{FetchOutcome, SettingsSnapshot, SettingsStore};
