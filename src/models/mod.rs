pub mod log_entry;

pub use log_entry::{LogEntry, RecordId, StoredEntry, Supplement, UnknownSupplement};
