//! Types describing what a tar decoder yields.

pub mod entry;

pub use entry::ArchiveEntry;
pub use entry::EntryKind;
