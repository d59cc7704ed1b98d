//! Archive ingestion shared by every storage backend
//!
//! The ingestor turns an uploaded zip into a validated sequence of
//! `(relative_path, contents)` pairs. It performs no I/O of its own; the
//! backends only ever see paths that already passed the escape check.

mod ingestor;
mod upload;

pub use ingestor::{
    ArchiveEntry, ArchiveError, ArchiveIngestor, Entries, IngestedArchive, DEFAULT_MAX_ENTRY_BYTES,
};
pub use upload::ArchiveUpload;
