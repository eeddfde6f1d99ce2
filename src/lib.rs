// Enforce at crate level
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]
#![allow(clippy::significant_drop_tightening)]

//! Searchable email exports
//!
//! Renames exported Outlook messages (`.eml`, `.ics`) after their subject and
//! stamps sender, subject, recipient and sent date onto the file's metadata,
//! so desktop search tools can find them without opening them.
//!
//! # Pipeline
//!
//! - [`extract`] reads one file into a [`MessageRecord`], falling back to raw
//!   line scans whenever the structured header read comes back empty
//! - [`rename`] moves the file to `<subject>.<ext>`, resolving collisions
//! - a [`MetadataWriter`] attaches document properties and creation time
//! - [`process_tree`] runs all of the above over a folder tree
//!
//! # Example
//!
//! ```no_run
//! use eml_searchable::{NoopMetadata, WalkConfig, process_tree};
//! use std::path::Path;
//!
//! let report = process_tree(Path::new("archive/eml"), &WalkConfig::default(), &NoopMetadata)
//!     .unwrap();
//! println!("{report}");
//! ```

mod date;
mod decode;
mod error;
mod metadata;
mod parser;
mod pst;
mod rename;
pub mod scan;
mod subject;
mod types;
mod walker;

pub use date::{clean_sent_date, parse_sent_date};
pub use decode::{charset_for_label, decode_encoded_words, decode_file_text, header_bytes_to_text};
pub use error::{Error, Result};
pub use metadata::{
    AUTHOR_XATTR, COMMENT_XATTR, MetadataWriter, NoopMetadata, PlatformMetadata, TITLE_XATTR,
};
pub use parser::extract;
pub use pst::{DEFAULT_TOOL, PstExtractor};
pub use rename::{
    MAX_COLLISION_SUFFIX, MAX_NAME_BYTES, MAX_PATH_LEN, RenameOptions, incremental_filename, rename,
    target_path,
};
pub use subject::{EMPTY_SUBJECT, NO_SUBJECT, decode_subject, sanitize, strip_reply_prefixes};
pub use types::*;
pub use walker::{FileOutcome, WalkConfig, process_file, process_tree};
