//! Persistence for Shelf.
//!
//! A library is persisted as three flat text files, one record per line,
//! fields joined with `|`:
//!
//! ```text
//! books.txt     title|author|pageCount|isbn|issued(0/1)|reservedBy(-1 = none)
//! students.txt  name|age|studentId|issued(0/1)
//! loans.txt     isbn|borrower(-1 = unknown)|issuedAt(RFC 3339)
//! ```
//!
//! There is no escaping: text fields containing `|` or a line break cannot
//! be stored, and the encoder refuses them instead of corrupting the file.
//!
//! # Modules
//!
//! - [`codec`] - [`LineCodec`] for books, students, and loans
//! - [`traits`] - the [`SnapshotStore`] load/save boundary
//! - [`file`] - [`FileStore`], the flat-file backend
//! - [`memory`] - [`InMemoryStore`] for tests and embedding
//! - [`error`] - [`StoreError`]

pub mod codec;
pub mod error;
pub mod file;
pub mod memory;
pub mod traits;

pub use codec::{LineCodec, DELIMITER};
pub use error::{StoreError, StoreResult};
pub use file::FileStore;
pub use memory::InMemoryStore;
pub use traits::SnapshotStore;
