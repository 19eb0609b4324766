//! Lending ledger for Shelf.
//!
//! This crate is the heart of Shelf. It provides:
//! - `LedgerWriter` / `LedgerReader` trait boundaries
//! - `InMemoryLibrary`, the catalog of books and students plus active loans
//! - `FinePolicy` and the overdue report
//!
//! Invariants held after every operation:
//! - a loan exists for an ISBN iff that book is marked issued;
//! - a student holds at most one book;
//! - a failed operation leaves the ledger unchanged.

pub mod error;
pub mod memory;
pub mod overdue;
pub mod traits;

pub use error::{LendingError, LendingResult};
pub use memory::InMemoryLibrary;
pub use overdue::{FinePolicy, OverdueEntry};
pub use traits::{LedgerReader, LedgerWriter};
