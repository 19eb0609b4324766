//! Foundation types for Shelf, the library lending ledger.
//!
//! Every other Shelf crate depends on `shelf-types`. The records here are
//! plain value holders; the invariants that span several records (one book
//! per student, one loan per issued book) are enforced by `shelf-ledger`.
//!
//! # Key Types
//!
//! - [`Isbn`] / [`StudentId`] - identity keys for books and students
//! - [`Book`] - one physical title with its lending flags
//! - [`Student`] - one patron with a single loan slot
//! - [`Loan`] - an active issuance: who borrowed what, and when
//! - [`Snapshot`] - the full persisted state of a library
//! - [`Clock`] - injectable wall clock ([`SystemClock`], [`ManualClock`])

pub mod book;
pub mod error;
pub mod ids;
pub mod loan;
pub mod student;
pub mod temporal;

pub use book::Book;
pub use error::{RecordError, TypeError};
pub use ids::{Isbn, StudentId};
pub use loan::{Loan, Snapshot};
pub use student::Student;
pub use temporal::{Clock, ManualClock, SystemClock};
