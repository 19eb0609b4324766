use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::book::Book;
use crate::ids::{Isbn, StudentId};
use crate::student::Student;

/// An active issuance of one book.
///
/// `borrower` is `None` only for loans rebuilt from data that predates
/// borrower tracking; the ledger then cannot tell who holds the book.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loan {
    pub isbn: Isbn,
    pub borrower: Option<StudentId>,
    pub issued_at: DateTime<Utc>,
}

impl Loan {
    pub fn new(isbn: Isbn, borrower: StudentId, issued_at: DateTime<Utc>) -> Self {
        Self {
            isbn,
            borrower: Some(borrower),
            issued_at,
        }
    }

    /// Whole days elapsed since issuance: elapsed hours divided by 24,
    /// rounded down. Never negative.
    pub fn elapsed_days(&self, now: DateTime<Utc>) -> i64 {
        (now - self.issued_at).num_hours().max(0) / 24
    }
}

/// The complete persisted state of a library, in collection order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub books: Vec<Book>,
    pub students: Vec<Student>,
    pub loans: Vec<Loan>,
}

impl Snapshot {
    pub fn is_empty(&self) -> bool {
        self.books.is_empty() && self.students.is_empty() && self.loans.is_empty()
    }
}
