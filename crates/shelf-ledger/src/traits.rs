use chrono::{DateTime, Utc};
use shelf_types::{Book, Isbn, Loan, Snapshot, Student, StudentId};

use crate::error::LendingResult;
use crate::overdue::OverdueEntry;

/// Write boundary for lending operations.
pub trait LedgerWriter: Send + Sync {
    /// Add an available, unreserved book. Fails on a duplicate ISBN.
    fn add_book(&self, title: &str, author: &str, page_count: u32, isbn: Isbn)
        -> LendingResult<Book>;

    /// Add a student holding no book. Fails on a duplicate ID.
    fn add_student(&self, name: &str, age: u32, id: StudentId) -> LendingResult<Student>;

    /// Lend `isbn` to `student` and start its loan clock.
    fn issue_book(&self, student: StudentId, isbn: Isbn) -> LendingResult<Loan>;

    /// Close the loan on `isbn`, freeing both the book and its borrower.
    fn return_book(&self, isbn: Isbn) -> LendingResult<Loan>;

    /// Reserve `isbn` for `student`.
    fn reserve(&self, student: StudentId, isbn: Isbn) -> LendingResult<()>;
}

/// Read boundary for catalog queries and reports.
pub trait LedgerReader: Send + Sync {
    /// All books in insertion order.
    fn books(&self) -> LendingResult<Vec<Book>>;

    /// All students in insertion order.
    fn students(&self) -> LendingResult<Vec<Student>>;

    fn book(&self, isbn: Isbn) -> LendingResult<Option<Book>>;

    fn student(&self, id: StudentId) -> LendingResult<Option<Student>>;

    /// Active loans ordered by ISBN.
    fn loans(&self) -> LendingResult<Vec<Loan>>;

    /// Loans past the grace period as of `now`, ordered by ISBN.
    fn overdue_report_at(&self, now: DateTime<Utc>) -> LendingResult<Vec<OverdueEntry>>;

    /// Everything needed to persist and later rebuild the ledger.
    fn snapshot(&self) -> LendingResult<Snapshot>;
}
