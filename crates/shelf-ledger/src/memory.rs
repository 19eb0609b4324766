use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use shelf_types::{Book, Clock, Isbn, Loan, Snapshot, Student, StudentId, SystemClock};
use tracing::{debug, warn};

use crate::error::{LendingError, LendingResult};
use crate::overdue::{FinePolicy, OverdueEntry};
use crate::traits::{LedgerReader, LedgerWriter};

/// In-memory lending ledger.
///
/// Books and students keep their insertion order for listing, with a key
/// index alongside for lookup. Loans are keyed by ISBN.
pub struct InMemoryLibrary {
    clock: Arc<dyn Clock>,
    policy: FinePolicy,
    inner: RwLock<LibraryState>,
}

impl std::fmt::Debug for InMemoryLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryLibrary")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

#[derive(Default)]
struct LibraryState {
    books: Vec<Book>,
    book_index: HashMap<Isbn, usize>,
    students: Vec<Student>,
    student_index: HashMap<StudentId, usize>,
    loans: BTreeMap<Isbn, Loan>,
}

impl LibraryState {
    fn book_position(&self, isbn: Isbn) -> LendingResult<usize> {
        self.book_index
            .get(&isbn)
            .copied()
            .ok_or(LendingError::BookNotFound(isbn))
    }

    fn student_position(&self, id: StudentId) -> LendingResult<usize> {
        self.student_index
            .get(&id)
            .copied()
            .ok_or(LendingError::StudentNotFound(id))
    }

    fn insert_book(&mut self, book: Book) -> LendingResult<()> {
        let isbn = book.isbn();
        if self.book_index.contains_key(&isbn) {
            return Err(LendingError::DuplicateBook(isbn));
        }
        self.book_index.insert(isbn, self.books.len());
        self.books.push(book);
        Ok(())
    }

    fn insert_student(&mut self, student: Student) -> LendingResult<()> {
        let id = student.id();
        if self.student_index.contains_key(&id) {
            return Err(LendingError::DuplicateStudent(id));
        }
        self.student_index.insert(id, self.students.len());
        self.students.push(student);
        Ok(())
    }

    fn insert_loan(&mut self, loan: Loan) -> LendingResult<()> {
        let position = self.book_index.get(&loan.isbn).copied().ok_or_else(|| {
            LendingError::Inconsistent(format!("loan for unknown book {}", loan.isbn))
        })?;
        if !self.books[position].is_issued() {
            return Err(LendingError::Inconsistent(format!(
                "loan for book {} which is not issued",
                loan.isbn
            )));
        }
        if let Some(borrower) = loan.borrower {
            if !self.student_index.contains_key(&borrower) {
                return Err(LendingError::Inconsistent(format!(
                    "loan for book {} names unknown student {borrower}",
                    loan.isbn
                )));
            }
        }
        let isbn = loan.isbn;
        if self.loans.insert(isbn, loan).is_some() {
            return Err(LendingError::Inconsistent(format!(
                "more than one loan for book {isbn}"
            )));
        }
        Ok(())
    }

    /// Every recorded borrower is a known student marked as holding a book,
    /// and no student borrows more than one.
    fn check_borrowers(&self) -> LendingResult<()> {
        let mut seen = HashSet::new();
        for loan in self.loans.values() {
            let Some(borrower) = loan.borrower else {
                continue;
            };
            let position = self.student_position(borrower).map_err(|_| {
                LendingError::Inconsistent(format!("loan names unknown student {borrower}"))
            })?;
            if self.students[position].can_issue_book() {
                return Err(LendingError::Inconsistent(format!(
                    "student {borrower} borrowed {} but is not marked as holding a book",
                    loan.isbn
                )));
            }
            if !seen.insert(borrower) {
                return Err(LendingError::Inconsistent(format!(
                    "student {borrower} is recorded as borrowing more than one book"
                )));
            }
        }
        Ok(())
    }

    fn is_recorded_borrower(&self, id: StudentId) -> bool {
        self.loans.values().any(|loan| loan.borrower == Some(id))
    }
}

impl InMemoryLibrary {
    /// An empty library on the system clock with the default fine policy.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// An empty library reading time from `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            policy: FinePolicy::default(),
            inner: RwLock::new(LibraryState::default()),
        }
    }

    /// Replace the fine policy.
    pub fn with_policy(mut self, policy: FinePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Rebuild a library from persisted state.
    ///
    /// Duplicate keys, loans that do not match an issued book, and borrowers
    /// that are not marked as holding or hold more than one loan are
    /// rejected. An issued book with no loan record (data written before
    /// loans were persisted) gets a loan starting now with no known
    /// borrower.
    pub fn from_snapshot(
        snapshot: Snapshot,
        clock: Arc<dyn Clock>,
        policy: FinePolicy,
    ) -> LendingResult<Self> {
        let mut state = LibraryState::default();
        for book in snapshot.books {
            state.insert_book(book)?;
        }
        for student in snapshot.students {
            state.insert_student(student)?;
        }
        for loan in snapshot.loans {
            state.insert_loan(loan)?;
        }

        let unrecorded: Vec<Isbn> = state
            .books
            .iter()
            .filter(|b| b.is_issued() && !state.loans.contains_key(&b.isbn()))
            .map(Book::isbn)
            .collect();
        if !unrecorded.is_empty() {
            let now = clock.now();
            for isbn in unrecorded {
                warn!(%isbn, "issued book has no loan record; starting its loan now");
                state.loans.insert(
                    isbn,
                    Loan {
                        isbn,
                        borrower: None,
                        issued_at: now,
                    },
                );
            }
        }
        state.check_borrowers()?;

        debug!(
            books = state.books.len(),
            students = state.students.len(),
            loans = state.loans.len(),
            "library restored"
        );

        Ok(Self {
            clock,
            policy,
            inner: RwLock::new(state),
        })
    }

    pub fn policy(&self) -> &FinePolicy {
        &self.policy
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Loans past the grace period as of the ledger clock's current time.
    pub fn overdue_report(&self) -> LendingResult<Vec<OverdueEntry>> {
        self.overdue_report_at(self.clock.now())
    }

    /// Check the cross-record invariants: a loan exists iff its book is
    /// issued, and every recorded borrower is marked as holding exactly one
    /// book.
    pub fn verify(&self) -> LendingResult<()> {
        let state = self.read()?;
        for book in &state.books {
            if book.is_issued() != state.loans.contains_key(&book.isbn()) {
                return Err(LendingError::Inconsistent(format!(
                    "book {} issued={} but loan recorded={}",
                    book.isbn(),
                    book.is_issued(),
                    !book.is_issued()
                )));
            }
        }
        for loan in state.loans.values() {
            state.book_position(loan.isbn).map_err(|_| {
                LendingError::Inconsistent(format!("loan for unknown book {}", loan.isbn))
            })?;
        }
        state.check_borrowers()
    }

    fn read(&self) -> LendingResult<RwLockReadGuard<'_, LibraryState>> {
        self.inner.read().map_err(|_| LendingError::Poisoned)
    }

    fn write(&self) -> LendingResult<RwLockWriteGuard<'_, LibraryState>> {
        self.inner.write().map_err(|_| LendingError::Poisoned)
    }
}

impl Default for InMemoryLibrary {
    fn default() -> Self {
        Self::new()
    }
}

impl LedgerWriter for InMemoryLibrary {
    fn add_book(
        &self,
        title: &str,
        author: &str,
        page_count: u32,
        isbn: Isbn,
    ) -> LendingResult<Book> {
        let mut state = self.write()?;
        let book = Book::new(title, author, page_count, isbn);
        state.insert_book(book.clone())?;
        debug!(%isbn, title, "book added");
        Ok(book)
    }

    fn add_student(&self, name: &str, age: u32, id: StudentId) -> LendingResult<Student> {
        let mut state = self.write()?;
        let student = Student::new(name, age, id);
        state.insert_student(student.clone())?;
        debug!(%id, name, "student added");
        Ok(student)
    }

    fn issue_book(&self, student: StudentId, isbn: Isbn) -> LendingResult<Loan> {
        let mut state = self.write()?;
        let s = state.student_position(student)?;
        let b = state.book_position(isbn)?;

        if !state.students[s].can_issue_book() {
            return Err(LendingError::StudentAlreadyHoldingBook(student));
        }
        state.books[b].issue(student)?;
        state.students[s].issue_book();

        let loan = Loan::new(isbn, student, self.clock.now());
        state.loans.insert(isbn, loan.clone());
        debug!(%isbn, %student, issued_at = %loan.issued_at, "book issued");
        Ok(loan)
    }

    fn return_book(&self, isbn: Isbn) -> LendingResult<Loan> {
        let mut state = self.write()?;
        let b = state.book_position(isbn)?;
        let loan = state
            .loans
            .get(&isbn)
            .cloned()
            .ok_or(LendingError::NotIssued(isbn))?;

        state.books[b].return_book();

        let holder = loan
            .borrower
            .and_then(|id| state.student_index.get(&id).copied())
            .or_else(|| {
                // Unknown borrower: release the first holder not tied to another loan.
                warn!(%isbn, "loan has no recorded borrower; releasing first holding student");
                state
                    .students
                    .iter()
                    .position(|s| s.has_issued_book() && !state.is_recorded_borrower(s.id()))
            });
        if let Some(s) = holder {
            state.students[s].return_book();
        }

        state.loans.remove(&isbn);
        debug!(%isbn, borrower = ?loan.borrower, "book returned");
        Ok(loan)
    }

    fn reserve(&self, student: StudentId, isbn: Isbn) -> LendingResult<()> {
        let mut state = self.write()?;
        state.student_position(student)?;
        let b = state.book_position(isbn)?;
        state.books[b].reserve(student)?;
        debug!(%isbn, %student, "book reserved");
        Ok(())
    }
}

impl LedgerReader for InMemoryLibrary {
    fn books(&self) -> LendingResult<Vec<Book>> {
        Ok(self.read()?.books.clone())
    }

    fn students(&self) -> LendingResult<Vec<Student>> {
        Ok(self.read()?.students.clone())
    }

    fn book(&self, isbn: Isbn) -> LendingResult<Option<Book>> {
        let state = self.read()?;
        Ok(state.book_index.get(&isbn).map(|&i| state.books[i].clone()))
    }

    fn student(&self, id: StudentId) -> LendingResult<Option<Student>> {
        let state = self.read()?;
        Ok(state
            .student_index
            .get(&id)
            .map(|&i| state.students[i].clone()))
    }

    fn loans(&self) -> LendingResult<Vec<Loan>> {
        Ok(self.read()?.loans.values().cloned().collect())
    }

    fn overdue_report_at(&self, now: DateTime<Utc>) -> LendingResult<Vec<OverdueEntry>> {
        let state = self.read()?;
        let mut report = Vec::new();
        for loan in state.loans.values() {
            let elapsed = loan.elapsed_days(now);
            if !self.policy.is_overdue(elapsed) {
                continue;
            }
            let book = state
                .book_index
                .get(&loan.isbn)
                .map(|&i| &state.books[i])
                .ok_or_else(|| {
                    LendingError::Inconsistent(format!("loan for unknown book {}", loan.isbn))
                })?;
            report.push(OverdueEntry {
                title: book.title().to_string(),
                isbn: loan.isbn,
                borrower: loan.borrower,
                issued_at: loan.issued_at,
                days_overdue: self.policy.days_overdue(elapsed),
                fine: self
                    .policy
                    .fine_for(elapsed)
                    .ok_or(LendingError::FineOverflow(loan.isbn))?,
            });
        }
        Ok(report)
    }

    fn snapshot(&self) -> LendingResult<Snapshot> {
        let state = self.read()?;
        Ok(Snapshot {
            books: state.books.clone(),
            students: state.students.clone(),
            loans: state.loans.values().cloned().collect(),
        })
    }
}
