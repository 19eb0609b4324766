use shelf_types::{Isbn, RecordError, StudentId};

/// Errors produced by ledger operations.
///
/// Every variant is recoverable: the caller reports it and carries on.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LendingError {
    #[error("book not found: {0}")]
    BookNotFound(Isbn),

    #[error("student not found: {0}")]
    StudentNotFound(StudentId),

    #[error("book {0} is already issued")]
    AlreadyIssued(Isbn),

    #[error("book {isbn} is already reserved by student {by}")]
    AlreadyReserved { isbn: Isbn, by: StudentId },

    #[error("student {0} already has a book issued")]
    StudentAlreadyHoldingBook(StudentId),

    #[error("book {0} is not issued")]
    NotIssued(Isbn),

    #[error("a book with ISBN {0} already exists")]
    DuplicateBook(Isbn),

    #[error("a student with ID {0} already exists")]
    DuplicateStudent(StudentId),

    #[error("fine for book {0} exceeds the representable amount")]
    FineOverflow(Isbn),

    #[error("ledger state is inconsistent: {0}")]
    Inconsistent(String),

    #[error("ledger lock poisoned")]
    Poisoned,
}

impl LendingError {
    /// Returns `true` when a book or student key was absent.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::BookNotFound(_) | Self::StudentNotFound(_))
    }
}

impl From<RecordError> for LendingError {
    fn from(err: RecordError) -> Self {
        match err {
            RecordError::AlreadyIssued(isbn) => Self::AlreadyIssued(isbn),
            RecordError::AlreadyReserved { isbn, by } => Self::AlreadyReserved { isbn, by },
        }
    }
}

pub type LendingResult<T> = Result<T, LendingError>;
