use serde::{Deserialize, Serialize};

use crate::error::RecordError;
use crate::ids::{Isbn, StudentId};

/// One physical title and its lending status.
///
/// `issued` and `reserved_by` are independent flags. A reservation blocks
/// every other student from borrowing the book; the reserving student may
/// still borrow it, which consumes the reservation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    title: String,
    author: String,
    page_count: u32,
    isbn: Isbn,
    issued: bool,
    reserved_by: Option<StudentId>,
}

impl Book {
    /// A new, available, unreserved book.
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        page_count: u32,
        isbn: Isbn,
    ) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            page_count,
            isbn,
            issued: false,
            reserved_by: None,
        }
    }

    /// Rebuild a book with its lending flags, as read back from storage.
    pub fn restore(
        title: impl Into<String>,
        author: impl Into<String>,
        page_count: u32,
        isbn: Isbn,
        issued: bool,
        reserved_by: Option<StudentId>,
    ) -> Self {
        Self {
            issued,
            reserved_by,
            ..Self::new(title, author, page_count, isbn)
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    pub fn isbn(&self) -> Isbn {
        self.isbn
    }

    pub fn is_issued(&self) -> bool {
        self.issued
    }

    pub fn reserved_by(&self) -> Option<StudentId> {
        self.reserved_by
    }

    /// Check whether `requester` could borrow this book right now.
    pub fn check_issue(&self, requester: StudentId) -> Result<(), RecordError> {
        if let Some(by) = self.reserved_by.filter(|by| *by != requester) {
            return Err(RecordError::AlreadyReserved {
                isbn: self.isbn,
                by,
            });
        }
        if self.issued {
            return Err(RecordError::AlreadyIssued(self.isbn));
        }
        Ok(())
    }

    /// Mark the book as issued to `requester`.
    ///
    /// A reservation held by `requester` is consumed, not enforced against
    /// them. Only a reservation by another student refuses the issue.
    pub fn issue(&mut self, requester: StudentId) -> Result<(), RecordError> {
        self.check_issue(requester)?;
        self.issued = true;
        self.reserved_by = None;
        Ok(())
    }

    /// Return the book: clears both the issued flag and any reservation.
    pub fn return_book(&mut self) {
        self.issued = false;
        self.reserved_by = None;
    }

    /// Reserve the book for `student`. Reserving twice for the same student
    /// is a no-op.
    pub fn reserve(&mut self, student: StudentId) -> Result<(), RecordError> {
        match self.reserved_by {
            Some(by) if by != student => Err(RecordError::AlreadyReserved {
                isbn: self.isbn,
                by,
            }),
            _ => {
                self.reserved_by = Some(student);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ISBN: Isbn = Isbn::new(9_780_000_000_001);

    fn book() -> Book {
        Book::new("Dune", "Frank Herbert", 412, ISBN)
    }

    #[test]
    fn new_book_is_available() {
        let b = book();
        assert_eq!(b.title(), "Dune");
        assert_eq!(b.author(), "Frank Herbert");
        assert_eq!(b.page_count(), 412);
        assert!(!b.is_issued());
        assert_eq!(b.reserved_by(), None);
    }

    #[test]
    fn issue_then_issue_again_fails() {
        let mut b = book();
        b.issue(StudentId::new(1)).unwrap();
        assert!(b.is_issued());
        assert_eq!(
            b.issue(StudentId::new(2)).unwrap_err(),
            RecordError::AlreadyIssued(ISBN)
        );
    }

    #[test]
    fn reservation_blocks_other_students() {
        let mut b = book();
        b.reserve(StudentId::new(2)).unwrap();
        assert_eq!(
            b.issue(StudentId::new(1)).unwrap_err(),
            RecordError::AlreadyReserved {
                isbn: ISBN,
                by: StudentId::new(2)
            }
        );
        assert!(!b.is_issued());
    }

    #[test]
    fn reserving_student_can_borrow_and_consumes_reservation() {
        let mut b = book();
        b.reserve(StudentId::new(2)).unwrap();
        b.issue(StudentId::new(2)).unwrap();
        assert!(b.is_issued());
        assert_eq!(b.reserved_by(), None);
    }

    #[test]
    fn reservation_takes_precedence_over_issued() {
        let mut b = book();
        b.issue(StudentId::new(1)).unwrap();
        b.reserve(StudentId::new(2)).unwrap();
        assert!(matches!(
            b.issue(StudentId::new(3)),
            Err(RecordError::AlreadyReserved { .. })
        ));
        assert_eq!(
            b.issue(StudentId::new(2)).unwrap_err(),
            RecordError::AlreadyIssued(ISBN)
        );
    }

    #[test]
    fn second_reservation_by_other_student_fails() {
        let mut b = book();
        b.reserve(StudentId::new(2)).unwrap();
        b.reserve(StudentId::new(2)).unwrap();
        assert!(matches!(
            b.reserve(StudentId::new(5)),
            Err(RecordError::AlreadyReserved { by, .. }) if by == StudentId::new(2)
        ));
    }

    #[test]
    fn return_clears_everything() {
        let mut b = book();
        b.issue(StudentId::new(1)).unwrap();
        b.reserve(StudentId::new(2)).unwrap();
        b.return_book();
        assert!(!b.is_issued());
        assert_eq!(b.reserved_by(), None);
    }

    #[test]
    fn restore_keeps_flags() {
        let b = Book::restore("T", "A", 1, ISBN, true, Some(StudentId::new(9)));
        assert!(b.is_issued());
        assert_eq!(b.reserved_by(), Some(StudentId::new(9)));
    }
}
