use thiserror::Error;

use crate::ids::{Isbn, StudentId};

/// Errors produced when parsing identity keys from user input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypeError {
    #[error("ISBN must be a 13-digit number, got {0:?}")]
    InvalidIsbn(String),

    #[error("invalid {field}: {value:?} is not a non-negative integer")]
    InvalidNumber { field: &'static str, value: String },
}

/// Errors produced by the lending verbs on a single record.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("book {0} is already issued")]
    AlreadyIssued(Isbn),

    #[error("book {isbn} is already reserved by student {by}")]
    AlreadyReserved { isbn: Isbn, by: StudentId },
}
