use serde::{Deserialize, Serialize};

use crate::ids::StudentId;

/// A student patron. Holds at most one book at a time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    name: String,
    age: u32,
    id: StudentId,
    has_issued_book: bool,
}

impl Student {
    pub fn new(name: impl Into<String>, age: u32, id: StudentId) -> Self {
        Self {
            name: name.into(),
            age,
            id,
            has_issued_book: false,
        }
    }

    /// Rebuild a student with the loan flag, as read back from storage.
    pub fn restore(name: impl Into<String>, age: u32, id: StudentId, has_issued_book: bool) -> Self {
        Self {
            has_issued_book,
            ..Self::new(name, age, id)
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn age(&self) -> u32 {
        self.age
    }

    pub fn id(&self) -> StudentId {
        self.id
    }

    pub fn has_issued_book(&self) -> bool {
        self.has_issued_book
    }

    pub fn can_issue_book(&self) -> bool {
        !self.has_issued_book
    }

    pub fn issue_book(&mut self) {
        self.has_issued_book = true;
    }

    pub fn return_book(&mut self) {
        self.has_issued_book = false;
    }
}
