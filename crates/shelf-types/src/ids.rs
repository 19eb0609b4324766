//! Identity keys for books and students.
//!
//! Both keys are thin newtypes over unsigned integers. Parsing from user
//! text is strict (an ISBN must be exactly 13 ASCII digits); constructing
//! from a raw integer is not, so records loaded from disk keep whatever the
//! file holds.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// A 13-digit International Standard Book Number, stored as an integer.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Isbn(u64);

impl Isbn {
    /// Number of decimal digits in a well-formed ISBN.
    pub const DIGITS: usize = 13;

    /// Wrap a raw integer without validation.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw integer value.
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Returns `true` if the value has exactly [`Isbn::DIGITS`] digits.
    pub fn is_well_formed(self) -> bool {
        (1_000_000_000_000..10_000_000_000_000).contains(&self.0)
    }
}

impl FromStr for Isbn {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.len() != Self::DIGITS || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(TypeError::InvalidIsbn(s.to_string()));
        }
        let raw = trimmed
            .parse::<u64>()
            .map_err(|_| TypeError::InvalidIsbn(s.to_string()))?;
        let isbn = Self(raw);
        // A leading zero parses but is not a 13-digit integer.
        if !isbn.is_well_formed() {
            return Err(TypeError::InvalidIsbn(s.to_string()));
        }
        Ok(isbn)
    }
}

impl fmt::Debug for Isbn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Isbn({})", self.0)
    }
}

impl fmt::Display for Isbn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of a student patron.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StudentId(u32);

impl StudentId {
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u32 {
        self.0
    }
}

impl FromStr for StudentId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u32>()
            .map(Self)
            .map_err(|_| TypeError::InvalidNumber {
                field: "student id",
                value: s.to_string(),
            })
    }
}

impl fmt::Debug for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StudentId({})", self.0)
    }
}

impl fmt::Display for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
