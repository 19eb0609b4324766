//! Line codec for Shelf records.
//!
//! Each record type maps to exactly one line with a fixed field order.
//! Decoding is strict: the field count must match, numbers must parse,
//! flags must be `0` or `1`, and the only negative number accepted is the
//! `-1` "nobody" sentinel for student references.

use chrono::{DateTime, SecondsFormat, Utc};
use shelf_types::{Book, Isbn, Loan, Student, StudentId};

use crate::error::{StoreError, StoreResult};

/// Field separator.
pub const DELIMITER: char = '|';

/// Encoding of an absent student reference.
const NOBODY: i64 = -1;

/// A record that round-trips through one delimited line.
pub trait LineCodec: Sized {
    /// Record name used in error messages.
    const KIND: &'static str;
    /// Number of fields on a line.
    const FIELDS: usize;

    /// Encode the record as a line, without the trailing newline.
    fn encode(&self) -> StoreResult<String>;

    /// Decode a record from one line. A trailing `\r` is ignored.
    fn decode(line: &str) -> StoreResult<Self>;
}

impl LineCodec for Book {
    const KIND: &'static str = "book";
    const FIELDS: usize = 6;

    fn encode(&self) -> StoreResult<String> {
        Ok(join(&[
            text::<Self>("title", self.title())?,
            text::<Self>("author", self.author())?,
            self.page_count().to_string().as_str(),
            self.isbn().to_string().as_str(),
            flag(self.is_issued()),
            student_ref(self.reserved_by()).as_str(),
        ]))
    }

    fn decode(line: &str) -> StoreResult<Self> {
        let f = split::<Self>(line)?;
        Ok(Book::restore(
            f[0],
            f[1],
            number::<Self, u32>("page count", f[2])?,
            isbn::<Self>(f[3])?,
            parse_flag::<Self>("issued flag", f[4])?,
            parse_student_ref::<Self>("reserved by", f[5])?,
        ))
    }
}

impl LineCodec for Student {
    const KIND: &'static str = "student";
    const FIELDS: usize = 4;

    fn encode(&self) -> StoreResult<String> {
        Ok(join(&[
            text::<Self>("name", self.name())?,
            self.age().to_string().as_str(),
            self.id().to_string().as_str(),
            flag(self.has_issued_book()),
        ]))
    }

    fn decode(line: &str) -> StoreResult<Self> {
        let f = split::<Self>(line)?;
        Ok(Student::restore(
            f[0],
            number::<Self, u32>("age", f[1])?,
            StudentId::new(number::<Self, u32>("student id", f[2])?),
            parse_flag::<Self>("issued flag", f[3])?,
        ))
    }
}

impl LineCodec for Loan {
    const KIND: &'static str = "loan";
    const FIELDS: usize = 3;

    fn encode(&self) -> StoreResult<String> {
        Ok(join(&[
            self.isbn.to_string().as_str(),
            student_ref(self.borrower).as_str(),
            self.issued_at
                .to_rfc3339_opts(SecondsFormat::AutoSi, true)
                .as_str(),
        ]))
    }

    fn decode(line: &str) -> StoreResult<Self> {
        let f = split::<Self>(line)?;
        let issued_at = DateTime::parse_from_rfc3339(f[2])
            .map_err(|e| StoreError::malformed(Self::KIND, format!("issued at {:?}: {e}", f[2])))?
            .with_timezone(&Utc);
        Ok(Loan {
            isbn: isbn::<Self>(f[0])?,
            borrower: parse_student_ref::<Self>("borrower", f[1])?,
            issued_at,
        })
    }
}

fn join(fields: &[&str]) -> String {
    let mut line = String::new();
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            line.push(DELIMITER);
        }
        line.push_str(field);
    }
    line
}

fn split<T: LineCodec>(line: &str) -> StoreResult<Vec<&str>> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    let fields: Vec<&str> = line.split(DELIMITER).collect();
    if fields.len() != T::FIELDS {
        return Err(StoreError::malformed(
            T::KIND,
            format!("expected {} fields, found {}", T::FIELDS, fields.len()),
        ));
    }
    Ok(fields)
}

fn text<'a, T: LineCodec>(field: &'static str, value: &'a str) -> StoreResult<&'a str> {
    if value.contains([DELIMITER, '\n', '\r']) {
        return Err(StoreError::Unencodable {
            kind: T::KIND,
            field,
            value: value.to_string(),
        });
    }
    Ok(value)
}

fn number<T: LineCodec, N: std::str::FromStr>(field: &'static str, raw: &str) -> StoreResult<N> {
    raw.parse::<N>()
        .map_err(|_| StoreError::malformed(T::KIND, format!("{field} {raw:?} is not a valid number")))
}

fn isbn<T: LineCodec>(raw: &str) -> StoreResult<Isbn> {
    raw.parse::<Isbn>()
        .map_err(|e| StoreError::malformed(T::KIND, e.to_string()))
}

fn flag(value: bool) -> &'static str {
    if value {
        "1"
    } else {
        "0"
    }
}

fn parse_flag<T: LineCodec>(field: &'static str, raw: &str) -> StoreResult<bool> {
    match raw {
        "1" => Ok(true),
        "0" => Ok(false),
        other => Err(StoreError::malformed(
            T::KIND,
            format!("{field} must be 0 or 1, found {other:?}"),
        )),
    }
}

fn student_ref(id: Option<StudentId>) -> String {
    id.map_or(NOBODY, |id| i64::from(id.get())).to_string()
}

fn parse_student_ref<T: LineCodec>(field: &'static str, raw: &str) -> StoreResult<Option<StudentId>> {
    let value = number::<T, i64>(field, raw)?;
    if value == NOBODY {
        return Ok(None);
    }
    u32::try_from(value)
        .map(|id| Some(StudentId::new(id)))
        .map_err(|_| StoreError::malformed(T::KIND, format!("{field} {raw:?} is out of range")))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use proptest::prelude::*;

    use super::*;

    const ISBN: Isbn = Isbn::new(9_780_000_000_001);

    #[test]
    fn encode_book_field_order() {
        let book = Book::restore("Dune", "Frank Herbert", 412, ISBN, true, Some(StudentId::new(7)));
        assert_eq!(book.encode().unwrap(), "Dune|Frank Herbert|412|9780000000001|1|7");
    }

    #[test]
    fn encode_unreserved_book_uses_sentinel() {
        let book = Book::new("Dune", "Frank Herbert", 412, ISBN);
        assert_eq!(book.encode().unwrap(), "Dune|Frank Herbert|412|9780000000001|0|-1");
    }

    #[test]
    fn decode_book() {
        let book = Book::decode("Emma|Jane Austen|474|9780141439587|0|-1").unwrap();
        assert_eq!(book.title(), "Emma");
        assert_eq!(book.author(), "Jane Austen");
        assert_eq!(book.page_count(), 474);
        assert_eq!(book.isbn(), Isbn::new(9_780_141_439_587));
        assert!(!book.is_issued());
        assert_eq!(book.reserved_by(), None);
    }

    #[test]
    fn decode_student_with_crlf() {
        let student = Student::decode("Ada Lovelace|19|42|1\r").unwrap();
        assert_eq!(student.name(), "Ada Lovelace");
        assert_eq!(student.age(), 19);
        assert_eq!(student.id(), StudentId::new(42));
        assert!(student.has_issued_book());
    }

    #[test]
    fn encode_student() {
        let student = Student::new("Ada", 19, StudentId::new(42));
        assert_eq!(student.encode().unwrap(), "Ada|19|42|0");
    }

    #[test]
    fn loan_round_trip_keeps_subsecond_precision() {
        let at = Utc.with_ymd_and_hms(2024, 5, 2, 13, 4, 5).unwrap()
            + chrono::Duration::nanoseconds(123_456_789);
        let loan = Loan::new(ISBN, StudentId::new(3), at);
        let line = loan.encode().unwrap();
        assert!(line.starts_with("9780000000001|3|2024-05-02T13:04:05.123456789"));
        assert_eq!(Loan::decode(&line).unwrap(), loan);
    }

    #[test]
    fn decode_legacy_loan_without_borrower() {
        let loan = Loan::decode("9780000000001|-1|2024-05-02T13:04:05Z").unwrap();
        assert_eq!(loan.borrower, None);
    }

    #[test]
    fn wrong_field_count_is_rejected() {
        let err = Book::decode("Dune|Frank Herbert|412|9780000000001|0").unwrap_err();
        assert!(err.is_format());
        assert!(err.to_string().contains("expected 6 fields, found 5"));

        assert!(Student::decode("Ada|19|42|0|extra").is_err());
        assert!(Student::decode("").is_err());
    }

    #[test]
    fn non_numeric_fields_are_rejected() {
        let err = Book::decode("Dune|Herbert|many|9780000000001|0|-1").unwrap_err();
        assert!(matches!(err, StoreError::Malformed { kind: "book", .. }));
        assert!(Student::decode("Ada|nineteen|42|0").is_err());
        assert!(Student::decode("Ada|19|-3|0").is_err());
    }

    #[test]
    fn bad_flags_are_rejected() {
        assert!(Book::decode("Dune|Herbert|412|9780000000001|yes|-1").is_err());
        assert!(Student::decode("Ada|19|42|2").is_err());
    }

    #[test]
    fn negative_reservation_other_than_sentinel_is_rejected() {
        let err = Book::decode("Dune|Herbert|412|9780000000001|0|-2").unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn short_isbn_is_rejected() {
        let err = Book::decode("Dune|Herbert|412|12345|0|-1").unwrap_err();
        assert!(err.to_string().contains("13-digit"));
        assert!(Loan::decode("0780000000001|1|2024-05-02T13:04:05Z").is_err());
    }

    #[test]
    fn bad_timestamp_is_rejected() {
        assert!(Loan::decode("9780000000001|1|yesterday").is_err());
    }

    #[test]
    fn delimiter_in_text_field_refuses_to_encode() {
        let book = Book::new("Either|Or", "Kierkegaard", 600, ISBN);
        assert!(matches!(
            book.encode(),
            Err(StoreError::Unencodable { kind: "book", field: "title", .. })
        ));
        let student = Student::new("line\nbreak", 20, StudentId::new(1));
        assert!(student.encode().is_err());
    }

    fn text_field() -> impl Strategy<Value = String> {
        "[^|\r\n]{0,24}"
    }

    proptest! {
        #[test]
        fn book_round_trip(
            title in text_field(),
            author in text_field(),
            pages in any::<u32>(),
            isbn in 1_000_000_000_000u64..10_000_000_000_000,
            issued in any::<bool>(),
            reserved in proptest::option::of(any::<u32>()),
        ) {
            let book = Book::restore(
                title, author, pages, Isbn::new(isbn), issued, reserved.map(StudentId::new),
            );
            let line = book.encode().unwrap();
            prop_assert_eq!(Book::decode(&line).unwrap(), book);
        }

        #[test]
        fn loan_round_trip(
            isbn in 1_000_000_000_000u64..10_000_000_000_000,
            borrower in proptest::option::of(any::<u32>()),
            secs in 0i64..4_102_444_800,
            nanos in 0u32..1_000_000_000,
        ) {
            let loan = Loan {
                isbn: Isbn::new(isbn),
                borrower: borrower.map(StudentId::new),
                issued_at: Utc.timestamp_opt(secs, nanos).unwrap(),
            };
            let line = loan.encode().unwrap();
            prop_assert_eq!(Loan::decode(&line).unwrap(), loan);
        }

        #[test]
        fn student_round_trip(
            name in text_field(),
            age in any::<u32>(),
            id in any::<u32>(),
            issued in any::<bool>(),
        ) {
            let student = Student::restore(name, age, StudentId::new(id), issued);
            let line = student.encode().unwrap();
            prop_assert_eq!(Student::decode(&line).unwrap(), student);
        }
    }
}
