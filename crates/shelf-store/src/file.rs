//! Flat-file snapshot store.
//!
//! Each collection lives in its own file. Loading reads every line in
//! order and stops at the first malformed one; saving encodes everything
//! first and then overwrites the three files.

use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use shelf_types::{Book, Loan, Snapshot, Student};
use tracing::{debug, info};

use crate::codec::LineCodec;
use crate::error::{StoreError, StoreResult};
use crate::traits::SnapshotStore;

/// Snapshot store backed by three line-oriented text files.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileStore {
    books: PathBuf,
    students: PathBuf,
    loans: PathBuf,
}

impl FileStore {
    pub const BOOKS_FILE: &'static str = "books.txt";
    pub const STUDENTS_FILE: &'static str = "students.txt";
    pub const LOANS_FILE: &'static str = "loans.txt";

    /// A store using the default file names inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            books: dir.join(Self::BOOKS_FILE),
            students: dir.join(Self::STUDENTS_FILE),
            loans: dir.join(Self::LOANS_FILE),
        }
    }

    /// A store with explicit paths for each file.
    pub fn new(books: impl Into<PathBuf>, students: impl Into<PathBuf>, loans: impl Into<PathBuf>) -> Self {
        Self {
            books: books.into(),
            students: students.into(),
            loans: loans.into(),
        }
    }

    pub fn books_path(&self) -> &Path {
        &self.books
    }

    pub fn students_path(&self) -> &Path {
        &self.students
    }

    pub fn loans_path(&self) -> &Path {
        &self.loans
    }
}

impl SnapshotStore for FileStore {
    fn load(&self) -> StoreResult<Snapshot> {
        let snapshot = Snapshot {
            books: read_records::<Book>(&self.books)?,
            students: read_records::<Student>(&self.students)?,
            loans: read_records::<Loan>(&self.loans)?,
        };
        info!(
            books = snapshot.books.len(),
            students = snapshot.students.len(),
            loans = snapshot.loans.len(),
            "loaded library"
        );
        Ok(snapshot)
    }

    fn save(&self, snapshot: &Snapshot) -> StoreResult<()> {
        // Encode up front so an unstorable record leaves every file untouched.
        let books = encode_all(&snapshot.books)?;
        let students = encode_all(&snapshot.students)?;
        let loans = encode_all(&snapshot.loans)?;

        write_lines(&self.books, &books)?;
        write_lines(&self.students, &students)?;
        write_lines(&self.loans, &loans)?;
        info!(
            books = books.len(),
            students = students.len(),
            loans = loans.len(),
            "saved library"
        );
        Ok(())
    }
}

fn read_records<T: LineCodec>(path: &Path) -> StoreResult<Vec<T>> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no data file, starting empty");
            return Ok(Vec::new());
        }
        Err(e) => return Err(StoreError::io(path, e)),
    };

    let mut records = Vec::new();
    for (index, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(|e| StoreError::io(path, e))?;
        if line.trim().is_empty() {
            continue;
        }
        let record = T::decode(&line).map_err(|e| e.at(path, index + 1))?;
        records.push(record);
    }
    debug!(path = %path.display(), count = records.len(), kind = T::KIND, "read records");
    Ok(records)
}

fn encode_all<T: LineCodec>(records: &[T]) -> StoreResult<Vec<String>> {
    records.iter().map(T::encode).collect()
}

fn write_lines(path: &Path, lines: &[String]) -> StoreResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
    }
    let file = File::create(path).map_err(|e| StoreError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    for line in lines {
        writeln!(writer, "{line}").map_err(|e| StoreError::io(path, e))?;
    }
    writer.flush().map_err(|e| StoreError::io(path, e))
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use shelf_types::{Isbn, StudentId};

    use super::*;

    fn sample() -> Snapshot {
        let isbn = Isbn::new(9_780_000_000_001);
        let mut book = Book::new("Dune", "Frank Herbert", 412, isbn);
        book.issue(StudentId::new(1)).unwrap();
        let mut ada = Student::new("Ada", 19, StudentId::new(1));
        ada.issue_book();
        Snapshot {
            books: vec![book, Book::new("Emma", "Jane Austen", 474, Isbn::new(9_780_141_439_587))],
            students: vec![ada, Student::new("Alan", 22, StudentId::new(2))],
            loans: vec![Loan::new(
                isbn,
                StudentId::new(1),
                Utc.with_ymd_and_hms(2024, 1, 10, 8, 30, 0).unwrap(),
            )],
        }
    }

    #[test]
    fn missing_files_load_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::in_dir(dir.path());
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::in_dir(dir.path().join("data"));
        let snapshot = sample();

        store.save(&snapshot).unwrap();
        assert_eq!(store.load().unwrap(), snapshot);

        let books = fs::read_to_string(store.books_path()).unwrap();
        assert_eq!(
            books,
            "Dune|Frank Herbert|412|9780000000001|1|-1\nEmma|Jane Austen|474|9780141439587|0|-1\n"
        );
    }

    #[test]
    fn save_overwrites_previous_contents() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::in_dir(dir.path());
        store.save(&sample()).unwrap();
        store.save(&Snapshot::default()).unwrap();

        assert!(store.load().unwrap().is_empty());
        assert_eq!(fs::read_to_string(store.students_path()).unwrap(), "");
    }

    #[test]
    fn blank_lines_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::in_dir(dir.path());
        fs::write(store.students_path(), "Ada|19|1|0\n\n  \nAlan|22|2|0\n").unwrap();
        assert_eq!(store.load().unwrap().students.len(), 2);
    }

    #[test]
    fn malformed_line_fails_fast_with_location() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::in_dir(dir.path());
        fs::write(store.books_path(), "Dune|Herbert|412|9780000000001|0|-1\nBroken|line\n").unwrap();

        let err = store.load().unwrap_err();
        match &err {
            StoreError::Format { path, line, kind, .. } => {
                assert_eq!(path, store.books_path());
                assert_eq!(*line, 2);
                assert_eq!(*kind, "book");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.is_format());
    }

    #[test]
    fn unencodable_record_leaves_files_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::in_dir(dir.path());
        store.save(&sample()).unwrap();

        let mut bad = sample();
        bad.students.push(Student::new("Pipe|Name", 30, StudentId::new(3)));
        assert!(matches!(store.save(&bad), Err(StoreError::Unencodable { .. })));
        assert_eq!(store.load().unwrap(), sample());
    }

    #[test]
    fn explicit_paths() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(
            dir.path().join("b.db"),
            dir.path().join("s.db"),
            dir.path().join("l.db"),
        );
        store.save(&sample()).unwrap();
        assert!(dir.path().join("l.db").exists());
        assert_eq!(store.load().unwrap().loans.len(), 1);
    }
}
