//! Interactive numbered menu over a loaded library.
//!
//! Every action either completes or reports a single error and returns to
//! the menu. End of input behaves like choosing Exit.

use std::io::{self, BufRead, Write};
use std::str::FromStr;

use colored::Colorize;
use shelf_ledger::{InMemoryLibrary, LedgerReader, LedgerWriter, LendingError};
use shelf_types::{Isbn, StudentId, TypeError};

use crate::auth::{Access, PasswordGate};
use crate::render;

const BANNER: &str = "***********************";
const BACK: &str = "/back";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    AddBook,
    AddStudent,
    Issue,
    Return,
    Reserve,
    ListBooks,
    ListStudents,
    Overdue,
    Exit,
}

impl Action {
    pub const ALL: [Action; 9] = [
        Action::AddBook,
        Action::AddStudent,
        Action::Issue,
        Action::Return,
        Action::Reserve,
        Action::ListBooks,
        Action::ListStudents,
        Action::Overdue,
        Action::Exit,
    ];

    pub fn from_choice(input: &str) -> Option<Self> {
        let n: usize = input.trim().parse().ok()?;
        Self::ALL.get(n.checked_sub(1)?).copied()
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::AddBook => "Add Book",
            Self::AddStudent => "Add Student",
            Self::Issue => "Issue Book",
            Self::Return => "Return Book",
            Self::Reserve => "Reserve Book",
            Self::ListBooks => "Display All Books",
            Self::ListStudents => "Display All Students",
            Self::Overdue => "Display Overdue Books",
            Self::Exit => "Exit",
        }
    }

    pub fn is_privileged(self) -> bool {
        matches!(self, Self::AddBook | Self::AddStudent | Self::ListStudents)
    }
}

#[derive(Debug, thiserror::Error)]
enum MenuError {
    #[error(transparent)]
    Lending(#[from] LendingError),

    #[error(transparent)]
    Input(#[from] TypeError),

    #[error("invalid {field}: {value:?} is not a non-negative integer")]
    Number { field: &'static str, value: String },

    #[error("input closed")]
    Closed,

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub struct Menu<'a, R, W> {
    library: &'a InMemoryLibrary,
    gate: &'a PasswordGate,
    currency: &'a str,
    input: R,
    output: W,
}

impl<'a, R: BufRead, W: Write> Menu<'a, R, W> {
    pub fn new(
        library: &'a InMemoryLibrary,
        gate: &'a PasswordGate,
        currency: &'a str,
        input: R,
        output: W,
    ) -> Self {
        Self {
            library,
            gate,
            currency,
            input,
            output,
        }
    }

    /// Run until the operator exits or input ends.
    pub fn run(&mut self) -> io::Result<()> {
        loop {
            self.print_menu()?;
            let Some(choice) = self.read_line()? else {
                return Ok(());
            };
            let Some(action) = Action::from_choice(&choice) else {
                writeln!(self.output, "Invalid choice, try again.")?;
                continue;
            };
            if action == Action::Exit {
                return Ok(());
            }
            tracing::debug!(?action, "menu action");
            match self.perform(action) {
                Ok(()) => {}
                Err(MenuError::Closed) => return Ok(()),
                Err(MenuError::Io(e)) => return Err(e),
                Err(e) => writeln!(self.output, "{} {e}", "Error:".red().bold())?,
            }
        }
    }

    fn print_menu(&mut self) -> io::Result<()> {
        writeln!(self.output, "\n{BANNER}\n{}\n{BANNER}", "Shelf Library".bold())?;
        for (i, action) in Action::ALL.iter().enumerate() {
            writeln!(self.output, "{}. {}", i + 1, action.label())?;
        }
        write!(self.output, "{BANNER}\nEnter Your Choice: ")?;
        self.output.flush()
    }

    fn perform(&mut self, action: Action) -> Result<(), MenuError> {
        if action.is_privileged() && !self.authorize()? {
            return Ok(());
        }
        match action {
            Action::AddBook => self.add_book(),
            Action::AddStudent => self.add_student(),
            Action::Issue => self.issue(),
            Action::Return => self.return_book(),
            Action::Reserve => self.reserve(),
            Action::ListBooks => self.list_books(),
            Action::ListStudents => self.list_students(),
            Action::Overdue => self.overdue(),
            Action::Exit => Ok(()),
        }
    }

    fn authorize(&mut self) -> Result<bool, MenuError> {
        if !self.gate.is_enabled() {
            writeln!(self.output, "No password is configured; this action is disabled.")?;
            return Ok(false);
        }
        let attempt = self.ask("Enter password: ")?;
        match self.gate.check(Some(&attempt)) {
            Access::Granted => Ok(true),
            Access::Denied | Access::Disabled => {
                writeln!(self.output, "Incorrect password.")?;
                Ok(false)
            }
        }
    }

    fn add_book(&mut self) -> Result<(), MenuError> {
        let Some(title) = self.ask_or_back("Enter Title")? else {
            return Ok(());
        };
        let author = self.ask("Enter Author: ")?;
        let pages = self.ask_number("Enter Page Count: ", "page count")?;
        let isbn: Isbn = self.ask_parsed("Enter ISBN: ")?;
        self.library.add_book(&title, &author, pages, isbn)?;
        writeln!(self.output, "{} The book has been added to the database.", "✓".green())?;
        Ok(())
    }

    fn add_student(&mut self) -> Result<(), MenuError> {
        let Some(name) = self.ask_or_back("Enter Name")? else {
            return Ok(());
        };
        let age = self.ask_number("Enter Age: ", "age")?;
        let id: StudentId = self.ask_parsed("Enter Student ID: ")?;
        self.library.add_student(&name, age, id)?;
        writeln!(self.output, "{} The student has been added to the database.", "✓".green())?;
        Ok(())
    }

    fn issue(&mut self) -> Result<(), MenuError> {
        let Some(raw) = self.ask_or_back("Enter Student ID")? else {
            return Ok(());
        };
        let student = StudentId::from_str(&raw)?;
        let isbn: Isbn = self.ask_parsed("Enter book ISBN: ")?;
        self.library.issue_book(student, isbn)?;
        writeln!(
            self.output,
            "{} The book with ISBN: {isbn} has been issued to student with ID: {student}.",
            "✓".green()
        )?;
        Ok(())
    }

    fn return_book(&mut self) -> Result<(), MenuError> {
        let Some(raw) = self.ask_or_back("Enter Book ISBN to Return")? else {
            return Ok(());
        };
        let isbn = Isbn::from_str(&raw)?;
        let loan = self.library.return_book(isbn)?;
        let by = loan
            .borrower
            .map_or_else(|| "a student".to_string(), |id| format!("student with ID: {id}"));
        writeln!(
            self.output,
            "{} The book with ISBN: {isbn} has been returned by {by}.",
            "✓".green()
        )?;
        Ok(())
    }

    fn reserve(&mut self) -> Result<(), MenuError> {
        let Some(raw) = self.ask_or_back("Enter Student ID")? else {
            return Ok(());
        };
        let student = StudentId::from_str(&raw)?;
        let isbn: Isbn = self.ask_parsed("Enter ISBN of the book to reserve: ")?;
        self.library.reserve(student, isbn)?;
        writeln!(
            self.output,
            "{} The book with ISBN: {isbn} has been reserved by student with ID: {student}.",
            "✓".green()
        )?;
        Ok(())
    }

    fn list_books(&mut self) -> Result<(), MenuError> {
        let books = self.library.books()?;
        writeln!(self.output, "All books in the library:")?;
        if books.is_empty() {
            writeln!(self.output, "No books in the library.")?;
        }
        for book in &books {
            writeln!(self.output, "{}", render::book_line(book))?;
        }
        Ok(())
    }

    fn list_students(&mut self) -> Result<(), MenuError> {
        let students = self.library.students()?;
        writeln!(self.output, "All registered students:")?;
        if students.is_empty() {
            writeln!(self.output, "No students registered.")?;
        }
        for student in &students {
            writeln!(self.output, "{}", render::student_line(student))?;
        }
        Ok(())
    }

    fn overdue(&mut self) -> Result<(), MenuError> {
        let report = self.library.overdue_report()?;
        writeln!(self.output, "All overdue books:")?;
        if report.is_empty() {
            writeln!(self.output, "No overdue books.")?;
        }
        for entry in &report {
            writeln!(self.output, "{}", render::overdue_line(entry, self.currency))?;
        }
        Ok(())
    }

    /// First prompt of an action; `/back` cancels it.
    fn ask_or_back(&mut self, label: &str) -> Result<Option<String>, MenuError> {
        let answer = self.ask(&format!("{label} (or {BACK} to return to main menu): "))?;
        if answer == BACK {
            writeln!(self.output, "Returning to main menu...")?;
            return Ok(None);
        }
        Ok(Some(answer))
    }

    fn ask_parsed<T>(&mut self, prompt: &str) -> Result<T, MenuError>
    where
        T: FromStr<Err = TypeError>,
    {
        Ok(self.ask(prompt)?.parse::<T>()?)
    }

    fn ask_number(&mut self, prompt: &str, field: &'static str) -> Result<u32, MenuError> {
        let value = self.ask(prompt)?;
        value
            .parse::<u32>()
            .map_err(|_| MenuError::Number { field, value })
    }

    fn ask(&mut self, prompt: &str) -> Result<String, MenuError> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;
        self.read_line()?.ok_or(MenuError::Closed)
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::sync::Arc;

    use chrono::{Duration, TimeZone, Utc};
    use shelf_types::ManualClock;

    use super::*;

    const X: Isbn = Isbn::new(9_780_000_000_001);

    struct Harness {
        library: InMemoryLibrary,
        clock: Arc<ManualClock>,
        gate: PasswordGate,
    }

    impl Harness {
        fn new() -> Self {
            colored::control::set_override(false);
            let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 4, 1, 12, 0, 0).unwrap()));
            Self {
                library: InMemoryLibrary::with_clock(clock.clone()),
                clock,
                gate: PasswordGate::new(Some("secret".into())),
            }
        }

        fn run(&self, script: &str) -> String {
            let mut out = Vec::new();
            Menu::new(&self.library, &self.gate, "zł", Cursor::new(script), &mut out)
                .run()
                .unwrap();
            String::from_utf8(out).unwrap()
        }

        fn seed(&self) {
            self.library.add_book("Dune", "Frank Herbert", 412, X).unwrap();
            self.library.add_student("Ada", 19, StudentId::new(1)).unwrap();
            self.library.add_student("Alan", 22, StudentId::new(2)).unwrap();
        }
    }

    #[test]
    fn choice_parsing() {
        assert_eq!(Action::from_choice("1"), Some(Action::AddBook));
        assert_eq!(Action::from_choice(" 9 "), Some(Action::Exit));
        assert_eq!(Action::from_choice("0"), None);
        assert_eq!(Action::from_choice("10"), None);
        assert_eq!(Action::from_choice("two"), None);
    }

    #[test]
    fn add_book_and_student_with_password() {
        let h = Harness::new();
        let out = h.run(
            "1\nsecret\nDune\nFrank Herbert\n412\n9780000000001\n\
             2\nsecret\nAda Lovelace\n19\n1\n9\n",
        );
        assert!(out.contains("The book has been added to the database."));
        assert!(out.contains("The student has been added to the database."));
        let book = h.library.book(X).unwrap().unwrap();
        assert_eq!(book.author(), "Frank Herbert");
        assert_eq!(h.library.student(StudentId::new(1)).unwrap().unwrap().name(), "Ada Lovelace");
    }

    #[test]
    fn wrong_password_blocks_privileged_actions() {
        let h = Harness::new();
        let out = h.run("1\nnope\n7\nnope\n9\n");
        assert_eq!(out.matches("Incorrect password.").count(), 2);
        assert!(h.library.books().unwrap().is_empty());
        assert!(!out.contains("All registered students:"));
    }

    #[test]
    fn unconfigured_password_disables_privileged_actions() {
        let mut h = Harness::new();
        h.gate = PasswordGate::new(None);
        let out = h.run("2\n9\n");
        assert!(out.contains("this action is disabled"));
    }

    #[test]
    fn back_returns_to_menu() {
        let h = Harness::new();
        h.seed();
        let out = h.run("3\n/back\n1\nsecret\n/back\n9\n");
        assert_eq!(out.matches("Returning to main menu...").count(), 2);
        assert!(h.library.loans().unwrap().is_empty());
    }

    #[test]
    fn issue_twice_reports_error_and_continues() {
        let h = Harness::new();
        h.seed();
        let out = h.run("3\n1\n9780000000001\n3\n1\n9780000000001\n6\n9\n");
        assert!(out.contains("has been issued to student with ID: 1."));
        assert!(out.contains("Error: student 1 already has a book issued"));
        assert!(out.contains("Issued: Yes"));
    }

    #[test]
    fn reserve_then_issue_by_other_student_fails() {
        let h = Harness::new();
        h.seed();
        let out = h.run("5\n2\n9780000000001\n3\n1\n9780000000001\n9\n");
        assert!(out.contains("has been reserved by student with ID: 2."));
        assert!(out.contains("Error: book 9780000000001 is already reserved by student 2"));
        assert!(!h.library.book(X).unwrap().unwrap().is_issued());
    }

    #[test]
    fn return_and_overdue() {
        let h = Harness::new();
        h.seed();
        h.library.issue_book(StudentId::new(1), X).unwrap();
        h.clock.advance(Duration::days(16));

        let out = h.run("8\n4\n9780000000001\n4\n9780000000001\n8\n9\n");
        assert!(out.contains("Overdue Book: Dune, ISBN: 9780000000001, Borrower: 1, Days Overdue: 1, Fine: 0.50 zł"));
        assert!(out.contains("has been returned by student with ID: 1."));
        assert!(out.contains("Error: book 9780000000001 is not issued"));
        assert!(out.contains("No overdue books."));
    }

    #[test]
    fn invalid_input_is_reported() {
        let h = Harness::new();
        h.seed();
        let out = h.run("abc\n4\n12345\n1\nsecret\nT\nA\nmany\n9\n");
        assert!(out.contains("Invalid choice, try again."));
        assert!(out.contains("Error: ISBN must be a 13-digit number"));
        assert!(out.contains("Error: invalid page count: \"many\""));
        assert_eq!(h.library.books().unwrap().len(), 1);
    }

    #[test]
    fn end_of_input_exits_cleanly() {
        let h = Harness::new();
        h.seed();
        let out = h.run("3\n1\n");
        assert!(out.contains("Enter book ISBN: "));
        assert!(h.library.loans().unwrap().is_empty());
    }

    #[test]
    fn list_students_after_password() {
        let h = Harness::new();
        h.seed();
        let out = h.run("7\nsecret\n9\n");
        assert!(out.contains("Student ID: 1, Name: Ada, Age: 19, Has Issued Book: No"));
        assert!(out.contains("Student ID: 2, Name: Alan"));
    }
}
