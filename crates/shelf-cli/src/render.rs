//! Text and JSON rendering of catalog listings and reports.

use std::io::Write;

use colored::Colorize;
use serde::Serialize;
use shelf_ledger::OverdueEntry;
use shelf_types::{Book, Student};

use crate::cli::OutputFormat;

fn yes_no(value: bool) -> &'static str {
    if value {
        "Yes"
    } else {
        "No"
    }
}

pub fn book_line(book: &Book) -> String {
    let reserved = book
        .reserved_by()
        .map_or_else(|| "No one".to_string(), |id| id.to_string());
    format!(
        "Title: {}, Author: {}, Pages: {}, ISBN: {}, Issued: {}, Reserved By Student With ID: {}",
        book.title().bold(),
        book.author(),
        book.page_count(),
        book.isbn(),
        yes_no(book.is_issued()),
        reserved,
    )
}

pub fn student_line(student: &Student) -> String {
    format!(
        "Student ID: {}, Name: {}, Age: {}, Has Issued Book: {}",
        student.id().to_string().yellow(),
        student.name(),
        student.age(),
        yes_no(student.has_issued_book()),
    )
}

pub fn overdue_line(entry: &OverdueEntry, currency: &str) -> String {
    let borrower = entry
        .borrower
        .map_or_else(|| "unknown".to_string(), |id| id.to_string());
    format!(
        "Overdue Book: {}, ISBN: {}, Borrower: {}, Days Overdue: {}, Fine: {} {}",
        entry.title.bold(),
        entry.isbn,
        borrower,
        entry.days_overdue,
        format!("{:.2}", entry.fine).red(),
        currency,
    )
}

pub fn write_books(out: &mut dyn Write, books: &[Book], format: &OutputFormat) -> anyhow::Result<()> {
    write_list(out, books, format, "No books in the library.", book_line)
}

pub fn write_students(out: &mut dyn Write, students: &[Student], format: &OutputFormat) -> anyhow::Result<()> {
    write_list(out, students, format, "No students registered.", student_line)
}

pub fn write_overdue(
    out: &mut dyn Write,
    entries: &[OverdueEntry],
    format: &OutputFormat,
    currency: &str,
) -> anyhow::Result<()> {
    write_list(out, entries, format, "No overdue books.", |e| overdue_line(e, currency))
}

fn write_list<T: Serialize>(
    out: &mut dyn Write,
    items: &[T],
    format: &OutputFormat,
    empty: &str,
    line: impl Fn(&T) -> String,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, items)?;
            writeln!(out)?;
        }
        OutputFormat::Text if items.is_empty() => writeln!(out, "{empty}")?,
        OutputFormat::Text => {
            for item in items {
                writeln!(out, "{}", line(item))?;
            }
        }
    }
    Ok(())
}
