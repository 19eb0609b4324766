use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use shelf_types::{Isbn, StudentId};

#[derive(Parser)]
#[command(
    name = "shelf",
    about = "Shelf: library lending ledger for books and students",
    version,
)]
pub struct Cli {
    /// Action to run; starts the interactive menu when omitted
    #[command(subcommand)]
    pub command: Option<Command>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Path to a TOML config file (default: ./shelf.toml if present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding books.txt, students.txt and loans.txt
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Password for privileged one-shot commands
    #[arg(long, global = true)]
    pub password: Option<String>,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the interactive menu
    Menu,
    /// Add a book to the catalog (requires password)
    AddBook(AddBookArgs),
    /// Register a student (requires password)
    AddStudent(AddStudentArgs),
    /// Issue a book to a student
    Issue(LendArgs),
    /// Return an issued book
    Return(ReturnArgs),
    /// Reserve a book for a student
    Reserve(LendArgs),
    /// List all books
    Books,
    /// List all students (requires password)
    Students,
    /// Show overdue loans and their fines
    Overdue,
}

impl Command {
    /// Whether the command changes the library and must be saved.
    pub fn mutates(&self) -> bool {
        matches!(
            self,
            Self::AddBook(_) | Self::AddStudent(_) | Self::Issue(_) | Self::Return(_) | Self::Reserve(_)
        )
    }
}

#[derive(Args)]
pub struct AddBookArgs {
    #[arg(long)]
    pub title: String,
    #[arg(long)]
    pub author: String,
    #[arg(long)]
    pub pages: u32,
    #[arg(long)]
    pub isbn: Isbn,
}

#[derive(Args)]
pub struct AddStudentArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub age: u32,
    #[arg(long)]
    pub id: StudentId,
}

#[derive(Args)]
pub struct LendArgs {
    #[arg(long)]
    pub student: StudentId,
    #[arg(long)]
    pub isbn: Isbn,
}

#[derive(Args)]
pub struct ReturnArgs {
    #[arg(long)]
    pub isbn: Isbn,
}
