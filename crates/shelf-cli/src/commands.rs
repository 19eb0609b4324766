use std::io::{self, BufRead, Write};
use std::sync::Arc;

use anyhow::{bail, Context};
use colored::Colorize;
use shelf_ledger::{LedgerReader, LedgerWriter};
use shelf_store::SnapshotStore;
use shelf_types::{Clock, SystemClock};

use crate::auth::{Access, PasswordGate};
use crate::cli::*;
use crate::config::ShelfConfig;
use crate::menu::Menu;
use crate::render;
use crate::session::Session;

pub fn run_command(cli: Cli, out: &mut dyn Write) -> anyhow::Result<()> {
    let config = ShelfConfig::resolve(&cli)?;
    run_with(cli, &config, config.store(), Arc::new(SystemClock), out)
}

/// Load the library from `store`, run one command, and save when it changed.
pub fn run_with<S: SnapshotStore>(
    cli: Cli,
    config: &ShelfConfig,
    store: S,
    clock: Arc<dyn Clock>,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let session = Session::open(store, clock, config.fine_policy())?;
    let gate = PasswordGate::new(config.password.clone());
    let command = cli.command.unwrap_or(Command::Menu);
    let mutates = command.mutates();
    let attempt = cli.password.as_deref();
    let library = &session.library;

    match command {
        Command::Menu => {
            return run_menu(&session, &gate, &config.currency, io::stdin().lock(), out);
        }
        Command::AddBook(args) => {
            authorize(&gate, attempt)?;
            let book = library.add_book(&args.title, &args.author, args.pages, args.isbn)?;
            writeln!(out, "{} Added book {} ({})", "✓".green().bold(), book.title().bold(), book.isbn())?;
        }
        Command::AddStudent(args) => {
            authorize(&gate, attempt)?;
            let student = library.add_student(&args.name, args.age, args.id)?;
            writeln!(out, "{} Added student {} ({})", "✓".green().bold(), student.name().bold(), student.id())?;
        }
        Command::Issue(args) => {
            let loan = library.issue_book(args.student, args.isbn)?;
            writeln!(
                out,
                "{} Issued {} to student {} at {}",
                "✓".green().bold(),
                loan.isbn.to_string().yellow(),
                args.student,
                loan.issued_at.to_rfc3339(),
            )?;
        }
        Command::Return(args) => {
            let loan = library.return_book(args.isbn)?;
            let by = loan.borrower.map_or_else(|| "unknown".to_string(), |id| id.to_string());
            writeln!(out, "{} Returned {} (borrower: {by})", "✓".green().bold(), args.isbn.to_string().yellow())?;
        }
        Command::Reserve(args) => {
            library.reserve(args.student, args.isbn)?;
            writeln!(
                out,
                "{} Reserved {} for student {}",
                "✓".green().bold(),
                args.isbn.to_string().yellow(),
                args.student,
            )?;
        }
        Command::Books => render::write_books(out, &library.books()?, &cli.format)?,
        Command::Students => {
            authorize(&gate, attempt)?;
            render::write_students(out, &library.students()?, &cli.format)?;
        }
        Command::Overdue => {
            let report = library.overdue_report()?;
            render::write_overdue(out, &report, &cli.format, &config.currency)?;
        }
    }

    if mutates {
        session.save()?;
    }
    Ok(())
}

/// Run the interactive menu, then save whatever it changed even when the
/// console failed part way.
fn run_menu<S: SnapshotStore, R: BufRead>(
    session: &Session<S>,
    gate: &PasswordGate,
    currency: &str,
    input: R,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let outcome = Menu::new(&session.library, gate, currency, input, out).run();
    session.save()?;
    outcome.context("console input or output failed")
}

fn authorize(gate: &PasswordGate, attempt: Option<&str>) -> anyhow::Result<()> {
    match gate.check(attempt) {
        Access::Granted => Ok(()),
        Access::Denied => bail!("incorrect password"),
        Access::Disabled => bail!("no password is configured; privileged commands are disabled"),
    }
}
