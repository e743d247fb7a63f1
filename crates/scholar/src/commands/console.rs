//! Interactive console: one process, one `Console`, many commands.
//!
//! Keeps every manager alive between commands, so the local teacher list,
//! the last-known course and student caches, and the per-list search and
//! sort survive until the operator exits.

use std::io::IsTerminal;

use clap::{Parser, Subcommand, ValueEnum};
use dialoguer::Input;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use scholar_core::projection::toggle_sort;
use scholar_core::{CatalogSummary, Console, RosterSummary, SessionContext};

use crate::cli::{CoursesArgs, GlobalOpts, StudentsArgs, TeachersArgs};
use crate::error::CliError;
use crate::output;

use super::util::{self, ViewState};
use super::{auth, courses, students, teachers};

// ── Console grammar ─────────────────────────────────────────────────

#[derive(Debug, Parser)]
#[command(
    name = "scholar>",
    no_binary_name = true,
    disable_version_flag = true
)]
struct Line {
    #[command(subcommand)]
    command: ConsoleCommand,
}

#[derive(Debug, Subcommand)]
enum ConsoleCommand {
    /// Manage the course catalog
    #[command(alias = "c")]
    Courses(CoursesArgs),

    /// Manage the student roster
    #[command(alias = "s")]
    Students(StudentsArgs),

    /// Manage teachers
    #[command(alias = "t")]
    Teachers(TeachersArgs),

    /// Toggle sorting of a list by a column
    Sort { list: ListKind, column: String },

    /// Set the search term of a list (omit to clear)
    Search { list: ListKind, term: Option<String> },

    /// Reload courses and students from the backend
    Refresh,

    /// Show record counts
    Summary,

    /// Show the signed-in operator
    Whoami,

    /// Sign out and leave the console
    Logout,

    /// Leave the console
    #[command(alias = "quit")]
    Exit,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ListKind {
    Courses,
    Students,
    Teachers,
}

enum Flow {
    Continue,
    Exit,
}

// ── Line input ──────────────────────────────────────────────────────

/// Prompted input on a terminal, plain lines otherwise.
enum LineSource {
    Terminal,
    Piped(Lines<BufReader<Stdin>>),
}

impl LineSource {
    fn detect() -> Self {
        if std::io::stdin().is_terminal() {
            Self::Terminal
        } else {
            Self::Piped(BufReader::new(tokio::io::stdin()).lines())
        }
    }

    /// Next line, or `None` at end of input.
    async fn next(&mut self) -> Result<Option<String>, CliError> {
        match self {
            Self::Terminal => {
                let read = tokio::task::spawn_blocking(|| {
                    Input::<String>::new()
                        .with_prompt("scholar")
                        .allow_empty(true)
                        .interact_text()
                })
                .await
                .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
                match read {
                    Ok(line) => Ok(Some(line)),
                    Err(e) => {
                        tracing::debug!(error = %e, "prompt closed");
                        Ok(None)
                    }
                }
            }
            Self::Piped(lines) => Ok(lines.next_line().await?),
        }
    }
}

/// Split a console line into words. Single or double quotes group words
/// and a backslash escapes the next character.
fn tokenize(line: &str) -> Result<Vec<String>, String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;
    let mut chars = line.chars();

    while let Some(ch) = chars.next() {
        match (quote, ch) {
            (_, '\\') => {
                let escaped = chars.next().ok_or("dangling escape at end of line")?;
                current.push(escaped);
                in_word = true;
            }
            (Some(q), c) if c == q => quote = None,
            (Some(_), c) => current.push(c),
            (None, '\'' | '"') => {
                quote = Some(ch);
                in_word = true;
            }
            (None, c) if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            (None, c) => {
                current.push(c);
                in_word = true;
            }
        }
    }

    if let Some(q) = quote {
        return Err(format!("unterminated {q} quote"));
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}

// ── Loop ────────────────────────────────────────────────────────────

pub async fn run(console: &Console, session: &mut SessionContext, global: &GlobalOpts) -> Result<(), CliError> {
    let operator = session.require_user()?.full_name();
    output::notice(
        &format!("Signed in as {operator}. Type `help` for commands, `exit` to leave."),
        global.quiet,
    );

    if let Err(err) = util::with_spinner("Loading courses and students", global, console.refresh_all()).await {
        report(CliError::from(err));
    }

    let mut view = ViewState::default();
    let mut input = LineSource::detect();

    while let Some(raw) = input.next().await? {
        let words = match tokenize(&raw) {
            Ok(words) if words.is_empty() => continue,
            Ok(words) => words,
            Err(reason) => {
                eprintln!("error: {reason}");
                continue;
            }
        };
        let command = match Line::try_parse_from(&words) {
            Ok(line) => line.command,
            Err(e) => {
                let _ = e.print();
                continue;
            }
        };
        match execute(command, console, session, global, &mut view).await {
            Ok(Flow::Continue) => {}
            Ok(Flow::Exit) => break,
            Err(err) => report(err),
        }
    }
    Ok(())
}

/// Failures inside the console are shown and the loop continues.
fn report(err: CliError) {
    eprintln!("{:?}", miette::Report::new(err));
}

async fn execute(
    command: ConsoleCommand,
    console: &Console,
    session: &mut SessionContext,
    global: &GlobalOpts,
    view: &mut ViewState,
) -> Result<Flow, CliError> {
    match command {
        ConsoleCommand::Courses(args) => courses::handle(console, args, global, &mut view.courses).await?,
        ConsoleCommand::Students(args) => students::handle(console, args, global, &mut view.students).await?,
        ConsoleCommand::Teachers(args) => teachers::handle(console, args, global, &mut view.teachers).await?,

        ConsoleCommand::Sort { list, column } => {
            let state = match list {
                ListKind::Courses => {
                    toggle_sort(&mut view.courses.sort, util::parse_sort_field(&column)?);
                    view.courses.sort.map(|s| (s.field.to_string(), s.direction))
                }
                ListKind::Students => {
                    toggle_sort(&mut view.students.sort, util::parse_sort_field(&column)?);
                    view.students.sort.map(|s| (s.field.to_string(), s.direction))
                }
                ListKind::Teachers => {
                    toggle_sort(&mut view.teachers.sort, util::parse_sort_field(&column)?);
                    view.teachers.sort.map(|s| (s.field.to_string(), s.direction))
                }
            };
            if let Some((field, direction)) = state {
                output::notice(&format!("Sorting by {field} ({direction})"), global.quiet);
            }
        }

        ConsoleCommand::Search { list, term } => {
            let term = term.unwrap_or_default();
            match list {
                ListKind::Courses => view.courses.search.clone_from(&term),
                ListKind::Students => view.students.search.clone_from(&term),
                ListKind::Teachers => view.teachers.search.clone_from(&term),
            }
            if term.is_empty() {
                output::notice("Search cleared", global.quiet);
            } else {
                output::notice(&format!("Searching for '{term}'"), global.quiet);
            }
        }

        ConsoleCommand::Refresh => {
            util::with_spinner("Loading courses and students", global, console.refresh_all()).await?;
            output::notice("Courses and students reloaded", global.quiet);
        }

        ConsoleCommand::Summary => {
            let catalog = CatalogSummary::from_courses(&console.courses().snapshot());
            let roster = RosterSummary::from_students(&console.students().snapshot());
            let lines = [
                format!("Courses:   {}", catalog.total),
                format!(
                    "Students:  {} ({} active, {} inactive)",
                    roster.total,
                    roster.active,
                    roster.inactive()
                ),
                format!("Teachers:  {}", console.teachers().len()),
            ];
            output::print_output(&lines.join("\n"), global.quiet);
            util::warn_stale(console.courses(), global);
            util::warn_stale(console.students(), global);
        }

        ConsoleCommand::Whoami => auth::whoami(session, global)?,

        ConsoleCommand::Logout => {
            auth::logout(session, global)?;
            return Ok(Flow::Exit);
        }

        ConsoleCommand::Exit => return Ok(Flow::Exit),
    }
    Ok(Flow::Continue)
}
