//! Command dispatch: bridges CLI args -> session / console -> output formatting.

pub mod auth;
pub mod config_cmd;
pub mod console;
pub mod courses;
pub mod students;
pub mod teachers;
pub mod util;

use scholar_core::{Console, ConsoleConfig, SessionContext};

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;
use crate::output;

/// Dispatch a session-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    config: &ConsoleConfig,
    session: &mut SessionContext,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Login(args) => auth::login(session, args, global),
        Command::Signup(args) => auth::signup(session, args, global),
        Command::Logout => auth::logout(session, global),
        Command::Whoami => auth::whoami(session, global),

        // Everything else needs a signed-in operator
        cmd => {
            session.require_user()?;
            let school = Console::new(config)?;
            let mut view = util::ViewState::default();

            match cmd {
                Command::Courses(args) => courses::handle(&school, args, global, &mut view.courses).await,
                Command::Students(args) => students::handle(&school, args, global, &mut view.students).await,
                Command::Teachers(args) => {
                    output::notice(
                        "note: teachers are kept for this invocation only; use `scholar console` to keep them",
                        global.quiet,
                    );
                    teachers::handle(&school, args, global, &mut view.teachers).await
                }
                Command::Console => console::run(&school, session, global).await,
                // Session, Config and Completions are handled earlier
                Command::Login(_)
                | Command::Signup(_)
                | Command::Logout
                | Command::Whoami
                | Command::Config(_)
                | Command::Completions(_) => unreachable!(),
            }
        }
    }
}
