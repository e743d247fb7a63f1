//! Sign-in, sign-up and session commands.

use std::fmt::Write as _;

use scholar_core::{SessionContext, SignUp, User};

use crate::cli::{GlobalOpts, LoginArgs, SignupArgs};
use crate::error::CliError;
use crate::output;

use super::util;

pub fn login(session: &mut SessionContext, args: LoginArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let password = util::password_or_prompt(args.password, "Password: ")?;
    let user = session.login(&args.email, &password)?;
    output::notice(&format!("Logged in as {}", user.full_name()), global.quiet);
    Ok(())
}

pub fn signup(session: &mut SessionContext, args: SignupArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let password = match args.password {
        Some(password) => password,
        None => {
            let first = rpassword::prompt_password("Password: ")?;
            let again = rpassword::prompt_password("Confirm password: ")?;
            if first != again {
                return Err(CliError::Validation {
                    field: "password".into(),
                    reason: "passwords do not match".into(),
                });
            }
            first
        }
    };
    let form = SignUp {
        first_name: args.first_name,
        last_name: args.last_name,
        email: args.email,
        password,
    };
    let user = session.sign_up(&form)?;
    output::notice(&format!("Account created; logged in as {}", user.full_name()), global.quiet);
    Ok(())
}

pub fn logout(session: &mut SessionContext, global: &GlobalOpts) -> Result<(), CliError> {
    let was_signed_in = session.is_authenticated();
    session.logout()?;
    output::notice(if was_signed_in { "Logged out" } else { "Not logged in" }, global.quiet);
    Ok(())
}

pub fn whoami(session: &SessionContext, global: &GlobalOpts) -> Result<(), CliError> {
    let user = session.require_user()?;
    let out = output::render_single(global.output, user, detail, |u| u.email.clone())?;
    output::print_output(&out, global.quiet);
    Ok(())
}

fn detail(user: &User) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Name:   {}", user.full_name());
    let _ = write!(out, "Email:  {}", user.email);
    out
}
