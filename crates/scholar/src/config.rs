//! CLI configuration: thin wrapper around `scholar_config`.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides
//! (--api-url, --data-dir, --timeout, --insecure).

use std::time::Duration;

use scholar_core::{ConsoleConfig, TlsVerification};

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use scholar_config::{
    Config, Profile, config_path, keyring_entry_name, load_config, load_config_or_default,
    save_config,
};

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    config.profile_name(global.profile.as_deref())
}

/// Build the `ConsoleConfig` for this invocation.
///
/// An explicitly requested profile must exist. Without one, a missing
/// profile falls back to defaults so a fresh install talks to the local
/// backend.
pub fn build_console_config(global: &GlobalOpts) -> Result<ConsoleConfig, CliError> {
    let cfg = load_config_or_default();
    let name = active_profile_name(global, &cfg);

    let profile = match cfg.profiles.get(&name) {
        Some(profile) => profile.clone(),
        None if global.profile.is_some() => {
            let mut available: Vec<&str> = cfg.profiles.keys().map(String::as_str).collect();
            available.sort_unstable();
            return Err(CliError::ProfileNotFound {
                name,
                available: if available.is_empty() {
                    "(none)".into()
                } else {
                    available.join(", ")
                },
            });
        }
        None => Profile::default(),
    };

    let mut console = scholar_config::profile_to_console_config(&profile, &name, &cfg.defaults)?;
    apply_overrides(&mut console, global)?;
    Ok(console)
}

/// CLI flags take priority over profile values.
fn apply_overrides(console: &mut ConsoleConfig, global: &GlobalOpts) -> Result<(), CliError> {
    if let Some(ref raw) = global.api_url {
        console.api_url = raw.parse().map_err(|_| CliError::Validation {
            field: "api-url".into(),
            reason: format!("invalid URL: {raw}"),
        })?;
    }
    if let Some(ref dir) = global.data_dir {
        console.data_dir.clone_from(dir);
    }
    if let Some(secs) = global.timeout {
        if secs == 0 {
            return Err(CliError::Validation {
                field: "timeout".into(),
                reason: "must be at least 1 second".into(),
            });
        }
        console.timeout = Duration::from_secs(secs);
    }
    if global.insecure {
        console.tls = TlsVerification::DangerAcceptInvalid;
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::path::PathBuf;

    use clap::Parser;

    use super::*;
    use crate::cli::Cli;

    fn globals(args: &[&str]) -> GlobalOpts {
        let mut argv = vec!["scholar"];
        argv.extend_from_slice(args);
        argv.push("whoami");
        Cli::try_parse_from(argv).unwrap().global
    }

    fn base() -> ConsoleConfig {
        ConsoleConfig::new("http://localhost:5000".parse().unwrap(), PathBuf::from("/tmp/base"))
    }

    #[test]
    fn flags_override_profile_values() {
        let mut console = base();
        let global = globals(&[
            "--api-url",
            "https://school.example/api",
            "--data-dir",
            "/srv/scholar",
            "--timeout",
            "5",
            "-k",
        ]);
        apply_overrides(&mut console, &global).unwrap();

        assert_eq!(console.api_url.as_str(), "https://school.example/api");
        assert_eq!(console.data_dir, PathBuf::from("/srv/scholar"));
        assert_eq!(console.timeout, Duration::from_secs(5));
        assert_eq!(console.tls, TlsVerification::DangerAcceptInvalid);
    }

    #[test]
    fn absent_flags_leave_profile_untouched() {
        let mut console = base();
        apply_overrides(&mut console, &globals(&[])).unwrap();
        assert_eq!(console.api_url.as_str(), "http://localhost:5000/");
        assert_eq!(console.tls, TlsVerification::SystemDefaults);
    }

    #[test]
    fn bad_url_and_zero_timeout_are_rejected() {
        let mut console = base();
        assert!(apply_overrides(&mut console, &globals(&["--api-url", "not a url"])).is_err());
        assert!(apply_overrides(&mut console, &globals(&["--timeout", "0"])).is_err());
    }
}
