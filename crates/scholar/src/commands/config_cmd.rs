//! Config subcommand handlers.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use dialoguer::{Input, Select};
use serde::Serialize;

use scholar_config::{DEFAULT_API_URL, Defaults, KEYRING_SERVICE};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

// ── Helpers ─────────────────────────────────────────────────────────

/// Config as shown to the operator, with plaintext tokens masked.
#[derive(Serialize)]
struct RedactedConfig<'a> {
    default_profile: Option<&'a str>,
    defaults: &'a Defaults,
    profiles: BTreeMap<&'a str, Profile>,
}

impl<'a> From<&'a Config> for RedactedConfig<'a> {
    fn from(cfg: &'a Config) -> Self {
        let profiles = cfg
            .profiles
            .iter()
            .map(|(name, p)| {
                let mut p = p.clone();
                if p.api_token.is_some() {
                    p.api_token = Some("****".into());
                }
                (name.as_str(), p)
            })
            .collect();
        Self {
            default_profile: cfg.default_profile.as_deref(),
            defaults: &cfg.defaults,
            profiles,
        }
    }
}

fn format_config(cfg: &RedactedConfig<'_>) -> String {
    let mut out = String::new();

    if let Some(default) = cfg.default_profile {
        let _ = writeln!(out, "default_profile = \"{default}\"");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = writeln!(out, "color = \"{}\"", cfg.defaults.color);
    let _ = writeln!(out, "timeout = {}", cfg.defaults.timeout);

    for (name, p) in &cfg.profiles {
        let _ = writeln!(out);
        let _ = writeln!(out, "[profiles.{name}]");
        let _ = writeln!(out, "api_url = \"{}\"", p.api_url.as_deref().unwrap_or(DEFAULT_API_URL));
        if let Some(ref token) = p.api_token {
            let _ = writeln!(out, "api_token = \"{token}\"");
        }
        if let Some(ref env) = p.api_token_env {
            let _ = writeln!(out, "api_token_env = \"{env}\"");
        }
        if let Some(ref dir) = p.data_dir {
            let _ = writeln!(out, "data_dir = \"{}\"", dir.display());
        }
        if let Some(ref ca) = p.ca_cert {
            let _ = writeln!(out, "ca_cert = \"{}\"", ca.display());
        }
        if let Some(insecure) = p.insecure {
            let _ = writeln!(out, "insecure = {insecure}");
        }
        if let Some(timeout) = p.timeout {
            let _ = writeln!(out, "timeout = {timeout}");
        }
    }

    out.trim_end().to_owned()
}

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn keyring_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "keyring".into(),
        reason: format!("keyring unavailable: {e}"),
    }
}

fn store_token_in_keyring(profile_name: &str, token: &str) -> Result<(), CliError> {
    keyring::Entry::new(KEYRING_SERVICE, &config::keyring_entry_name(profile_name))
        .map_err(keyring_err)?
        .set_password(token)
        .map_err(keyring_err)
}

fn profile_not_found(cfg: &Config, name: String) -> CliError {
    let mut available: Vec<&str> = cfg.profiles.keys().map(String::as_str).collect();
    available.sort_unstable();
    CliError::ProfileNotFound {
        name,
        available: if available.is_empty() {
            "(none)".into()
        } else {
            available.join(", ")
        },
    }
}

/// Apply `config set <key> <value>` to a profile.
fn set_profile_value(profile: &mut Profile, key: &str, value: String) -> Result<(), CliError> {
    match key {
        "api_url" | "api-url" => {
            value.parse::<url::Url>().map_err(|_| CliError::Validation {
                field: "api_url".into(),
                reason: format!("invalid URL: {value}"),
            })?;
            profile.api_url = Some(value);
        }
        "api_token_env" | "api-token-env" => profile.api_token_env = Some(value),
        "data_dir" | "data-dir" => profile.data_dir = Some(value.into()),
        "ca_cert" | "ca-cert" => profile.ca_cert = Some(value.into()),
        "insecure" => {
            profile.insecure = Some(value.parse().map_err(|_| CliError::Validation {
                field: "insecure".into(),
                reason: "must be 'true' or 'false'".into(),
            })?);
        }
        "timeout" => {
            profile.timeout = Some(value.parse().map_err(|_| CliError::Validation {
                field: "timeout".into(),
                reason: "must be a number (seconds)".into(),
            })?);
        }
        other => {
            return Err(CliError::Validation {
                field: other.into(),
                reason: format!(
                    "unknown config key '{other}'. Valid keys: api_url, api_token_env, \
                     data_dir, ca_cert, insecure, timeout (use `config set-token` for tokens)"
                ),
            });
        }
    }
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init => init(),

        ConfigCommand::Show => {
            let cfg = config::load_config()?;
            let redacted = RedactedConfig::from(&cfg);
            let out = output::render_single(global.output, &redacted, format_config, |_| {
                config::config_path().display().to_string()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Set { key, value } => {
            let mut cfg = config::load_config_or_default();
            let profile_name = config::active_profile_name(global, &cfg);
            let profile = cfg.profiles.entry(profile_name.clone()).or_default();
            set_profile_value(profile, &key, value)?;
            config::save_config(&cfg)?;
            output::notice(&format!("Set {key} on profile '{profile_name}'"), global.quiet);
            Ok(())
        }

        ConfigCommand::SetToken { profile } => {
            let cfg = config::load_config_or_default();
            let profile_name = profile.unwrap_or_else(|| config::active_profile_name(global, &cfg));
            if !cfg.profiles.contains_key(&profile_name) {
                return Err(profile_not_found(&cfg, profile_name));
            }
            let token = rpassword::prompt_password("API token: ").map_err(prompt_err)?;
            if token.is_empty() {
                return Err(CliError::Validation {
                    field: "api_token".into(),
                    reason: "token cannot be empty".into(),
                });
            }
            store_token_in_keyring(&profile_name, &token)?;
            output::notice(&format!("Token for '{profile_name}' stored in system keyring"), global.quiet);
            Ok(())
        }

        ConfigCommand::Profiles => {
            let cfg = config::load_config_or_default();
            let default = cfg.profile_name(None);
            if cfg.profiles.is_empty() {
                output::notice("No profiles configured. Run: scholar config init", global.quiet);
            } else {
                let mut names: Vec<&String> = cfg.profiles.keys().collect();
                names.sort();
                let lines: Vec<String> = names
                    .into_iter()
                    .map(|name| {
                        let marker = if *name == default { " *" } else { "" };
                        format!("{name}{marker}")
                    })
                    .collect();
                output::print_output(&lines.join("\n"), global.quiet);
            }
            Ok(())
        }

        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config_or_default();
            if !cfg.profiles.contains_key(&name) {
                return Err(profile_not_found(&cfg, name));
            }
            cfg.default_profile = Some(name.clone());
            config::save_config(&cfg)?;
            output::notice(&format!("Default profile set to '{name}'"), global.quiet);
            Ok(())
        }
    }
}

/// Interactive wizard: one profile, written as the default.
fn init() -> Result<(), CliError> {
    let config_path = config::config_path();
    eprintln!("scholar configuration wizard");
    eprintln!("   Config path: {}\n", config_path.display());

    let profile_name: String = Input::new()
        .with_prompt("Profile name")
        .default("default".into())
        .interact_text()
        .map_err(prompt_err)?;

    let api_url: String = Input::new()
        .with_prompt("Backend URL")
        .default(DEFAULT_API_URL.into())
        .validate_with(|v: &String| v.parse::<url::Url>().map(|_| ()).map_err(|e| e.to_string()))
        .interact_text()
        .map_err(prompt_err)?;

    let choices = &[
        "No token (backend is open)",
        "Store a token in the system keyring (recommended)",
        "Save a token to the config file (plaintext)",
        "Read the token from an environment variable",
    ];
    let selection = Select::new()
        .with_prompt("API token")
        .items(choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    let mut profile = Profile {
        api_url: Some(api_url),
        ..Profile::default()
    };
    match selection {
        1 => {
            let token = rpassword::prompt_password("API token: ").map_err(prompt_err)?;
            store_token_in_keyring(&profile_name, &token)?;
            eprintln!("   Token stored in system keyring");
        }
        2 => {
            profile.api_token = Some(rpassword::prompt_password("API token: ").map_err(prompt_err)?);
        }
        3 => {
            let var: String = Input::new()
                .with_prompt("Variable name")
                .default("SCHOLAR_API_TOKEN".into())
                .interact_text()
                .map_err(prompt_err)?;
            profile.api_token_env = Some(var);
        }
        _ => {}
    }

    let mut cfg = config::load_config_or_default();
    cfg.profiles.insert(profile_name.clone(), profile);
    cfg.default_profile = Some(profile_name.clone());
    config::save_config(&cfg)?;

    eprintln!("\nConfiguration written to {}", config_path.display());
    eprintln!("  Active profile: {profile_name}");
    eprintln!("\n  Next: scholar signup --first-name <FIRST> --last-name <LAST> --email <EMAIL>");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_with_token() -> Config {
        let mut profiles = HashMap::new();
        profiles.insert(
            "campus".to_owned(),
            Profile {
                api_url: Some("https://campus.example".into()),
                api_token: Some("hunter2".into()),
                timeout: Some(10),
                ..Profile::default()
            },
        );
        Config {
            default_profile: Some("campus".into()),
            defaults: Defaults::default(),
            profiles,
        }
    }

    #[test]
    fn show_masks_plaintext_tokens() {
        let cfg = config_with_token();
        let redacted = RedactedConfig::from(&cfg);
        let text = format_config(&redacted);
        assert!(text.contains("[profiles.campus]"));
        assert!(text.contains("api_token = \"****\""));
        assert!(!text.contains("hunter2"));

        let json = serde_json::to_string(&redacted).unwrap();
        assert!(!json.contains("hunter2"));
    }

    #[test]
    fn set_validates_known_keys() {
        let mut profile = Profile::default();
        set_profile_value(&mut profile, "timeout", "12".into()).unwrap();
        set_profile_value(&mut profile, "data-dir", "/srv/scholar".into()).unwrap();
        assert_eq!(profile.timeout, Some(12));
        assert_eq!(profile.data_dir.as_deref(), Some(std::path::Path::new("/srv/scholar")));

        assert!(set_profile_value(&mut profile, "timeout", "soon".into()).is_err());
        assert!(set_profile_value(&mut profile, "api_url", "not a url".into()).is_err());
        assert!(set_profile_value(&mut profile, "password", "x".into()).is_err());
    }
}
