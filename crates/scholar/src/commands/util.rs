//! Shared helpers for command handlers.

use std::fmt::Display;
use std::future::Future;
use std::io::IsTerminal;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use strum::IntoEnumIterator;

use scholar_core::{
    CourseSortField, CoreError, Entity, EntityId, EntityManager, Query, SortDirection, SortState,
    StudentSortField, TeacherSortField,
};

use crate::cli::{GlobalOpts, ViewArgs};
use crate::error::CliError;
use crate::output;

// ── List view state ─────────────────────────────────────────────────

/// Search term and sort for one list. One-shot commands start from an
/// empty view; the console keeps views between commands.
#[derive(Debug, Clone)]
pub struct ListView<F> {
    pub search: String,
    pub sort: Option<SortState<F>>,
}

impl<F> Default for ListView<F> {
    fn default() -> Self {
        Self {
            search: String::new(),
            sort: None,
        }
    }
}

impl<F> ListView<F>
where
    F: Copy + PartialEq + FromStr + Display + IntoEnumIterator,
{
    /// Fold explicit flags into the view and return the resulting query.
    pub fn query(&mut self, args: &ViewArgs) -> Result<Query<F>, CliError> {
        if let Some(ref term) = args.search {
            self.search.clone_from(term);
        }
        if let Some(ref raw) = args.sort {
            self.sort = Some(SortState {
                field: parse_sort_field(raw)?,
                direction: if args.desc {
                    SortDirection::Desc
                } else {
                    SortDirection::Asc
                },
            });
        }
        Ok(Query {
            search: self.search.clone(),
            sort: self.sort,
        })
    }
}

/// Views for every list the console shows.
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    pub courses: ListView<CourseSortField>,
    pub students: ListView<StudentSortField>,
    pub teachers: ListView<TeacherSortField>,
}

/// Parse a sort column, listing the valid ones on failure.
pub fn parse_sort_field<F>(raw: &str) -> Result<F, CliError>
where
    F: FromStr + Display + IntoEnumIterator,
{
    raw.trim().parse().map_err(|_| CliError::Validation {
        field: "sort".into(),
        reason: format!(
            "unknown column '{raw}' (expected one of: {})",
            F::iter().map(|f| f.to_string()).collect::<Vec<_>>().join(", ")
        ),
    })
}

// ── Cache access ────────────────────────────────────────────────────

/// Resolve a user-supplied id against the manager's cache. The typed
/// text is matched as displayed, so a server key made of digits is
/// found like any other.
pub fn resolve_id<E: Entity>(manager: &EntityManager<E>, identifier: &str) -> Result<EntityId, CliError> {
    manager
        .find_id(identifier.trim())
        .ok_or_else(|| CliError::not_found(E::KIND, identifier))
}

/// Look up a record that `resolve_id` just found.
pub fn fetch<E: Entity>(manager: &EntityManager<E>, id: &EntityId) -> Result<Arc<E>, CliError> {
    manager
        .get(id)
        .ok_or_else(|| CliError::not_found(E::KIND, id.to_string()))
}

/// Populate an empty server-backed cache before resolving ids.
pub async fn ensure_loaded<E: Entity>(manager: &EntityManager<E>, global: &GlobalOpts) -> Result<(), CliError> {
    if manager.is_server_backed() && manager.is_empty() {
        with_spinner(&format!("Loading {}s", E::KIND), global, manager.list()).await?;
    }
    Ok(())
}

/// List from the backend. When the list fails but a previous one
/// succeeded, warn and fall back to the last-known records.
pub async fn refresh<E: Entity>(
    manager: &EntityManager<E>,
    global: &GlobalOpts,
) -> Result<Arc<Vec<Arc<E>>>, CliError> {
    match with_spinner(&format!("Loading {}s", E::KIND), global, manager.list()).await {
        Ok(records) => Ok(records),
        Err(err) if !manager.is_empty() => {
            warn_stale(manager, global);
            tracing::debug!(error = %err, "list failed, showing cached records");
            Ok(manager.snapshot())
        }
        Err(err) => Err(err.into()),
    }
}

/// Mention a recorded sync fault, if any.
pub fn warn_stale<E: Entity>(manager: &EntityManager<E>, global: &GlobalOpts) {
    if let Some(fault) = manager.sync_fault() {
        output::notice(
            &format!(
                "warning: showing last-known {}s; sync failed at {}: {}",
                E::KIND,
                fault.at.with_timezone(&chrono::Local).format("%H:%M:%S"),
                fault.message
            ),
            global.quiet,
        );
    }
}

// ── Interaction ─────────────────────────────────────────────────────

/// Run `fut` behind a spinner on interactive terminals.
pub async fn with_spinner<T>(
    message: &str,
    global: &GlobalOpts,
    fut: impl Future<Output = Result<T, CoreError>>,
) -> Result<T, CoreError> {
    if global.quiet || !std::io::stderr().is_terminal() {
        return fut.await;
    }
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(format!("{message}..."));
    spinner.enable_steady_tick(Duration::from_millis(100));
    let outcome = fut.await;
    spinner.finish_and_clear();
    outcome
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, global: &GlobalOpts, action: &str) -> Result<bool, CliError> {
    if global.yes {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))
}

/// Explicit value, else a hidden prompt.
pub fn password_or_prompt(given: Option<String>, prompt: &str) -> Result<String, CliError> {
    match given {
        Some(password) => Ok(password),
        None => Ok(rpassword::prompt_password(prompt)?),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn args(search: Option<&str>, sort: Option<&str>, desc: bool) -> ViewArgs {
        ViewArgs {
            search: search.map(str::to_owned),
            sort: sort.map(str::to_owned),
            desc,
        }
    }

    #[test]
    fn view_remembers_search_and_sort_between_queries() {
        let mut view = ListView::<CourseSortField>::default();
        view.query(&args(Some("data"), Some("price"), true)).unwrap();

        let query = view.query(&ViewArgs::default()).unwrap();
        assert_eq!(query.search, "data");
        assert_eq!(
            query.sort,
            Some(SortState {
                field: CourseSortField::Price,
                direction: SortDirection::Desc
            })
        );
    }

    #[test]
    fn empty_search_clears_the_filter() {
        let mut view = ListView::<StudentSortField>::default();
        view.query(&args(Some("math"), None, false)).unwrap();
        let query = view.query(&args(Some(""), None, false)).unwrap();
        assert!(query.search.is_empty());
    }

    #[test]
    fn resolve_id_returns_the_cached_server_key() {
        let manager = EntityManager::local(vec![scholar_core::Course {
            id: EntityId::Remote("42".into()),
            name: "Robotics".into(),
            price: 250.0,
            institute: "Tech Academy".into(),
        }]);

        let id = resolve_id(&manager, " 42 ").unwrap();
        assert_eq!(id, EntityId::Remote("42".into()));
        assert!(matches!(resolve_id(&manager, "7"), Err(CliError::NotFound { .. })));
    }

    #[test]
    fn unknown_sort_column_lists_choices() {
        let err = parse_sort_field::<TeacherSortField>("salary").unwrap_err();
        assert!(err.to_string().contains("name, email, course"));
    }
}
