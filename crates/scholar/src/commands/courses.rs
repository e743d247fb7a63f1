//! Course command handlers.

use std::sync::Arc;

use tabled::Tabled;

use scholar_core::{CatalogSummary, Console, Course, CourseDraft, CourseField, CourseSortField, project};

use crate::cli::{CoursesArgs, CoursesCommand, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

use super::util::{self, ListView};

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct CourseRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Price")]
    price: String,
    #[tabled(rename = "Institute")]
    institute: String,
}

impl From<&Arc<Course>> for CourseRow {
    fn from(c: &Arc<Course>) -> Self {
        Self {
            id: c.id.to_string(),
            name: c.name.clone(),
            price: c.price_display(),
            institute: c.institute.clone(),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    console: &Console,
    args: CoursesArgs,
    global: &GlobalOpts,
    view: &mut ListView<CourseSortField>,
) -> Result<(), CliError> {
    let courses = console.courses();

    match args.command {
        CoursesCommand::List(list) => {
            let query = view.query(&list)?;
            let all = util::refresh(courses, global).await?;
            let shown = project(&all, &query);
            let out = output::render_list(global.output, &shown, |c| CourseRow::from(c), |c| c.id.to_string())?;
            output::print_output(&out, global.quiet);
            if global.output == OutputFormat::Table {
                let summary = CatalogSummary::from_courses(&all);
                output::notice(&format!("Total courses: {}", summary.total), global.quiet);
            }
            Ok(())
        }

        CoursesCommand::Add {
            name,
            price,
            institute,
        } => {
            let draft = CourseDraft {
                name,
                price,
                institute,
            };
            util::with_spinner("Creating course", global, courses.create(&draft)).await?;
            output::notice("Course created", global.quiet);
            Ok(())
        }

        CoursesCommand::Update {
            id,
            name,
            price,
            institute,
        } => {
            util::ensure_loaded(courses, global).await?;
            let id = util::resolve_id(courses, &id)?;
            let mut draft = CourseDraft::from(util::fetch(courses, &id)?.as_ref());
            for (field, value) in [
                (CourseField::Name, name),
                (CourseField::Price, price),
                (CourseField::Institute, institute),
            ] {
                if let Some(value) = value {
                    draft.set(field, value);
                }
            }
            util::with_spinner("Updating course", global, courses.update(&id, &draft)).await?;
            output::notice("Course updated", global.quiet);
            Ok(())
        }

        CoursesCommand::Remove { id } => {
            util::ensure_loaded(courses, global).await?;
            let id = util::resolve_id(courses, &id)?;
            let course = util::fetch(courses, &id)?;
            if !util::confirm(&format!("Remove course '{}'?", course.name), global, "courses remove")? {
                return Ok(());
            }
            util::with_spinner("Removing course", global, courses.remove(&id)).await?;
            output::notice("Course removed", global.quiet);

            // Enrollments refer to courses by name and are left in place.
            let enrolled = console
                .students()
                .snapshot()
                .iter()
                .filter(|s| s.is_enrolled_in(&course.name))
                .count();
            if enrolled > 0 {
                output::notice(
                    &format!("note: {enrolled} student(s) still list '{}' among their courses", course.name),
                    global.quiet,
                );
            }
            Ok(())
        }
    }
}
