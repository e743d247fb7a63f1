//! Teacher command handlers. Teachers never reach the backend.

use std::sync::Arc;

use tabled::Tabled;

use scholar_core::{Console, Teacher, TeacherDraft, TeacherField, TeacherSortField, project};

use crate::cli::{GlobalOpts, TeachersArgs, TeachersCommand};
use crate::error::CliError;
use crate::output;

use super::util::{self, ListView};

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct TeacherRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Email")]
    email: String,
    #[tabled(rename = "Course")]
    course: String,
}

impl From<&Arc<Teacher>> for TeacherRow {
    fn from(t: &Arc<Teacher>) -> Self {
        Self {
            id: t.id.to_string(),
            name: t.name.clone(),
            email: t.email.clone(),
            course: t.course.clone().unwrap_or_default(),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    console: &Console,
    args: TeachersArgs,
    global: &GlobalOpts,
    view: &mut ListView<TeacherSortField>,
) -> Result<(), CliError> {
    let teachers = console.teachers();

    match args.command {
        TeachersCommand::List(list) => {
            let query = view.query(&list)?;
            let all = teachers.list().await?;
            let shown = project(&all, &query);
            let out = output::render_list(global.output, &shown, |t| TeacherRow::from(t), |t| t.id.to_string())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        TeachersCommand::Add { name, email, course } => {
            let mut draft = TeacherDraft {
                name,
                email,
                ..TeacherDraft::default()
            };
            if let Some(course) = course {
                draft.set(TeacherField::Course, course);
            }
            match teachers.create(&draft).await? {
                Some(id) => output::notice(&format!("Teacher created (id {id})"), global.quiet),
                None => output::notice("Teacher created", global.quiet),
            }
            Ok(())
        }

        TeachersCommand::Edit {
            id,
            name,
            email,
            course,
        } => {
            let id = util::resolve_id(teachers, &id)?;
            let mut draft = TeacherDraft::from(util::fetch(teachers, &id)?.as_ref());
            for (field, value) in [
                (TeacherField::Name, name),
                (TeacherField::Email, email),
                (TeacherField::Course, course),
            ] {
                if let Some(value) = value {
                    draft.set(field, value);
                }
            }
            teachers.update(&id, &draft).await?;
            output::notice("Teacher updated", global.quiet);
            Ok(())
        }

        TeachersCommand::Remove { id } => {
            let id = util::resolve_id(teachers, &id)?;
            let teacher = util::fetch(teachers, &id)?;
            if !util::confirm(&format!("Remove teacher '{}'?", teacher.name), global, "teachers remove")? {
                return Ok(());
            }
            teachers.remove(&id).await?;
            output::notice("Teacher removed", global.quiet);
            Ok(())
        }
    }
}
