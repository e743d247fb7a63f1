//! Student command handlers.

use std::fmt::Write as _;
use std::sync::Arc;

use tabled::Tabled;

use scholar_core::{
    Console, RosterSummary, Student, StudentDraft, StudentField, StudentSortField, project,
};

use crate::cli::{GlobalOpts, OutputFormat, StudentsArgs, StudentsCommand};
use crate::error::CliError;
use crate::output;

use super::util::{self, ListView};

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct StudentRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Grade")]
    grade: String,
    #[tabled(rename = "Department")]
    department: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Courses")]
    courses: String,
}

impl StudentRow {
    fn new(s: &Arc<Student>, color: bool) -> Self {
        Self {
            id: s.id.to_string(),
            name: s.name.clone(),
            grade: s.grade.clone(),
            department: s.department.clone(),
            status: output::paint_status(s.status, color),
            courses: s.courses.join(", "),
        }
    }
}

fn detail(student: &Student, dangling: &[String]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "ID:          {}", student.id);
    let _ = writeln!(out, "Name:        {}", student.name);
    let _ = writeln!(out, "Grade:       {}", student.grade);
    let _ = writeln!(out, "Department:  {}", student.department);
    let _ = writeln!(out, "Status:      {}", student.status);
    if student.courses.is_empty() {
        let _ = write!(out, "Courses:     (none)");
    } else {
        let _ = write!(out, "Courses:");
        for course in &student.courses {
            let marker = if dangling.contains(course) {
                "  (not in catalog)"
            } else {
                ""
            };
            let _ = write!(out, "\n  - {course}{marker}");
        }
    }
    out
}

// ── Handler ─────────────────────────────────────────────────────────

#[allow(clippy::too_many_lines)]
pub async fn handle(
    console: &Console,
    args: StudentsArgs,
    global: &GlobalOpts,
    view: &mut ListView<StudentSortField>,
) -> Result<(), CliError> {
    let students = console.students();

    match args.command {
        StudentsCommand::List(list) => {
            let query = view.query(&list)?;
            let all = util::refresh(students, global).await?;
            let shown = project(&all, &query);
            let color = output::should_color(global.color);
            let out = output::render_list(
                global.output,
                &shown,
                |s| StudentRow::new(s, color),
                |s| s.id.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            if global.output == OutputFormat::Table {
                let summary = RosterSummary::from_students(&all);
                output::notice(
                    &format!(
                        "Total students: {}  Active: {}  Inactive: {}",
                        summary.total,
                        summary.active,
                        summary.inactive()
                    ),
                    global.quiet,
                );
            }
            Ok(())
        }

        StudentsCommand::Get { id } => {
            util::ensure_loaded(students, global).await?;
            util::ensure_loaded(console.courses(), global).await?;
            let id = util::resolve_id(students, &id)?;
            let student = util::fetch(students, &id)?;
            let dangling = console.dangling_enrollments(&student);
            let out = output::render_single(
                global.output,
                student.as_ref(),
                |s| detail(s, &dangling),
                |s| s.id.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        StudentsCommand::Add {
            name,
            grade,
            department,
            status,
            courses,
        } => {
            let mut draft = StudentDraft {
                name,
                grade,
                department,
                ..StudentDraft::default()
            };
            draft.set(StudentField::Status, status)?;
            if let Some(courses) = courses {
                draft.set(StudentField::Courses, courses)?;
            }
            util::with_spinner("Creating student", global, students.create(&draft)).await?;
            output::notice("Student created", global.quiet);
            Ok(())
        }

        StudentsCommand::Edit {
            id,
            name,
            grade,
            department,
            status,
            courses,
        } => {
            util::ensure_loaded(students, global).await?;
            let id = util::resolve_id(students, &id)?;
            let mut draft = StudentDraft::from(util::fetch(students, &id)?.as_ref());
            for (field, value) in [
                (StudentField::Name, name),
                (StudentField::Grade, grade),
                (StudentField::Department, department),
                (StudentField::Status, status),
                (StudentField::Courses, courses),
            ] {
                if let Some(value) = value {
                    draft.set(field, value)?;
                }
            }
            util::with_spinner("Updating student", global, students.update(&id, &draft)).await?;
            output::notice("Student updated", global.quiet);
            Ok(())
        }

        StudentsCommand::Enroll { id, course } => {
            util::ensure_loaded(students, global).await?;
            util::ensure_loaded(console.courses(), global).await?;
            let id = util::resolve_id(students, &id)?;
            util::with_spinner("Enrolling", global, console.enroll(&id, &course)).await?;
            output::notice(&format!("Enrolled in '{}'", course.trim()), global.quiet);
            Ok(())
        }

        StudentsCommand::Drop { id, course } => {
            util::ensure_loaded(students, global).await?;
            let id = util::resolve_id(students, &id)?;
            if !util::fetch(students, &id)?.is_enrolled_in(course.trim()) {
                output::notice(&format!("Not enrolled in '{}'; nothing to do", course.trim()), global.quiet);
                return Ok(());
            }
            util::with_spinner("Dropping course", global, console.drop_course(&id, &course)).await?;
            output::notice(&format!("Dropped '{}'", course.trim()), global.quiet);
            Ok(())
        }

        StudentsCommand::Remove { id } => {
            util::ensure_loaded(students, global).await?;
            let id = util::resolve_id(students, &id)?;
            let student = util::fetch(students, &id)?;
            if !util::confirm(&format!("Remove student '{}'?", student.name), global, "students remove")? {
                return Ok(());
            }
            util::with_spinner("Removing student", global, students.remove(&id)).await?;
            output::notice("Student removed", global.quiet);
            Ok(())
        }
    }
}
