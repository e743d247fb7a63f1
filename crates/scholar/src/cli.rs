//! Clap derive structures for the `scholar` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.
//! Only depends on clap so `build.rs` can include it for man pages.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// scholar -- administer courses, students and teachers from the terminal
#[derive(Debug, Parser)]
#[command(
    name = "scholar",
    version,
    about = "Manage a school's courses, students and teachers",
    long_about = "Administrative console for a school-management backend.\n\n\
        Courses and students are kept on the backend; teachers live in the\n\
        current session only. Use `scholar console` to keep one session open.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Clone, Args)]
pub struct GlobalOpts {
    /// Backend profile to use
    #[arg(long, short = 'p', env = "SCHOLAR_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Backend URL (overrides profile)
    #[arg(long, short = 'u', env = "SCHOLAR_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Directory holding the user directory and session record
    #[arg(long, env = "SCHOLAR_DATA_DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "SCHOLAR_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept invalid TLS certificates
    #[arg(long, short = 'k', env = "SCHOLAR_INSECURE", global = true)]
    pub insecure: bool,

    /// Per-request timeout in seconds (overrides profile)
    #[arg(long, env = "SCHOLAR_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in as an existing operator
    Login(LoginArgs),

    /// Register a new operator and sign in
    #[command(alias = "register")]
    Signup(SignupArgs),

    /// Sign out of the current session
    Logout,

    /// Show the signed-in operator
    Whoami,

    /// Manage the course catalog
    #[command(alias = "c")]
    Courses(CoursesArgs),

    /// Manage the student roster
    #[command(alias = "s")]
    Students(StudentsArgs),

    /// Manage teachers (kept for the current session only)
    #[command(alias = "t")]
    Teachers(TeachersArgs),

    /// Open an interactive session that keeps all records loaded
    #[command(alias = "repl")]
    Console,

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Authentication ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Operator email
    #[arg(long, short = 'e')]
    pub email: String,

    /// Password (prompted when omitted)
    #[arg(long, env = "SCHOLAR_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

#[derive(Debug, Args)]
pub struct SignupArgs {
    #[arg(long)]
    pub first_name: String,

    #[arg(long)]
    pub last_name: String,

    #[arg(long, short = 'e')]
    pub email: String,

    /// Password (prompted when omitted)
    #[arg(long, env = "SCHOLAR_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

// ── Shared list options ──────────────────────────────────────────────

#[derive(Debug, Clone, Default, Args)]
pub struct ViewArgs {
    /// Case-insensitive substring filter
    #[arg(long, short = 'f')]
    pub search: Option<String>,

    /// Column to sort by
    #[arg(long)]
    pub sort: Option<String>,

    /// Sort descending (requires --sort)
    #[arg(long, requires = "sort")]
    pub desc: bool,
}

// ── Courses ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CoursesArgs {
    #[command(subcommand)]
    pub command: CoursesCommand,
}

#[derive(Debug, Subcommand)]
pub enum CoursesCommand {
    /// List courses (sort: name, price, institute)
    #[command(alias = "ls")]
    List(ViewArgs),

    /// Add a course to the catalog
    Add {
        #[arg(long)]
        name: String,

        /// Non-negative amount, e.g. 499.99
        #[arg(long)]
        price: String,

        #[arg(long)]
        institute: String,
    },

    /// Change fields of an existing course
    #[command(alias = "edit")]
    Update {
        /// Course id
        id: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        price: Option<String>,

        #[arg(long)]
        institute: Option<String>,
    },

    /// Remove a course
    #[command(alias = "rm")]
    Remove {
        /// Course id
        id: String,
    },
}

// ── Students ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct StudentsArgs {
    #[command(subcommand)]
    pub command: StudentsCommand,
}

#[derive(Debug, Subcommand)]
pub enum StudentsCommand {
    /// List students (sort: name, grade, department, status)
    #[command(alias = "ls")]
    List(ViewArgs),

    /// Show one student with enrollment details
    Get {
        /// Student id
        id: String,
    },

    /// Add a student to the roster
    Add {
        #[arg(long)]
        name: String,

        #[arg(long)]
        grade: String,

        #[arg(long)]
        department: String,

        /// Active or Inactive
        #[arg(long, default_value = "Active")]
        status: String,

        /// Comma-separated course names (at most 3)
        #[arg(long)]
        courses: Option<String>,
    },

    /// Change fields of an existing student
    #[command(alias = "update")]
    Edit {
        /// Student id
        id: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        grade: Option<String>,

        #[arg(long)]
        department: Option<String>,

        #[arg(long)]
        status: Option<String>,

        /// Replace enrollments with this comma-separated list
        #[arg(long)]
        courses: Option<String>,
    },

    /// Enroll a student in a catalog course
    Enroll {
        /// Student id
        id: String,

        /// Course name
        course: String,
    },

    /// Drop a course from a student's enrollments
    Drop {
        /// Student id
        id: String,

        /// Course name
        course: String,
    },

    /// Remove a student
    #[command(alias = "rm")]
    Remove {
        /// Student id
        id: String,
    },
}

// ── Teachers ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct TeachersArgs {
    #[command(subcommand)]
    pub command: TeachersCommand,
}

#[derive(Debug, Subcommand)]
pub enum TeachersCommand {
    /// List teachers (sort: name, email, course)
    #[command(alias = "ls")]
    List(ViewArgs),

    /// Add a teacher
    Add {
        #[arg(long)]
        name: String,

        /// Must be unique across teachers
        #[arg(long)]
        email: String,

        #[arg(long)]
        course: Option<String>,
    },

    /// Change fields of an existing teacher
    #[command(alias = "update")]
    Edit {
        /// Teacher id
        id: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        email: Option<String>,

        /// Course name; pass an empty string to clear
        #[arg(long)]
        course: Option<String>,
    },

    /// Remove a teacher
    #[command(alias = "rm")]
    Remove {
        /// Teacher id
        id: String,
    },
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Interactive configuration wizard
    Init,

    /// Show the active configuration
    Show,

    /// Set a profile value
    Set {
        /// Key (api_url, api_token_env, data_dir, ca_cert, insecure, timeout)
        key: String,

        value: String,
    },

    /// Store the API token in the system keyring
    SetToken {
        /// Profile name (defaults to the active profile)
        #[arg(long)]
        profile: Option<String>,
    },

    /// List configured profiles
    Profiles,

    /// Make a profile the default
    Use {
        name: String,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
