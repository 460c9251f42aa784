//! Command-line front end over the portal client.

pub mod commands;
pub mod manifest;
pub mod output;

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{ArgAction, Args, Parser, Subcommand};
use uuid::Uuid;

use course_portal::model::media::{MediaOwnerType, MediaPurpose};
use course_portal::model::status::PublishStatus;

#[derive(Parser, Debug)]
#[command(name = "course-portal")]
#[command(about = "Manage programs, subcourses, lessons and teachers of the course portal")]
#[command(version)]
pub struct Cli {
    /// Root of the REST API
    #[arg(long, global = true, env = "COURSE_PORTAL_API_BASE_URL")]
    pub api_base_url: Option<String>,

    /// File holding the login token between runs
    #[arg(long, global = true, env = "COURSE_PORTAL_SESSION_FILE")]
    pub session_file: Option<PathBuf>,

    /// TOML config file (defaults to the user config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log more; repeat for trace output
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Sign in and remember the token
    Login {
        #[arg(short, long)]
        username: Option<String>,
        /// Read from the terminal when omitted
        #[arg(long, env = "COURSE_PORTAL_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Forget the stored token
    Logout,
    /// Show the signed-in user and the admin sections they can open
    Whoami,
    /// Check whether the current session may open a portal page
    Access { path: String },
    /// Public, read-only browsing
    Catalog {
        #[command(subcommand)]
        command: CatalogCommand,
    },
    Programs {
        #[command(subcommand)]
        command: ProgramCommand,
    },
    Subcourses {
        #[command(subcommand)]
        command: SubcourseCommand,
    },
    Lessons {
        #[command(subcommand)]
        command: LessonCommand,
    },
    Teachers {
        #[command(subcommand)]
        command: TeacherCommand,
    },
    Assignments {
        #[command(subcommand)]
        command: AssignmentCommand,
    },
    Media {
        #[command(subcommand)]
        command: MediaCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum CatalogCommand {
    Programs,
    Program { id: Uuid },
    Subcourses {
        #[arg(long)]
        program: Option<Uuid>,
    },
    Subcourse { id: Uuid },
    Lessons {
        #[arg(long)]
        subcourse: Option<Uuid>,
    },
    Lesson { id: Uuid },
    /// Every program with its subcourses
    Tree,
}

#[derive(Args, Debug, Default)]
pub struct ProgramFields {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub slug: Option<String>,
    #[arg(long)]
    pub short_description: Option<String>,
    #[arg(long)]
    pub status: Option<PublishStatus>,
    #[arg(long)]
    pub sort_order: Option<i32>,
    /// Image or video to upload as the cover
    #[arg(long)]
    pub cover: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum ProgramCommand {
    List,
    Show { id: Uuid },
    Create {
        #[command(flatten)]
        fields: ProgramFields,
    },
    Update {
        id: Uuid,
        #[command(flatten)]
        fields: ProgramFields,
    },
    Delete {
        id: Uuid,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Args, Debug, Default)]
pub struct SubcourseFields {
    #[arg(long)]
    pub program: Option<Uuid>,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub slug: Option<String>,
    #[arg(long)]
    pub age_range: Option<String>,
    #[arg(long)]
    pub status: Option<PublishStatus>,
    #[arg(long)]
    pub cover: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum SubcourseCommand {
    List {
        #[arg(long)]
        program: Option<Uuid>,
    },
    Show { id: Uuid },
    Create {
        #[command(flatten)]
        fields: SubcourseFields,
    },
    Update {
        id: Uuid,
        #[command(flatten)]
        fields: SubcourseFields,
    },
    Delete {
        id: Uuid,
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum LessonCommand {
    List {
        #[arg(long)]
        subcourse: Option<Uuid>,
    },
    Show { id: Uuid },
    /// Create or update a lesson from a JSON or TOML manifest
    Save { manifest: PathBuf },
    Delete {
        id: Uuid,
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Args, Debug, Default)]
pub struct WindowArgs {
    /// RFC 3339 start of the assignment
    #[arg(long)]
    pub start_at: Option<DateTime<Utc>>,
    #[arg(long)]
    pub end_at: Option<DateTime<Utc>>,
}

#[derive(Subcommand, Debug)]
pub enum TeacherCommand {
    List,
    Create {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        /// Read from the terminal when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// Lessons authored by all teachers
    History {
        /// Filter by teacher name or lesson title
        #[arg(long)]
        search: Option<String>,
    },
    /// Lessons authored by one teacher
    Lessons { teacher: Uuid },
    /// Active assignments of one teacher
    Assignments { teacher: Uuid },
    /// Replace the teacher's program assignments
    AssignPrograms {
        teacher: Uuid,
        programs: Vec<Uuid>,
        #[command(flatten)]
        window: WindowArgs,
    },
    /// Replace the teacher's subcourse assignments
    AssignSubcourses {
        teacher: Uuid,
        subcourses: Vec<Uuid>,
        #[command(flatten)]
        window: WindowArgs,
    },
}

#[derive(Subcommand, Debug)]
pub enum AssignmentCommand {
    List,
    Create {
        #[arg(long)]
        teacher: Uuid,
        #[arg(long, conflicts_with = "subcourse", required_unless_present = "subcourse")]
        program: Option<Uuid>,
        #[arg(long)]
        subcourse: Option<Uuid>,
    },
    Revoke { id: Uuid },
}

#[derive(Subcommand, Debug)]
pub enum MediaCommand {
    /// Attach a local file to an existing record
    Upload {
        #[arg(long)]
        owner_type: MediaOwnerType,
        #[arg(long)]
        owner_id: Uuid,
        #[arg(long)]
        purpose: Option<MediaPurpose>,
        file: PathBuf,
    },
}
