use std::path::Path;

use anyhow::{Context, anyhow, bail};
use uuid::Uuid;

use course_portal::core::access::{Access, AdminRoute, Route, guard, redirect_for_error, visible_sections};
use course_portal::core::client::PortalClient;
use course_portal::core::history::{filter_history, status_label};
use course_portal::core::session::AuthSession;
use course_portal::core::staging::StagedFile;
use course_portal::error::portal::PortalError;
use course_portal::forms::FormOutcome;
use course_portal::forms::lesson_editor::LessonEditor;
use course_portal::forms::program_form::ProgramForm;
use course_portal::forms::subcourse_form::SubcourseForm;
use course_portal::model::media::{MediaOwner, MediaOwnerType};
use course_portal::model::teacher::{AssignmentWindow, NewAssignment, NewTeacher};
use course_portal::model::user::User;
use course_portal::utils::input::{confirm, input, input_password};

use crate::cli::manifest::LessonManifest;
use crate::cli::output::print_json;
use crate::cli::{
    AssignmentCommand, CatalogCommand, Command, LessonCommand, MediaCommand, ProgramCommand,
    ProgramFields, SubcourseCommand, SubcourseFields, TeacherCommand, WindowArgs,
};

pub async fn run(client: &PortalClient, command: Command) -> anyhow::Result<()> {
    let result = match command {
        Command::Login { username, password } => login(client, username, password).await,
        Command::Logout => logout(client),
        Command::Whoami => whoami(client).await,
        Command::Access { path } => access(client, &path).await,
        Command::Catalog { command } => catalog(client, command).await,
        Command::Programs { command } => programs(client, command).await,
        Command::Subcourses { command } => subcourses(client, command).await,
        Command::Lessons { command } => lessons(client, command).await,
        Command::Teachers { command } => teachers(client, command).await,
        Command::Assignments { command } => assignments(client, command).await,
        Command::Media { command } => media(client, command).await,
    };
    result.map_err(explain)
}

/// Adds the page the portal would send the user to for auth failures.
fn explain(err: anyhow::Error) -> anyhow::Error {
    let redirect = err.downcast_ref::<PortalError>().and_then(redirect_for_error);
    match redirect {
        Some(Access::Redirect { to, forbidden: true }) => err.context(format!("redirected to {}", to.with_forbidden_flag())),
        Some(Access::Redirect { to, .. }) => err.context(format!("redirected to {}", to)),
        _ => err,
    }
}

/// Restores the stored session and applies the route guard for `route`.
async fn require(client: &PortalClient, route: AdminRoute) -> anyhow::Result<User> {
    let mut session = AuthSession::new(client);
    session.restore().await;
    match guard(Route::Admin(route), session.state()) {
        Access::Allow => session
            .user()
            .cloned()
            .ok_or_else(|| anyhow!("session has no user")),
        Access::Pending => bail!("session is still loading"),
        Access::Redirect { to: Route::Login, .. } => Err(PortalError::Unauthorized.into()),
        Access::Redirect { .. } => {
            bail!("{} is not available to this account", route.section().title())
        }
    }
}

fn print_outcome<T: serde::Serialize>(client: &PortalClient, outcome: FormOutcome<T>) -> anyhow::Result<()> {
    if let Some(warning) = &outcome.warning {
        log::warn!("{}", warning);
        eprintln!("warning: {}", warning);
    }
    print_json(&outcome.record, client.media_origin())
}

fn confirm_delete(what: &str, id: Uuid, yes: bool) -> anyhow::Result<bool> {
    if yes {
        return Ok(true);
    }
    Ok(confirm(&format!("Delete {} {}?", what, id))?)
}

async fn login(client: &PortalClient, username: Option<String>, password: Option<String>) -> anyhow::Result<()> {
    let username = match username {
        Some(name) => name,
        None => input("Username: ")?,
    };
    let password = match password {
        Some(password) => password,
        None => input_password("Password: ")?,
    };
    if username.is_empty() || password.is_empty() {
        bail!("username and password are required");
    }

    let mut session = AuthSession::new(client);
    let user = session
        .login(&username, &password)
        .await
        .map_err(|err| anyhow!(err.describe("Login failed")))?;
    println!("Logged in as {} ({:?})", user.username, user.role);
    Ok(())
}

fn logout(client: &PortalClient) -> anyhow::Result<()> {
    AuthSession::new(client).logout()?;
    println!("Logged out");
    Ok(())
}

async fn whoami(client: &PortalClient) -> anyhow::Result<()> {
    let mut session = AuthSession::new(client);
    let Some(user) = session.restore().await else {
        println!("Not logged in");
        return Ok(());
    };
    println!("{} <{}> ({:?})", user.username, user.email, user.role);
    let sections: Vec<&str> = visible_sections(user).iter().map(|s| s.title()).collect();
    println!("Sections: {}", sections.join(", "));
    Ok(())
}

async fn access(client: &PortalClient, path: &str) -> anyhow::Result<()> {
    let route = Route::parse(path).ok_or_else(|| anyhow!("unknown page {}", path))?;
    let mut session = AuthSession::new(client);
    session.restore().await;
    match guard(route, session.state()) {
        Access::Allow => println!("{}: allowed", route),
        Access::Pending => println!("{}: pending", route),
        Access::Redirect { to, forbidden: true } => println!("{}: redirect to {}", route, to.with_forbidden_flag()),
        Access::Redirect { to, .. } => println!("{}: redirect to {}", route, to),
    }
    Ok(())
}

async fn catalog(client: &PortalClient, command: CatalogCommand) -> anyhow::Result<()> {
    let api = client.catalog();
    let origin = client.media_origin();
    match command {
        CatalogCommand::Programs => print_json(&api.programs().await?, origin),
        CatalogCommand::Program { id } => print_json(&api.program(id).await?, origin),
        CatalogCommand::Subcourses { program } => print_json(&api.browse_subcourses(program).await?, origin),
        CatalogCommand::Subcourse { id } => print_json(&api.subcourse(id).await?, origin),
        CatalogCommand::Lessons { subcourse } => print_json(&api.browse_lessons(subcourse).await?, origin),
        CatalogCommand::Lesson { id } => print_json(&api.lesson(id).await?, origin),
        CatalogCommand::Tree => print_json(&api.tree().await?, origin),
    }
}

fn fill_program_form(form: &mut ProgramForm, fields: ProgramFields) -> anyhow::Result<()> {
    if let Some(name) = fields.name {
        form.name = name;
    }
    if let Some(slug) = fields.slug {
        form.slug = slug;
    }
    if let Some(description) = fields.short_description {
        form.short_description = description;
    }
    if let Some(status) = fields.status {
        form.status = status;
    }
    if let Some(sort_order) = fields.sort_order {
        form.sort_order = sort_order;
    }
    if let Some(cover) = fields.cover {
        let file = StagedFile::open(&cover).with_context(|| format!("reading {}", cover.display()))?;
        form.set_cover(file)?;
    }
    Ok(())
}

async fn programs(client: &PortalClient, command: ProgramCommand) -> anyhow::Result<()> {
    let route = match &command {
        ProgramCommand::Show { id } | ProgramCommand::Update { id, .. } => AdminRoute::Program(*id),
        _ => AdminRoute::Programs,
    };
    require(client, route).await?;

    let api = client.programs();
    match command {
        ProgramCommand::List => print_json(&api.list().await?, client.media_origin()),
        ProgramCommand::Show { id } => print_json(&api.get(id).await?, client.media_origin()),
        ProgramCommand::Create { fields } => {
            let mut form = ProgramForm::new();
            fill_program_form(&mut form, fields)?;
            let outcome = form.submit(client).await?;
            print_outcome(client, outcome)
        }
        ProgramCommand::Update { id, fields } => {
            let mut form = ProgramForm::edit(&api.get(id).await?);
            fill_program_form(&mut form, fields)?;
            let outcome = form.submit(client).await?;
            print_outcome(client, outcome)
        }
        ProgramCommand::Delete { id, yes } => {
            if confirm_delete("program", id, yes)? {
                api.delete(id).await?;
                println!("Deleted program {}", id);
            }
            Ok(())
        }
    }
}

fn fill_subcourse_form(form: &mut SubcourseForm, fields: SubcourseFields) -> anyhow::Result<()> {
    if let Some(program) = fields.program {
        form.program_id = Some(program);
    }
    if let Some(name) = fields.name {
        form.name = name;
    }
    if let Some(slug) = fields.slug {
        form.slug = slug;
    }
    if let Some(age_range) = fields.age_range {
        form.age_range = age_range;
    }
    if let Some(status) = fields.status {
        form.status = status;
    }
    if let Some(cover) = fields.cover {
        let file = StagedFile::open(&cover).with_context(|| format!("reading {}", cover.display()))?;
        form.set_cover(file)?;
    }
    Ok(())
}

async fn subcourses(client: &PortalClient, command: SubcourseCommand) -> anyhow::Result<()> {
    let route = match &command {
        SubcourseCommand::List { program: Some(id) } => AdminRoute::ProgramSubcourses(*id),
        _ => AdminRoute::Subcourses,
    };
    require(client, route).await?;

    let api = client.subcourses();
    match command {
        SubcourseCommand::List { program } => print_json(&api.list(program).await?, client.media_origin()),
        SubcourseCommand::Show { id } => print_json(&api.get(id).await?, client.media_origin()),
        SubcourseCommand::Create { fields } => {
            let mut form = SubcourseForm::new(None);
            fill_subcourse_form(&mut form, fields)?;
            let outcome = form.submit(client).await?;
            print_outcome(client, outcome)
        }
        SubcourseCommand::Update { id, fields } => {
            let mut form = SubcourseForm::edit(&api.get(id).await?);
            fill_subcourse_form(&mut form, fields)?;
            let outcome = form.submit(client).await?;
            print_outcome(client, outcome)
        }
        SubcourseCommand::Delete { id, yes } => {
            if confirm_delete("subcourse", id, yes)? {
                api.delete(id).await?;
                println!("Deleted subcourse {}", id);
            }
            Ok(())
        }
    }
}

async fn save_lesson(client: &PortalClient, manifest_path: &Path) -> anyhow::Result<()> {
    let manifest = LessonManifest::load(manifest_path)
        .with_context(|| format!("reading manifest {}", manifest_path.display()))?;
    let base_dir = manifest_path.parent().unwrap_or(Path::new("."));

    let mut editor = match manifest.id {
        Some(id) => LessonEditor::edit(&client.lessons().get(id).await?),
        None => LessonEditor::new(),
    };
    manifest.apply(&mut editor, base_dir)?;

    let errors = editor.validate();
    if !errors.is_empty() {
        for (field, message) in errors.iter() {
            eprintln!("{}: {}", field, message);
        }
        return Err(PortalError::Validation(errors).into());
    }

    let staged = editor.staged_keys().len();
    let lesson = editor.submit(client).await?;
    log::info!("saved lesson {:?} with {} upload(s)", lesson.id, staged);
    print_json(&lesson, client.media_origin())
}

async fn lessons(client: &PortalClient, command: LessonCommand) -> anyhow::Result<()> {
    let route = match &command {
        LessonCommand::List { subcourse: Some(id) } => AdminRoute::SubcourseLessons(*id),
        LessonCommand::Show { id } => AdminRoute::Lesson(*id),
        _ => AdminRoute::Lessons,
    };
    require(client, route).await?;

    let api = client.lessons();
    match command {
        LessonCommand::List { subcourse } => print_json(&api.list(subcourse).await?, client.media_origin()),
        LessonCommand::Show { id } => print_json(&api.get(id).await?, client.media_origin()),
        LessonCommand::Save { manifest } => save_lesson(client, &manifest).await,
        LessonCommand::Delete { id, yes } => {
            if confirm_delete("lesson", id, yes)? {
                api.delete(id).await?;
                println!("Deleted lesson {}", id);
            }
            Ok(())
        }
    }
}

fn window(args: WindowArgs) -> AssignmentWindow {
    AssignmentWindow { start_at: args.start_at, end_at: args.end_at }
}

async fn teachers(client: &PortalClient, command: TeacherCommand) -> anyhow::Result<()> {
    let route = match &command {
        TeacherCommand::History { .. } => AdminRoute::TeacherHistory,
        _ => AdminRoute::Teachers,
    };
    require(client, route).await?;

    let origin = client.media_origin();
    match command {
        TeacherCommand::List => print_json(&client.teachers().list().await?, origin),
        TeacherCommand::Create { username, email, password } => {
            let password = match password {
                Some(password) => password,
                None => input_password("Password for the new teacher: ")?,
            };
            let teacher = client
                .teachers()
                .create(&NewTeacher { username, email, password })
                .await?;
            print_json(&teacher, origin)
        }
        TeacherCommand::History { search } => {
            let history = client.teachers().history().await?;
            let rows = filter_history(&history, search.as_deref().unwrap_or_default());
            if rows.is_empty() {
                println!("No lessons found");
            }
            for row in rows {
                println!(
                    "{}  {:<20} {:<32} {:<10} {}",
                    row.updated_at.format("%Y-%m-%d %H:%M"),
                    row.teacher_name,
                    row.lesson_title,
                    status_label(&row.status),
                    row.lesson_id,
                );
            }
            Ok(())
        }
        TeacherCommand::Lessons { teacher } => print_json(&client.teachers().lesson_history(teacher).await?, origin),
        TeacherCommand::Assignments { teacher } => {
            print_json(&client.assignments().for_teacher(teacher).await?, origin)
        }
        TeacherCommand::AssignPrograms { teacher, programs, window: args } => {
            let assigned = client
                .assignments()
                .assign_programs(teacher, &programs, window(args))
                .await?;
            print_json(&assigned, origin)
        }
        TeacherCommand::AssignSubcourses { teacher, subcourses, window: args } => {
            let assigned = client
                .assignments()
                .assign_subcourses(teacher, &subcourses, window(args))
                .await?;
            print_json(&assigned, origin)
        }
    }
}

async fn assignments(client: &PortalClient, command: AssignmentCommand) -> anyhow::Result<()> {
    require(client, AdminRoute::Teachers).await?;

    let api = client.assignments();
    match command {
        AssignmentCommand::List => print_json(&api.list().await?, client.media_origin()),
        AssignmentCommand::Create { teacher, program, subcourse } => {
            let assignment = match (program, subcourse) {
                (Some(program), _) => NewAssignment::program(teacher, program),
                (None, Some(subcourse)) => NewAssignment::subcourse(teacher, subcourse),
                (None, None) => bail!("either --program or --subcourse is required"),
            };
            print_json(&api.create(&assignment).await?, client.media_origin())
        }
        AssignmentCommand::Revoke { id } => {
            api.revoke(id).await?;
            println!("Revoked assignment {}", id);
            Ok(())
        }
    }
}

fn route_for_owner(owner_type: MediaOwnerType, owner_id: Uuid) -> AdminRoute {
    match owner_type {
        MediaOwnerType::Program => AdminRoute::Program(owner_id),
        MediaOwnerType::Subcourse => AdminRoute::Subcourses,
        _ => AdminRoute::Lessons,
    }
}

async fn media(client: &PortalClient, command: MediaCommand) -> anyhow::Result<()> {
    let MediaCommand::Upload { owner_type, owner_id, purpose, file } = command;
    require(client, route_for_owner(owner_type, owner_id)).await?;

    let staged = StagedFile::open(&file).with_context(|| format!("reading {}", file.display()))?;
    let media = client
        .media()
        .upload(MediaOwner::new(owner_type, owner_id), &staged, purpose)
        .await?;
    print_json(&media, client.media_origin())
}
