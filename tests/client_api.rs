mod common;

use serde_json::json;
use uuid::Uuid;

use common::{ADMIN_TOKEN, Backend, TEACHER_TOKEN};
use course_portal::core::access::{Access, Route, redirect_for_error};
use course_portal::core::session::AuthSession;
use course_portal::error::portal::PortalError;
use course_portal::model::media::Media;
use course_portal::model::program::Program;

#[tokio::test]
async fn login_persists_token_and_later_requests_carry_it() {
    let backend = Backend::start().await;
    let dir = tempfile::tempdir().unwrap();
    let client = backend.client(dir.path(), None);

    let mut session = AuthSession::new(&client);
    let user = session.login("admin", "secret").await.unwrap();
    assert!(user.is_admin());
    assert_eq!(client.tokens().token().as_deref(), Some(ADMIN_TOKEN));

    let saved = std::fs::read_to_string(dir.path().join("session.json")).unwrap();
    assert!(saved.contains(ADMIN_TOKEN));

    client.programs().list().await.unwrap();
    let last = backend.store().authorizations.last().cloned().flatten();
    assert_eq!(last.as_deref(), Some(ADMIN_TOKEN));
}

#[tokio::test]
async fn bad_credentials_surface_the_server_message() {
    let backend = Backend::start().await;
    let dir = tempfile::tempdir().unwrap();
    let client = backend.client(dir.path(), None);

    let err = AuthSession::new(&client).login("admin", "nope").await.unwrap_err();
    match &err {
        PortalError::Api { status, message } => {
            assert_eq!(*status, 401);
            assert_eq!(message, "Invalid credentials");
        }
        other => panic!("unexpected error {:?}", other),
    }
    assert_eq!(err.describe("Login failed"), "Invalid credentials");
    assert!(client.tokens().token().is_none());
}

#[tokio::test]
async fn rejected_token_is_cleared_from_memory_and_disk() {
    let backend = Backend::start().await;
    let dir = tempfile::tempdir().unwrap();
    let client = backend.client(dir.path(), Some("stale-token"));
    assert!(dir.path().join("session.json").exists());

    let err = client.programs().list().await.unwrap_err();
    assert!(matches!(err, PortalError::Unauthorized));
    assert!(!client.is_authenticated());
    assert!(!dir.path().join("session.json").exists());
    assert_eq!(
        redirect_for_error(&err),
        Some(Access::Redirect { to: Route::Login, forbidden: false })
    );
}

#[tokio::test]
async fn forbidden_keeps_the_session_and_points_home() {
    let backend = Backend::start().await;
    let dir = tempfile::tempdir().unwrap();
    let client = backend.client(dir.path(), Some(TEACHER_TOKEN));

    let err = client.programs().list().await.unwrap_err();
    assert!(matches!(err, PortalError::Forbidden));
    assert_eq!(client.tokens().token().as_deref(), Some(TEACHER_TOKEN));
    let Some(Access::Redirect { to, forbidden }) = redirect_for_error(&err) else {
        panic!("expected a redirect");
    };
    assert!(forbidden);
    assert_eq!(to.with_forbidden_flag(), "/?forbidden=1");
}

#[tokio::test]
async fn preview_media_is_stripped_in_both_directions() {
    let backend = Backend::start().await;
    let dir = tempfile::tempdir().unwrap();
    let client = backend.client(dir.path(), Some(ADMIN_TOKEN));

    let program = Program {
        name: "Robotics".into(),
        slug: "robotics".into(),
        media: vec![
            Media { url: "blob:2b5e0a7c".into(), ..Default::default() },
            Media { url: "/uploads/program/cover.png".into(), ..Default::default() },
        ],
        ..Default::default()
    };
    client.programs().create(&program).await.unwrap();
    let sent = backend.store().bodies.last().cloned().unwrap();
    assert_eq!(sent["media"].as_array().unwrap().len(), 1);
    assert!(!sent.to_string().contains("blob:"));

    let id = Uuid::new_v4();
    backend.store().programs.insert(
        id,
        json!({
            "id": id,
            "name": "Leaked",
            "slug": "leaked",
            "description": null,
            "media": [null, {"url": "blob:abc"}, {"url": "/uploads/program/ok.png"}]
        }),
    );
    let programs = client.catalog().programs().await.unwrap();
    let leaked = programs.iter().find(|p| p.id == Some(id)).unwrap();
    assert_eq!(leaked.media.len(), 1);
    assert_eq!(leaked.media[0].url, "/uploads/program/ok.png");
}

#[tokio::test]
async fn plain_text_errors_keep_their_body() {
    let backend = Backend::start().await;
    let dir = tempfile::tempdir().unwrap();
    let client = backend.client(dir.path(), Some(ADMIN_TOKEN));

    let err = client.programs().delete(Uuid::new_v4()).await.unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert_eq!(err.describe("Failed to delete"), "Program not found");
}

#[tokio::test]
async fn catalog_tree_attaches_subcourses_to_programs() {
    let backend = Backend::start().await;
    let dir = tempfile::tempdir().unwrap();
    let client = backend.client(dir.path(), None);
    for slug in ["a", "b"] {
        let id = Uuid::new_v4();
        backend
            .store()
            .programs
            .insert(id, json!({"id": id, "name": slug, "slug": slug, "media": null}));
    }

    let tree = client.catalog().tree().await.unwrap();
    assert_eq!(tree.len(), 2);
    for branch in tree {
        assert_eq!(branch.subcourses.len(), 1);
        assert_eq!(Some(branch.subcourses[0].program_id), branch.program.id);
    }
}

#[tokio::test]
async fn null_history_and_wrapped_assignments_decode() {
    let backend = Backend::start().await;
    let dir = tempfile::tempdir().unwrap();
    let client = backend.client(dir.path(), Some(ADMIN_TOKEN));

    assert!(client.teachers().history().await.unwrap().is_empty());

    let teacher = Uuid::new_v4();
    let assignments = client.assignments().for_teacher(teacher).await.unwrap();
    assert_eq!(assignments.len(), 1);
    assert_eq!(assignments[0].teacher_id, teacher);
}

#[tokio::test]
async fn browsing_uses_nested_routes_only_for_a_parent() {
    let backend = Backend::start().await;
    let dir = tempfile::tempdir().unwrap();
    let client = backend.client(dir.path(), None);
    let program = Uuid::new_v4();
    let subcourse = Uuid::new_v4();

    let catalog = client.catalog();
    assert_eq!(catalog.browse_subcourses(Some(program)).await.unwrap().len(), 1);
    catalog.browse_subcourses(None).await.unwrap();
    catalog.browse_lessons(Some(subcourse)).await.unwrap();
    catalog.browse_lessons(None).await.unwrap();
    catalog.subcourses(Some(program)).await.unwrap();

    let hits = backend.store().catalog_hits.clone();
    let paths: Vec<String> = hits
        .iter()
        .map(|hit| hit.split('?').next().unwrap().to_string())
        .collect();
    let expected = vec![
        format!("/api/programs/{}/subcourses", program),
        "/api/subcourses".to_string(),
        format!("/api/subcourses/{}/lessons", subcourse),
        "/api/lessons".to_string(),
        "/api/subcourses".to_string(),
    ];
    assert_eq!(paths, expected);
    assert!(!hits[1].contains('?'));
    assert_eq!(hits[4], format!("/api/subcourses?program_id={}", program));
}
