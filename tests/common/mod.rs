#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::{Arc, Mutex};

use axum::extract::{Multipart, Path as UrlPath, State};
use axum::http::{HeaderMap, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use uuid::Uuid;

use course_portal::config::PortalConfig;
use course_portal::core::client::PortalClient;
use course_portal::core::token_store::TokenStore;

pub const ADMIN_TOKEN: &str = "admin-token";
pub const TEACHER_TOKEN: &str = "teacher-token";
/// A teacher holding one subcourse assignment and one with no target.
pub const SCOPED_TOKEN: &str = "scoped-teacher-token";

const CHILD_LISTS: [&str; 6] = ["models", "builds", "content_blocks", "attachments", "challenges", "quizzes"];

#[derive(Clone, Debug)]
pub struct Upload {
    pub owner_type: String,
    pub owner_id: Uuid,
    pub purpose: Option<String>,
    pub file_name: String,
    pub content_type: String,
}

/// In-memory state of the fake portal backend.
#[derive(Default)]
pub struct Store {
    pub programs: HashMap<Uuid, Value>,
    pub lessons: HashMap<Uuid, Value>,
    pub uploads: Vec<Upload>,
    /// JSON bodies of every create/update request, in order.
    pub bodies: Vec<Value>,
    pub authorizations: Vec<Option<String>>,
    pub lesson_gets: usize,
    pub fail_uploads: bool,
    /// Fails uploads for this owner type only.
    pub fail_owner_type: Option<String>,
    /// Leaves the child ids out of lesson create responses.
    pub omit_child_ids: bool,
    /// Path and query of every public catalog request.
    pub catalog_hits: Vec<String>,
}

pub type Shared = Arc<Mutex<Store>>;

pub struct Backend {
    pub addr: SocketAddr,
    pub store: Shared,
}

impl Backend {
    pub async fn start() -> Backend {
        let store: Shared = Arc::default();
        let app = Router::new()
            .route("/api/auth/login", post(login))
            .route("/api/auth/me", get(me))
            .route("/api/programs", get(public_programs))
            .route("/api/programs/:id/subcourses", get(program_subcourses))
            .route("/api/subcourses", get(public_subcourses))
            .route("/api/subcourses/:id/lessons", get(public_lessons))
            .route("/api/lessons", get(public_lessons_flat))
            .route("/api/admin/programs", get(list_programs).post(create_program))
            .route(
                "/api/admin/programs/:id",
                get(get_program).put(update_program).delete(delete_program),
            )
            .route("/api/admin/lessons", post(create_lesson))
            .route("/api/admin/lessons/:id", get(get_lesson).put(update_lesson))
            .route("/api/admin/media/upload", post(upload_media))
            .route("/api/admin/teachers/history", get(teacher_history))
            .route("/api/admin/teachers/:id/assignments", get(teacher_assignments))
            .with_state(store.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Backend { addr, store }
    }

    pub fn api_base_url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    pub fn config(&self, session_file: &Path) -> PortalConfig {
        PortalConfig::default()
            .with_api_base_url(Some(self.api_base_url()))
            .with_session_file(Some(session_file.to_path_buf()))
    }

    /// A client whose token store lives in `dir`, optionally already logged in.
    pub fn client(&self, dir: &Path, token: Option<&str>) -> PortalClient {
        let config = self.config(&dir.join("session.json"));
        let tokens = TokenStore::open(config.session_file.clone());
        if let Some(token) = token {
            tokens
                .set(course_portal::model::session_info::SessionInfo::new(token, "tester"))
                .unwrap();
        }
        PortalClient::new(&config, tokens).unwrap()
    }

    pub fn store(&self) -> std::sync::MutexGuard<'_, Store> {
        self.store.lock().unwrap()
    }
}

fn admin_user() -> Value {
    json!({
        "id": "00000000-0000-0000-0000-000000000001",
        "username": "admin",
        "email": "admin@example.com",
        "role": "admin",
        "status": "active"
    })
}

fn teacher_user() -> Value {
    json!({
        "id": "00000000-0000-0000-0000-000000000002",
        "username": "teacher",
        "email": "teacher@example.com",
        "role": "teacher",
        "status": "active",
        "assignments": null
    })
}

fn scoped_teacher_user() -> Value {
    let id = "00000000-0000-0000-0000-000000000003";
    json!({
        "id": id,
        "username": "scoped",
        "email": "scoped@example.com",
        "role": "teacher",
        "status": "active",
        "assignments": [
            {"id": Uuid::new_v4(), "teacher_id": id, "scope_level": "program", "status": "active"},
            {"id": Uuid::new_v4(), "teacher_id": id, "subcourse_id": Uuid::new_v4(), "scope_level": "subcourse", "status": "active"}
        ]
    })
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string)
}

/// Resolves the caller; admin-only routes pass `admin_only`.
fn authorize(store: &Shared, headers: &HeaderMap, admin_only: bool) -> Result<Value, Response> {
    let token = bearer(headers);
    store.lock().unwrap().authorizations.push(token.clone());
    match token.as_deref() {
        Some(ADMIN_TOKEN) => Ok(admin_user()),
        Some(TEACHER_TOKEN) if admin_only => Err(error(StatusCode::FORBIDDEN, "Admin access required")),
        Some(TEACHER_TOKEN) => Ok(teacher_user()),
        Some(SCOPED_TOKEN) if admin_only => Err(error(StatusCode::FORBIDDEN, "Admin access required")),
        Some(SCOPED_TOKEN) => Ok(scoped_teacher_user()),
        _ => Err(error(StatusCode::UNAUTHORIZED, "Invalid or expired token")),
    }
}

async fn login(Json(body): Json<Value>) -> Response {
    let username = body["username"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();
    match (username, password) {
        ("admin", "secret") => Json(json!({ "token": ADMIN_TOKEN, "user": admin_user() })).into_response(),
        ("teacher", "secret") => Json(json!({ "token": TEACHER_TOKEN, "user": teacher_user() })).into_response(),
        _ => error(StatusCode::UNAUTHORIZED, "Invalid credentials"),
    }
}

async fn me(State(store): State<Shared>, headers: HeaderMap) -> Response {
    match authorize(&store, &headers, false) {
        Ok(user) => Json(user).into_response(),
        Err(response) => response,
    }
}

async fn public_programs(State(store): State<Shared>) -> Response {
    let store = store.lock().unwrap();
    let programs: Vec<Value> = store.programs.values().cloned().collect();
    Json(programs).into_response()
}

fn record_hit(store: &Shared, uri: &Uri) {
    store.lock().unwrap().catalog_hits.push(uri.to_string());
}

async fn program_subcourses(State(store): State<Shared>, uri: Uri, UrlPath(id): UrlPath<Uuid>) -> Response {
    record_hit(&store, &uri);
    Json(json!([{
        "id": Uuid::new_v4(),
        "program_id": id,
        "name": "Starter",
        "slug": "starter",
        "status": "published"
    }]))
    .into_response()
}

async fn public_subcourses(State(store): State<Shared>, uri: Uri) -> Response {
    record_hit(&store, &uri);
    Json(json!([])).into_response()
}

async fn public_lessons(State(store): State<Shared>, uri: Uri, UrlPath(_id): UrlPath<Uuid>) -> Response {
    record_hit(&store, &uri);
    Json(json!([])).into_response()
}

async fn public_lessons_flat(State(store): State<Shared>, uri: Uri) -> Response {
    record_hit(&store, &uri);
    Json(json!([])).into_response()
}

async fn list_programs(State(store): State<Shared>, headers: HeaderMap) -> Response {
    if let Err(response) = authorize(&store, &headers, true) {
        return response;
    }
    public_programs(State(store)).await
}

fn stamp(record: &mut Value, id: Uuid) {
    record["id"] = json!(id);
    record["created_at"] = json!("2025-01-01T00:00:00Z");
    record["updated_at"] = json!("2025-01-02T00:00:00Z");
    if record.get("media").is_none_or(Value::is_null) {
        record["media"] = json!([]);
    }
}

async fn create_program(State(store): State<Shared>, headers: HeaderMap, Json(mut body): Json<Value>) -> Response {
    if let Err(response) = authorize(&store, &headers, true) {
        return response;
    }
    let mut store = store.lock().unwrap();
    store.bodies.push(body.clone());
    let id = Uuid::new_v4();
    stamp(&mut body, id);
    store.programs.insert(id, body.clone());
    (StatusCode::CREATED, Json(body)).into_response()
}

async fn get_program(State(store): State<Shared>, headers: HeaderMap, UrlPath(id): UrlPath<Uuid>) -> Response {
    if let Err(response) = authorize(&store, &headers, true) {
        return response;
    }
    match store.lock().unwrap().programs.get(&id) {
        Some(program) => Json(program.clone()).into_response(),
        None => error(StatusCode::NOT_FOUND, "Program not found"),
    }
}

async fn update_program(
    State(store): State<Shared>,
    headers: HeaderMap,
    UrlPath(id): UrlPath<Uuid>,
    Json(mut body): Json<Value>,
) -> Response {
    if let Err(response) = authorize(&store, &headers, true) {
        return response;
    }
    let mut store = store.lock().unwrap();
    store.bodies.push(body.clone());
    let Some(existing) = store.programs.get(&id) else {
        return error(StatusCode::NOT_FOUND, "Program not found");
    };
    let media = existing["media"].clone();
    stamp(&mut body, id);
    body["media"] = media;
    store.programs.insert(id, body.clone());
    Json(body).into_response()
}

async fn delete_program(State(store): State<Shared>, headers: HeaderMap, UrlPath(id): UrlPath<Uuid>) -> Response {
    if let Err(response) = authorize(&store, &headers, true) {
        return response;
    }
    match store.lock().unwrap().programs.remove(&id) {
        Some(_) => Json(json!({ "message": "Program deleted" })).into_response(),
        None => (StatusCode::NOT_FOUND, "Program not found").into_response(),
    }
}

/// Gives the lesson and every child record fresh ids, the way the server
/// recreates children on each save.
fn assign_lesson_ids(lesson: &mut Value, id: Uuid) {
    stamp(lesson, id);
    for key in ["objectives", "preparation"] {
        if let Some(record) = lesson.get_mut(key).filter(|v| v.is_object()) {
            record["id"] = json!(Uuid::new_v4());
            record["lesson_id"] = json!(id);
        }
    }
    for key in CHILD_LISTS {
        if let Some(Value::Array(items)) = lesson.get_mut(key) {
            for item in items {
                item["id"] = json!(Uuid::new_v4());
                item["lesson_id"] = json!(id);
                if item.get("media").is_none_or(Value::is_null) {
                    item["media"] = json!([]);
                }
            }
        }
    }
}

async fn create_lesson(State(store): State<Shared>, headers: HeaderMap, Json(mut body): Json<Value>) -> Response {
    if let Err(response) = authorize(&store, &headers, false) {
        return response;
    }
    if body.get("id").is_some() {
        return error(StatusCode::BAD_REQUEST, "Client must not send ID on create");
    }
    let mut store = store.lock().unwrap();
    store.bodies.push(body.clone());
    let id = Uuid::new_v4();
    assign_lesson_ids(&mut body, id);
    store.lessons.insert(id, body.clone());
    if store.omit_child_ids {
        for key in CHILD_LISTS {
            if let Some(Value::Array(items)) = body.get_mut(key) {
                for item in items {
                    if let Some(item) = item.as_object_mut() {
                        item.remove("id");
                    }
                }
            }
        }
    }
    (StatusCode::CREATED, Json(body)).into_response()
}

async fn get_lesson(State(store): State<Shared>, headers: HeaderMap, UrlPath(id): UrlPath<Uuid>) -> Response {
    if let Err(response) = authorize(&store, &headers, false) {
        return response;
    }
    let mut store = store.lock().unwrap();
    store.lesson_gets += 1;
    match store.lessons.get(&id) {
        Some(lesson) => Json(lesson.clone()).into_response(),
        None => error(StatusCode::NOT_FOUND, "Lesson not found"),
    }
}

async fn update_lesson(
    State(store): State<Shared>,
    headers: HeaderMap,
    UrlPath(id): UrlPath<Uuid>,
    Json(mut body): Json<Value>,
) -> Response {
    if let Err(response) = authorize(&store, &headers, false) {
        return response;
    }
    let mut store = store.lock().unwrap();
    store.bodies.push(body.clone());
    if !store.lessons.contains_key(&id) {
        return error(StatusCode::NOT_FOUND, "Lesson not found");
    }
    assign_lesson_ids(&mut body, id);
    store.lessons.insert(id, body.clone());
    Json(body).into_response()
}

/// Appends `media` to whatever record in the store has id `owner`.
fn attach(store: &mut Store, owner: Uuid, media: &Value) -> bool {
    if let Some(program) = store.programs.get_mut(&owner) {
        push_media(program, media);
        return true;
    }
    for lesson in store.lessons.values_mut() {
        if lesson["id"] == json!(owner) {
            push_media(lesson, media);
            return true;
        }
        if lesson["preparation"]["id"] == json!(owner) {
            push_media(&mut lesson["preparation"], media);
            return true;
        }
        for key in CHILD_LISTS {
            if let Some(Value::Array(items)) = lesson.get_mut(key) {
                if let Some(item) = items.iter_mut().find(|item| item["id"] == json!(owner)) {
                    push_media(item, media);
                    return true;
                }
            }
        }
    }
    false
}

fn push_media(record: &mut Value, media: &Value) {
    match record.get_mut("media") {
        Some(Value::Array(items)) => items.push(media.clone()),
        _ => record["media"] = json!([media]),
    }
}

async fn upload_media(State(store): State<Shared>, headers: HeaderMap, mut multipart: Multipart) -> Response {
    if let Err(response) = authorize(&store, &headers, false) {
        return response;
    }

    let mut fields: HashMap<String, String> = HashMap::new();
    let mut file: Option<(String, String)> = None;
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        if name == "file" {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let content_type = field.content_type().unwrap_or_default().to_string();
            let _ = field.bytes().await;
            file = Some((file_name, content_type));
        } else {
            fields.insert(name, field.text().await.unwrap_or_default());
        }
    }

    let Some((file_name, content_type)) = file else {
        return error(StatusCode::BAD_REQUEST, "No file uploaded");
    };
    let Some(owner_id) = fields.get("owner_id").and_then(|id| id.parse::<Uuid>().ok()) else {
        return error(StatusCode::BAD_REQUEST, "Invalid owner_id");
    };
    let owner_type = fields.get("owner_type").cloned().unwrap_or_default();

    let mut store = store.lock().unwrap();
    if store.fail_uploads || store.fail_owner_type.as_deref() == Some(owner_type.as_str()) {
        return error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to save file");
    }
    let media = json!({
        "id": Uuid::new_v4(),
        "filename": file_name,
        "url": format!("/uploads/{}/{}", owner_type, file_name),
        "mime_type": content_type,
        "purpose": fields.get("purpose").cloned().unwrap_or_else(|| "other".into()),
        "sort_order": 0
    });
    if !attach(&mut store, owner_id, &media) {
        return error(StatusCode::BAD_REQUEST, "Owner not found");
    }
    store.uploads.push(Upload {
        owner_type,
        owner_id,
        purpose: fields.get("purpose").cloned(),
        file_name,
        content_type,
    });
    (StatusCode::CREATED, Json(json!({ "media": [media] }))).into_response()
}

async fn teacher_history(State(store): State<Shared>, headers: HeaderMap) -> Response {
    if let Err(response) = authorize(&store, &headers, true) {
        return response;
    }
    Json(Value::Null).into_response()
}

async fn teacher_assignments(State(store): State<Shared>, headers: HeaderMap, UrlPath(id): UrlPath<Uuid>) -> Response {
    if let Err(response) = authorize(&store, &headers, true) {
        return response;
    }
    Json(json!({
        "assignments": [{
            "id": Uuid::new_v4(),
            "teacher_id": id,
            "program_id": Uuid::new_v4(),
            "scope_level": "program",
            "status": "active"
        }]
    }))
    .into_response()
}
