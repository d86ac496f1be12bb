// todo-pdf: browser UI and JSON API served with tiny_http
//
// Requests are handled one at a time. Routing is a pure function of
// (method, url, body) so it can be exercised without a socket.

use std::fs;
use std::path::PathBuf;

use serde::Deserialize;
use serde_json::{json, Value};
use tiny_http::{Header, Request, Response, Server};
use uuid::Uuid;

use crate::config::Configuration;
use crate::error::AppError;
use crate::gallery::{Gallery, SortOrder};
use crate::presets;
use crate::render;
use crate::scaling;
use crate::share;
use crate::store::ConfigStore;

const INDEX_HTML: &str = include_str!("../ui/index.html");

// ============================================================================
// Data Structures
// ============================================================================

/// Server settings, filled from CLI flags or environment.
#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub bind: String,
    pub port: u16,
    pub config_dir: PathBuf,
    pub output_dir: PathBuf,
    pub gallery_dir: PathBuf,
}

/// Everything a request handler may touch.
pub struct AppState {
    pub store: ConfigStore,
    pub gallery: Gallery,
    pub output_dir: PathBuf,
    pub base_url: String,
}

impl AppState {
    pub fn new(settings: &ServerSettings) -> Result<Self, AppError> {
        fs::create_dir_all(&settings.output_dir)?;
        Ok(Self {
            store: ConfigStore::new(&settings.config_dir),
            gallery: Gallery::open(&settings.gallery_dir)?,
            output_dir: settings.output_dir.clone(),
            base_url: format!("http://{}:{}/", settings.bind, settings.port),
        })
    }
}

/// A response before it is handed to tiny_http.
#[derive(Debug)]
pub struct Reply {
    pub status: u16,
    pub content_type: &'static str,
    pub body: Vec<u8>,
    pub filename: Option<String>,
}

impl Reply {
    fn json(status: u16, value: &Value) -> Self {
        Self {
            status,
            content_type: "application/json",
            body: value.to_string().into_bytes(),
            filename: None,
        }
    }

    fn ok(value: Value) -> Self {
        Self::json(200, &value)
    }

    fn pdf(bytes: Vec<u8>, filename: Option<String>) -> Self {
        Self {
            status: 200,
            content_type: "application/pdf",
            body: bytes,
            filename,
        }
    }

    fn html(body: &str) -> Self {
        Self {
            status: 200,
            content_type: "text/html; charset=utf-8",
            body: body.as_bytes().to_vec(),
            filename: None,
        }
    }

    fn not_found(what: &str) -> Self {
        Self::json(404, &json!({ "error": format!("Not found: {}", what) }))
    }

    fn from_error(err: &AppError) -> Self {
        let status = if err.is_not_found() {
            404
        } else if err.is_bad_input() {
            400
        } else {
            500
        };
        if status == 500 {
            log::error!("{}", err);
        } else {
            log::warn!("{}", err);
        }
        Self::json(status, &json!({ "error": err.to_string() }))
    }

    fn into_response(self) -> Response<std::io::Cursor<Vec<u8>>> {
        let mut response = Response::from_data(self.body).with_status_code(self.status);
        if let Ok(header) = Header::from_bytes(&b"Content-Type"[..], self.content_type.as_bytes()) {
            response = response.with_header(header);
        }
        if let Some(name) = self.filename {
            let value = format!("attachment; filename=\"{}\"", name);
            if let Ok(header) = Header::from_bytes(&b"Content-Disposition"[..], value.as_bytes()) {
                response = response.with_header(header);
            }
        }
        response
    }
}

#[derive(Debug, Deserialize)]
struct ImportRequest {
    code: String,
}

#[derive(Debug, Deserialize)]
struct PublishRequest {
    config: Configuration,
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    tags: Vec<String>,
}

// ============================================================================
// Server Loop
// ============================================================================

/// Binds and serves until the process is stopped.
pub fn serve(settings: &ServerSettings) -> Result<(), AppError> {
    let mut state = AppState::new(settings)?;
    let addr = format!("{}:{}", settings.bind, settings.port);
    let server = Server::http(&addr).map_err(|e| AppError::ServerError(format!("{}: {}", addr, e)))?;
    log::info!("listening on http://{}", addr);
    println!("✓ Serving on http://{}", addr);

    for request in server.incoming_requests() {
        if let Err(e) = respond(&mut state, request) {
            log::error!("failed to send response: {}", e);
        }
    }
    Ok(())
}

fn respond(state: &mut AppState, mut request: Request) -> std::io::Result<()> {
    let mut body = String::new();
    if let Err(e) = request.as_reader().read_to_string(&mut body) {
        let reply = Reply::json(400, &json!({ "error": format!("unreadable body: {}", e) }));
        return request.respond(reply.into_response());
    }
    let method = request.method().as_str().to_uppercase();
    let url = request.url().to_string();
    let reply = handle(state, &method, &url, &body);
    log::info!("{} {} -> {}", method, url, reply.status);
    request.respond(reply.into_response())
}

// ============================================================================
// Routing
// ============================================================================

/// Dispatches one request.
pub fn handle(state: &mut AppState, method: &str, url: &str, body: &str) -> Reply {
    let (path, query) = match url.split_once('?') {
        Some((path, query)) => (path, query),
        None => (url, ""),
    };
    let segments: Vec<&str> = path.trim_matches('/').split('/').filter(|s| !s.is_empty()).collect();

    let result = match (method, segments.as_slice()) {
        ("GET", []) => return Reply::html(INDEX_HTML),
        ("POST", ["api", "resolve"]) => resolve(body),
        ("POST", ["api", "preview"]) => preview(body),
        ("POST", ["api", "generate"]) => generate(state, body),
        ("GET", ["download", file]) => download(state, file),
        ("GET", ["api", "configs"]) => state.store.list().map(|names| Reply::ok(json!({ "configs": names }))),
        ("GET", ["api", "configs", name]) => load_config(state, &percent_decode(name)),
        ("PUT", ["api", "configs", name]) => save_config(state, &percent_decode(name), body),
        ("DELETE", ["api", "configs", name]) => {
            let name = percent_decode(name);
            state.store.delete(&name).map(|_| Reply::ok(json!({ "deleted": name })))
        }
        ("GET", ["api", "presets"]) => Ok(Reply::ok(json!({
            "presets": presets::presets(),
            "themes": presets::themes(),
        }))),
        ("POST", ["api", "share"]) => share_export(state, body),
        ("POST", ["api", "share", "import"]) => share_import(body),
        ("GET", ["api", "gallery"]) => gallery_search(state, query),
        ("POST", ["api", "gallery"]) => gallery_publish(state, body),
        ("GET", ["api", "gallery", id]) => gallery_load(state, id),
        _ => return Reply::not_found(path),
    };

    result.unwrap_or_else(|e| Reply::from_error(&e))
}

// ============================================================================
// Handlers
// ============================================================================

fn resolve(body: &str) -> Result<Reply, AppError> {
    let config = Configuration::from_json(body)?;
    let resolved = scaling::resolve(&config);
    Ok(Reply::ok(json!({
        "page_width": resolved.page_width,
        "page_height": resolved.page_height,
        "settings": resolved.settings,
        "warnings": resolved.warnings,
        "items_per_page": resolved.settings.items_per_page(),
        "total_items": resolved.settings.total_items(),
        "detail_pages": resolved.settings.detail_page_count(),
        "total_pages": resolved.settings.total_pages(),
    })))
}

fn preview(body: &str) -> Result<Reply, AppError> {
    let config = Configuration::from_json(body)?;
    let pdf = render::generate_preview(&config)?;
    Ok(Reply::pdf(pdf.bytes, None))
}

fn generate(state: &AppState, body: &str) -> Result<Reply, AppError> {
    let config = Configuration::from_json(body)?;
    let pdf = render::generate_pdf(&config)?;

    let file = output_name(&config.output_filename);
    let path = state.output_dir.join(&file);
    pdf.write_to(&path)?;
    log::info!("wrote {} ({} pages, {} bytes)", path.display(), pdf.pages, pdf.bytes.len());

    Ok(Reply::ok(json!({
        "file": file,
        "url": format!("/download/{}", file),
        "pages": pdf.pages,
        "bytes": pdf.bytes.len(),
        "warnings": pdf.warnings,
    })))
}

fn download(state: &AppState, file: &str) -> Result<Reply, AppError> {
    let file = percent_decode(file);
    if !is_safe_filename(&file) {
        return Ok(Reply::not_found(&file));
    }
    let path = state.output_dir.join(&file);
    if !path.is_file() {
        return Ok(Reply::not_found(&file));
    }
    Ok(Reply::pdf(fs::read(&path)?, Some(file)))
}

fn load_config(state: &AppState, name: &str) -> Result<Reply, AppError> {
    let config = state.store.load(name)?;
    Ok(Reply::ok(serde_json::to_value(config)?))
}

fn save_config(state: &AppState, name: &str, body: &str) -> Result<Reply, AppError> {
    let config = Configuration::from_json(body)?;
    let path = state.store.save(name, &config)?;
    Ok(Reply::ok(json!({ "saved": name, "path": path.display().to_string() })))
}

fn share_export(state: &AppState, body: &str) -> Result<Reply, AppError> {
    let config = Configuration::from_json(body)?;
    Ok(Reply::ok(json!({
        "code": share::export_code(&config)?,
        "url": share::share_url(&state.base_url, &config)?,
    })))
}

fn share_import(body: &str) -> Result<Reply, AppError> {
    let request: ImportRequest = serde_json::from_str(body)?;
    let config = share::import_code(&request.code)?;
    Ok(Reply::ok(serde_json::to_value(config)?))
}

fn gallery_search(state: &AppState, query: &str) -> Result<Reply, AppError> {
    let mut text = String::new();
    let mut tags = Vec::new();
    let mut sort = SortOrder::Recent;
    for pair in query.split('&').filter(|p| !p.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        let value = percent_decode(value);
        match key {
            "q" => text = value,
            "tag" if !value.is_empty() => tags.push(value),
            "sort" => {
                sort = serde_json::from_value(Value::String(value.clone()))
                    .map_err(|_| AppError::ConfigError(format!("unknown sort order '{}'", value)))?;
            }
            _ => {}
        }
    }
    Ok(Reply::ok(json!({
        "results": state.gallery.search(&text, &tags, sort),
        "popular_tags": state.gallery.popular_tags(10),
        "total": state.gallery.stats().total,
    })))
}

fn gallery_load(state: &mut AppState, id: &str) -> Result<Reply, AppError> {
    let entry = state.gallery.load(id)?;
    Ok(Reply::ok(serde_json::to_value(entry)?))
}

fn gallery_publish(state: &mut AppState, body: &str) -> Result<Reply, AppError> {
    let request: PublishRequest = serde_json::from_str(body)?;
    if request.name.trim().is_empty() {
        return Err(AppError::ConfigError("gallery entries need a name".to_string()));
    }
    let (id, is_new) = state
        .gallery
        .publish(&request.config, request.name.trim(), &request.description, &request.tags)?;
    Ok(Reply::ok(json!({
        "id": id,
        "is_new": is_new,
        "url": share::gallery_url(&state.base_url, &id),
    })))
}

// ============================================================================
// Utilities
// ============================================================================

/// `{stem}-{short id}.pdf`, so concurrent downloads never collide.
fn output_name(output_filename: &str) -> String {
    let stem = output_filename.trim().trim_end_matches(".pdf");
    let stem: String = stem
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect();
    let stem = if stem.is_empty() { "todo_list".to_string() } else { stem };
    format!("{}-{}.pdf", stem, generate_short_id())
}

fn generate_short_id() -> String {
    let uuid = Uuid::new_v4();
    let hex = format!("{:x}", uuid);
    hex[..8].to_uppercase()
}

fn is_safe_filename(name: &str) -> bool {
    name.ends_with(".pdf")
        && !name.starts_with('.')
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
        && !name.contains("..")
}

/// Decodes `%XX` escapes and `+` in a query or path component.
fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => out.push(b' '),
            b'%' if i + 2 < bytes.len() => {
                let decoded = std::str::from_utf8(&bytes[i + 1..i + 3])
                    .ok()
                    .and_then(|hex| u8::from_str_radix(hex, 16).ok());
                match decoded {
                    Some(b) => {
                        out.push(b);
                        i += 2;
                    }
                    None => out.push(b'%'),
                }
            }
            b => out.push(b),
        }
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_state() -> (AppState, PathBuf) {
        let root = std::env::temp_dir().join(format!("todo-pdf-web-{}", Uuid::new_v4()));
        let settings = ServerSettings {
            bind: "127.0.0.1".to_string(),
            port: 8501,
            config_dir: root.join("configs"),
            output_dir: root.join("output"),
            gallery_dir: root.join("gallery"),
        };
        (AppState::new(&settings).unwrap(), root)
    }

    fn tiny_json() -> String {
        json!({
            "items_per_col": 5,
            "columns": 1,
            "pages_of_todos": 1,
            "detail_pages_per_todo": 1,
            "output_filename": "week plan.pdf"
        })
        .to_string()
    }

    fn body_json(reply: &Reply) -> Value {
        serde_json::from_slice(&reply.body).unwrap()
    }

    #[test]
    fn index_page_is_served() {
        let (mut state, root) = temp_state();
        let reply = handle(&mut state, "GET", "/", "");
        assert_eq!(reply.status, 200);
        assert!(reply.content_type.starts_with("text/html"));
        let html = String::from_utf8_lossy(&reply.body);
        assert!(html.contains("<form"));
        assert!(html.contains("id=\"gallery\""));
        assert!(html.contains("'load'"));
        fs::remove_dir_all(root).ok();
    }

    #[test]
    fn resolve_reports_counts_and_warnings() {
        let (mut state, root) = temp_state();
        let reply = handle(&mut state, "POST", "/api/resolve", r#"{"columns": 7, "pages_of_todos": 2}"#);
        assert_eq!(reply.status, 200);
        let value = body_json(&reply);
        assert_eq!(value["settings"]["columns"], 3);
        assert!(value["warnings"].as_array().unwrap().iter().any(|w| w["field"] == "columns"));
        assert!(value["total_pages"].as_u64().unwrap() > 2);
        fs::remove_dir_all(root).ok();
    }

    #[test]
    fn resolve_clamps_negative_and_fractional_counts() {
        let (mut state, root) = temp_state();
        let reply = handle(&mut state, "POST", "/api/resolve", r#"{"columns": -1, "items_per_col": 12.5}"#);
        assert_eq!(reply.status, 200);
        let value = body_json(&reply);
        assert_eq!(value["settings"]["columns"], 1);
        assert_eq!(value["settings"]["items_per_col"], 13);
        assert!(value["warnings"].as_array().unwrap().iter().any(|w| w["field"] == "columns"));
        fs::remove_dir_all(root).ok();
    }

    #[test]
    fn generate_then_download() {
        let (mut state, root) = temp_state();
        let reply = handle(&mut state, "POST", "/api/generate", &tiny_json());
        assert_eq!(reply.status, 200);
        let value = body_json(&reply);
        assert_eq!(value["pages"], 7);
        let file = value["file"].as_str().unwrap().to_string();
        assert!(file.starts_with("weekplan-"));

        let download = handle(&mut state, "GET", &format!("/download/{}", file), "");
        assert_eq!(download.status, 200);
        assert_eq!(download.content_type, "application/pdf");
        assert_eq!(&download.body[0..5], b"%PDF-");
        assert_eq!(download.filename.as_deref(), Some(file.as_str()));

        let escape = handle(&mut state, "GET", "/download/..%2Fsecret.pdf", "");
        assert_eq!(escape.status, 404);
        fs::remove_dir_all(root).ok();
    }

    #[test]
    fn preview_returns_pdf() {
        let (mut state, root) = temp_state();
        let reply = handle(&mut state, "POST", "/api/preview", "{}");
        assert_eq!(reply.status, 200);
        assert_eq!(&reply.body[0..5], b"%PDF-");
        fs::remove_dir_all(root).ok();
    }

    #[test]
    fn config_crud() {
        let (mut state, root) = temp_state();
        assert_eq!(handle(&mut state, "PUT", "/api/configs/my%20plan", &tiny_json()).status, 200);
        let list = body_json(&handle(&mut state, "GET", "/api/configs", ""));
        assert_eq!(list["configs"], json!(["my-plan"]));

        let loaded = body_json(&handle(&mut state, "GET", "/api/configs/my-plan", ""));
        assert_eq!(loaded["items_per_col"], 5);

        assert_eq!(handle(&mut state, "DELETE", "/api/configs/my-plan", "").status, 200);
        assert_eq!(handle(&mut state, "GET", "/api/configs/my-plan", "").status, 404);
        fs::remove_dir_all(root).ok();
    }

    #[test]
    fn share_round_trip_over_http() {
        let (mut state, root) = temp_state();
        let exported = body_json(&handle(&mut state, "POST", "/api/share", &tiny_json()));
        let code = exported["code"].as_str().unwrap();
        assert!(exported["url"].as_str().unwrap().starts_with("http://127.0.0.1:8501?config="));

        let imported = handle(&mut state, "POST", "/api/share/import", &json!({ "code": code }).to_string());
        assert_eq!(imported.status, 200);
        assert_eq!(body_json(&imported)["output_filename"], "week plan.pdf");

        let bad = handle(&mut state, "POST", "/api/share/import", r#"{"code": "!!"}"#);
        assert_eq!(bad.status, 400);
        fs::remove_dir_all(root).ok();
    }

    #[test]
    fn gallery_publish_search_load() {
        let (mut state, root) = temp_state();
        let request = json!({
            "config": serde_json::from_str::<Value>(&tiny_json()).unwrap(),
            "name": "Tiny week",
            "description": "five a page",
            "tags": ["minimal"]
        });
        let published = body_json(&handle(&mut state, "POST", "/api/gallery", &request.to_string()));
        assert_eq!(published["is_new"], true);
        let id = published["id"].as_str().unwrap().to_string();
        assert_eq!(published["url"], format!("http://127.0.0.1:8501?load={}", id));

        let found = body_json(&handle(&mut state, "GET", "/api/gallery?q=tiny+week&tag=minimal&sort=name", ""));
        assert_eq!(found["results"][0]["id"], id.as_str());
        assert_eq!(found["popular_tags"][0][0], "minimal");

        let entry = body_json(&handle(&mut state, "GET", &format!("/api/gallery/{}", id), ""));
        assert_eq!(entry["config"]["items_per_col"], 5);
        assert_eq!(handle(&mut state, "GET", "/api/gallery/00000000", "").status, 404);
        assert_eq!(handle(&mut state, "GET", "/api/gallery?sort=loudest", "").status, 400);
        fs::remove_dir_all(root).ok();
    }

    #[test]
    fn presets_and_unknown_routes() {
        let (mut state, root) = temp_state();
        let value = body_json(&handle(&mut state, "GET", "/api/presets", ""));
        assert_eq!(value["presets"].as_array().unwrap().len(), 3);
        assert_eq!(value["themes"].as_array().unwrap().len(), 5);
        assert_eq!(handle(&mut state, "GET", "/nope", "").status, 404);
        assert_eq!(handle(&mut state, "POST", "/api/generate", "not json").status, 400);
        fs::remove_dir_all(root).ok();
    }

    #[test]
    fn decoding_and_names() {
        assert_eq!(percent_decode("my%20plan+b"), "my plan b");
        assert_eq!(percent_decode("100%"), "100%");
        assert!(is_safe_filename("todo_list-1A2B3C4D.pdf"));
        assert!(!is_safe_filename("../todo.pdf"));
        assert!(!is_safe_filename("notes.txt"));
        assert!(output_name("").starts_with("todo_list-"));
    }
}
