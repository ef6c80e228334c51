use actix_web::{web, App, HttpServer, HttpResponse, Result, ResponseError, middleware};
use actix_web::http::StatusCode;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, MutexGuard};

use crate::allocation::{AllocationNotice, AllocationResult, Pattern};
use crate::cache::{fingerprint, UploadCache};
use crate::config::Config;
use crate::display::render_allocation;
use crate::error::SeatingError;
use crate::parser::parse_seating_input;
use crate::request::{
    export_allocation_to_string, run_request, run_with_strategy, validate_request, AllocationRequest,
    AllocationResponse, Strategy,
};

/// Shared service state; each request allocates on its own copy of the input
pub struct AppState {
    pub uploads: Mutex<UploadCache>,
    pub config: Config,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        AppState {
            uploads: Mutex::new(UploadCache::new(config.cache_ttl, config.cache_capacity)),
            config,
        }
    }

    fn uploads(&self) -> MutexGuard<'_, UploadCache> {
        // A panic while holding the lock leaves the cache usable
        self.uploads.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ResponseError for SeatingError {
    fn status_code(&self) -> StatusCode {
        match self {
            SeatingError::UnknownUpload(_) => StatusCode::NOT_FOUND,
            e if e.is_client_error() => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "success": false,
            "error": self.to_string(),
        }))
    }
}

#[derive(Serialize)]
pub struct UploadResponse {
    success: bool,
    key: String,
    students: usize,
    rooms: usize,
    expires_at: String,
}

#[derive(Deserialize)]
pub struct AllocationQuery {
    pattern: Option<String>,
    #[serde(default)]
    strategy: Strategy,
    seed: Option<u64>,
}

// Pattern listing endpoint
async fn list_patterns() -> Result<HttpResponse> {
    let names: Vec<&str> = Pattern::ALL.iter().map(|p| p.name()).collect();
    Ok(HttpResponse::Ok().json(serde_json::json!({ "patterns": names })))
}

// One-shot allocation from a JSON body
async fn preview(
    req: web::Json<AllocationRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, SeatingError> {
    validate_request(&req, state.config.max_room_desks)?;
    let result = run_request(&req, state.config.pattern)?;
    Ok(HttpResponse::Ok().json(AllocationResponse::from(result)))
}

// CSV upload endpoint
async fn upload(body: web::Bytes, state: web::Data<AppState>) -> Result<HttpResponse, SeatingError> {
    let input = parse_seating_input(body.as_ref(), &state.config.room_defaults, state.config.max_room_desks)?;
    let key = fingerprint(&body);
    let (students, rooms) = (input.students.len(), input.rooms.len());
    let expires_at = state.uploads().insert(key.clone(), input, Utc::now());
    log::info!("Cached upload {} ({} roll rows, {} rooms)", key, students, rooms);

    Ok(HttpResponse::Ok().json(UploadResponse {
        success: true,
        key,
        students,
        rooms,
        expires_at: expires_at.to_rfc3339(),
    }))
}

/// Resolves the allocation for a cached upload. Deterministic runs are memoized per
/// resolved pattern, and the unknown-pattern notice is added per request; shuffled runs
/// are recomputed.
fn cached_allocation(
    state: &AppState,
    key: &str,
    query: &AllocationQuery,
) -> std::result::Result<AllocationResult, SeatingError> {
    let requested = query.pattern.clone().unwrap_or_else(|| state.config.pattern.name().to_string());
    let mut uploads = state.uploads();
    let now = Utc::now();

    let found = match query.strategy {
        Strategy::Pairs => {
            let resolved = Pattern::from_name(&requested);
            let pattern = resolved.unwrap_or_default();
            uploads
                .allocation(key, pattern, now, |input| {
                    run_with_strategy(&input.students, &input.rooms, pattern.name(), Strategy::Pairs, None)
                })
                .map(|mut result| {
                    if resolved.is_none() {
                        log::warn!("Unknown seating pattern '{}', using standard", requested);
                        result
                            .notices
                            .insert(0, AllocationNotice::UnknownPattern { name: requested.clone() });
                    }
                    result
                })
        }
        Strategy::CohortShuffle => uploads.get_mut(key, now).map(|entry| {
            run_with_strategy(&entry.input.students, &entry.input.rooms, &requested, query.strategy, query.seed)
        }),
    };
    found.ok_or_else(|| SeatingError::UnknownUpload(key.to_string()))
}

async fn get_allocation(
    key: web::Path<String>,
    query: web::Query<AllocationQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, SeatingError> {
    let result = cached_allocation(&state, &key, &query)?;
    Ok(HttpResponse::Ok().json(AllocationResponse::from(result)))
}

async fn get_layout(
    key: web::Path<String>,
    query: web::Query<AllocationQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, SeatingError> {
    let result = cached_allocation(&state, &key, &query)?;
    Ok(HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body(render_allocation(&result)))
}

async fn get_export(
    key: web::Path<String>,
    query: web::Query<AllocationQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, SeatingError> {
    let result = cached_allocation(&state, &key, &query)?;
    let csv = export_allocation_to_string(&result)?;
    Ok(HttpResponse::Ok()
        .content_type("text/csv")
        .insert_header(("Content-Disposition", "attachment; filename=seating_plan.csv"))
        .body(csv))
}

/// Registers every route; shared by the server and the handler tests
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/patterns", web::get().to(list_patterns))
        .route("/api/preview", web::post().to(preview))
        .route("/api/upload", web::post().to(upload))
        .route("/api/allocation/{key}", web::get().to(get_allocation))
        .route("/api/allocation/{key}/layout", web::get().to(get_layout))
        .route("/api/allocation/{key}/export", web::get().to(get_export));
}

pub async fn start_server(config: Config) -> std::io::Result<()> {
    let port = config.port;
    let app_state = web::Data::new(AppState::new(config));

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(middleware::Logger::default())
            .configure(configure)
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
