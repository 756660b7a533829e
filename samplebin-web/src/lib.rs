//! samplebin-web library — HTTP service for the samplebin sample-sharing site

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue};
use axum::routing::get;
use axum::Router;
use sqlx::SqlitePool;
use tower::ServiceBuilder;
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod auth;
pub mod error;
pub mod locks;
pub mod storage;

use locks::SampleLocks;
use storage::{FileKind, Storage};

/// Per-request body cap for uploads (image + audio + form fields)
const UPLOAD_BODY_LIMIT: usize = 1024 * 1024 * 1024;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Media storage (img/ and samples/ directories)
    pub storage: Storage,
    /// Per-sample-name write locks
    pub locks: SampleLocks,
}

impl AppState {
    pub fn new(db: SqlitePool, storage: Storage) -> Self {
        Self {
            db,
            storage,
            locks: SampleLocks::new(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    // Audio downloads are forced to an attachment disposition
    let audio_service = ServiceBuilder::new()
        .layer(SetResponseHeaderLayer::if_not_present(
            header::CONTENT_DISPOSITION,
            HeaderValue::from_static("attachment"),
        ))
        .service(ServeDir::new(state.storage.dir(FileKind::Audio)));

    let image_service = ServeDir::new(state.storage.dir(FileKind::Image));

    Router::new()
        .route("/", get(api::pages::serve_index))
        .route("/static/app.js", get(api::pages::serve_app_js))
        .route(
            "/login",
            get(api::pages::login_page).post(api::pages::login_submit),
        )
        .route(
            "/register",
            get(api::pages::register_page).post(api::pages::register_submit),
        )
        .route("/logout", get(api::pages::logout))
        .route(
            "/upload",
            get(api::pages::upload_page).post(api::upload::upload_submit),
        )
        .route(
            "/modify",
            get(api::modify::modify_page).post(api::modify::modify_submit),
        )
        .route("/api/samples", get(api::samples::list_samples))
        .route("/api/search", get(api::samples::search_samples))
        .route("/api/download", get(api::samples::record_download))
        .nest_service("/img", image_service)
        .nest_service("/samples", audio_service)
        .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
