use std::sync::Arc;

use axum::routing::{delete, get, post, put};
use axum::Router;
use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

mod config;
mod matching;
mod models;
mod routes;
mod schema;
mod sessions;
mod storage;
mod timeslot;

use config::AppConfig;
use sessions::SessionNegotiator;
use storage::{DbPool, PgStore, Store};

pub struct AppState {
    pub db: DbPool,
    pub config: AppConfig,
    pub store: Arc<dyn Store>,
    pub negotiator: SessionNegotiator,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    buddy_shared::middleware::init_tracing("buddy-scheduling");

    let config = AppConfig::load()?;
    let port = config.port;

    // Database pool
    let manager = ConnectionManager::<PgConnection>::new(&config.database_url);
    let db = Pool::builder().max_size(10).build(manager)?;

    let store: Arc<dyn Store> = Arc::new(PgStore::new(db.clone()));
    let negotiator = SessionNegotiator::new(store.clone());

    let state = Arc::new(AppState {
        db,
        config,
        store,
        negotiator,
    });

    let app = Router::new()
        // Health
        .route("/health", get(routes::health::health_check))
        // Users
        .route("/users", post(routes::users::create_user))
        .route(
            "/users/:id",
            get(routes::users::get_user)
                .put(routes::users::rename_user)
                .delete(routes::users::delete_user),
        )
        // Courses & enrollments
        .route("/courses", get(routes::courses::list_courses))
        .route("/users/:id/enrollments", post(routes::courses::enroll))
        .route(
            "/users/:id/enrollments/:code",
            delete(routes::courses::drop_course),
        )
        .route("/users/:id/courses", get(routes::courses::courses_for_user))
        .route(
            "/users/:id/classmates/:code",
            get(routes::courses::classmates),
        )
        // Availability windows
        .route(
            "/users/:id/availability",
            post(routes::availability::add_window).get(routes::availability::list_windows),
        )
        .route(
            "/availability/:id",
            delete(routes::availability::remove_window),
        )
        // Matching
        .route(
            "/users/:id/matches/:course_code",
            get(routes::matches::suggest_matches),
        )
        // Session negotiation
        .route("/sessions", post(routes::sessions::request_session))
        .route(
            "/sessions/:id/respond",
            put(routes::sessions::respond_session),
        )
        .route(
            "/users/:id/sessions/confirmed",
            get(routes::sessions::list_confirmed_sessions),
        )
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("0.0.0.0:{port}");
    tracing::info!(addr = %addr, "buddy-scheduling starting");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
