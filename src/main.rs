use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

mod auth;
mod config;
mod db;
mod error;
mod handlers;
mod models;
mod services;

use auth::rate_limit::RateLimiter;
use config::Config;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<Config>,
    pub rate_limiter: RateLimiter,
}

fn app(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/api/auth/register", post(handlers::auth::register))
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/auth/refresh", post(handlers::auth::refresh))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::rate_limit::rate_limit_auth,
        ));

    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/readyz", get(handlers::health::readyz))
        .merge(auth_routes);

    let protected_routes = Router::new()
        .route("/api/me", get(handlers::auth::me))
        .route("/api/auth/logout", post(handlers::auth::logout))
        // Daily reports
        .route(
            "/api/daily-reports",
            post(handlers::daily_reports::create_daily_report),
        )
        .route(
            "/api/daily-reports",
            get(handlers::daily_reports::list_daily_reports),
        )
        .route(
            "/api/daily-reports/:id",
            get(handlers::daily_reports::get_daily_report),
        )
        .route(
            "/api/daily-reports/:id",
            put(handlers::daily_reports::update_daily_report),
        )
        .route(
            "/api/daily-reports/:id",
            delete(handlers::daily_reports::delete_daily_report),
        )
        // Good points & improvements (nested create, flat access)
        .route(
            "/api/daily-reports/:id/good-points",
            post(handlers::items::create_good_point),
        )
        .route(
            "/api/daily-reports/:id/improvements",
            post(handlers::items::create_improvement),
        )
        .route("/api/good-points/:id", get(handlers::items::get_good_point))
        .route("/api/good-points/:id", put(handlers::items::update_good_point))
        .route(
            "/api/good-points/:id",
            delete(handlers::items::delete_good_point),
        )
        .route(
            "/api/improvements/:id",
            get(handlers::items::get_improvement),
        )
        .route(
            "/api/improvements/:id",
            put(handlers::items::update_improvement),
        )
        .route(
            "/api/improvements/:id",
            delete(handlers::items::delete_improvement),
        )
        // Followups
        .route("/api/followups", post(handlers::followups::create_followup))
        .route("/api/followups", get(handlers::followups::list_followups))
        .route("/api/followups/:id", put(handlers::followups::update_followup))
        .route(
            "/api/followups/:id",
            delete(handlers::followups::delete_followup),
        )
        // Goal hierarchy
        .route("/api/goals", post(handlers::goals::create_goal))
        .route("/api/goals", get(handlers::goals::list_root_goals))
        .route("/api/goals/:id", get(handlers::goals::get_goal))
        .route(
            "/api/goals/:id/children",
            get(handlers::goals::list_goal_children),
        )
        .route("/api/goals/:id", put(handlers::goals::update_goal))
        .route("/api/goals/:id", delete(handlers::goals::delete_goal))
        // Weekly focuses
        .route(
            "/api/weekly-focuses",
            get(handlers::weekly_focus::list_current_focuses),
        )
        .route(
            "/api/weekly-focuses",
            post(handlers::weekly_focus::add_focus),
        )
        .route(
            "/api/weekly-focuses/:id",
            delete(handlers::weekly_focus::remove_focus),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::middleware::require_auth,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nippo_api=debug,tower_http=debug".into()),
        )
        .json()
        .init();

    let config = Arc::new(Config::from_env());

    let db = db::create_pool(&config.database_url).await;

    sqlx::migrate!("./migrations")
        .run(&db)
        .await
        .expect("Failed to run database migrations");

    tracing::info!("Database migrations applied");

    let state = AppState {
        db,
        config: config.clone(),
        rate_limiter: RateLimiter::new(5, 60),
    };

    let allowed_origins: Vec<axum::http::HeaderValue> = {
        let mut origins = vec![config
            .frontend_url
            .parse::<axum::http::HeaderValue>()
            .expect("FRONTEND_URL must be a valid origin")];
        if let Ok(extra) = std::env::var("CORS_EXTRA_ORIGINS") {
            for o in extra.split(',') {
                if let Ok(hv) = o.trim().parse::<axum::http::HeaderValue>() {
                    origins.push(hv);
                }
            }
        }
        origins
    };
    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::PUT,
            axum::http::Method::DELETE,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
            axum::http::header::ACCEPT,
        ])
        .allow_credentials(true);

    let app = app(state).layer(cors).layer(TraceLayer::new_for_http());

    let addr = config.listen_addr();
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind listen address");
    // connect_info provides the client IP for auth rate limiting
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .await
    .expect("Server error");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::util::ServiceExt;

    fn test_state() -> AppState {
        let db = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://localhost/nippo_test")
            .unwrap();
        AppState {
            db,
            config: Arc::new(Config {
                database_url: "postgres://localhost/nippo_test".into(),
                host: "127.0.0.1".into(),
                port: 0,
                frontend_url: "http://localhost:3000".into(),
                jwt_secret: "test-secret".into(),
                jwt_access_ttl_secs: 900,
                jwt_refresh_ttl_secs: 604800,
            }),
            rate_limiter: RateLimiter::new(5, 60),
        }
    }

    #[tokio::test]
    async fn test_health_endpoint_responds_without_db() {
        let app = app(test_state());

        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["service"], "nippo-api");
    }

    #[tokio::test]
    async fn test_protected_route_rejects_missing_token() {
        let app = app(test_state());

        let response = app
            .oneshot(Request::get("/api/me").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
