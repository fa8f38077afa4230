/// Application state and router builder
///
/// Defines the shared application state and builds the Axum router with all
/// routes and middleware. The state carries the hierarchy service over an
/// `Arc<dyn BoardStore>`, so the same router runs against PostgreSQL in
/// production and the in-memory store in tests.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use taskdeck_api::{app::{build_router, AppState}, config::Config};
/// use taskdeck_shared::store::MemoryStore;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let state = AppState::new(Arc::new(MemoryStore::new()), config);
/// let app = build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::config::Config;
use axum::{
    extract::Request,
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use taskdeck_shared::auth::{jwt, middleware::AuthContext};
use taskdeck_shared::hierarchy::BoardService;
use taskdeck_shared::store::BoardStore;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor; cloning is
/// cheap (two Arcs).
#[derive(Clone)]
pub struct AppState {
    /// Board hierarchy operations over the configured store
    pub boards: BoardService,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state over a store implementation
    pub fn new(store: Arc<dyn BoardStore>, config: Config) -> Self {
        Self {
            boards: BoardService::new(store),
            config: Arc::new(config),
        }
    }

    /// Gets the JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                        # Health check (public)
/// └── /v1/                           # API v1 (versioned)
///     ├── /auth/                     # Authentication (public)
///     │   ├── POST /register
///     │   ├── POST /login
///     │   └── POST /refresh
///     ├── /users/me                  # Account (authenticated)
///     ├── /projects[/:id]            # Projects + stats + children
///     ├── /lists[/:id]               # Lists + position + tasks
///     └── /tasks[/:id]               # Tasks + position
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. JWT authentication (everything under /v1 except /v1/auth)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Auth routes (public, no auth required)
    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/refresh", post(routes::auth::refresh));

    // Account routes
    let user_routes = Router::new()
        .route("/me", get(routes::users::me))
        .route("/me", put(routes::users::update_me))
        .route("/me", axum::routing::delete(routes::users::delete_me));

    // Project routes
    let project_routes = Router::new()
        .route("/", post(routes::projects::create_project))
        .route("/", get(routes::projects::list_projects))
        .route("/:id", get(routes::projects::get_project))
        .route("/:id", put(routes::projects::update_project))
        .route("/:id", axum::routing::delete(routes::projects::delete_project))
        .route("/:id/stats", get(routes::projects::get_stats))
        .route("/:id/lists", post(routes::lists::create_list))
        .route("/:id/lists", get(routes::lists::get_project_lists))
        .route("/:id/tasks", get(routes::tasks::get_project_tasks));

    // List routes
    let list_routes = Router::new()
        .route("/:id", get(routes::lists::get_list))
        .route("/:id", put(routes::lists::update_list))
        .route("/:id", axum::routing::delete(routes::lists::delete_list))
        .route("/:id/position", put(routes::lists::move_list))
        .route("/:id/tasks", post(routes::tasks::create_task))
        .route("/:id/tasks", get(routes::tasks::get_list_tasks));

    // Task routes
    let task_routes = Router::new()
        .route("/:id", get(routes::tasks::get_task))
        .route("/:id", put(routes::tasks::update_task))
        .route("/:id", axum::routing::delete(routes::tasks::delete_task))
        .route("/:id/position", put(routes::tasks::move_task));

    // Everything except /auth requires a valid access token
    let protected = Router::new()
        .nest("/users", user_routes)
        .nest("/projects", project_routes)
        .nest("/lists", list_routes)
        .nest("/tasks", task_routes)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let v1_routes = Router::new().nest("/auth", auth_routes).merge(protected);

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        // Development mode: permissive CORS
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

/// JWT authentication middleware layer
///
/// Extracts and validates the bearer token from the Authorization header,
/// then injects an `AuthContext` into request extensions.
async fn jwt_auth_layer(
    state: axum::extract::State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, crate::error::ApiError> {
    let auth_header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            crate::error::ApiError::Unauthorized("Missing authorization header".to_string())
        })?;

    let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        crate::error::ApiError::BadRequest("Expected Bearer token".to_string())
    })?;

    let claims = jwt::validate_access_token(token, state.jwt_secret())?;

    let auth_context = AuthContext::from_jwt(claims.sub);
    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}
