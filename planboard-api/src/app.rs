/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use planboard_api::{app::{build_router, AppState}, config::Config, mail::LogMailer};
/// use planboard_shared::store::InMemoryStore;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let state = AppState::new(Arc::new(InMemoryStore::new()), Arc::new(LogMailer), config);
/// let app = build_router(state);
///
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:3001").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{get, post},
    Router,
};
use planboard_shared::{
    auth::middleware::{jwt_auth_middleware, AuthError},
    store::PlannerStore,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::{
    config::Config, mail::Mailer, middleware::security::SecurityHeadersLayer, services::Services,
};

/// Shared application state, cloned into every handler
#[derive(Clone)]
pub struct AppState {
    /// Persistence, used directly only by the health check
    pub store: Arc<dyn PlannerStore>,

    pub services: Arc<Services>,

    pub config: Arc<Config>,
}

impl AppState {
    /// Wires the services over `store` and `mailer`
    pub fn new(store: Arc<dyn PlannerStore>, mailer: Arc<dyn Mailer>, config: Config) -> Self {
        let services = Services::new(store.clone(), mailer, &config);
        Self {
            store,
            services: Arc::new(services),
            config: Arc::new(config),
        }
    }

    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete router
///
/// ```text
/// /
/// ├── GET /health
/// └── /api/
///     ├── /auth/        login, reset-email, pw-reset (public); profile
///     ├── /users/       create (public); account, update
///     ├── /projects/    GET /, GET /:id, create, update, delete
///     ├── /lists/       create, update, reorder, delete
///     ├── /features/    create, update, reorder, delete
///     ├── /user-stories/ create, update, reorder, delete
///     └── /tasks/       create, update, reorder, delete
/// ```
///
/// Everything except the public routes sits behind the bearer-token guard.
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let auth = || axum::middleware::from_fn_with_state(state.clone(), jwt_auth_layer);

    let auth_routes = Router::new()
        .route("/profile", get(routes::auth::profile))
        .layer(auth())
        .route("/login", post(routes::auth::login))
        .route("/reset-email", post(routes::auth::reset_email))
        .route("/pw-reset", post(routes::auth::password_reset));

    let user_routes = Router::new()
        .route("/account", get(routes::users::account))
        .route("/update", post(routes::users::update))
        .layer(auth())
        .route("/create", post(routes::users::create));

    let project_routes = Router::new()
        .route("/", get(routes::projects::list))
        .route("/:id", get(routes::projects::get))
        .route("/create", post(routes::projects::create))
        .route("/update", post(routes::projects::update))
        .route("/delete", post(routes::projects::delete))
        .layer(auth());

    let list_routes = Router::new()
        .route("/create", post(routes::lists::create))
        .route("/update", post(routes::lists::update))
        .route("/reorder", post(routes::lists::reorder))
        .route("/delete", post(routes::lists::delete))
        .layer(auth());

    let feature_routes = Router::new()
        .route("/create", post(routes::features::create))
        .route("/update", post(routes::features::update))
        .route("/reorder", post(routes::features::reorder))
        .route("/delete", post(routes::features::delete))
        .layer(auth());

    let user_story_routes = Router::new()
        .route("/create", post(routes::user_stories::create))
        .route("/update", post(routes::user_stories::update))
        .route("/reorder", post(routes::user_stories::reorder))
        .route("/delete", post(routes::user_stories::delete))
        .layer(auth());

    let task_routes = Router::new()
        .route("/create", post(routes::tasks::create))
        .route("/update", post(routes::tasks::update))
        .route("/reorder", post(routes::tasks::reorder))
        .route("/delete", post(routes::tasks::delete))
        .layer(auth());

    let api_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/users", user_routes)
        .nest("/projects", project_routes)
        .nest("/lists", list_routes)
        .nest("/features", feature_routes)
        .nest("/user-stories", user_story_routes)
        .nest("/tasks", task_routes);

    let cors = if state.config.api.cors_origins.iter().any(|o| o == "*") {
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
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(health_routes)
        .nest("/api", api_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

/// Bearer-token guard; adds `AuthContext` to the request extensions
async fn jwt_auth_layer(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    jwt_auth_middleware(state.jwt_secret().to_string(), req, next).await
}
