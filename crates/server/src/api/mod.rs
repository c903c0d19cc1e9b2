pub mod categories;
pub mod health;
pub mod multipart;
pub mod openapi;
pub mod posts;
pub mod query;
pub mod schemas;
pub mod users;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post, put};
use inkwell_service::{BlogService, CategoryService, UserService};
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use self::health::{Probe, RepositoryProbe};
use self::openapi::ApiDoc;
use crate::auth::{AuthLayer, JwtManager};
use crate::factory::Backends;

/// Request limits and cookie settings.
#[derive(Debug, Clone, Copy)]
pub struct HttpSettings {
    pub max_upload_bytes: usize,
    pub request_timeout: Duration,
    pub cookie_secure: bool,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            max_upload_bytes: 32 * 1024 * 1024,
            request_timeout: Duration::from_secs(60),
            cookie_secure: false,
        }
    }
}

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub blog: Arc<BlogService>,
    pub categories: Arc<CategoryService>,
    pub users: Arc<UserService>,
    /// Session token issuer and validator.
    pub jwt: Arc<JwtManager>,
    /// Stores pinged by `GET /health`.
    pub probes: Arc<[(&'static str, Arc<dyn Probe>)]>,
    pub settings: HttpSettings,
}

impl AppState {
    /// Build every service on top of `backends`.
    pub fn new(
        backends: Backends,
        jwt: JwtManager,
        link_ttl: Duration,
        settings: HttpSettings,
    ) -> Self {
        let posts: Arc<dyn Probe> = Arc::new(RepositoryProbe(Arc::clone(&backends.posts)));
        let categories: Arc<dyn Probe> =
            Arc::new(RepositoryProbe(Arc::clone(&backends.categories)));
        let users: Arc<dyn Probe> = Arc::new(RepositoryProbe(Arc::clone(&backends.users)));
        let probes = vec![("posts", posts), ("categories", categories), ("users", users)];

        Self {
            blog: Arc::new(
                BlogService::new(backends.posts, Arc::clone(&backends.uploader))
                    .with_link_ttl(link_ttl),
            ),
            categories: Arc::new(CategoryService::new(backends.categories)),
            users: Arc::new(
                UserService::new(backends.users, backends.uploader).with_link_ttl(link_ttl),
            ),
            jwt: Arc::new(jwt),
            probes: probes.into(),
            settings,
        }
    }
}

/// Build the Axum router with all API routes, middleware, and Swagger UI.
pub fn router(state: AppState) -> Router {
    let public = Router::new()
        .route("/health", get(health::health))
        .route("/v1/users/register", post(users::register))
        .route("/v1/users/login", post(users::login))
        .route("/v1/categories/all", get(categories::all_categories));

    let protected = Router::new()
        // Users
        .route("/v1/users", get(users::list_users))
        .route(
            "/v1/users/{id}",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .route("/v1/users/{id}/avatar", put(users::update_avatar))
        .route(
            "/v1/users/{id}/change-password",
            put(users::change_password),
        )
        // Posts
        .route(
            "/v1/blog/posts",
            get(posts::list_posts)
                .post(posts::create_post)
                .put(posts::update_posts)
                .delete(posts::delete_posts),
        )
        .route("/v1/blog/posts/all", get(posts::all_posts))
        // Categories
        .route(
            "/v1/categories",
            get(categories::list_categories)
                .post(categories::create_category)
                .put(categories::update_categories),
        )
        .layer(AuthLayer::new(
            Arc::clone(&state.jwt),
            Arc::clone(&state.users),
        ));

    let settings = state.settings;
    Router::new()
        .merge(public)
        .merge(protected)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .with_state(state)
        .layer(DefaultBodyLimit::max(settings.max_upload_bytes))
        .layer(TimeoutLayer::new(settings.request_timeout))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
