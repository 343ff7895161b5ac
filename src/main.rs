mod auth;
mod catalog;
mod db;
mod discounts;
mod query;
mod validation;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use sqlx::PgPool;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use auth::{AuthService, LogMailer, OtpStore, RequireRole, TokenRepository, TokenService,
    UserRepository};
use catalog::{CatalogService, CategoryRepository, ProductRepository};
use discounts::{DiscountRepository, DiscountService, LinkRepository};

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        catalog::handlers::list_products_handler,
        catalog::handlers::search_products_handler,
        catalog::handlers::get_product_handler,
        catalog::handlers::get_product_by_slug_handler,
        catalog::handlers::products_in_category_handler,
    ),
    components(
        schemas(
            catalog::Product,
            catalog::ProductResponse,
            catalog::Category,
            discounts::AppliedDiscount,
            discounts::DiscountType,
        )
    ),
    tags(
        (name = "products", description = "Product catalog endpoints with resolved pricing")
    ),
    info(
        title = "Storefront API",
        version = "1.0.0",
        description = "RESTful e-commerce backend: catalog, discounts, and auth"
    )
)]
struct ApiDoc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub auth_service: Arc<AuthService>,
    pub catalog_service: Arc<CatalogService>,
    pub discount_service: Arc<DiscountService>,
}

/// Builds the shared application state from a connection pool
pub fn build_state(db: PgPool, jwt_secret: String) -> AppState {
    let user_repo = UserRepository::new(db.clone());
    let token_repo = TokenRepository::new(db.clone());
    let product_repo = ProductRepository::new(db.clone());
    let category_repo = CategoryRepository::new(db.clone());
    let discount_repo = DiscountRepository::new(db.clone());
    let link_repo = LinkRepository::new(db.clone());

    let auth_service = Arc::new(AuthService::new(
        user_repo,
        token_repo,
        TokenService::new(jwt_secret),
        Arc::new(OtpStore::new()),
        Arc::new(LogMailer),
    ));
    let catalog_service = Arc::new(CatalogService::new(
        product_repo.clone(),
        category_repo,
        link_repo.clone(),
        discount_repo.clone(),
    ));
    let discount_service = Arc::new(DiscountService::new(
        discount_repo,
        link_repo,
        product_repo,
    ));

    AppState {
        db,
        auth_service,
        catalog_service,
        discount_service,
    }
}

/// Creates and configures the application router
///
/// Reads are public; every mutation route sits behind the admin role
/// middleware.
pub fn create_router(state: AppState) -> Router {
    use tower_http::cors::{Any, CorsLayer};
    use tower_http::trace::TraceLayer;

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let public_routes = Router::new()
        .route("/api/products", get(catalog::list_products_handler))
        .route("/api/products/search", get(catalog::search_products_handler))
        .route("/api/products/slug/:slug", get(catalog::get_product_by_slug_handler))
        .route("/api/products/category/:id", get(catalog::products_in_category_handler))
        .route("/api/products/:id", get(catalog::get_product_handler))
        .route("/api/categories", get(catalog::list_categories_handler))
        .route("/api/categories/:id", get(catalog::get_category_handler));

    let auth_routes = Router::new()
        .route("/api/auth/register", post(auth::register_handler))
        .route("/api/auth/login", post(auth::login_handler))
        .route("/api/auth/refresh", post(auth::refresh_handler))
        .route("/api/auth/logout", post(auth::logout_handler))
        .route("/api/auth/me", get(auth::me_handler))
        .route("/api/auth/forgot-password", post(auth::forgot_password_handler))
        .route("/api/auth/reset-password", post(auth::reset_password_handler));

    let admin_routes = Router::new()
        .route("/api/products", post(catalog::create_product_handler))
        .route("/api/products/:id", put(catalog::update_product_handler))
        .route("/api/products/:id", delete(catalog::delete_product_handler))
        .route("/api/categories", post(catalog::create_category_handler))
        .route("/api/categories/:id", put(catalog::update_category_handler))
        .route("/api/categories/:id", delete(catalog::delete_category_handler))
        .route("/api/discounts", post(discounts::create_discount_handler))
        .route("/api/discounts", get(discounts::list_discounts_handler))
        .route("/api/discounts/:id", get(discounts::get_discount_handler))
        .route("/api/discounts/:id", put(discounts::update_discount_handler))
        .route("/api/discounts/:id", delete(discounts::delete_discount_handler))
        .route("/api/discounts/:id/link", post(discounts::link_discount_handler))
        .route("/api/discounts/:id/link", delete(discounts::unlink_discount_handler))
        .route("/api/discounts/:id/links", get(discounts::discount_links_handler))
        .route("/api/discounts/:id/redeem", post(discounts::redeem_discount_handler))
        .route_layer(middleware::from_fn(|req, next| {
            RequireRole::admin().middleware(req, next)
        }));

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public_routes)
        .merge(auth_routes)
        .merge(admin_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    tracing::info!("Storefront API - Starting...");

    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");
    let jwt_secret = std::env::var("JWT_SECRET").expect("JWT_SECRET must be set in environment");
    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("PORT").unwrap_or_else(|_| "8080".to_string());

    tracing::info!("Connecting to database...");
    let db_pool = db::create_pool(&database_url)
        .await
        .expect("Failed to create database pool");

    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Migrations completed successfully");

    let state = build_state(db_pool, jwt_secret);
    let app = create_router(state);

    let addr = format!("{}:{}", host, port);
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Storefront API is running on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui", addr);

    axum::serve(listener, app).await.expect("Server error");
}

#[cfg(test)]
mod tests;
