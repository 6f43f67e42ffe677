pub mod domain;
pub mod handlers;
pub mod shared;
pub mod system;

#[cfg(test)]
pub mod test_support;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    use axum::body::Body;
    use axum::http::Request;
    use axum::middleware::{self, Next};
    use axum::response::Response;
    use axum::{
        routing::{get, patch, post},
        Router,
    };
    use std::net::SocketAddr;
    use tokio::net::TcpListener;
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    // Создаем директорию для логов
    let log_dir = std::path::Path::new("target").join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file_path = log_dir.join("backend.log");
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file_path)?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| {
                // Отключаем логи SQL запросов, но оставляем логи приложения
                "info,sqlx=warn,sea_orm=warn".into()
            }),
        ))
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::sync::Arc::new(log_file))
                .with_ansi(false),
        )
        .init();

    // Простой middleware для логирования запросов
    async fn request_logger(req: Request<Body>, next: Next) -> Response {
        let start = std::time::Instant::now();
        let method = req.method().clone();
        let uri = req.uri().clone();

        let response = next.run(req).await;

        let status = response.status();
        let duration = start.elapsed();
        if status.is_client_error() || status.is_server_error() {
            tracing::warn!(
                "{} {} -> {} ({}ms)",
                method,
                uri.path(),
                status.as_u16(),
                duration.as_millis()
            );
        } else {
            tracing::info!(
                "{} {} -> {} ({}ms)",
                method,
                uri.path(),
                status.as_u16(),
                duration.as_millis()
            );
        }
        response
    }

    let config = shared::config::load_config()?;
    let db_path = shared::config::get_database_path(&config)?;
    shared::data::db::initialize_database(&db_path.to_string_lossy()).await?;

    let conn = shared::data::db::get_connection();
    system::initialization::apply_schema(conn).await?;
    system::initialization::ensure_admin_user_exists(conn, &config.admin).await?;

    let app = Router::new()
        .route("/health", get(|| async { "ok" }))
        // ========================================
        // AUTH (public + protected /me)
        // ========================================
        .route("/api/v1/auth/register", post(system::handlers::auth::register))
        .route("/api/v1/auth/login", post(system::handlers::auth::login))
        .route("/api/v1/auth/refresh", post(system::handlers::auth::refresh))
        .route("/api/v1/auth/logout", post(system::handlers::auth::logout))
        .route(
            "/api/v1/auth/me",
            get(system::handlers::auth::current_user)
                .layer(middleware::from_fn(system::auth::middleware::require_auth)),
        )
        // ========================================
        // CATALOG
        // ========================================
        .route(
            "/api/v1/category",
            get(handlers::a001_category::list_all).post(handlers::a001_category::create),
        )
        .route(
            "/api/v1/category/:slug",
            axum::routing::put(handlers::a001_category::update)
                .delete(handlers::a001_category::delete),
        )
        .route(
            "/api/v1/products",
            get(handlers::a002_product::list_all).post(handlers::a002_product::create),
        )
        .route(
            "/api/v1/products/detail/:slug",
            get(handlers::a002_product::detail),
        )
        .route(
            "/api/v1/products/:slug",
            get(handlers::a002_product::by_category)
                .put(handlers::a002_product::update)
                .delete(handlers::a002_product::delete),
        )
        // ========================================
        // REVIEWS
        // ========================================
        .route(
            "/api/v1/reviews",
            get(handlers::a003_review::list_all).post(handlers::a003_review::add),
        )
        .route(
            "/api/v1/reviews/:key",
            get(handlers::a003_review::by_product).delete(handlers::a003_review::delete),
        )
        // ========================================
        // PERMISSIONS (admin only)
        // ========================================
        .route(
            "/api/v1/permission",
            patch(handlers::permission::toggle_supplier)
                .layer(middleware::from_fn(system::auth::middleware::require_admin)),
        )
        .route(
            "/api/v1/permission/delete",
            axum::routing::delete(handlers::permission::delete_user)
                .layer(middleware::from_fn(system::auth::middleware::require_admin)),
        )
        .layer(middleware::from_fn(request_logger));

    let port = config.server.port;
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();

    tracing::info!("Attempting to bind server to http://{}", addr);
    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => {
            tracing::info!("Server successfully bound to {}", addr);
            listener
        }
        Err(e) => {
            if e.kind() == std::io::ErrorKind::AddrInUse {
                tracing::error!(
                    "Error: Port {} is already in use. Please ensure no other process is using this port.",
                    port
                );
            } else {
                tracing::error!("Failed to bind to port {}. Error: {}", port, e);
            }
            // Propagate the error to stop the application
            return Err(e.into());
        }
    };

    axum::serve(listener, app).await?;

    Ok(())
}
