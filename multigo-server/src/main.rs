use axum::extract::Request;
use multigo_server::config::ServerConfig;
use tower::Layer as _;
use tower_http::normalize_path::NormalizePathLayer;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "multigo_server=debug".into()),
        )
        .init();

    let config = ServerConfig::from_env();
    let (app, state) = multigo_server::build_router(config.clone());

    tokio::spawn(async move {
        multigo_server::services::room_sweep::run(state).await;
    });

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting multigo-server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind");

    let app = NormalizePathLayer::trim_trailing_slash().layer(app);
    axum::serve(
        listener,
        axum::ServiceExt::<Request>::into_make_service(app),
    )
    .await
    .expect("Server error");
}
