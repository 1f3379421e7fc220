use std::net::SocketAddr;

use tokio::net::TcpListener;

mod api;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let port = std::env::var("PORT")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(8080);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    let app = api::router();

    tracing::info!("knight's tour server listening on {addr}");
    let listener = TcpListener::bind(addr)
        .await
        .expect("failed to bind server address");
    axum::serve(listener, app).await.expect("server error");
}
