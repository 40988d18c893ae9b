use mock_server::MockConfig;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".to_string().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = MockConfig::default();
    if let Ok(key) = std::env::var("FATSECRET_CONSUMER_KEY") {
        config.consumer_key = key;
    }
    if let Ok(secret) = std::env::var("FATSECRET_CONSUMER_SECRET") {
        config.consumer_secret = secret;
    }

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(
        "listening on http://{addr}{} (consumer key {})",
        mock_server::API_PATH,
        config.consumer_key
    );
    mock_server::run_with(listener, config).await
}
