use axum::Router;
use nursechat::{AppConfig, AppState, auth, chat, feed, firebase, profile, roster};
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer, cookie::SameSite};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let config = AppConfig::from_env()?;

    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(false)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::hours(8)));

    // One HTTP client shared by every service client; each client is handed
    // to handlers through AppState rather than living as a global.
    let http = reqwest::Client::new();
    let identity = firebase::Identity::new(http.clone(), &config);
    let firestore = firebase::Firestore::new(http.clone(), &config);
    let storage = firebase::Storage::new(http, &config);

    let feed = feed::spawn(firestore.clone(), config.poll_interval);
    let roster = roster::spawn(firestore.clone(), config.poll_interval);

    let app_state = AppState {
        identity,
        firestore,
        storage,
        feed,
        roster,
    };

    let app = Router::new()
        .merge(auth::router())
        .nest("/chat", chat::router())
        .nest("/profile", profile::router())
        .with_state(app_state)
        .layer(session_layer);

    let listener = tokio::net::TcpListener::bind(config.bind_addr.as_str()).await?;
    tracing::info!("listening on {}", config.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
