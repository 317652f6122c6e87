use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use movie_browser_backend::{
    api,
    config::BrowseConfig,
    external::{self, MovieSearchService},
    services::{BrowseSession, NotificationCenter},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load environment variables
    dotenv::dotenv().ok();

    let config = BrowseConfig::from_env()?;
    tracing::info!(
        "Year range {}-{}, page limit {}, search timeout {:?}",
        config.min_year,
        config.max_year,
        config.page_limit,
        config.search_timeout
    );

    // Initialize movie search service
    let search_service = MovieSearchService::new(&config);

    // Start cache cleanup task
    let cache_cleanup_task = external::CacheCleanupTask::new(
        search_service.cache.clone(),
        Duration::from_secs(5 * 60), // 每5分钟清理一次
    );
    tokio::spawn(cache_cleanup_task.start());

    let notifications = Arc::new(NotificationCenter::default());
    let search_client: Arc<dyn external::SearchClient> = Arc::new(search_service.clone());
    let session = Arc::new(BrowseSession::new(
        config,
        search_client.clone(),
        notifications.clone(),
    ));

    let app = api::router(api::AppState {
        session,
        search_client,
        cache: search_service.cache.clone(),
        notifications,
    });

    // Run the server
    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| "3000".to_string())
        .parse()
        .unwrap_or(3000);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    tracing::info!("🚀 Server listening on {}", addr);
    tracing::info!("📊 Cache cleanup task started (interval: 5 minutes)");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
