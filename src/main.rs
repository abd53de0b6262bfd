use courtside::config::AppConfig;
use courtside::http::service::CourtsideService;
use courtside::http::App;
use courtside::pool::ConnectionPool;
use courtside::security::Sha256Credentials;
use may_minihttp::HttpServer;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::load().map_err(|e| anyhow::anyhow!("invalid configuration: {e}"))?;
    may::config().set_workers(config.server.workers);

    let pool = ConnectionPool::connect(&config.database)
        .map_err(|e| anyhow::anyhow!("failed to open connection pool: {e}"))?;
    tracing::info!(
        connections = pool.size(),
        "connected to {}",
        redact(&config.database.url)
    );

    let credentials = Sha256Credentials::new(&config.auth.token_secret, config.auth.token_ttl_seconds);
    let app = App::new(Arc::new(pool), Arc::new(credentials));

    let server = HttpServer(CourtsideService::new(Arc::new(app)))
        .start(&config.server.host_port)
        .map_err(|e| anyhow::anyhow!("failed to start server: {e}"))?;
    tracing::info!("courtside listening on http://{}", config.server.host_port);
    server
        .join()
        .map_err(|e| anyhow::anyhow!("server terminated: {e:?}"))?;
    Ok(())
}

/// Connection URL without the password.
fn redact(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            let credentials = &url[scheme_end + 3..at];
            match credentials.split_once(':') {
                Some((user, _)) => format!("{}{user}:***{}", &url[..scheme_end + 3], &url[at..]),
                None => url.to_string(),
            }
        }
        _ => url.to_string(),
    }
}
