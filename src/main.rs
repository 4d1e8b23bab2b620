use rawhttp::config::{ServerConfig, config, set_config};
use rawhttp::handler::Router;
use rawhttp::net::server::Server;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[async_std::main]
async fn main() -> std::io::Result<()> {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let cfg = match std::env::args().nth(1) {
        Some(path) => ServerConfig::from_file(&path),
        None => ServerConfig::default(),
    };
    set_config(cfg);

    let server = Server::serve(config().clone(), Router).await?;
    server.wait().await;
    Ok(())
}
