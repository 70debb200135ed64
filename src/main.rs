use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use birc::config;
use birc::{ChatLogger, Handler, Session};

#[tokio::main]
async fn main() -> Result<()> {
    let path = std::env::args().nth(1).map(PathBuf::from);
    let cfg = config::load_config(path.as_deref())?;

    tracing_subscriber::fmt()
        .with_max_level(cfg.logging.max_level()?)
        .with_writer(std::io::stderr)
        .init();

    let logger: Arc<dyn Handler> = Arc::new(ChatLogger::stdout(&cfg.logging));
    let session = Session::new(cfg.session.to_session_config(), vec![logger]);

    // Stop on Ctrl-C
    let handle = session.disconnect_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            handle.disconnect().await;
        }
    });

    if let Err(e) = session.run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}
