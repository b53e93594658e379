use rand::{rngs::StdRng, SeedableRng};
use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use swm_sensor::{Emitter, Error, HttpSink, ReadingGenerator, Settings, CONTAINER_IDS};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Error> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    info!("--- Starting container sensor simulator ---");
    let settings = Settings::load();

    let sink = HttpSink::new(settings.readings_endpoint())?;
    info!("Ingestion API URL: {}", sink.endpoint());
    info!("Containers to simulate: {}", CONTAINER_IDS.len());
    info!("Interval between send cycles: {} seconds", settings.interval_seconds);
    info!("---------------------------------------------------------");

    let mut emitter = Emitter::new(
        sink,
        CONTAINER_IDS,
        ReadingGenerator::new()?,
        settings.interval(),
        StdRng::from_entropy(),
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                let _ = shutdown_tx.send(true);
            }
            Err(e) => error!("Failed to install Ctrl-C handler: {}", e),
        }
    });

    emitter.run(shutdown_rx).await;

    info!("--- Simulator stopped by user. Goodbye! ---");
    Ok(())
}
