use std::ops::RangeInclusive;
use std::time::Duration;

use chrono::Local;
use rand::Rng;
use tokio::sync::watch;
use tokio::time::sleep;
use tracing::{error, info};

use crate::reading::ReadingGenerator;
use crate::sender::{report_line, ReadingSink};

/// Pause after each send, in seconds, to avoid synchronized bursts.
pub const JITTER_SECS: RangeInclusive<f64> = 0.2..=1.0;

/// Sequential emission loop: one reading per container per cycle.
pub struct Emitter<S, R> {
    sink: S,
    containers: Vec<String>,
    generator: ReadingGenerator,
    interval: Duration,
    rng: R,
}

impl<S: ReadingSink, R: Rng> Emitter<S, R> {
    pub fn new<I, C>(
        sink: S,
        containers: I,
        generator: ReadingGenerator,
        interval: Duration,
        rng: R,
    ) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<String>,
    {
        Self {
            sink,
            containers: containers.into_iter().map(Into::into).collect(),
            generator,
            interval,
            rng,
        }
    }

    /// Runs cycles until `shutdown` flips to `true`. The flag is honoured at
    /// cycle boundaries and during sleeps; a request in flight always completes.
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) {
        loop {
            if *shutdown.borrow() {
                break;
            }

            info!(
                "Starting new send cycle at {}...",
                Local::now().format("%H:%M:%S")
            );
            if !self.run_cycle(&mut shutdown).await {
                break;
            }

            info!(
                "--- Cycle complete. Waiting {} seconds for the next one. ---",
                self.interval.as_secs()
            );
            if !pause(self.interval, &mut shutdown).await {
                break;
            }
        }
    }

    /// Returns `false` if shutdown was requested mid-cycle.
    async fn run_cycle(&mut self, shutdown: &mut watch::Receiver<bool>) -> bool {
        for container_id in &self.containers {
            let reading = self.generator.generate(container_id, &mut self.rng);
            let result = self.sink.send(&reading).await;

            let line = report_line(&reading, &result);
            match result {
                Ok(()) => info!("  {}", line),
                Err(_) => error!("  {}", line),
            }

            let jitter = Duration::from_secs_f64(self.rng.gen_range(JITTER_SECS));
            if !pause(jitter, shutdown).await {
                return false;
            }
        }
        true
    }
}

/// Sleeps for `duration` unless shutdown arrives first. Returns `true` when
/// the full duration elapsed.
async fn pause(duration: Duration, shutdown: &mut watch::Receiver<bool>) -> bool {
    tokio::select! {
        _ = sleep(duration) => true,
        _ = stopped(shutdown) => false,
    }
}

async fn stopped(shutdown: &mut watch::Receiver<bool>) {
    // a dropped sender never stops the loop
    if shutdown.wait_for(|stop| *stop).await.is_err() {
        std::future::pending::<()>().await;
    }
}
