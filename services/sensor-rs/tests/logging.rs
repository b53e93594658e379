use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use figment::Jail;
use rand::{rngs::StdRng, SeedableRng};
use swm_sensor::{
    Emitter, Reading, ReadingGenerator, ReadingSink, SendError, Settings, CONTAINER_IDS,
};
use tokio::sync::watch;

/// In-memory log sink shared with the fmt subscriber.
#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Captured {
    fn lines(&self) -> Vec<String> {
        let bytes = self.0.lock().unwrap();
        let lines: Vec<String> = String::from_utf8_lossy(&bytes)
            .lines()
            .map(str::to_string)
            .collect();
        lines
    }

    /// The line containing `needle`, split into (level, line).
    fn find(&self, needle: &str) -> (String, String) {
        let line = self
            .lines()
            .into_iter()
            .find(|line| line.contains(needle))
            .unwrap_or_else(|| panic!("no log line contains {needle:?}: {:?}", self.lines()));
        let level = line.split_whitespace().next().unwrap_or_default().to_string();
        (level, line)
    }
}

fn subscriber(captured: &Captured) -> impl tracing::Subscriber + Send + Sync {
    let writer = captured.clone();
    tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .without_time()
        .with_target(false)
        .finish()
}

/// Accepts the first reading, rejects the second, cannot reach the API for the third.
struct ScriptedSink {
    levels: Arc<Mutex<Vec<u8>>>,
    shutdown: watch::Sender<bool>,
}

#[async_trait]
impl ReadingSink for ScriptedSink {
    async fn send(&self, reading: &Reading) -> Result<(), SendError> {
        let attempt = {
            let mut levels = self.levels.lock().unwrap();
            levels.push(reading.fill_level);
            levels.len()
        };
        match attempt {
            1 => Ok(()),
            2 => Err(SendError::Rejected {
                status: 500,
                body: "database down".to_string(),
            }),
            _ => {
                let _ = self.shutdown.send(true);
                let err = reqwest::Client::new().get("not a url").build().unwrap_err();
                Err(SendError::Unreachable(err))
            }
        }
    }
}

#[tokio::test(start_paused = true)]
async fn send_outcomes_are_logged_at_their_levels() {
    let captured = Captured::default();
    let _guard = tracing::subscriber::set_default(subscriber(&captured));

    let (tx, rx) = watch::channel(false);
    let levels = Arc::new(Mutex::new(Vec::new()));
    let mut emitter = Emitter::new(
        ScriptedSink {
            levels: levels.clone(),
            shutdown: tx,
        },
        CONTAINER_IDS,
        ReadingGenerator::new().unwrap(),
        Duration::from_secs(10),
        StdRng::seed_from_u64(5),
    );
    emitter.run(rx).await;

    let (level, line) = captured.find("[OK]");
    assert_eq!(level, "INFO", "{line}");
    assert!(line.contains("Container c7a1c7d6"), "{line}");
    let sent = levels.lock().unwrap()[0];
    assert!(line.contains(&format!("(level: {}%)", sent)), "{line}");

    let (level, line) = captured.find("[ERROR]");
    assert_eq!(level, "ERROR", "{line}");
    assert!(line.contains("Container b8b2d8e7"), "{line}");
    assert!(line.contains("Status: 500"), "{line}");
    assert!(line.contains("database down"), "{line}");

    let (level, line) = captured.find("[FATAL]");
    assert_eq!(level, "ERROR", "{line}");
    assert!(line.contains("Container a9c3e9f8"), "{line}");
}

#[test]
fn invalid_interval_is_logged_as_warning() {
    Jail::expect_with(|jail| {
        jail.clear_env();
        jail.set_env("SIMULATOR_INTERVAL_SECONDS", "abc");

        let captured = Captured::default();
        let settings = tracing::subscriber::with_default(subscriber(&captured), Settings::load);
        assert_eq!(settings.interval_seconds, 10);

        let (level, line) = captured.find("SIMULATOR_INTERVAL_SECONDS");
        assert_eq!(level, "WARN", "{line}");
        assert!(line.contains("default 10"), "{line}");
        Ok(())
    });
}

#[test]
fn valid_interval_logs_nothing() {
    Jail::expect_with(|jail| {
        jail.clear_env();
        jail.set_env("SIMULATOR_INTERVAL_SECONDS", "5");

        let captured = Captured::default();
        let settings = tracing::subscriber::with_default(subscriber(&captured), Settings::load);
        assert_eq!(settings.interval_seconds, 5);
        assert!(captured.lines().is_empty(), "{:?}", captured.lines());
        Ok(())
    });
}
