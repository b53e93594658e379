use chrono::{DateTime, Utc};
use rand::Rng;
use rand_distr::{Distribution, Triangular, TriangularError};
use serde::{Serialize, Serializer};

/// Containers simulated for the lifetime of the process.
pub const CONTAINER_IDS: [&str; 3] = [
    "c7a1c7d6-3d2c-4e8d-9a6a-0b1e4c7b8e1a",
    "b8b2d8e7-4e3d-5f9e-a0b0-1c2f5d8e9f2b",
    "a9c3e9f8-5f4e-6a0f-b1c1-2d3a6e9f0a3c",
];

pub const MIN_FILL_LEVEL: u8 = 5;
pub const MAX_FILL_LEVEL: u8 = 100;
pub const MODE_FILL_LEVEL: u8 = 70;

/// First eight characters of a container id, as used in log lines.
pub fn short_id(container_id: &str) -> &str {
    container_id.get(..8).unwrap_or(container_id)
}

#[derive(Debug, Clone, Serialize)]
pub struct Reading {
    pub container_id: String,
    pub fill_level: u8,
    #[serde(serialize_with = "rfc3339")]
    pub timestamp: DateTime<Utc>,
}

fn rfc3339<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&ts.to_rfc3339())
}

/// Fabricates fill levels skewed towards `MODE_FILL_LEVEL`.
#[derive(Debug, Clone)]
pub struct ReadingGenerator {
    fill: Triangular<f64>,
}

impl ReadingGenerator {
    pub fn new() -> Result<Self, TriangularError> {
        let fill = Triangular::new(
            f64::from(MIN_FILL_LEVEL),
            f64::from(MAX_FILL_LEVEL),
            f64::from(MODE_FILL_LEVEL),
        )?;
        Ok(Self { fill })
    }

    pub fn generate<R: Rng + ?Sized>(&self, container_id: &str, rng: &mut R) -> Reading {
        // truncation, never rounding: 99.9 is reported as 99
        let fill_level = self.fill.sample(rng) as u8;
        Reading {
            container_id: container_id.to_string(),
            fill_level,
            timestamp: Utc::now(),
        }
    }
}
