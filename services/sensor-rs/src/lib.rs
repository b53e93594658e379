//! Fill-level sensor simulator for the waste-container ingestion API.

pub mod config;
pub mod emitter;
pub mod error;
pub mod reading;
pub mod sender;

pub use config::Settings;
pub use emitter::Emitter;
pub use error::Error;
pub use reading::{Reading, ReadingGenerator, CONTAINER_IDS};
pub use sender::{HttpSink, ReadingSink, SendError};
