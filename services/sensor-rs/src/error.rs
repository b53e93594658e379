use thiserror::Error;

/// Startup failures. Once the loop is running nothing is fatal.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
    #[error("invalid fill level distribution: {0}")]
    Distribution(#[from] rand_distr::TriangularError),
}
