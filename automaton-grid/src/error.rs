use crate::grid::MAX_GRID_SIZE;

/// Invalid simulation parameters, detected before any generation is computed.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("grid size must be between 1 and {max}, got {0}", max = MAX_GRID_SIZE)]
    InvalidSize(i64),

    #[error("unsupported neighborhood {0:?} (expected \"moore\" or \"von-neumann\")")]
    UnknownNeighborhood(String),

    #[error("step count must not be negative, got {0}")]
    NegativeSteps(i64),

    #[error("invalid rule {rule:?}: {reason}")]
    InvalidRule { rule: String, reason: &'static str },

    #[error("invalid grid pattern: {0}")]
    InvalidPattern(String),

    #[error("worker count must be at least 1")]
    InvalidWorkers,

    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
