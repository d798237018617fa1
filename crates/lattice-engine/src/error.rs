//! Error types for the engine binary.
//!
//! [`EngineError`] wraps every failure mode of startup and the run so that
//! `main` can propagate with `?`.

/// Top-level error for the engine binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading or validation failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: lattice_core::ConfigError,
    },

    /// Building or populating the space failed.
    #[error("space error: {source}")]
    Space {
        /// The underlying space error.
        #[from]
        source: lattice_space::SpaceError,
    },

    /// Building the schedule failed.
    #[error("schedule error: {source}")]
    Schedule {
        /// The underlying schedule error.
        #[from]
        source: lattice_time::ScheduleError,
    },

    /// The model failed while running.
    #[error("model error: {source}")]
    Model {
        /// The underlying model error.
        #[from]
        source: lattice_core::ModelError,
    },

    /// The run summary could not be serialized.
    #[error("summary error: {source}")]
    Summary {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },
}
