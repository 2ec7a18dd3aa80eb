use thiserror::Error;

/// Main error type for the cutout/cluster engine.
#[derive(Error, Debug)]
pub enum ClusterError {
    #[error("Buffer of {actual} bytes does not hold a {width}x{height} RGBA image ({expected} bytes expected)")]
    BufferLength {
        width: usize,
        height: usize,
        expected: usize,
        actual: usize,
    },
    #[error("Clusters were labeled on a {mask_width}x{mask_height} mask but the pixel grid is {width}x{height}")]
    DimensionMismatch {
        mask_width: usize,
        mask_height: usize,
        width: usize,
        height: usize,
    },
    #[error("Cluster coordinate ({row}, {col}) lies outside the {height}x{width} pixel grid")]
    OutOfBounds {
        row: usize,
        col: usize,
        height: usize,
        width: usize,
    },
    #[error("Image Error: {0}")]
    Image(#[from] image::ImageError),
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Configuration Error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Batch worker pool was shut down")]
    BatchClosed,
    #[error("Worker task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, ClusterError>;
