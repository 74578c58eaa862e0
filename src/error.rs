use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum OracleError {
    #[error("terrain query timed out")]
    Timeout,

    #[error("terrain data unavailable: {0}")]
    Unavailable(String),

    #[error("pixel ({x}, {y}) outside terrain raster")]
    OutOfRaster { x: f64, y: f64 },
}

#[derive(Error, Debug)]
pub enum OffloadError {
    #[error("failed to spawn exposure worker: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("exposure worker disconnected")]
    Disconnected,
}
