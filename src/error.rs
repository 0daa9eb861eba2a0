use thiserror::Error;

/// Main error type for the retro-vhs library
#[derive(Error, Debug)]
pub enum VhsError {
    #[error("Frame error: {0}")]
    Frame(#[from] FrameError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Frame shape and geometry errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum FrameError {
    #[error("Frame shapes differ: destination {dst_width}x{dst_height}, source {src_width}x{src_height}")]
    ShapeMismatch {
        dst_width: u32,
        dst_height: u32,
        src_width: u32,
        src_height: u32,
    },

    #[error("Degenerate frame dimensions: {width}x{height}")]
    Degenerate { width: u32, height: u32 },
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration file: {path}")]
    ParseFailed { path: String },

    #[error("Invalid configuration value: {key} = {value}")]
    InvalidValue { key: String, value: String },

    #[error("Unknown parameter: {name}")]
    UnknownParameter { name: String },

    #[error("Parameter {name} expects a {expected} value")]
    TypeMismatch { name: String, expected: String },

    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },
}

/// Render job errors
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("No input frames found in: {path}")]
    NoFrames { path: String },

    #[error("Failed to load frame: {path}")]
    LoadFailed { path: String },

    #[error("Failed to save frame: {path}")]
    SaveFailed { path: String },

    #[error("Render cancelled after {frames_done} frames")]
    Cancelled { frames_done: usize },

    #[error("Render worker failed: {reason}")]
    WorkerFailed { reason: String },
}

/// Convenience type alias for Results using VhsError
pub type Result<T> = std::result::Result<T, VhsError>;

impl VhsError {
    /// Check if this error is recoverable (the caller can retry or skip the frame)
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Io(_) => true,
            Self::Render(RenderError::LoadFailed { .. }) => true,
            Self::Frame(FrameError::Degenerate { .. }) => true,
            // Shape mismatches are contract violations by the caller
            _ => false,
        }
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::Render(RenderError::LoadFailed { path }) => {
                format!("Could not load frame '{}'. Please check the file exists and is a PNG or JPEG image.", path)
            }
            Self::Config(ConfigError::UnknownParameter { name }) => {
                format!("Unknown parameter '{}'. Use --export-params to list the available parameters.", name)
            }
            Self::Config(ConfigError::FileNotFound { path }) => {
                format!("Configuration file '{}' not found.", path)
            }
            Self::Frame(FrameError::Degenerate { width, height }) => {
                format!("Cannot process a {}x{} frame.", width, height)
            }
            _ => self.to_string(),
        }
    }
}
