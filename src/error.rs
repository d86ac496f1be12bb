// todo-pdf: error type shared by the library, CLI and web server

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Failed to create PDF: {0}")]
    PdfError(String),
    #[error("Failed to create PDF: {0}")]
    LopdfError(#[from] lopdf::Error),
    #[error("Failed to read configuration: {0}")]
    ConfigError(String),
    #[error("Configuration not found: {0}")]
    ConfigNotFound(String),
    #[error("Unknown preset: {0}")]
    PresetNotFound(String),
    #[error("Invalid share code: {0}")]
    ShareCodeError(String),
    #[error("Gallery entry not found: {0}")]
    GalleryNotFound(String),
    #[error("Web server error: {0}")]
    ServerError(String),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl AppError {
    /// True for errors caused by a missing named resource.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            AppError::ConfigNotFound(_) | AppError::PresetNotFound(_) | AppError::GalleryNotFound(_)
        )
    }

    /// True for errors caused by malformed client input.
    pub fn is_bad_input(&self) -> bool {
        matches!(
            self,
            AppError::ConfigError(_) | AppError::ShareCodeError(_) | AppError::JsonError(_)
        )
    }
}
