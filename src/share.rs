// todo-pdf: share codes (URL-safe base64 of compact configuration JSON)

use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;

use crate::config::Configuration;
use crate::error::AppError;

pub fn export_code(config: &Configuration) -> Result<String, AppError> {
    let json = serde_json::to_string(config)?;
    Ok(URL_SAFE.encode(json.as_bytes()))
}

pub fn import_code(code: &str) -> Result<Configuration, AppError> {
    let bytes = URL_SAFE
        .decode(code.trim().as_bytes())
        .map_err(|e| AppError::ShareCodeError(e.to_string()))?;
    let json = String::from_utf8(bytes).map_err(|e| AppError::ShareCodeError(e.to_string()))?;
    serde_json::from_str(&json).map_err(|e| AppError::ShareCodeError(e.to_string()))
}

/// Link that opens the web UI with `config` loaded.
pub fn share_url(base_url: &str, config: &Configuration) -> Result<String, AppError> {
    Ok(format!("{}?config={}", base_url.trim_end_matches('/'), export_code(config)?))
}

/// Link that opens the UI with a published gallery entry loaded.
pub fn gallery_url(base_url: &str, id: &str) -> String {
    format!("{}?load={}", base_url.trim_end_matches('/'), id)
}
