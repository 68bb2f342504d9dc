use std::path::Path;

use fractic_server_error::ServerError;
use serde::Serialize;

use crate::errors::EnvOutputError;

use super::EnvVariables;

/// Output document: `{"Parameters": { <name>: <value>, ... }}`.
#[derive(Debug, Serialize)]
pub struct ParametersDocument<'a> {
    #[serde(rename = "Parameters")]
    pub parameters: &'a EnvVariables,
}

/// Renders the merged variables as pretty-printed JSON (2-space indent).
pub fn render_parameters(merged: &EnvVariables) -> Result<String, ServerError> {
    serde_json::to_string_pretty(&ParametersDocument { parameters: merged })
        .map_err(|e| EnvOutputError::with_debug("failed to serialize parameters", &e))
}

/// Writes `document` to `path`, replacing any existing file.
pub async fn write_parameters_file(path: &Path, document: &str) -> Result<(), ServerError> {
    tokio::fs::write(path, document)
        .await
        .map_err(|e| EnvOutputError::with_debug("failed to write parameters file", &e))
}
