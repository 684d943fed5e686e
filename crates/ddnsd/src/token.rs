//! API token resolution
//!
//! A request may carry its own provider token. Without one, the token is
//! read from a secret file (a Docker/Kubernetes secret mount by default).

use ddns_core::Result;
use std::io::ErrorKind;
use std::path::Path;

/// Pick the token for a request
///
/// Returns `Ok(None)` when neither the parameter nor the file supplies one.
/// A missing file is not an error; an empty file counts as no token.
pub async fn resolve_token(param: Option<String>, file: Option<&Path>) -> Result<Option<String>> {
    if let Some(token) = param.filter(|t| !t.is_empty()) {
        return Ok(Some(token));
    }

    let Some(path) = file else {
        return Ok(None);
    };

    match tokio::fs::read_to_string(path).await {
        Ok(contents) => {
            let token = contents.trim();
            Ok((!token.is_empty()).then(|| token.to_string()))
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!("No token file at {}", path.display());
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}
