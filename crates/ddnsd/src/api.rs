//! HTTP handlers
//!
//! Every response is a JSON object carrying `status` (`success` or `error`)
//! and `message`. Core errors are mapped to HTTP statuses in one place,
//! [`ApiError`].

use axum::{
    Json, Router,
    extract::{FromRequestParts, Query, State},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
    routing::get,
};
use ddns_core::{
    Error, HealthCheckRequest, HealthStatus, HealthVerifier, Reconciler, UpdateRequest,
};
use serde::Serialize;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::token::resolve_token;

/// Shared handler state, built once at startup
#[derive(Clone)]
pub struct AppState {
    pub reconciler: Arc<Reconciler>,
    pub verifier: Arc<HealthVerifier>,
    /// Fallback token location; `None` disables the fallback
    pub token_file: Option<PathBuf>,
}

impl AppState {
    pub fn new(
        reconciler: Reconciler,
        verifier: HealthVerifier,
        token_file: Option<PathBuf>,
    ) -> Self {
        Self {
            reconciler: Arc::new(reconciler),
            verifier: Arc::new(verifier),
            token_file,
        }
    }
}

/// Build the service router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(update))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Raw query string parameters, in request order
///
/// A repeated key keeps its first value. Extraction never fails with a
/// non-JSON body: rejections become [`ApiError`]s.
#[derive(Debug, Default)]
pub struct Params(Vec<(String, String)>);

impl Params {
    /// First value of `key`, if present
    pub fn get(&self, key: &str) -> Option<String> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    }
}

impl<S: Send + Sync> FromRequestParts<S> for Params {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(pairs) = Query::<Vec<(String, String)>>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| ApiError(Error::invalid("query", rejection.body_text())))?;
        Ok(Self(pairs))
    }
}

#[derive(Serialize)]
struct HealthBody {
    status: &'static str,
    message: &'static str,
    #[serde(flatten)]
    addrs: HealthStatus,
}

async fn update(
    State(state): State<AppState>,
    params: Params,
) -> Result<Json<serde_json::Value>, ApiError> {
    let token = resolve_token(params.get("token"), state.token_file.as_deref()).await?;
    let request = UpdateRequest::from_params(
        token,
        params.get("zone"),
        params.get("record"),
        params.get("ipv4"),
        params.get("ipv6"),
    )?;

    let report = state.reconciler.reconcile(&request).await?;
    info!(
        "Reconciled {} ({} write(s))",
        request.fqdn(),
        report.writes()
    );

    Ok(Json(json!({
        "status": "success",
        "message": "Update successful.",
    })))
}

async fn healthz(
    State(state): State<AppState>,
    params: Params,
) -> Result<Json<HealthBody>, ApiError> {
    let request = HealthCheckRequest::from_params(
        params.get("zone"),
        params.get("record"),
        params.get("ipv4"),
        params.get("ipv6"),
    )?;
    let addrs = state.verifier.verify(&request).await?;

    Ok(Json(HealthBody {
        status: "success",
        message: "OK",
        addrs,
    }))
}

/// A core error on its way out as an HTTP response
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl ApiError {
    /// HTTP status for the wrapped error
    pub fn status(&self) -> StatusCode {
        match self.0 {
            Error::MissingParameter(_) | Error::InvalidParameter { .. } => StatusCode::BAD_REQUEST,
            Error::ZoneNotFound(_) | Error::RecordNotFound { .. } => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {}", self.0);
        } else {
            warn!("Request rejected: {}", self.0);
        }

        let body = match &self.0 {
            Error::Inconsistent {
                host,
                actual,
                expect,
            } => json!({
                "status": "error",
                "message": self.0.to_string(),
                "host": host,
                "addrs": { "actual": actual, "expect": expect },
            }),
            other => json!({
                "status": "error",
                "message": other.to_string(),
            }),
        };

        (status, Json(body)).into_response()
    }
}
