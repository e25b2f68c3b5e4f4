//! Co-signing HTTP service
//!
//! Accepts a transaction envelope signed by the account key, adds the
//! second signature and submits the result to Horizon.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use stellar_wallet::account;
use stellar_wallet::horizon::{HorizonClient, SubmitResult};
use stellar_wallet::{Envelope, Error, KeyPair};

/// Default listen address of the co-signing service
pub const DEFAULT_LISTEN: &str = "127.0.0.1:3001";

struct CosignState {
    client: HorizonClient,
    co_signer: KeyPair,
}

/// Request body: a base64 `TransactionEnvelope`
#[derive(Debug, Deserialize)]
pub struct CosignRequest {
    pub transaction: String,
}

/// Library error rendered as a JSON response
pub struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        Self(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            Error::Transaction(_)
            | Error::NotSupported(_)
            | Error::InvalidAddress(_)
            | Error::Serialization(_) => StatusCode::BAD_REQUEST,
            Error::AccountNotFound(_) => StatusCode::NOT_FOUND,
            Error::Horizon { .. } | Error::Network(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

/// Routes of the co-signing service
pub fn router(client: HorizonClient, co_signer: KeyPair) -> Router {
    Router::new()
        .route("/", post(cosign_handler))
        .with_state(Arc::new(CosignState { client, co_signer }))
}

/// Serve the co-signing routes on `addr` until the process stops
pub async fn serve(addr: SocketAddr, client: HorizonClient, co_signer: KeyPair) -> anyhow::Result<()> {
    info!(
        %addr,
        co_signer = %co_signer.public_key(),
        horizon = %client.config().horizon_url,
        "Starting co-signing server"
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(client, co_signer)).await?;

    Ok(())
}

async fn cosign_handler(
    State(state): State<Arc<CosignState>>,
    Json(request): Json<CosignRequest>,
) -> Result<Json<SubmitResult>, ApiError> {
    let envelope = Envelope::from_base64(request.transaction.trim())?;
    info!(
        source = %envelope.source_account(),
        sequence = envelope.sequence(),
        operations = envelope.operation_count(),
        "Co-signing transaction"
    );

    match account::cosign(&state.client, &state.co_signer, envelope).await {
        Ok(result) => Ok(Json(result)),
        Err(e) => {
            warn!("Co-signed transaction was not accepted: {}", e);
            Err(e.into())
        }
    }
}
