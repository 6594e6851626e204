//! Settings endpoints used by the credentials panel.

use crate::rest::{AppState, ErrorResponse};
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use dialog_analytics::DialogClient;
use dialog_core::{CredentialStore, Credentials, DialogResult};
use tracing::{error, info};

/// GET /config — Current credentials, with the environment token applied.
#[utoipa::path(
    get,
    path = "/config",
    tag = "Configuration",
    responses(
        (status = 200, description = "Stored credentials", body = Credentials),
        (status = 500, description = "Credentials file unreadable", body = ErrorResponse),
    )
)]
pub async fn get_config(State(state): State<AppState>) -> Result<Json<Credentials>, ErrorResponse> {
    with_store(&state, "config_unavailable", |store, _| store.load())
        .await
        .map(Json)
}

/// POST /config — Persist credentials and reconfigure the live client.
#[utoipa::path(
    post,
    path = "/config",
    tag = "Configuration",
    request_body = Credentials,
    responses(
        (status = 200, description = "Credentials saved and applied"),
        (status = 500, description = "Credentials file not writable", body = ErrorResponse),
    )
)]
pub async fn save_config(
    State(state): State<AppState>,
    Json(credentials): Json<Credentials>,
) -> Result<StatusCode, ErrorResponse> {
    with_store(&state, "config_not_saved", move |store, client| {
        store.save(&credentials)?;
        client.reconfigure(credentials);
        Ok(())
    })
    .await?;

    info!("Credentials updated from settings panel");
    Ok(StatusCode::OK)
}

/// Run file I/O against the credential store on the blocking pool, under the
/// config lock.
async fn with_store<T, F>(state: &AppState, error: &'static str, f: F) -> Result<T, ErrorResponse>
where
    T: Send + 'static,
    F: FnOnce(&CredentialStore, &DialogClient) -> DialogResult<T> + Send + 'static,
{
    let store = state.store.clone();
    let client = state.client.clone();
    let lock = state.config_lock.clone();

    let result = tokio::task::spawn_blocking(move || {
        let _guard = lock.lock();
        f(store.as_ref(), client.as_ref())
    })
    .await;

    match result {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => {
            error!(error = %e, path = %state.store.path().display(), "Credentials file access failed");
            Err(ErrorResponse {
                error: error.to_string(),
                message: e.to_string(),
            })
        }
        Err(e) => {
            error!(error = %e, "Credentials task failed");
            Err(ErrorResponse {
                error: error.to_string(),
                message: e.to_string(),
            })
        }
    }
}
