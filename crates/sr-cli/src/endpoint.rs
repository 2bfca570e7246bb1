use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::Value;
use sr_api::ScriptRunner;
use sr_core::ScriptError;
use tracing::{error, info};

use crate::{
    debug_flag, parse_request, ClientErrorBody, Environment, ServerErrorBody, SuccessBody,
};

#[derive(Debug, Clone)]
pub(crate) struct AppState {
    pub(crate) runner: Arc<ScriptRunner>,
    pub(crate) environment: Environment,
}

pub(crate) fn router(state: AppState) -> Router {
    Router::new()
        .route("/run-script", post(run_script))
        .with_state(state)
}

pub(crate) async fn run_script(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Response {
    let body = match payload {
        Ok(Json(body)) => body,
        Err(rejection) => {
            return client_error(ClientErrorBody::new(format!(
                "Invalid request body: {}",
                rejection.body_text()
            )))
        }
    };

    let options = match parse_request(&body) {
        Ok(options) => options,
        Err(rejection) => {
            // wrappers were present, only their values had the wrong type
            if debug_flag(&body) && rejection.received.is_some() {
                info!("Received Request: {}", body);
            }
            return client_error(rejection);
        }
    };
    if options.debug {
        info!("Received Request: {}", body);
    }

    match state.runner.run(&options).await {
        Ok(result) => (
            StatusCode::OK,
            Json(SuccessBody {
                success: true,
                result,
            }),
        )
            .into_response(),
        Err(failure) if failure.kind.is_client_error() => {
            client_error(ClientErrorBody::new(failure.message))
        }
        Err(failure) => {
            if options.debug {
                error!("Error in /run-script: {}", failure);
            }
            server_error(failure, state.environment)
        }
    }
}

fn client_error(body: ClientErrorBody) -> Response {
    (StatusCode::BAD_REQUEST, Json(body)).into_response()
}

fn server_error(failure: ScriptError, environment: Environment) -> Response {
    let details = environment
        .exposes_details()
        .then(|| format!("{:?}", failure));
    let body = ServerErrorBody {
        success: false,
        error: format!("Code execution failed: {}", failure.message),
        details,
    };
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}
