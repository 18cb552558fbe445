use crate::state::AppState;
use axum::{
    extract::State,
    http::{HeaderValue, Method},
    response::{
        sse::{Event, KeepAlive, Sse},
        Json,
    },
    routing::{get, post},
    Router,
};
use fit_worker::{Request, Response};
use std::convert::Infallible;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

#[cfg(test)]
pub fn make_router(state: AppState) -> Router {
    make_router_with_cors(state, HeaderValue::from_static("http://localhost:5173"))
}

pub fn make_router_with_cors(state: AppState, cors_origin: HeaderValue) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(cors_origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/api/v1/meta", get(meta_handler))
        .route("/api/v1/requests", post(requests_handler))
        .route("/api/v1/cancel", post(cancel_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn meta_handler(State(app_state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "progressEvery": app_state.worker.config().progress_every,
        "busy": app_state.is_busy(),
    }))
}

pub async fn cancel_handler(State(app_state): State<AppState>) -> Json<serde_json::Value> {
    match app_state.cancel_active() {
        Some(job) => {
            tracing::info!(job, "cancel requested");
            Json(serde_json::json!({"cancelled": true, "job": job}))
        }
        None => Json(serde_json::json!({"cancelled": false})),
    }
}

fn response_event(response: &Response) -> Event {
    match serde_json::to_string(response) {
        Ok(data) => Event::default().data(data),
        Err(err) => {
            tracing::error!("response serialization failed: {err}");
            Event::default().data(r#"{"error":"serialization failed"}"#)
        }
    }
}

/// Streams the job's responses as SSE events, ending after the terminal one.
/// Closing the connection drops the job, which cancels it.
pub async fn requests_handler(
    State(app_state): State<AppState>,
    body: String,
) -> Sse<impl futures_core::Stream<Item = Result<Event, Infallible>>> {
    let stream = async_stream::stream! {
        match Request::from_json(&body) {
            Err(response) => {
                tracing::warn!(action = %response.action(), "rejected request");
                yield Ok(response_event(&response));
            }
            Ok(request) => {
                let action = request.action();
                match app_state.start(request) {
                    Err(err) => {
                        tracing::error!("starting job failed: {err:#}");
                        yield Ok(response_event(&Response::failed(action, err.to_string())));
                    }
                    Ok(mut job) => {
                        let id = job.id();
                        tracing::info!(job = id, %action, "request accepted");
                        while let Some(response) = job.recv().await {
                            let terminal = response.is_terminal();
                            yield Ok(response_event(&response));
                            if terminal {
                                break;
                            }
                        }
                        app_state.finish(id);
                    }
                }
            }
        }
    };

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(30))
            .text("ping"),
    )
}
