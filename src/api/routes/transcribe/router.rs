//! Router for the transcription API

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{StatusCode, header},
    response::{Html, IntoResponse},
    routing::get,
};
use tokio::sync::mpsc;
use tokio_stream::StreamExt as _;
use tokio_stream::wrappers::UnboundedReceiverStream;

use crate::api::state::AppState;
use crate::openai::{Message, Role};
use crate::transcribe;

type SharedState = Arc<AppState>;

static UI_PAGE: &str = include_str!("../../../../web-ui/index.html");

/// Serve the static UI document
async fn index() -> impl IntoResponse {
    Html(UI_PAGE)
}

async fn method_not_allowed() -> impl IntoResponse {
    (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
}

/// Accept raw subtitle text and stream the reconstructed transcript
/// back as it is produced. The response headers are sent before the
/// model has emitted anything since the round loop can take many
/// seconds.
async fn submit(State(state): State<SharedState>, body: String) -> impl IntoResponse {
    if body.trim().is_empty() {
        return (StatusCode::BAD_REQUEST, "Subtitle text is required").into_response();
    }

    let transcript = vec![
        Message::new(Role::System, &state.config.system_prompt),
        Message::new(Role::User, &body),
    ];

    let (tx, rx) = mpsc::unbounded_channel::<String>();

    // Run the round loop in the background while the response streams.
    // If the client disconnects the receiver is dropped and the loop
    // observes it as a failed send.
    tokio::spawn(async move {
        let reason = transcribe::run(tx, transcript, &state.config, &state.client).await;
        tracing::debug!("Transcription run ended: {:?}", reason);
    });

    let stream = UnboundedReceiverStream::new(rx).map(Ok::<_, Infallible>);

    (
        [(header::CONTENT_TYPE, "text/stream; charset=utf-8")],
        Body::from_stream(stream),
    )
        .into_response()
}

/// Create the transcription router. Dispatch is by method only: the
/// UI posts to /api but any path behaves the same.
pub fn router() -> Router<SharedState> {
    let dispatch = get(index).post(submit).fallback(method_not_allowed);
    Router::new()
        .route("/", dispatch.clone())
        .route("/{*path}", dispatch)
}
