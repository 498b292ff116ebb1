//! HTTP routes.
//!
//! | Method | Path    | Operation                                  |
//! |--------|---------|--------------------------------------------|
//! | GET    | `/`     | list namespaces                            |
//! | POST   | `/`     | store `{"name", "value", "overwrite"}`     |
//! | PUT    | `/{ns}` | create if absent                           |
//! | GET    | `/{ns}` | read                                       |
//! | POST   | `/{ns}` | merge into an existing document            |
//! | DELETE | `/{ns}` | remove                                     |

use crate::error::{Envelope, NoFields, ServerError};
use crate::handler::RequestHandler;
use axum::body::Bytes;
use axum::extract::rejection::{BytesRejection, PathRejection};
use axum::extract::{DefaultBodyLimit, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use nestdb_core::Resource;
use serde::Serialize;
use tower_http::trace::TraceLayer;

#[derive(Debug, Serialize)]
struct Created {
    created: bool,
}

#[derive(Debug, Serialize)]
struct Updated {
    updated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    payload: Option<Resource>,
}

#[derive(Debug, Serialize)]
struct Deleted {
    deleted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    payload: Option<Resource>,
}

#[derive(Debug, Serialize)]
struct Payload {
    payload: Resource,
}

/// Builds the router for `handler`.
pub fn router(handler: RequestHandler, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/", get(list).post(add).fallback(method_not_allowed))
        .route(
            "/:ns",
            get(read)
                .put(create)
                .post(update)
                .delete(remove)
                .fallback(method_not_allowed),
        )
        .fallback(unknown_route)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(handler)
}

fn read_body(body: Result<Bytes, BytesRejection>) -> Result<Bytes, ServerError> {
    body.map_err(|rejection| ServerError::BodyRejected {
        status: rejection.status(),
        message: rejection.body_text(),
    })
}

fn namespace(path: Result<Path<String>, PathRejection>) -> Result<String, ServerError> {
    path.map(|Path(ns)| ns)
        .map_err(|rejection| ServerError::BadRequest(rejection.body_text()))
}

async fn list(State(handler): State<RequestHandler>) -> Json<Vec<String>> {
    Json(handler.handle_list())
}

async fn add(
    State(handler): State<RequestHandler>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let result = read_body(body).and_then(|body| handler.handle_add(&body));
    match result {
        Ok(payload) => Json(Envelope::ok(Payload { payload })).into_response(),
        Err(err) => err.into_response(),
    }
}

async fn create(
    State(handler): State<RequestHandler>,
    ns: Result<Path<String>, PathRejection>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let result = namespace(ns)
        .and_then(|ns| read_body(body).and_then(|body| handler.handle_create(&ns, &body)));
    match result {
        Ok(()) => (
            StatusCode::CREATED,
            Json(Envelope::ok(Created { created: true })),
        )
            .into_response(),
        Err(err) => err.into_response_with(Created { created: false }),
    }
}

async fn read(
    State(handler): State<RequestHandler>,
    ns: Result<Path<String>, PathRejection>,
) -> Response {
    match namespace(ns).and_then(|ns| handler.handle_read(&ns)) {
        Ok(doc) => Json(doc).into_response(),
        Err(err) => err.into_response(),
    }
}

async fn update(
    State(handler): State<RequestHandler>,
    ns: Result<Path<String>, PathRejection>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let result = namespace(ns)
        .and_then(|ns| read_body(body).and_then(|body| handler.handle_update(&ns, &body)));
    match result {
        Ok(merged) => Json(Envelope::ok(Updated {
            updated: true,
            payload: Some(merged),
        }))
        .into_response(),
        Err(err) => err.into_response_with(Updated {
            updated: false,
            payload: None,
        }),
    }
}

async fn remove(
    State(handler): State<RequestHandler>,
    ns: Result<Path<String>, PathRejection>,
) -> Response {
    match namespace(ns).and_then(|ns| handler.handle_delete(&ns)) {
        Ok(removed) => Json(Envelope::ok(Deleted {
            deleted: true,
            payload: Some(removed),
        }))
        .into_response(),
        Err(err) => err.into_response_with(Deleted {
            deleted: false,
            payload: None,
        }),
    }
}

fn error_envelope(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(Envelope {
            error: true,
            message: Some(message.to_string()),
            fields: NoFields {},
        }),
    )
        .into_response()
}

async fn unknown_route() -> Response {
    error_envelope(StatusCode::NOT_FOUND, "no such route")
}

async fn method_not_allowed() -> Response {
    error_envelope(StatusCode::METHOD_NOT_ALLOWED, "method not allowed")
}
