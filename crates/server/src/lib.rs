use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;
use serde::Serialize;
use serde_json::{Value, json};

pub use server::{app, run, run_with_listener};

mod balances;
mod expenses;
mod groups;
mod health;
mod memberships;
mod reports;
mod server;
mod settlements;

pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

/// Machine-readable error payload: a stable kind, a human message, and
/// structured details (offending amounts) where the engine provides them.
#[derive(Serialize)]
struct ErrorDetail {
    kind: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::NotFound(_) => StatusCode::NOT_FOUND,
        EngineError::Conflict(_) => StatusCode::CONFLICT,
        EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        EngineError::SplitMismatch { .. }
        | EngineError::InvalidInput(_)
        | EngineError::SettlementExceedsBalance { .. } => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

fn kind_for_engine_error(err: &EngineError) -> &'static str {
    match err {
        EngineError::NotFound(_) => "not_found",
        EngineError::Conflict(_) => "conflict",
        EngineError::SplitMismatch { .. } => "split_mismatch",
        EngineError::InvalidInput(_) => "invalid_input",
        EngineError::SettlementExceedsBalance { .. } => "settlement_exceeds_balance",
        EngineError::Database(_) => "internal",
    }
}

fn body_for_engine_error(err: EngineError) -> ErrorDetail {
    let kind = kind_for_engine_error(&err);
    let message = err.to_string();
    let details = match &err {
        EngineError::SplitMismatch { expected, actual } => {
            Some(json!({ "expected": expected, "actual": actual }))
        }
        EngineError::SettlementExceedsBalance {
            requested,
            available,
        } => Some(json!({
            "requested_minor": requested.cents(),
            "available_minor": available.cents(),
        })),
        _ => None,
    };

    if let EngineError::Database(db_err) = &err {
        tracing::error!("database error: {db_err}");
        return ErrorDetail {
            kind,
            message: "internal server error".to_string(),
            details: None,
        };
    }

    ErrorDetail {
        kind,
        message,
        details,
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => (status_for_engine_error(&err), body_for_engine_error(err)),
            ServerError::Generic(err) => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    kind: "bad_request",
                    message: err,
                    details: None,
                },
            ),
        };

        (status, Json(ErrorBody { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

pub(crate) fn member_ref(value: engine::MemberRef) -> api_types::MemberRef {
    api_types::MemberRef {
        id: value.id,
        name: value.name,
    }
}
