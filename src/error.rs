use axum::extract::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use std::env;
use std::fmt::Debug;
use std::io;

#[derive(Debug)]
pub struct Error {
    pub code: i32,
    pub message: String,
}

impl From<env::VarError> for Error {
    fn from(err: env::VarError) -> Self {
        env_var_error(err)
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        io_error(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        configuration_error(format!("malformed tariff: {}", err))
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, error_message) = match self.code {
            1..=99 => (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error"),
            _ => (StatusCode::BAD_REQUEST, self.message.as_str()),
        };

        let body = Json(json!({
            "code": self.code,
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

pub fn invalid_input_error() -> Error {
    Error {
        code: 101,
        message: "invalid input".into(),
    }
}

pub fn unknown_vehicle_error(vehicle_id: &str) -> Error {
    Error {
        code: 102,
        message: format!("unknown vehicle: {}", vehicle_id),
    }
}

pub fn capacity_exceeded_error(max_passengers: u32, requested: u32) -> Error {
    Error {
        code: 103,
        message: format!(
            "vehicle capacity exceeded: {} requested, {} allowed",
            requested, max_passengers
        ),
    }
}

/// Raised by tariff validation, never while quoting.
pub fn configuration_error(detail: String) -> Error {
    Error {
        code: 104,
        message: detail,
    }
}

pub fn env_var_error(_: env::VarError) -> Error {
    Error {
        code: 1,
        message: "environment variable error".into(),
    }
}

pub fn io_error<T: Debug>(_: T) -> Error {
    Error {
        code: 2,
        message: "io error".into(),
    }
}

pub fn unexpected_error() -> Error {
    Error {
        code: 5,
        message: "unexpected error".into(),
    }
}

#[test]
fn client_errors_expose_message() {
    let response = unknown_vehicle_error("limo").into_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = unexpected_error().into_response();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[test]
fn malformed_json_is_a_configuration_error() {
    let err: Error = serde_json::from_str::<serde_json::Value>("{")
        .map_err(Error::from)
        .unwrap_err();
    assert_eq!(err.code, 104);
}
