//! # 에러 처리 모듈
//!
//! 애플리케이션에서 발생할 수 있는 모든 에러 타입을 정의합니다.
//!
//! 이 모듈의 핵심:
//! - `AppError` 열거형(enum): 모든 에러 종류를 하나의 타입으로 통합
//! - `FieldError`: 검증 실패 시 "어느 필드가, 왜" 실패했는지를 담는 구조체
//! - `IntoResponse` 구현: 에러를 HTTP 응답으로 자동 변환
//!
//! 알림 전송 실패(`NotifyError`)는 여기에 없습니다.
//! 스위프 작업 안에서 로그로만 남고 사용자에게는 절대 노출되지 않기 때문입니다.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

/// 검증 규칙 하나가 실패한 결과
///
/// 응답 JSON 에서는 `{ "field": "reward", "message": "..." }` 형태가 됩니다.
/// 필드 하나에 묶이지 않는 교차 필드 규칙은 `non_field_errors` 를 사용합니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// 애플리케이션에서 발생할 수 있는 모든 에러 종류
///
/// 각 에러 variant는 적절한 HTTP 상태 코드와 메시지로 변환됩니다.
/// 핸들러에서 `Result<T, AppError>`를 반환하면,
/// Axum이 자동으로 `IntoResponse`를 호출하여 HTTP 응답으로 변환합니다.
#[derive(Debug, Error)]
pub enum AppError {
    /// 요청한 리소스를 찾을 수 없음 (HTTP 404)
    #[error("Resource not found")]
    NotFound,

    /// 잘못된 요청 (HTTP 400)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// 습관 검증 규칙 위반 (HTTP 400)
    /// 실패한 규칙을 모두 모아서 한 번에 돌려줍니다. 저장은 전혀 일어나지 않습니다.
    #[error("Validation failed: {} error(s)", .0.len())]
    Validation(Vec<FieldError>),

    /// 서버 내부 오류 (HTTP 500)
    #[error("Internal error: {0}")]
    Internal(String),

    /// 데이터베이스 오류 (HTTP 500)
    /// #[from]: sqlx::Error → AppError::Database 자동 변환 (`?` 연산자용)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// 인증되지 않은 호출자 (HTTP 401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// 인증은 되었지만 권한이 없음 (HTTP 403)
    /// 예: 남의 비공개 습관 조회, 남의 습관 수정/삭제
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// 리소스 충돌 (HTTP 409)
    #[error("Conflict: {0}")]
    Conflict(String),
}

/// 요청 본문 JSON을 해석하지 못한 경우
///
/// - 타입이 맞지 않는 값(`"time_to_complete": "30"`, `"is_publicity": null`)은
///   검증 실패와 같은 400 `validation_error`로, 경로를 필드 이름으로 씁니다.
/// - 문법 오류, Content-Type 누락 등 나머지는 400 `bad_request`입니다.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonDataError(err) => {
                AppError::Validation(vec![json_field_error(&err.body_text())])
            }
            other => AppError::BadRequest(other.body_text()),
        }
    }
}

const JSON_DATA_PREFIX: &str = "Failed to deserialize the JSON body into the target type: ";

/// "경로: 메시지" 형태의 역직렬화 에러를 FieldError로 나눕니다.
/// 경로가 없는 에러(본문 전체의 타입이 틀림)는 `non_field_errors`로 보냅니다.
fn json_field_error(detail: &str) -> FieldError {
    let detail = detail.strip_prefix(JSON_DATA_PREFIX).unwrap_or(detail);
    match detail.split_once(": ") {
        Some((path, message)) if !path.is_empty() && !path.contains(' ') => {
            FieldError::new(path, message)
        }
        _ => FieldError::new("non_field_errors", detail),
    }
}

impl IntoResponse for AppError {
    /// AppError를 HTTP 응답으로 변환합니다.
    ///
    /// 내부 에러(Database, Internal)는 실제 에러 내용을 로그에만 기록하고,
    /// 클라이언트에는 일반적인 메시지만 반환합니다.
    fn into_response(self) -> Response {
        // 검증 실패는 필드 목록이 추가로 붙으므로 먼저 따로 처리합니다.
        if let AppError::Validation(ref fields) = self {
            let body = Json(json!({
                "error": {
                    "code": "validation_error",
                    "message": "Request failed validation",
                    "fields": fields
                }
            }));
            return (StatusCode::BAD_REQUEST, body).into_response();
        }

        let (status, code, message) = match self {
            AppError::NotFound => (StatusCode::NOT_FOUND, "not_found", self.to_string()),
            AppError::BadRequest(ref msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", msg.clone())
            }
            // 위에서 이미 반환했으므로 여기에는 오지 않지만, match 는 모든 경우를 다뤄야 합니다.
            AppError::Validation(_) => (
                StatusCode::BAD_REQUEST,
                "validation_error",
                "Request failed validation".to_string(),
            ),
            AppError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
            AppError::Database(ref e) => {
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "database_error",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Unauthorized(ref msg) => {
                (StatusCode::UNAUTHORIZED, "unauthorized", msg.clone())
            }
            AppError::Forbidden(ref msg) => (StatusCode::FORBIDDEN, "forbidden", msg.clone()),
            AppError::Conflict(ref msg) => (StatusCode::CONFLICT, "conflict", msg.clone()),
        };

        // 결과: { "error": { "code": "not_found", "message": "Resource not found" } }
        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
