//! # 헬스체크(Health Check) 핸들러
//!
//! - `GET /api/v1/health` → `{ "status": "ok", "database": "ok" }`
//!
//! 데이터베이스에 `SELECT 1`을 보내 연결 풀이 살아 있는지도 함께 확인합니다.
//! 데이터베이스가 응답하지 않으면 503을 반환합니다.

use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

use crate::routes::AppState;

/// `GET /health` — 서버와 데이터베이스 상태를 확인합니다.
///
/// 성공이든 실패든 본문 형태는 같습니다 (`AppError` 형식이 아님).
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    match sqlx::query("SELECT 1").execute(&state.pool).await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({ "status": "ok", "database": "ok" })),
        ),
        Err(e) => {
            tracing::error!("Health check database probe failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "degraded", "database": "unavailable" })),
            )
        }
    }
}
