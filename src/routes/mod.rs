//! # 라우트 핸들러 모듈
//!
//! HTTP 요청을 처리하는 핸들러 함수들과, 그 핸들러들을 URL에 연결하는 라우터입니다.
//!
//! 각 하위 모듈:
//! - `auth`: 인증 관련 (회원가입, 로그인, 토큰 갱신, 로그아웃, 내 정보)
//! - `habits`: 습관 CRUD, 공개 목록, 내 목록
//! - `health`: 서버 상태 확인 (헬스체크)

pub mod auth;
pub mod habits;
pub mod health;

use axum::{
    routing::{get, post},
    Router,
};
use sqlx::SqlitePool;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use habits::*;
use health::health_check;

/// 모든 핸들러가 공유하는 애플리케이션 상태
///
/// `#[derive(Clone)]`: Axum은 요청마다 State를 복제해서 핸들러에 넘깁니다.
/// `SqlitePool`은 내부가 Arc라서 복제해도 같은 풀을 가리킵니다.
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    /// JWT 서명/검증 비밀키
    pub jwt_secret: String,
    /// 목록 엔드포인트의 페이지당 항목 수
    pub page_size: u32,
}

/// `/api/v1` 아래에 모든 API를 묶은 라우터를 만듭니다.
///
/// main.rs와 통합 테스트가 같은 라우터를 사용합니다.
pub fn router(state: AppState) -> Router {
    // 인증 관련 라우트
    let auth_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh))
        .route("/auth/logout", post(auth::logout))
        .route(
            "/auth/me",
            get(auth::me).patch(auth::update_me).delete(auth::delete_me),
        );

    let api_routes = Router::new()
        .merge(auth_routes)
        // 습관 API
        // 고정 경로(/habits/public, /habits/mine)는 {id}보다 우선 매칭됩니다.
        .route("/habits", post(create_habit))
        .route("/habits/public", get(list_public_habits))
        .route("/habits/mine", get(list_own_habits))
        // Axum 0.8부터 경로 파라미터는 {id} 형식입니다.
        .route(
            "/habits/{id}",
            get(get_habit)
                .put(replace_habit)
                .patch(update_habit)
                .delete(delete_habit),
        )
        .route("/health", get(health_check))
        .with_state(state);

    // 개발 편의를 위해 모든 출처를 허용합니다.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/api/v1", api_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
