//! 통합 테스트 공용 도구
//!
//! - 인메모리 SQLite에 마이그레이션을 적용한 풀
//! - `tower::ServiceExt::oneshot`으로 라우터에 요청 보내기
//! - 사용자/습관을 DB에 직접 만드는 헬퍼

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::{NaiveDate, NaiveTime};
use habitrack::{
    db,
    middleware::auth::create_access_token,
    models::{Habit, HabitFields, Periodicity},
    routes::{self, AppState},
};
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use tower::ServiceExt;

pub const SECRET: &str = "integration-test-secret";

pub struct TestApp {
    pub pool: SqlitePool,
    pub router: Router,
}

/// 연결이 하나뿐이어야 모든 쿼리가 같은 인메모리 DB를 봅니다.
pub async fn pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    db::MIGRATOR.run(&pool).await.unwrap();
    pool
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_page_size(5).await
    }

    pub async fn with_page_size(page_size: u32) -> Self {
        let pool = pool().await;
        let router = routes::router(AppState {
            pool: pool.clone(),
            jwt_secret: SECRET.to_string(),
            page_size,
        });
        Self { pool, router }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        // JSON이 아닌 본문은 문자열 그대로 돌려줘서 실패 메시지에 보이게 합니다.
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    pub async fn patch(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Method::PATCH, uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, token, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, token, None).await
    }
}

/// 사용자를 만들고 (ID, 액세스 토큰)을 반환합니다.
pub async fn create_user(pool: &SqlitePool, name: &str, tg_chat_id: Option<&str>) -> (String, String) {
    let id = uuid::Uuid::now_v7().to_string();
    let email = format!("{}@example.com", name);
    db::users::create_user(pool, &id, &email, "not-a-real-hash", tg_chat_id)
        .await
        .unwrap();
    let token = create_access_token(&id, SECRET).unwrap();
    (id, token)
}

/// 보상이 있는 유용한 습관의 필드
pub fn useful_fields(action: &str, is_publicity: bool) -> HabitFields {
    HabitFields {
        action: action.to_string(),
        place: Some("Home".to_string()),
        time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        is_pleasant_habit: false,
        periodicity: Periodicity::Daily,
        reward: Some("Coffee".to_string()),
        time_to_complete: 30,
        is_publicity,
        associated_habit_id: None,
    }
}

/// 검증을 거치지 않고 습관을 바로 저장합니다.
pub async fn insert_habit(
    pool: &SqlitePool,
    owner_id: &str,
    fields: &HabitFields,
    next_reminder: NaiveDate,
) -> Habit {
    let id = uuid::Uuid::now_v7().to_string();
    db::habits::create_habit(pool, &id, owner_id, fields, next_reminder)
        .await
        .unwrap()
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// 검증 에러 응답에서 메시지만 모읍니다.
pub fn field_messages(body: &Value) -> Vec<String> {
    body["error"]["fields"]
        .as_array()
        .map(|fields| {
            fields
                .iter()
                .filter_map(|f| f["message"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}
