//! # JSON 요청 본문 추출기
//!
//! `axum::Json`과 같지만, 본문을 해석하지 못하면 axum 기본 응답(422, 텍스트 본문) 대신
//! `AppError`의 JSON 에러 형식으로 응답합니다.
//!
//! 핸들러에서는 `Json(body): Json<T>` 자리에 `AppJson(body): AppJson<T>`를 씁니다.
//! 응답은 그대로 `axum::Json`을 사용합니다.

use axum::{
    extract::{FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;

use crate::error::AppError;

pub struct AppJson<T>(pub T);

impl<S, T> FromRequest<S> for AppJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        // JsonRejection → AppError 변환은 error.rs의 From 구현이 담당합니다.
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(AppJson(value))
    }
}
