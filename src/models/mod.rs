//! # 데이터 모델 모듈
//!
//! 애플리케이션에서 사용하는 데이터 구조체(struct)들을 정의합니다.
//! - `habit`: 습관(Habit)과 주기, 생성/수정 요청, 스위프용 조회 결과
//! - `page`: 목록 API 페이지네이션
//! - `user`: 사용자(User)와 인증 요청/응답
//!
//! `pub use X::*;`로 재공개하여 `crate::models::Habit`처럼 짧게 쓸 수 있습니다.

pub mod habit;
pub mod page;
pub mod user;

pub use habit::*;
pub use page::*;
pub use user::*;

use serde::{Deserialize, Deserializer};

/// 필드가 존재하면 (null이어도) `Some`으로 감쌉니다.
///
/// `Option<Option<T>>` 필드에 `#[serde(default, deserialize_with = "...")]`로 붙여
/// "필드 누락"(None)과 "null"(Some(None))을 구분합니다.
/// serde 기본 동작은 둘 다 None으로 만듭니다.
pub(crate) fn present<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}
