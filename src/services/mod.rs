//! # 비즈니스 로직 모듈
//!
//! HTTP나 DB에 묶이지 않는 습관 도메인 로직을 모아둔 모듈입니다.
//! - `access`: 읽기/수정 권한 판단
//! - `validation`: 저장 전 습관 검증 규칙
//! - `schedule`: 리마인더 날짜 계산
//! - `notifier`: 외부 메신저로 리마인더 전송
//! - `reminders`: 주기적으로 도는 리마인더 스위프 작업

pub mod access;
pub mod notifier;
pub mod reminders;
pub mod schedule;
pub mod validation;
