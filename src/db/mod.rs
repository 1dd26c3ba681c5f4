//! # 데이터베이스 접근 계층 (Data Access Layer)
//!
//! 데이터베이스와 직접 상호작용하는 함수들을 모아둔 모듈입니다.
//! 라우트 핸들러(routes/)와 리마인더 스위프(services/reminders)에서 호출합니다.
//!
//! 각 하위 모듈:
//! - `habits`: 습관 CRUD, 목록 페이지, 스위프용 조회/갱신 쿼리
//! - `users`: 사용자 계정과 리프레시 토큰 쿼리

pub mod habits;
pub mod users;

/// 임베드된 마이그레이션(`./migrations`)
///
/// `sqlx::migrate!`는 컴파일 타임에 SQL 파일들을 바이너리에 포함시킵니다.
/// 서버 시작 시와 테스트용 인메모리 DB 준비에 함께 사용합니다.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
