//! # Habitrack
//!
//! 습관 트래커 백엔드 라이브러리 크레이트입니다.
//!
//! 바이너리(main.rs)와 통합 테스트(tests/)가 같은 모듈을 사용할 수 있도록
//! 모듈 선언을 여기에 모아 둡니다.
//!
//! - `config`: 환경변수 설정
//! - `db`: SQLite 쿼리와 마이그레이션
//! - `error`: API 에러 타입
//! - `middleware`: JWT 인증 추출기
//! - `models`: 데이터 구조체
//! - `routes`: HTTP 핸들러와 라우터
//! - `services`: 검증, 접근 제어, 리마인더 스케줄링, 알림 전송

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
