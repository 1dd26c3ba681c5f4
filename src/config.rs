//! # 애플리케이션 설정(Configuration) 모듈
//!
//! 환경변수에서 서버 설정값을 읽어오는 모듈입니다.
//! `.env` 파일이나 시스템 환경변수에서 값을 가져옵니다.
//!
//! 설정 항목:
//! - `DATABASE_URL`: SQLite 데이터베이스 경로 (필수)
//! - `JWT_SECRET`: JWT 토큰 서명에 사용할 비밀키 (필수)
//! - `HOST` / `PORT`: 서버 바인딩 주소와 포트
//! - `PAGE_SIZE`: 습관 목록 한 페이지의 크기
//! - `TELEGRAM_URL` / `TELEGRAM_BOT_TOKEN`: 리마인더 전송용 Telegram Bot API
//! - `SWEEP_INTERVAL_SECS`: 리마인더 스위프 주기 (초)
//! - `NOTIFY_TIMEOUT_SECS`: 알림 한 건당 전송 제한 시간 (초)
//!
//! 전역 상태 대신, 여기서 만든 값을 각 구성 요소에 생성자 인자로 넘겨줍니다.
//! (`AppState.page_size`, `SweepConfig`, `TelegramConfig`)

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// 목록 API 의 기본 페이지 크기
pub const DEFAULT_PAGE_SIZE: u32 = 5;

/// 애플리케이션 전체 설정을 담는 구조체
///
/// 서버 시작 시 환경변수에서 한 번 읽어온 후,
/// 필요한 부분만 잘라서 각 구성 요소에 전달합니다.
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite 데이터베이스 URL (예: "sqlite:data/habitrack.db?mode=rwc")
    pub database_url: String,
    /// JWT 토큰 서명/검증에 사용하는 비밀키
    pub jwt_secret: String,
    /// 서버가 바인딩할 호스트 주소 (기본값: "0.0.0.0")
    pub host: String,
    /// 서버 포트 번호 (기본값: 3000)
    pub port: u16,
    /// 공개/내 습관 목록의 페이지 크기 (기본값: 5)
    pub page_size: u32,
    pub telegram: TelegramConfig,
    pub sweep: SweepConfig,
}

/// Telegram Bot API 설정
///
/// 토큰이 없으면 알림 전송이 비활성화됩니다 (로컬 개발용).
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    /// API 주소 접두사. 뒤에 토큰과 `/sendMessage` 가 붙습니다.
    pub api_url: String,
    pub bot_token: Option<String>,
    /// 요청 하나에 허용하는 최대 시간
    pub timeout: Duration,
}

/// 리마인더 스위프 작업 설정
#[derive(Debug, Clone)]
pub struct SweepConfig {
    /// 스위프 실행 주기
    pub interval: Duration,
    /// 알림 한 건이 전체 스위프를 멈추지 않도록 거는 제한 시간
    pub notify_timeout: Duration,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60),
            notify_timeout: Duration::from_secs(10),
        }
    }
}

impl Config {
    /// 환경변수에서 설정값을 읽어 Config 인스턴스를 생성합니다.
    ///
    /// # 에러
    /// `DATABASE_URL`과 `JWT_SECRET`은 필수이며, 없으면 에러가 발생합니다.
    /// 나머지 설정은 기본값이 있어 환경변수가 없어도 동작합니다.
    /// 숫자 설정을 파싱할 수 없으면 기본값을 사용합니다.
    pub fn from_env() -> Result<Self, env::VarError> {
        let notify_timeout = Duration::from_secs(env_or("NOTIFY_TIMEOUT_SECS", 10));

        Ok(Self {
            database_url: env::var("DATABASE_URL")?,
            jwt_secret: env::var("JWT_SECRET")?,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env_or("PORT", 3000),
            // 페이지 크기 0 은 페이지네이션을 깨뜨리므로 1 이상으로 고정합니다.
            page_size: env_or("PAGE_SIZE", DEFAULT_PAGE_SIZE).max(1),
            telegram: TelegramConfig {
                api_url: env::var("TELEGRAM_URL")
                    .unwrap_or_else(|_| "https://api.telegram.org/bot".to_string()),
                // 빈 문자열도 "토큰 없음"으로 취급합니다.
                bot_token: env::var("TELEGRAM_BOT_TOKEN")
                    .ok()
                    .filter(|token| !token.trim().is_empty()),
                timeout: notify_timeout,
            },
            sweep: SweepConfig {
                interval: Duration::from_secs(env_or("SWEEP_INTERVAL_SECS", 60).max(1)),
                notify_timeout,
            },
        })
    }
}

/// 환경변수를 읽어 `T`로 파싱하고, 없거나 잘못된 값이면 `default`를 반환합니다.
fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}
