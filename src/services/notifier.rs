//! # 알림 전송(Notifier)
//!
//! 리마인더를 외부 메신저로 보내는 경계입니다.
//! 스위프 작업은 `Notifier` 트레이트만 알고, 실제 전송 방식은 모릅니다.
//!
//! - `TelegramNotifier`: Telegram Bot API `sendMessage` 호출
//! - `DisabledNotifier`: 봇 토큰이 없을 때 사용. 로그만 남기고 실패를 돌려줍니다.
//!
//! 전송은 "최선의 노력(best-effort)"입니다. 실패해도 재시도하지 않습니다.

use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use thiserror::Error;

use crate::config::TelegramConfig;

/// 알림 전송 실패 — 스위프 작업 경계에서 로그로만 남습니다.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notifier is disabled")]
    Disabled,
    #[error("delivery timed out")]
    Timeout,
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("delivery rejected (HTTP {status}): {body}")]
    Status { status: u16, body: String },
}

#[async_trait]
pub trait Notifier: Send + Sync {
    /// `chat_id`로 `text`를 보냅니다.
    async fn send(&self, chat_id: &str, text: &str) -> Result<(), NotifyError>;
}

/// Telegram Bot API 클라이언트
pub struct TelegramNotifier {
    client: Client,
    /// "{TELEGRAM_URL}{TOKEN}/sendMessage"
    endpoint: String,
}

impl TelegramNotifier {
    pub fn new(api_url: &str, bot_token: &str, client: Client) -> Self {
        Self {
            client,
            endpoint: format!("{}{}/sendMessage", api_url, bot_token),
        }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, chat_id: &str, text: &str) -> Result<(), NotifyError> {
        let resp = self
            .client
            .get(&self.endpoint)
            .query(&[("chat_id", chat_id), ("text", text)])
            .send()
            .await?;

        if resp.status().is_success() {
            Ok(())
        } else {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            Err(NotifyError::Status { status, body })
        }
    }
}

/// 토큰이 설정되지 않은 환경용
pub struct DisabledNotifier;

#[async_trait]
impl Notifier for DisabledNotifier {
    async fn send(&self, chat_id: &str, _text: &str) -> Result<(), NotifyError> {
        tracing::debug!("Notifier disabled, dropping reminder for chat {}", chat_id);
        Err(NotifyError::Disabled)
    }
}

/// 설정에 맞는 Notifier를 만듭니다.
pub fn from_config(config: &TelegramConfig) -> Result<Arc<dyn Notifier>, NotifyError> {
    match &config.bot_token {
        Some(token) => {
            let client = Client::builder().timeout(config.timeout).build()?;
            tracing::info!("Telegram notifier enabled");
            Ok(Arc::new(TelegramNotifier::new(&config.api_url, token, client)))
        }
        None => {
            tracing::warn!("TELEGRAM_BOT_TOKEN not set, reminders will not be delivered");
            Ok(Arc::new(DisabledNotifier))
        }
    }
}
