//! # 리마인더 스위프 작업
//!
//! 일정 주기(기본 1분)마다 실행되어:
//! 0. 이미 지나간 리마인더 날짜를 오늘 또는 내일로 다시 정하고 (알림 없음)
//! 1. 오늘 날짜가 리마인더 날짜이고 수행 시각이 지난 습관을 조회하고
//! 2. 소유자에게 chat id가 있으면 Notifier로 습관의 `action`을 보내고
//! 3. 결과와 상관없이 리마인더 날짜를 주기만큼 넘겨 저장합니다.
//!
//! 한 습관에서 생긴 에러는 그 습관에서 끝납니다. 다른 습관 처리는 계속됩니다.
//! 한 습관 안에서는 항상 "알림 → 날짜 갱신" 순서를 지킵니다.

use chrono::NaiveDateTime;
use sqlx::SqlitePool;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::config::SweepConfig;
use crate::db;
use crate::error::AppError;
use crate::models::{DueReminder, Periodicity};
use crate::services::notifier::{Notifier, NotifyError};
use crate::services::schedule;

/// 스위프 한 번의 결과 집계
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepReport {
    /// 조회된 습관 수
    pub due: usize,
    /// 전송에 성공한 알림 수
    pub notified: usize,
    /// 전송에 실패했거나 시간 초과된 알림 수
    pub delivery_failures: usize,
    /// 리마인더 날짜를 넘긴 습관 수
    pub advanced: usize,
    /// 날짜를 넘기지 못한 습관 수 (알 수 없는 주기, DB 에러)
    pub failed: usize,
    /// 지나간 날짜에 멈춰 있다가 다시 정해진 습관 수
    pub reseeded: u64,
}

pub struct ReminderSweeper {
    pool: SqlitePool,
    notifier: Arc<dyn Notifier>,
    config: SweepConfig,
}

impl ReminderSweeper {
    pub fn new(pool: SqlitePool, notifier: Arc<dyn Notifier>, config: SweepConfig) -> Self {
        Self {
            pool,
            notifier,
            config,
        }
    }

    /// `now` 시점 기준으로 스위프를 한 번 실행합니다.
    ///
    /// 재설정 쿼리나 조회 쿼리 자체가 실패한 경우에만 에러를 반환합니다.
    pub async fn run_once(&self, now: NaiveDateTime) -> Result<SweepReport, AppError> {
        let today = now.date();
        let tomorrow = schedule::tomorrow(today);
        let reseeded = db::habits::reseed_stale(&self.pool, today, tomorrow, now.time()).await?;
        if reseeded > 0 {
            warn!(reseeded, "Reminders stuck on a past date were rescheduled without notifying");
        }

        let due = db::habits::list_due(&self.pool, today, now.time()).await?;

        let mut report = SweepReport {
            due: due.len(),
            reseeded,
            ..SweepReport::default()
        };

        // 순차 처리: 한 습관의 알림과 날짜 갱신 순서가 섞이지 않습니다.
        for reminder in &due {
            self.process(reminder, &mut report).await;
        }

        Ok(report)
    }

    async fn process(&self, reminder: &DueReminder, report: &mut SweepReport) {
        // 주기를 먼저 확인합니다. 날짜를 넘길 수 없는 습관에 알림을 보내면
        // 다음 스위프마다 같은 알림이 반복되기 때문입니다.
        let periodicity = match reminder.periodicity.parse::<Periodicity>() {
            Ok(periodicity) => periodicity,
            Err(e) => {
                error!(habit_id = %reminder.id, "Cannot advance reminder: {}", e);
                report.failed += 1;
                return;
            }
        };

        match reminder.tg_chat_id.as_deref() {
            Some(chat_id) => match self.deliver(chat_id, &reminder.action).await {
                Ok(()) => {
                    debug!(habit_id = %reminder.id, "Reminder delivered");
                    report.notified += 1;
                }
                Err(e) => {
                    warn!(habit_id = %reminder.id, "Reminder delivery failed: {}", e);
                    report.delivery_failures += 1;
                }
            },
            None => {
                debug!(
                    habit_id = %reminder.id,
                    has_owner = reminder.owner_id.is_some(),
                    "No notification endpoint, skipping delivery"
                );
            }
        }

        let next = schedule::advance(reminder.next_reminder, periodicity);
        match db::habits::set_next_reminder(&self.pool, &reminder.id, next).await {
            Ok(_) => report.advanced += 1,
            Err(e) => {
                error!(habit_id = %reminder.id, "Failed to advance reminder: {}", e);
                report.failed += 1;
            }
        }
    }

    /// 제한 시간 안에 끝나지 않는 전송은 `NotifyError::Timeout`으로 처리합니다.
    async fn deliver(&self, chat_id: &str, text: &str) -> Result<(), NotifyError> {
        match tokio::time::timeout(self.config.notify_timeout, self.notifier.send(chat_id, text)).await {
            Ok(result) => result,
            Err(_) => Err(NotifyError::Timeout),
        }
    }

    /// 스위프 루프를 별도 태스크로 시작합니다.
    ///
    /// `shutdown`이 true가 되면 진행 중인 스위프를 마친 뒤 루프를 끝냅니다.
    pub fn spawn(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        info!("Starting reminder sweep (interval: {:?})", self.config.interval);

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(self.config.interval);
            // 스위프가 오래 걸려도 밀린 틱을 한꺼번에 실행하지 않습니다.
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = interval.tick() => {}
                    _ = shutdown.changed() => {
                        info!("Reminder sweep stopped");
                        break;
                    }
                }

                match self.run_once(schedule::local_now()).await {
                    Ok(report) if report.due > 0 || report.reseeded > 0 => {
                        info!(?report, "Reminder sweep finished")
                    }
                    Ok(_) => debug!("Reminder sweep: nothing due"),
                    Err(e) => error!("Reminder sweep failed: {}", e),
                }
            }
        })
    }
}
