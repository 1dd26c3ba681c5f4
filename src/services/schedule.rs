//! # 리마인더 날짜 계산
//!
//! - `next_reminder_date()`: 습관을 저장할 때마다 다음 리마인더 날짜를 새로 정합니다.
//! - `advance()`: 스위프 작업이 리마인더를 보낸 뒤 주기만큼 날짜를 넘깁니다.
//!
//! 두 함수 모두 날짜(일) 단위로 계산합니다.
//! "매일"은 +1일, "매주"는 +7일입니다.

use chrono::{Days, Local, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::models::Periodicity;

/// 서버 로컬 시각 (초 단위로 자름)
///
/// 습관의 `time`은 사용자가 입력한 벽시계 시각이므로 UTC가 아닌 로컬 시각과 비교합니다.
pub fn local_now() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}

/// 저장 시점 기준의 첫 리마인더 날짜
///
/// 오늘의 수행 시각이 이미 지났으면 내일, 아직이면 오늘입니다.
/// 수행 시각과 현재 시각이 정확히 같으면 오늘로 봅니다.
pub fn next_reminder_date(now: NaiveDateTime, habit_time: NaiveTime) -> NaiveDate {
    let today = now.date();
    if now.time() > habit_time {
        tomorrow(today)
    } else {
        today
    }
}

/// 다음 날 (달력 끝에서는 그대로)
pub fn tomorrow(today: NaiveDate) -> NaiveDate {
    today.succ_opt().unwrap_or(today)
}

/// 리마인더를 보낸 뒤의 다음 날짜
pub fn advance(current: NaiveDate, periodicity: Periodicity) -> NaiveDate {
    current
        .checked_add_days(Days::new(periodicity.days()))
        .unwrap_or(NaiveDate::MAX)
}
