//! # 습관(Habit) 모델 정의
//!
//! - `Habit`: DB의 `habits` 테이블 한 행이자 API 응답 본문
//! - `Periodicity`: 리마인더 반복 주기 ("every 1 day" / "every 7 days")
//! - `HabitDraft`: 검증 전의 후보 습관. 생성/전체수정 요청 본문이기도 합니다.
//! - `UpdateHabitRequest`: 부분 수정(PATCH) 요청 본문
//! - `HabitFields`: 검증을 통과해 바로 저장할 수 있는 필드 묶음
//!
//! 요청 본문의 필드는 모두 느슨한 타입(문자열, i64)으로 받습니다.
//! 잘못된 시각이나 주기 문자열도 JSON 파싱 단계가 아닌 검증 단계에서
//! 필드별 에러 메시지로 돌려주기 위해서입니다.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// 리마인더 반복 주기
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Periodicity {
    #[default]
    #[serde(rename = "every 1 day")]
    Daily,
    #[serde(rename = "every 7 days")]
    Weekly,
}

impl Periodicity {
    /// DB와 API에서 사용하는 문자열 표현
    pub const fn as_str(self) -> &'static str {
        match self {
            Periodicity::Daily => "every 1 day",
            Periodicity::Weekly => "every 7 days",
        }
    }

    /// 리마인더 한 번이 끝난 뒤 다음 리마인더까지의 일 수
    pub const fn days(self) -> u64 {
        match self {
            Periodicity::Daily => 1,
            Periodicity::Weekly => 7,
        }
    }
}

impl fmt::Display for Periodicity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 알 수 없는 주기 문자열
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown periodicity: {0:?}")]
pub struct UnknownPeriodicity(pub String);

impl FromStr for Periodicity {
    type Err = UnknownPeriodicity;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "every 1 day" => Ok(Periodicity::Daily),
            "every 7 days" => Ok(Periodicity::Weekly),
            other => Err(UnknownPeriodicity(other.to_string())),
        }
    }
}

// `#[sqlx(try_from = "String")]` 가 DB의 TEXT 값을 Periodicity 로 바꿀 때 사용합니다.
// 저장소에 알 수 없는 값이 들어 있으면 행 디코딩 에러가 됩니다.
impl TryFrom<String> for Periodicity {
    type Error = UnknownPeriodicity;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// 습관 엔티티 — DB의 `habits` 테이블 한 행에 대응합니다.
///
/// `owner_id`, `associated_habit_id`는 다른 행을 가리키는 약한 참조(ID)입니다.
/// 가리키는 대상이 삭제되면 NULL이 되고, 이 습관 자체는 그대로 남습니다.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Habit {
    pub id: String,
    /// 습관을 만든 사용자. 사용자가 탈퇴하면 None (주인 없는 습관)
    pub owner_id: Option<String>,
    pub action: String,
    pub place: Option<String>,
    /// 수행 시각 (JSON: "HH:MM:SS")
    pub time: NaiveTime,
    pub is_pleasant_habit: bool,
    #[sqlx(try_from = "String")]
    pub periodicity: Periodicity,
    pub reward: Option<String>,
    /// 수행 소요 시간 (분)
    pub time_to_complete: i64,
    pub is_publicity: bool,
    /// 다음 리마인더 날짜. 저장할 때마다 서버가 다시 계산합니다.
    pub next_reminder: Option<NaiveDate>,
    /// 보상 대신 수행할 "즐거운 습관"의 ID
    pub associated_habit_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// 검증 전의 후보 습관
///
/// `POST /habits`, `PUT /habits/{id}`의 요청 본문이며,
/// `PATCH`에서는 기존 습관을 이 형태로 바꾼 뒤 변경 사항을 덮어씁니다.
/// 모든 필드가 선택 사항이고, 필수 여부는 검증 단계에서 판단합니다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HabitDraft {
    pub action: Option<String>,
    pub place: Option<String>,
    /// "HH:MM:SS" 또는 "HH:MM"
    pub time: Option<String>,
    pub is_pleasant_habit: bool,
    pub periodicity: Option<String>,
    pub reward: Option<String>,
    pub time_to_complete: Option<i64>,
    pub is_publicity: bool,
    /// 연결할 즐거운 습관의 ID
    pub associated_habit: Option<String>,
}

impl HabitDraft {
    /// 공백뿐인 선택 필드를 "미설정"으로 정리합니다.
    /// 빈 보상 문자열이 "보상 있음"으로 취급되지 않도록 검증 전에 호출합니다.
    pub fn normalized(mut self) -> Self {
        self.place = non_blank(self.place);
        self.reward = non_blank(self.reward);
        self.associated_habit = non_blank(self.associated_habit);
        self
    }

    /// 부분 수정 요청을 현재 후보 위에 덮어씁니다.
    ///
    /// 요청에 없는 필드는 그대로 두고, `null`로 온 선택 필드는 지웁니다.
    pub fn merge(mut self, patch: UpdateHabitRequest) -> Self {
        if let Some(action) = patch.action {
            self.action = Some(action);
        }
        if let Some(place) = patch.place {
            self.place = place;
        }
        if let Some(time) = patch.time {
            self.time = Some(time);
        }
        if let Some(is_pleasant_habit) = patch.is_pleasant_habit {
            self.is_pleasant_habit = is_pleasant_habit;
        }
        if let Some(periodicity) = patch.periodicity {
            self.periodicity = Some(periodicity);
        }
        if let Some(reward) = patch.reward {
            self.reward = reward;
        }
        if let Some(time_to_complete) = patch.time_to_complete {
            self.time_to_complete = Some(time_to_complete);
        }
        if let Some(is_publicity) = patch.is_publicity {
            self.is_publicity = is_publicity;
        }
        if let Some(associated_habit) = patch.associated_habit {
            self.associated_habit = associated_habit;
        }
        self
    }
}

impl From<&Habit> for HabitDraft {
    fn from(habit: &Habit) -> Self {
        Self {
            action: Some(habit.action.clone()),
            place: habit.place.clone(),
            time: Some(habit.time.format("%H:%M:%S").to_string()),
            is_pleasant_habit: habit.is_pleasant_habit,
            periodicity: Some(habit.periodicity.as_str().to_string()),
            reward: habit.reward.clone(),
            time_to_complete: Some(habit.time_to_complete),
            is_publicity: habit.is_publicity,
            associated_habit: habit.associated_habit_id.clone(),
        }
    }
}

/// `PATCH /habits/{id}` 요청 본문
///
/// 선택 필드는 `Option<Option<T>>`로 세 가지 상태를 구분합니다:
/// None = 필드 누락 (변경 안 함), Some(None) = null (값 지우기), Some(Some(v)) = 새 값
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateHabitRequest {
    pub action: Option<String>,
    #[serde(default, deserialize_with = "super::present")]
    pub place: Option<Option<String>>,
    pub time: Option<String>,
    pub is_pleasant_habit: Option<bool>,
    pub periodicity: Option<String>,
    #[serde(default, deserialize_with = "super::present")]
    pub reward: Option<Option<String>>,
    pub time_to_complete: Option<i64>,
    pub is_publicity: Option<bool>,
    #[serde(default, deserialize_with = "super::present")]
    pub associated_habit: Option<Option<String>>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// 검증을 통과한 습관 필드 — 그대로 INSERT/UPDATE에 바인딩됩니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HabitFields {
    pub action: String,
    pub place: Option<String>,
    pub time: NaiveTime,
    pub is_pleasant_habit: bool,
    pub periodicity: Periodicity,
    pub reward: Option<String>,
    pub time_to_complete: i64,
    pub is_publicity: bool,
    pub associated_habit_id: Option<String>,
}

/// 스위프 작업이 읽는 "오늘 알림이 필요한 습관" 한 건
///
/// 소유자의 Telegram chat id를 함께 조회합니다.
/// 소유자가 없거나 chat id를 등록하지 않았으면 `tg_chat_id`는 None입니다.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DueReminder {
    pub id: String,
    pub action: String,
    pub periodicity: String,
    pub next_reminder: NaiveDate,
    pub owner_id: Option<String>,
    pub tg_chat_id: Option<String>,
}
