//! # 습관 검증 규칙
//!
//! 저장 직전에 후보 습관(`HabitDraft`)의 필드 조합을 검사하는 순수 함수들입니다.
//! DB에 접근하지 않으며, 연결된 습관의 정보(`LinkTarget`)는 호출하는 쪽에서 조회해 넘겨줍니다.
//!
//! 규칙:
//! - 즐거운 습관 배타성: 즐거운 습관은 보상도, 연결 습관도 가질 수 없다
//! - 보상 XOR 연결: 유용한 습관은 보상과 연결 습관 중 정확히 하나를 가진다
//! - 연결 대상: 연결 습관은 반드시 즐거운 습관이어야 한다
//! - 소요 시간: 1분 이상 120분 이하
//!
//! 모든 규칙을 끝까지 평가하고, 실패한 항목을 한꺼번에 돌려줍니다.
//! 첫 두 규칙은 `is_pleasant_habit` 값에 따라 둘 중 하나만 적용됩니다.

use chrono::NaiveTime;

use crate::error::FieldError;
use crate::models::{HabitDraft, HabitFields, Periodicity};

pub const PLEASANT_EXCLUSIVE: &str = "a pleasant habit must not carry a reward or a linked habit";
pub const REWARD_AND_LINK: &str = "specify either a reward or a pleasant habit, not both";
pub const REWARD_OR_LINK_MISSING: &str = "specify either a reward or a pleasant habit";
pub const LINK_NOT_PLEASANT: &str = "linked habit must be a pleasant habit";
pub const LINK_MISSING: &str = "linked habit does not exist";
pub const STILL_LINKED: &str = "habit is linked as a pleasant habit by other habits";
pub const DURATION_OUT_OF_RANGE: &str = "completion time must be between 1 and 120 minutes";

pub const MIN_TIME_TO_COMPLETE: i64 = 1;
pub const MAX_TIME_TO_COMPLETE: i64 = 120;

const ACTION_MAX_LEN: usize = 150;
const PLACE_MAX_LEN: usize = 100;
const REWARD_MAX_LEN: usize = 100;

/// 교차 필드 규칙이 보고하는 필드 이름
const NON_FIELD: &str = "non_field_errors";

/// 후보가 가리키는 연결 습관의 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkTarget {
    /// 존재하고 즐거운 습관임
    Pleasant,
    /// 존재하지만 즐거운 습관이 아님
    NotPleasant,
    /// 해당 ID의 습관이 없음
    Missing,
}

impl LinkTarget {
    /// DB 조회 결과(`Some(is_pleasant)` / `None`)를 LinkTarget으로 바꿉니다.
    pub fn from_lookup(is_pleasant: Option<bool>) -> Self {
        match is_pleasant {
            Some(true) => LinkTarget::Pleasant,
            Some(false) => LinkTarget::NotPleasant,
            None => LinkTarget::Missing,
        }
    }
}

/// 즐거운 습관에는 보상도 연결 습관도 없어야 합니다.
pub fn check_pleasant_exclusivity(
    is_pleasant: bool,
    has_reward: bool,
    has_link: bool,
) -> Option<FieldError> {
    (is_pleasant && (has_reward || has_link)).then(|| FieldError::new(NON_FIELD, PLEASANT_EXCLUSIVE))
}

/// 유용한(즐겁지 않은) 습관은 보상과 연결 습관 중 정확히 하나를 가져야 합니다.
/// 둘 다 있는 경우와 둘 다 없는 경우는 서로 다른 메시지로 구분합니다.
pub fn check_reward_xor_link(
    is_pleasant: bool,
    has_reward: bool,
    has_link: bool,
) -> Option<FieldError> {
    if is_pleasant {
        return None;
    }
    match (has_reward, has_link) {
        (true, true) => Some(FieldError::new(NON_FIELD, REWARD_AND_LINK)),
        (false, false) => Some(FieldError::new(NON_FIELD, REWARD_OR_LINK_MISSING)),
        _ => None,
    }
}

/// 연결 습관이 지정되었다면, 후보 자신이 즐거운 습관인지와 상관없이 검사합니다.
pub fn check_link_target(link: Option<LinkTarget>) -> Option<FieldError> {
    match link {
        Some(LinkTarget::NotPleasant) => Some(FieldError::new("associated_habit", LINK_NOT_PLEASANT)),
        Some(LinkTarget::Missing) => Some(FieldError::new("associated_habit", LINK_MISSING)),
        Some(LinkTarget::Pleasant) | None => None,
    }
}

/// 소요 시간은 [1, 120]분 (양 끝 포함)
pub fn check_time_to_complete(minutes: i64) -> Option<FieldError> {
    (!(MIN_TIME_TO_COMPLETE..=MAX_TIME_TO_COMPLETE).contains(&minutes))
        .then(|| FieldError::new("time_to_complete", DURATION_OUT_OF_RANGE))
}

/// 다른 습관이 연결 습관으로 쓰고 있는 습관은 즐거운 습관 표시를 끌 수 없습니다.
/// `dependents`: 이 습관을 가리키는 습관 수
pub fn check_still_pleasant(dependents: i64) -> Option<FieldError> {
    (dependents > 0).then(|| FieldError::new("is_pleasant_habit", STILL_LINKED))
}

/// "HH:MM:SS" 또는 "HH:MM" 형식의 시각을 파싱합니다.
pub fn parse_time(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M:%S%.f")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .ok()
}

/// 후보 습관 전체를 검증합니다.
///
/// `link`는 `draft.associated_habit`이 있을 때만 Some이어야 합니다.
/// 성공하면 저장 가능한 `HabitFields`를, 실패하면 모든 위반 항목을 반환합니다.
pub fn validate(draft: &HabitDraft, link: Option<LinkTarget>) -> Result<HabitFields, Vec<FieldError>> {
    let mut errors = Vec::new();

    let action = match draft.action.as_deref().map(str::trim) {
        None | Some("") => {
            errors.push(FieldError::new("action", "this field is required"));
            None
        }
        Some(action) if action.chars().count() > ACTION_MAX_LEN => {
            errors.push(FieldError::new("action", "must be at most 150 characters"));
            None
        }
        Some(action) => Some(action.to_string()),
    };

    if draft.place.as_deref().is_some_and(|p| p.chars().count() > PLACE_MAX_LEN) {
        errors.push(FieldError::new("place", "must be at most 100 characters"));
    }
    if draft.reward.as_deref().is_some_and(|r| r.chars().count() > REWARD_MAX_LEN) {
        errors.push(FieldError::new("reward", "must be at most 100 characters"));
    }

    let time = match draft.time.as_deref() {
        None => {
            errors.push(FieldError::new("time", "this field is required"));
            None
        }
        Some(raw) => {
            let parsed = parse_time(raw);
            if parsed.is_none() {
                errors.push(FieldError::new("time", "expected a time of day as HH:MM[:SS]"));
            }
            parsed
        }
    };

    let periodicity = match draft.periodicity.as_deref() {
        None => Some(Periodicity::default()),
        Some(raw) => match raw.parse::<Periodicity>() {
            Ok(periodicity) => Some(periodicity),
            Err(_) => {
                errors.push(FieldError::new(
                    "periodicity",
                    "expected \"every 1 day\" or \"every 7 days\"",
                ));
                None
            }
        },
    };

    let time_to_complete = match draft.time_to_complete {
        None => {
            errors.push(FieldError::new("time_to_complete", "this field is required"));
            None
        }
        Some(minutes) => {
            if let Some(error) = check_time_to_complete(minutes) {
                errors.push(error);
            }
            Some(minutes)
        }
    };

    let has_reward = draft.reward.is_some();
    let has_link = draft.associated_habit.is_some();
    errors.extend(check_pleasant_exclusivity(draft.is_pleasant_habit, has_reward, has_link));
    errors.extend(check_reward_xor_link(draft.is_pleasant_habit, has_reward, has_link));
    errors.extend(check_link_target(link));

    match (action, time, periodicity, time_to_complete) {
        (Some(action), Some(time), Some(periodicity), Some(time_to_complete)) if errors.is_empty() => {
            Ok(HabitFields {
                action,
                place: draft.place.clone(),
                time,
                is_pleasant_habit: draft.is_pleasant_habit,
                periodicity,
                reward: draft.reward.clone(),
                time_to_complete,
                is_publicity: draft.is_publicity,
                associated_habit_id: draft.associated_habit.clone(),
            })
        }
        _ => Err(errors),
    }
}
