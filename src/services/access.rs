//! # 접근 정책
//!
//! 습관을 읽거나 바꿀 수 있는지 판단하는 순수 함수들입니다.
//! - 읽기: 소유자이거나 공개 습관
//! - 수정/삭제: 소유자만
//!
//! 인증되지 않은 호출자(`None`)는 어떤 소유자와도 일치하지 않습니다.
//! 주인 없는 습관(소유자 탈퇴)은 아무도 수정할 수 없습니다.

use crate::error::AppError;
use crate::models::Habit;

fn is_owner(habit: &Habit, caller: Option<&str>) -> bool {
    match (habit.owner_id.as_deref(), caller) {
        (Some(owner), Some(caller)) => owner == caller,
        _ => false,
    }
}

pub fn can_read(habit: &Habit, caller: Option<&str>) -> bool {
    habit.is_publicity || is_owner(habit, caller)
}

pub fn can_mutate(habit: &Habit, caller: Option<&str>) -> bool {
    is_owner(habit, caller)
}

/// 거부 사유를 HTTP 에러로 바꿉니다: 호출자가 없으면 401, 있으면 403
fn deny(caller: Option<&str>) -> AppError {
    match caller {
        None => AppError::Unauthorized("Authentication required".to_string()),
        Some(_) => AppError::Forbidden("You do not have access to this habit".to_string()),
    }
}

pub fn ensure_readable(habit: &Habit, caller: Option<&str>) -> Result<(), AppError> {
    if can_read(habit, caller) {
        Ok(())
    } else {
        Err(deny(caller))
    }
}

pub fn ensure_mutable(habit: &Habit, caller: Option<&str>) -> Result<(), AppError> {
    if can_mutate(habit, caller) {
        Ok(())
    } else {
        Err(deny(caller))
    }
}
