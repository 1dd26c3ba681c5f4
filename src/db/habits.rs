//! # 습관 데이터베이스 쿼리 모듈
//!
//! `habits` 테이블에 대한 CRUD 쿼리와, 리마인더 스위프 작업용 조회/갱신 쿼리입니다.
//!
//! 모든 함수는 `async`이며 `SqlitePool`을 받아 데이터베이스와 상호작용합니다.
//! 에러 발생 시 `AppError`를 반환합니다.
//!
//! 검증은 이 계층에 오기 전에 끝나 있어야 합니다.
//! 여기서는 이미 검증된 `HabitFields`만 받아서 그대로 저장합니다.

use chrono::{NaiveDate, NaiveTime};
use sqlx::SqlitePool;

use crate::error::AppError;
use crate::models::{DueReminder, Habit, HabitFields};

/// 새 습관을 저장하고, 저장된 행을 다시 조회해 반환합니다.
///
/// # 매개변수
/// - `id`: 새 습관의 UUIDv7
/// - `owner_id`: 인증된 호출자의 ID (요청 본문에서 받지 않음)
/// - `fields`: 검증을 통과한 필드
/// - `next_reminder`: 저장 시점 기준으로 계산한 첫 리마인더 날짜
pub async fn create_habit(
    pool: &SqlitePool,
    id: &str,
    owner_id: &str,
    fields: &HabitFields,
    next_reminder: NaiveDate,
) -> Result<Habit, AppError> {
    sqlx::query(
        r#"
        INSERT INTO habits (id, owner_id, action, place, time, is_pleasant_habit, periodicity,
                            reward, time_to_complete, is_publicity, next_reminder, associated_habit_id)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(id)
    .bind(owner_id)
    .bind(&fields.action)
    .bind(&fields.place) // Option<String>: None이면 SQL NULL
    .bind(fields.time)
    .bind(fields.is_pleasant_habit)
    .bind(fields.periodicity.as_str())
    .bind(&fields.reward)
    .bind(fields.time_to_complete)
    .bind(fields.is_publicity)
    .bind(next_reminder)
    .bind(&fields.associated_habit_id)
    .execute(pool)
    .await?;

    get_habit(pool, id)
        .await?
        .ok_or(AppError::Internal("Failed to retrieve created habit".to_string()))
}

/// ID로 습관 하나를 조회합니다.
///
/// # 반환값
/// - `Ok(Some(Habit))`: 찾은 경우
/// - `Ok(None)`: 해당 ID의 습관이 없는 경우
pub async fn get_habit(pool: &SqlitePool, id: &str) -> Result<Option<Habit>, AppError> {
    let habit = sqlx::query_as::<_, Habit>(
        r#"
        SELECT id, owner_id, action, place, time, is_pleasant_habit, periodicity, reward,
               time_to_complete, is_publicity, next_reminder, associated_habit_id,
               created_at, updated_at
        FROM habits
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(habit)
}

/// 연결 대상 습관이 즐거운 습관인지 조회합니다.
///
/// 검증 규칙(연결 대상은 즐거운 습관)에 필요한 값만 가져옵니다.
/// 습관이 없으면 `None`입니다.
pub async fn is_pleasant(pool: &SqlitePool, id: &str) -> Result<Option<bool>, AppError> {
    let row = sqlx::query_as::<_, (bool,)>("SELECT is_pleasant_habit FROM habits WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    // .map(|(flag,)| flag): 한 칸짜리 튜플에서 값을 꺼냅니다.
    Ok(row.map(|(flag,)| flag))
}

/// 이 습관을 연결 습관으로 가리키는 다른 습관 수
pub async fn count_linked_to(pool: &SqlitePool, id: &str) -> Result<i64, AppError> {
    let (count,) = sqlx::query_as::<_, (i64,)>(
        "SELECT COUNT(*) FROM habits WHERE associated_habit_id = ? AND id != ?",
    )
    .bind(id)
    .bind(id)
    .fetch_one(pool)
    .await?;
    Ok(count)
}

/// 습관 전체를 새 필드로 덮어씁니다 (PUT과 PATCH 모두 병합 후 이 함수를 사용).
///
/// 소유자와 ID는 바뀌지 않습니다. `next_reminder`는 저장할 때마다 다시 계산된 값입니다.
///
/// # 반환값
/// - `Ok(Some(Habit))`: 수정 성공
/// - `Ok(None)`: 해당 ID의 습관이 없음
pub async fn update_habit(
    pool: &SqlitePool,
    id: &str,
    fields: &HabitFields,
    next_reminder: NaiveDate,
) -> Result<Option<Habit>, AppError> {
    let result = sqlx::query(
        r#"
        UPDATE habits
        SET action = ?, place = ?, time = ?, is_pleasant_habit = ?, periodicity = ?,
            reward = ?, time_to_complete = ?, is_publicity = ?, next_reminder = ?,
            associated_habit_id = ?,
            updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
        WHERE id = ?
        "#,
    )
    .bind(&fields.action)
    .bind(&fields.place)
    .bind(fields.time)
    .bind(fields.is_pleasant_habit)
    .bind(fields.periodicity.as_str())
    .bind(&fields.reward)
    .bind(fields.time_to_complete)
    .bind(fields.is_publicity)
    .bind(next_reminder)
    .bind(&fields.associated_habit_id)
    .bind(id)
    .execute(pool)
    .await?;

    // 0행이 바뀌었다면 그 사이에 삭제된 것입니다.
    if result.rows_affected() == 0 {
        return Ok(None);
    }

    get_habit(pool, id).await
}

/// 습관을 삭제합니다.
///
/// 이 습관을 연결 습관으로 가리키던 다른 습관들은 삭제하지 않고 참조만 NULL로 지웁니다.
/// 두 작업은 하나의 트랜잭션으로 묶여 있어, 중간에 실패하면 아무것도 바뀌지 않습니다.
///
/// # 반환값
/// - `Ok(true)`: 삭제 성공
/// - `Ok(false)`: 해당 ID의 습관이 없음
pub async fn delete_habit(pool: &SqlitePool, id: &str) -> Result<bool, AppError> {
    // pool.begin(): 트랜잭션 시작. commit() 없이 drop되면 자동으로 롤백됩니다.
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        UPDATE habits
        SET associated_habit_id = NULL,
            updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
        WHERE associated_habit_id = ?
        "#,
    )
    .bind(id)
    .execute(&mut *tx)
    .await?;

    let result = sqlx::query("DELETE FROM habits WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(result.rows_affected() > 0)
}

/// 공개 습관 수
pub async fn count_public(pool: &SqlitePool) -> Result<i64, AppError> {
    let (count,) = sqlx::query_as::<_, (i64,)>("SELECT COUNT(*) FROM habits WHERE is_publicity = 1")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// 공개 습관 한 페이지 (생성 순서대로)
///
/// ID가 UUIDv7이므로 `ORDER BY id`가 곧 생성 순서입니다.
pub async fn list_public(pool: &SqlitePool, limit: i64, offset: i64) -> Result<Vec<Habit>, AppError> {
    let habits = sqlx::query_as::<_, Habit>(
        r#"
        SELECT id, owner_id, action, place, time, is_pleasant_habit, periodicity, reward,
               time_to_complete, is_publicity, next_reminder, associated_habit_id,
               created_at, updated_at
        FROM habits
        WHERE is_publicity = 1
        ORDER BY id
        LIMIT ? OFFSET ?
        "#,
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok(habits)
}

/// 특정 사용자가 소유한 습관 수
pub async fn count_by_owner(pool: &SqlitePool, owner_id: &str) -> Result<i64, AppError> {
    let (count,) = sqlx::query_as::<_, (i64,)>("SELECT COUNT(*) FROM habits WHERE owner_id = ?")
        .bind(owner_id)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// 특정 사용자가 소유한 습관 한 페이지
pub async fn list_by_owner(
    pool: &SqlitePool,
    owner_id: &str,
    limit: i64,
    offset: i64,
) -> Result<Vec<Habit>, AppError> {
    let habits = sqlx::query_as::<_, Habit>(
        r#"
        SELECT id, owner_id, action, place, time, is_pleasant_habit, periodicity, reward,
               time_to_complete, is_publicity, next_reminder, associated_habit_id,
               created_at, updated_at
        FROM habits
        WHERE owner_id = ?
        ORDER BY id
        LIMIT ? OFFSET ?
        "#,
    )
    .bind(owner_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok(habits)
}

// ── 리마인더 스위프용 쿼리 ──

/// 오늘 알림을 보내야 하는 습관을 소유자의 chat id와 함께 조회합니다.
///
/// 조건: `next_reminder == today` 이고 `time <= now`
/// 시각은 "HH:MM:SS" 텍스트로 저장되므로 문자열 비교가 곧 시각 비교입니다.
/// 소유자가 없는 습관도 LEFT JOIN으로 함께 가져옵니다 (알림 없이 날짜만 넘김).
pub async fn list_due(
    pool: &SqlitePool,
    today: NaiveDate,
    now: NaiveTime,
) -> Result<Vec<DueReminder>, AppError> {
    let due = sqlx::query_as::<_, DueReminder>(
        r#"
        SELECT h.id, h.action, h.periodicity, h.next_reminder, h.owner_id, u.tg_chat_id
        FROM habits h
        LEFT JOIN users u ON u.id = h.owner_id
        WHERE h.next_reminder = ? AND h.time <= ?
        "#,
    )
    .bind(today)
    .bind(now)
    .fetch_all(pool)
    .await?;

    Ok(due)
}

/// 지나간 리마인더 날짜를 저장 규칙대로 다시 정합니다. 알림은 보내지 않습니다.
///
/// `list_due`는 날짜가 정확히 오늘인 습관만 보기 때문에, 서버가 자정을 넘겨 멈춰
/// 있었거나 23:59 습관의 틱이 자정 뒤에 왔다면 그 습관은 다시는 조회되지 않습니다.
/// 스위프가 매번 먼저 이 함수를 불러 그런 습관을 오늘 또는 내일로 되돌립니다.
///
/// 규칙: 수행 시각이 `now`보다 이르면 내일, 아니면 오늘 (`schedule::next_reminder_date`와 같음)
///
/// # 반환값
/// 다시 정한 습관 수
pub async fn reseed_stale(
    pool: &SqlitePool,
    today: NaiveDate,
    tomorrow: NaiveDate,
    now: NaiveTime,
) -> Result<u64, AppError> {
    let result = sqlx::query(
        r#"
        UPDATE habits
        SET next_reminder = CASE WHEN time < ? THEN ? ELSE ? END
        WHERE next_reminder IS NULL OR next_reminder < ?
        "#,
    )
    .bind(now)
    .bind(tomorrow)
    .bind(today)
    .bind(today)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

/// 다음 리마인더 날짜만 갱신합니다.
///
/// 스위프 작업 전용입니다. 일반 저장과 달리 날짜를 다시 계산하지 않고,
/// 넘겨받은 값을 그대로 기록합니다. `updated_at`도 건드리지 않습니다.
pub async fn set_next_reminder(
    pool: &SqlitePool,
    id: &str,
    next_reminder: NaiveDate,
) -> Result<bool, AppError> {
    let result = sqlx::query("UPDATE habits SET next_reminder = ? WHERE id = ?")
        .bind(next_reminder)
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
