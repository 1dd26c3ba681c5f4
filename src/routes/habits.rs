//! # 습관(Habit) 라우트 핸들러
//!
//! 습관의 생성/조회/수정/삭제와 목록 조회를 처리하는 HTTP 핸들러 함수들입니다.
//!
//! ## 엔드포인트
//! | 메서드 | 경로 | 인증 | 설명 |
//! |--------|------|------|------|
//! | POST   | /api/v1/habits        | 필수 | 새 습관 생성 (소유자 = 호출자) |
//! | GET    | /api/v1/habits/public | 없음 | 공개 습관 목록 (페이지) |
//! | GET    | /api/v1/habits/mine   | 필수 | 내 습관 목록 (페이지) |
//! | GET    | /api/v1/habits/{id}   | 선택 | 공개 습관이거나 내 습관이면 조회 |
//! | PUT    | /api/v1/habits/{id}   | 소유자 | 전체 수정 |
//! | PATCH  | /api/v1/habits/{id}   | 소유자 | 부분 수정 (기존 값 위에 병합) |
//! | DELETE | /api/v1/habits/{id}   | 소유자 | 삭제 |
//!
//! ## 쓰기 요청의 흐름
//! 인증 → (수정이면) 기존 습관 조회와 권한 확인 → 후보 병합 → 검증 → 저장
//! 저장할 때마다 `next_reminder`를 현재 시각 기준으로 다시 계산합니다.
//! 검증이 실패하면 아무것도 저장되지 않습니다.

use axum::{
    extract::{OriginalUri, Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    db,
    error::{AppError, FieldError},
    middleware::{auth::AuthUser, json::AppJson},
    models::*,
    routes::AppState,
    services::{
        access,
        schedule,
        validation::{self, LinkTarget},
    },
};

/// `POST /habits` — 새 습관을 생성합니다.
///
/// 소유자는 요청 본문이 아니라 인증된 호출자로 정해집니다.
/// 성공 시 HTTP 201 Created와 생성된 습관을 반환합니다.
pub async fn create_habit(
    State(state): State<AppState>,
    auth_user: AuthUser,
    AppJson(draft): AppJson<HabitDraft>,
) -> Result<(StatusCode, Json<Habit>), AppError> {
    let draft = draft.normalized();
    let fields = check_draft(&state, &draft, None).await?;

    let id = uuid::Uuid::now_v7().to_string();
    let next_reminder = schedule::next_reminder_date(schedule::local_now(), fields.time);

    let habit =
        db::habits::create_habit(&state.pool, &id, &auth_user.user_id, &fields, next_reminder)
            .await?;
    tracing::info!(habit_id = %habit.id, owner = %auth_user.user_id, "Habit created");

    Ok((StatusCode::CREATED, Json(habit)))
}

/// `GET /habits/public?page=N` — 공개 습관 목록을 페이지 단위로 조회합니다.
///
/// 인증이 필요 없습니다. 페이지 크기는 설정(`PAGE_SIZE`)을 따릅니다.
pub async fn list_public_habits(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
    OriginalUri(uri): OriginalUri,
) -> Result<Json<Page<Habit>>, AppError> {
    let count = db::habits::count_public(&state.pool).await?;
    // 범위를 벗어난 페이지 번호는 404
    let window = PageWindow::new(params.page, state.page_size, count).ok_or(AppError::NotFound)?;

    let habits = db::habits::list_public(&state.pool, window.limit(), window.offset()).await?;
    Ok(Json(Page::new(window, uri.path(), habits)))
}

/// `GET /habits/mine?page=N` — 호출자가 소유한 습관 목록을 조회합니다.
pub async fn list_own_habits(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(params): Query<PageParams>,
    OriginalUri(uri): OriginalUri,
) -> Result<Json<Page<Habit>>, AppError> {
    let count = db::habits::count_by_owner(&state.pool, &auth_user.user_id).await?;
    let window = PageWindow::new(params.page, state.page_size, count).ok_or(AppError::NotFound)?;

    let habits = db::habits::list_by_owner(
        &state.pool,
        &auth_user.user_id,
        window.limit(),
        window.offset(),
    )
    .await?;
    Ok(Json(Page::new(window, uri.path(), habits)))
}

/// `GET /habits/{id}` — 습관 하나를 조회합니다.
///
/// # Extractor
/// - `Option<AuthUser>`: Authorization 헤더가 없으면 None (익명 호출자)
///
/// 공개 습관은 누구나, 비공개 습관은 소유자만 볼 수 있습니다.
/// 익명 호출자가 비공개 습관을 요청하면 401, 다른 사용자는 403입니다.
pub async fn get_habit(
    State(state): State<AppState>,
    auth_user: Option<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<Habit>, AppError> {
    let habit = db::habits::get_habit(&state.pool, &id)
        .await?
        .ok_or(AppError::NotFound)?;

    // .as_ref().map(...): Option<AuthUser> → Option<&str>
    access::ensure_readable(&habit, auth_user.as_ref().map(|u| u.user_id.as_str()))?;
    Ok(Json(habit))
}

/// `PUT /habits/{id}` — 습관 전체를 새 값으로 바꿉니다.
///
/// 요청 본문은 생성 요청과 같은 형태이며, 빠진 선택 필드는 지워집니다.
pub async fn replace_habit(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
    AppJson(draft): AppJson<HabitDraft>,
) -> Result<Json<Habit>, AppError> {
    let existing = load_owned(&state, &auth_user, &id).await?;
    save_candidate(&state, &existing, draft.normalized()).await
}

/// `PATCH /habits/{id}` — 요청에 포함된 필드만 바꿉니다.
///
/// 기존 습관을 후보로 바꾼 뒤 변경 사항을 덮어쓰고, 병합된 결과 전체를 검증합니다.
/// 예: `{ "time": "00:13:00" }`으로 시각만 변경 가능
pub async fn update_habit(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
    AppJson(patch): AppJson<UpdateHabitRequest>,
) -> Result<Json<Habit>, AppError> {
    let existing = load_owned(&state, &auth_user, &id).await?;
    let draft = HabitDraft::from(&existing).merge(patch).normalized();
    save_candidate(&state, &existing, draft).await
}

/// `DELETE /habits/{id}` — 습관을 삭제합니다.
///
/// 이 습관을 연결 습관으로 쓰던 다른 습관들은 남고, 연결만 해제됩니다.
/// 성공 시 HTTP 204 No Content를 반환합니다.
pub async fn delete_habit(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    load_owned(&state, &auth_user, &id).await?;

    let deleted = db::habits::delete_habit(&state.pool, &id).await?;
    if !deleted {
        return Err(AppError::NotFound);
    }
    tracing::info!(habit_id = %id, owner = %auth_user.user_id, "Habit deleted");

    Ok(StatusCode::NO_CONTENT)
}

// ── 내부 헬퍼 ──

/// 습관을 조회하고 호출자가 수정할 수 있는지 확인합니다. (없으면 404, 남의 것이면 403)
async fn load_owned(state: &AppState, auth_user: &AuthUser, id: &str) -> Result<Habit, AppError> {
    let habit = db::habits::get_habit(&state.pool, id)
        .await?
        .ok_or(AppError::NotFound)?;

    access::ensure_mutable(&habit, Some(&auth_user.user_id))?;
    Ok(habit)
}

/// 수정 요청 공통 처리: 검증 → next_reminder 재계산 → 저장
async fn save_candidate(
    state: &AppState,
    existing: &Habit,
    draft: HabitDraft,
) -> Result<Json<Habit>, AppError> {
    let mut fields = check_draft(state, &draft, Some(&existing.id)).await;

    // 다른 습관이 이 습관을 연결 습관으로 쓰고 있다면, 즐거운 습관 표시를 끌 수 없습니다.
    if existing.is_pleasant_habit && !draft.is_pleasant_habit {
        let dependents = db::habits::count_linked_to(&state.pool, &existing.id).await?;
        if let Some(error) = validation::check_still_pleasant(dependents) {
            fields = match fields {
                Ok(_) => Err(AppError::Validation(vec![error])),
                Err(AppError::Validation(mut errors)) => {
                    errors.push(error);
                    Err(AppError::Validation(errors))
                }
                Err(other) => Err(other),
            };
        }
    }
    let fields = fields?;

    let next_reminder = schedule::next_reminder_date(schedule::local_now(), fields.time);
    let habit = db::habits::update_habit(&state.pool, &existing.id, &fields, next_reminder)
        .await?
        .ok_or(AppError::NotFound)?;
    tracing::debug!(habit_id = %habit.id, "Habit updated");

    Ok(Json(habit))
}

/// 연결 습관 정보를 조회해 검증 규칙을 실행합니다.
///
/// `self_id`: 수정 중인 습관의 ID. 자기 자신을 연결한 경우 저장된 값이 아니라
/// 병합된 후보의 `is_pleasant_habit`으로 판단합니다.
async fn check_draft(
    state: &AppState,
    draft: &HabitDraft,
    self_id: Option<&str>,
) -> Result<HabitFields, AppError> {
    let link = match draft.associated_habit.as_deref() {
        Some(link_id) if Some(link_id) == self_id => {
            Some(LinkTarget::from_lookup(Some(draft.is_pleasant_habit)))
        }
        Some(link_id) => Some(LinkTarget::from_lookup(
            db::habits::is_pleasant(&state.pool, link_id).await?,
        )),
        None => None,
    };

    validation::validate(draft, link).map_err(|errors: Vec<FieldError>| {
        tracing::debug!(?errors, "Habit rejected by validation");
        AppError::Validation(errors)
    })
}
