mod common;

use common::*;
use axum::http::StatusCode;
use habitrack::services::validation::{
    DURATION_OUT_OF_RANGE, LINK_MISSING, LINK_NOT_PLEASANT, PLEASANT_EXCLUSIVE, REWARD_AND_LINK,
    REWARD_OR_LINK_MISSING, STILL_LINKED,
};
use serde_json::{json, Value};

fn useful_body(action: &str) -> Value {
    json!({
        "action": action,
        "place": "Park",
        "time": "08:30:00",
        "reward": "Chocolate",
        "time_to_complete": 20,
        "is_publicity": false
    })
}

fn pleasant_body(action: &str) -> Value {
    json!({
        "action": action,
        "time": "10:00",
        "is_pleasant_habit": true,
        "time_to_complete": 5
    })
}

async fn create(app: &TestApp, token: &str, body: Value) -> Value {
    let (status, habit) = app.post("/api/v1/habits", Some(token), body).await;
    assert_eq!(status, StatusCode::CREATED, "unexpected body: {}", habit);
    habit
}

#[tokio::test]
async fn public_list_contains_only_public_habits() {
    let app = TestApp::new().await;
    let (owner, _) = create_user(&app.pool, "owner", None).await;
    let today = date(2026, 3, 1);

    for (i, public) in [true, false, true, false, false].into_iter().enumerate() {
        insert_habit(&app.pool, &owner, &useful_fields(&format!("habit {}", i), public), today).await;
    }

    let (status, page) = app.get("/api/v1/habits/public", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["count"], 2);
    assert_eq!(page["next"], Value::Null);
    assert_eq!(page["previous"], Value::Null);
    let results = page["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|h| h["is_publicity"] == true));
}

#[tokio::test]
async fn public_list_is_paginated() {
    let app = TestApp::with_page_size(2).await;
    let (owner, _) = create_user(&app.pool, "owner", None).await;
    for i in 0..3 {
        insert_habit(&app.pool, &owner, &useful_fields(&format!("habit {}", i), true), date(2026, 3, 1))
            .await;
    }

    let (status, first) = app.get("/api/v1/habits/public", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["count"], 3);
    assert_eq!(first["results"].as_array().unwrap().len(), 2);
    assert_eq!(first["next"], "/api/v1/habits/public?page=2");
    assert_eq!(first["previous"], Value::Null);

    let (status, second) = app.get("/api/v1/habits/public?page=2", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["results"].as_array().unwrap().len(), 1);
    assert_eq!(second["next"], Value::Null);
    assert_eq!(second["previous"], "/api/v1/habits/public?page=1");

    let (status, _) = app.get("/api/v1/habits/public?page=3", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app.get("/api/v1/habits/public?page=0", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn own_list_requires_auth_and_filters_by_owner() {
    let app = TestApp::new().await;
    let (alice, alice_token) = create_user(&app.pool, "alice", None).await;
    let (bob, _) = create_user(&app.pool, "bob", None).await;
    insert_habit(&app.pool, &alice, &useful_fields("Read", false), date(2026, 3, 1)).await;
    insert_habit(&app.pool, &alice, &useful_fields("Run", true), date(2026, 3, 1)).await;
    insert_habit(&app.pool, &bob, &useful_fields("Swim", true), date(2026, 3, 1)).await;

    let (status, _) = app.get("/api/v1/habits/mine", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, page) = app.get("/api/v1/habits/mine", Some(&alice_token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["count"], 2);
    let results = page["results"].as_array().unwrap();
    assert!(results.iter().all(|h| h["owner_id"] == alice.as_str()));
}

#[tokio::test]
async fn retrieve_respects_visibility() {
    let app = TestApp::new().await;
    let (owner, owner_token) = create_user(&app.pool, "owner", None).await;
    let (_, other_token) = create_user(&app.pool, "other", None).await;
    let private = insert_habit(&app.pool, &owner, &useful_fields("Private", false), date(2026, 3, 1)).await;
    let public = insert_habit(&app.pool, &owner, &useful_fields("Public", true), date(2026, 3, 1)).await;

    let private_uri = format!("/api/v1/habits/{}", private.id);
    let public_uri = format!("/api/v1/habits/{}", public.id);

    let (status, body) = app.get(&private_uri, Some(&owner_token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["action"], "Private");

    let (status, _) = app.get(&private_uri, Some(&other_token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app.get(&private_uri, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app.get(&public_uri, Some(&other_token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["action"], "Public");
    let (status, _) = app.get(&public_uri, None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.get("/api/v1/habits/does-not-exist", Some(&owner_token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn create_sets_owner_from_caller_and_schedules_reminder() {
    let app = TestApp::new().await;
    let (user, token) = create_user(&app.pool, "user", None).await;

    let mut body = useful_body("Walk");
    body["owner_id"] = json!("someone-else");
    body["periodicity"] = json!("every 7 days");
    let habit = create(&app, &token, body).await;

    assert_eq!(habit["owner_id"], user.as_str());
    assert_eq!(habit["time"], "08:30:00");
    assert_eq!(habit["periodicity"], "every 7 days");
    assert!(habit["next_reminder"].is_string());

    let (status, _) = app.post("/api/v1/habits", None, useful_body("Walk")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn create_rejects_rule_violations() {
    let app = TestApp::new().await;
    let (_, token) = create_user(&app.pool, "user", None).await;
    let useful = create(&app, &token, useful_body("Walk")).await;
    let pleasant = create(&app, &token, pleasant_body("Dance")).await;

    let mut pleasant_with_reward = pleasant_body("Bath");
    pleasant_with_reward["reward"] = json!("Cake");

    let mut neither = useful_body("Stretch");
    neither["reward"] = Value::Null;

    let mut both = useful_body("Stretch");
    both["associated_habit"] = pleasant["id"].clone();

    let mut too_long = useful_body("Stretch");
    too_long["time_to_complete"] = json!(160);

    let mut negative = useful_body("Stretch");
    negative["time_to_complete"] = json!(-33);

    let mut linked_to_useful = useful_body("Stretch");
    linked_to_useful["reward"] = Value::Null;
    linked_to_useful["associated_habit"] = useful["id"].clone();

    let mut linked_to_missing = useful_body("Stretch");
    linked_to_missing["reward"] = Value::Null;
    linked_to_missing["associated_habit"] = json!("no-such-habit");

    let cases = [
        (pleasant_with_reward, PLEASANT_EXCLUSIVE),
        (neither, REWARD_OR_LINK_MISSING),
        (both, REWARD_AND_LINK),
        (too_long, DURATION_OUT_OF_RANGE),
        (negative, DURATION_OUT_OF_RANGE),
        (linked_to_useful, LINK_NOT_PLEASANT),
        (linked_to_missing, LINK_MISSING),
    ];

    for (body, expected) in cases {
        let (status, error) = app.post("/api/v1/habits", Some(&token), body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error["error"]["code"], "validation_error");
        assert!(
            field_messages(&error).iter().any(|m| m == expected),
            "expected {:?} in {}",
            expected,
            error
        );
    }

    // 검증 실패는 아무것도 저장하지 않습니다.
    let (_, page) = app.get("/api/v1/habits/mine", Some(&token)).await;
    assert_eq!(page["count"], 2);
}

#[tokio::test]
async fn create_accepts_link_to_pleasant_habit() {
    let app = TestApp::new().await;
    let (_, token) = create_user(&app.pool, "user", None).await;
    let pleasant = create(&app, &token, pleasant_body("Dance")).await;

    let mut body = useful_body("Stretch");
    body["reward"] = Value::Null;
    body["associated_habit"] = pleasant["id"].clone();
    let habit = create(&app, &token, body).await;

    assert_eq!(habit["associated_habit_id"], pleasant["id"]);
    assert_eq!(habit["reward"], Value::Null);
}

#[tokio::test]
async fn create_reports_malformed_fields() {
    let app = TestApp::new().await;
    let (_, token) = create_user(&app.pool, "user", None).await;

    let (status, error) = app
        .post(
            "/api/v1/habits",
            Some(&token),
            json!({ "time": "25:99", "periodicity": "every 3 days", "reward": "Tea" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let fields: Vec<&str> = error["error"]["fields"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|f| f["field"].as_str())
        .collect();
    for expected in ["action", "time", "periodicity", "time_to_complete"] {
        assert!(fields.contains(&expected), "missing {} in {:?}", expected, fields);
    }
}

#[tokio::test]
async fn patch_updates_only_given_fields() {
    let app = TestApp::new().await;
    let (owner, owner_token) = create_user(&app.pool, "owner", None).await;
    let (_, other_token) = create_user(&app.pool, "other", None).await;
    let habit = insert_habit(&app.pool, &owner, &useful_fields("Read", false), date(2026, 3, 1)).await;
    let uri = format!("/api/v1/habits/{}", habit.id);

    let (status, updated) = app.patch(&uri, Some(&owner_token), json!({ "time": "00:13:00" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["time"], "00:13:00");
    assert_eq!(updated["action"], "Read");
    assert_eq!(updated["reward"], "Coffee");
    // 저장할 때마다 리마인더 날짜를 다시 계산합니다.
    assert_ne!(updated["next_reminder"], "2026-03-01");

    let (status, _) = app.patch(&uri, Some(&other_token), json!({ "action": "Hijack" })).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app.patch(&uri, None, json!({ "action": "Hijack" })).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // 병합 결과가 규칙을 어기면 저장되지 않습니다.
    let (status, error) = app.patch(&uri, Some(&owner_token), json!({ "reward": null })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(field_messages(&error).iter().any(|m| m == REWARD_OR_LINK_MISSING));

    let (_, stored) = app.get(&uri, Some(&owner_token)).await;
    assert_eq!(stored["reward"], "Coffee");
    assert_eq!(stored["action"], "Read");
}

#[tokio::test]
async fn put_replaces_the_whole_habit() {
    let app = TestApp::new().await;
    let (owner, token) = create_user(&app.pool, "owner", None).await;
    let habit = insert_habit(&app.pool, &owner, &useful_fields("Read", false), date(2026, 3, 1)).await;
    let uri = format!("/api/v1/habits/{}", habit.id);

    let (status, replaced) = app
        .put(
            &uri,
            Some(&token),
            json!({ "action": "Write", "time": "21:00", "reward": "Tea", "time_to_complete": 45 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(replaced["id"], habit.id.as_str());
    assert_eq!(replaced["action"], "Write");
    assert_eq!(replaced["time"], "21:00:00");
    assert_eq!(replaced["place"], Value::Null);
    assert_eq!(replaced["owner_id"], owner.as_str());
}

#[tokio::test]
async fn delete_requires_ownership() {
    let app = TestApp::new().await;
    let (owner, owner_token) = create_user(&app.pool, "owner", None).await;
    let (_, other_token) = create_user(&app.pool, "other", None).await;
    let habit = insert_habit(&app.pool, &owner, &useful_fields("Read", true), date(2026, 3, 1)).await;
    let uri = format!("/api/v1/habits/{}", habit.id);

    let (status, _) = app.delete(&uri, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = app.delete(&uri, Some(&other_token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.delete(&uri, Some(&owner_token)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, _) = app.get(&uri, Some(&owner_token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleting_a_linked_habit_clears_the_link() {
    let app = TestApp::new().await;
    let (_, token) = create_user(&app.pool, "user", None).await;
    let pleasant = create(&app, &token, pleasant_body("Dance")).await;

    let mut body = useful_body("Stretch");
    body["reward"] = Value::Null;
    body["associated_habit"] = pleasant["id"].clone();
    let useful = create(&app, &token, body).await;

    let pleasant_uri = format!("/api/v1/habits/{}", pleasant["id"].as_str().unwrap());
    let (status, _) = app.delete(&pleasant_uri, Some(&token)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let useful_uri = format!("/api/v1/habits/{}", useful["id"].as_str().unwrap());
    let (status, survivor) = app.get(&useful_uri, Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(survivor["associated_habit_id"], Value::Null);
}

#[tokio::test]
async fn linked_habit_cannot_stop_being_pleasant() {
    let app = TestApp::new().await;
    let (_, token) = create_user(&app.pool, "user", None).await;
    let pleasant = create(&app, &token, pleasant_body("Dance")).await;

    let mut body = useful_body("Stretch");
    body["reward"] = Value::Null;
    body["associated_habit"] = pleasant["id"].clone();
    create(&app, &token, body).await;

    let uri = format!("/api/v1/habits/{}", pleasant["id"].as_str().unwrap());
    let (status, error) = app
        .patch(&uri, Some(&token), json!({ "is_pleasant_habit": false, "reward": "Cake" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(field_messages(&error).iter().any(|m| m == STILL_LINKED));
}

#[tokio::test]
async fn deleting_the_owner_leaves_an_ownerless_habit() {
    let app = TestApp::new().await;
    let (owner, owner_token) = create_user(&app.pool, "owner", None).await;
    let (_, other_token) = create_user(&app.pool, "other", None).await;
    let habit = insert_habit(&app.pool, &owner, &useful_fields("Read", true), date(2026, 3, 1)).await;

    let (status, _) = app.delete("/api/v1/auth/me", Some(&owner_token)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let uri = format!("/api/v1/habits/{}", habit.id);
    let (status, orphan) = app.get(&uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(orphan["owner_id"], Value::Null);

    // 주인 없는 습관은 아무도 수정할 수 없습니다.
    let (status, _) = app.patch(&uri, Some(&other_token), json!({ "action": "Mine now" })).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn mistyped_json_values_are_reported_as_field_errors() {
    let app = TestApp::new().await;
    let (owner, token) = create_user(&app.pool, "user", None).await;

    let mut string_minutes = useful_body("Walk");
    string_minutes["time_to_complete"] = json!("30");
    let mut null_flag = useful_body("Walk");
    null_flag["is_publicity"] = Value::Null;
    let mut overflow = useful_body("Walk");
    overflow["time_to_complete"] = json!(u64::MAX);

    let cases = [
        (string_minutes, "time_to_complete"),
        (null_flag, "is_publicity"),
        (overflow, "time_to_complete"),
    ];
    for (body, field) in cases {
        let (status, error) = app.post("/api/v1/habits", Some(&token), body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "unexpected body: {}", error);
        assert_eq!(error["error"]["code"], "validation_error");
        assert_eq!(error["error"]["fields"][0]["field"], field);
    }

    // PATCH 본문도 같은 형식으로 거부됩니다.
    let habit = insert_habit(&app.pool, &owner, &useful_fields("Read", false), date(2026, 3, 1)).await;
    let uri = format!("/api/v1/habits/{}", habit.id);
    let (status, error) = app.patch(&uri, Some(&token), json!({ "time_to_complete": "45" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["error"]["fields"][0]["field"], "time_to_complete");

    // 본문 전체가 객체가 아니면 필드 없이 보고됩니다.
    let (status, error) = app.post("/api/v1/habits", Some(&token), json!("walk every day")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["error"]["fields"][0]["field"], "non_field_errors");
}
