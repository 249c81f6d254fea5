mod common;

use axum::http::StatusCode;
use serde_json::json;
use tower::ServiceExt;

use common::{PARENT_ID, SECRET, get, json_body, post_json, seeded_store, token};

#[tokio::test]
async fn content_recommendations_are_ranked_and_logged() {
    let store = seeded_store();
    let app = ap_api::create_router(ap_api::test_state_with_store(SECRET, store.clone()));
    let parent = token(PARENT_ID, "parent");

    let response = app
        .oneshot(get(
            "/api/recommendations?strategy=content&limit=2&use_external_model=false",
            Some(&parent),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["strategy"], "content");
    assert_eq!(body["data"]["source"], "content");
    assert_eq!(body["data"]["requester_id"], PARENT_ID);
    assert_eq!(body["data"]["total_found"], 2);

    let recommendations = body["data"]["recommendations"].as_array().unwrap();
    assert_eq!(recommendations[0]["id"], 10);
    assert_eq!(recommendations[0]["match_type"], "content-based");
    let first = recommendations[0]["compatibility_score"].as_f64().unwrap();
    let second = recommendations[1]["compatibility_score"].as_f64().unwrap();
    assert!(first >= second);
    assert!(
        recommendations[0]["match_explanation"]
            .as_str()
            .unwrap()
            .contains("Same region")
    );

    let logs = store.recommendation_logs().await;
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].count, 2);
}

#[tokio::test]
async fn collaborative_only_returns_candidates_with_signal() {
    let app = ap_api::create_router(ap_api::test_state_with_store(SECRET, seeded_store()));
    let parent = token(PARENT_ID, "parent");

    let response = app
        .oneshot(get(
            "/api/recommendations?strategy=collaborative&use_external_model=false",
            Some(&parent),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let recommendations = body["data"]["recommendations"].as_array().unwrap();
    assert_eq!(recommendations.len(), 1);
    assert_eq!(recommendations[0]["id"], 12);
    assert_eq!(recommendations[0]["compatibility_score"], 85.0);
    assert_eq!(recommendations[0]["match_type"], "collaborative");
}

#[tokio::test]
async fn invalid_limit_and_unknown_parent_are_client_errors() {
    let app = ap_api::create_router(ap_api::test_state_with_store(SECRET, seeded_store()));

    let too_many = app
        .clone()
        .oneshot(get(
            "/api/recommendations?limit=51",
            Some(&token(PARENT_ID, "parent")),
        ))
        .await
        .unwrap();
    assert_eq!(too_many.status(), StatusCode::BAD_REQUEST);

    let unknown = app
        .oneshot(get("/api/recommendations", Some(&token(404, "parent"))))
        .await
        .unwrap();
    assert_eq!(unknown.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_query_values_get_the_error_envelope() {
    let app = ap_api::create_router(ap_api::test_state_with_store(SECRET, seeded_store()));
    let parent = token(PARENT_ID, "parent");

    for uri in [
        "/api/recommendations?limit=abc",
        "/api/recommendations?strategy=bogus",
        "/api/recommendations/similar/10?limit=ten",
        "/api/recommendations/custom?limit=abc",
    ] {
        let response = app.clone().oneshot(get(uri, Some(&parent))).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");

        let body = json_body(response).await;
        assert_eq!(body["success"], false, "{uri}");
        assert_eq!(body["code"], "bad_request", "{uri}");
    }
}

#[tokio::test]
async fn fractional_rating_is_rejected_without_writing() {
    let store = seeded_store();
    let app = ap_api::create_router(ap_api::test_state_with_store(SECRET, store.clone()));

    let response = app
        .oneshot(post_json(
            "/api/recommendations/rate",
            &token(PARENT_ID, "parent"),
            json!({"candidate_id": 11, "rating": 4.5}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "bad_request");
    assert_eq!(store.rating_count().await, 1);
}

#[tokio::test]
async fn unreadable_feedback_body_gets_the_error_envelope() {
    let app = ap_api::create_router(ap_api::test_state_with_store(SECRET, seeded_store()));

    let response = app
        .oneshot(post_json(
            "/api/recommendations/feedback",
            &token(PARENT_ID, "parent"),
            json!({"recommendation_ids": "not-a-list"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["success"], false);
}

#[tokio::test]
async fn ratings_update_the_candidate_aggregate() {
    let store = seeded_store();
    let app = ap_api::create_router(ap_api::test_state_with_store(SECRET, store.clone()));

    let rejected = app
        .clone()
        .oneshot(post_json(
            "/api/recommendations/rate",
            &token(PARENT_ID, "parent"),
            json!({"candidate_id": 11, "score": 6}),
        ))
        .await
        .unwrap();
    assert_eq!(rejected.status(), StatusCode::BAD_REQUEST);
    assert_eq!(store.rating_count().await, 1);

    for (parent_id, score) in [(PARENT_ID, 4), (2, 2)] {
        let response = app
            .clone()
            .oneshot(post_json(
                "/api/recommendations/rate",
                &token(parent_id, "parent"),
                json!({"auPairId": 11, "rating": score}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let candidate = store.candidate(11).await.unwrap();
    assert_eq!(candidate.rating, Some(3.0));
    assert_eq!(candidate.total_ratings, 2);

    let missing = app
        .oneshot(post_json(
            "/api/recommendations/rate",
            &token(PARENT_ID, "parent"),
            json!({"candidate_id": 999, "score": 3}),
        ))
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn similar_excludes_the_reference_candidate() {
    let app = ap_api::create_router(ap_api::test_state_with_store(SECRET, seeded_store()));
    let viewer = token(40, "aupair");

    let response = app
        .clone()
        .oneshot(get("/api/recommendations/similar/10?limit=2", Some(&viewer)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["data"]["reference_candidate_id"], 10);
    let similar = body["data"]["similar_candidates"].as_array().unwrap();
    assert_eq!(similar.len(), 2);
    assert!(similar.iter().all(|item| item["id"] != 10));

    let missing = app
        .oneshot(get("/api/recommendations/similar/999", Some(&viewer)))
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn custom_search_applies_filters_and_echoes_criteria() {
    let app = ap_api::create_router(ap_api::test_state_with_store(SECRET, seeded_store()));

    let response = app
        .oneshot(get(
            "/api/recommendations/custom?skills=cooking&max_age=25&min_rating=abc",
            Some(&token(PARENT_ID, "parent")),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["data"]["filters_applied"], 2);
    assert_eq!(body["data"]["criteria"]["max_age"], 25);
    assert!(body["data"]["criteria"].get("min_rating").is_none());

    let ids: Vec<i64> = body["data"]["recommendations"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids.len(), 2);
    assert!(ids.contains(&10) && ids.contains(&11));
}

#[tokio::test]
async fn feedback_is_validated_and_stored() {
    let store = seeded_store();
    let app = ap_api::create_router(ap_api::test_state_with_store(SECRET, store.clone()));
    let parent = token(PARENT_ID, "parent");

    let empty = app
        .clone()
        .oneshot(post_json(
            "/api/recommendations/feedback",
            &parent,
            json!({"recommendation_ids": [], "feedback_type": "helpful"}),
        ))
        .await
        .unwrap();
    assert_eq!(empty.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(post_json(
            "/api/recommendations/feedback",
            &parent,
            json!({
                "recommendation_ids": [10, 11],
                "feedback_type": "not_helpful",
                "comments": "too far away"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["data"]["recommendation_count"], 2);
    assert_eq!(body["data"]["feedback_type"], "not_helpful");

    let stored = store.feedback().await;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].comments.as_deref(), Some("too far away"));
}

#[tokio::test]
async fn stats_reflect_logged_recommendations() {
    let store = seeded_store();
    let app = ap_api::create_router(ap_api::test_state_with_store(SECRET, store));
    let parent = token(PARENT_ID, "parent");

    let served = app
        .clone()
        .oneshot(get(
            "/api/recommendations?strategy=content&limit=3",
            Some(&parent),
        ))
        .await
        .unwrap();
    assert_eq!(served.status(), StatusCode::OK);

    let response = app
        .oneshot(get("/api/recommendations/stats", Some(&parent)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["data"]["total_recommendations"], 1);
    assert_eq!(body["data"]["successful_matches"], 1);
}
