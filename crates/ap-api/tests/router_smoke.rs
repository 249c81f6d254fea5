mod common;

use axum::http::StatusCode;
use tower::ServiceExt;

use common::{SECRET, get, token};

#[tokio::test]
async fn livez_healthy_and_recommendations_require_auth() {
    let app = ap_api::create_router(ap_api::test_state(SECRET));

    let livez_response = app.clone().oneshot(get("/livez", None)).await.unwrap();
    assert_eq!(livez_response.status(), StatusCode::OK);
    assert!(livez_response.headers().contains_key("x-request-id"));

    let unauthorized = app
        .oneshot(get("/api/recommendations", None))
        .await
        .unwrap();
    assert_eq!(unauthorized.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn non_parent_roles_are_forbidden_from_personal_routes() {
    let app = ap_api::create_router(ap_api::test_state(SECRET));
    let au_pair = token(5, "aupair");

    for uri in ["/api/recommendations", "/api/recommendations/custom?skills=cooking"] {
        let response = app.clone().oneshot(get(uri, Some(&au_pair))).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "{uri}");
    }

    let stats = app
        .oneshot(get("/api/recommendations/stats", Some(&au_pair)))
        .await
        .unwrap();
    assert_eq!(stats.status(), StatusCode::OK);
}
