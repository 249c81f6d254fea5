#![allow(dead_code)]

use std::collections::BTreeSet;
use std::sync::Arc;

use ap_api::auth::{Claims, DEFAULT_AUDIENCE, DEFAULT_ISSUER};
use ap_common::matching::skills::Skill;
use ap_common::store::InMemoryStore;
use ap_common::{Candidate, Gender, GenderPreference, Requester};
use axum::{
    body::Body,
    http::{Request, Response, header},
};
use http_body_util::BodyExt;
use jsonwebtoken::{EncodingKey, Header, encode};
use serde_json::Value;

pub const SECRET: &str = "router-test-secret";
pub const PARENT_ID: i64 = 1;

pub fn token(user_id: i64, role: &str) -> String {
    let claims = Claims {
        user_id: Some(user_id),
        sub: None,
        role: Some(role.to_string()),
        iss: Some(DEFAULT_ISSUER.into()),
        aud: Some(DEFAULT_AUDIENCE.into()),
        exp: (chrono::Utc::now().timestamp() + 3600) as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap()
}

pub fn get(uri: &str, bearer: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

pub fn post_json(uri: &str, bearer: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {bearer}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn json_body(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn candidate(id: i64, age: i32, region: &str, skills: &[Skill], experience_years: i32) -> Candidate {
    Candidate {
        id,
        name: format!("au-pair-{id}"),
        age,
        gender: Gender::Female,
        region: Some(region.into()),
        skills: skills.iter().copied().collect::<BTreeSet<_>>(),
        bio: String::new(),
        rating: None,
        total_ratings: 0,
        experience_years,
        is_available: true,
    }
}

pub fn seeded_store() -> Arc<InMemoryStore> {
    let candidates = vec![
        candidate(10, 21, "Jawa Barat", &[Skill::Cooking, Skill::FirstAid], 3),
        candidate(11, 24, "DKI Jakarta", &[Skill::Cooking], 1),
        candidate(12, 29, "Bali", &[Skill::Music], 0),
        candidate(13, 35, "Papua", &[], 5),
    ];
    let parents = vec![
        Requester {
            id: PARENT_ID,
            name: "Ibu Sari".into(),
            preferred_gender: GenderPreference::Female,
            skill_preference: "cooking, first-aid".into(),
            region: Some("Jawa Barat".into()),
            child_age: Some(4),
        },
        Requester {
            id: 2,
            name: "Pak Budi".into(),
            preferred_gender: GenderPreference::Any,
            skill_preference: "music".into(),
            region: Some("Bali".into()),
            child_age: None,
        },
    ];

    Arc::new(
        InMemoryStore::new()
            .with_candidates(candidates)
            .with_requesters(parents)
            .with_rating(2, 12, 5),
    )
}
