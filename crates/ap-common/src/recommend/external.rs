//! Delegation to an out-of-process scoring model.
//!
//! The engine treats every error here as a reason to fall back to local
//! scoring; nothing in this module is ever surfaced to API callers.

use std::{process::Stdio, str::FromStr};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

use super::{MatchType, Recommendation, Strategy};
use crate::{
    Candidate, Gender, Requester,
    matching::skills::{Skill, parse_skill_tokens},
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExternalPreferences {
    pub skills: Vec<String>,
    pub location: String,
    pub gender: String,
}

/// Wire request; field names are the contract the model process reads.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExternalScoreRequest {
    #[serde(rename = "parent_id")]
    pub requester_id: i64,
    pub algorithm: Strategy,
    pub limit: usize,
    #[serde(rename = "parent_requirements")]
    pub preferences: ExternalPreferences,
}

impl ExternalScoreRequest {
    pub fn new(requester: &Requester, strategy: Strategy, limit: usize) -> Self {
        Self {
            requester_id: requester.id,
            algorithm: strategy,
            limit,
            preferences: ExternalPreferences {
                skills: parse_skill_tokens(&requester.skill_preference),
                location: requester.region.clone().unwrap_or_default(),
                gender: requester.preferred_gender.as_ref().to_string(),
            },
        }
    }
}

#[derive(Debug, Error)]
pub enum ExternalScoreError {
    #[error("failed to encode request: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("failed to spawn external scorer: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("external scorer exited with {status}: {stderr}")]
    Exit { status: String, stderr: String },
    #[error("malformed external scorer output: {0}")]
    Malformed(String),
    #[error("external scorer reported failure: {0}")]
    Rejected(String),
}

impl ExternalScoreError {
    /// Short label for fallback metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            ExternalScoreError::Encode(_) => "encode",
            ExternalScoreError::Spawn(_) => "spawn",
            ExternalScoreError::Exit { .. } => "exit",
            ExternalScoreError::Malformed(_) => "malformed",
            ExternalScoreError::Rejected(_) => "rejected",
        }
    }
}

#[async_trait]
pub trait ExternalScorer: Send + Sync {
    async fn try_score(
        &self,
        request: &ExternalScoreRequest,
    ) -> Result<Vec<Recommendation>, ExternalScoreError>;
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SkillsField {
    List(Vec<String>),
    Text(String),
}

impl Default for SkillsField {
    fn default() -> Self {
        SkillsField::List(Vec::new())
    }
}

impl SkillsField {
    fn into_skills(self) -> std::collections::BTreeSet<Skill> {
        let tokens = match self {
            SkillsField::List(items) => items,
            SkillsField::Text(text) => text.split(',').map(str::to_string).collect(),
        };
        tokens
            .iter()
            .filter_map(|token| Skill::from_label_lenient(token))
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct ExternalRecommendation {
    id: i64,
    name: String,
    age: i32,
    gender: String,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    skills: SkillsField,
    #[serde(default)]
    rating: Option<f64>,
    #[serde(default)]
    experience: i32,
    compatibility_score: f64,
    #[serde(default)]
    explanation: String,
}

#[derive(Debug, Deserialize)]
struct ExternalResponse {
    success: bool,
    #[serde(default)]
    algorithm: Option<String>,
    #[serde(default)]
    recommendations: Vec<ExternalRecommendation>,
    #[serde(default)]
    error: Option<String>,
}

/// Decode the single JSON document the model process prints on stdout.
pub fn parse_external_response(
    raw: &str,
    requested: Strategy,
) -> Result<Vec<Recommendation>, ExternalScoreError> {
    let response: ExternalResponse = serde_json::from_str(raw.trim())
        .map_err(|err| ExternalScoreError::Malformed(err.to_string()))?;

    if !response.success {
        return Err(ExternalScoreError::Rejected(
            response
                .error
                .unwrap_or_else(|| "no error message".to_string()),
        ));
    }

    let algorithm = response
        .algorithm
        .filter(|a| !a.trim().is_empty())
        .unwrap_or_else(|| requested.to_string());

    response
        .recommendations
        .into_iter()
        .map(|rec| {
            let gender = Gender::from_str(rec.gender.trim()).map_err(|_| {
                ExternalScoreError::Malformed(format!("unknown gender {:?}", rec.gender))
            })?;

            Ok(Recommendation {
                candidate: Candidate {
                    id: rec.id,
                    name: rec.name,
                    age: rec.age,
                    gender,
                    region: rec.location.filter(|l| !l.trim().is_empty()),
                    skills: rec.skills.into_skills(),
                    bio: String::new(),
                    rating: rec.rating,
                    total_ratings: 0,
                    experience_years: rec.experience.max(0),
                    is_available: true,
                },
                compatibility_score: rec.compatibility_score,
                match_explanation: rec.explanation,
                match_type: MatchType::External(algorithm.clone()),
            })
        })
        .collect()
}

/// Runs `program args... recommend <request-json>` and reads one JSON
/// response from stdout. The child is killed if the future is dropped.
#[derive(Debug, Clone)]
pub struct SubprocessScorer {
    program: String,
    args: Vec<String>,
}

impl SubprocessScorer {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

#[async_trait]
impl ExternalScorer for SubprocessScorer {
    async fn try_score(
        &self,
        request: &ExternalScoreRequest,
    ) -> Result<Vec<Recommendation>, ExternalScoreError> {
        let payload = serde_json::to_string(request)?;
        debug!(program = %self.program, requester_id = request.requester_id, "invoking external scorer");

        let output = Command::new(&self.program)
            .args(&self.args)
            .arg("recommend")
            .arg(payload)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await?;

        if !output.status.success() {
            return Err(ExternalScoreError::Exit {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_external_response(&stdout, request.algorithm)
    }
}
