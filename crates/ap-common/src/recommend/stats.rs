use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    matching::{round_to_tenth, skills::{Skill, skills_mentioned}},
    store::AnalyticsSnapshot,
};

const TOP_SKILLS: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillDemand {
    pub skill: Skill,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationStats {
    pub total_recommendations: i64,
    pub successful_matches: i64,
    pub average_compatibility: f64,
    pub top_skills: Vec<SkillDemand>,
    /// Percentage, one decimal.
    pub success_rate: f64,
}

pub fn summarize(snapshot: &AnalyticsSnapshot) -> RecommendationStats {
    let mut demand: BTreeMap<Skill, usize> = BTreeMap::new();
    for preference in &snapshot.skill_preferences {
        for skill in skills_mentioned(preference) {
            *demand.entry(skill).or_default() += 1;
        }
    }

    let mut top_skills: Vec<SkillDemand> = demand
        .into_iter()
        .map(|(skill, count)| SkillDemand { skill, count })
        .collect();
    // Stable: equal counts stay in vocabulary order.
    top_skills.sort_by(|a, b| b.count.cmp(&a.count));
    top_skills.truncate(TOP_SKILLS);

    let success_rate = if snapshot.successful_matches > 0 && snapshot.total_recommendations > 0 {
        round_to_tenth(
            snapshot.successful_matches as f64 / snapshot.total_recommendations as f64 * 100.0,
        )
    } else {
        0.0
    };

    RecommendationStats {
        total_recommendations: snapshot.total_recommendations,
        successful_matches: snapshot.successful_matches,
        average_compatibility: snapshot
            .average_compatibility
            .map(round_to_tenth)
            .unwrap_or(0.0),
        top_skills,
        success_rate,
    }
}
