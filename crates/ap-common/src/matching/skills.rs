use std::collections::BTreeSet;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumIter, EnumString, IntoEnumIterator};

/// Fixed capability vocabulary an au pair profile can carry.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    AsRefStr,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum Skill {
    Cooking,
    FirstAid,
    Driving,
    Swimming,
    Computer,
    Music,
    Sports,
}

impl Skill {
    pub fn label(&self) -> &'static str {
        match self {
            Skill::Cooking => "cooking",
            Skill::FirstAid => "first-aid",
            Skill::Driving => "driving",
            Skill::Swimming => "swimming",
            Skill::Computer => "computer",
            Skill::Music => "music",
            Skill::Sports => "sports",
        }
    }

    /// Exact label first, then the same fuzzy containment used for preferences.
    pub fn from_label_lenient(text: &str) -> Option<Skill> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }

        Skill::from_str(trimmed)
            .ok()
            .or_else(|| Skill::iter().find(|skill| token_matches(trimmed, skill.label())))
    }
}

/// Split a free-text preference on commas and whitespace.
pub fn parse_skill_tokens(text: &str) -> Vec<String> {
    text.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Case-insensitive containment in either direction ("cook" ~ "cooking").
pub fn token_matches(token: &str, label: &str) -> bool {
    let token = token.to_lowercase();
    let label = label.to_lowercase();
    if token.is_empty() || label.is_empty() {
        return false;
    }
    label.contains(&token) || token.contains(&label)
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkillMatchResult {
    pub match_percentage: f64,
    pub matched_tokens: Vec<String>,
    /// No required skills were given, so the score is neutral.
    pub neutral: bool,
}

/// Share of required skill tokens covered by the candidate's skill set.
pub fn check_required_skills(required: &[String], skills: &BTreeSet<Skill>) -> SkillMatchResult {
    if required.is_empty() {
        return SkillMatchResult {
            match_percentage: 0.5,
            matched_tokens: vec![],
            neutral: true,
        };
    }

    let matched_tokens: Vec<String> = required
        .iter()
        .filter(|token| skills.iter().any(|skill| token_matches(token, skill.label())))
        .cloned()
        .collect();

    SkillMatchResult {
        match_percentage: matched_tokens.len() as f64 / required.len() as f64,
        matched_tokens,
        neutral: false,
    }
}

/// Jaccard overlap of two skill sets; 0.5 when neither has any skill.
pub fn skill_set_similarity(a: &BTreeSet<Skill>, b: &BTreeSet<Skill>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.5;
    }
    a.intersection(b).count() as f64 / union as f64
}

/// Vocabulary entries a free-text preference mentions.
pub fn skills_mentioned(text: &str) -> BTreeSet<Skill> {
    let tokens = parse_skill_tokens(text);
    Skill::iter()
        .filter(|skill| tokens.iter().any(|token| token_matches(token, skill.label())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(skills: &[Skill]) -> BTreeSet<Skill> {
        skills.iter().copied().collect()
    }

    #[test]
    fn tokenizes_on_commas_and_whitespace() {
        assert_eq!(
            parse_skill_tokens(" cooking,,driving \t music "),
            vec!["cooking", "driving", "music"]
        );
        assert!(parse_skill_tokens("  , ").is_empty());
    }

    #[test]
    fn containment_matches_both_directions() {
        assert!(token_matches("cook", "cooking"));
        assert!(token_matches("Cooking-Classes", "cooking"));
        assert!(token_matches("AID", "first-aid"));
        assert!(!token_matches("piano", "music"));
    }

    #[test]
    fn empty_requirements_are_neutral() {
        let result = check_required_skills(&[], &set(&[Skill::Cooking]));
        assert_eq!(result.match_percentage, 0.5);
        assert!(result.neutral);
    }

    #[test]
    fn counts_covered_tokens() {
        let required = parse_skill_tokens("cook, swim, piano, drive");
        let result = check_required_skills(&required, &set(&[Skill::Cooking, Skill::Swimming]));

        assert!((result.match_percentage - 0.5).abs() < f64::EPSILON);
        assert_eq!(result.matched_tokens, vec!["cook", "swim"]);
        assert!(!result.neutral);
    }

    #[test]
    fn jaccard_similarity_over_skill_sets() {
        let a = set(&[Skill::Cooking, Skill::Music]);
        let b = set(&[Skill::Cooking, Skill::Driving, Skill::Sports]);

        assert!((skill_set_similarity(&a, &b) - 0.25).abs() < f64::EPSILON);
        assert_eq!(skill_set_similarity(&BTreeSet::new(), &BTreeSet::new()), 0.5);
        assert_eq!(skill_set_similarity(&a, &a), 1.0);
    }

    #[test]
    fn lenient_label_parsing() {
        assert_eq!(Skill::from_label_lenient("First-Aid"), Some(Skill::FirstAid));
        assert_eq!(Skill::from_label_lenient("swim"), Some(Skill::Swimming));
        assert_eq!(Skill::from_label_lenient("   "), None);
        assert_eq!(Skill::from_label_lenient("knitting"), None);
    }

    #[test]
    fn finds_mentioned_skills() {
        let mentioned = skills_mentioned("Cooking and first aid");
        assert!(mentioned.contains(&Skill::Cooking));
        assert!(mentioned.contains(&Skill::FirstAid));
        assert_eq!(mentioned.len(), 2);
    }
}
