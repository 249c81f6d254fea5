use std::collections::HashMap;

use lazy_static::lazy_static;

pub const SAME_REGION_SCORE: f64 = 1.0;
pub const ADJACENT_REGION_SCORE: f64 = 0.7;
pub const DISTANT_REGION_SCORE: f64 = 0.3;

lazy_static! {
    /// Regions considered within commuting distance of the key region.
    /// Lookups go from the requester's region; the table is not symmetric.
    pub static ref REGION_ADJACENCY: HashMap<&'static str, Vec<&'static str>> = {
        let mut m = HashMap::new();
        m.insert("DKI Jakarta", vec!["Jawa Barat", "Banten"]);
        m.insert("Jawa Barat", vec!["DKI Jakarta", "Jawa Tengah"]);
        m.insert("Jawa Tengah", vec!["Jawa Barat", "Jawa Timur", "DI Yogyakarta"]);
        m.insert("DI Yogyakarta", vec!["Jawa Tengah"]);
        m.insert("Jawa Timur", vec!["Jawa Tengah"]);
        m
    };
}

fn present(region: Option<&str>) -> Option<&str> {
    region.map(str::trim).filter(|value| !value.is_empty())
}

pub fn is_adjacent(from: &str, to: &str) -> bool {
    REGION_ADJACENCY
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(from))
        .is_some_and(|(_, neighbours)| {
            neighbours
                .iter()
                .any(|neighbour| neighbour.eq_ignore_ascii_case(to))
        })
}

/// Region proximity in [0, 1]: same region, listed neighbour, or anything else.
pub fn region_match(requester: Option<&str>, candidate: Option<&str>) -> f64 {
    let (Some(requester), Some(candidate)) = (present(requester), present(candidate)) else {
        return DISTANT_REGION_SCORE;
    };

    if requester.eq_ignore_ascii_case(candidate) {
        SAME_REGION_SCORE
    } else if is_adjacent(requester, candidate) {
        ADJACENT_REGION_SCORE
    } else {
        DISTANT_REGION_SCORE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_regions_score_full() {
        assert_eq!(region_match(Some("Jawa Barat"), Some("jawa barat")), 1.0);
    }

    #[test]
    fn missing_region_on_either_side_scores_low() {
        assert_eq!(region_match(None, Some("Jawa Barat")), 0.3);
        assert_eq!(region_match(Some("Jawa Barat"), None), 0.3);
        assert_eq!(region_match(Some("  "), Some("Jawa Barat")), 0.3);
    }

    #[test]
    fn adjacency_is_looked_up_from_requester_region() {
        assert_eq!(region_match(Some("DKI Jakarta"), Some("Banten")), 0.7);
        assert_eq!(region_match(Some("Banten"), Some("DKI Jakarta")), 0.3);
    }

    #[test]
    fn unrelated_regions_score_low() {
        assert_eq!(region_match(Some("Bali"), Some("Jawa Timur")), 0.3);
    }
}
