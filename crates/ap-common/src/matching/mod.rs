pub mod location;
pub mod scoring;
pub mod similarity;
pub mod skills;
pub mod weights;

/// Round to one decimal place, the precision compatibility scores are reported in.
pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
