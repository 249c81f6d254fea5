/// Content-based weights.
/// They add up to 1.4, so a perfect candidate lands at 140 once scaled.
pub const CONTENT_WEIGHTS: ContentWeights = ContentWeights {
    skills: 0.4,
    region: 0.3,
    gender: 0.2,
    rating: 0.3,
    age: 0.1,
    experience: 0.1,
};

/// "More like this" weights between two candidates.
pub const SIMILARITY_WEIGHTS: SimilarityWeights = SimilarityWeights {
    skills: 0.4,
    region: 0.3,
    age: 0.2,
    rating: 0.1,
};

pub const HYBRID_BLEND: BlendWeights = BlendWeights {
    content: 0.6,
    collaborative: 0.4,
};

/// Collaborative scores are mean weighted ratings (1..=5) stretched to 0..=100.
pub const COLLABORATIVE_SCALE: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContentWeights {
    pub skills: f64,
    pub region: f64,
    pub gender: f64,
    pub rating: f64,
    pub age: f64,
    pub experience: f64,
}

impl ContentWeights {
    pub fn sum(&self) -> f64 {
        self.skills + self.region + self.gender + self.rating + self.age + self.experience
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimilarityWeights {
    pub skills: f64,
    pub region: f64,
    pub age: f64,
    pub rating: f64,
}

impl SimilarityWeights {
    pub fn sum(&self) -> f64 {
        self.skills + self.region + self.age + self.rating
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlendWeights {
    pub content: f64,
    pub collaborative: f64,
}
