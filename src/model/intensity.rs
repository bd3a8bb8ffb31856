use serde::{Deserialize, Serialize};

/// Visual/audio intensity tier driven by effective difficulty. Boundaries
/// are strictly increasing; each tier triggers everything below it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum IntensityTier {
    Calm,
    High,
    Insane,
    Glitch,
}

impl IntensityTier {
    pub fn for_difficulty(effective: f64) -> Self {
        if effective > 2.5 {
            IntensityTier::Glitch
        } else if effective > 2.2 {
            IntensityTier::Insane
        } else if effective > 1.5 {
            IntensityTier::High
        } else {
            IntensityTier::Calm
        }
    }
}

impl std::fmt::Display for IntensityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IntensityTier::Calm => write!(f, "calm"),
            IntensityTier::High => write!(f, "high"),
            IntensityTier::Insane => write!(f, "insane"),
            IntensityTier::Glitch => write!(f, "glitch"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_boundaries_are_strict() {
        assert_eq!(IntensityTier::for_difficulty(1.5), IntensityTier::Calm);
        assert_eq!(IntensityTier::for_difficulty(1.51), IntensityTier::High);
        assert_eq!(IntensityTier::for_difficulty(2.2), IntensityTier::High);
        assert_eq!(IntensityTier::for_difficulty(2.21), IntensityTier::Insane);
        assert_eq!(IntensityTier::for_difficulty(2.5), IntensityTier::Insane);
        assert_eq!(IntensityTier::for_difficulty(2.51), IntensityTier::Glitch);
    }

    #[test]
    fn test_tiers_are_ordered() {
        assert!(IntensityTier::Calm < IntensityTier::High);
        assert!(IntensityTier::High < IntensityTier::Insane);
        assert!(IntensityTier::Insane < IntensityTier::Glitch);
    }
}
