//! The closed set of Brain Gym exercises and their static catalog.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// Exercise identifiers accepted by the coach.
///
/// The serialized tags are part of the public wire format and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum ExerciseType {
    #[serde(rename = "cross-crawl")]
    CrossCrawl,
    #[serde(rename = "lazy-8s")]
    Lazy8s,
    #[serde(rename = "brain-buttons")]
    BrainButtons,
    #[serde(rename = "earth-buttons")]
    EarthButtons,
    #[serde(rename = "elephant-swings")]
    ElephantSwings,
    #[serde(rename = "double-doodle")]
    DoubleDoodle,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown exercise type '{0}'")]
pub struct UnknownExerciseType(pub String);

impl ExerciseType {
    /// All exercises, in catalog order.
    pub const ALL: [ExerciseType; 6] = [
        ExerciseType::CrossCrawl,
        ExerciseType::Lazy8s,
        ExerciseType::BrainButtons,
        ExerciseType::EarthButtons,
        ExerciseType::ElephantSwings,
        ExerciseType::DoubleDoodle,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExerciseType::CrossCrawl => "cross-crawl",
            ExerciseType::Lazy8s => "lazy-8s",
            ExerciseType::BrainButtons => "brain-buttons",
            ExerciseType::EarthButtons => "earth-buttons",
            ExerciseType::ElephantSwings => "elephant-swings",
            ExerciseType::DoubleDoodle => "double-doodle",
        }
    }

    /// Returns the static catalog record for this exercise.
    pub fn info(&self) -> &'static Exercise {
        match self {
            ExerciseType::CrossCrawl => &CROSS_CRAWL,
            ExerciseType::Lazy8s => &LAZY_8S,
            ExerciseType::BrainButtons => &BRAIN_BUTTONS,
            ExerciseType::EarthButtons => &EARTH_BUTTONS,
            ExerciseType::ElephantSwings => &ELEPHANT_SWINGS,
            ExerciseType::DoubleDoodle => &DOUBLE_DOODLE,
        }
    }
}

impl fmt::Display for ExerciseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExerciseType {
    type Err = UnknownExerciseType;

    // Exact match only: tags are case-sensitive on the wire.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ExerciseType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownExerciseType(s.to_string()))
    }
}

/// Static description of an exercise, used for display and for prompting the vision model.
#[derive(Debug)]
pub struct Exercise {
    pub id: ExerciseType,
    pub name: &'static str,
    pub description: &'static str,
    pub instructions: &'static [&'static str],
    pub benefits: &'static str,
    pub icon: &'static str,
}

static CROSS_CRAWL: Exercise = Exercise {
    id: ExerciseType::CrossCrawl,
    name: "Cross Crawl",
    description: "Connect your brain hemispheres!",
    instructions: &[
        "Stand or sit comfortably",
        "Slowly bring your right elbow to your left knee",
        "Then bring your left elbow to your right knee",
        "Repeat the movement smoothly",
        "Keep your movements controlled and deliberate",
    ],
    benefits: "Connects the left and right sides of the brain and helps with mental coordination.",
    icon: "activity",
};

static LAZY_8S: Exercise = Exercise {
    id: ExerciseType::Lazy8s,
    name: "Lazy 8s",
    description: "Draw infinity in the air!",
    instructions: &[
        "Extend your arm straight in front of you",
        "Make a large figure-eight (∞) shape in the air",
        "Trace the shape with your eyes following your hand",
        "Repeat with the other hand",
        "Try using both hands together!",
    ],
    benefits: "Improves eyesight, peripheral vision, and wrist flexibility.",
    icon: "infinity",
};

static BRAIN_BUTTONS: Exercise = Exercise {
    id: ExerciseType::BrainButtons,
    name: "Brain Buttons",
    description: "Activate your energy points!",
    instructions: &[
        "Sit or stand comfortably",
        "Place one hand on your belly",
        "Place the other hand just below your collarbone",
        "Gently massage both spots in circular motions",
        "Feel the energy flowing!",
    ],
    benefits: "Boosts blood flow to the brain and increases focus.",
    icon: "zap",
};

static EARTH_BUTTONS: Exercise = Exercise {
    id: ExerciseType::EarthButtons,
    name: "Earth Buttons",
    description: "Ground yourself with energy!",
    instructions: &[
        "Sit or stand in a relaxed position",
        "Place your right hand on your lips",
        "Place your left hand on your navel",
        "Use small, circular motions to rub both spots",
        "Stay calm and focused",
    ],
    benefits: "Enhances mental alertness and body orientation.",
    icon: "globe",
};

static ELEPHANT_SWINGS: Exercise = Exercise {
    id: ExerciseType::ElephantSwings,
    name: "Elephant Swings",
    description: "Swing like an elephant!",
    instructions: &[
        "Stand with feet shoulder-width apart",
        "Extend one arm straight out",
        "Place the other hand on the same-side ear",
        "Draw a large figure-eight with your extended arm",
        "Swing from your shoulder, not just your wrist",
        "Repeat with the other arm",
    ],
    benefits: "Improves balance and listening skills.",
    icon: "move",
};

static DOUBLE_DOODLE: Exercise = Exercise {
    id: ExerciseType::DoubleDoodle,
    name: "Double Doodle",
    description: "Draw with both hands!",
    instructions: &[
        "Get a piece of paper and two markers or crayons",
        "Use both hands at the same time",
        "Draw symmetrical shapes or patterns",
        "Try drawing matching circles, hearts, or stars",
        "Have fun creating mirrored art!",
    ],
    benefits: "Enhances bilateral coordination and creativity.",
    icon: "pencil",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_tags_are_exact() {
        let tags: Vec<&str> = ExerciseType::ALL.iter().map(|t| t.as_str()).collect();
        assert_eq!(
            tags,
            vec![
                "cross-crawl",
                "lazy-8s",
                "brain-buttons",
                "earth-buttons",
                "elephant-swings",
                "double-doodle"
            ]
        );
        for t in ExerciseType::ALL {
            let json = serde_json::to_value(t).unwrap();
            assert_eq!(json, serde_json::json!(t.as_str()));
            assert_eq!(t.as_str().parse::<ExerciseType>().unwrap(), t);
        }
    }

    #[test]
    fn parsing_is_case_sensitive() {
        assert!("Lazy-8s".parse::<ExerciseType>().is_err());
        assert!("lazy8s".parse::<ExerciseType>().is_err());
        assert!(serde_json::from_str::<ExerciseType>("\"jumping-jacks\"").is_err());
    }

    #[test]
    fn catalog_ids_match_their_tags() {
        for t in ExerciseType::ALL {
            let info = t.info();
            assert_eq!(info.id, t);
            assert!(!info.instructions.is_empty());
        }
    }
}
