use serde::{Deserialize, Serialize};

/// Number of pedagogical stages in a rehearsal.
pub const TOTAL_STAGES: usize = 3;

/// One of the fixed, ordered phases of a coaching conversation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    #[default]
    ClarifyGoal,
    SolutionSearch,
    WrapUp,
}

impl Stage {
    pub const ALL: [Stage; TOTAL_STAGES] =
        [Stage::ClarifyGoal, Stage::SolutionSearch, Stage::WrapUp];

    pub fn index(&self) -> usize {
        match self {
            Self::ClarifyGoal => 0,
            Self::SolutionSearch => 1,
            Self::WrapUp => 2,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn last() -> Self {
        Self::WrapUp
    }

    pub fn is_last(&self) -> bool {
        *self == Self::last()
    }

    pub fn next(&self) -> Option<Self> {
        Self::from_index(self.index() + 1)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ClarifyGoal => "clarify_goal",
            Self::SolutionSearch => "solution_search",
            Self::WrapUp => "wrap_up",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::ClarifyGoal => "Clarify the goal",
            Self::SolutionSearch => "Search for solutions",
            Self::WrapUp => "Wrap up",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_order() {
        assert_eq!(Stage::ClarifyGoal.index(), 0);
        assert_eq!(Stage::WrapUp.index(), TOTAL_STAGES - 1);
        assert!(Stage::ClarifyGoal < Stage::SolutionSearch);
        assert_eq!(Stage::ClarifyGoal.next(), Some(Stage::SolutionSearch));
        assert_eq!(Stage::WrapUp.next(), None);
    }

    #[test]
    fn test_stage_from_index() {
        assert_eq!(Stage::from_index(1), Some(Stage::SolutionSearch));
        assert_eq!(Stage::from_index(3), None);
    }

    #[test]
    fn test_stage_names_match_wire_format() {
        for stage in Stage::ALL {
            let json = serde_json::to_value(stage).unwrap();
            assert_eq!(json, stage.as_str());
        }
    }
}
