use trainer_core::Stage;

/// Accumulated messages required per stage before the conversation moves on.
pub const MESSAGES_PER_STAGE: usize = 4;

/// Decides when a conversation has earned the next stage.
///
/// Stage `n` is left once the log holds `MESSAGES_PER_STAGE * (n + 1)`
/// messages, so each call advances by at most one stage and never past the
/// last one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageProgressionPolicy {
    messages_per_stage: usize,
}

impl Default for StageProgressionPolicy {
    fn default() -> Self {
        Self {
            messages_per_stage: MESSAGES_PER_STAGE,
        }
    }
}

impl StageProgressionPolicy {
    pub fn new(messages_per_stage: usize) -> Self {
        Self {
            messages_per_stage: messages_per_stage.max(1),
        }
    }

    pub fn messages_per_stage(&self) -> usize {
        self.messages_per_stage
    }

    /// Index the conversation should be at after `total_message_count`
    /// messages.
    ///
    /// The threshold deliberately scales with the current stage
    /// (`4 * (index + 1)` by default) rather than a flat `count >= 4`: stage 1
    /// at four messages, stage 2 at eight.
    pub fn next_stage(&self, total_message_count: usize, current_stage_index: usize) -> usize {
        if current_stage_index >= Stage::last().index() {
            return current_stage_index;
        }

        let threshold = self.messages_per_stage * (current_stage_index + 1);
        if total_message_count >= threshold {
            current_stage_index + 1
        } else {
            current_stage_index
        }
    }
}
