//! Engine error types and pipeline stages.

use std::fmt;

use thiserror::Error;

pub type EngineResult<T> = Result<T, EngineError>;

/// Pipeline stages in execution order.
///
/// Fatal errors carry the stage at failure so callers can tell input
/// problems from algorithmic dead-ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Init,
    Segment,
    Analyze,
    Score,
    SelectInitial,
    DiversityPenalize,
    RescoreSort,
    SelectFinal,
    Done,
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Init => "init",
            Stage::Segment => "segment",
            Stage::Analyze => "analyze",
            Stage::Score => "score",
            Stage::SelectInitial => "select_initial",
            Stage::DiversityPenalize => "diversity_penalize",
            Stage::RescoreSort => "rescore_sort",
            Stage::SelectFinal => "select_final",
            Stage::Done => "done",
        }
    }

    /// Coarse completion percentage reported when the stage begins.
    pub fn progress_percent(&self) -> u8 {
        match self {
            Stage::Init => 0,
            Stage::Segment => 5,
            Stage::Analyze => 15,
            Stage::Score => 55,
            Stage::SelectInitial => 65,
            Stage::DiversityPenalize => 75,
            Stage::RescoreSort => 85,
            Stage::SelectFinal => 90,
            Stage::Done => 100,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Fatal pipeline errors.
///
/// `UnreadableInput` and `SelectionEmpty` are deliberately distinct variants:
/// the former means "bad file", the latter "no highlight-worthy content".
/// Recoverable conditions (per-segment decode failures, missing audio,
/// signal provider outages) never surface here; they degrade to zeroed or
/// unavailable features inside the run.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("[{stage}] unreadable input: {message}")]
    UnreadableInput { stage: Stage, message: String },

    #[error("[{stage}] invalid configuration: {message}")]
    Config { stage: Stage, message: String },

    #[error("[{stage}] no candidate segments produced")]
    NoSegments { stage: Stage },

    #[error("[{stage}] no segments qualified after both selection passes")]
    SelectionEmpty { stage: Stage },

    #[error("[{stage}] cancelled")]
    Cancelled { stage: Stage },
}

impl EngineError {
    pub fn unreadable_input(stage: Stage, message: impl Into<String>) -> Self {
        Self::UnreadableInput {
            stage,
            message: message.into(),
        }
    }

    pub fn config(stage: Stage, message: impl Into<String>) -> Self {
        Self::Config {
            stage,
            message: message.into(),
        }
    }

    /// The stage at which the error occurred.
    pub fn stage(&self) -> Stage {
        match self {
            EngineError::UnreadableInput { stage, .. }
            | EngineError::Config { stage, .. }
            | EngineError::NoSegments { stage }
            | EngineError::SelectionEmpty { stage }
            | EngineError::Cancelled { stage } => *stage,
        }
    }

    /// Whether this is the "no highlight-worthy content" outcome.
    pub fn is_selection_empty(&self) -> bool {
        matches!(self, EngineError::SelectionEmpty { .. })
    }

    /// Whether this is the "bad file" outcome.
    pub fn is_unreadable_input(&self) -> bool {
        matches!(self, EngineError::UnreadableInput { .. })
    }
}
