//! Turn controller states

use serde::{Deserialize, Serialize};

/// State of the turn controller within a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnState {
    /// Awaiting a completion
    Requesting,

    /// Running tools from the last completion
    Dispatching,

    /// Switching the active agent
    Handoff,

    /// Terminal
    Done,
}

impl TurnState {
    /// Check if the controller has finished
    pub fn is_terminal(&self) -> bool {
        matches!(self, TurnState::Done)
    }
}

impl Default for TurnState {
    fn default() -> Self {
        TurnState::Requesting
    }
}

impl std::fmt::Display for TurnState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TurnState::Requesting => write!(f, "Requesting"),
            TurnState::Dispatching => write!(f, "Dispatching"),
            TurnState::Handoff => write!(f, "Handoff"),
            TurnState::Done => write!(f, "Done"),
        }
    }
}

/// Why a run stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The last completion requested no tools
    NoToolCalls,
    /// Tool execution was disabled by the caller
    ToolsDisabled,
    /// The turn budget was exhausted
    MaxTurns,
    /// The model declared its final step (step-wise mode)
    FinalStep,
}
