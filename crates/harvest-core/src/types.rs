use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// TaskStatus
// ---------------------------------------------------------------------------

/// Task status. Any status may be set from any other; there are no
/// transition rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    Doing,
    Done,
}

impl TaskStatus {
    pub fn all() -> &'static [TaskStatus] {
        &[TaskStatus::Pending, TaskStatus::Doing, TaskStatus::Done]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Doing => "doing",
            TaskStatus::Done => "done",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = crate::error::HarvestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(TaskStatus::Pending),
            "doing" => Ok(TaskStatus::Doing),
            "done" => Ok(TaskStatus::Done),
            _ => Err(crate::error::HarvestError::InvalidStatus(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Program
// ---------------------------------------------------------------------------

/// Nutrient program the advisor gives instructions for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Program {
    #[default]
    Athena,
    RawNpk,
}

impl Program {
    pub fn all() -> &'static [Program] {
        &[Program::Athena, Program::RawNpk]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Program::Athena => "athena",
            Program::RawNpk => "raw_npk",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Program::Athena => "Athena",
            Program::RawNpk => "RAW NPK Sauce",
        }
    }

    /// Phrase used when briefing the language model.
    pub fn description(self) -> &'static str {
        match self {
            Program::Athena => "Athena Bloom A and B nutrient system",
            Program::RawNpk => {
                "RAW NPK or salt-based formulation (e.g., CaNO3, KNO3, KH2PO4, MgSO4)"
            }
        }
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Program {
    type Err = crate::error::HarvestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "athena" => Ok(Program::Athena),
            "raw_npk" | "raw-npk" | "raw npk" | "raw npk sauce" | "raw" => Ok(Program::RawNpk),
            _ => Err(crate::error::HarvestError::InvalidProgram(s.to_string())),
        }
    }
}
