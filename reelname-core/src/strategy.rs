use serde::{Deserialize, Serialize};

/// How naming conflicts in a plan are resolved.
///
/// Every strategy except [`ConflictStrategy::PromptUser`] is applied
/// synchronously by the resolver. `PromptUser` leaves conflicts open so an
/// interactive frontend can pick a strategy per conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictStrategy {
    /// Skip every change involved in the conflict.
    Skip,
    /// Keep the first change, renumber the others: `Name (1).mkv`.
    #[default]
    AppendNumber,
    /// Keep the first change, suffix the others with a timestamp.
    AppendTimestamp,
    /// Keep the first change, skip the others; existing targets are overwritten.
    Overwrite,
    /// Leave the conflict unresolved for an interactive decision.
    PromptUser,
}

/// All strategy variants in display order.
const ALL_STRATEGIES: &[ConflictStrategy] = &[
    ConflictStrategy::Skip,
    ConflictStrategy::AppendNumber,
    ConflictStrategy::AppendTimestamp,
    ConflictStrategy::Overwrite,
    ConflictStrategy::PromptUser,
];

impl ConflictStrategy {
    /// Canonical name used in settings files, CLI flags and resolution records.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Skip => "skip",
            Self::AppendNumber => "append_number",
            Self::AppendTimestamp => "append_timestamp",
            Self::Overwrite => "overwrite",
            Self::PromptUser => "prompt_user",
        }
    }

    /// All accepted spellings for this strategy (case-insensitive matching).
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            Self::Skip => &["skip"],
            Self::AppendNumber => &["append_number", "append-number", "number"],
            Self::AppendTimestamp => &["append_timestamp", "append-timestamp", "timestamp"],
            Self::Overwrite => &["overwrite"],
            Self::PromptUser => &["prompt_user", "prompt-user", "prompt"],
        }
    }

    /// Whether the resolver can apply this strategy without user input.
    pub fn is_automatic(&self) -> bool {
        !matches!(self, Self::PromptUser)
    }

    pub fn all() -> &'static [ConflictStrategy] {
        ALL_STRATEGIES
    }
}

impl std::fmt::Display for ConflictStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Error returned when a string cannot be parsed into a `ConflictStrategy`.
#[derive(Debug, Clone)]
pub struct StrategyParseError(pub String);

impl std::fmt::Display for StrategyParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unknown conflict strategy '{}' (expected one of: skip, append_number, append_timestamp, overwrite, prompt_user)",
            self.0
        )
    }
}

impl std::error::Error for StrategyParseError {}

impl std::str::FromStr for ConflictStrategy {
    type Err = StrategyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        ALL_STRATEGIES
            .iter()
            .copied()
            .find(|strategy| strategy.aliases().contains(&lower.as_str()))
            .ok_or_else(|| StrategyParseError(s.to_string()))
    }
}

#[cfg(test)]
#[path = "tests/strategy_tests.rs"]
mod tests;
