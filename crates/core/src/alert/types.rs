//! Budget alert types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The budget condition an alert reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    /// Spending reached the warning threshold (80%).
    ThresholdWarning,
    /// Spending reached the critical threshold (95%).
    ThresholdCritical,
    /// Spending strictly exceeds the budget.
    OverBudget,
}

impl AlertType {
    /// Returns the string representation of the alert type.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ThresholdWarning => "threshold_warning",
            Self::ThresholdCritical => "threshold_critical",
            Self::OverBudget => "over_budget",
        }
    }

    /// Parses an alert type from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "threshold_warning" => Some(Self::ThresholdWarning),
            "threshold_critical" => Some(Self::ThresholdCritical),
            "over_budget" => Some(Self::OverBudget),
            _ => None,
        }
    }

    /// Severity carried by alerts of this type.
    #[must_use]
    pub const fn severity(&self) -> AlertSeverity {
        match self {
            Self::ThresholdWarning => AlertSeverity::Warning,
            Self::ThresholdCritical | Self::OverBudget => AlertSeverity::Critical,
        }
    }
}

impl fmt::Display for AlertType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Alert severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    /// Attention recommended.
    Warning,
    /// Immediate attention required.
    Critical,
}

impl AlertSeverity {
    /// Returns the string representation of the severity.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Warning => "warning",
            Self::Critical => "critical",
        }
    }
}

/// Lifecycle status of a persisted alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertStatus {
    /// Raised and not yet seen.
    Active,
    /// Seen but not yet addressed. Still suppresses duplicates.
    Acknowledged,
    /// Addressed; a recurrence raises a fresh alert.
    Resolved,
}

impl AlertStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Acknowledged => "acknowledged",
            Self::Resolved => "resolved",
        }
    }

    /// Whether an alert in this status suppresses a new alert of the
    /// same type.
    #[must_use]
    pub const fn is_unresolved(&self) -> bool {
        matches!(self, Self::Active | Self::Acknowledged)
    }
}

/// A budget alert candidate produced by variance evaluation, before
/// persistence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertDraft {
    /// The condition detected.
    pub alert_type: AlertType,
    /// Severity of the condition.
    pub severity: AlertSeverity,
    /// Human-readable description.
    pub message: String,
}
