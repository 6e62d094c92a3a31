//! Agent value objects - identifiers and scores shared by every phase.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Identifier of a registered agent.
///
/// The literal `all` is reserved: it is the executor sentinel meaning
/// "every step goes to the agent named as its actor" and can never be
/// used as an agent id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(String);

impl AgentId {
    /// Reserved id for collaborative execution.
    pub const ALL: &'static str = "all";

    /// Creates an AgentId from an existing string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this id collides with the collaborative executor sentinel.
    pub fn is_reserved(&self) -> bool {
        self.0.eq_ignore_ascii_case(Self::ALL)
    }
}

impl<T: Into<String>> From<T> for AgentId {
    fn from(s: T) -> Self {
        Self::new(s)
    }
}

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Confidence score of a response or proposal.
///
/// Always within `[0.0, 1.0]`: out-of-range inputs are clamped, `NaN`
/// becomes `0.0` and `-0.0` becomes `0.0`. Comparison uses [`f64::total_cmp`], so scores form a
/// total order and can be used directly as a sort key.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub struct Confidence(f64);

impl Confidence {
    pub const MIN: Confidence = Confidence(0.0);
    pub const MAX: Confidence = Confidence(1.0);

    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            Self(0.0)
        } else {
            // Adding 0.0 turns -0.0 into +0.0, which total_cmp would order apart
            Self(value.clamp(0.0, 1.0) + 0.0)
        }
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl From<f64> for Confidence {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl From<Confidence> for f64 {
    fn from(confidence: Confidence) -> Self {
        confidence.0
    }
}

impl PartialEq for Confidence {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Confidence {}

impl PartialOrd for Confidence {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Confidence {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_id_reserved() {
        assert!(AgentId::new("all").is_reserved());
        assert!(AgentId::new("ALL").is_reserved());
        assert!(!AgentId::new("planner").is_reserved());
    }

    #[test]
    fn test_agent_id_serializes_as_string() {
        let json = serde_json::to_string(&AgentId::new("planner")).unwrap();
        assert_eq!(json, "\"planner\"");
    }

    #[test]
    fn test_confidence_clamps() {
        assert_eq!(Confidence::new(1.7).value(), 1.0);
        assert_eq!(Confidence::new(-0.2).value(), 0.0);
        assert_eq!(Confidence::new(f64::NAN).value(), 0.0);
        assert_eq!(Confidence::new(0.75).value(), 0.75);
    }

    #[test]
    fn test_confidence_negative_zero_equals_zero() {
        let negative = Confidence::new(-0.0);
        assert!(negative.value().is_sign_positive());
        assert_eq!(negative, Confidence::new(0.0));
        assert_eq!(negative.cmp(&Confidence::MIN), Ordering::Equal);
    }

    #[test]
    fn test_confidence_total_order() {
        let mut scores = vec![
            Confidence::new(0.75),
            Confidence::new(0.9),
            Confidence::new(0.1),
        ];
        scores.sort();
        assert_eq!(scores.last().unwrap().value(), 0.9);
        assert_eq!(Confidence::new(0.9), Confidence::new(0.9));
        assert!(Confidence::new(0.9) > Confidence::new(0.75));
    }

    #[test]
    fn test_confidence_deserialize_clamps() {
        let confidence: Confidence = serde_json::from_str("3.5").unwrap();
        assert_eq!(confidence, Confidence::MAX);
    }

    #[test]
    fn test_confidence_display() {
        assert_eq!(Confidence::new(0.8).to_string(), "0.80");
    }
}
