//! Confidence buckets used for styling.

use serde::{Deserialize, Serialize};

/// Styling bucket for a confidence score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}

impl ConfidenceLevel {
    /// Lower bound (inclusive) of the high bucket.
    pub const HIGH_THRESHOLD: f64 = 0.7;
    /// Lower bound (inclusive) of the medium bucket.
    pub const MEDIUM_THRESHOLD: f64 = 0.5;

    pub fn from_confidence(confidence: f64) -> Self {
        if confidence >= Self::HIGH_THRESHOLD {
            ConfidenceLevel::High
        } else if confidence >= Self::MEDIUM_THRESHOLD {
            ConfidenceLevel::Medium
        } else {
            ConfidenceLevel::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceLevel::High => "high",
            ConfidenceLevel::Medium => "medium",
            ConfidenceLevel::Low => "low",
        }
    }

    /// Text colour class for the score.
    pub fn text_class(&self) -> &'static str {
        match self {
            ConfidenceLevel::High => "text-green-600",
            ConfidenceLevel::Medium => "text-yellow-600",
            ConfidenceLevel::Low => "text-red-600",
        }
    }

    /// Badge background and text classes for the score.
    pub fn badge_class(&self) -> &'static str {
        match self {
            ConfidenceLevel::High => "bg-green-100 text-green-800",
            ConfidenceLevel::Medium => "bg-yellow-100 text-yellow-800",
            ConfidenceLevel::Low => "bg-red-100 text-red-800",
        }
    }
}

impl std::fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<f64> for ConfidenceLevel {
    fn from(confidence: f64) -> Self {
        Self::from_confidence(confidence)
    }
}

pub fn confidence_text_class(confidence: f64) -> &'static str {
    ConfidenceLevel::from_confidence(confidence).text_class()
}

pub fn confidence_badge_class(confidence: f64) -> &'static str {
    ConfidenceLevel::from_confidence(confidence).badge_class()
}

/// Renders a score as a whole percentage, e.g. `58%`.
pub fn confidence_percent(confidence: f64) -> String {
    format!("{}%", (confidence * 100.0).round() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buckets() {
        assert_eq!(ConfidenceLevel::from(0.75), ConfidenceLevel::High);
        assert_eq!(ConfidenceLevel::from(0.55), ConfidenceLevel::Medium);
        assert_eq!(ConfidenceLevel::from(0.2), ConfidenceLevel::Low);
    }

    #[test]
    fn test_boundaries_inclusive_upward() {
        assert_eq!(ConfidenceLevel::from(0.7), ConfidenceLevel::High);
        assert_eq!(ConfidenceLevel::from(0.5), ConfidenceLevel::Medium);
        assert_eq!(ConfidenceLevel::from(0.6999), ConfidenceLevel::Medium);
        assert_eq!(ConfidenceLevel::from(0.4999), ConfidenceLevel::Low);
    }

    #[test]
    fn test_classes() {
        assert_eq!(confidence_text_class(0.9), "text-green-600");
        assert_eq!(confidence_badge_class(0.55), "bg-yellow-100 text-yellow-800");
        assert_eq!(confidence_text_class(0.1), "text-red-600");
    }

    #[test]
    fn test_percent() {
        assert_eq!(confidence_percent(0.5770725011825562), "58%");
        assert_eq!(confidence_percent(1.0), "100%");
        assert_eq!(confidence_percent(0.0), "0%");
    }
}
