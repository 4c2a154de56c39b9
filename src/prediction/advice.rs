//! Sectioning of advice text.
//!
//! Advice arrives as one string with `TREATMENT:`, `PREVENTION:` and
//! `ADDITIONAL INFORMATION:` markers. Each section runs from its marker to
//! the next marker that may follow it, or to the end of the text.

use serde::{Deserialize, Serialize};

pub const TREATMENT_MARKER: &str = "TREATMENT:";
pub const PREVENTION_MARKER: &str = "PREVENTION:";
pub const ADDITIONAL_MARKER: &str = "ADDITIONAL INFORMATION:";

/// Placeholder that means the additional section carries nothing.
const NO_ADDITIONAL: &str = "No additional information was provided";

/// Advice split into its sections.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdviceSections {
    pub treatment: String,
    pub prevention: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional: Option<String>,
}

impl AdviceSections {
    /// Rebuilds a marker-delimited advice string.
    pub fn to_advice_text(&self) -> String {
        let mut text = format!(
            "{} {}\n{} {}",
            TREATMENT_MARKER, self.treatment, PREVENTION_MARKER, self.prevention
        );
        if let Some(additional) = &self.additional {
            text.push('\n');
            text.push_str(ADDITIONAL_MARKER);
            text.push(' ');
            text.push_str(additional);
        }
        text
    }
}

/// Splits advice text into treatment, prevention and additional sections.
///
/// Missing sections come back empty. The additional section is dropped when
/// it is empty or only states that nothing was provided.
pub fn parse_advice(advice: &str) -> AdviceSections {
    let treatment = section(advice, TREATMENT_MARKER, Some(PREVENTION_MARKER)).unwrap_or_default();
    let prevention =
        section(advice, PREVENTION_MARKER, Some(ADDITIONAL_MARKER)).unwrap_or_default();
    let additional = section(advice, ADDITIONAL_MARKER, None)
        .filter(|text| !text.is_empty() && !text.contains(NO_ADDITIONAL));

    AdviceSections {
        treatment,
        prevention,
        additional,
    }
}

fn section(advice: &str, marker: &str, terminator: Option<&str>) -> Option<String> {
    let start = advice.find(marker)? + marker.len();
    let rest = &advice[start..];
    let body = match terminator.and_then(|t| rest.find(t)) {
        Some(end) => &rest[..end],
        None => rest,
    };
    Some(body.trim().to_string())
}

/// One display line of an advice section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdviceLine {
    Heading(String),
    /// Bullet item; depth 1 is top level.
    Bullet { depth: u8, text: String },
    /// A bare `**` separator line.
    Rule,
    Blank,
    Paragraph(String),
}

/// Classifies each line of an advice section for display.
pub fn advice_lines(section: &str) -> Vec<AdviceLine> {
    section.split('\n').map(classify_line).collect()
}

fn classify_line(line: &str) -> AdviceLine {
    const BULLETS: [(&str, &str, u8); 3] = [
        ("*   ", "-   ", 1),
        ("    *   ", "    -   ", 2),
        ("        *   ", "        -   ", 3),
    ];

    if line.starts_with('#') {
        return AdviceLine::Heading(line.trim_start_matches('#').trim_start().to_string());
    }
    for (star, dash, depth) in BULLETS {
        if line.starts_with(star) || line.starts_with(dash) {
            let text = line.trim_start()[1..].trim_start().to_string();
            return AdviceLine::Bullet { depth, text };
        }
    }
    if line == "**" {
        AdviceLine::Rule
    } else if line.trim().is_empty() {
        AdviceLine::Blank
    } else {
        AdviceLine::Paragraph(line.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const SAMPLE: &str = "TREATMENT:\n**\n\nRemove infected leaves.\n\n*   **Pruning:** cut low.\n    *   Burn them.\n\n**\n\nPREVENTION:\n**\n\n*   **Crop Rotation:** rotate yearly.\n\nADDITIONAL INFORMATION:\nNo additional information was provided.";

    #[test]
    fn test_sections_with_placeholder_additional() {
        let sections = parse_advice(SAMPLE);

        assert!(sections.treatment.starts_with("**\n\nRemove infected leaves."));
        assert!(sections.treatment.ends_with("**"));
        assert!(!sections.treatment.contains("PREVENTION"));
        assert!(sections.prevention.contains("Crop Rotation"));
        assert!(!sections.prevention.contains("ADDITIONAL"));
        assert_eq!(sections.additional, None);
    }

    #[test]
    fn test_additional_kept_when_present() {
        let sections =
            parse_advice("TREATMENT: a\nPREVENTION: b\nADDITIONAL INFORMATION:\n  Water at dawn. ");
        assert_eq!(sections.additional.as_deref(), Some("Water at dawn."));
    }

    #[test]
    fn test_empty_additional_dropped() {
        let sections = parse_advice("TREATMENT: a\nPREVENTION: b\nADDITIONAL INFORMATION:   ");
        assert_eq!(sections.additional, None);
    }

    #[test]
    fn test_missing_markers() {
        let sections = parse_advice("Keep the soil dry.");
        assert_eq!(sections, AdviceSections::default());
    }

    #[test]
    fn test_treatment_without_prevention_runs_to_end() {
        let sections = parse_advice("TREATMENT: spray copper\nADDITIONAL INFORMATION: x");
        assert_eq!(sections.treatment, "spray copper\nADDITIONAL INFORMATION: x");
        assert_eq!(sections.prevention, "");
        assert_eq!(sections.additional.as_deref(), Some("x"));
    }

    #[test]
    fn test_reparse_segmented_text() {
        let sections = parse_advice("TREATMENT: prune\nPREVENTION: space plants");
        assert_eq!(sections.treatment, "prune");
        assert_eq!(sections.prevention, "space plants");
        assert_eq!(parse_advice(&sections.to_advice_text()), sections);
    }

    #[test]
    fn test_advice_lines() {
        let lines = advice_lines("## Organic\n*   **Pruning:** cut\n    -   burn\n        *   deep\n**\n\nplain");
        assert_eq!(
            lines,
            vec![
                AdviceLine::Heading("Organic".into()),
                AdviceLine::Bullet { depth: 1, text: "**Pruning:** cut".into() },
                AdviceLine::Bullet { depth: 2, text: "burn".into() },
                AdviceLine::Bullet { depth: 3, text: "deep".into() },
                AdviceLine::Rule,
                AdviceLine::Blank,
                AdviceLine::Paragraph("plain".into()),
            ]
        );
    }

    fn section_text() -> impl Strategy<Value = String> {
        "[a-z][a-z .,]{0,30}[a-z]"
    }

    proptest! {
        #[test]
        fn prop_reparse_recovers_sections(t in section_text(), p in section_text()) {
            let text = format!("TREATMENT: {}\nPREVENTION: {}", t, p);
            let sections = parse_advice(&text);
            prop_assert_eq!(&sections.treatment, &t);
            prop_assert_eq!(&sections.prevention, &p);
            prop_assert_eq!(parse_advice(&sections.to_advice_text()), sections);
        }
    }
}
