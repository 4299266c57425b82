//! Section parsing of free-form model output
//!
//! Models are asked for labeled ANSWER / KEY POINTS / CONFIDENCE / SOURCES
//! sections, but the reply is still free text. This is a best-effort line
//! scan: the active section switches on header keywords or numeric
//! prefixes, bullet characters are stripped from key-point lines, and when
//! no sections are recognized the whole text becomes the answer with the
//! first sentences promoted to key points. The returned answer is never
//! empty for non-empty input.

use crate::types::ConfidenceLevel;

/// Characters stripped from the front of key-point lines
const BULLET_CHARS: &[char] = &[
    '\u{2022}', '-', '*', '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', '.', ' ',
];

/// Maximum number of key points kept from a single response
pub const MAX_KEY_POINTS: usize = 5;

/// Structured sections extracted from a model's free-text response
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedSections {
    /// The answer text; whole response when no sections were recognized
    pub answer: String,
    /// Cleaned key-point lines, at most [`MAX_KEY_POINTS`]
    pub key_points: Vec<String>,
    /// Stated confidence, defaulting to medium
    pub confidence: ConfidenceLevel,
    /// URL-looking lines from the sources section
    pub sources: Option<Vec<String>>,
}

#[derive(Clone, Copy, PartialEq)]
enum Section {
    None,
    Answer,
    KeyPoints,
    Sources,
}

/// Parse a model's response text into its labeled sections
pub fn parse_research_text(text: &str) -> ParsedSections {
    let mut answer_lines: Vec<&str> = Vec::new();
    let mut key_points: Vec<String> = Vec::new();
    let mut confidence = ConfidenceLevel::Medium;
    let mut sources: Vec<String> = Vec::new();

    let mut section = Section::None;

    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        let upper = line.to_uppercase();
        if upper.contains("ANSWER") || line.starts_with("1.") {
            section = Section::Answer;
            continue;
        } else if upper.contains("KEY POINT") || line.starts_with("2.") {
            section = Section::KeyPoints;
            continue;
        } else if upper.contains("CONFIDENCE") || line.starts_with("3.") {
            // Confidence lives on the header line itself; scan most
            // specific label first so "high" does not shadow "very_high".
            let lower = line.to_lowercase();
            for level in [
                ConfidenceLevel::VeryHigh,
                ConfidenceLevel::High,
                ConfidenceLevel::Medium,
                ConfidenceLevel::Low,
            ] {
                let label = level.as_str();
                if lower.contains(&label.replace('_', " ")) || lower.contains(label) {
                    confidence = level;
                    break;
                }
            }
            section = Section::None;
            continue;
        } else if upper.contains("SOURCE") || line.starts_with("4.") {
            section = Section::Sources;
            continue;
        }

        match section {
            Section::Answer => answer_lines.push(line),
            Section::KeyPoints => {
                let cleaned = line.trim_start_matches(BULLET_CHARS);
                if !cleaned.is_empty() {
                    key_points.push(cleaned.to_string());
                }
            }
            Section::Sources => {
                if line.starts_with("http") || line.contains("www.") {
                    sources.push(line.to_string());
                }
            }
            Section::None => {}
        }
    }

    let mut answer = answer_lines.join(" ").trim().to_string();

    // No sections recognized: the whole response is the answer
    if answer.is_empty() {
        answer = text.trim().to_string();
    }

    // Still nothing to work with from a sectioned reply that carried only
    // key points; the non-empty-answer invariant wins
    if answer.is_empty() {
        answer = text.to_string();
    }

    if key_points.is_empty() {
        key_points = first_sentences(&answer, 3);
    }
    key_points.truncate(MAX_KEY_POINTS);

    ParsedSections {
        answer,
        key_points,
        confidence,
        sources: if sources.is_empty() { None } else { Some(sources) },
    }
}

/// First `count` sentences of a text, each re-terminated with a period
fn first_sentences(text: &str, count: usize) -> Vec<String> {
    text.split('.')
        .take(count)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| format!("{s}."))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECTIONED: &str = "\
1. ANSWER: \n\
Regular exercise improves cardiovascular health and mood.\n\
It also supports weight management.\n\
\n\
2. KEY POINTS:\n\
- Improves cardiovascular health\n\
* Boosts mood\n\
3) Supports weight management\n\
\n\
3. CONFIDENCE: very_high\n\
\n\
4. SOURCES:\n\
https://example.com/exercise-study\n\
not a url\n";

    #[test]
    fn test_sectioned_response_parses_all_fields() {
        let parsed = parse_research_text(SECTIONED);
        assert_eq!(
            parsed.answer,
            "Regular exercise improves cardiovascular health and mood. \
             It also supports weight management."
        );
        assert_eq!(
            parsed.key_points,
            vec![
                "Improves cardiovascular health",
                "Boosts mood",
                ") Supports weight management",
            ]
        );
        assert_eq!(parsed.confidence, ConfidenceLevel::VeryHigh);
        assert_eq!(
            parsed.sources,
            Some(vec!["https://example.com/exercise-study".to_string()])
        );
    }

    #[test]
    fn test_very_high_not_shadowed_by_high() {
        let parsed = parse_research_text("CONFIDENCE: very high\nANSWER:\nYes.");
        assert_eq!(parsed.confidence, ConfidenceLevel::VeryHigh);
    }

    #[test]
    fn test_unsectioned_text_falls_back_to_whole_answer() {
        let text = "Exercise is good for you. It helps the heart. It lifts mood. \
                    It also builds strength over time.";
        let parsed = parse_research_text(text);
        assert_eq!(parsed.answer, text);
        assert_eq!(
            parsed.key_points,
            vec![
                "Exercise is good for you.",
                "It helps the heart.",
                "It lifts mood.",
            ]
        );
        assert_eq!(parsed.confidence, ConfidenceLevel::Medium);
        assert_eq!(parsed.sources, None);
    }

    #[test]
    fn test_key_points_capped_at_five() {
        let text = "2. KEY POINTS:\n- a1\n- b2\n- c3\n- d4\n- e5\n- f6\n- g7\n";
        let parsed = parse_research_text(text);
        assert_eq!(parsed.key_points.len(), 5);
        assert_eq!(parsed.key_points[0], "a1");
    }

    #[test]
    fn test_answer_never_empty_for_nonempty_input() {
        let parsed = parse_research_text("just one line with no headers");
        assert!(!parsed.answer.is_empty());
        assert!(!parsed.key_points.is_empty());
    }
}
