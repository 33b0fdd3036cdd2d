//! Prompt construction and best-effort parsing of the model's reply.
//!
//! The reply is expected to follow the three-line layout requested by
//! [`build_prompt`]:
//!
//! ```text
//! Interpretation: <text>
//! Emotion: <text>
//! Confidence: <number>
//! ```
//!
//! Parsing never fails. Whatever cannot be recovered falls back to
//! [`DEFAULT_EMOTION`] and [`DEFAULT_CONFIDENCE`].

pub const DEFAULT_EMOTION: &str = "Unknown";
pub const DEFAULT_CONFIDENCE: f64 = 0.5;
pub const NO_INTERPRETATION: &str = "No interpretation available.";

const INTERPRETATION_MARKER: &str = "Interpretation:";
const EMOTION_MARKER: &str = "Emotion:";
const CONFIDENCE_MARKER: &str = "Confidence:";

#[derive(Debug, Clone, PartialEq)]
pub struct Interpretation {
    pub interpretation: String,
    pub emotion: String,
    pub confidence: f64,
}

pub fn build_prompt(dream_text: &str) -> String {
    format!(
        "You are an AI dream interpreter. Please interpret this dream:\n\
         {}\n\n\
         Also, analyze the primary emotion behind this dream \
         and provide a confidence score between 0 and 1.\n\n\
         Format your response like this:\n\
         Interpretation: [Your interpretation]\n\
         Emotion: [Primary emotion]\n\
         Confidence: [A number between 0 and 1]",
        dream_text
    )
}

/// Segment between the first occurrence of `marker` and the next one (or the
/// end of the text), plus everything before the first occurrence.
fn split_at_marker<'a>(text: &'a str, marker: &str) -> Option<(&'a str, &'a str)> {
    let (before, rest) = text.split_once(marker)?;
    let segment = rest.split(marker).next().unwrap_or(rest);
    Some((before, segment))
}

fn parse_confidence(segment: &str) -> Option<f64> {
    segment.trim().parse::<f64>().ok().filter(|c| c.is_finite())
}

pub fn parse_interpretation(raw: &str) -> Interpretation {
    let text = raw.trim();
    if text.is_empty() {
        return Interpretation {
            interpretation: NO_INTERPRETATION.to_string(),
            emotion: DEFAULT_EMOTION.to_string(),
            confidence: DEFAULT_CONFIDENCE,
        };
    }

    let Some((head, emotion_segment)) = split_at_marker(text, EMOTION_MARKER) else {
        return Interpretation {
            interpretation: text.to_string(),
            emotion: DEFAULT_EMOTION.to_string(),
            confidence: DEFAULT_CONFIDENCE,
        };
    };

    let head = head.trim();
    let interpretation = head
        .strip_prefix(INTERPRETATION_MARKER)
        .unwrap_or(head)
        .trim()
        .to_string();

    let (emotion, confidence) = match split_at_marker(emotion_segment, CONFIDENCE_MARKER) {
        Some((emotion, confidence)) => (emotion, parse_confidence(confidence)),
        None => (emotion_segment, None),
    };

    Interpretation {
        interpretation,
        emotion: emotion.trim().to_string(),
        confidence: confidence.unwrap_or(DEFAULT_CONFIDENCE),
    }
}
