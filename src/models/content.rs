use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Analysis returned by the backend's text analyzer.
///
/// Every field is required; a response missing any of them is treated as
/// malformed rather than partially rendered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextAnalysis {
    pub reading_level: String,
    pub complexity_score: f64,
    pub key_topics: Vec<String>,
    pub estimated_reading_time: u32,
    pub recommendations: Vec<String>,
}

/// Why the local approximation was used instead of a backend analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    Unreachable,
    ServerStatus(u16),
    MalformedResponse,
}

/// Degraded analysis computed on the client when the backend is unavailable.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalAnalysis {
    pub word_count: usize,
    pub sentence_count: usize,
    pub reading_time_minutes: usize,
    pub reading_level: &'static str,
    pub difficulty: &'static str,
    pub tips: Vec<&'static str>,
    pub reason: FallbackReason,
}

/// Contents of the analysis slot.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisResult {
    Remote(TextAnalysis),
    Local(LocalAnalysis),
}

impl AnalysisResult {
    pub fn is_fallback(&self) -> bool {
        matches!(self, AnalysisResult::Local(_))
    }

    pub fn remote(&self) -> Option<&TextAnalysis> {
        match self {
            AnalysisResult::Remote(analysis) => Some(analysis),
            AnalysisResult::Local(_) => None,
        }
    }

    pub fn local(&self) -> Option<&LocalAnalysis> {
        match self {
            AnalysisResult::Local(analysis) => Some(analysis),
            AnalysisResult::Remote(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flashcard {
    pub question: String,
    pub answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    #[serde(rename = "correct_answer")]
    pub correct_index: usize,
    pub explanation: String,
}

impl QuizQuestion {
    /// Check the invariants serde cannot express.
    pub fn validate(&self) -> Result<(), String> {
        if self.options.is_empty() {
            return Err("question has no options".to_string());
        }
        if self.correct_index >= self.options.len() {
            return Err(format!(
                "correct answer {} is outside {} options",
                self.correct_index,
                self.options.len()
            ));
        }
        Ok(())
    }
}

/// One completed learning activity from the learner's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressEntry {
    pub activity_type: String,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub duration: Option<u32>,
    pub completed_at: String,
}

/// Report-card analysis payload. Its shape is owned by the backend, so it is
/// kept as a JSON object.
pub type ReportCardAnalysis = Map<String, Value>;

/// Parsed syllabus payload, also backend-defined.
pub type SyllabusData = Map<String, Value>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quiz_question_wire_name() {
        let json = r#"{"question":"2+2?","options":["3","4"],"correct_answer":1,"explanation":"Basic sums"}"#;
        let question: QuizQuestion = serde_json::from_str(json).unwrap();
        assert_eq!(question.correct_index, 1);
        assert!(question.validate().is_ok());
    }

    #[test]
    fn test_quiz_question_validation() {
        let mut question = QuizQuestion {
            question: "Pick one".to_string(),
            options: vec!["a".to_string()],
            correct_index: 1,
            explanation: String::new(),
        };
        assert!(question.validate().is_err());

        question.options.clear();
        question.correct_index = 0;
        assert_eq!(question.validate().unwrap_err(), "question has no options");
    }

    #[test]
    fn test_flashcard_hint_is_optional() {
        let card: Flashcard =
            serde_json::from_str(r#"{"id":0,"question":"Q","answer":"A"}"#).unwrap();
        assert_eq!(card.hint, None);
    }

    #[test]
    fn test_text_analysis_requires_every_field() {
        let partial = r#"{"reading_level":"Advanced","complexity_score":6}"#;
        assert!(serde_json::from_str::<TextAnalysis>(partial).is_err());
    }
}
