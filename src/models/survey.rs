use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{AppError, AppResult};

/// Raw survey answers keyed by question ("q1" → "A")
pub type Answers = BTreeMap<String, String>;

/// Survey payload: one single-letter choice for each of the seven questions
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SurveySubmission {
    pub q1: String,
    pub q2: String,
    pub q3: String,
    pub q4: String,
    pub q5: String,
    pub q6: String,
    pub q7: String,
}

impl SurveySubmission {
    fn pairs(&self) -> [(&'static str, &str); 7] {
        [
            ("q1", &self.q1),
            ("q2", &self.q2),
            ("q3", &self.q3),
            ("q4", &self.q4),
            ("q5", &self.q5),
            ("q6", &self.q6),
            ("q7", &self.q7),
        ]
    }

    /// Checks that every answer is exactly one character and returns the
    /// answer set. Letters outside a question's options are not rejected
    /// here; the profile builder ignores them.
    pub fn into_answers(self) -> AppResult<Answers> {
        let mut answers = Answers::new();
        for (question, choice) in self.pairs() {
            if choice.chars().count() != 1 {
                return Err(AppError::InvalidInput(format!(
                    "Answer to {} must be a single letter",
                    question
                )));
            }
            answers.insert(question.to_string(), choice.to_string());
        }
        Ok(answers)
    }
}

/// One ranked destination returned to the client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub name: String,
    pub description: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
    pub score: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveyResult {
    pub recommendations: Vec<Recommendation>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyStats {
    pub survey_calls: i64,
}
