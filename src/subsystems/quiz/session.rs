//! Quiz session state machine — pure per-chat state, no I/O.
//!
//! Lifecycle is strictly create → accumulate answers → finalize-and-drop.
//! The owning [`QuizService`](super::QuizService) removes the session the
//! moment the last answer is recorded; a finished session never lingers.

use crate::vocab::{Direction, WordPair};

/// One question: what is shown and what is accepted.
#[derive(Debug, Clone)]
pub struct Question {
    pub prompt: String,
    pub expected: String,
}

/// Per-question entry in a finished summary, in presentation order.
#[derive(Debug, Clone)]
pub struct QuestionResult {
    pub prompt: String,
    pub expected: String,
    pub passed: bool,
}

/// Scored result of a completed session.
#[derive(Debug, Clone)]
pub struct QuizSummary {
    pub correct: usize,
    pub total: usize,
    pub questions: Vec<QuestionResult>,
}

/// Live state of one quiz for one chat.
#[derive(Debug)]
pub struct QuizSession {
    direction: Direction,
    questions: Vec<Question>,
    results: Vec<bool>,
}

impl QuizSession {
    /// Build a session from sampled pairs, all questions sharing `direction`.
    pub fn new(pairs: &[WordPair], direction: Direction) -> Self {
        let questions = pairs
            .iter()
            .map(|pair| Question {
                prompt: direction.prompt(pair).to_string(),
                expected: direction.expected(pair).to_string(),
            })
            .collect();
        Self { direction, questions, results: Vec::new() }
    }

    /// The message presented when the session starts: all prompts, numbered.
    pub fn prompt_message(&self) -> String {
        let mut message = format!(
            "🔍 Translate these {} words into {}:\n\n",
            self.questions.len(),
            self.direction.answer_language()
        );
        for (idx, question) in self.questions.iter().enumerate() {
            message.push_str(&format!("{}. {}\n", idx + 1, question.prompt));
        }
        message
    }

    /// Record `raw` as the answer to the question at position `results.len()`.
    ///
    /// Returns whether it matched. Must not be called on a complete session —
    /// the owner drops the session the instant the last answer lands.
    pub fn record_answer(&mut self, raw: &str) -> bool {
        let position = self.results.len();
        debug_assert!(position < self.questions.len());
        let correct = normalize(raw) == normalize(&self.questions[position].expected);
        self.results.push(correct);
        correct
    }

    /// All questions answered.
    pub fn is_complete(&self) -> bool {
        self.results.len() == self.questions.len()
    }

    pub fn into_summary(self) -> QuizSummary {
        let correct = self.results.iter().filter(|&&passed| passed).count();
        let total = self.questions.len();
        let questions = self
            .questions
            .into_iter()
            .zip(self.results)
            .map(|(question, passed)| QuestionResult {
                prompt: question.prompt,
                expected: question.expected,
                passed,
            })
            .collect();
        QuizSummary { correct, total, questions }
    }
}

/// Comparison key: leading/trailing whitespace trimmed, Unicode-lowercased.
fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs() -> Vec<WordPair> {
        [
            ("apple", "Apfel"),
            ("car", "Auto"),
            ("house", "Haus"),
            ("book", "Buch"),
            ("friend", "Freund"),
        ]
        .iter()
        .map(|(english, german)| WordPair {
            english: (*english).into(),
            german: (*german).into(),
        })
        .collect()
    }

    #[test]
    fn all_questions_share_the_direction() {
        let session = QuizSession::new(&pairs(), Direction::EnglishToGerman);
        for question in &session.questions {
            assert!(question.prompt.chars().next().unwrap().is_lowercase());
            assert!(question.expected.chars().next().unwrap().is_uppercase());
        }
    }

    #[test]
    fn prompt_message_enumerates_all_prompts() {
        let session = QuizSession::new(&pairs(), Direction::EnglishToGerman);
        let message = session.prompt_message();
        assert!(message.contains("into German"));
        for (idx, word) in ["apple", "car", "house", "book", "friend"].iter().enumerate() {
            assert!(message.contains(&format!("{}. {}", idx + 1, word)));
        }
    }

    #[test]
    fn matching_is_case_and_whitespace_insensitive() {
        for answer in ["Apfel", " apfel ", "APFEL", "\tapfel\n"] {
            let mut session = QuizSession::new(&pairs(), Direction::EnglishToGerman);
            assert!(session.record_answer(answer), "{answer:?} should match");
        }
    }

    #[test]
    fn empty_answer_is_just_wrong() {
        let mut session = QuizSession::new(&pairs(), Direction::EnglishToGerman);
        assert!(!session.record_answer(""));
        assert!(!session.is_complete());
    }

    #[test]
    fn answers_score_in_presentation_order() {
        let mut session = QuizSession::new(&pairs(), Direction::EnglishToGerman);
        session.record_answer("Apfel");
        session.record_answer("wrong");
        session.record_answer("Haus");
        session.record_answer("Buch");
        session.record_answer("Freund");
        assert!(session.is_complete());

        let summary = session.into_summary();
        assert_eq!(summary.correct, 4);
        assert_eq!(summary.total, 5);
        assert_eq!(summary.questions.len(), 5);
        assert!(summary.questions[0].passed);
        assert!(!summary.questions[1].passed);
        assert_eq!(summary.questions[1].prompt, "car");
        assert_eq!(summary.questions[1].expected, "Auto");
    }

    #[test]
    fn reversed_direction_expects_english() {
        let mut session = QuizSession::new(&pairs(), Direction::GermanToEnglish);
        assert!(session.record_answer("apple"));
        assert!(!session.record_answer("Auto"));
    }
}
