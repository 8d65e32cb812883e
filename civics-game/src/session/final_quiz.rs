//! Final quiz: answers are graded the moment they are chosen.
use super::{OptionFeedback, SessionError, ensure_option, option_feedback};
use crate::content::Question;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinalQuizStep {
    Advanced { index: usize },
    /// Tally including the last answer.
    Finished { score: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalQuizSession {
    questions: Vec<Question>,
    index: usize,
    answer: Option<String>,
    score: usize,
    finished: bool,
}

impl FinalQuizSession {
    /// # Errors
    ///
    /// [`SessionError::NoQuestions`] for an empty quiz.
    pub fn new(questions: Vec<Question>) -> Result<Self, SessionError> {
        if questions.is_empty() {
            return Err(SessionError::NoQuestions);
        }
        Ok(Self {
            questions,
            index: 0,
            answer: None,
            score: 0,
            finished: false,
        })
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub const fn current_index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.index)
    }

    #[must_use]
    pub fn answer_given(&self) -> Option<&str> {
        self.answer.as_deref()
    }

    #[must_use]
    pub const fn score(&self) -> usize {
        self.score
    }

    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.finished
    }

    /// Pick and grade an option for the current question.
    ///
    /// # Errors
    ///
    /// Fails once the question has been answered, after the quiz ended, or
    /// for an option the question does not offer.
    pub fn answer(&mut self, option: &str) -> Result<bool, SessionError> {
        if self.finished {
            return Err(SessionError::QuizOver);
        }
        let Some(question) = self.questions.get(self.index) else {
            return Err(SessionError::QuizOver);
        };
        if self.answer.is_some() {
            return Err(SessionError::AlreadyAnswered);
        }
        ensure_option(question, option)?;
        let correct = question.is_correct(option);
        if correct {
            self.score += 1;
        }
        self.answer = Some(option.to_string());
        Ok(correct)
    }

    /// # Errors
    ///
    /// [`SessionError::NotAnswered`] until the current question is answered.
    pub fn next(&mut self) -> Result<FinalQuizStep, SessionError> {
        if self.finished {
            return Err(SessionError::QuizOver);
        }
        if self.answer.is_none() {
            return Err(SessionError::NotAnswered);
        }
        if self.index + 1 < self.questions.len() {
            self.index += 1;
            self.answer = None;
            Ok(FinalQuizStep::Advanced { index: self.index })
        } else {
            self.finished = true;
            Ok(FinalQuizStep::Finished { score: self.score })
        }
    }

    #[must_use]
    pub fn option_feedback(&self) -> Vec<OptionFeedback> {
        self.current_question().map_or_else(Vec::new, |question| {
            option_feedback(question, self.answer_given(), self.answer.is_some())
        })
    }
}
