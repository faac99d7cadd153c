use crate::models::QuizQuestion;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QuizError {
    #[error("There is no question to answer")]
    NoQuestion,

    #[error("Choice {choice} is not one of the {options} options")]
    ChoiceOutOfRange { choice: usize, options: usize },

    #[error("This question has already been answered")]
    AlreadyAnswered,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerOutcome {
    Correct {
        explanation: String,
    },
    Incorrect {
        correct_index: usize,
        explanation: String,
    },
}

impl AnswerOutcome {
    pub fn is_correct(&self) -> bool {
        matches!(self, AnswerOutcome::Correct { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizScore {
    pub correct: usize,
    pub answered: usize,
    pub total: usize,
}

/// A generated quiz being worked through one question at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuizRun {
    questions: Vec<QuizQuestion>,
    index: usize,
    answers: Vec<Option<usize>>,
}

impl QuizRun {
    pub fn new(questions: Vec<QuizQuestion>) -> Self {
        let answers = vec![None; questions.len()];
        Self {
            questions,
            index: 0,
            answers,
        }
    }

    pub fn questions(&self) -> &[QuizQuestion] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> Option<&QuizQuestion> {
        self.questions.get(self.index)
    }

    pub fn current_answer(&self) -> Option<usize> {
        self.answers.get(self.index).copied().flatten()
    }

    /// Record an answer for the current question. One answer per question.
    pub fn answer(&mut self, choice: usize) -> Result<AnswerOutcome, QuizError> {
        let question = self.questions.get(self.index).ok_or(QuizError::NoQuestion)?;
        if choice >= question.options.len() {
            return Err(QuizError::ChoiceOutOfRange {
                choice,
                options: question.options.len(),
            });
        }
        if self.answers[self.index].is_some() {
            return Err(QuizError::AlreadyAnswered);
        }

        self.answers[self.index] = Some(choice);

        let explanation = question.explanation.clone();
        if choice == question.correct_index {
            Ok(AnswerOutcome::Correct { explanation })
        } else {
            Ok(AnswerOutcome::Incorrect {
                correct_index: question.correct_index,
                explanation,
            })
        }
    }

    /// Move to the next question; `false` on the last one.
    pub fn advance(&mut self) -> bool {
        if self.index + 1 >= self.questions.len() {
            return false;
        }
        self.index += 1;
        true
    }

    pub fn is_finished(&self) -> bool {
        self.answers.iter().all(Option::is_some)
    }

    pub fn score(&self) -> QuizScore {
        let mut score = QuizScore {
            correct: 0,
            answered: 0,
            total: self.questions.len(),
        };
        for (question, answer) in self.questions.iter().zip(&self.answers) {
            if let Some(choice) = answer {
                score.answered += 1;
                if *choice == question.correct_index {
                    score.correct += 1;
                }
            }
        }
        score
    }
}
