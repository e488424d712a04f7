use super::{Form, Key, Transition};

/// single-shot yes/no question
#[derive(Debug, PartialEq, Eq)]
pub struct ConfirmForm {
    question: String,
}

impl ConfirmForm {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
        }
    }
}

impl Form for ConfirmForm {
    type Output = bool;

    fn update(self, key: Key) -> Transition<Self, bool> {
        match key {
            Key::Char('y') => Transition::Done(true),
            Key::Char('n') | Key::Esc | Key::Interrupt => Transition::Done(false),
            _ => Transition::Stay(self),
        }
    }

    fn view(&self) -> String {
        format!("{} (y/n) ", self.question)
    }
}
