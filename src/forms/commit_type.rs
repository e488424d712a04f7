use super::{Form, Key, Transition, heading, highlight, hint};
use crate::commit::{COMMIT_TYPES, CommitType};
use std::fmt::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeChoice {
    Catalog(CommitType),
    /// the caller collects a free-form type
    Custom,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommitTypeForm {
    cursor: usize,
}

impl CommitTypeForm {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Form for CommitTypeForm {
    type Output = TypeChoice;

    fn update(self, key: Key) -> Transition<Self, TypeChoice> {
        let cursor = match key {
            Key::Up | Key::Char('k') => self.cursor.saturating_sub(1),
            Key::Down | Key::Char('j') => (self.cursor + 1).min(COMMIT_TYPES.len() - 1),
            Key::Enter => return Transition::Done(TypeChoice::Catalog(COMMIT_TYPES[self.cursor])),
            Key::Char('c') => return Transition::Done(TypeChoice::Custom),
            Key::Esc | Key::Char('q') | Key::Interrupt => return Transition::Cancel,
            _ => self.cursor,
        };
        Transition::Stay(Self { cursor })
    }

    fn view(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", heading("Commit type"));
        let _ = writeln!(out);
        for (i, commit_type) in COMMIT_TYPES.iter().enumerate() {
            let pointer = if i == self.cursor { ">" } else { " " };
            let line = format!(
                "{pointer} {:>2}. {:<10} - {}",
                i + 1,
                commit_type.key,
                commit_type.description
            );
            if i == self.cursor {
                let _ = writeln!(out, "{}", highlight(&line));
            } else {
                let _ = writeln!(out, "{line}");
            }
        }
        let _ = writeln!(out);
        let _ = write!(
            out,
            "{}",
            hint("enter to select, c for a custom type, q to quit")
        );
        out
    }
}
