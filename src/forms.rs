//! modal prompts as pure state machines
//!
//! every form is a state enum with `update(self, key)` returning the next
//! state or a terminal result, and `view(&self)` producing the text to draw.
//! neither touches the terminal; `ui::run_form` does the reading and drawing.

pub mod branch;
pub mod commit_type;
pub mod confirm;
pub mod files;
pub mod message;

pub use branch::BranchForm;
pub use commit_type::{CommitTypeForm, TypeChoice};
pub use confirm::ConfirmForm;
pub use files::FileForm;
pub use message::MessageForm;

use colored::{ColoredString, Colorize};

/// a single input event, already decoded from the terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Backspace,
    Enter,
    Esc,
    Up,
    Down,
    /// ctrl-c
    Interrupt,
    /// ctrl-d
    Finish,
}

impl Key {
    /// printable character suitable for appending to a text buffer
    pub fn printable(self) -> Option<char> {
        match self {
            Key::Char(c) if !c.is_control() => Some(c),
            _ => None,
        }
    }
}

/// result of feeding one key to a form
#[derive(Debug, PartialEq, Eq)]
pub enum Transition<S, T> {
    Stay(S),
    Done(T),
    Cancel,
}

pub trait Form: Sized {
    type Output;

    fn update(self, key: Key) -> Transition<Self, Self::Output>;
    fn view(&self) -> String;
}

// shared styling

pub(crate) fn heading(text: &str) -> ColoredString {
    text.magenta().bold()
}

pub(crate) fn hint(text: &str) -> ColoredString {
    text.dimmed()
}

pub(crate) fn highlight(text: &str) -> ColoredString {
    text.cyan()
}

pub(crate) fn failure(text: &str) -> ColoredString {
    text.red().bold()
}

/// text buffer with a trailing cursor marker
pub(crate) fn field(buffer: &str) -> String {
    format!("{buffer}_")
}
