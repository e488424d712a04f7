use super::{Form, Key, Transition, failure, field, heading, highlight, hint};
use crate::git::validate_branch_name;
use std::fmt::Write;

/// choose the branch to commit on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BranchForm {
    /// offer to keep the current, unprotected branch
    Confirm { current: String },
    /// type a new branch name
    Input {
        current: String,
        protected: bool,
        buffer: String,
        error: Option<String>,
    },
}

impl BranchForm {
    /// protected branches skip straight to typing a new name
    pub fn new(current: impl Into<String>, protected: bool) -> Self {
        let current = current.into();
        if protected {
            BranchForm::Input {
                current,
                protected,
                buffer: String::new(),
                error: None,
            }
        } else {
            BranchForm::Confirm { current }
        }
    }
}

impl Form for BranchForm {
    type Output = String;

    fn update(self, key: Key) -> Transition<Self, String> {
        if matches!(key, Key::Esc | Key::Interrupt) {
            return Transition::Cancel;
        }

        match self {
            BranchForm::Confirm { current } => match key {
                Key::Char('y') | Key::Enter => Transition::Done(current),
                Key::Char('n') => Transition::Stay(BranchForm::Input {
                    current,
                    protected: false,
                    buffer: String::new(),
                    error: None,
                }),
                _ => Transition::Stay(BranchForm::Confirm { current }),
            },
            BranchForm::Input {
                current,
                protected,
                mut buffer,
                error,
            } => {
                let error = match key {
                    Key::Enter => match validate_branch_name(&buffer) {
                        Ok(()) => return Transition::Done(buffer),
                        Err(e) => Some(e.to_string()),
                    },
                    Key::Backspace => {
                        if buffer.pop().is_some() {
                            None
                        } else {
                            error
                        }
                    }
                    key => match key.printable() {
                        Some(c) => {
                            buffer.push(c);
                            None
                        }
                        None => error,
                    },
                };
                Transition::Stay(BranchForm::Input {
                    current,
                    protected,
                    buffer,
                    error,
                })
            }
        }
    }

    fn view(&self) -> String {
        let mut out = String::new();
        match self {
            BranchForm::Confirm { current } => {
                let _ = writeln!(out, "{}", heading("Branch"));
                let _ = writeln!(out);
                let _ = writeln!(out, "current branch: {}", highlight(current));
                let _ = writeln!(out);
                let _ = write!(out, "use current branch '{current}'? (y/n) ");
            }
            BranchForm::Input {
                current,
                protected,
                buffer,
                error,
            } => {
                if *protected {
                    let _ = writeln!(out, "{}", heading("Branch"));
                    let _ = writeln!(out);
                    let _ = writeln!(
                        out,
                        "{}",
                        failure(&format!("cannot commit directly to '{current}'"))
                    );
                    let _ = writeln!(out, "create a new branch:");
                } else {
                    let _ = writeln!(out, "{}", heading("New branch"));
                }
                let _ = writeln!(out);
                let _ = writeln!(out, "branch name: {}", field(buffer));
                let _ = writeln!(out);
                if let Some(error) = error {
                    let _ = writeln!(out, "{}", failure(error));
                    let _ = writeln!(out);
                }
                let _ = writeln!(out, "{}", hint("suggested format: type/short-description"));
                let _ = writeln!(
                    out,
                    "{}",
                    hint("examples: feat/login, fix/button-crash, chore/deps")
                );
                let _ = write!(out, "{}", hint("enter to confirm, esc to cancel"));
            }
        }
        out
    }
}
