use super::{Form, Key, Transition, failure, field, heading, highlight, hint};
use crate::commit::{CommitDraft, TitleError, title_violations};
use crate::constants::{
    MAX_TITLE_LENGTH, MIN_TITLE_LENGTH, PREVIEW_WIDTH, PREVIEW_WRAP, RECOMMENDED_TITLE_LENGTH,
};
use std::fmt::Write;
use unicode_width::UnicodeWidthStr;

/// title, then optional description, then a preview to confirm
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageForm {
    Title {
        draft: CommitDraft,
        errors: Vec<TitleError>,
    },
    Description {
        draft: CommitDraft,
    },
    Preview {
        draft: CommitDraft,
    },
}

impl MessageForm {
    pub fn new(commit_type: impl Into<String>) -> Self {
        MessageForm::Title {
            draft: CommitDraft::new(commit_type),
            errors: Vec::new(),
        }
    }

    pub fn draft(&self) -> &CommitDraft {
        match self {
            MessageForm::Title { draft, .. }
            | MessageForm::Description { draft }
            | MessageForm::Preview { draft } => draft,
        }
    }

    fn back_to_title(draft: CommitDraft) -> Transition<Self, CommitDraft> {
        Transition::Stay(MessageForm::Title {
            draft,
            errors: Vec::new(),
        })
    }
}

impl Form for MessageForm {
    type Output = CommitDraft;

    fn update(self, key: Key) -> Transition<Self, CommitDraft> {
        if key == Key::Interrupt {
            return Transition::Cancel;
        }

        match self {
            MessageForm::Title { mut draft, errors } => match key {
                Key::Esc => Transition::Cancel,
                Key::Enter => {
                    let errors = title_violations(&draft.title);
                    if errors.is_empty() {
                        Transition::Stay(MessageForm::Description { draft })
                    } else {
                        Transition::Stay(MessageForm::Title { draft, errors })
                    }
                }
                Key::Backspace => {
                    draft.title.pop();
                    Transition::Stay(MessageForm::Title {
                        draft,
                        errors: Vec::new(),
                    })
                }
                key => match key.printable() {
                    Some(c) => {
                        draft.title.push(c);
                        Transition::Stay(MessageForm::Title {
                            draft,
                            errors: Vec::new(),
                        })
                    }
                    None => Transition::Stay(MessageForm::Title { draft, errors }),
                },
            },
            MessageForm::Description { mut draft } => match key {
                Key::Esc => Self::back_to_title(draft),
                Key::Enter | Key::Finish => Transition::Stay(MessageForm::Preview { draft }),
                Key::Backspace => {
                    draft.description.pop();
                    Transition::Stay(MessageForm::Description { draft })
                }
                key => {
                    if let Some(c) = key.printable() {
                        draft.description.push(c);
                    }
                    Transition::Stay(MessageForm::Description { draft })
                }
            },
            MessageForm::Preview { draft } => match key {
                Key::Char('y') | Key::Enter => Transition::Done(draft),
                Key::Char('n' | 'e') | Key::Esc => Self::back_to_title(draft),
                _ => Transition::Stay(MessageForm::Preview { draft }),
            },
        }
    }

    fn view(&self) -> String {
        let draft = self.draft();
        let mut out = String::new();
        match self {
            MessageForm::Title { errors, .. } => {
                let _ = writeln!(out, "{}", heading("Commit title"));
                let _ = writeln!(out);
                let _ = writeln!(out, "type: {}", highlight(&draft.commit_type));
                let _ = writeln!(out);
                let _ = writeln!(out, "title (required):");
                let _ = writeln!(out, "> {}", field(&draft.title));
                let _ = writeln!(out);
                for error in errors {
                    let _ = writeln!(out, "{}", failure(&error.to_string()));
                }
                if !errors.is_empty() {
                    let _ = writeln!(out);
                }

                let length = draft.title.chars().count();
                if length > RECOMMENDED_TITLE_LENGTH && length <= MAX_TITLE_LENGTH {
                    let _ = writeln!(
                        out,
                        "{}",
                        hint(&format!(
                            "title is {length} characters (recommended max {RECOMMENDED_TITLE_LENGTH})"
                        ))
                    );
                }
                let _ = writeln!(
                    out,
                    "{}",
                    hint(&format!(
                        "rules: {MIN_TITLE_LENGTH}-{MAX_TITLE_LENGTH} characters, lowercase first letter, no trailing period"
                    ))
                );
                let _ = writeln!(
                    out,
                    "{}",
                    hint("example: add email validation in registration form")
                );
                let _ = write!(out, "{}", hint("enter to continue, esc to cancel"));
            }
            MessageForm::Description { .. } => {
                let _ = writeln!(out, "{}", heading("Description (optional)"));
                let _ = writeln!(out);
                let _ = writeln!(out, "{}", draft.summary());
                let _ = writeln!(out);
                let _ = writeln!(out, "description:");
                if draft.description.is_empty() {
                    let _ = writeln!(out, "{}", hint("(enter to skip, or type a description)"));
                } else {
                    let _ = writeln!(out, "{}", field(&draft.description));
                }
                let _ = writeln!(out);
                let _ = writeln!(
                    out,
                    "{}",
                    hint("explain the why, the diff already shows the what")
                );
                let _ = write!(out, "{}", hint("ctrl-d or enter to finish, esc to go back"));
            }
            MessageForm::Preview { .. } => {
                let _ = writeln!(out, "{}", heading("Preview"));
                let _ = writeln!(out);
                write_preview_box(&mut out, draft);
                let _ = writeln!(out);
                let _ = write!(out, "confirm commit message? (y/n, e to edit) ");
            }
        }
        out
    }
}

fn write_preview_box(out: &mut String, draft: &CommitDraft) {
    let border = format!("+{}+", "-".repeat(PREVIEW_WIDTH));
    let blank = format!("|{}|", " ".repeat(PREVIEW_WIDTH));
    let inner = PREVIEW_WIDTH - 2;

    let _ = writeln!(out, "{border}");
    let _ = writeln!(out, "{blank}");
    for line in wrap(&draft.summary(), inner) {
        let _ = writeln!(out, "|  {}|", pad(&line, inner));
    }
    let _ = writeln!(out, "{blank}");
    if !draft.description.trim().is_empty() {
        for line in wrap(&draft.description, PREVIEW_WRAP) {
            let _ = writeln!(out, "|  {}|", pad(&line, inner));
        }
        let _ = writeln!(out, "{blank}");
    }
    let _ = writeln!(out, "{border}");
}

/// left-align `line` in `width` terminal columns
fn pad(line: &str, width: usize) -> String {
    let fill = width.saturating_sub(line.width());
    format!("{line}{}", " ".repeat(fill))
}

/// greedy word wrap by display width; words wider than `width` get a line of
/// their own
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
        } else if current.width() + 1 + word.width() <= width {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(form: MessageForm, keys: &[Key]) -> MessageForm {
        keys.iter().fold(form, |form, key| match form.update(*key) {
            Transition::Stay(next) => next,
            other => panic!("form finished on {key:?}: {other:?}"),
        })
    }

    fn typed(text: &str) -> Vec<Key> {
        text.chars().map(Key::Char).collect()
    }

    fn with_title(title: &str) -> MessageForm {
        let mut keys = typed(title);
        keys.push(Key::Enter);
        press(MessageForm::new("feat"), &keys)
    }

    #[test]
    fn valid_title_advances_to_description() {
        let form = with_title("add login form");
        assert!(matches!(form, MessageForm::Description { .. }));
        assert_eq!(form.draft().title, "add login form");
    }

    #[test]
    fn invalid_title_stays_with_all_errors() {
        let form = with_title("Fix bug.");
        let MessageForm::Title { errors, .. } = &form else {
            panic!("expected title state");
        };
        assert!(errors.contains(&TitleError::LeadingUppercase));
        assert!(errors.contains(&TitleError::TrailingPeriod));

        let view = form.view();
        assert!(view.contains("title should start with a lowercase letter"));
        assert!(view.contains("title should not end with a period"));
    }

    #[test]
    fn editing_clears_title_errors() {
        let form = press(with_title("short"), &[Key::Backspace]);
        assert_eq!(
            form,
            MessageForm::Title {
                draft: CommitDraft {
                    commit_type: "feat".into(),
                    title: "shor".into(),
                    description: String::new(),
                },
                errors: Vec::new(),
            }
        );
    }

    #[test]
    fn empty_description_goes_to_preview() {
        let form = press(with_title("add login form"), &[Key::Enter]);
        assert!(matches!(form, MessageForm::Preview { .. }));
        assert_eq!(
            form.update(Key::Enter),
            Transition::Done(CommitDraft {
                commit_type: "feat".into(),
                title: "add login form".into(),
                description: String::new(),
            })
        );
    }

    #[test]
    fn ctrl_d_finishes_description() {
        let mut keys = typed("because users asked");
        keys.push(Key::Backspace);
        keys.push(Key::Finish);
        let form = press(with_title("add login form"), &keys);
        assert!(matches!(form, MessageForm::Preview { .. }));
        assert_eq!(form.draft().description, "because users aske");

        let Transition::Done(draft) = form.update(Key::Char('y')) else {
            panic!("expected confirmation");
        };
        assert_eq!(
            draft.full_message(),
            "feat: add login form\n\nbecause users aske"
        );
    }

    #[test]
    fn escape_returns_to_title_keeping_buffers() {
        let mut keys = typed("some context");
        keys.push(Key::Esc);
        let form = press(with_title("add login form"), &keys);
        assert!(matches!(form, MessageForm::Title { .. }));
        assert_eq!(form.draft().title, "add login form");
        assert_eq!(form.draft().description, "some context");

        // from preview too
        let form = press(with_title("add login form"), &[Key::Enter, Key::Esc]);
        assert!(matches!(form, MessageForm::Title { .. }));
    }

    #[test]
    fn preview_edit_keys_return_to_title() {
        for key in [Key::Char('n'), Key::Char('e')] {
            let form = press(with_title("add login form"), &[Key::Enter, key]);
            assert!(matches!(form, MessageForm::Title { .. }));
            assert_eq!(form.draft().title, "add login form");
        }
    }

    #[test]
    fn escape_in_title_cancels() {
        assert_eq!(MessageForm::new("fix").update(Key::Esc), Transition::Cancel);
    }

    #[test]
    fn ctrl_c_cancels_everywhere() {
        assert_eq!(MessageForm::new("fix").update(Key::Interrupt), Transition::Cancel);
        assert_eq!(with_title("add login form").update(Key::Interrupt), Transition::Cancel);
        let preview = press(with_title("add login form"), &[Key::Enter]);
        assert_eq!(preview.update(Key::Interrupt), Transition::Cancel);
    }

    #[test]
    fn title_view_warns_past_recommended_length() {
        let form = press(MessageForm::new("docs"), &typed(&"a".repeat(55)));
        assert!(form.view().contains("title is 55 characters"));
        let form = press(MessageForm::new("docs"), &typed("short enough title"));
        assert!(!form.view().contains("recommended max"));
    }

    #[test]
    fn preview_wraps_description() {
        let mut keys = typed(&"word ".repeat(30));
        keys.push(Key::Enter);
        let form = press(with_title("add login form"), &keys);
        let view = form.view();
        assert!(view.contains("|  feat: add login form"));
        for line in view.lines().filter(|l| l.starts_with('|')) {
            assert_eq!(line.chars().count(), PREVIEW_WIDTH + 2, "{line:?}");
        }
    }

    #[test]
    fn preview_aligns_wide_characters() {
        let mut keys = typed("添加登录表单的输入校验");
        keys.push(Key::Enter);
        keys.extend(typed(&"修复 ".repeat(30)));
        keys.push(Key::Enter);
        let form = press(MessageForm::new("feat"), &keys);
        assert!(matches!(form, MessageForm::Preview { .. }));

        let view = form.view();
        let boxed: Vec<&str> = view.lines().filter(|l| l.starts_with('|')).collect();
        assert!(boxed.len() > 4);
        for line in boxed {
            assert_eq!(line.width(), PREVIEW_WIDTH + 2, "{line:?}");
        }
    }

    #[test]
    fn wrap_counts_display_columns() {
        // each of these is two columns wide
        assert_eq!(wrap("修复 修复 修复", 9), ["修复 修复", "修复"]);
        assert_eq!(pad("修复", 6), "修复  ");
    }

    #[test]
    fn wrap_splits_on_width() {
        assert_eq!(wrap("aa bb cc", 5), ["aa bb", "cc"]);
        assert_eq!(wrap("   ", 5), Vec::<String>::new());
        assert_eq!(wrap("toolongword x", 4), ["toolongword", "x"]);
    }
}
