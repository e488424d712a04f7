use crate::constants::{MAX_TITLE_LENGTH, MIN_TITLE_LENGTH};
use thiserror::Error;

/// a conventional-commit type offered by the type picker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommitType {
    pub key: &'static str,
    pub description: &'static str,
}

pub const COMMIT_TYPES: [CommitType; 10] = [
    CommitType {
        key: "feat",
        description: "a new feature",
    },
    CommitType {
        key: "fix",
        description: "a bug fix",
    },
    CommitType {
        key: "docs",
        description: "documentation only changes",
    },
    CommitType {
        key: "style",
        description: "formatting, whitespace, no code change",
    },
    CommitType {
        key: "refactor",
        description: "code change that neither fixes a bug nor adds a feature",
    },
    CommitType {
        key: "perf",
        description: "code change that improves performance",
    },
    CommitType {
        key: "test",
        description: "adding or correcting tests",
    },
    CommitType {
        key: "build",
        description: "build system or external dependencies",
    },
    CommitType {
        key: "ci",
        description: "continuous integration configuration",
    },
    CommitType {
        key: "chore",
        description: "maintenance that does not touch src or tests",
    },
];

/// the commit being composed in one loop iteration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitDraft {
    pub commit_type: String,
    pub title: String,
    pub description: String,
}

impl CommitDraft {
    pub fn new(commit_type: impl Into<String>) -> Self {
        Self {
            commit_type: commit_type.into(),
            ..Self::default()
        }
    }

    /// first line of the commit, also used in the session summary
    pub fn summary(&self) -> String {
        format!("{}: {}", self.commit_type, self.title.trim())
    }

    /// message passed to `git commit -m`
    pub fn full_message(&self) -> String {
        let description = self.description.trim();
        if description.is_empty() {
            self.summary()
        } else {
            format!("{}\n\n{}", self.summary(), description)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TitleError {
    #[error("title cannot be empty")]
    Empty,
    #[error("title too short (min {MIN_TITLE_LENGTH} characters)")]
    TooShort,
    #[error("title too long (max {MAX_TITLE_LENGTH} characters)")]
    TooLong,
    #[error("title should not end with a period")]
    TrailingPeriod,
    #[error("title should start with a lowercase letter")]
    LeadingUppercase,
}

/// every rule the title breaks, in rule order
pub fn title_violations(title: &str) -> Vec<TitleError> {
    let title = title.trim();
    if title.is_empty() {
        return vec![TitleError::Empty];
    }

    let mut violations = Vec::new();
    let length = title.chars().count();
    if length < MIN_TITLE_LENGTH {
        violations.push(TitleError::TooShort);
    }
    if length > MAX_TITLE_LENGTH {
        violations.push(TitleError::TooLong);
    }
    if title.ends_with('.') {
        violations.push(TitleError::TrailingPeriod);
    }
    if title.chars().next().is_some_and(char::is_uppercase) {
        violations.push(TitleError::LeadingUppercase);
    }
    violations
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_message_without_description() {
        let draft = CommitDraft {
            commit_type: "feat".into(),
            title: "add login form".into(),
            description: String::new(),
        };
        assert_eq!(draft.full_message(), "feat: add login form");
    }

    #[test]
    fn full_message_with_description() {
        let draft = CommitDraft {
            commit_type: "fix".into(),
            title: "handle empty status output".into(),
            description: "git prints nothing on a clean tree".into(),
        };
        assert_eq!(
            draft.full_message(),
            "fix: handle empty status output\n\ngit prints nothing on a clean tree"
        );
    }

    #[test]
    fn whitespace_description_is_dropped() {
        let mut draft = CommitDraft::new("docs");
        draft.title = "describe the flags".into();
        draft.description = "   ".into();
        assert_eq!(draft.full_message(), "docs: describe the flags");
    }

    #[test]
    fn catalog_is_fixed() {
        let keys: Vec<_> = COMMIT_TYPES.iter().map(|t| t.key).collect();
        assert_eq!(
            keys,
            [
                "feat", "fix", "docs", "style", "refactor", "perf", "test", "build", "ci",
                "chore"
            ]
        );
    }

    fn validate_title(title: &str) -> Result<(), TitleError> {
        match title_violations(title).first() {
            Some(err) => Err(*err),
            None => Ok(()),
        }
    }

    #[test]
    fn accepts_valid_title() {
        assert_eq!(validate_title("fix a small bug in parser"), Ok(()));
        assert_eq!(validate_title("  trimmed title ok  "), Ok(()));
        assert_eq!(validate_title("0123456789"), Ok(()));
        assert_eq!(validate_title(&"a".repeat(72)), Ok(()));
    }

    #[test]
    fn reports_every_violation() {
        let violations = title_violations("Fix bug.");
        assert!(violations.contains(&TitleError::LeadingUppercase));
        assert!(violations.contains(&TitleError::TrailingPeriod));
        assert!(violations.contains(&TitleError::TooShort));
    }

    #[test]
    fn rejects_each_rule() {
        assert_eq!(validate_title("   "), Err(TitleError::Empty));
        assert_eq!(title_violations(""), vec![TitleError::Empty]);
        assert_eq!(validate_title("too short"), Err(TitleError::TooShort));
        assert_eq!(validate_title(&"a".repeat(73)), Err(TitleError::TooLong));
        assert_eq!(
            validate_title("ends with a period."),
            Err(TitleError::TrailingPeriod)
        );
        assert_eq!(
            validate_title("Starts uppercase here"),
            Err(TitleError::LeadingUppercase)
        );
    }

    #[test]
    fn messages_are_distinct() {
        let all = [
            TitleError::Empty,
            TitleError::TooShort,
            TitleError::TooLong,
            TitleError::TrailingPeriod,
            TitleError::LeadingUppercase,
        ];
        let messages: std::collections::HashSet<_> = all.iter().map(ToString::to_string).collect();
        assert_eq!(messages.len(), all.len());
    }
}
