/// state carried through one run of the commit session
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SessionState {
    /// branch the commits land on
    pub branch: String,

    /// whether the branch was created during this run
    pub branch_created: bool,

    /// first line of every commit created so far, oldest first
    pub commits: Vec<String>,

    /// whether a git operation failed and cut the session short
    pub failed: bool,
}

impl SessionState {
    pub fn new(branch: impl Into<String>) -> Self {
        Self {
            branch: branch.into(),
            ..Self::default()
        }
    }

    pub fn record_commit(&mut self, summary: String) {
        self.commits.push(summary);
    }

    pub fn has_commits(&self) -> bool {
        !self.commits.is_empty()
    }
}
