use crate::changes::{ChangeRecord, group_by_status, parse_status};
use crate::commit::CommitDraft;
use crate::constants::LARGE_SELECTION;
use crate::context::SessionState;
use crate::forms::{BranchForm, CommitTypeForm, ConfirmForm, FileForm, MessageForm, TypeChoice};
use crate::git::{GitError, Vcs, is_protected_branch};
use crate::ui::{Terminal, run_form};
use crate::{error, info, status, warning};
use anyhow::{Context, Result};

/// drives branch setup, the commit loop, and the final push offer
pub struct Session<'a, V: Vcs + ?Sized, T: Terminal + ?Sized> {
    vcs: &'a V,
    term: &'a mut T,
}

/// how one pass through the commit loop ended
enum Step {
    Again,
    Stop,
}

impl<'a, V: Vcs + ?Sized, T: Terminal + ?Sized> Session<'a, V, T> {
    pub fn new(vcs: &'a V, term: &'a mut T) -> Self {
        Self { vcs, term }
    }

    /// run the whole session
    ///
    /// git failures inside the loop are reported and recorded in the
    /// returned state; only terminal errors and the initial status and
    /// branch queries are returned as `Err`
    pub fn run(mut self) -> Result<SessionState> {
        let records = parse_status(&self.vcs.status().context("failed to read git status")?);
        if records.is_empty() {
            status!("working tree clean, nothing to commit");
            return Ok(SessionState::default());
        }
        describe_changes(&records);

        let current = self
            .vcs
            .current_branch()
            .context("failed to determine current branch")?;
        let mut state = SessionState::new(current.as_str());

        let Some(branch) = run_form(
            &mut *self.term,
            BranchForm::new(current.as_str(), is_protected_branch(&current)),
        )?
        else {
            info!("cancelled");
            return Ok(state);
        };

        if branch != current {
            if let Err(e) = self.switch_branch(&branch, &mut state) {
                report(&e);
                state.failed = true;
                return Ok(state);
            }
        } else {
            status!("using branch {}", branch);
        }

        loop {
            match self.commit_once(&mut state)? {
                Step::Again => continue,
                Step::Stop => break,
            }
        }

        if state.has_commits() {
            self.finish(&mut state)?;
        } else {
            info!("no commits created");
        }
        Ok(state)
    }

    fn switch_branch(&mut self, branch: &str, state: &mut SessionState) -> Result<(), GitError> {
        if self.vcs.local_branch_exists(branch) {
            self.vcs.checkout_branch(branch)?;
            status!("switched to existing branch {}", branch);
        } else {
            self.vcs.create_branch(branch)?;
            state.branch_created = true;
            status!("created branch {}", branch);
        }
        state.branch = branch.to_string();
        Ok(())
    }

    /// one select, describe, stage, commit pass
    fn commit_once(&mut self, state: &mut SessionState) -> Result<Step> {
        let records = match self.vcs.status() {
            Ok(text) => parse_status(&text),
            Err(e) => {
                report(&e);
                state.failed = true;
                return Ok(Step::Stop);
            }
        };
        if records.is_empty() {
            status!("all changes committed");
            return Ok(Step::Stop);
        }

        let selected = match run_form(&mut *self.term, FileForm::new(records.clone()))? {
            Some(selected) if !selected.is_empty() => selected,
            Some(_) => {
                info!("no files selected");
                return Ok(Step::Stop);
            }
            None => {
                info!("cancelled");
                return Ok(Step::Stop);
            }
        };
        if selected.len() > LARGE_SELECTION {
            warning!(
                "{} files selected, consider splitting them into smaller commits",
                selected.len()
            );
        }

        let extra = staged_outside(&records, &selected);
        if !extra.is_empty() {
            warning!(
                "{} already staged file{} will be committed too: {}",
                extra.len(),
                if extra.len() == 1 { "" } else { "s" },
                extra.join(", ")
            );
        }

        let Some(commit_type) = self.pick_type()? else {
            return Ok(Step::Stop);
        };

        let Some(draft) = run_form(&mut *self.term, MessageForm::new(commit_type))? else {
            info!("commit cancelled");
            return Ok(Step::Stop);
        };

        if let Err(e) = self.stage_and_commit(&selected, &draft) {
            report(&e);
            state.failed = true;
            return Ok(Step::Stop);
        }
        let summary = draft.summary();
        status!("committed: {}", summary);
        state.record_commit(summary);

        match self.vcs.status() {
            Ok(text) if text.trim().is_empty() => {
                status!("all changes committed");
                Ok(Step::Stop)
            }
            Ok(_) => {
                let again = run_form(&mut *self.term, ConfirmForm::new("make another commit?"))?;
                if again == Some(true) {
                    Ok(Step::Again)
                } else {
                    Ok(Step::Stop)
                }
            }
            Err(e) => {
                report(&e);
                state.failed = true;
                Ok(Step::Stop)
            }
        }
    }

    /// resolve the commit type, asking for free text when requested
    fn pick_type(&mut self) -> Result<Option<String>> {
        match run_form(&mut *self.term, CommitTypeForm::new())? {
            Some(TypeChoice::Catalog(commit_type)) => Ok(Some(commit_type.key.to_string())),
            Some(TypeChoice::Custom) => match self.term.read_line("custom commit type: ")? {
                Some(custom) if !custom.trim().is_empty() => Ok(Some(custom.trim().to_string())),
                _ => {
                    info!("no commit type given");
                    Ok(None)
                }
            },
            None => {
                info!("cancelled");
                Ok(None)
            }
        }
    }

    fn stage_and_commit(
        &mut self,
        selected: &[ChangeRecord],
        draft: &CommitDraft,
    ) -> Result<(), GitError> {
        let paths: Vec<&str> = selected.iter().map(ChangeRecord::stage_path).collect();
        self.vcs.stage(&paths)?;
        self.vcs.commit(&draft.full_message())
    }

    /// print the summary and offer to push
    fn finish(&mut self, state: &mut SessionState) -> Result<()> {
        info!();
        status!("commits created on {}:", state.branch);
        for summary in &state.commits {
            info!("  - {}", summary);
        }
        info!();

        let remote = self.vcs.remote().to_string();
        let question = format!("push {} to {}?", state.branch, remote);
        if run_form(&mut *self.term, ConfirmForm::new(question))? != Some(true) {
            let upstream = if state.branch_created {
                "--set-upstream "
            } else {
                ""
            };
            info!("push later with: git push {}{} {}", upstream, remote, state.branch);
            return Ok(());
        }

        let set_upstream = !self.vcs.remote_branch_exists(&state.branch);
        match self.vcs.push(&state.branch, set_upstream) {
            Ok(()) => status!("pushed {} to {}", state.branch, remote),
            Err(e) => {
                report(&e);
                state.failed = true;
            }
        }
        Ok(())
    }
}

/// short overview of what changed, grouped by status code
fn describe_changes(records: &[ChangeRecord]) {
    let count = records.len();
    let file_word = if count == 1 { "file" } else { "files" };
    status!("{} changed {}", count, file_word);
    for (key, group) in group_by_status(records) {
        info!("  [{}] {}", key, group.len());
    }
}

/// paths already in the index that the selection leaves out
///
/// `git commit` takes the whole index, so these end up in the commit as well
fn staged_outside<'r>(records: &'r [ChangeRecord], selected: &[ChangeRecord]) -> Vec<&'r str> {
    records
        .iter()
        .filter(|r| r.is_staged() && !selected.contains(r))
        .map(|r| r.path.as_str())
        .collect()
}

fn report(err: &GitError) {
    error!("{}", err);
    match err.operation() {
        "commit" => info!("the selected files are still staged"),
        "push" => info!("nothing was lost, the commits are still local"),
        _ => {}
    }
}
