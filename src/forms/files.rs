use super::{Form, Key, Transition, heading, highlight, hint};
use crate::changes::{Category, ChangeRecord};
use colored::Colorize;
use std::collections::BTreeSet;
use std::fmt::Write;

/// multi-select over the changed files
///
/// cursor and selection refer to positions in `items`; grouping by category
/// only affects how the list is drawn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileForm {
    items: Vec<ChangeRecord>,
    cursor: usize,
    selected: BTreeSet<usize>,
}

impl FileForm {
    pub fn new(items: Vec<ChangeRecord>) -> Self {
        Self {
            items,
            cursor: 0,
            selected: BTreeSet::new(),
        }
    }

    fn toggle(&mut self, index: usize) {
        if !self.selected.remove(&index) && index < self.items.len() {
            self.selected.insert(index);
        }
    }

    fn into_selection(self) -> Vec<ChangeRecord> {
        let selected = self.selected;
        self.items
            .into_iter()
            .enumerate()
            .filter(|(i, _)| selected.contains(i))
            .map(|(_, item)| item)
            .collect()
    }
}

impl Form for FileForm {
    type Output = Vec<ChangeRecord>;

    fn update(mut self, key: Key) -> Transition<Self, Vec<ChangeRecord>> {
        let last = self.items.len().saturating_sub(1);
        match key {
            Key::Up | Key::Char('k') => self.cursor = self.cursor.saturating_sub(1),
            Key::Down | Key::Char('j') => self.cursor = (self.cursor + 1).min(last),
            Key::Char(' ') => self.toggle(self.cursor),
            Key::Char('a') => self.selected = (0..self.items.len()).collect(),
            Key::Char('d') => self.selected.clear(),
            Key::Char('i') => {
                self.selected = (0..self.items.len())
                    .filter(|i| !self.selected.contains(i))
                    .collect();
            }
            Key::Enter => return Transition::Done(self.into_selection()),
            Key::Esc | Key::Char('q') | Key::Interrupt => return Transition::Cancel,
            _ => {}
        }
        Transition::Stay(self)
    }

    fn view(&self) -> String {
        if self.items.is_empty() {
            return String::from("no changes detected");
        }

        let mut out = String::new();
        let _ = writeln!(out, "{}", heading("Select files"));
        let _ = writeln!(
            out,
            "{}",
            hint("↑/↓ or j/k to move, space to mark, enter to continue")
        );
        let _ = writeln!(out);

        for category in Category::DISPLAY_ORDER {
            let members: Vec<usize> = (0..self.items.len())
                .filter(|&i| self.items[i].category() == category)
                .collect();
            if members.is_empty() {
                continue;
            }

            let _ = writeln!(out, "{}", format!("{category}:").yellow().bold());
            for i in members {
                let pointer = if i == self.cursor { ">" } else { " " };
                let mark = if self.selected.contains(&i) { "x" } else { " " };
                let line = format!("{pointer} [{mark}] {}", self.items[i].path);
                if i == self.cursor {
                    let _ = writeln!(out, "{}", highlight(&line));
                } else {
                    let _ = writeln!(out, "{line}");
                }
            }
            let _ = writeln!(out);
        }

        let _ = writeln!(
            out,
            "{}",
            hint(&format!(
                "selected: {}/{}",
                self.selected.len(),
                self.items.len()
            ))
        );
        let _ = write!(
            out,
            "{}",
            hint("a select all, d deselect all, i invert, q cancel")
        );
        out
    }
}
