use std::collections::BTreeMap;
use std::fmt;

/// a single changed path as reported by `git status --porcelain`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeRecord {
    pub index_status: char,   // staged column
    pub working_status: char, // working tree column
    pub path: String,
}

impl ChangeRecord {
    /// the two status columns, used as the grouping key
    pub fn status_key(&self) -> String {
        [self.index_status, self.working_status].iter().collect()
    }

    pub fn category(&self) -> Category {
        Category::classify(self.index_status, self.working_status)
    }

    fn is_rename(&self) -> bool {
        self.index_status == 'R' || self.working_status == 'R'
    }

    /// path handed to `git add`
    ///
    /// renames are reported as `old -> new`; only the destination is staged
    pub fn stage_path(&self) -> &str {
        match self.path.split_once(" -> ") {
            Some((_, to)) if self.is_rename() => to,
            _ => self.path.as_str(),
        }
    }

    /// staged in the index before any selection was made
    pub fn is_staged(&self) -> bool {
        !matches!(self.index_status, ' ' | '?' | '!')
    }
}

/// display category for a change record
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    Modified,
    Added,
    Deleted,
    Renamed,
    Untracked,
}

impl Category {
    /// order in which groups are displayed
    pub const DISPLAY_ORDER: [Category; 5] = [
        Category::Modified,
        Category::Added,
        Category::Deleted,
        Category::Renamed,
        Category::Untracked,
    ];

    /// map a status pair to a category, first match wins
    pub fn classify(index: char, working: char) -> Self {
        match (index, working) {
            ('M', ' ') | (' ', 'M') | ('M', 'M') => Category::Modified,
            (' ', 'D') | ('D', ' ') | ('D', 'D') => Category::Deleted,
            ('A', ' ') | (' ', 'A') => Category::Added,
            ('R', _) => Category::Renamed,
            ('?', '?') => Category::Untracked,
            // unmerged and other exotic codes fall back to modified
            _ => Category::Modified,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::Modified => "MODIFIED",
            Category::Added => "ADDED",
            Category::Deleted => "DELETED",
            Category::Renamed => "RENAMED",
            Category::Untracked => "UNTRACKED",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// parse porcelain status output into records, preserving input order
///
/// lines shorter than three characters are skipped without error
pub fn parse_status(output: &str) -> Vec<ChangeRecord> {
    output
        .lines()
        .filter_map(|line| {
            let mut chars = line.chars();
            let index_status = chars.next()?;
            let working_status = chars.next()?;
            let rest = chars.as_str();
            if rest.is_empty() {
                return None;
            }
            let path = rest.trim();
            let path = match split_rename(path) {
                Some((from, to)) if index_status == 'R' || working_status == 'R' => {
                    format!("{} -> {}", unquote(from), unquote(to))
                }
                _ => unquote(path),
            };
            Some(ChangeRecord {
                index_status,
                working_status,
                path,
            })
        })
        .collect()
}

/// split `old -> new`, honouring a quoted source that may contain the arrow
fn split_rename(path: &str) -> Option<(&str, &str)> {
    if !path.starts_with('"') {
        return path.split_once(" -> ");
    }
    let mut escaped = false;
    for (i, c) in path.char_indices().skip(1) {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '"' => {
                let (from, rest) = path.split_at(i + 1);
                return rest.strip_prefix(" -> ").map(|to| (from, to));
            }
            _ => {}
        }
    }
    None
}

/// undo git's C-style quoting (`core.quotePath`)
///
/// unquoted paths are returned as-is; octal escapes are raw bytes, so the
/// result is rebuilt from bytes and decoded lossily
fn unquote(path: &str) -> String {
    let Some(inner) = path
        .strip_prefix('"')
        .and_then(|p| p.strip_suffix('"'))
    else {
        return path.to_string();
    };

    let mut bytes = Vec::with_capacity(inner.len());
    let mut rest = inner.as_bytes();
    while let Some((&b, tail)) = rest.split_first() {
        rest = tail;
        if b != b'\\' {
            bytes.push(b);
            continue;
        }
        let Some((&e, tail)) = rest.split_first() else {
            bytes.push(b'\\');
            break;
        };
        rest = tail;
        match e {
            b'n' => bytes.push(b'\n'),
            b't' => bytes.push(b'\t'),
            b'r' => bytes.push(b'\r'),
            b'a' => bytes.push(0x07),
            b'b' => bytes.push(0x08),
            b'f' => bytes.push(0x0c),
            b'v' => bytes.push(0x0b),
            b'0'..=b'7' => {
                let mut value = u32::from(e - b'0');
                let mut taken = 0;
                while taken < 2
                    && let Some((&(d @ b'0'..=b'7'), tail)) = rest.split_first()
                {
                    value = value * 8 + u32::from(d - b'0');
                    rest = tail;
                    taken += 1;
                }
                bytes.push(u8::try_from(value).unwrap_or(u8::MAX));
            }
            // \\ and \" and anything unknown stand for themselves
            other => bytes.push(other),
        }
    }
    String::from_utf8_lossy(&bytes).into_owned()
}

/// partition records by status key, keeping relative order within each group
pub fn group_by_status(records: &[ChangeRecord]) -> BTreeMap<String, Vec<ChangeRecord>> {
    let mut groups: BTreeMap<String, Vec<ChangeRecord>> = BTreeMap::new();
    for record in records {
        groups
            .entry(record.status_key())
            .or_default()
            .push(record.clone());
    }
    groups
}
