// commit title
pub const MIN_TITLE_LENGTH: usize = 10;
pub const MAX_TITLE_LENGTH: usize = 72;
pub const RECOMMENDED_TITLE_LENGTH: usize = 50;

// branches
pub const MAX_BRANCH_NAME_LENGTH: usize = 50;
pub const PROTECTED_BRANCHES: [&str; 2] = ["main", "master"];
pub const DEFAULT_REMOTE: &str = "origin";

// ui
pub const LARGE_SELECTION: usize = 10;
pub const PREVIEW_WIDTH: usize = 70;
pub const PREVIEW_WRAP: usize = 66;
