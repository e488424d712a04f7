use crate::constants::DEFAULT_REMOTE;
use clap::Parser;

/// git-guided-commit: pick changed files, describe them, and commit them in small steps
#[derive(Parser, Debug)]
#[command(
    name = "git-guided-commit",
    about,
    long_about = None,
    disable_version_flag = true
)]
pub struct Cli {
    /// remote used for the existence probe and the final push
    #[arg(long, default_value = DEFAULT_REMOTE, value_name = "NAME")]
    pub remote: String,

    /// print every git command before it runs
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_defaults_to_origin() {
        let cli = Cli::try_parse_from(["git-guided-commit"]).unwrap();
        assert_eq!(cli.remote, "origin");
        assert!(!cli.verbose);
    }

    #[test]
    fn remote_and_verbose_can_be_set() {
        let cli =
            Cli::try_parse_from(["git-guided-commit", "--remote", "upstream", "-v"]).unwrap();
        assert_eq!(cli.remote, "upstream");
        assert!(cli.verbose);
    }
}
