use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::LogLevel;

#[derive(Debug, Parser)]
#[command(name = "bindery")]
#[command(about = "Organize, tag and bind m4b audiobooks")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Log verbosity; overrides the config file, `RUST_LOG` overrides both
    #[arg(short, long, global = true, value_enum)]
    pub log_level: Option<LogLevel>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Move, rename and merge audiobook files
    #[command(subcommand)]
    Files(FilesCommand),

    /// Inspect and edit audiobook metadata
    #[command(subcommand)]
    Tags(TagsCommand),

    /// Inspect the effective configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

/// Where to look for input files.
#[derive(Debug, Clone, Args)]
pub struct SourceArgs {
    /// File or directory to process (defaults to the working directory)
    #[arg(short, long)]
    pub source: Option<PathBuf>,

    /// Descend into subdirectories
    #[arg(short, long)]
    pub recurse: bool,
}

#[derive(Debug, Subcommand)]
pub enum FilesCommand {
    /// Move m4b files into `{dest}/{author}/{title}/{author} - {title}.m4b`
    Organize(OrganizeArgs),

    /// Merge numbered tracks into one chaptered m4b
    Concat(ConcatArgs),

    /// Rename m4b files in place to `{author} - {title}.m4b`
    Autoname(SourceArgs),
}

#[derive(Debug, Args)]
pub struct OrganizeArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Library root (falls back to `organize.destination`, then the working directory)
    #[arg(short, long)]
    pub destination: Option<PathBuf>,

    /// Remove source directories left empty after moving
    #[arg(long, overrides_with = "no_prune")]
    pub prune: bool,

    /// Keep emptied source directories even if the config enables pruning
    #[arg(long, overrides_with = "prune")]
    pub no_prune: bool,

    /// Octal mode for created directories, e.g. 0775
    #[arg(long, value_name = "OCTAL")]
    pub dir_mode: Option<String>,

    /// Octal mode for moved files, e.g. 0664
    #[arg(long, value_name = "OCTAL")]
    pub file_mode: Option<String>,

    /// Only report where files would go
    #[arg(long)]
    pub dry_run: bool,
}

impl OrganizeArgs {
    /// `Some` only when a flag was given.
    pub fn prune_override(&self) -> Option<bool> {
        match (self.prune, self.no_prune) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }
}

#[derive(Debug, Args)]
pub struct ConcatArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Directory for the merged file (defaults to the source directory)
    #[arg(short, long)]
    pub destination: Option<PathBuf>,

    /// Extension of the tracks to merge
    #[arg(short, long)]
    pub format: Option<String>,

    /// Base name of the merged file, without extension
    #[arg(short, long)]
    pub output: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum TagsCommand {
    /// Print the tags of each m4b file
    Print(SourceArgs),

    /// Fill in and correct tags, interactively unless told otherwise
    Set(SetArgs),

    /// Report missing or inconsistent tags
    Verify(VerifyArgs),
}

#[derive(Debug, Args)]
pub struct SetArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Author(s), separated by ';'
    #[arg(short, long)]
    pub author: Option<String>,

    /// Book title
    #[arg(short, long)]
    pub title: Option<String>,

    /// Release date or year
    #[arg(long)]
    pub date: Option<String>,

    /// Genre; repeat for several
    #[arg(short, long = "genre")]
    pub genres: Vec<String>,

    #[arg(long)]
    pub description: Option<String>,

    /// Narrator(s), separated by ';'
    #[arg(short, long)]
    pub narrator: Option<String>,

    #[arg(long)]
    pub series_name: Option<String>,

    /// Position in the series, e.g. 3 or 2.5
    #[arg(long)]
    pub series_part: Option<f64>,

    /// PNG or JPEG front cover
    #[arg(long, value_name = "IMAGE")]
    pub cover: Option<PathBuf>,

    /// Never prompt; only the values given as flags are applied
    #[arg(long)]
    pub no_input: bool,

    /// Save without asking for confirmation
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Debug, Args)]
pub struct VerifyArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Copy the present side of half-filled mirrored tags and save
    #[arg(long)]
    pub fix: bool,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the effective settings as TOML
    Show,
    /// Print the config file location
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn organize_flags_parse() {
        let cli = Cli::try_parse_from([
            "bindery", "-l", "debug", "files", "organize", "-s", "/in", "--dir-mode", "0775",
            "--file-mode", "0664", "--no-prune",
        ])
        .unwrap();
        assert_eq!(cli.log_level, Some(LogLevel::Debug));
        let Command::Files(FilesCommand::Organize(args)) = cli.command else {
            panic!("expected files organize");
        };
        assert_eq!(args.source.source, Some(PathBuf::from("/in")));
        assert_eq!(args.dir_mode.as_deref(), Some("0775"));
        assert_eq!(args.prune_override(), Some(false));
    }

    #[test]
    fn last_prune_flag_wins() {
        let cli =
            Cli::try_parse_from(["bindery", "files", "organize", "--no-prune", "--prune"]).unwrap();
        let Command::Files(FilesCommand::Organize(args)) = cli.command else {
            panic!("expected files organize");
        };
        assert_eq!(args.prune_override(), Some(true));

        let cli = Cli::try_parse_from(["bindery", "files", "organize"]).unwrap();
        let Command::Files(FilesCommand::Organize(args)) = cli.command else {
            panic!("expected files organize");
        };
        assert_eq!(args.prune_override(), None);
    }

    #[test]
    fn set_accepts_repeated_genres_and_log_level_after_subcommand() {
        let cli = Cli::try_parse_from([
            "bindery", "tags", "set", "-g", "Fantasy", "--genre", "Adventure", "--series-part",
            "2.5", "--no-input", "--log-level", "warning",
        ])
        .unwrap();
        assert_eq!(cli.log_level, Some(LogLevel::Warn));
        let Command::Tags(TagsCommand::Set(args)) = cli.command else {
            panic!("expected tags set");
        };
        assert_eq!(args.genres, ["Fantasy", "Adventure"]);
        assert_eq!(args.series_part, Some(2.5));
        assert!(args.no_input);
    }
}
