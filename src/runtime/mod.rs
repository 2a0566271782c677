use anyhow::{Context, Result};

use crate::cli::{Command, ConfigCommand, FilesCommand, TagsCommand};
use crate::config::{self, Settings};

mod concat;
mod organize;
mod prompt;
mod settings;
mod source;
mod tags;

pub use settings::load_settings;

pub fn run(command: &Command, settings: &Settings) -> Result<()> {
    match command {
        Command::Files(FilesCommand::Organize(args)) => organize::organize(args, settings),
        Command::Files(FilesCommand::Concat(args)) => concat::concat(args, settings),
        Command::Files(FilesCommand::Autoname(args)) => organize::autoname(args, settings),
        Command::Tags(TagsCommand::Print(args)) => tags::print(args, settings),
        Command::Tags(TagsCommand::Set(args)) => tags::set(args, settings),
        Command::Tags(TagsCommand::Verify(args)) => tags::verify_files(args, settings),
        Command::Config(ConfigCommand::Show) => {
            let rendered = settings.to_toml().context("cannot render settings")?;
            print!("{rendered}");
            Ok(())
        }
        Command::Config(ConfigCommand::Path) => {
            match config::resolve_config_path() {
                Some(path) => println!("{}", path.display()),
                None => println!("(no config location: HOME is not set)"),
            }
            Ok(())
        }
    }
}
