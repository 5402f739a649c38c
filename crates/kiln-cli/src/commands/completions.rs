//! Shell completion generation.

use std::io;

use clap::CommandFactory;
use clap_complete::{Generator, generate, shells};

use crate::{
    cli::{Cli, CompletionsArgs, Shell},
    error::CliResult,
};

const BIN_NAME: &str = "kiln";

pub fn execute(args: CompletionsArgs) -> CliResult<()> {
    let mut stdout = io::stdout();
    match args.shell {
        Shell::Bash => write_script(shells::Bash, &mut stdout),
        Shell::Zsh => write_script(shells::Zsh, &mut stdout),
        Shell::Fish => write_script(shells::Fish, &mut stdout),
        Shell::PowerShell => write_script(shells::PowerShell, &mut stdout),
        Shell::Elvish => write_script(shells::Elvish, &mut stdout),
    }
    Ok(())
}

fn write_script(shell: impl Generator, out: &mut dyn io::Write) {
    generate(shell, &mut Cli::command(), BIN_NAME, out);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bash_script_mentions_subcommands() {
        let mut buf = Vec::new();
        write_script(shells::Bash, &mut buf);
        let script = String::from_utf8(buf).unwrap();
        assert!(script.contains("kiln"));
        assert!(script.contains("generate"));
        assert!(script.contains("clean"));
    }
}
