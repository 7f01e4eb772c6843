//! Command-line parsing
//!
//! The raw arguments are first split into groups (see `args`). Only the
//! default group is parsed as flags. Multi-letter flags are written with a
//! single dash (`-ms`, `-ne`, ...), so they are rewritten to their long form
//! before clap sees them.

use crate::args::{ArgumentGroups, Sentinels};
use crate::pipeline::{BuildMode, PipelineFlags};
use crate::templates::TemplateAction;
use clap::Parser;

/// Flags spelled with one dash but more than one letter
const SINGLE_DASH_LONG_FLAGS: [&str; 6] = ["-ms", "-ne", "-nc", "-ni", "-nb", "-clear"];

const AFTER_HELP: &str = "\
Multi-letter flags may be written with a single dash: -ms, -ne, -nc, -ni, -nb, -clear.

Argument groups (each runs until the next group or the end of the line):
  -Ab ARGS...  Extra arguments for meson setup
  -Ac ARGS...  Extra arguments for ninja
  -Ae ARGS...  Arguments for the executable

Template mode:
  -T list      List available templates
  -T get       Import a template into the current directory
  -T create    Save the current directory as a new template
  -T remove    Delete an existing template

Exit codes: 0 success, 1 setup or configuration failure, 2 compile failure,
3 install failure; otherwise the exit code of the executed program.";

#[derive(Parser, Debug)]
#[command(
    name = "mesongo",
    about = "Configure, compile, install and run a Meson project in one step",
    after_help = AFTER_HELP
)]
pub struct Cli {
    /// Max meson.build search depth above the current directory [default: 5]
    #[arg(
        long = "ms",
        value_name = "DEPTH",
        allow_negative_numbers = true,
        value_parser = clap::value_parser!(i64).range(0..)
    )]
    pub max_search: Option<i64>,

    /// Force a full meson setup
    #[arg(short = 's')]
    pub setup: bool,

    /// Release build (wins over -d)
    #[arg(short = 'r')]
    pub release: bool,

    /// Debug build
    #[arg(short = 'd')]
    pub debug: bool,

    /// Don't execute
    #[arg(long = "ne")]
    pub no_execute: bool,

    /// Don't compile (also skips install)
    #[arg(long = "nc")]
    pub no_compile: bool,

    /// Don't install
    #[arg(long = "ni")]
    pub no_install: bool,

    /// No separator line between build output and program output
    #[arg(long = "nb")]
    pub no_separator: bool,

    /// Clear the terminal before running
    #[arg(short = 'c')]
    pub clear_screen: bool,

    /// Copy `cd <output dir>` and the run command to the clipboard instead of running
    #[arg(short = 'm')]
    pub move_to_output: bool,

    /// Remove the build directory, executable and source cache, then exit
    #[arg(long = "clear")]
    pub clear: bool,

    /// Template mode; skips the build entirely
    #[arg(short = 'T', value_enum, value_name = "MODE")]
    pub template: Option<TemplateAction>,
}

impl Cli {
    pub fn pipeline_flags(&self) -> PipelineFlags {
        let build_mode = if self.release {
            BuildMode::Release
        } else if self.debug {
            BuildMode::Debug
        } else {
            BuildMode::Default
        };
        PipelineFlags {
            force_setup: self.setup,
            build_mode,
            skip_compile: self.no_compile,
            skip_install: self.no_install,
            skip_execute: self.no_execute,
            clear_artifacts: self.clear,
            clear_screen: self.clear_screen,
            move_to_output: self.move_to_output,
            no_separator: self.no_separator,
        }
    }
}

/// Everything one invocation asked for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub flags: PipelineFlags,
    pub template: Option<TemplateAction>,
    /// `None` means the configured default
    pub max_depth: Option<usize>,
    pub groups: ArgumentGroups,
}

/// Rewrites `-ms` style flags to `--ms`; everything else is left as is
pub fn normalize_flags(tokens: &[String]) -> Vec<String> {
    tokens
        .iter()
        .map(|token| {
            if SINGLE_DASH_LONG_FLAGS.contains(&token.as_str()) {
                format!("-{}", token)
            } else {
                token.clone()
            }
        })
        .collect()
}

/// Parses a full argument vector, program name first.
pub fn parse_request(argv: &[String]) -> Result<Request, clap::Error> {
    let (program, rest) = match argv.split_first() {
        Some((program, rest)) => (program.clone(), rest),
        None => ("mesongo".to_string(), &[][..]),
    };
    let groups = ArgumentGroups::route(rest, &Sentinels::default());
    let flags = normalize_flags(&groups.default);
    let cli = Cli::try_parse_from(std::iter::once(program).chain(flags))?;

    Ok(Request {
        flags: cli.pipeline_flags(),
        template: cli.template,
        max_depth: cli
            .max_search
            .map(|depth| usize::try_from(depth).unwrap_or(usize::MAX)),
        groups,
    })
}
