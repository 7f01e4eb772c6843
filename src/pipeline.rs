//! Build pipeline
//!
//! Decides which stages run for one invocation and drives them in order:
//!
//! 1. `ClearArtifacts` (only this, when `-clear` is given)
//! 2. `SetupOrReconfigure`: full setup when forced or when there is no build
//!    directory yet, otherwise a reconfigure if the source listing changed
//! 3. `Compile`
//! 4. `Install`
//! 5. `Execute`
//!
//! Every stage blocks on at most one external program. A failing stage ends
//! the run with that stage's exit code; nothing is retried.

use crate::args::{ArgumentGroups, Group};
use crate::editor::EditorConfigSync;
use crate::error::Error;
use crate::fingerprint::SourceFingerprintCache;
use crate::global_cfg::ToolsConfig;
use crate::parser::ProjectLayout;
use crate::utils::fs::{remove_dir_if_exists, remove_file_if_exists};
use crate::utils::log::{log, LogLevel};
use std::fmt;
use std::path::{Component, Path, PathBuf};

/// An external program to run, with its arguments and working directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
}

impl Invocation {
    pub fn new(program: impl Into<String>, cwd: &Path) -> Self {
        Invocation {
            program: program.into(),
            args: Vec::new(),
            cwd: cwd.to_path_buf(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Shell-like rendering for logs and the clipboard
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Runs external programs. `Ok` carries the exit code; `Err` means the
/// program could not be started.
pub trait CommandRunner {
    fn run(&mut self, invocation: &Invocation) -> Result<i32, Error>;
}

/// Side effects on the user's terminal session
pub trait Terminal {
    fn clear_screen(&mut self);
    fn copy_to_clipboard(&mut self, text: &str) -> Result<(), Error>;
}

/// Build type passed to a full setup
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BuildMode {
    /// Whatever the descriptor declares
    #[default]
    Default,
    Release,
    Debug,
}

impl BuildMode {
    fn setup_flag(self) -> Option<&'static str> {
        match self {
            BuildMode::Default => None,
            BuildMode::Release => Some("--buildtype=release"),
            BuildMode::Debug => Some("--buildtype=debug"),
        }
    }
}

/// Switches parsed once from the command line. Read-only during a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineFlags {
    pub force_setup: bool,
    pub build_mode: BuildMode,
    pub skip_compile: bool,
    pub skip_install: bool,
    pub skip_execute: bool,
    pub clear_artifacts: bool,
    pub clear_screen: bool,
    pub move_to_output: bool,
    pub no_separator: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ClearArtifacts,
    SetupOrReconfigure,
    Compile,
    Install,
    Execute,
}

impl Stage {
    pub const ORDER: [Stage; 5] = [
        Stage::ClearArtifacts,
        Stage::SetupOrReconfigure,
        Stage::Compile,
        Stage::Install,
        Stage::Execute,
    ];

    /// Process exit status when this stage fails
    pub fn failure_exit_code(self) -> i32 {
        match self {
            Stage::ClearArtifacts | Stage::SetupOrReconfigure | Stage::Execute => 1,
            Stage::Compile => 2,
            Stage::Install => 3,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::ClearArtifacts => "clear",
            Stage::SetupOrReconfigure => "setup",
            Stage::Compile => "compile",
            Stage::Install => "install",
            Stage::Execute => "execute",
        };
        f.write_str(name)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error("{stage} failed with exit code {code}")]
    Failed { stage: Stage, code: i32 },

    #[error("{stage} could not run: {source}")]
    Spawn {
        stage: Stage,
        #[source]
        source: Error,
    },

    #[error("Some artifacts could not be removed")]
    ClearIncomplete,
}

impl PipelineError {
    pub fn stage(&self) -> Stage {
        match self {
            PipelineError::Failed { stage, .. } | PipelineError::Spawn { stage, .. } => *stage,
            PipelineError::ClearIncomplete => Stage::ClearArtifacts,
        }
    }

    pub fn exit_code(&self) -> i32 {
        self.stage().failure_exit_code()
    }
}

pub struct PipelineController<'a> {
    layout: &'a ProjectLayout,
    flags: &'a PipelineFlags,
    groups: &'a ArgumentGroups,
    tools: &'a ToolsConfig,
    cache: &'a SourceFingerprintCache,
    editor: &'a dyn EditorConfigSync,
}

impl<'a> PipelineController<'a> {
    pub fn new(
        layout: &'a ProjectLayout,
        flags: &'a PipelineFlags,
        groups: &'a ArgumentGroups,
        tools: &'a ToolsConfig,
        cache: &'a SourceFingerprintCache,
        editor: &'a dyn EditorConfigSync,
    ) -> Self {
        PipelineController {
            layout,
            flags,
            groups,
            tools,
            cache,
            editor,
        }
    }

    /// The stages this run will enter, in order. Preconditions checked at
    /// run time (build directory present, sources changed) may still make
    /// `SetupOrReconfigure` a no-op.
    pub fn plan(&self) -> Vec<Stage> {
        let flags = self.flags;
        if flags.clear_artifacts {
            return vec![Stage::ClearArtifacts];
        }
        Stage::ORDER
            .into_iter()
            .filter(|stage| match stage {
                Stage::ClearArtifacts => false,
                Stage::SetupOrReconfigure => true,
                Stage::Compile => !flags.skip_compile,
                Stage::Install => !flags.skip_compile && !flags.skip_install,
                Stage::Execute => !flags.skip_execute || flags.move_to_output,
            })
            .collect()
    }

    /// Runs the planned stages. `Ok` is the process exit status: 0, or the
    /// executed program's own status.
    pub fn run(
        &self,
        runner: &mut dyn CommandRunner,
        terminal: &mut dyn Terminal,
    ) -> Result<i32, PipelineError> {
        let mut built = false;
        for stage in self.plan() {
            log(LogLevel::Debug, &format!("Entering stage: {}", stage));
            match stage {
                Stage::ClearArtifacts => return self.clear_artifacts(),
                Stage::SetupOrReconfigure => built |= self.setup_or_reconfigure(runner)?,
                Stage::Compile => {
                    self.run_stage(stage, runner, &self.compile_invocation())?;
                    built = true;
                }
                Stage::Install => self.run_stage(stage, runner, &self.install_invocation())?,
                Stage::Execute => return self.execute(runner, terminal, built),
            }
        }
        Ok(0)
    }

    /// Returns whether a setup or reconfigure actually ran.
    fn setup_or_reconfigure(&self, runner: &mut dyn CommandRunner) -> Result<bool, PipelineError> {
        let stage = Stage::SetupOrReconfigure;
        if self.flags.force_setup || !self.layout.build_dir.exists() {
            log(LogLevel::Log, "Running full setup...");
            if let Err(why) = self.editor.sync_editor_config(self.layout) {
                log(LogLevel::Warn, &format!("Editor config not updated: {}", why));
            }
            self.run_stage(stage, runner, &self.setup_invocation())?;
            if let Err(why) = self.cache.refresh() {
                log(LogLevel::Warn, &format!("Source cache not refreshed: {}", why));
            }
            return Ok(true);
        }

        let changed = self.cache.needs_reconfigure().unwrap_or_else(|why| {
            log(LogLevel::Warn, &format!("Source cache not persisted: {}", why));
            true
        });
        if !changed {
            log(LogLevel::Info, "Sources unchanged, skipping setup");
            return Ok(false);
        }
        log(LogLevel::Log, "New sources detected, reconfiguring...");
        self.run_stage(stage, runner, &self.reconfigure_invocation())?;
        Ok(true)
    }

    fn execute(
        &self,
        runner: &mut dyn CommandRunner,
        terminal: &mut dyn Terminal,
        built: bool,
    ) -> Result<i32, PipelineError> {
        let invocation = self.execute_invocation();
        if self.flags.move_to_output {
            let cd = format!("cd {}", self.layout.output_dir.display());
            let text = if self.flags.skip_execute {
                cd
            } else {
                format!("{}\n{}", cd, invocation.command_line())
            };
            match terminal.copy_to_clipboard(&text) {
                Ok(()) => log(LogLevel::Log, "Commands copied to clipboard."),
                Err(why) => {
                    log(LogLevel::Warn, &format!("{}; run these yourself:", why));
                    println!("{}", text);
                }
            }
            return Ok(0);
        }

        if self.flags.clear_screen {
            terminal.clear_screen();
        } else if built && !self.flags.no_separator {
            println!("\n{}\n", "-".repeat(93));
        }
        log(LogLevel::Log, &format!("Running: {}", invocation.command_line()));
        runner.run(&invocation).map_err(|source| PipelineError::Spawn {
            stage: Stage::Execute,
            source,
        })
    }

    /// Removes the executable, output and build directories and the source
    /// cache. Never removes the project root itself.
    fn clear_artifacts(&self) -> Result<i32, PipelineError> {
        let layout = self.layout;
        let results = [
            !self.strictly_inside_root(&layout.executable)
                || remove_file_if_exists(&layout.executable),
            self.remove_build_dir(&layout.output_dir),
            self.remove_build_dir(&layout.build_dir),
            self.cache.clear(),
        ];
        if results.iter().all(|removed| *removed) {
            log(LogLevel::Log, "Cleared artifacts");
            Ok(0)
        } else {
            Err(PipelineError::ClearIncomplete)
        }
    }

    fn remove_build_dir(&self, dir: &Path) -> bool {
        if !self.strictly_inside_root(dir) {
            return true;
        }
        remove_dir_if_exists(dir)
    }

    /// True when `path` is below the root through plain names only. The root
    /// itself, anything outside it and anything reached through `..` is refused.
    fn strictly_inside_root(&self, path: &Path) -> bool {
        let inside = match path.strip_prefix(&self.layout.root) {
            Ok(relative) => {
                relative
                    .components()
                    .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
                    && relative.components().any(|c| matches!(c, Component::Normal(_)))
            }
            Err(_) => false,
        };
        if !inside {
            log(
                LogLevel::Warn,
                &format!("Not removing {}: it is not inside the project", path.display()),
            );
        }
        inside
    }

    fn run_stage(
        &self,
        stage: Stage,
        runner: &mut dyn CommandRunner,
        invocation: &Invocation,
    ) -> Result<(), PipelineError> {
        log(LogLevel::Log, &format!("Running: {}", invocation.command_line()));
        match runner.run(invocation) {
            Ok(0) => Ok(()),
            Ok(code) => {
                log(LogLevel::Error, &format!("{} failed with exit code {}", stage, code));
                Err(PipelineError::Failed { stage, code })
            }
            Err(source) => Err(PipelineError::Spawn { stage, source }),
        }
    }

    fn build_dir_arg(&self) -> String {
        self.layout.build_dir.display().to_string()
    }

    pub fn setup_invocation(&self) -> Invocation {
        Invocation::new(&self.tools.meson, &self.layout.root)
            .arg("setup")
            .arg(self.build_dir_arg())
            .arg("--wipe")
            .args(self.flags.build_mode.setup_flag())
            .args(self.groups.get(Group::Setup).iter().cloned())
    }

    pub fn reconfigure_invocation(&self) -> Invocation {
        Invocation::new(&self.tools.meson, &self.layout.root)
            .args(["setup", "--reconfigure"])
            .arg(self.build_dir_arg())
    }

    pub fn compile_invocation(&self) -> Invocation {
        Invocation::new(&self.tools.ninja, &self.layout.root)
            .arg("-C")
            .arg(self.build_dir_arg())
            .args(self.groups.get(Group::Compile).iter().cloned())
    }

    pub fn install_invocation(&self) -> Invocation {
        Invocation::new(&self.tools.meson, &self.layout.root)
            .args(["install", "-C"])
            .arg(self.build_dir_arg())
    }

    pub fn execute_invocation(&self) -> Invocation {
        Invocation::new(self.layout.executable.display().to_string(), &self.layout.root)
            .args(self.groups.get(Group::Run).iter().cloned())
    }
}
