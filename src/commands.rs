//! Entry points behind the `mesongo` binary and the real process and
//! terminal backends the pipeline runs against.

use crate::cli::{self, Request};
use crate::editor::WorkspaceEditorFiles;
use crate::error::{Error, Result};
use crate::fingerprint::SourceFingerprintCache;
use crate::global_cfg::{AppDirs, ToolConfig};
use crate::locator::locate_project_root;
use crate::parser::{ProjectDescriptor, ProjectLayout};
use crate::pipeline::{CommandRunner, Invocation, PipelineController, Terminal};
use crate::templates::{DialoguerPrompter, TemplateLibrary};
use crate::utils::log::{log, LogLevel};
use std::env;
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};

/// Spawns programs with the terminal's stdio and waits for them
#[derive(Debug, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&mut self, invocation: &Invocation) -> Result<i32> {
        log(
            LogLevel::Debug,
            &format!("Running `{}` in {}", invocation.command_line(), invocation.cwd.display()),
        );
        let status = Command::new(&invocation.program)
            .args(&invocation.args)
            .current_dir(&invocation.cwd)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|source| Error::Spawn {
                program: invocation.program.clone(),
                source,
            })?;
        Ok(status_code(status))
    }
}

/// A process killed by a signal reports `128 + signal`, like a shell does
fn status_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    1
}

/// The user's real terminal and system clipboard
#[derive(Debug, Default)]
pub struct SystemTerminal;

impl Terminal for SystemTerminal {
    fn clear_screen(&mut self) {
        #[cfg(target_os = "windows")]
        let result = Command::new("cmd").args(["/C", "cls"]).status();
        #[cfg(not(target_os = "windows"))]
        let result = Command::new("clear").status();

        if let Err(why) = result {
            log(LogLevel::Warn, &format!("Could not clear the screen: {}", why));
        }
    }

    fn copy_to_clipboard(&mut self, text: &str) -> Result<()> {
        let clipboard_err = |e: arboard::Error| Error::Clipboard {
            message: e.to_string(),
        };
        let mut clipboard = arboard::Clipboard::new().map_err(clipboard_err)?;
        clipboard.set_text(text).map_err(clipboard_err)
    }
}

/// Parses `argv` (program name first), runs the requested mode and returns
/// the process exit code.
pub fn run_cli(argv: Vec<String>) -> i32 {
    let request = match cli::parse_request(&argv) {
        Ok(request) => request,
        Err(err) => {
            let code = if err.use_stderr() { 1 } else { 0 };
            if let Err(why) = err.print() {
                log(LogLevel::Error, &format!("Could not print usage: {}", why));
            }
            return code;
        }
    };

    let cwd = match env::current_dir() {
        Ok(cwd) => cwd,
        Err(why) => {
            log(LogLevel::Error, &format!("Could not read the current directory: {}", why));
            return 1;
        }
    };
    let dirs = match AppDirs::discover() {
        Ok(dirs) => dirs,
        Err(e) => {
            log(LogLevel::Error, &e.to_string());
            return 1;
        }
    };

    if let Some(action) = request.template {
        let library = TemplateLibrary::new(dirs.template_store());
        return match library.run_action(action, &mut DialoguerPrompter::default(), &cwd) {
            Ok(()) => 0,
            Err(e) => {
                log(LogLevel::Error, &e.to_string());
                1
            }
        };
    }

    let config = match ToolConfig::load(&dirs.config_file()) {
        Ok(config) => config,
        Err(e) => {
            log(LogLevel::Error, &e.to_string());
            return 1;
        }
    };
    run_build(&cwd, &request, &config)
}

/// Locates the project above `cwd` and drives the pipeline for it
pub fn run_build(cwd: &Path, request: &Request, config: &ToolConfig) -> i32 {
    let max_depth = request.max_depth.unwrap_or(config.search.max_depth);
    let root = match locate_project_root(cwd, max_depth, &config.descriptor.file) {
        Ok(root) => root,
        Err(e) => {
            log(LogLevel::Error, &e.to_string());
            return 1;
        }
    };
    log(LogLevel::Info, &format!("Project root: {}", root.display()));

    let descriptor = match ProjectDescriptor::resolve(&root, &config.descriptor) {
        Ok(descriptor) => descriptor,
        Err(e) => {
            log(LogLevel::Error, &e.to_string());
            return 1;
        }
    };
    let layout = ProjectLayout::new(&root, &descriptor);
    let cache = SourceFingerprintCache::new(
        &root,
        &config.sources.cache_file,
        &config.sources.extensions,
    )
    .excluding(&layout.build_dir);
    let editor = WorkspaceEditorFiles;
    let controller = PipelineController::new(
        &layout,
        &request.flags,
        &request.groups,
        &config.tools,
        &cache,
        &editor,
    );

    match controller.run(&mut SystemRunner, &mut SystemTerminal) {
        Ok(code) => code,
        Err(e) => {
            log(LogLevel::Error, &e.to_string());
            e.exit_code()
        }
    }
}
