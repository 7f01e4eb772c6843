//! Editor integration
//!
//! After a full setup the debugger launch profile and the clangd config are
//! pointed at the freshly configured build. Both files are optional and both
//! rewrites are best-effort: the pipeline logs a failure and carries on.

use crate::parser::ProjectLayout;
use crate::utils::log::{log, LogLevel};
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

const LAUNCH_JSON: &str = ".vscode/launch.json";
const CLANGD: &str = ".clangd";
const CLANGD_KEY: &str = "CompilationDatabase:";

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to update {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// More than one file failed; messages are kept in order.
    #[error("{}", .0.join("; "))]
    Several(Vec<String>),
}

/// Points editor tooling at the current build outputs.
pub trait EditorConfigSync {
    fn sync_editor_config(&self, layout: &ProjectLayout) -> Result<(), SyncError>;
}

/// Rewrites `.vscode/launch.json` and `.clangd` under the project root
#[derive(Debug, Clone, Default)]
pub struct WorkspaceEditorFiles;

impl EditorConfigSync for WorkspaceEditorFiles {
    fn sync_editor_config(&self, layout: &ProjectLayout) -> Result<(), SyncError> {
        let program = format!("${{workspaceFolder}}/{}", layout.relative(&layout.executable));
        let database = layout.relative(&layout.build_dir);

        let mut failures: Vec<SyncError> = [
            update_launch_program(&layout.root.join(LAUNCH_JSON), &program),
            update_clangd_database(&layout.root.join(CLANGD), &database),
        ]
        .into_iter()
        .filter_map(|result| result.err())
        .collect();

        match failures.len() {
            0 => Ok(()),
            1 => Err(failures.remove(0)),
            _ => Err(SyncError::Several(failures.iter().map(|e| e.to_string()).collect())),
        }
    }
}

/// Sets `program` in every entry of `configurations`
pub fn update_launch_program(path: &Path, program: &str) -> Result<(), SyncError> {
    if !path.exists() {
        log(LogLevel::Info, &format!("{} not found, skipping", path.display()));
        return Ok(());
    }
    let io_err = |source| SyncError::Io {
        path: path.to_path_buf(),
        source,
    };
    let json_err = |source| SyncError::Json {
        path: path.to_path_buf(),
        source,
    };

    let contents = fs::read_to_string(path).map_err(io_err)?;
    let mut data: Value = serde_json::from_str(&contents).map_err(json_err)?;
    let Some(configurations) = data.get_mut("configurations").and_then(Value::as_array_mut) else {
        log(LogLevel::Info, &format!("No configurations in {}", path.display()));
        return Ok(());
    };
    if configurations.is_empty() {
        return Ok(());
    }
    for configuration in configurations.iter_mut() {
        if let Some(entry) = configuration.as_object_mut() {
            entry.insert("program".to_string(), Value::String(program.to_string()));
        }
    }

    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    data.serialize(&mut serializer).map_err(json_err)?;
    fs::write(path, out).map_err(io_err)?;
    log(LogLevel::Info, &format!("Updated {}", path.display()));
    Ok(())
}

/// Rewrites the `CompilationDatabase:` line keeping its indentation, or
/// appends one when the key is absent
pub fn update_clangd_database(path: &Path, database: &str) -> Result<(), SyncError> {
    if !path.exists() {
        log(LogLevel::Info, &format!("{} not found, skipping", path.display()));
        return Ok(());
    }
    let contents = fs::read_to_string(path).map_err(|source| SyncError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let updated = rewrite_clangd(&contents, database);
    fs::write(path, updated).map_err(|source| SyncError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    log(LogLevel::Info, &format!("Updated {}", path.display()));
    Ok(())
}

fn rewrite_clangd(contents: &str, database: &str) -> String {
    let mut replaced = false;
    let mut lines: Vec<String> = contents
        .lines()
        .map(|line| {
            let trimmed = line.trim_start();
            if trimmed.starts_with(CLANGD_KEY) {
                replaced = true;
                let indent = &line[..line.len() - trimmed.len()];
                format!("{}{} {}", indent, CLANGD_KEY, database)
            } else {
                line.to_string()
            }
        })
        .collect();
    if !replaced {
        lines.push(format!("{} {}", CLANGD_KEY, database));
    }
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ProjectDescriptor;
    use tempfile::TempDir;

    fn layout(root: &Path) -> ProjectLayout {
        let descriptor = ProjectDescriptor {
            path: root.join("meson.build"),
            build_dir: "builddir".to_string(),
            output_subdir: "bin".to_string(),
            output_name: "demo".to_string(),
        };
        ProjectLayout::new(root, &descriptor)
    }

    #[test]
    fn test_rewrite_clangd_keeps_indentation() {
        let contents = "CompileFlags:\n  Add: [-Wall]\nIf:\n    CompilationDatabase: old/dir\n";
        let updated = rewrite_clangd(contents, "builddir");
        assert_eq!(
            updated,
            "CompileFlags:\n  Add: [-Wall]\nIf:\n    CompilationDatabase: builddir\n"
        );
    }

    #[test]
    fn test_rewrite_clangd_appends_missing_key() {
        let updated = rewrite_clangd("CompileFlags:\n  Add: [-Wall]", "builddir");
        assert_eq!(updated, "CompileFlags:\n  Add: [-Wall]\nCompilationDatabase: builddir\n");
    }

    #[test]
    fn test_launch_json_every_configuration_updated() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("launch.json");
        fs::write(
            &path,
            r#"{"version": "0.2.0", "configurations": [
                {"name": "gdb", "program": "old"},
                {"name": "lldb"}
            ]}"#,
        )
        .unwrap();

        update_launch_program(&path, "${workspaceFolder}/builddir/bin/demo").unwrap();

        let data: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        for configuration in data["configurations"].as_array().unwrap() {
            assert_eq!(configuration["program"], "${workspaceFolder}/builddir/bin/demo");
        }
        assert_eq!(data["version"], "0.2.0");
        assert!(fs::read_to_string(&path).unwrap().contains("\n    \"configurations\""));
    }

    #[test]
    fn test_missing_files_are_skipped() {
        let temp = TempDir::new().unwrap();
        WorkspaceEditorFiles.sync_editor_config(&layout(temp.path())).unwrap();
        assert!(!temp.path().join(".vscode").exists());
        assert!(!temp.path().join(".clangd").exists());
    }

    #[test]
    fn test_sync_writes_workspace_relative_paths() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join(".vscode")).unwrap();
        fs::write(
            temp.path().join(LAUNCH_JSON),
            r#"{"configurations": [{"name": "debug"}]}"#,
        )
        .unwrap();
        fs::write(temp.path().join(CLANGD), "CompilationDatabase: stale\n").unwrap();

        WorkspaceEditorFiles.sync_editor_config(&layout(temp.path())).unwrap();

        let launch = fs::read_to_string(temp.path().join(LAUNCH_JSON)).unwrap();
        let expected = format!(
            "${{workspaceFolder}}/builddir/bin/demo{}",
            std::env::consts::EXE_SUFFIX
        );
        assert!(launch.contains(&expected));
        assert_eq!(
            fs::read_to_string(temp.path().join(CLANGD)).unwrap(),
            "CompilationDatabase: builddir\n"
        );
    }

    #[test]
    fn test_malformed_launch_json_is_reported_but_clangd_still_updated() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join(".vscode")).unwrap();
        fs::write(temp.path().join(LAUNCH_JSON), "{ // comments are not json\n}").unwrap();
        fs::write(temp.path().join(CLANGD), "").unwrap();

        let err = WorkspaceEditorFiles
            .sync_editor_config(&layout(temp.path()))
            .unwrap_err();
        assert!(matches!(err, SyncError::Json { .. }));
        assert_eq!(
            fs::read_to_string(temp.path().join(CLANGD)).unwrap(),
            "CompilationDatabase: builddir\n"
        );
    }
}
