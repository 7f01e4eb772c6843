//! Template library
//!
//! A template is a named directory under the template store. It is created
//! by copying the working directory in and consumed by copying it back out.
//! The directory name is the only identity; there is no metadata.

use crate::error::{Error, Result};
use crate::utils::fs::copy_tree;
use crate::utils::log::{log, LogLevel};
use clap::ValueEnum;
use colored::Colorize;
use dialoguer::{theme::ColorfulTheme, Input};
use std::fs;
use std::path::{Path, PathBuf};

/// Operations available with `-T`
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TemplateAction {
    /// List available templates
    List,
    /// Import a template into the current directory
    Get,
    /// Save the current directory as a new template
    Create,
    /// Delete an existing template
    Remove,
}

/// Source of interactive answers
pub trait Prompter {
    fn input(&mut self, prompt: &str) -> Result<String>;
}

/// Reads answers from the terminal
pub struct DialoguerPrompter {
    theme: ColorfulTheme,
}

impl Default for DialoguerPrompter {
    fn default() -> Self {
        DialoguerPrompter {
            theme: ColorfulTheme::default(),
        }
    }
}

impl Prompter for DialoguerPrompter {
    fn input(&mut self, prompt: &str) -> Result<String> {
        let answer: String = Input::with_theme(&self.theme)
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()?;
        Ok(answer)
    }
}

/// Maps a user answer to a template index: a 0-based index or an exact name
pub fn resolve_selection(names: &[String], answer: &str) -> Option<usize> {
    let answer = answer.trim();
    if let Ok(index) = answer.parse::<usize>() {
        if index < names.len() {
            return Some(index);
        }
    }
    names.iter().position(|name| name == answer)
}

pub struct TemplateLibrary {
    store: PathBuf,
}

impl TemplateLibrary {
    pub fn new(store: impl Into<PathBuf>) -> Self {
        TemplateLibrary {
            store: store.into(),
        }
    }

    pub fn store(&self) -> &Path {
        &self.store
    }

    /// Template names, sorted. A missing store is an empty library.
    pub fn list(&self) -> Result<Vec<String>> {
        if !self.store.is_dir() {
            return Ok(Vec::new());
        }
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.store).map_err(|e| Error::io(&self.store, e))? {
            let entry = entry.map_err(|e| Error::io(&self.store, e))?;
            if entry.path().is_dir() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }

    /// Prints the numbered listing used by the selection prompts
    pub fn print_listing(names: &[String]) {
        for (index, name) in names.iter().enumerate() {
            println!("[{}] {}", index.to_string().bold(), name);
        }
    }

    /// Copies a chosen template into `dest`, overwriting files that exist there.
    pub fn get(&self, prompter: &mut dyn Prompter, dest: &Path) -> Result<String> {
        let names = self.non_empty_listing()?;
        let index = Self::select(prompter, &names, "Enter template number or name")?;
        let name = &names[index];
        let copied = copy_tree(&self.store.join(name), dest, &[])?;
        log(
            LogLevel::Log,
            &format!("Copied template {} ({} files) to {}", name, copied, dest.display()),
        );
        Ok(name.clone())
    }

    /// Saves `src` as a new template, asking again while the name is unusable.
    pub fn create(&self, prompter: &mut dyn Prompter, src: &Path) -> Result<String> {
        let name = loop {
            let answer = prompter.input("New template name")?;
            let answer = answer.trim();
            match self.check_new_name(answer) {
                Ok(()) => break answer.to_string(),
                Err(reason) => log(LogLevel::Warn, &reason),
            }
        };
        fs::create_dir_all(&self.store).map_err(|e| Error::io(&self.store, e))?;
        let dest = self.store.join(&name);
        let copied = copy_tree(src, &dest, &[self.store.as_path()])?;
        log(
            LogLevel::Log,
            &format!("Saved {} as template {} ({} files)", src.display(), name, copied),
        );
        Ok(name)
    }

    /// Deletes a chosen template.
    pub fn remove(&self, prompter: &mut dyn Prompter) -> Result<String> {
        let names = self.non_empty_listing()?;
        let index = Self::select(prompter, &names, "Enter template number or name to remove")?;
        let name = &names[index];
        let path = self.store.join(name);
        fs::remove_dir_all(&path).map_err(|e| Error::io(&path, e))?;
        log(LogLevel::Log, &format!("Removed template: {}", name));
        Ok(name.clone())
    }

    fn non_empty_listing(&self) -> Result<Vec<String>> {
        let names = self.list()?;
        if names.is_empty() {
            return Err(Error::Template {
                message: format!("No templates in {}", self.store.display()),
            });
        }
        Self::print_listing(&names);
        Ok(names)
    }

    fn select(prompter: &mut dyn Prompter, names: &[String], prompt: &str) -> Result<usize> {
        loop {
            let answer = prompter.input(prompt)?;
            match resolve_selection(names, &answer) {
                Some(index) => return Ok(index),
                None => log(
                    LogLevel::Warn,
                    &format!("'{}' is not a listed template, try again", answer.trim()),
                ),
            }
        }
    }

    fn check_new_name(&self, name: &str) -> std::result::Result<(), String> {
        if name.is_empty() {
            return Err("Template name must not be empty".to_string());
        }
        if name == "." || name == ".." || name.contains(['/', '\\']) {
            return Err(format!("'{}' is not a valid template name", name));
        }
        if self.store.join(name).exists() {
            return Err(format!("Template {} already exists, choose another name", name));
        }
        Ok(())
    }

    /// Runs one `-T` operation against `cwd`
    pub fn run_action(
        &self,
        action: TemplateAction,
        prompter: &mut dyn Prompter,
        cwd: &Path,
    ) -> Result<()> {
        match action {
            TemplateAction::List => {
                let names = self.list()?;
                if names.is_empty() {
                    log(LogLevel::Log, &format!("No templates in {}", self.store.display()));
                }
                Self::print_listing(&names);
            }
            TemplateAction::Get => {
                self.get(prompter, cwd)?;
            }
            TemplateAction::Create => {
                self.create(prompter, cwd)?;
            }
            TemplateAction::Remove => {
                self.remove(prompter)?;
            }
        }
        Ok(())
    }
}
