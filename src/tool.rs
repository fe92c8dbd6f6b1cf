//! Package Tool - the external build/export/upload collaborator
//!
//! The release flow never builds or uploads anything itself; it drives a
//! `PackageTool`. `ConanCli` is the process-backed implementation.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;
use tracing::debug;

use crate::config::RemoteSpec;
use crate::reference::PackageReference;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` exited with {status}")]
    Failed { command: String, status: String },
}

/// One point of the build matrix.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildConfiguration {
    pub settings: BTreeMap<String, String>,
    pub options: BTreeMap<String, String>,
}

impl BuildConfiguration {
    pub fn with_setting(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.settings.insert(key.into(), value.into());
        self
    }

    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }
}

/// Authenticated handle on a remote, valid for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteSession {
    pub remote: String,
    pub user: String,
}

pub trait PackageTool {
    /// Build and package the recipe in `recipe_dir` for one configuration.
    fn create(
        &mut self,
        recipe_dir: &Path,
        reference: &PackageReference,
        config: &BuildConfiguration,
    ) -> Result<(), ToolError>;

    fn add_remote(&mut self, remote: &RemoteSpec) -> Result<(), ToolError>;

    fn login(&mut self, remote: &str, user: &str, password: &str) -> Result<RemoteSession, ToolError>;

    /// Export the recipe, replacing any previous export of the same reference.
    fn export(&mut self, recipe_dir: &Path, reference: &PackageReference) -> Result<(), ToolError>;

    fn upload_recipe(
        &mut self,
        reference: &PackageReference,
        remote: &str,
        force: bool,
    ) -> Result<(), ToolError>;
}

/// Drives the `conan` command line.
pub struct ConanCli {
    program: PathBuf,
}

impl ConanCli {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self { program: program.into() }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Run the tool with inherited stdio so its build log and `ERROR:` lines
    /// reach the CI log directly.
    fn run(&self, args: Vec<OsString>, shown: String) -> Result<(), ToolError> {
        debug!(command = %shown, "running package tool");

        let status = Command::new(&self.program)
            .args(&args)
            .status()
            .map_err(|source| ToolError::Spawn {
                program: self.program.display().to_string(),
                source,
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(ToolError::Failed {
                command: shown,
                status: status.to_string(),
            })
        }
    }

    fn run_args(&self, args: Vec<String>) -> Result<(), ToolError> {
        let shown = format!("{} {}", self.program.display(), args.join(" "));
        self.run(args.into_iter().map(OsString::from).collect(), shown)
    }
}

impl Default for ConanCli {
    fn default() -> Self {
        Self::new("conan")
    }
}

impl PackageTool for ConanCli {
    fn create(
        &mut self,
        recipe_dir: &Path,
        reference: &PackageReference,
        config: &BuildConfiguration,
    ) -> Result<(), ToolError> {
        self.run_args(create_args(recipe_dir, reference, config))?;
        Ok(())
    }

    fn add_remote(&mut self, remote: &RemoteSpec) -> Result<(), ToolError> {
        self.run_args(vec![
            "remote".into(),
            "add".into(),
            remote.name.clone(),
            remote.url.clone(),
            if remote.verify_ssl { "True" } else { "False" }.into(),
            "--force".into(),
        ])?;
        Ok(())
    }

    fn login(&mut self, remote: &str, user: &str, password: &str) -> Result<RemoteSession, ToolError> {
        let args: Vec<OsString> = ["user", "-p", password, "-r", remote, user]
            .into_iter()
            .map(OsString::from)
            .collect();
        let shown = format!("{} user -p *** -r {} {}", self.program.display(), remote, user);
        self.run(args, shown)?;

        Ok(RemoteSession {
            remote: remote.to_string(),
            user: user.to_string(),
        })
    }

    fn export(&mut self, recipe_dir: &Path, reference: &PackageReference) -> Result<(), ToolError> {
        self.run_args(vec![
            "export".into(),
            recipe_dir.display().to_string(),
            reference.to_string(),
        ])?;
        Ok(())
    }

    fn upload_recipe(
        &mut self,
        reference: &PackageReference,
        remote: &str,
        force: bool,
    ) -> Result<(), ToolError> {
        self.run_args(upload_args(reference, remote, force))?;
        Ok(())
    }
}

fn create_args(
    recipe_dir: &Path,
    reference: &PackageReference,
    config: &BuildConfiguration,
) -> Vec<String> {
    let mut args = vec![
        "create".to_string(),
        recipe_dir.display().to_string(),
        reference.to_string(),
    ];
    for (key, value) in &config.settings {
        args.push("-s".into());
        args.push(format!("{key}={value}"));
    }
    for (key, value) in &config.options {
        args.push("-o".into());
        args.push(format!("{key}={value}"));
    }
    args
}

fn upload_args(reference: &PackageReference, remote: &str, force: bool) -> Vec<String> {
    let mut args = vec![
        "upload".to_string(),
        reference.to_string(),
        "-r".into(),
        remote.to_string(),
        "--confirm".into(),
    ];
    if force {
        args.push("--force".into());
    }
    args
}
