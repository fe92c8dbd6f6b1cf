//! Publish Orchestrator - Single Entry Point
//!
//! CRITICAL: one run takes exactly one path. `Build` never exports or
//! uploads; `PublishOnly` never builds.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{info, warn};

use crate::ci::CiContext;
use crate::config::{BuildMode, PublishConfig};
use crate::recipe::Recipe;
use crate::reference::PackageReference;
use crate::tool::{BuildConfiguration, PackageTool, RemoteSession, ToolError};

#[derive(Debug, Error)]
pub enum PublishError {
    #[error(transparent)]
    Tool(#[from] ToolError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Uploads are restricted to tagged commits and this one is not
    NotTagged,
    /// No upload remote is configured
    NoUploadRemote,
    /// Login user or password is not set
    CredentialsNotReady,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NotTagged => f.write_str("commit is not tagged"),
            SkipReason::NoUploadRemote => f.write_str("no upload remote available"),
            SkipReason::CredentialsNotReady => f.write_str("credentials for the upload remote not available"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    Built { configurations: usize },
    Published { reference: PackageReference, remote: String },
    /// Exported locally; the upload was skipped
    Exported { reference: PackageReference, upload_skipped: SkipReason },
    Skipped(SkipReason),
}

pub struct Orchestrator<T: PackageTool, C: CiContext> {
    config: PublishConfig,
    recipe: Recipe,
    tool: T,
    ci: C,
    recipe_dir: PathBuf,
    session: Option<RemoteSession>,
}

impl<T: PackageTool, C: CiContext> Orchestrator<T, C> {
    pub fn new(config: PublishConfig, recipe: Recipe, tool: T, ci: C) -> Self {
        Self {
            config,
            recipe,
            tool,
            ci,
            recipe_dir: PathBuf::from("."),
            session: None,
        }
    }

    /// Directory the recipe is built and exported from. Defaults to `.`.
    pub fn with_recipe_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.recipe_dir = dir.into();
        self
    }

    pub fn tool(&self) -> &T {
        &self.tool
    }

    pub fn into_tool(self) -> T {
        self.tool
    }

    pub fn session(&self) -> Option<&RemoteSession> {
        self.session.as_ref()
    }

    /// Reference built or published by this run.
    pub fn reference(&self) -> PackageReference {
        let (name, version) = match &self.config.reference_override {
            Some((name, version)) => (name.clone(), version.clone()),
            None => (self.recipe.name.clone(), self.recipe.version.clone()),
        };
        PackageReference::from_parts(name, version, &self.config.user, &self.config.channel)
    }

    /// Configurations the build path would run.
    pub fn build_matrix(&self) -> Vec<BuildConfiguration> {
        if self.config.build_common {
            self.recipe.common_builds()
        } else {
            self.recipe.default_build()
        }
    }

    pub fn run(&mut self) -> Result<PublishOutcome, PublishError> {
        match self.config.mode {
            BuildMode::Build => self.build(),
            BuildMode::PublishOnly => self.publish(),
        }
    }

    fn build(&mut self) -> Result<PublishOutcome, PublishError> {
        let reference = self.reference();
        let matrix = self.build_matrix();
        info!(reference = %reference, configurations = matrix.len(), "building package matrix");

        for (i, config) in matrix.iter().enumerate() {
            info!(
                "[{}/{}] settings={:?} options={:?}",
                i + 1,
                matrix.len(),
                config.settings,
                config.options
            );
            self.tool.create(&self.recipe_dir, &reference, config)?;
        }

        Ok(PublishOutcome::Built {
            configurations: matrix.len(),
        })
    }

    fn publish(&mut self) -> Result<PublishOutcome, PublishError> {
        if self.config.upload_only_when_tag && !self.ci.is_tag() {
            warn!("Skipping upload: uploads are restricted to tagged commits");
            return Ok(PublishOutcome::Skipped(SkipReason::NotTagged));
        }

        if self.config.skip_check_credentials {
            info!("Credential check skipped; using existing remotes and login");
        } else {
            self.register_remotes()?;
            self.login()?;
        }

        let reference = self.reference();
        info!(reference = %reference, "exporting recipe");
        self.tool.export(&self.recipe_dir, &reference)?;

        let remote = match self.upload_target() {
            Ok(remote) => remote,
            Err(reason) => {
                warn!("Upload skipped: {reason}");
                return Ok(PublishOutcome::Exported {
                    reference,
                    upload_skipped: reason,
                });
            }
        };

        info!(reference = %reference, remote = %remote, "uploading recipe");
        self.tool.upload_recipe(&reference, &remote, true)?;

        Ok(PublishOutcome::Published { reference, remote })
    }

    fn upload_target(&self) -> Result<String, SkipReason> {
        let remote = self
            .config
            .upload_remote_name()
            .ok_or(SkipReason::NoUploadRemote)?;
        if !self.config.skip_check_credentials && self.session.is_none() {
            return Err(SkipReason::CredentialsNotReady);
        }
        Ok(remote.to_string())
    }

    fn register_remotes(&mut self) -> Result<(), PublishError> {
        for remote in self.config.remotes.iter().chain(self.config.upload_remote.iter()) {
            info!(name = %remote.name, url = %remote.url, "adding remote");
            self.tool.add_remote(remote)?;
        }
        Ok(())
    }

    /// Log in to the upload remote when there is one and credentials are set.
    fn login(&mut self) -> Result<(), PublishError> {
        let Some(remote) = self.config.upload_remote_name().map(str::to_string) else {
            return Ok(());
        };
        let Some(credentials) = self.config.credentials() else {
            warn!(remote = %remote, "no login credentials configured");
            return Ok(());
        };
        info!(remote = %remote, user = %credentials.user, "logging in");
        let session = self.tool.login(&remote, &credentials.user, &credentials.password)?;
        self.session = Some(session);
        Ok(())
    }
}
