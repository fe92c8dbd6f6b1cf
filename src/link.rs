//! Asset Link Installer
//!
//! Exposes the assets directory next to compiled binaries through a directory
//! alias: a symbolic link, or a junction on Windows where unprivileged
//! symlinks are unavailable. Safe to re-run on every build.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AliasKind {
    Symlink,
    Junction,
}

/// Creates `alias` so that it resolves to the directory `source`.
pub trait DirectoryAlias {
    fn kind(&self) -> AliasKind;
    fn create(&self, source: &Path, alias: &Path) -> io::Result<()>;
}

pub struct SymlinkAlias;

impl DirectoryAlias for SymlinkAlias {
    fn kind(&self) -> AliasKind {
        AliasKind::Symlink
    }

    #[cfg(unix)]
    fn create(&self, source: &Path, alias: &Path) -> io::Result<()> {
        std::os::unix::fs::symlink(source, alias)
    }

    #[cfg(windows)]
    fn create(&self, source: &Path, alias: &Path) -> io::Result<()> {
        std::os::windows::fs::symlink_dir(source, alias)
    }
}

#[cfg(windows)]
pub struct JunctionAlias;

#[cfg(windows)]
impl DirectoryAlias for JunctionAlias {
    fn kind(&self) -> AliasKind {
        AliasKind::Junction
    }

    fn create(&self, source: &Path, alias: &Path) -> io::Result<()> {
        if alias.symlink_metadata().is_ok() {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("{} already exists", alias.display()),
            ));
        }
        junction::create(source, alias)
    }
}

/// The alias implementation for the running platform.
pub fn platform_alias() -> Box<dyn DirectoryAlias> {
    #[cfg(windows)]
    {
        Box::new(JunctionAlias)
    }
    #[cfg(not(windows))]
    {
        Box::new(SymlinkAlias)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkSpec {
    pub source_dir: PathBuf,
    pub target_path: PathBuf,
    pub parent_of_target: PathBuf,
}

impl LinkSpec {
    pub fn new(source_dir: impl Into<PathBuf>, target_path: impl Into<PathBuf>) -> io::Result<Self> {
        let source_dir = source_dir.into();
        let target_path = target_path.into();
        let parent_of_target = absolute(&target_path)?.join("..");
        Ok(Self {
            source_dir,
            target_path,
            parent_of_target: normalize(&parent_of_target),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkOutcome {
    Created,
    AlreadyExists,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStage {
    EnsureDirs,
    CreateAlias,
}

impl fmt::Display for LinkStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkStage::EnsureDirs => f.write_str("creating directories"),
            LinkStage::CreateAlias => f.write_str("creating alias"),
        }
    }
}

#[derive(Debug, Error)]
#[error("{stage} failed: {source}")]
pub struct LinkError {
    pub stage: LinkStage,
    #[source]
    pub source: io::Error,
}

impl LinkError {
    fn at(stage: LinkStage) -> impl FnOnce(io::Error) -> Self {
        move |source| Self { stage, source }
    }
}

/// Ensure both directories exist, then create the alias.
///
/// An alias already present at the target is success. The alias points at
/// the absolute assets directory, so it resolves wherever it sits.
pub fn install(spec: &LinkSpec, alias: &dyn DirectoryAlias) -> Result<LinkOutcome, LinkError> {
    debug!(dir = %spec.source_dir.display(), "ensuring assets directory");
    fs::create_dir_all(&spec.source_dir).map_err(LinkError::at(LinkStage::EnsureDirs))?;
    debug!(dir = %spec.parent_of_target.display(), "ensuring target parent");
    fs::create_dir_all(&spec.parent_of_target).map_err(LinkError::at(LinkStage::EnsureDirs))?;

    let source = absolute(&spec.source_dir)
        .map(|p| normalize(&p))
        .map_err(LinkError::at(LinkStage::CreateAlias))?;

    debug!(kind = ?alias.kind(), source = %source.display(), alias = %spec.target_path.display(), "creating alias");
    match alias.create(&source, &spec.target_path) {
        Ok(()) => Ok(LinkOutcome::Created),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(LinkOutcome::AlreadyExists),
        Err(e) => Err(LinkError::at(LinkStage::CreateAlias)(e)),
    }
}

fn absolute(path: &Path) -> io::Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

/// Lexically resolve `.` and `..` without touching the filesystem.
fn normalize(path: &Path) -> PathBuf {
    use std::path::Component;

    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
