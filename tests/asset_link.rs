//! Asset Link Tests
//!
//! Directory creation, alias type, and re-run safety.

use std::cell::RefCell;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use vkg_release::{
    install, platform_alias, AliasKind, DirectoryAlias, LinkOutcome, LinkSpec, LinkStage,
};

/// Records what it was asked to do and checks the directories exist by then.
struct RecordingAlias {
    seen: RefCell<Vec<(PathBuf, PathBuf, bool)>>,
    error: Option<io::ErrorKind>,
}

impl RecordingAlias {
    fn new(error: Option<io::ErrorKind>) -> Self {
        Self {
            seen: RefCell::new(vec![]),
            error,
        }
    }
}

impl DirectoryAlias for RecordingAlias {
    fn kind(&self) -> AliasKind {
        AliasKind::Symlink
    }

    fn create(&self, source: &Path, alias: &Path) -> io::Result<()> {
        let dirs_ready = source.is_dir() && alias.parent().map_or(false, Path::is_dir);
        self.seen
            .borrow_mut()
            .push((source.to_path_buf(), alias.to_path_buf(), dirs_ready));
        match self.error {
            Some(kind) => Err(io::Error::from(kind)),
            None => Ok(()),
        }
    }
}

#[test]
fn directories_exist_before_alias_is_attempted() {
    let dir = tempfile::tempdir().unwrap();
    let assets = dir.path().join("assets");
    let target = dir.path().join("build/bin/assets");

    let recorder = RecordingAlias::new(None);
    let spec = LinkSpec::new(&assets, &target).unwrap();
    assert_eq!(install(&spec, &recorder).unwrap(), LinkOutcome::Created);

    assert!(assets.is_dir());
    assert!(dir.path().join("build/bin").is_dir());
    let seen = recorder.seen.borrow();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].0, assets);
    assert_eq!(seen[0].1, target);
    assert!(seen[0].2, "directories were missing when the alias was created");
}

#[test]
fn existing_alias_is_success() {
    let dir = tempfile::tempdir().unwrap();
    let recorder = RecordingAlias::new(Some(io::ErrorKind::AlreadyExists));
    let spec = LinkSpec::new(dir.path().join("assets"), dir.path().join("bin/assets")).unwrap();

    assert_eq!(install(&spec, &recorder).unwrap(), LinkOutcome::AlreadyExists);
}

#[test]
fn other_failures_are_reported_with_stage() {
    let dir = tempfile::tempdir().unwrap();
    let recorder = RecordingAlias::new(Some(io::ErrorKind::PermissionDenied));
    let spec = LinkSpec::new(dir.path().join("assets"), dir.path().join("bin/assets")).unwrap();

    let err = install(&spec, &recorder).unwrap_err();
    assert_eq!(err.stage, LinkStage::CreateAlias);
    assert_eq!(err.source.kind(), io::ErrorKind::PermissionDenied);
}

#[test]
fn blocked_parent_fails_while_ensuring_dirs() {
    let dir = tempfile::tempdir().unwrap();
    // A regular file where the bin directory should go
    fs::write(dir.path().join("bin"), b"").unwrap();
    let recorder = RecordingAlias::new(None);
    let spec = LinkSpec::new(dir.path().join("assets"), dir.path().join("bin/assets")).unwrap();

    let err = install(&spec, &recorder).unwrap_err();
    assert_eq!(err.stage, LinkStage::EnsureDirs);
    assert!(recorder.seen.borrow().is_empty());
}

#[test]
fn platform_alias_resolves_and_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let assets = dir.path().join("assets");
    let target = dir.path().join("build/bin/assets");
    let alias = platform_alias();
    let spec = LinkSpec::new(&assets, &target).unwrap();

    assert_eq!(install(&spec, alias.as_ref()).unwrap(), LinkOutcome::Created);
    assert_eq!(install(&spec, alias.as_ref()).unwrap(), LinkOutcome::AlreadyExists);

    // Exactly one entry in the bin directory
    let entries: Vec<_> = fs::read_dir(dir.path().join("build/bin")).unwrap().collect();
    assert_eq!(entries.len(), 1);

    // Changes under the assets directory show through the alias
    fs::write(assets.join("shader.h"), b"#pragma once").unwrap();
    assert_eq!(fs::read(target.join("shader.h")).unwrap(), b"#pragma once");
}

#[cfg(unix)]
#[test]
fn unix_alias_is_a_true_symlink() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("bin/assets");
    let spec = LinkSpec::new(dir.path().join("assets"), &target).unwrap();

    install(&spec, platform_alias().as_ref()).unwrap();

    let meta = fs::symlink_metadata(&target).unwrap();
    assert!(meta.file_type().is_symlink());
    assert!(fs::read_link(&target).unwrap().is_absolute());
}

#[cfg(windows)]
#[test]
fn windows_alias_is_a_junction() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("bin\\assets");
    let spec = LinkSpec::new(dir.path().join("assets"), &target).unwrap();

    install(&spec, platform_alias().as_ref()).unwrap();

    assert!(junction::exists(&target).unwrap());
}

#[cfg(unix)]
#[test]
fn cli_messages_on_create_and_rerun() {
    let dir = tempfile::tempdir().unwrap();
    let run = || {
        Command::new(env!("CARGO_BIN_EXE_vkg-symlink"))
            .args(["assets", "build/bin/assets"])
            .current_dir(dir.path())
            .env_remove("RUST_LOG")
            .output()
            .unwrap()
    };

    let first = run();
    assert!(first.status.success());
    assert_eq!(
        String::from_utf8_lossy(&first.stdout).trim(),
        "Created Symlink build/bin/assets -> assets"
    );
    assert!(dir.path().join("assets").is_dir());
    assert!(dir.path().join("build/bin/assets").is_dir());

    let second = run();
    assert!(second.status.success());
    assert_eq!(
        String::from_utf8_lossy(&second.stdout).trim(),
        "Symlink already exists: build/bin/assets"
    );
}

#[cfg(unix)]
#[test]
fn cli_failure_exit_code_depends_on_strict() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("bin"), b"").unwrap();
    let run = |strict: bool| {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_vkg-symlink"));
        cmd.args(["assets", "bin/assets"]).current_dir(dir.path());
        cmd.env_remove("RUST_LOG");
        if strict {
            cmd.arg("--strict");
        }
        cmd.output().unwrap()
    };

    let lenient = run(false);
    assert!(lenient.status.success());
    assert!(String::from_utf8_lossy(&lenient.stdout).contains("bin/assets"));
    assert!(String::from_utf8_lossy(&lenient.stderr).contains("asset link was not created"));

    assert!(!run(true).status.success());
}
