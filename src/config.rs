//! Publish Configuration
//!
//! Every environment-derived switch is read once, here, into a plain value.
//! Nothing downstream touches the process environment.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::reference::{parse_name_version, PackageReference, ReferenceError, ANONYMOUS};

pub const DEFAULT_CHANNEL: &str = "testing";
pub const DEFAULT_UPLOAD_REMOTE: &str = "upload_repo";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid CONAN_REFERENCE: {0}")]
    Reference(#[from] ReferenceError),

    #[error("Invalid remote specification: {0}")]
    InvalidRemote(String),
}

/// What one run does. Decided once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildMode {
    /// Run the configuration matrix
    Build,
    /// Export the current recipe and upload it
    PublishOnly,
}

impl BuildMode {
    pub fn from_need_build(need_build: bool) -> Self {
        if need_build {
            Self::Build
        } else {
            Self::PublishOnly
        }
    }
}

/// A package remote as written in `url[@verify_ssl[@name]]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteSpec {
    pub name: String,
    pub url: String,
    pub verify_ssl: bool,
}

impl RemoteSpec {
    pub fn parse(raw: &str, default_name: &str) -> Result<Self, ConfigError> {
        let mut parts = raw.trim().split('@');
        let url = parts.next().unwrap_or_default().trim();
        if url.is_empty() {
            return Err(ConfigError::InvalidRemote(raw.to_string()));
        }
        let verify_ssl = match parts.next() {
            Some(v) if !v.trim().is_empty() => parse_bool(v),
            _ => true,
        };
        let name = match parts.next() {
            Some(n) if !n.trim().is_empty() => n.trim().to_string(),
            _ => default_name.to_string(),
        };
        if parts.next().is_some() {
            return Err(ConfigError::InvalidRemote(raw.to_string()));
        }
        Ok(Self {
            name,
            url: url.to_string(),
            verify_ssl,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishConfig {
    pub mode: BuildMode,
    pub upload_only_when_tag: bool,
    pub skip_check_credentials: bool,
    pub build_common: bool,
    /// `name/version` overriding the recipe metadata
    pub reference_override: Option<(String, String)>,
    /// `_` for both when no user is configured
    pub user: String,
    pub channel: String,
    pub login_user: Option<String>,
    pub password: Option<String>,
    pub remotes: Vec<RemoteSpec>,
    pub upload_remote: Option<RemoteSpec>,
    pub tool_program: String,
}

impl PublishConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; tests pass a map instead of the environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let flag = |key: &str| lookup(key).map_or(false, |v| parse_bool(&v));
        let text = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let user = text("CONAN_USERNAME");
        let mut reference_override = None;
        let (mut ref_user, mut ref_channel) = match &user {
            Some(user) => (
                user.clone(),
                text("CONAN_CHANNEL").unwrap_or_else(|| DEFAULT_CHANNEL.to_string()),
            ),
            // The tool takes a user and a channel, or neither
            None => (ANONYMOUS.to_string(), ANONYMOUS.to_string()),
        };

        if let Some(raw) = text("CONAN_REFERENCE") {
            if raw.contains('@') {
                let full = PackageReference::parse(&raw)?;
                reference_override = Some((full.name().to_string(), full.version().to_string()));
                ref_user = full.user().to_string();
                ref_channel = full.channel().to_string();
            } else {
                reference_override = Some(parse_name_version(&raw)?);
            }
        }

        let remotes = match text("CONAN_REMOTES") {
            Some(raw) => raw
                .split(',')
                .filter(|r| !r.trim().is_empty())
                .enumerate()
                .map(|(i, r)| RemoteSpec::parse(r, &format!("remote{i}")))
                .collect::<Result<Vec<_>, _>>()?,
            None => vec![],
        };

        let upload_remote = text("CONAN_UPLOAD")
            .map(|raw| RemoteSpec::parse(&raw, DEFAULT_UPLOAD_REMOTE))
            .transpose()?;

        Ok(Self {
            mode: BuildMode::from_need_build(flag("CONAN_NEED_BUILD")),
            upload_only_when_tag: flag("CONAN_UPLOAD_ONLY_WHEN_TAG"),
            skip_check_credentials: flag("CONAN_SKIP_CHECK_CREDENTIALS"),
            build_common: flag("CONAN_BUILD_COMMON"),
            reference_override,
            login_user: text("CONAN_LOGIN_USERNAME").or_else(|| user.clone()),
            user: ref_user,
            channel: ref_channel,
            password: text("CONAN_PASSWORD"),
            remotes,
            upload_remote,
            tool_program: text("CONAN_BIN").unwrap_or_else(|| "conan".to_string()),
        })
    }

    /// Name of the remote uploads go to, if one is configured.
    pub fn upload_remote_name(&self) -> Option<&str> {
        self.upload_remote.as_ref().map(|r| r.name.as_str())
    }

    /// Login user and password, when both are set.
    pub fn credentials(&self) -> Option<Credentials> {
        match (&self.login_user, &self.password) {
            (Some(user), Some(password)) => Some(Credentials {
                user: user.clone(),
                password: password.clone(),
            }),
            _ => None,
        }
    }
}

/// `1`, `true`, `yes` and `y` are true, case-insensitively. Anything else is false.
pub fn parse_bool(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "y"
    )
}
