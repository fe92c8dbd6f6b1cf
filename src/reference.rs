//! Package references - `name/version@user/channel`

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Placeholder user and channel of a reference that has neither.
pub const ANONYMOUS: &str = "_";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReferenceError {
    #[error("Malformed package reference: {0} (expected name/version@user/channel)")]
    Malformed(String),

    #[error("Malformed recipe reference: {0} (expected name/version)")]
    MalformedNameVersion(String),
}

/// Identifies exactly one buildable unit for the package tool.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PackageReference {
    name: String,
    version: String,
    user: String,
    channel: String,
}

impl PackageReference {
    pub fn from_parts(
        name: impl Into<String>,
        version: impl Into<String>,
        user: impl Into<String>,
        channel: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            user: user.into(),
            channel: channel.into(),
        }
    }

    /// Parse `name/version@user/channel`, or `name/version@` for no user and channel.
    pub fn parse(raw: &str) -> Result<Self, ReferenceError> {
        let malformed = || ReferenceError::Malformed(raw.to_string());

        let (name_version, user_channel) = raw.split_once('@').ok_or_else(malformed)?;
        let (name, version) = split_pair(name_version).ok_or_else(malformed)?;
        let (user, channel) = if user_channel.is_empty() {
            (ANONYMOUS, ANONYMOUS)
        } else {
            split_pair(user_channel).ok_or_else(malformed)?
        };

        Ok(Self::from_parts(name, version, user, channel))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    pub fn is_anonymous(&self) -> bool {
        self.user == ANONYMOUS && self.channel == ANONYMOUS
    }
}

impl fmt::Display for PackageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_anonymous() {
            write!(f, "{}/{}@", self.name, self.version)
        } else {
            write!(f, "{}/{}@{}/{}", self.name, self.version, self.user, self.channel)
        }
    }
}

/// Parse a `name/version` pair, as found in `CONAN_REFERENCE`.
pub fn parse_name_version(raw: &str) -> Result<(String, String), ReferenceError> {
    split_pair(raw)
        .map(|(n, v)| (n.to_string(), v.to_string()))
        .ok_or_else(|| ReferenceError::MalformedNameVersion(raw.to_string()))
}

fn split_pair(raw: &str) -> Option<(&str, &str)> {
    let (left, right) = raw.split_once('/')?;
    let valid = |s: &str| !s.is_empty() && !s.contains(['/', '@']) && s.trim() == s;
    if valid(left) && valid(right) {
        Some((left, right))
    } else {
        None
    }
}
