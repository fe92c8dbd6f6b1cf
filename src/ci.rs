//! CI Context - is the current commit tagged?

use crate::config::parse_bool;

pub trait CiContext {
    fn is_tag(&self) -> bool;
}

/// Tag information captured from the CI provider's variables at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CiEnvironment {
    tagged: bool,
    tag: Option<String>,
}

impl CiEnvironment {
    pub fn from_env() -> Self {
        Self::detect(|key| std::env::var(key).ok())
    }

    pub fn detect<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let named = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(tag) = named("TRAVIS_TAG")
            .or_else(|| named("CI_COMMIT_TAG"))
            .or_else(|| named("CIRCLE_TAG"))
            .or_else(|| named("APPVEYOR_REPO_TAG_NAME"))
        {
            return Self::tagged(tag);
        }

        if let Some(tag) = named("GITHUB_REF").and_then(|r| r.strip_prefix("refs/tags/").map(str::to_string)) {
            return Self::tagged(tag);
        }

        // AppVeyor may flag a tag build without naming it
        if named("APPVEYOR_REPO_TAG").map_or(false, |v| parse_bool(&v)) {
            return Self {
                tagged: true,
                tag: None,
            };
        }

        Self::default()
    }

    pub fn tagged(tag: impl Into<String>) -> Self {
        Self {
            tagged: true,
            tag: Some(tag.into()),
        }
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }
}

impl CiContext for CiEnvironment {
    fn is_tag(&self) -> bool {
        self.tagged
    }
}
