use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::observe::Observer;

/// Platforms a profile link can point at
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Platform {
    Twitter,
    Medium,
    Linkedin,
    Readme,
    StackOverflow,
    DevTo,
    Mastodon,
    Other,
}

impl Platform {
    pub const ALL: [Platform; 8] = [
        Platform::Twitter,
        Platform::Medium,
        Platform::Linkedin,
        Platform::Readme,
        Platform::StackOverflow,
        Platform::DevTo,
        Platform::Mastodon,
        Platform::Other,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Platform::Twitter => "TWITTER",
            Platform::Medium => "MEDIUM",
            Platform::Linkedin => "LINKEDIN",
            Platform::Readme => "README",
            Platform::StackOverflow => "STACK_OVERFLOW",
            Platform::DevTo => "DEV_TO",
            Platform::Mastodon => "MASTODON",
            Platform::Other => "OTHER",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The value is not one of [`Platform::ALL`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown platform '{0}'")]
pub struct UnknownPlatform(pub String);

impl FromStr for Platform {
    type Err = UnknownPlatform;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Platform::ALL
            .into_iter()
            .find(|platform| platform.as_str() == s)
            .ok_or_else(|| UnknownPlatform(s.to_string()))
    }
}

/// Kinds of contribution accepted by the Stars API
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContributionType {
    Speaking,
    Blogpost,
    ArticlePublication,
    EventOrganization,
    Hackathon,
    OpenSourceProject,
    VideoPodcast,
    Forum,
    Other,
}

/// Historical platform names and the value that replaced them
const PLATFORM_ALIASES: &[(&str, Platform)] =
    &[("GITHUB", Platform::Readme), ("WEBSITE", Platform::Other)];

/// Resolves renamed platform values to their current spelling.
///
/// Unknown values are returned unchanged; rejecting them is left to request validation.
#[derive(Clone)]
pub struct AliasNormalizer {
    observer: Arc<dyn Observer>,
}

impl AliasNormalizer {
    pub fn new(observer: Arc<dyn Observer>) -> Self {
        Self { observer }
    }

    pub fn normalize(&self, value: &str) -> String {
        let candidate = value.trim().to_ascii_uppercase();

        if let Some((_, canonical)) = PLATFORM_ALIASES
            .iter()
            .find(|(alias, _)| *alias == candidate)
        {
            self.observer.warn(
                "platform.alias_normalized",
                &[("from", &value), ("to", canonical)],
            );
            return canonical.as_str().to_string();
        }

        match Platform::from_str(&candidate) {
            Ok(platform) => platform.as_str().to_string(),
            Err(_) => value.to_string(),
        }
    }
}
