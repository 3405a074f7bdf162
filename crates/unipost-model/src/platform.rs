use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Social platforms with a shipped ingestion schema.
///
/// Platform identifiers are closed: crawler output for anything else is
/// rejected at routing time rather than half-normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Tiktok,
    Instagram,
    Youtube,
}

impl Platform {
    pub const ALL: [Platform; 3] = [Platform::Tiktok, Platform::Instagram, Platform::Youtube];

    /// Canonical lowercase identifier as it appears in crawler metadata and
    /// schema config files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Tiktok => "tiktok",
            Platform::Instagram => "instagram",
            Platform::Youtube => "youtube",
        }
    }

    /// Default analytical table name when a schema does not declare one.
    pub fn default_table(&self) -> String {
        format!("social_posts_{}", self.as_str())
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Platform {
    type Err = String;

    /// Parse a platform identifier (case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "tiktok" => Ok(Platform::Tiktok),
            "instagram" => Ok(Platform::Instagram),
            "youtube" => Ok(Platform::Youtube),
            _ => Err(format!("unknown platform: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitive() {
        assert_eq!("TikTok".parse::<Platform>(), Ok(Platform::Tiktok));
        assert_eq!(" instagram ".parse::<Platform>(), Ok(Platform::Instagram));
        assert!("myspace".parse::<Platform>().is_err());
    }

    #[test]
    fn display_matches_serde() {
        for platform in Platform::ALL {
            let json = serde_json::to_string(&platform).unwrap();
            assert_eq!(json, format!("\"{platform}\""));
        }
    }

    #[test]
    fn default_table_is_prefixed() {
        assert_eq!(Platform::Youtube.default_table(), "social_posts_youtube");
    }
}
