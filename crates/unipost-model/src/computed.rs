use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Derivation functions a schema may bind to a computed field.
///
/// A computed entry whose config omits the `function` key uses the function
/// named after its own field, so `"total_engagement": {...}` binds
/// `TotalEngagement` without repeating itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComputeFunction {
    /// Sum of the declared dependency counts, missing treated as zero.
    TotalEngagement,
    /// `total_engagement` over the primary view count; zero denominator
    /// yields 0.0.
    EngagementRate,
    /// Bucket `video_width`/`video_height` into 9:16, 16:9 or 1:1, falling
    /// back to the literal `"{width}:{height}"`.
    AspectRatio,
    TextLength,
    TextLanguage,
    TextSentiment,
    HashtagCount,
    MentionCount,
    /// Ordered `#tag` tokens parsed from the post text.
    ExtractHashtags,
    /// Calendar date of the first dependency's timestamp.
    GroupedDate,
    /// Populated fraction of the schema's expected field set, in [0, 1].
    DataQualityScore,
}

impl ComputeFunction {
    pub const ALL: [ComputeFunction; 11] = [
        ComputeFunction::TotalEngagement,
        ComputeFunction::EngagementRate,
        ComputeFunction::AspectRatio,
        ComputeFunction::TextLength,
        ComputeFunction::TextLanguage,
        ComputeFunction::TextSentiment,
        ComputeFunction::HashtagCount,
        ComputeFunction::MentionCount,
        ComputeFunction::ExtractHashtags,
        ComputeFunction::GroupedDate,
        ComputeFunction::DataQualityScore,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ComputeFunction::TotalEngagement => "total_engagement",
            ComputeFunction::EngagementRate => "engagement_rate",
            ComputeFunction::AspectRatio => "aspect_ratio",
            ComputeFunction::TextLength => "text_length",
            ComputeFunction::TextLanguage => "text_language",
            ComputeFunction::TextSentiment => "text_sentiment",
            ComputeFunction::HashtagCount => "hashtag_count",
            ComputeFunction::MentionCount => "mention_count",
            ComputeFunction::ExtractHashtags => "extract_hashtags",
            ComputeFunction::GroupedDate => "grouped_date",
            ComputeFunction::DataQualityScore => "data_quality_score",
        }
    }
}

impl fmt::Display for ComputeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ComputeFunction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ComputeFunction::ALL
            .iter()
            .find(|function| function.as_str() == s.trim())
            .copied()
            .ok_or_else(|| format!("unknown compute function: {s}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_round_trip() {
        for function in ComputeFunction::ALL {
            assert_eq!(function.as_str().parse::<ComputeFunction>(), Ok(function));
        }
    }

    #[test]
    fn unknown_function_is_rejected() {
        assert!("virality_index".parse::<ComputeFunction>().is_err());
    }
}
