use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Preprocessing steps a schema may declare for a mapped field, applied in
/// declaration order before type coercion.
///
/// Every step is total: malformed input degrades to a neutral value instead
/// of raising, so one bad field never takes down its record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreprocessStep {
    /// Best-effort integer: numbers, numeric strings, and suffixed counts
    /// like `"1.2k"`; non-empty garbage becomes 0.
    SafeInt,
    /// Best-effort float with the same tolerance as `safe_int`.
    SafeFloat,
    /// Strip control characters and emoji, normalize quotes, collapse
    /// whitespace runs.
    CleanText,
    /// Parse any supported timestamp encoding and re-emit canonical
    /// RFC 3339 text; unparseable input becomes null.
    NormalizeTimestamp,
    /// Keep only absolute http(s) URLs, re-emitted in normalized form.
    ParseUrl,
    Lowercase,
    Trim,
}

impl PreprocessStep {
    pub const ALL: [PreprocessStep; 7] = [
        PreprocessStep::SafeInt,
        PreprocessStep::SafeFloat,
        PreprocessStep::CleanText,
        PreprocessStep::NormalizeTimestamp,
        PreprocessStep::ParseUrl,
        PreprocessStep::Lowercase,
        PreprocessStep::Trim,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PreprocessStep::SafeInt => "safe_int",
            PreprocessStep::SafeFloat => "safe_float",
            PreprocessStep::CleanText => "clean_text",
            PreprocessStep::NormalizeTimestamp => "normalize_timestamp",
            PreprocessStep::ParseUrl => "parse_url",
            PreprocessStep::Lowercase => "lowercase",
            PreprocessStep::Trim => "trim",
        }
    }
}

impl fmt::Display for PreprocessStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PreprocessStep {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PreprocessStep::ALL
            .iter()
            .find(|step| step.as_str() == s.trim())
            .copied()
            .ok_or_else(|| format!("unknown preprocessing step: {s}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_round_trip() {
        for step in PreprocessStep::ALL {
            assert_eq!(step.as_str().parse::<PreprocessStep>(), Ok(step));
        }
    }

    #[test]
    fn serde_uses_snake_case() {
        let json = serde_json::to_string(&PreprocessStep::NormalizeTimestamp).unwrap();
        assert_eq!(json, "\"normalize_timestamp\"");
        let back: PreprocessStep = serde_json::from_str("\"safe_int\"").unwrap();
        assert_eq!(back, PreprocessStep::SafeInt);
    }

    #[test]
    fn unknown_step_is_rejected() {
        assert!("explode".parse::<PreprocessStep>().is_err());
    }
}
