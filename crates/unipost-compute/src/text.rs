//! Text analytics over the mapped draft.
//!
//! All functions here read the draft's text fields, never the raw
//! payload: platforms disagree about where hashtag and mention arrays
//! live, so derived counts always come from the text itself.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use unipost_model::RecordDraft;

static HASHTAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#([\w]+)").expect("valid regex"));
static MENTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@([\w.]+)").expect("valid regex"));

/// Fields consulted for post text, in priority order. The first
/// non-empty string wins.
pub const TEXT_CANDIDATES: [&str; 5] = ["post_content", "description", "text", "title", "caption"];

/// Resolves the post text every `text_*` function operates on.
pub fn resolve_text(draft: &RecordDraft) -> Option<&str> {
    TEXT_CANDIDATES.iter().find_map(|field| {
        draft
            .get(field)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    })
}

/// Unicode scalar count of the resolved text; 0 when there is none.
pub fn text_length(draft: &RecordDraft) -> i64 {
    resolve_text(draft).map_or(0, |text| text.chars().count() as i64)
}

/// Guesses the text's language from function-word profiles.
///
/// Counts stopword hits per supported language and picks the highest;
/// ties keep the earlier language in profile order, and zero hits
/// yield `"und"`. Deliberately tiny: posts are short and a full
/// detector would dwarf the value.
pub fn text_language(draft: &RecordDraft) -> String {
    let Some(text) = resolve_text(draft) else {
        return "und".to_string();
    };
    let lowered = text.to_lowercase();
    let tokens: Vec<&str> = word_tokens(&lowered);

    let mut best = "und";
    let mut best_hits = 0;
    for (code, is_stopword) in LANGUAGE_PROFILES {
        let hits = tokens.iter().filter(|t| is_stopword(t)).count();
        if hits > best_hits {
            best = code;
            best_hits = hits;
        }
    }
    best.to_string()
}

/// Lexicon polarity of the resolved text: `positive`, `negative`, or
/// `neutral` (which also covers records without text).
pub fn text_sentiment(draft: &RecordDraft) -> String {
    let Some(text) = resolve_text(draft) else {
        return "neutral".to_string();
    };
    let lowered = text.to_lowercase();
    let mut score = 0i64;
    for token in word_tokens(&lowered) {
        if is_positive_word(token) {
            score += 1;
        } else if is_negative_word(token) {
            score -= 1;
        }
    }
    match score.cmp(&0) {
        std::cmp::Ordering::Greater => "positive".to_string(),
        std::cmp::Ordering::Less => "negative".to_string(),
        std::cmp::Ordering::Equal => "neutral".to_string(),
    }
}

/// Number of `#tag` tokens in the resolved text, duplicates included.
pub fn hashtag_count(draft: &RecordDraft) -> i64 {
    resolve_text(draft).map_or(0, |text| HASHTAG_RE.find_iter(text).count() as i64)
}

/// Number of `@handle` tokens in the resolved text, duplicates included.
pub fn mention_count(draft: &RecordDraft) -> i64 {
    resolve_text(draft).map_or(0, |text| MENTION_RE.find_iter(text).count() as i64)
}

/// Distinct hashtags in order of first appearance, lowercased, without
/// the `#` prefix.
pub fn extract_hashtags(draft: &RecordDraft) -> Vec<String> {
    let Some(text) = resolve_text(draft) else {
        return Vec::new();
    };
    let mut seen = HashSet::new();
    HASHTAG_RE
        .captures_iter(text)
        .filter_map(|c| {
            let tag = c[1].to_lowercase();
            seen.insert(tag.clone()).then_some(tag)
        })
        .collect()
}

fn word_tokens(lowered: &str) -> Vec<&str> {
    lowered
        .split(|c: char| !c.is_alphabetic())
        .filter(|t| !t.is_empty())
        .collect()
}

const LANGUAGE_PROFILES: [(&str, fn(&str) -> bool); 5] = [
    ("en", is_en_stopword),
    ("es", is_es_stopword),
    ("pt", is_pt_stopword),
    ("fr", is_fr_stopword),
    ("de", is_de_stopword),
];

fn is_en_stopword(token: &str) -> bool {
    matches!(
        token,
        "the"
            | "and"
            | "is"
            | "are"
            | "was"
            | "of"
            | "to"
            | "in"
            | "it"
            | "this"
            | "that"
            | "with"
            | "for"
            | "on"
    )
}

fn is_es_stopword(token: &str) -> bool {
    matches!(
        token,
        "el" | "la"
            | "los"
            | "las"
            | "es"
            | "una"
            | "que"
            | "de"
            | "y"
            | "en"
            | "por"
            | "con"
            | "para"
            | "está"
    )
}

fn is_pt_stopword(token: &str) -> bool {
    matches!(
        token,
        "o" | "os"
            | "as"
            | "é"
            | "um"
            | "uma"
            | "que"
            | "de"
            | "em"
            | "não"
            | "com"
            | "para"
            | "por"
            | "mais"
    )
}

fn is_fr_stopword(token: &str) -> bool {
    matches!(
        token,
        "le" | "les"
            | "est"
            | "et"
            | "une"
            | "que"
            | "de"
            | "en"
            | "pour"
            | "avec"
            | "dans"
            | "ce"
            | "sur"
            | "pas"
    )
}

fn is_de_stopword(token: &str) -> bool {
    matches!(
        token,
        "der" | "die"
            | "das"
            | "ist"
            | "und"
            | "ein"
            | "eine"
            | "mit"
            | "für"
            | "nicht"
            | "auf"
            | "zu"
            | "von"
            | "im"
    )
}

fn is_positive_word(token: &str) -> bool {
    matches!(
        token,
        "love"
            | "loved"
            | "great"
            | "amazing"
            | "awesome"
            | "best"
            | "happy"
            | "beautiful"
            | "perfect"
            | "excited"
            | "good"
            | "incredible"
            | "favorite"
            | "win"
    )
}

fn is_negative_word(token: &str) -> bool {
    matches!(
        token,
        "hate"
            | "hated"
            | "worst"
            | "bad"
            | "terrible"
            | "awful"
            | "sad"
            | "angry"
            | "broken"
            | "horrible"
            | "disappointing"
            | "scam"
            | "fail"
            | "ugly"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use unipost_model::Platform;

    fn draft_with_text(text: &str) -> RecordDraft {
        let mut draft = RecordDraft::new(Platform::Tiktok);
        draft.set("post_content", json!(text));
        draft
    }

    #[test]
    fn resolves_first_non_empty_candidate() {
        let mut draft = RecordDraft::new(Platform::Youtube);
        draft.set("post_content", json!(""));
        draft.set("description", json!("   "));
        draft.set("title", json!("Launch week"));
        assert_eq!(resolve_text(&draft), Some("Launch week"));
    }

    #[test]
    fn length_counts_unicode_scalars() {
        assert_eq!(text_length(&draft_with_text("héllo")), 5);
        assert_eq!(text_length(&RecordDraft::new(Platform::Tiktok)), 0);
    }

    #[test]
    fn language_profiles_pick_the_dominant_language() {
        assert_eq!(
            text_language(&draft_with_text("this is the best day of the year")),
            "en"
        );
        assert_eq!(
            text_language(&draft_with_text("la vida es una fiesta que no para")),
            "es"
        );
        assert_eq!(
            text_language(&draft_with_text("não é um problema para quem insiste")),
            "pt"
        );
        assert_eq!(
            text_language(&draft_with_text("le style est dans les détails pour toujours")),
            "fr"
        );
        assert_eq!(
            text_language(&draft_with_text("der hund und die katze ist nicht im haus")),
            "de"
        );
        assert_eq!(text_language(&draft_with_text("xyzzy plugh 12345")), "und");
    }

    #[test]
    fn sentiment_follows_lexicon_polarity() {
        assert_eq!(
            text_sentiment(&draft_with_text("what an amazing beautiful launch, love it")),
            "positive"
        );
        assert_eq!(
            text_sentiment(&draft_with_text("worst drop ever, terrible and broken")),
            "negative"
        );
        assert_eq!(
            text_sentiment(&draft_with_text("new colorway drops friday")),
            "neutral"
        );
        assert_eq!(
            text_sentiment(&draft_with_text("great product but awful shipping")),
            "neutral"
        );
    }

    #[test]
    fn hashtags_and_mentions_are_counted_from_text() {
        let draft = draft_with_text("big drop #Spring #sale #Spring with @alice and @Bob.Smith");
        assert_eq!(hashtag_count(&draft), 3);
        assert_eq!(mention_count(&draft), 2);
        assert_eq!(extract_hashtags(&draft), vec!["spring", "sale"]);
    }

    #[test]
    fn no_text_yields_zero_values() {
        let draft = RecordDraft::new(Platform::Instagram);
        assert_eq!(hashtag_count(&draft), 0);
        assert_eq!(text_language(&draft), "und");
        assert_eq!(text_sentiment(&draft), "neutral");
        assert!(extract_hashtags(&draft).is_empty());
    }
}
