//! Placeholder masking for machine translation
//!
//! Localization strings carry named interpolation slots such as `%(name)s`.
//! Machine translation providers happily translate or mangle those, so before
//! a string is sent out every placeholder occurrence is swapped for a
//! positional marker token (`__VAR0__`, `__VAR1__`, ...). After translation the
//! markers are swapped back.
//!
//! ```ignore
//! Source:      "Hello %(name)s, you have %(count)s items"
//! Masked:      "Hello __VAR0__, you have __VAR1__ items"
//! Translated:  "Hallo __VAR0__, du hast __VAR1__ Artikel"
//! Restored:    "Hallo %(name)s, du hast %(count)s Artikel"
//! ```
//!
//! Every occurrence gets its own index, so a placeholder used twice produces
//! two markers. Reordering by the provider is detected and reported but not
//! corrected.

use crate::error::{MtError, MtResult};
use regex::{Captures, Regex};
use std::sync::LazyLock;
use tracing::{debug, warn};

/// Matches `%(identifier)s`; the identifier is anything up to the first `)`
static PLACEHOLDER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"%\(([^)]+)\)s").expect("placeholder pattern is valid"));

/// Prefix of marker tokens; extended with `X` when the source already contains it
const MARKER_PREFIX: &str = "__VAR";
const MARKER_SUFFIX: &str = "__";

/// A single placeholder occurrence extracted from a source text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    /// Position in the placeholder table (order of occurrence)
    pub index: usize,
    /// The identifier between the parentheses, e.g. `name` for `%(name)s`
    pub name: String,
    /// The literal placeholder as it appeared in the source
    pub literal: String,
    /// The marker token standing in for this occurrence
    pub marker: String,
}

/// How to react when provider output lacks some marker tokens
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MarkerPolicy {
    /// Restore whatever markers are present, warn about the rest
    #[default]
    Lenient,
    /// Fail with `MtError::MissingMarkers`
    Strict,
}

/// Source text with its placeholders replaced by marker tokens
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskedText {
    /// Text to hand to the translation provider
    pub text: String,
    /// Extracted placeholders in order of occurrence, duplicates included
    pub placeholders: Vec<Placeholder>,
    marker_prefix: String,
}

/// Result of restoring placeholders into translated text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoredText {
    /// Translated text with placeholders back in place
    pub text: String,
    /// Indices of markers that did not survive translation
    pub missing: Vec<usize>,
    /// Whether the markers came back in a different order than they were sent
    pub reordered: bool,
}

/// Replace every `%(name)s` occurrence in `text` with a positional marker token
///
/// # Example
/// ```ignore
/// let masked = mask("%(x)s plus %(x)s");
/// assert_eq!(masked.text, "__VAR0__ plus __VAR1__");
/// assert_eq!(masked.placeholders.len(), 2);
/// ```
pub fn mask(text: &str) -> MaskedText {
    let marker_prefix = marker_prefix_for(text);
    let mut placeholders = Vec::new();

    let masked = PLACEHOLDER_PATTERN.replace_all(text, |caps: &Captures| {
        let index = placeholders.len();
        let marker = marker_token(&marker_prefix, index);
        placeholders.push(Placeholder {
            index,
            name: caps[1].to_string(),
            literal: caps[0].to_string(),
            marker: marker.clone(),
        });
        marker
    });

    debug!(
        placeholders = placeholders.len(),
        marker_prefix = %marker_prefix,
        "masked placeholders"
    );

    MaskedText {
        text: masked.into_owned(),
        placeholders,
        marker_prefix,
    }
}

/// Whether `text` contains at least one `%(name)s` placeholder
pub fn has_placeholders(text: &str) -> bool {
    PLACEHOLDER_PATTERN.is_match(text)
}

impl MaskedText {
    /// Whether any placeholder was masked
    pub fn is_masked(&self) -> bool {
        !self.placeholders.is_empty()
    }

    /// Swap marker tokens in `translated` back to their placeholders
    ///
    /// Replacement is a single pass, so a restored placeholder can never be
    /// mistaken for another marker. Marker tokens with an index outside the
    /// placeholder table are left untouched.
    pub fn restore(&self, translated: &str, policy: MarkerPolicy) -> MtResult<RestoredText> {
        if !self.is_masked() {
            return Ok(RestoredText {
                text: translated.to_string(),
                missing: Vec::new(),
                reordered: false,
            });
        }

        let pattern = Regex::new(&format!(
            r"{}(\d+){}",
            regex::escape(&self.marker_prefix),
            regex::escape(MARKER_SUFFIX)
        ))
        .map_err(|e| MtError::Other(format!("Failed to build marker pattern: {}", e)))?;

        let mut found_order = Vec::new();
        let restored = pattern.replace_all(translated, |caps: &Captures| {
            let placeholder = caps[1]
                .parse::<usize>()
                .ok()
                .and_then(|index| self.placeholders.get(index));
            match placeholder {
                Some(placeholder) => {
                    found_order.push(placeholder.index);
                    placeholder.literal.clone()
                }
                None => caps[0].to_string(),
            }
        });

        let missing: Vec<usize> = self
            .placeholders
            .iter()
            .map(|p| p.index)
            .filter(|index| !found_order.contains(index))
            .collect();
        let reordered = found_order.windows(2).any(|pair| pair[0] > pair[1]);

        if !missing.is_empty() {
            match policy {
                MarkerPolicy::Strict => return Err(MtError::MissingMarkers(missing)),
                MarkerPolicy::Lenient => {
                    warn!(missing = ?missing, "marker tokens lost in translation");
                }
            }
        }
        if reordered {
            debug!(order = ?found_order, "marker tokens reordered by provider");
        }

        Ok(RestoredText {
            text: restored.into_owned(),
            missing,
            reordered,
        })
    }
}

fn marker_prefix_for(text: &str) -> String {
    let mut prefix = MARKER_PREFIX.to_string();
    while text.contains(&prefix) {
        prefix.push('X');
    }
    prefix
}

fn marker_token(prefix: &str, index: usize) -> String {
    format!("{}{}{}", prefix, index, MARKER_SUFFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_two_placeholders() {
        let masked = mask("Hello %(name)s, you have %(count)s items");
        assert_eq!(masked.text, "Hello __VAR0__, you have __VAR1__ items");
        assert_eq!(masked.placeholders.len(), 2);
        assert_eq!(masked.placeholders[0].name, "name");
        assert_eq!(masked.placeholders[1].name, "count");
        assert_eq!(masked.placeholders[1].literal, "%(count)s");
        assert_eq!(masked.placeholders[1].marker, "__VAR1__");
    }

    #[test]
    fn test_mask_no_placeholders() {
        let masked = mask("Hello world");
        assert_eq!(masked.text, "Hello world");
        assert!(!masked.is_masked());
    }

    #[test]
    fn test_mask_duplicates_get_independent_markers() {
        let masked = mask("%(x)s plus %(x)s");
        assert_eq!(masked.text, "__VAR0__ plus __VAR1__");
        assert_eq!(masked.placeholders[0].name, "x");
        assert_eq!(masked.placeholders[1].name, "x");
        assert_ne!(masked.placeholders[0].marker, masked.placeholders[1].marker);
    }

    #[test]
    fn test_mask_malformed_placeholders_pass_through() {
        for text in ["%(name", "%()s", "%(name) s", "(name)s", "%name)s"] {
            let masked = mask(text);
            assert_eq!(masked.text, text);
            assert!(!masked.is_masked());
        }
    }

    #[test]
    fn test_mask_identifier_with_spaces_and_symbols() {
        let masked = mask("Total: %(row count)s / %(max-rows)s");
        assert_eq!(masked.placeholders[0].name, "row count");
        assert_eq!(masked.placeholders[1].name, "max-rows");
    }

    #[test]
    fn test_mask_only_placeholder() {
        let masked = mask("%(value)s");
        assert_eq!(masked.text, "__VAR0__");
    }

    #[test]
    fn test_mask_avoids_markers_already_in_source() {
        let masked = mask("__VAR0__ stays, %(x)s moves");
        assert_eq!(masked.text, "__VAR0__ stays, __VARX0__ moves");

        let restored = masked.restore(&masked.text, MarkerPolicy::Strict).unwrap();
        assert_eq!(restored.text, "__VAR0__ stays, %(x)s moves");
    }

    #[test]
    fn test_has_placeholders() {
        assert!(has_placeholders("Hi %(user)s"));
        assert!(!has_placeholders("Hi user"));
        assert!(!has_placeholders("100%"));
    }

    #[test]
    fn test_roundtrip_identity() {
        let sources = [
            "",
            "Hello world",
            "Hello %(name)s, you have %(count)s items",
            "%(x)s plus %(x)s",
            "%(a)s%(b)s%(c)s%(d)s%(e)s%(f)s%(g)s%(h)s%(i)s%(j)s%(k)s",
            "Percent: 50%% of %(total)s",
        ];
        for source in sources {
            let masked = mask(source);
            let restored = masked.restore(&masked.text, MarkerPolicy::Strict).unwrap();
            assert_eq!(restored.text, source);
            assert!(restored.missing.is_empty());
            assert!(!restored.reordered);
        }
    }

    #[test]
    fn test_restore_tenth_marker_not_confused_with_first() {
        let source = "%(a)s %(b)s %(c)s %(d)s %(e)s %(f)s %(g)s %(h)s %(i)s %(j)s %(k)s";
        let masked = mask(source);
        assert!(masked.text.contains("__VAR10__"));
        let restored = masked.restore(&masked.text, MarkerPolicy::Strict).unwrap();
        assert_eq!(restored.text, source);
    }

    #[test]
    fn test_restore_detects_reordering() {
        let masked = mask("%(user)s sent %(count)s");
        let restored = masked
            .restore("__VAR1__ は __VAR0__ によって送信", MarkerPolicy::Strict)
            .unwrap();
        assert_eq!(restored.text, "%(count)s は %(user)s によって送信");
        assert!(restored.reordered);
    }

    #[test]
    fn test_restore_lenient_keeps_going_on_missing_marker() {
        let masked = mask("Hello %(name)s, you have %(count)s items");
        let restored = masked
            .restore("Hallo __VAR0__, du hast Artikel", MarkerPolicy::Lenient)
            .unwrap();
        assert_eq!(restored.text, "Hallo %(name)s, du hast Artikel");
        assert_eq!(restored.missing, vec![1]);
    }

    #[test]
    fn test_restore_strict_fails_on_missing_marker() {
        let masked = mask("Hello %(name)s, you have %(count)s items");
        let result = masked.restore("Hallo, du hast Artikel", MarkerPolicy::Strict);
        assert_eq!(result, Err(MtError::MissingMarkers(vec![0, 1])));
    }

    #[test]
    fn test_restore_altered_marker_stays_literal() {
        let masked = mask("Hi %(name)s");
        let restored = masked.restore("Salut __var0__", MarkerPolicy::Lenient).unwrap();
        assert_eq!(restored.text, "Salut __var0__");
        assert_eq!(restored.missing, vec![0]);
    }

    #[test]
    fn test_restore_unknown_marker_index_untouched() {
        let masked = mask("Hi %(name)s");
        let restored = masked
            .restore("Hi __VAR0__ __VAR7__", MarkerPolicy::Strict)
            .unwrap();
        assert_eq!(restored.text, "Hi %(name)s __VAR7__");
    }

    #[test]
    fn test_restore_duplicated_marker_by_provider() {
        let masked = mask("%(name)s");
        let restored = masked
            .restore("__VAR0__ und __VAR0__", MarkerPolicy::Strict)
            .unwrap();
        assert_eq!(restored.text, "%(name)s und %(name)s");
    }

    #[test]
    fn test_restore_without_placeholders_is_verbatim() {
        let masked = mask("Hello world");
        let restored = masked.restore("HELLO WORLD", MarkerPolicy::Strict).unwrap();
        assert_eq!(restored.text, "HELLO WORLD");
    }
}
