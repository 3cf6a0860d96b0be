//! Amenity tags.
//!
//! The backend stores a café's amenities as one free-text, comma-delimited
//! string (`"WiFi, outlets,metro-friendly"`). Before any filtering the string is
//! parsed into a [`TagSet`]:
//!
//! - split on `,`
//! - trim surrounding whitespace
//! - lower-case each token
//! - drop empty tokens
//!
//! A missing or empty tag string yields an empty set, which never satisfies an
//! enabled amenity filter.
//!
//! ## Amenity Tokens
//!
//! The filter panel exposes four toggles. Each maps to one tag token:
//!
//! | Toggle | Token |
//! |--------|-------|
//! | `wifi` | `wifi` |
//! | `bathrooms` | `bathrooms` |
//! | `outlets` | `outlets` |
//! | `metro` | `metro-friendly` |
//!
//! The `metro` → `metro-friendly` mismatch is kept as the backend data has it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Parsed, normalized set of amenity tags for a single café.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSet(BTreeSet<String>);

impl TagSet {
    /// Parses a raw comma-delimited tag string.
    ///
    /// ```
    /// use cafescout::tags::TagSet;
    ///
    /// let tags = TagSet::parse(" WiFi ,outlets,, Metro-Friendly");
    /// assert!(tags.contains("wifi"));
    /// assert!(tags.contains("metro-friendly"));
    /// assert_eq!(tags.len(), 3);
    ///
    /// assert!(TagSet::parse("").is_empty());
    /// ```
    pub fn parse(raw: &str) -> Self {
        Self(
            raw.split(',')
                .map(|token| token.trim().to_lowercase())
                .filter(|token| !token.is_empty())
                .collect(),
        )
    }

    /// Parses an optional tag string; `None` is the empty set.
    pub fn parse_opt(raw: Option<&str>) -> Self {
        raw.map(Self::parse).unwrap_or_default()
    }

    pub fn contains(&self, token: &str) -> bool {
        self.0.contains(token)
    }

    pub fn has(&self, amenity: Amenity) -> bool {
        self.contains(amenity.tag_token())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

/// The amenity toggles offered by the filter panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Amenity {
    Wifi,
    Bathrooms,
    Outlets,
    /// Labelled "metro" in the panel but matched against the `metro-friendly` tag.
    Metro,
}

impl Amenity {
    pub const ALL: [Amenity; 4] = [
        Amenity::Wifi,
        Amenity::Bathrooms,
        Amenity::Outlets,
        Amenity::Metro,
    ];

    /// The tag token a café must carry to satisfy this amenity.
    pub fn tag_token(self) -> &'static str {
        match self {
            Amenity::Wifi => "wifi",
            Amenity::Bathrooms => "bathrooms",
            Amenity::Outlets => "outlets",
            Amenity::Metro => "metro-friendly",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Amenity::Wifi => "WiFi",
            Amenity::Bathrooms => "Bathrooms",
            Amenity::Outlets => "Outlets",
            Amenity::Metro => "Metro-Friendly",
        }
    }
}

impl fmt::Display for Amenity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Amenity::Wifi => "wifi",
            Amenity::Bathrooms => "bathrooms",
            Amenity::Outlets => "outlets",
            Amenity::Metro => "metro",
        };
        f.write_str(name)
    }
}

impl std::str::FromStr for Amenity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "wifi" => Ok(Amenity::Wifi),
            "bathrooms" => Ok(Amenity::Bathrooms),
            "outlets" => Ok(Amenity::Outlets),
            "metro" | "metro-friendly" => Ok(Amenity::Metro),
            other => Err(format!(
                "unknown amenity '{}' (expected wifi, bathrooms, outlets or metro)",
                other
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_trims_and_lowercases() {
        let tags = TagSet::parse("  WIFI,Bathrooms  ,outlets ");
        let collected: Vec<&str> = tags.iter().collect();
        assert_eq!(collected, vec!["bathrooms", "outlets", "wifi"]);
    }

    #[test]
    fn parse_drops_empty_tokens() {
        let tags = TagSet::parse(",, ,wifi,");
        assert_eq!(tags.len(), 1);
        assert!(tags.contains("wifi"));
    }

    #[test]
    fn parse_empty_and_missing() {
        assert!(TagSet::parse("").is_empty());
        assert!(TagSet::parse("   ").is_empty());
        assert!(TagSet::parse_opt(None).is_empty());
    }

    #[test]
    fn metro_matches_metro_friendly_token_only() {
        assert!(TagSet::parse("metro-friendly").has(Amenity::Metro));
        assert!(!TagSet::parse("metro").has(Amenity::Metro));
    }

    #[test]
    fn amenity_from_str_accepts_both_metro_spellings() {
        assert_eq!("metro".parse::<Amenity>(), Ok(Amenity::Metro));
        assert_eq!("Metro-Friendly".parse::<Amenity>(), Ok(Amenity::Metro));
        assert_eq!(" WiFi ".parse::<Amenity>(), Ok(Amenity::Wifi));
        assert!("parking".parse::<Amenity>().is_err());
    }
}
