//! Word-list languages a lobby can be created with.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

use crate::ProtocolError;

/// A lobby's word-list language.
///
/// Every language has a snake-case locale token (`en_us`, `de`, ...).
/// Two languages also have a legacy name that older servers use; those
/// are what goes on the wire, and both forms are accepted when parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Language {
    #[default]
    EnglishUs,
    EnglishGb,
    German,
    French,
    Italian,
    Dutch,
    Polish,
}

/// Legacy wire names, kept for compatibility with existing servers.
const LEGACY_ALIASES: [(&str, Language); 2] = [
    ("english", Language::EnglishUs),
    ("english_gb", Language::EnglishGb),
];

impl Language {
    pub const ALL: [Language; 7] = [
        Language::EnglishUs,
        Language::EnglishGb,
        Language::German,
        Language::French,
        Language::Italian,
        Language::Dutch,
        Language::Polish,
    ];

    /// The locale token for this language.
    pub fn code(self) -> &'static str {
        match self {
            Language::EnglishUs => "en_us",
            Language::EnglishGb => "en_gb",
            Language::German => "de",
            Language::French => "fr",
            Language::Italian => "it",
            Language::Dutch => "nl",
            Language::Polish => "pl",
        }
    }

    /// The token sent to the server: the legacy name if there is one,
    /// otherwise the locale token.
    pub fn wire_name(self) -> &'static str {
        LEGACY_ALIASES
            .iter()
            .find(|(_, language)| *language == self)
            .map_or(self.code(), |(alias, _)| *alias)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

impl FromStr for Language {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim().to_ascii_lowercase();
        LEGACY_ALIASES
            .iter()
            .find(|(alias, _)| *alias == token)
            .map(|(_, language)| *language)
            .or_else(|| Language::ALL.into_iter().find(|l| l.code() == token))
            .ok_or_else(|| ProtocolError::UnknownLanguage(s.to_owned()))
    }
}

impl Serialize for Language {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.wire_name())
    }
}

impl<'de> Deserialize<'de> for Language {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let token = String::deserialize(deserializer)?;
        token.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_names_on_the_wire() {
        assert_eq!(Language::EnglishUs.wire_name(), "english");
        assert_eq!(Language::EnglishGb.wire_name(), "english_gb");
        assert_eq!(Language::German.wire_name(), "de");
    }

    #[test]
    fn test_parse_accepts_alias_and_code() {
        assert_eq!("english".parse::<Language>().unwrap(), Language::EnglishUs);
        assert_eq!("en_us".parse::<Language>().unwrap(), Language::EnglishUs);
        assert_eq!("english_gb".parse::<Language>().unwrap(), Language::EnglishGb);
        assert_eq!("EN_GB".parse::<Language>().unwrap(), Language::EnglishGb);
        assert_eq!("nl".parse::<Language>().unwrap(), Language::Dutch);
    }

    #[test]
    fn test_parse_unknown_language_fails() {
        let err = "klingon".parse::<Language>().unwrap_err();
        assert!(matches!(err, ProtocolError::UnknownLanguage(_)));
    }

    #[test]
    fn test_every_wire_name_parses_back() {
        for language in Language::ALL {
            assert_eq!(language.wire_name().parse::<Language>().unwrap(), language);
        }
    }
}
