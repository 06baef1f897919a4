//! Language definitions for the supported recognition/synthesis locales

use serde::{Deserialize, Serialize};

/// Supported locales (BCP-47 style tags)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Language {
    #[default]
    EnUs,
    EnGb,
    EsEs,
    FrFr,
    DeDe,
    ItIt,
    PtBr,
    RuRu,
    ZhCn,
    JaJp,
    KoKr,
    ArSa,
    HiIn,
}

impl Language {
    /// Get the BCP-47 tag
    pub fn tag(&self) -> &'static str {
        match self {
            Self::EnUs => "en-US",
            Self::EnGb => "en-GB",
            Self::EsEs => "es-ES",
            Self::FrFr => "fr-FR",
            Self::DeDe => "de-DE",
            Self::ItIt => "it-IT",
            Self::PtBr => "pt-BR",
            Self::RuRu => "ru-RU",
            Self::ZhCn => "zh-CN",
            Self::JaJp => "ja-JP",
            Self::KoKr => "ko-KR",
            Self::ArSa => "ar-SA",
            Self::HiIn => "hi-IN",
        }
    }

    /// Get human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            Self::EnUs => "English (US)",
            Self::EnGb => "English (UK)",
            Self::EsEs => "Spanish",
            Self::FrFr => "French",
            Self::DeDe => "German",
            Self::ItIt => "Italian",
            Self::PtBr => "Portuguese (Brazil)",
            Self::RuRu => "Russian",
            Self::ZhCn => "Chinese (Mandarin)",
            Self::JaJp => "Japanese",
            Self::KoKr => "Korean",
            Self::ArSa => "Arabic",
            Self::HiIn => "Hindi",
        }
    }

    /// Parse from a tag (case-insensitive, accepts `-` or `_` separators
    /// and bare primary subtags like "en" or "fr")
    pub fn from_tag_loose(s: &str) -> Option<Self> {
        let s = s.trim().replace('_', "-").to_lowercase();
        match s.as_str() {
            "en" | "en-us" | "english" => Some(Self::EnUs),
            "en-gb" => Some(Self::EnGb),
            "es" | "es-es" | "spanish" => Some(Self::EsEs),
            "fr" | "fr-fr" | "french" => Some(Self::FrFr),
            "de" | "de-de" | "german" => Some(Self::DeDe),
            "it" | "it-it" | "italian" => Some(Self::ItIt),
            "pt" | "pt-br" | "portuguese" => Some(Self::PtBr),
            "ru" | "ru-ru" | "russian" => Some(Self::RuRu),
            "zh" | "zh-cn" | "chinese" | "mandarin" => Some(Self::ZhCn),
            "ja" | "ja-jp" | "japanese" => Some(Self::JaJp),
            "ko" | "ko-kr" | "korean" => Some(Self::KoKr),
            "ar" | "ar-sa" | "arabic" => Some(Self::ArSa),
            "hi" | "hi-in" | "hindi" => Some(Self::HiIn),
            _ => None,
        }
    }

    /// Get all supported languages
    pub fn all() -> &'static [Language] {
        &[
            Self::EnUs,
            Self::EnGb,
            Self::EsEs,
            Self::FrFr,
            Self::DeDe,
            Self::ItIt,
            Self::PtBr,
            Self::RuRu,
            Self::ZhCn,
            Self::JaJp,
            Self::KoKr,
            Self::ArSa,
            Self::HiIn,
        ]
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag() {
        assert_eq!(Language::EnUs.tag(), "en-US");
        assert_eq!(Language::ZhCn.tag(), "zh-CN");
    }

    #[test]
    fn test_from_tag_loose() {
        assert_eq!(Language::from_tag_loose("en-US"), Some(Language::EnUs));
        assert_eq!(Language::from_tag_loose("EN_us"), Some(Language::EnUs));
        assert_eq!(Language::from_tag_loose("fr"), Some(Language::FrFr));
        assert_eq!(Language::from_tag_loose("mandarin"), Some(Language::ZhCn));
        assert_eq!(Language::from_tag_loose("xx-YY"), None);
    }

    #[test]
    fn test_all_languages() {
        assert_eq!(Language::all().len(), 13);
        assert_eq!(Language::default(), Language::EnUs);
    }
}
