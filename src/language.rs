use std::collections::HashSet;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

/// Closed set of supported languages. Recognition, normalization, keyword
/// stopwords and entity stemming all key off this; an unsupported code is
/// rejected before any stage runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Ru,
    Zh,
}

impl Language {
    /// ISO-style code used on the wire and in reports.
    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Ru => "ru",
            Language::Zh => "zh",
        }
    }

    /// Resolve the normalization profile for this language. Called once at
    /// construction; the profile is read-only afterwards.
    pub fn profile(&self) -> LanguageProfile {
        match self {
            Language::En => LanguageProfile::new(
                *self,
                &["you know", "i mean", "sort of", "kind of"],
                &[
                    "um", "uh", "like", "basically", "actually", "literally", "well", "so",
                    "right", "okay",
                ],
                &[],
                ENGLISH_STOPWORDS,
            ),
            Language::Ru => LanguageProfile::new(
                *self,
                &["как бы", "то есть", "в общем", "так сказать", "в принципе"],
                &[
                    "ну", "вот", "это", "типа", "короче", "значит", "собственно", "слушай",
                    "знаешь", "понимаешь", "видишь", "эээ", "ммм", "ааа",
                ],
                &[
                    "бля", "хуй", "хуё", "пизд", "ебан", "ебл", "муда", "сволоч", "гандон",
                ],
                RUSSIAN_STOPWORDS,
            ),
            Language::Zh => LanguageProfile::new(
                *self,
                &[],
                &["嗯", "啊", "呃", "那个", "这个", "就是", "然后", "对"],
                &[],
                CHINESE_STOPWORDS,
            ),
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "en" => Ok(Language::En),
            "ru" => Ok(Language::Ru),
            "zh" => Ok(Language::Zh),
            other => Err(PipelineError::UnsupportedLanguage(other.to_string())),
        }
    }
}

/// Per-language normalization vocabulary, resolved once from [`Language`].
/// Read-only; safe to share across concurrent cleaning calls.
#[derive(Debug, Clone)]
pub struct LanguageProfile {
    pub language: Language,
    /// Multi-word filler phrases as lowercase token sequences, longest
    /// (most tokens) first so shorter phrases cannot shadow longer ones
    pub multi_word_fillers: Vec<Vec<String>>,
    /// Single-word fillers, lowercase
    pub single_fillers: HashSet<String>,
    /// Profane word stems; a stem matching anywhere inside a token censors
    /// the whole token
    pub profanity_stems: Vec<String>,
    /// Stopwords for keyword extraction, lowercase
    pub stopwords: HashSet<String>,
}

impl LanguageProfile {
    fn new(
        language: Language,
        multi_word: &[&str],
        single: &[&str],
        profanity: &[&str],
        stopwords: &[&str],
    ) -> Self {
        let mut multi_word_fillers: Vec<Vec<String>> = multi_word
            .iter()
            .map(|p| p.split_whitespace().map(str::to_string).collect())
            .collect();
        multi_word_fillers.sort_by(|a: &Vec<String>, b| b.len().cmp(&a.len()));

        Self {
            language,
            multi_word_fillers,
            single_fillers: single.iter().map(|s| s.to_string()).collect(),
            profanity_stems: profanity.iter().map(|s| s.to_string()).collect(),
            stopwords: stopwords.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Whether profanity censoring applies to this language.
    pub fn censor_profanity(&self) -> bool {
        !self.profanity_stems.is_empty()
    }
}

const ENGLISH_STOPWORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "if", "of", "to", "in", "on", "at", "is", "are",
    "was", "were", "be", "been", "it", "this", "that", "these", "those", "i", "you", "he",
    "she", "we", "they", "my", "your", "his", "her", "its", "our", "their", "for", "with",
    "as", "by", "from", "not", "no", "do", "does", "did", "have", "has", "had", "will",
    "would", "can", "could", "what", "which", "who", "when", "where", "how", "there", "here",
    "than", "then", "them", "me", "him", "us", "just", "about", "into", "over", "after",
    "before", "up", "down", "out", "very",
];

const RUSSIAN_STOPWORDS: &[&str] = &[
    "и", "в", "не", "на", "я", "что", "он", "с", "как", "а", "то", "все", "она", "так",
    "его", "но", "да", "ты", "к", "у", "же", "вы", "за", "бы", "по", "ее", "мне", "было",
    "от", "меня", "еще", "нет", "о", "из", "ему", "мы", "они", "для", "или", "был", "эта",
    "этот", "чтобы", "когда", "уже", "есть",
];

const CHINESE_STOPWORDS: &[&str] = &[
    "的", "了", "是", "我", "你", "他", "她", "在", "有", "和", "也", "都", "不", "就",
    "人", "这", "那", "要", "会", "着", "说", "与",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_language_codes() {
        assert_eq!("en".parse::<Language>().unwrap(), Language::En);
        assert_eq!("RU".parse::<Language>().unwrap(), Language::Ru);
        assert_eq!("zh".parse::<Language>().unwrap(), Language::Zh);
        assert!("de".parse::<Language>().is_err());
    }

    #[test]
    fn test_multi_word_fillers_longest_first() {
        let profile = Language::Ru.profile();
        let lens: Vec<usize> = profile.multi_word_fillers.iter().map(|p| p.len()).collect();
        let mut sorted = lens.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(lens, sorted);
    }

    #[test]
    fn test_censoring_is_russian_only() {
        assert!(!Language::En.profile().censor_profanity());
        assert!(Language::Ru.profile().censor_profanity());
        assert!(!Language::Zh.profile().censor_profanity());
    }
}
