use crate::language::{Language, LanguageProfile};

/// Replacement for censored tokens.
pub const PROFANITY_MASK: &str = "***";

/// Language-aware utterance cleaner.
///
/// `clean` is pure and keeps no mutable state, so one normalizer can serve
/// concurrent calls; the language profile is resolved once at construction
/// and only read afterwards.
#[derive(Debug, Clone)]
pub struct TextNormalizer {
    profile: LanguageProfile,
    remove_fillers: bool,
}

impl TextNormalizer {
    pub fn new(language: Language) -> Self {
        Self::with_options(language, true)
    }

    pub fn with_options(language: Language, remove_fillers: bool) -> Self {
        Self {
            profile: language.profile(),
            remove_fillers,
        }
    }

    /// Clean one utterance. Empty input yields empty output, never an error.
    ///
    /// Passes run in a fixed order; reordering them changes results:
    /// 1. collapse whitespace runs and trim
    /// 2. drop multi-word filler phrases (longest first), then single-word
    ///    fillers by exact case-insensitive token match
    /// 3. censor tokens containing a profane stem (where enabled)
    /// 4. collapse consecutive case-insensitive duplicate tokens
    /// 5. normalize spacing around punctuation and collapse repeated runs
    pub fn clean(&self, raw: &str) -> String {
        if raw.is_empty() {
            return String::new();
        }

        let mut tokens: Vec<String> = raw.split_whitespace().map(str::to_string).collect();

        if self.remove_fillers {
            tokens = remove_phrase_fillers(tokens, &self.profile.multi_word_fillers);
            tokens.retain(|t| !self.profile.single_fillers.contains(&t.to_lowercase()));
        }

        if self.profile.censor_profanity() {
            for token in &mut tokens {
                let lower = token.to_lowercase();
                if self.profile.profanity_stems.iter().any(|s| lower.contains(s.as_str())) {
                    *token = PROFANITY_MASK.to_string();
                }
            }
        }

        collapse_duplicate_tokens(&mut tokens);

        normalize_punctuation(&tokens.join(" "))
    }
}

/// Remove multi-word filler phrases from a token sequence. Phrases are tried
/// longest first at each position so a shorter phrase cannot shadow a longer
/// one that starts at the same token.
fn remove_phrase_fillers(tokens: Vec<String>, phrases: &[Vec<String>]) -> Vec<String> {
    if phrases.is_empty() {
        return tokens;
    }

    let lower: Vec<String> = tokens.iter().map(|t| t.to_lowercase()).collect();
    let mut out = Vec::with_capacity(tokens.len());
    let mut i = 0;

    'scan: while i < tokens.len() {
        for phrase in phrases {
            if i + phrase.len() <= tokens.len() && lower[i..i + phrase.len()] == phrase[..] {
                i += phrase.len();
                continue 'scan;
            }
        }
        out.push(tokens[i].clone());
        i += 1;
    }

    out
}

/// Collapse runs of case-insensitive duplicate tokens to one occurrence.
/// Guards against recognition artifacts that repeat a word.
fn collapse_duplicate_tokens(tokens: &mut Vec<String>) {
    tokens.dedup_by(|b, a| a.to_lowercase() == b.to_lowercase());
}

const TERMINAL_PUNCTUATION: &[char] = &['.', ',', '!', '?', ';', ':'];

/// Remove spaces before terminal punctuation and collapse repeated runs of
/// the same punctuation character.
fn normalize_punctuation(text: &str) -> String {
    let mut out = String::with_capacity(text.len());

    for c in text.chars() {
        if TERMINAL_PUNCTUATION.contains(&c) {
            while out.ends_with(' ') {
                out.pop();
            }
            if out.ends_with(c) {
                continue;
            }
        }
        out.push(c);
    }

    out.trim().to_string()
}
