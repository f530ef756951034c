use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::str::FromStr;

use crate::error::PipelineError;
use crate::language::{Language, LanguageProfile};
use crate::models::{Keyword, Utterance};

/// Keyword extraction strategies. Selected by name; an unknown name is a
/// caller error, never a silent fallback to a different algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeywordStrategy {
    /// Inverse-document-frequency weighting over the utterance-level corpus
    FrequencyWeighted,
    /// Co-occurrence-graph ranking over the concatenated transcript
    GraphRanked,
}

impl KeywordStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            KeywordStrategy::FrequencyWeighted => "tfidf",
            KeywordStrategy::GraphRanked => "textrank",
        }
    }
}

impl FromStr for KeywordStrategy {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tfidf" => Ok(KeywordStrategy::FrequencyWeighted),
            "textrank" => Ok(KeywordStrategy::GraphRanked),
            other => Err(PipelineError::UnknownKeywordStrategy(other.to_string())),
        }
    }
}

/// Corpus-level keyword ranking over a set of cleaned utterances.
#[derive(Debug, Clone)]
pub struct KeywordEngine {
    profile: LanguageProfile,
}

impl KeywordEngine {
    pub fn new(language: Language) -> Self {
        Self {
            profile: language.profile(),
        }
    }

    /// Extract the top `top_n` keywords with the given strategy. Empty or
    /// all-blank input yields an empty sequence, not an error.
    pub fn extract(
        &self,
        utterances: &[Utterance],
        strategy: KeywordStrategy,
        top_n: usize,
    ) -> Vec<Keyword> {
        let docs: Vec<&str> = utterances
            .iter()
            .map(|u| u.text.as_str())
            .filter(|t| !t.trim().is_empty())
            .collect();

        if docs.is_empty() || top_n == 0 {
            return Vec::new();
        }

        match strategy {
            KeywordStrategy::FrequencyWeighted => self.extract_tfidf(&docs, top_n),
            KeywordStrategy::GraphRanked => self.extract_textrank(&docs, top_n),
        }
    }

    /// TF-IDF over the utterance-level corpus: each utterance is one
    /// document, terms are unigrams and bigrams, and a term's final score is
    /// its tf-idf weight averaged across the documents that contain it.
    fn extract_tfidf(&self, docs: &[&str], top_n: usize) -> Vec<Keyword> {
        let term_docs: Vec<Vec<String>> = docs
            .iter()
            .map(|d| {
                let tokens = self.tokenize(d);
                with_bigrams(&tokens)
            })
            .collect();

        let n_docs = term_docs.iter().filter(|t| !t.is_empty()).count();
        if n_docs == 0 {
            return Vec::new();
        }

        // Document frequency per term
        let mut df: HashMap<&str, usize> = HashMap::new();
        for terms in &term_docs {
            let unique: HashSet<&str> = terms.iter().map(String::as_str).collect();
            for term in unique {
                *df.entry(term).or_insert(0) += 1;
            }
        }

        // Sum of per-document tf-idf weights, averaged at the end
        let mut weight_sum: HashMap<&str, f64> = HashMap::new();
        for terms in &term_docs {
            if terms.is_empty() {
                continue;
            }
            let mut tf: HashMap<&str, usize> = HashMap::new();
            for term in terms {
                *tf.entry(term).or_insert(0) += 1;
            }
            for (term, count) in tf {
                let idf = (((1 + n_docs) as f64) / ((1 + df[term]) as f64)).ln() + 1.0;
                *weight_sum.entry(term).or_insert(0.0) += count as f64 * idf;
            }
        }

        let mut scored: Vec<Keyword> = weight_sum
            .into_iter()
            .map(|(term, sum)| Keyword {
                score: Some(sum / df[term] as f64),
                term: term.to_string(),
            })
            .collect();

        sort_ranked(&mut scored);
        scored.truncate(top_n);
        scored
    }

    /// Co-occurrence-graph ranking over the concatenated transcript text.
    /// The underlying ranking produces no weight comparable to the tf-idf
    /// strategy, so scores are surfaced as `None`.
    fn extract_textrank(&self, docs: &[&str], top_n: usize) -> Vec<Keyword> {
        let combined = docs.join(" ");
        let tokens = self.tokenize(&combined);
        if tokens.is_empty() {
            return Vec::new();
        }

        let ranked = pagerank_terms(&tokens, COOCCURRENCE_WINDOW);

        ranked
            .into_iter()
            .take(top_n)
            .map(|term| Keyword { term, score: None })
            .collect()
    }

    /// Lowercase word tokens with stopwords and noise dropped.
    fn tokenize(&self, text: &str) -> Vec<String> {
        text.to_lowercase()
            .split(|c: char| !c.is_alphanumeric() && c != '-')
            .filter(|t| !t.is_empty())
            .filter(|t| t.chars().count() >= 2 || t.chars().any(|c| !c.is_ascii()))
            .filter(|t| !t.chars().all(|c| c.is_numeric()))
            .filter(|t| !self.profile.stopwords.contains(*t))
            .map(str::to_string)
            .collect()
    }
}

const COOCCURRENCE_WINDOW: usize = 4;
const PAGERANK_DAMPING: f64 = 0.85;
const PAGERANK_ITERATIONS: usize = 30;
const PAGERANK_EPSILON: f64 = 1e-4;

/// Unigrams plus adjacent-token bigrams.
fn with_bigrams(tokens: &[String]) -> Vec<String> {
    let mut terms: Vec<String> = tokens.to_vec();
    for pair in tokens.windows(2) {
        terms.push(format!("{} {}", pair[0], pair[1]));
    }
    terms
}

/// Undirected co-occurrence graph over a token stream, ranked with a
/// PageRank-style iteration. Returns terms in descending rank order, ties
/// broken lexicographically.
fn pagerank_terms(tokens: &[String], window: usize) -> Vec<String> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut terms: Vec<&str> = Vec::new();
    for token in tokens {
        if !index.contains_key(token.as_str()) {
            terms.push(token.as_str());
            index.insert(token.as_str(), terms.len() - 1);
        }
    }

    let n = terms.len();
    let mut neighbors: Vec<HashSet<usize>> = vec![HashSet::new(); n];
    for (i, token) in tokens.iter().enumerate() {
        let a = index[token.as_str()];
        for other in tokens.iter().skip(i + 1).take(window - 1) {
            let b = index[other.as_str()];
            if a != b {
                neighbors[a].insert(b);
                neighbors[b].insert(a);
            }
        }
    }

    let mut scores = vec![1.0 / n as f64; n];
    for _ in 0..PAGERANK_ITERATIONS {
        let mut next = vec![(1.0 - PAGERANK_DAMPING) / n as f64; n];
        for (node, links) in neighbors.iter().enumerate() {
            if links.is_empty() {
                continue;
            }
            let share = PAGERANK_DAMPING * scores[node] / links.len() as f64;
            for &target in links {
                next[target] += share;
            }
        }

        let delta: f64 = scores
            .iter()
            .zip(next.iter())
            .map(|(a, b)| (a - b).abs())
            .sum();
        scores = next;
        if delta < PAGERANK_EPSILON {
            break;
        }
    }

    let mut ranked: Vec<(f64, &str)> = scores
        .iter()
        .zip(terms.iter())
        .map(|(&s, &t)| (s, t))
        .collect();
    ranked.sort_by(|a, b| {
        b.0.partial_cmp(&a.0)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.1.cmp(b.1))
    });

    ranked.into_iter().map(|(_, t)| t.to_string()).collect()
}

/// Descending by score, ties broken lexicographically by term.
fn sort_ranked(keywords: &mut [Keyword]) {
    keywords.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.term.cmp(&b.term))
    });
}
