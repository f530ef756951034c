use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::models::{TimeInterval, Utterance};

/// Closed set of domain entity categories detected in utterance text.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum EntityCategory {
    VehicleType,
    Manufacturer,
    Model,
    System,
    DiagnosticTerm,
}

impl std::fmt::Display for EntityCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EntityCategory::VehicleType => "vehicle_type",
            EntityCategory::Manufacturer => "manufacturer",
            EntityCategory::Model => "model",
            EntityCategory::System => "system",
            EntityCategory::DiagnosticTerm => "diagnostic_term",
        };
        f.write_str(name)
    }
}

/// Entities detected in one utterance. Categories with no matches are
/// omitted from `detected`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UtteranceFindings {
    /// Index into the report's utterance sequence
    pub index: usize,
    pub speaker: Option<String>,
    #[serde(flatten)]
    pub interval: TimeInterval,
    pub detected: BTreeMap<EntityCategory, BTreeSet<String>>,
    pub total_mentions: usize,
}

/// One aggregated entity value with the number of utterances mentioning it.
/// An utterance that repeats a value counts once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityMention {
    pub category: EntityCategory,
    pub value: String,
    pub utterance_count: usize,
}

/// Per-utterance findings plus the corpus-level aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityAnalysis {
    pub per_utterance: Vec<UtteranceFindings>,
    /// Sorted descending by utterance count; ties by category name, then value
    pub summary: Vec<EntityMention>,
    /// Utterances with at least one detected entity
    pub related_utterances: usize,
    pub total_utterances: usize,
}

impl EntityAnalysis {
    pub fn empty() -> Self {
        Self {
            per_utterance: Vec::new(),
            summary: Vec::new(),
            related_utterances: 0,
            total_utterances: 0,
        }
    }
}

/// Vehicle type vocabulary: canonical value plus trigger phrases across the
/// supported languages.
const VEHICLE_TYPES: &[(&str, &[&str])] = &[
    ("sedan", &["sedan", "седан", "轿车"]),
    ("suv", &["suv", "crossover", "внедорожник", "кроссовер", "越野车"]),
    ("truck", &["truck", "pickup", "грузовик", "пикап", "卡车", "皮卡"]),
    ("van", &["van", "minivan", "фургон", "минивэн", "面包车", "货车"]),
    ("coupe", &["coupe", "купе", "双门轿车"]),
    ("convertible", &["convertible", "cabriolet", "кабриолет", "敞篷车"]),
    ("wagon", &["wagon", "estate", "station wagon", "универсал", "旅行车"]),
    ("hatchback", &["hatchback", "хэтчбек", "掀背车"]),
    ("sports_car", &["sports car", "спортивный автомобиль", "спорткар", "跑车"]),
    ("motorcycle", &["motorcycle", "bike", "мотоцикл", "摩托车"]),
    ("electric", &["electric car", "ev", "электромобиль", "电动车"]),
    ("hybrid", &["hybrid", "гибрид", "混合动力车"]),
];

/// Manufacturer names; the value doubles as the trigger.
const MANUFACTURERS: &[&str] = &[
    // American
    "ford", "chevrolet", "chevy", "dodge", "gmc", "tesla", "chrysler", "cadillac", "jeep",
    "ram",
    // Japanese
    "toyota", "honda", "nissan", "mazda", "subaru", "mitsubishi", "suzuki", "lexus", "acura",
    "infiniti",
    // German
    "volkswagen", "vw", "mercedes", "mercedes-benz", "bmw", "audi", "porsche", "opel",
    // Korean
    "hyundai", "kia", "genesis",
    // French
    "renault", "peugeot", "citroën", "citroen",
    // Italian
    "fiat", "ferrari", "lamborghini", "maserati", "alfa romeo",
    // British
    "land rover", "jaguar", "mini", "bentley", "rolls-royce", "aston martin",
    // Chinese
    "byd", "geely", "nio", "xpeng", "li auto", "great wall",
    // Russian, Latin and Cyrillic
    "lada", "лада", "газ", "gaz", "уаз", "uaz", "камаз", "kamaz", "ваз", "vaz",
    // Swedish
    "volvo", "saab",
    // Czech
    "skoda", "škoda",
];

const MODELS: &[&str] = &[
    // Toyota
    "camry", "corolla", "rav4", "prius", "highlander", "tacoma", "tundra", "land cruiser",
    // Honda
    "civic", "accord", "cr-v", "pilot", "fit", "odyssey",
    // Ford
    "f-150", "mustang", "explorer", "escape", "focus", "fusion",
    // Tesla
    "model s", "model 3", "model x", "model y", "cybertruck",
    // BMW
    "3 series", "5 series", "7 series", "x3", "x5", "x7",
    // Mercedes
    "c-class", "e-class", "s-class", "gla", "glc", "gle",
    // Russian, Latin and Cyrillic
    "веста", "vesta", "гранта", "granta", "нива", "niva", "калина", "kalina", "приора",
    "priora",
];

const SYSTEMS: &[(&str, &[&str])] = &[
    ("engine", &["engine", "motor", "двигатель", "мотор", "发动机"]),
    ("transmission", &["transmission", "gearbox", "коробка передач", "трансмиссия", "变速箱"]),
    ("brakes", &["brakes", "тормоза", "刹车"]),
    ("suspension", &["suspension", "подвеска", "悬挂"]),
    ("exhaust", &["exhaust", "выхлоп", "выхлопная система", "排气"]),
    ("fuel_system", &["fuel system", "топливная система", "燃油系统"]),
    ("electrical", &["electrical system", "электрика", "电气系统"]),
    ("cooling", &["cooling system", "radiator", "радиатор", "охлаждение", "冷却系统"]),
    ("steering", &["steering", "рулевое управление", "转向"]),
    ("battery", &["battery", "аккумулятор", "电池"]),
];

const DIAGNOSTIC_TERMS: &[(&str, &[&str])] = &[
    ("malfunction", &["malfunction", "failure", "неисправность", "отказ", "故障"]),
    ("noise", &["noise", "шум", "звук", "噪音"]),
    ("vibration", &["vibration", "вибрация", "тряска", "振动"]),
    ("leak", &["leak", "утечка", "течь", "泄漏"]),
    ("overheating", &["overheating", "перегрев", "过热"]),
    ("warning_light", &["warning light", "check engine", "контрольная лампа", "индикатор", "警告灯"]),
    ("oil_change", &["oil change", "замена масла", "换油"]),
    ("repair", &["repair", "fix", "ремонт", "修理"]),
    ("maintenance", &["maintenance", "service", "обслуживание", "保养"]),
];

/// Curated stem-prefix fallbacks for Russian terms with rich inflection:
/// whole-word matching misses inflected forms ("Ладу" vs "Лада"), so these
/// values also match when a word starts with the given prefix.
const STEM_FALLBACKS: &[(&str, &str)] = &[
    ("лада", "лад"),
    ("ваз", "ваз"),
    ("газ", "газ"),
    ("уаз", "уаз"),
    ("веста", "вест"),
    ("гранта", "гран"),
    ("нива", "нив"),
    ("калина", "калин"),
    ("приора", "приор"),
];

/// Minimum prefix length for a stem fallback to apply.
const MIN_STEM_PREFIX: usize = 3;

/// Dictionary/pattern based detector for automotive entities in utterance
/// text. Stateless; tables are static and matching is pure.
#[derive(Debug, Clone, Default)]
pub struct EntityTagger;

impl EntityTagger {
    pub fn new() -> Self {
        Self
    }

    /// Detect entity values per category. Empty text yields an empty map.
    pub fn analyze(&self, text: &str) -> BTreeMap<EntityCategory, BTreeSet<String>> {
        let mut detected = BTreeMap::new();
        if text.is_empty() {
            return detected;
        }

        let lower = text.to_lowercase();

        let vehicle_types = detect_grouped(&lower, VEHICLE_TYPES);
        if !vehicle_types.is_empty() {
            detected.insert(EntityCategory::VehicleType, vehicle_types);
        }

        let manufacturers = detect_flat(&lower, MANUFACTURERS);
        if !manufacturers.is_empty() {
            detected.insert(EntityCategory::Manufacturer, manufacturers);
        }

        let models = detect_flat(&lower, MODELS);
        if !models.is_empty() {
            detected.insert(EntityCategory::Model, models);
        }

        let systems = detect_grouped(&lower, SYSTEMS);
        if !systems.is_empty() {
            detected.insert(EntityCategory::System, systems);
        }

        let diagnostics = detect_grouped(&lower, DIAGNOSTIC_TERMS);
        if !diagnostics.is_empty() {
            detected.insert(EntityCategory::DiagnosticTerm, diagnostics);
        }

        detected
    }

    /// Total detected values across all categories.
    pub fn mention_count(&self, text: &str) -> usize {
        self.analyze(text).values().map(BTreeSet::len).sum()
    }

    /// A text is domain-related when its detected-entity count meets the
    /// threshold (callers usually pass 1).
    pub fn is_domain_related(&self, text: &str, threshold: usize) -> bool {
        self.mention_count(text) >= threshold
    }

    /// Analyze a cleaned utterance sequence: per-utterance findings plus the
    /// corpus aggregate. Aggregation counts utterances containing a value,
    /// not total occurrences.
    pub fn analyze_batch(&self, utterances: &[Utterance]) -> EntityAnalysis {
        let mut per_utterance = Vec::with_capacity(utterances.len());
        let mut counts: BTreeMap<(EntityCategory, String), usize> = BTreeMap::new();

        for (index, utterance) in utterances.iter().enumerate() {
            let detected = self.analyze(&utterance.text);
            let total_mentions = detected.values().map(BTreeSet::len).sum();

            for (&category, values) in &detected {
                for value in values {
                    *counts.entry((category, value.clone())).or_insert(0) += 1;
                }
            }

            per_utterance.push(UtteranceFindings {
                index,
                speaker: utterance.speaker.clone(),
                interval: utterance.interval,
                detected,
                total_mentions,
            });
        }

        let mut summary: Vec<EntityMention> = counts
            .into_iter()
            .map(|((category, value), utterance_count)| EntityMention {
                category,
                value,
                utterance_count,
            })
            .collect();
        summary.sort_by(|a, b| {
            b.utterance_count
                .cmp(&a.utterance_count)
                .then_with(|| a.category.to_string().cmp(&b.category.to_string()))
                .then_with(|| a.value.cmp(&b.value))
        });

        let related_utterances = per_utterance
            .iter()
            .filter(|f| f.total_mentions > 0)
            .count();

        EntityAnalysis {
            related_utterances,
            total_utterances: utterances.len(),
            per_utterance,
            summary,
        }
    }
}

/// Detect canonical values whose trigger lists match the text.
fn detect_grouped(lower_text: &str, table: &[(&str, &[&str])]) -> BTreeSet<String> {
    table
        .iter()
        .filter(|(_, triggers)| triggers.iter().any(|t| matches_term(lower_text, t)))
        .map(|(value, _)| value.to_string())
        .collect()
}

/// Detect terms that are their own canonical value, with stem fallback.
fn detect_flat(lower_text: &str, table: &[&str]) -> BTreeSet<String> {
    table
        .iter()
        .filter(|term| matches_term(lower_text, term) || matches_stem(lower_text, term))
        .map(|term| term.to_string())
        .collect()
}

/// Whole-word substring match. Terms containing CJK characters use plain
/// substring containment since those scripts carry no word boundaries.
fn matches_term(lower_text: &str, term: &str) -> bool {
    if term.chars().any(is_cjk) {
        return lower_text.contains(term);
    }

    let mut from = 0;
    while let Some(pos) = lower_text[from..].find(term) {
        let start = from + pos;
        let end = start + term.len();
        let before_ok = lower_text[..start]
            .chars()
            .next_back()
            .is_none_or(|c| !c.is_alphanumeric());
        let after_ok = lower_text[end..]
            .chars()
            .next()
            .is_none_or(|c| !c.is_alphanumeric());
        if before_ok && after_ok {
            return true;
        }
        from = end;
    }
    false
}

/// Stem-prefix fallback for the curated term subset: matches when any word
/// starts with the configured prefix.
fn matches_stem(lower_text: &str, term: &str) -> bool {
    STEM_FALLBACKS
        .iter()
        .filter(|(value, prefix)| *value == term && prefix.chars().count() >= MIN_STEM_PREFIX)
        .any(|(_, prefix)| {
            lower_text
                .split(|c: char| !c.is_alphanumeric())
                .any(|word| word.starts_with(prefix))
        })
}

fn is_cjk(c: char) -> bool {
    matches!(c as u32, 0x3400..=0x9FFF | 0xF900..=0xFAFF | 0x20000..=0x2FA1F)
}
