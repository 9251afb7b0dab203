//! Collection-name pluralization.
//!
//! Model names are given in the singular (`"post"`) and stored under their
//! plural (`"posts"`). The [`Pluralize`] trait is the seam; registries use
//! [`EnglishPluralizer`] unless told otherwise.

use std::{
    collections::{HashMap, HashSet},
    fmt::Debug,
};

/// Maps a singular noun to its plural form.
pub trait Pluralize: Send + Sync + Debug {
    fn plural(&self, word: &str) -> String;
}

const IRREGULAR: &[(&str, &str)] = &[
    ("person", "people"),
    ("man", "men"),
    ("woman", "women"),
    ("child", "children"),
    ("tooth", "teeth"),
    ("foot", "feet"),
    ("mouse", "mice"),
    ("goose", "geese"),
    ("ox", "oxen"),
    ("index", "indices"),
    ("matrix", "matrices"),
    ("vertex", "vertices"),
    ("criterion", "criteria"),
    ("datum", "data"),
    ("medium", "media"),
    ("analysis", "analyses"),
    ("thesis", "theses"),
    ("crisis", "crises"),
    ("cactus", "cacti"),
    ("quiz", "quizzes"),
    ("hero", "heroes"),
    ("potato", "potatoes"),
    ("tomato", "tomatoes"),
    ("echo", "echoes"),
    ("canvas", "canvases"),
    ("cafe", "cafes"),
    ("safe", "safes"),
    ("gulf", "gulfs"),
    ("chief", "chiefs"),
    ("roof", "roofs"),
];

const UNCOUNTABLE: &[&str] = &[
    "sheep",
    "fish",
    "deer",
    "moose",
    "series",
    "species",
    "money",
    "rice",
    "information",
    "equipment",
    "news",
    "data",
    "feedback",
    "metadata",
    "software",
    "traffic",
    "police",
];

/// English pluralization using suffix rules plus irregular and uncountable tables.
///
/// Matching is case-insensitive. The first letter's case is carried over
/// to irregular replacements, so `"Person"` becomes `"People"`.
#[derive(Debug, Clone)]
pub struct EnglishPluralizer {
    irregular: HashMap<String, String>,
    uncountable: HashSet<String>,
}

impl Default for EnglishPluralizer {
    fn default() -> Self {
        Self::new()
    }
}

impl EnglishPluralizer {
    pub fn new() -> Self {
        Self {
            irregular: IRREGULAR
                .iter()
                .map(|(singular, plural)| (singular.to_string(), plural.to_string()))
                .collect(),
            uncountable: UNCOUNTABLE
                .iter()
                .map(|word| word.to_string())
                .collect(),
        }
    }

    /// Adds or overrides an irregular form.
    pub fn with_irregular(mut self, singular: impl Into<String>, plural: impl Into<String>) -> Self {
        self.irregular.insert(
            singular.into().to_lowercase(),
            plural.into().to_lowercase(),
        );
        self
    }

    /// Marks a word as having no distinct plural.
    pub fn with_uncountable(mut self, word: impl Into<String>) -> Self {
        self.uncountable
            .insert(word.into().to_lowercase());
        self
    }

    fn apply_rules(word: &str, lower: &str) -> String {
        let stem = |n: usize| &word[..word.len() - n];

        if lower.ends_with("ss")
            || lower.ends_with("sh")
            || lower.ends_with("ch")
            || lower.ends_with('x')
            || lower.ends_with('z')
        {
            return format!("{word}es");
        }

        if lower.ends_with("us")
            || lower.ends_with("alias")
            || lower.ends_with("gas")
            || lower.ends_with("tlas")
            || lower.ends_with("tmas")
            || lower.ends_with("ris")
        {
            return format!("{word}es");
        }

        // Any other trailing s is taken as already plural.
        if lower.ends_with('s') {
            return word.to_string();
        }

        if lower.ends_with('y') && !ends_with_vowel_before(lower, 1) {
            return format!("{}ies", stem(1));
        }

        if lower.ends_with("fe") && !lower.ends_with("ffe") {
            return format!("{}ves", stem(2));
        }

        if lower.ends_with("lf")
            || lower.ends_with("rf")
            || lower.ends_with("eaf")
            || lower.ends_with("oaf")
        {
            return format!("{}ves", stem(1));
        }

        format!("{word}s")
    }
}

fn ends_with_vowel_before(lower: &str, suffix_len: usize) -> bool {
    lower
        .chars()
        .rev()
        .nth(suffix_len)
        .is_some_and(|c| matches!(c, 'a' | 'e' | 'i' | 'o' | 'u'))
}

fn match_case(template: &str, replacement: &str) -> String {
    let mut chars = template.chars();
    match chars.next() {
        Some(first) if first.is_uppercase() => {
            let mut out = String::with_capacity(replacement.len());
            let mut rest = replacement.chars();
            if let Some(head) = rest.next() {
                out.extend(head.to_uppercase());
            }
            out.extend(rest);
            out
        }
        _ => replacement.to_string(),
    }
}

impl Pluralize for EnglishPluralizer {
    fn plural(&self, word: &str) -> String {
        let word = word.trim();
        if word.is_empty() {
            return String::new();
        }

        let lower = word.to_lowercase();
        if self.uncountable.contains(&lower) {
            return word.to_string();
        }

        if let Some(plural) = self.irregular.get(&lower) {
            return match_case(word, plural);
        }

        if self
            .irregular
            .values()
            .any(|plural| *plural == lower)
        {
            return word.to_string();
        }

        if !word.is_ascii() {
            return format!("{word}s");
        }

        Self::apply_rules(word, &lower)
    }
}

/// Leaves names untouched. Useful when collection names are already plural.
#[derive(Debug, Clone, Copy, Default)]
pub struct Verbatim;

impl Pluralize for Verbatim {
    fn plural(&self, word: &str) -> String {
        word.trim().to_string()
    }
}
