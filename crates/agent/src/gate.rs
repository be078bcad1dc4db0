use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use gamescout_core::config::GuardConfig;

pub const DEFAULT_GATE_KEYWORDS: &[&str] = &[
    "game", "games", "gaming", "title", "titles", "recommend", "recommendation",
    "recommendations", "suggest", "suggestion", "buy", "purchase", "price", "prices", "priced",
    "cost", "costs", "cheap", "cheaper", "cheapest", "budget", "expensive", "affordable",
    "under", "below", "over", "above", "between", "around", "bucks", "dollars", "deal", "deals",
    "sale", "discount", "co-op", "coop", "multiplayer", "singleplayer", "rpg", "fps", "shooter",
    "puzzle", "platformer", "strategy", "racing", "roguelike", "indie", "catalog", "store",
    "available", "stock",
];

const CURRENCY_SYMBOLS: [char; 4] = ['$', '€', '£', '¥'];

fn comparison_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"[<>]=?\s*[$€£]?\s*\d").expect("comparison regex must compile")
    })
}

/// Why the mandatory-tool heuristic fired.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "trigger", content = "detail", rename_all = "snake_case")]
pub enum GateTrigger {
    Keyword(String),
    CurrencySymbol,
    Comparison,
}

/// Loose vocabulary gate deciding whether a catalog search is mandatory.
/// It fires on more text than the price parser recognizes.
#[derive(Clone, Debug)]
pub struct ToolGate {
    keywords: HashSet<String>,
}

impl Default for ToolGate {
    fn default() -> Self {
        Self::with_keywords(DEFAULT_GATE_KEYWORDS.iter().copied())
    }
}

impl ToolGate {
    pub fn with_keywords<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keywords = keywords
            .into_iter()
            .map(|keyword| keyword.as_ref().trim().to_lowercase())
            .filter(|keyword| !keyword.is_empty())
            .collect();
        Self { keywords }
    }

    pub fn from_config(config: &GuardConfig) -> Self {
        match &config.gate_keywords {
            Some(keywords) => Self::with_keywords(keywords),
            None => Self::default(),
        }
    }

    pub fn evaluate(&self, text: &str) -> Option<GateTrigger> {
        let lowered = text.to_lowercase();
        let keyword = lowered
            .split(|ch: char| !(ch.is_alphanumeric() || ch == '-'))
            .map(|token| token.trim_matches('-'))
            .find(|token| !token.is_empty() && self.keywords.contains(*token));
        if let Some(keyword) = keyword {
            return Some(GateTrigger::Keyword(keyword.to_string()));
        }

        if lowered.contains(CURRENCY_SYMBOLS) {
            return Some(GateTrigger::CurrencySymbol);
        }

        comparison_re().is_match(&lowered).then_some(GateTrigger::Comparison)
    }

    pub fn requires_tool(&self, text: &str) -> bool {
        self.evaluate(text).is_some()
    }
}
