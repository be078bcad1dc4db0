use std::sync::OnceLock;

use regex::{Captures, Regex};

use gamescout_core::domain::PriceIntent;

type Matcher = fn(&str) -> Option<PriceIntent>;

/// Tried in order; the first matcher that yields a valid intent wins.
const MATCHERS: [(&str, Matcher); 5] = [
    ("range", match_range),
    ("exact", match_exact),
    ("above", match_above),
    ("under", match_under),
    ("closest", match_closest),
];

/// Rule-based extraction of a price constraint from free text.
#[derive(Clone, Copy, Debug, Default)]
pub struct PriceIntentParser;

impl PriceIntentParser {
    pub fn new() -> Self {
        Self
    }

    /// Total: text without a recognizable price phrase yields `PriceIntent::None`.
    pub fn parse(&self, text: &str) -> PriceIntent {
        MATCHERS.iter().find_map(|(_, matcher)| matcher(text)).unwrap_or_default()
    }

    /// Name of the rule that fired, for diagnostics.
    pub fn matched_rule(&self, text: &str) -> Option<&'static str> {
        MATCHERS.iter().find(|(_, matcher)| matcher(text).is_some()).map(|(name, _)| *name)
    }
}

fn between_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)\bbetween\s+[$€£]?\s*(\d+(?:\.\d+)?)\s+(?:and|to)\s+[$€£]?\s*(\d+(?:\.\d+)?)\b",
        )
        .expect("between regex must compile")
    })
}

fn dash_range_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?:^|[^\w.\-])[$€£]?(\d+(?:\.\d+)?)\s*-\s*[$€£]?(\d+(?:\.\d+)?)\b")
            .expect("dash range regex must compile")
    })
}

fn exact_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(?:costs?|priced\s+at|exactly|for)\s+[$€£]?\s*(\d+(?:\.\d+)?)\b")
            .expect("exact regex must compile")
    })
}

fn above_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)(?:\b(?P<word>more\s+than|over|at\s+least)\s+|(?P<op>>=?)\s*)[$€£]?\s*(?P<amount>\d+(?:\.\d+)?)\b",
        )
        .expect("above regex must compile")
    })
}

fn under_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)(?:\b(?P<word>under|below|less\s+than)\s+|(?P<op><=?)\s*)[$€£]?\s*(?P<amount>\d+(?:\.\d+)?)\b",
        )
        .expect("under regex must compile")
    })
}

fn closest_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)\b(?:around|about|near|close\s+to|almost)\s+[$€£]?\s*(\d+(?:\.\d+)?)\b",
        )
        .expect("closest regex must compile")
    })
}

fn amount(captures: &Captures<'_>, index: usize) -> Option<f64> {
    captures.get(index)?.as_str().parse::<f64>().ok()
}

fn named_amount(captures: &Captures<'_>) -> Option<f64> {
    captures.name("amount")?.as_str().parse::<f64>().ok()
}

fn match_range(text: &str) -> Option<PriceIntent> {
    [between_re(), dash_range_re()].into_iter().find_map(|pattern| {
        let captures = pattern.captures(text)?;
        PriceIntent::range(amount(&captures, 1)?, amount(&captures, 2)?)
    })
}

fn match_exact(text: &str) -> Option<PriceIntent> {
    let captures = exact_re().captures(text)?;
    PriceIntent::exact(amount(&captures, 1)?)
}

fn match_above(text: &str) -> Option<PriceIntent> {
    let captures = above_re().captures(text)?;
    let inclusive = match (captures.name("word"), captures.name("op")) {
        (Some(word), _) => word.as_str().to_ascii_lowercase().starts_with("at"),
        (None, Some(op)) => op.as_str() == ">=",
        (None, None) => false,
    };
    PriceIntent::above(named_amount(&captures)?, inclusive)
}

fn match_under(text: &str) -> Option<PriceIntent> {
    let captures = under_re().captures(text)?;
    let inclusive = captures.name("op").map(|op| op.as_str() == "<=").unwrap_or(false);
    PriceIntent::under(named_amount(&captures)?, inclusive)
}

fn match_closest(text: &str) -> Option<PriceIntent> {
    let captures = closest_re().captures(text)?;
    PriceIntent::closest(amount(&captures, 1)?)
}
