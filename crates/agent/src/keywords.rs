use std::collections::HashSet;
use std::sync::OnceLock;

const STRIPPED_SYMBOLS: [char; 7] = ['$', '€', '£', '¥', '<', '>', '='];

const STOPWORDS: &[&str] = &[
    // determiners and quantifiers
    "a", "an", "the", "this", "that", "these", "those", "some", "any", "all", "every", "each",
    "another", "other", "few", "several", "one", "ones",
    // pronouns
    "i", "me", "my", "mine", "we", "us", "our", "you", "your", "yours", "he", "him", "his", "she",
    "her", "it", "its", "they", "them", "their", "something", "anything", "everything",
    "someone", "what", "which", "who", "whats",
    // connectives and prepositions
    "and", "or", "but", "nor", "so", "if", "then", "than", "as", "of", "to", "in", "on", "at",
    "by", "for", "from", "with", "without", "into", "about", "like", "up", "out", "also",
    "just", "really", "very", "too", "there", "here", "not", "no", "yes", "maybe", "ideally",
    // filler verbs
    "is", "are", "was", "were", "be", "been", "am", "do", "does", "did", "can", "could", "would",
    "should", "will", "shall", "may", "might", "must", "have", "has", "had", "get", "got",
    "want", "wants", "wanted", "need", "needs", "looking", "look", "find", "show",
    "give", "tell", "recommend", "recommends", "recommendation", "recommendations", "suggest",
    "suggestion", "suggestions", "please", "thanks", "thank", "hi", "hello", "hey", "buy",
    "play", "know", "let", "lets", "good", "great", "nice", "best", "top",
    // price vocabulary
    "price", "prices", "priced", "pricing", "cost", "costs", "costing", "budget", "cheap",
    "cheaper", "cheapest", "expensive", "affordable", "under", "below", "over", "above",
    "less", "more", "least", "most", "between", "around", "near", "close", "almost", "exactly",
    "bucks", "buck", "dollar", "dollars", "usd", "eur", "euro", "euros", "gbp", "pound",
    "pounds", "money", "spend", "max", "maximum", "min", "minimum",
    // generic catalog nouns
    "game", "games", "title", "titles", "video", "videogame", "videogames", "store",
];

fn stopwords() -> &'static HashSet<&'static str> {
    static SET: OnceLock<HashSet<&'static str>> = OnceLock::new();
    SET.get_or_init(|| STOPWORDS.iter().copied().collect())
}

/// Reduces free text to a search-safe keyword string. The empty string means
/// "match everything" to the catalog.
#[derive(Clone, Copy, Debug, Default)]
pub struct KeywordReducer;

impl KeywordReducer {
    pub fn new() -> Self {
        Self
    }

    pub fn reduce(&self, text: &str) -> String {
        let lowered = text
            .to_lowercase()
            .chars()
            .map(|ch| if STRIPPED_SYMBOLS.contains(&ch) { ' ' } else { ch })
            .collect::<String>();

        let without_numbers = lowered
            .split_whitespace()
            .filter(|token| !is_numeric_token(token))
            .map(strip_punctuation)
            .collect::<Vec<_>>()
            .join(" ");

        without_numbers
            .split_whitespace()
            .filter(|token| !is_numeric_token(token))
            .filter(|token| token.chars().count() > 1)
            .filter(|token| !stopwords().contains(token))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn is_numeric_token(token: &str) -> bool {
    token.chars().any(|ch| ch.is_ascii_digit())
        && token.chars().all(|ch| ch.is_ascii_digit() || matches!(ch, '.' | '-' | ','))
}

/// Keeps alphanumerics and hyphens that sit between two alphanumerics.
fn strip_punctuation(token: &str) -> String {
    let chars = token.chars().collect::<Vec<_>>();
    chars
        .iter()
        .enumerate()
        .map(|(index, ch)| {
            if ch.is_alphanumeric() {
                return *ch;
            }
            let internal_hyphen = *ch == '-'
                && index > 0
                && chars[index - 1].is_alphanumeric()
                && chars.get(index + 1).is_some_and(|next| next.is_alphanumeric());
            if internal_hyphen {
                '-'
            } else {
                ' '
            }
        })
        .collect()
}
