use serde::Serialize;

use gamescout_core::config::GuardConfig;
use gamescout_core::domain::{PriceIntent, ProposedArguments, ToolArguments, DEFAULT_RESULT_LIMIT};

use crate::intent::PriceIntentParser;
use crate::keywords::KeywordReducer;


/// Audit record of what the guardrail did with the model's price fields.
/// It never changes the reconciled arguments.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum GuardrailDecision {
    Accepted,
    Discarded { reason_code: &'static str },
    Overridden { reason_code: &'static str },
}

impl GuardrailDecision {
    pub fn reason_code(&self) -> Option<&'static str> {
        match self {
            Self::Accepted => None,
            Self::Discarded { reason_code } | Self::Overridden { reason_code } => Some(reason_code),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Reconciliation {
    pub arguments: ToolArguments,
    pub decision: GuardrailDecision,
    pub proposed_price: PriceIntent,
}

/// Merges model-proposed search arguments with what the user actually said.
/// Price constraints come only from the user's message.
#[derive(Clone, Debug)]
pub struct GuardrailPolicy {
    pub default_limit: u32,
    /// Optional cap on the result count. `None` keeps the proposed limit.
    pub max_limit: Option<u32>,
    parser: PriceIntentParser,
    reducer: KeywordReducer,
}

impl Default for GuardrailPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_RESULT_LIMIT, None)
    }
}

impl GuardrailPolicy {
    pub fn new(default_limit: u32, max_limit: Option<u32>) -> Self {
        let default_limit = default_limit.max(1);
        Self {
            default_limit,
            max_limit: max_limit.map(|cap| cap.max(default_limit)),
            parser: PriceIntentParser::new(),
            reducer: KeywordReducer::new(),
        }
    }

    pub fn from_config(config: &GuardConfig) -> Self {
        Self::new(config.default_limit, config.max_limit)
    }

    pub fn parser(&self) -> &PriceIntentParser {
        &self.parser
    }

    pub fn reducer(&self) -> &KeywordReducer {
        &self.reducer
    }

    pub fn reconcile(&self, user_text: &str, proposal: &ProposedArguments) -> Reconciliation {
        let user_price = self.parser.parse(user_text);
        let proposed_price = proposal.proposed_price();

        let decision = match (user_price.is_none(), proposed_price == user_price) {
            (_, true) => GuardrailDecision::Accepted,
            (true, false) => {
                GuardrailDecision::Discarded { reason_code: "price_not_stated_by_user" }
            }
            (false, false) => {
                GuardrailDecision::Overridden { reason_code: "price_overridden_by_user_text" }
            }
        };

        let query = match proposal.query.as_deref().map(str::trim) {
            Some(model_query) if !model_query.is_empty() => self.reducer.reduce(model_query),
            _ => self.reducer.reduce(user_text),
        };
        let limit = proposal.limit.unwrap_or(self.default_limit).max(1);
        let limit = self.max_limit.map_or(limit, |cap| limit.min(cap));

        Reconciliation {
            arguments: ToolArguments::new(query, limit, user_price),
            decision,
            proposed_price,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use gamescout_core::domain::{PriceIntent, ProposedArguments};

    use super::{GuardrailDecision, GuardrailPolicy};

    fn proposal(value: serde_json::Value) -> ProposedArguments {
        ProposedArguments::from_object(value.as_object().expect("object"))
    }

    #[test]
    fn invented_model_price_is_discarded() {
        let policy = GuardrailPolicy::default();
        let result = policy.reconcile(
            "suggest a relaxing farming sim",
            &proposal(json!({"query": "farming sim", "price_mode": "under", "max_price": 20})),
        );

        assert_eq!(result.arguments.price, PriceIntent::None);
        assert_eq!(
            result.decision,
            GuardrailDecision::Discarded { reason_code: "price_not_stated_by_user" }
        );
        assert_eq!(result.proposed_price.mode().as_str(), "under");
    }

    #[test]
    fn user_price_overrides_a_disagreeing_model() {
        let policy = GuardrailPolicy::default();
        let result = policy.reconcile(
            "recommend a co-op game under $15",
            &proposal(json!({"query": "co-op", "price_mode": "under", "max_price": 20})),
        );

        assert_eq!(result.arguments.price, PriceIntent::Under { max: 15.0, max_inclusive: false });
        assert_eq!(result.decision.reason_code(), Some("price_overridden_by_user_text"));
    }

    #[test]
    fn agreeing_or_absent_prices_are_accepted() {
        let policy = GuardrailPolicy::default();
        let agreeing = policy.reconcile(
            "around 20 bucks",
            &proposal(json!({"price_mode": "closest", "target_price": "20"})),
        );
        assert_eq!(agreeing.decision, GuardrailDecision::Accepted);

        let silent = policy.reconcile("cozy puzzle", &proposal(json!({"query": "cozy puzzle"})));
        assert_eq!(silent.decision, GuardrailDecision::Accepted);
        assert_eq!(silent.arguments.price, PriceIntent::None);
    }

    #[test]
    fn user_price_applies_even_when_model_sent_none() {
        let policy = GuardrailPolicy::default();
        let result =
            policy.reconcile("any game around 20 bucks", &proposal(json!({"query": "games"})));

        assert_eq!(result.arguments.price, PriceIntent::Closest { target: 20.0 });
        assert!(matches!(result.decision, GuardrailDecision::Overridden { .. }));
    }

    #[test]
    fn query_falls_back_to_reduced_user_text() {
        let policy = GuardrailPolicy::default();
        let blank = policy
            .reconcile("recommend a co-op game under $15", &proposal(json!({"query": "   "})));
        assert_eq!(blank.arguments.query, "co-op");

        let reduced = policy
            .reconcile("whatever", &proposal(json!({"query": "Best RPG games under $30!"})));
        assert_eq!(reduced.arguments.query, "rpg");
    }

    #[test]
    fn proposed_limit_is_kept_and_missing_limit_defaults() {
        let policy = GuardrailPolicy::default();
        assert_eq!(policy.reconcile("rpg", &proposal(json!({}))).arguments.limit, 5);
        assert_eq!(policy.reconcile("rpg", &proposal(json!({"limit": 0}))).arguments.limit, 5);
        assert_eq!(policy.reconcile("rpg", &proposal(json!({"limit": 7}))).arguments.limit, 7);
        assert_eq!(policy.reconcile("rpg", &proposal(json!({"limit": 400}))).arguments.limit, 400);
        let rpgs =
            policy.reconcile("show me 40 rpgs", &proposal(json!({"query": "rpg", "limit": 40})));
        assert_eq!(rpgs.arguments.limit, 40);
    }

    #[test]
    fn configured_cap_bounds_the_limit() {
        let policy = GuardrailPolicy::new(5, Some(25));
        assert_eq!(policy.reconcile("rpg", &proposal(json!({"limit": 400}))).arguments.limit, 25);
        assert_eq!(policy.reconcile("rpg", &proposal(json!({"limit": 7}))).arguments.limit, 7);
        assert_eq!(policy.reconcile("rpg", &proposal(json!({}))).arguments.limit, 5);
    }
}
