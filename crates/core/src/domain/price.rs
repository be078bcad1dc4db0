use serde::{Deserialize, Serialize};

/// Tag of a [`PriceIntent`], as exposed in the tool schema and search results.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceMode {
    None,
    Under,
    Above,
    Range,
    Exact,
    Closest,
}

impl PriceMode {
    pub const ALL: [PriceMode; 6] =
        [Self::None, Self::Under, Self::Above, Self::Range, Self::Exact, Self::Closest];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Under => "under",
            Self::Above => "above",
            Self::Range => "range",
            Self::Exact => "exact",
            Self::Closest => "closest",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "none" | "" => Some(Self::None),
            "under" => Some(Self::Under),
            "above" => Some(Self::Above),
            "range" => Some(Self::Range),
            "exact" => Some(Self::Exact),
            "closest" => Some(Self::Closest),
            _ => None,
        }
    }
}

/// A price constraint resolved from text. Exactly one mode is active and every
/// amount is a non-negative finite number; the constructors enforce this.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "price_mode", rename_all = "snake_case")]
pub enum PriceIntent {
    #[default]
    None,
    Range {
        #[serde(rename = "min_price")]
        min: f64,
        #[serde(rename = "max_price")]
        max: f64,
    },
    Exact {
        #[serde(rename = "exact_price")]
        value: f64,
    },
    Above {
        #[serde(rename = "min_price")]
        min: f64,
        min_inclusive: bool,
    },
    Under {
        #[serde(rename = "max_price")]
        max: f64,
        max_inclusive: bool,
    },
    Closest {
        #[serde(rename = "target_price")]
        target: f64,
    },
}

impl PriceIntent {
    /// Builds a range from two bounds in any order.
    pub fn range(first: f64, second: f64) -> Option<Self> {
        let first = valid_amount(first)?;
        let second = valid_amount(second)?;
        Some(Self::Range { min: first.min(second), max: first.max(second) })
    }

    pub fn exact(value: f64) -> Option<Self> {
        valid_amount(value).map(|value| Self::Exact { value })
    }

    pub fn above(min: f64, min_inclusive: bool) -> Option<Self> {
        valid_amount(min).map(|min| Self::Above { min, min_inclusive })
    }

    pub fn under(max: f64, max_inclusive: bool) -> Option<Self> {
        valid_amount(max).map(|max| Self::Under { max, max_inclusive })
    }

    pub fn closest(target: f64) -> Option<Self> {
        valid_amount(target).map(|target| Self::Closest { target })
    }

    pub fn mode(&self) -> PriceMode {
        match self {
            Self::None => PriceMode::None,
            Self::Range { .. } => PriceMode::Range,
            Self::Exact { .. } => PriceMode::Exact,
            Self::Above { .. } => PriceMode::Above,
            Self::Under { .. } => PriceMode::Under,
            Self::Closest { .. } => PriceMode::Closest,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Best-effort reading of loose price fields, as a model would propose them.
    ///
    /// An explicit mode picks the fields it needs. Without a mode the fields
    /// present decide: both bounds make a range, then exact, then a single
    /// bound, then a target. Anything incomplete or invalid reads as `None`.
    pub fn from_fields(fields: &PriceFields) -> Self {
        let mode = fields.mode.unwrap_or_else(|| infer_mode(fields));
        let resolved = match mode {
            PriceMode::None => None,
            PriceMode::Range => fields.min.zip(fields.max).and_then(|(a, b)| Self::range(a, b)),
            PriceMode::Exact => fields.exact.and_then(Self::exact),
            PriceMode::Above => {
                fields.min.and_then(|min| Self::above(min, fields.min_inclusive.unwrap_or(false)))
            }
            PriceMode::Under => {
                fields.max.and_then(|max| Self::under(max, fields.max_inclusive.unwrap_or(false)))
            }
            PriceMode::Closest => fields.target.and_then(Self::closest),
        };
        resolved.unwrap_or(Self::None)
    }
}

/// Loose, individually optional price fields.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PriceFields {
    pub mode: Option<PriceMode>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub exact: Option<f64>,
    pub target: Option<f64>,
    pub min_inclusive: Option<bool>,
    pub max_inclusive: Option<bool>,
}

impl PriceFields {
    pub fn is_empty(&self) -> bool {
        self.mode.is_none()
            && self.min.is_none()
            && self.max.is_none()
            && self.exact.is_none()
            && self.target.is_none()
    }
}

fn infer_mode(fields: &PriceFields) -> PriceMode {
    match (fields.min, fields.max, fields.exact, fields.target) {
        (Some(_), Some(_), _, _) => PriceMode::Range,
        (_, _, Some(_), _) => PriceMode::Exact,
        (Some(_), None, None, _) => PriceMode::Above,
        (None, Some(_), None, _) => PriceMode::Under,
        (None, None, None, Some(_)) => PriceMode::Closest,
        (None, None, None, None) => PriceMode::None,
    }
}

fn valid_amount(value: f64) -> Option<f64> {
    (value.is_finite() && value >= 0.0).then_some(value)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{PriceFields, PriceIntent, PriceMode};

    #[test]
    fn range_swaps_reversed_bounds() {
        let intent = PriceIntent::range(40.0, 10.0).expect("valid range");
        assert_eq!(intent, PriceIntent::Range { min: 10.0, max: 40.0 });
        assert_eq!(intent.mode(), PriceMode::Range);
    }

    #[test]
    fn constructors_reject_negative_and_non_finite_amounts() {
        assert!(PriceIntent::exact(-1.0).is_none());
        assert!(PriceIntent::under(f64::INFINITY, false).is_none());
        assert!(PriceIntent::closest(f64::NAN).is_none());
        assert!(PriceIntent::range(5.0, -5.0).is_none());
        assert!(PriceIntent::above(0.0, true).is_some());
    }

    #[test]
    fn serializes_flat_with_price_mode_tag() {
        let value = serde_json::to_value(PriceIntent::Under { max: 15.0, max_inclusive: false })
            .expect("serialize");
        assert_eq!(
            value,
            json!({"price_mode": "under", "max_price": 15.0, "max_inclusive": false})
        );

        let none = serde_json::to_value(PriceIntent::None).expect("serialize");
        assert_eq!(none, json!({"price_mode": "none"}));
    }

    #[test]
    fn from_fields_prefers_explicit_mode() {
        let fields = PriceFields {
            mode: Some(PriceMode::Under),
            min: Some(5.0),
            max: Some(30.0),
            max_inclusive: Some(true),
            ..PriceFields::default()
        };
        assert_eq!(
            PriceIntent::from_fields(&fields),
            PriceIntent::Under { max: 30.0, max_inclusive: true }
        );
    }

    #[test]
    fn from_fields_infers_mode_from_present_fields() {
        let range = PriceFields { min: Some(30.0), max: Some(10.0), ..PriceFields::default() };
        assert_eq!(PriceIntent::from_fields(&range), PriceIntent::Range { min: 10.0, max: 30.0 });

        let target = PriceFields { target: Some(20.0), ..PriceFields::default() };
        assert_eq!(PriceIntent::from_fields(&target), PriceIntent::Closest { target: 20.0 });

        assert_eq!(PriceIntent::from_fields(&PriceFields::default()), PriceIntent::None);
    }

    #[test]
    fn from_fields_with_incomplete_mode_is_none() {
        let fields = PriceFields { mode: Some(PriceMode::Exact), ..PriceFields::default() };
        assert_eq!(PriceIntent::from_fields(&fields), PriceIntent::None);
    }
}
