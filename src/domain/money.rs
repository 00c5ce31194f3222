use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;

/// A transfer or bill amount as it arrives from the dialogue engine.
///
/// Slots are loosely typed: the same slot may hold a JSON number, a string
/// copied from the utterance ("6,000"), or nothing at all.
#[derive(Debug, Clone, PartialEq)]
pub enum AmountInput {
    Missing,
    Number(Decimal),
    Text(String),
}

impl AmountInput {
    /// Classifies a raw slot value.
    pub fn from_slot(value: Option<&Value>) -> Self {
        match value {
            None | Some(Value::Null) => Self::Missing,
            Some(Value::Number(n)) => n
                .as_i64()
                .map(Decimal::from)
                .or_else(|| n.as_u64().map(Decimal::from))
                .or_else(|| n.as_f64().and_then(|f| Decimal::try_from(f).ok()))
                .map(Self::Number)
                .unwrap_or_else(|| Self::Text(n.to_string())),
            Some(Value::String(s)) if s.trim().is_empty() => Self::Missing,
            Some(Value::String(s)) => Self::Text(s.clone()),
            Some(other) => Self::Text(other.to_string()),
        }
    }
}

/// Where a normalized amount came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountSource {
    Slot,
    Utterance,
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedAmount {
    pub value: Decimal,
    pub source: AmountSource,
}

impl NormalizedAmount {
    fn new(value: Decimal, source: AmountSource) -> Self {
        Self { value, source }
    }

    pub fn is_fallback(&self) -> bool {
        self.source == AmountSource::Fallback
    }
}

/// Resolves an amount without ever rejecting the turn.
///
/// Order of attempts:
/// 1. a non-zero numeric slot is used as is;
/// 2. an empty (or zero) slot is replaced by the first run of digits in the
///    utterance;
/// 3. text is parsed after removing thousands separators;
/// 4. anything unparsable becomes `fallback`.
///
/// Step 4 substitutes a monetary value the user never said. Callers log it.
pub fn normalize_amount(input: &AmountInput, utterance: &str, fallback: Decimal) -> NormalizedAmount {
    match input {
        AmountInput::Number(value) if !value.is_zero() => {
            NormalizedAmount::new(*value, AmountSource::Slot)
        }
        AmountInput::Text(raw) => match parse_amount_text(raw) {
            Some(value) => NormalizedAmount::new(value, AmountSource::Slot),
            None => NormalizedAmount::new(fallback, AmountSource::Fallback),
        },
        _ => match first_digit_run(utterance).and_then(parse_amount_text) {
            Some(value) => NormalizedAmount::new(value, AmountSource::Utterance),
            None => NormalizedAmount::new(fallback, AmountSource::Fallback),
        },
    }
}

/// Parses "6,000", " 1200.50 " and friends.
pub fn parse_amount_text(raw: &str) -> Option<Decimal> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return None;
    }
    Decimal::from_str(&cleaned).ok()
}

/// First contiguous run of ASCII digits, if any.
pub fn first_digit_run(text: &str) -> Option<&str> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let rest = &text[start..];
    let len = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    Some(&rest[..len])
}

/// Renders an amount for a spoken reply: at most two decimals, no trailing zeros.
pub fn display_amount(value: Decimal) -> String {
    value.round_dp(2).normalize().to_string()
}
