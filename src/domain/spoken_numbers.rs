//! Spoken Hindi numerals to digits.
//!
//! Speech recognition hands back "पांच हजार" rather than "5000". Amount and
//! one-time-code extraction only look for ASCII digits, so utterances pass
//! through [`words_to_digits`] first.

const UNITS: &[(&str, u64)] = &[
    ("एक", 1),
    ("दो", 2),
    ("तीन", 3),
    ("चार", 4),
    ("पांच", 5),
    ("पाँच", 5),
    ("छह", 6),
    ("छः", 6),
    ("छ", 6),
    ("सात", 7),
    ("आठ", 8),
    ("नौ", 9),
    ("दस", 10),
    ("ग्यारह", 11),
    ("बारह", 12),
    ("तेरह", 13),
    ("चौदह", 14),
    ("पंद्रह", 15),
    ("सोलह", 16),
    ("सत्रह", 17),
    ("अठारह", 18),
    ("उन्नीस", 19),
    ("बीस", 20),
    ("तीस", 30),
    ("चालीस", 40),
    ("पचास", 50),
    ("साठ", 60),
    ("सत्तर", 70),
    ("अस्सी", 80),
    ("नब्बे", 90),
];

const MULTIPLIERS: &[(&str, u64)] = &[
    ("सौ", 100),
    ("हज़ार", 1_000),
    ("हजार", 1_000),
    ("लाख", 100_000),
];

fn lookup(table: &[(&str, u64)], word: &str) -> Option<u64> {
    table.iter().find(|(w, _)| *w == word).map(|(_, v)| *v)
}

fn devanagari_digit(c: char) -> Option<u32> {
    match c {
        '०'..='९' => Some(c as u32 - '०' as u32),
        _ => None,
    }
}

/// A token made only of digits, spelled in ASCII with its leading zeros.
fn digit_run(token: &str) -> Option<String> {
    token
        .chars()
        .map(|c| {
            c.is_ascii_digit()
                .then_some(c)
                .or_else(|| devanagari_digit(c).and_then(|d| char::from_digit(d, 10)))
        })
        .collect()
}

/// Value of a token that is a number word or a run of (ASCII or Devanagari) digits.
fn token_value(token: &str) -> Option<u64> {
    if let Some(v) = lookup(UNITS, token) {
        return Some(v);
    }
    if token.is_empty() {
        return None;
    }
    token.chars().try_fold(0u64, |acc, c| {
        let digit = c.to_digit(10).or_else(|| devanagari_digit(c))?;
        acc.checked_mul(10)?.checked_add(u64::from(digit))
    })
}

/// Rewrites number words and Devanagari digits as ASCII digits.
///
/// A number followed by a multiplier is collapsed into one value
/// ("दो हजार" → "2000"). A multiplier on its own is left untouched. Digit
/// runs keep their leading zeros.
/// Whitespace between tokens is normalized to single spaces.
pub fn words_to_digits(text: &str) -> String {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    let mut out: Vec<String> = Vec::with_capacity(tokens.len());
    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i];
        match token_value(token) {
            Some(base) => {
                let multiplier = tokens.get(i + 1).and_then(|next| lookup(MULTIPLIERS, next));
                match multiplier.and_then(|m| base.checked_mul(m)) {
                    Some(value) => {
                        out.push(value.to_string());
                        i += 2;
                    }
                    None => {
                        out.push(digit_run(token).unwrap_or_else(|| base.to_string()));
                        i += 1;
                    }
                }
            }
            None => {
                out.push(token.to_string());
                i += 1;
            }
        }
    }
    out.join(" ")
}
