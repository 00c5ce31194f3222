use crate::application::assistant::Intent;
use crate::domain::slots::{SlotOp, keys};
use crate::domain::turn::{AuthContext, Turn};
use crate::error::{AssistantError, Result};
use serde::Deserialize;
use std::io::Read;

/// One row of a conversation script: the already-classified intent plus the
/// slots the dialogue engine extracted from the utterance.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScriptedTurn {
    pub sender: String,
    pub intent: String,
    #[serde(default)]
    pub lang: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub account_id: Option<String>,
    #[serde(default)]
    pub from_account: Option<String>,
    #[serde(default)]
    pub to_account: Option<String>,
    #[serde(default)]
    pub amount: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
}

impl ScriptedTurn {
    pub fn intent(&self) -> Result<Intent> {
        self.intent.parse()
    }

    /// The sender doubles as the authenticated user, the way the voice
    /// gateway forwards it.
    pub fn to_turn(&self, default_locale: &str) -> Turn {
        let locale = self
            .lang
            .as_deref()
            .filter(|l| !l.is_empty())
            .unwrap_or(default_locale);
        Turn::new(self.sender.clone(), locale)
            .with_auth(AuthContext::for_user(self.sender.clone()))
            .with_utterance(self.text.clone().unwrap_or_default())
    }

    /// Slots the row fills in before the turn is handled.
    pub fn slot_ops(&self) -> Vec<SlotOp> {
        [
            (keys::ACCOUNT_ID, &self.account_id),
            (keys::FROM_ACCOUNT, &self.from_account),
            (keys::TO_ACCOUNT, &self.to_account),
            (keys::AMOUNT, &self.amount),
            (keys::CURRENCY, &self.currency),
        ]
        .into_iter()
        .filter_map(|(name, value)| {
            value
                .as_deref()
                .filter(|v| !v.is_empty())
                .map(|v| SlotOp::set(name, v))
        })
        .collect()
    }
}

/// Reads conversation scripts from CSV.
///
/// Whitespace around fields is trimmed and rows may omit trailing columns.
pub struct TurnReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> TurnReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Lazily yields rows; a malformed row is an error item, not the end.
    pub fn turns(self) -> impl Iterator<Item = Result<ScriptedTurn>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(AssistantError::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "sender,intent,lang,text,account_id,from_account,to_account,amount,currency";

    #[test]
    fn test_reader_valid_stream() {
        let data = format!(
            "{HEADER}\n\
             cust_1, make_transfer, en, send 6000 to riya, , acct_a, acct_b, 6000, INR\n\
             cust_1, verify_otp, en, 4 8 2 9 1 3\n"
        );
        let turns: Vec<Result<ScriptedTurn>> = TurnReader::new(data.as_bytes()).turns().collect();

        assert_eq!(turns.len(), 2);
        let first = turns[0].as_ref().unwrap();
        assert_eq!(first.intent().unwrap(), Intent::MakeTransfer);
        assert_eq!(first.account_id, None);
        assert_eq!(
            first.slot_ops(),
            vec![
                SlotOp::set(keys::FROM_ACCOUNT, "acct_a"),
                SlotOp::set(keys::TO_ACCOUNT, "acct_b"),
                SlotOp::set(keys::AMOUNT, "6000"),
                SlotOp::set(keys::CURRENCY, "INR"),
            ]
        );

        let second = turns[1].as_ref().unwrap();
        assert!(second.slot_ops().is_empty());
        let turn = second.to_turn("hi");
        assert_eq!(turn.locale, "en");
        assert_eq!(turn.subject_id(), Some("cust_1"));
        assert_eq!(turn.utterance, "4 8 2 9 1 3");
    }

    #[test]
    fn test_missing_lang_uses_default() {
        let data = format!("{HEADER}\ncust_1,greet\n");
        let turn = TurnReader::new(data.as_bytes())
            .turns()
            .next()
            .unwrap()
            .unwrap()
            .to_turn("hi");
        assert_eq!(turn.locale, "hi");
    }

    #[test]
    fn test_unknown_intent_is_reported() {
        let data = format!("{HEADER}\ncust_1,withdraw_cash,en\n");
        let row = TurnReader::new(data.as_bytes()).turns().next().unwrap().unwrap();
        assert!(row.intent().is_err());
    }
}
