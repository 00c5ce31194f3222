mod common;

use common::{Harness, RecordingSynthesizer, SUBJECT};
use rust_decimal_macros::dec;
use sahayak::application::actions::HISTORY_SUMMARY_LIMIT;
use sahayak::application::assistant::Intent;
use sahayak::config::AssistantConfig;
use sahayak::domain::slots::keys;
use sahayak::domain::turn::{OutgoingMessage, Turn};
use sahayak::infrastructure::speech::DisabledSynthesizer;
use serde_json::json;
use std::time::Duration;

#[tokio::test]
async fn test_balance_timeout_replies_in_requested_locale() {
    let mut config = AssistantConfig::default();
    config.backend.read_timeout_ms = 50;
    let h = Harness::build(config, Box::new(DisabledSynthesizer));
    h.bank.set_latency(Duration::from_millis(500));
    h.set(keys::ACCOUNT_ID, json!("acct_savings_1")).await;
    let before = h.store.snapshot().await;

    let reply = h.say(Intent::CheckBalance, "hi", "मेरा बैलेंस बताओ").await;

    assert_eq!(
        reply.texts(),
        vec!["क्षमा करें, मैं अभी आपका बैलेंस नहीं दिखा सकती। कृपया फिर से प्रयास करें।"]
    );
    assert!(reply.slots.is_empty());
    assert_eq!(h.store.snapshot().await, before);
}

#[tokio::test]
async fn test_balance_success() {
    let h = Harness::new();
    h.bank.set_balance("acct_savings_1", dec!(1520.75)).await;

    let reply = h.say(Intent::CheckBalance, "en", "").await;

    assert_eq!(
        reply.texts(),
        vec!["Your current balance in account acct_savings_1 is 1520.75 rupees."]
    );
    assert_eq!(reply.slot(keys::USER_ID), Some(&json!(SUBJECT)));
    assert_eq!(reply.slot(keys::ACCOUNT_ID), Some(&json!("acct_savings_1")));
}

#[tokio::test]
async fn test_unknown_locale_falls_back_to_english() {
    let h = Harness::new();
    h.bank.set_balance("acct_savings_1", dec!(10)).await;

    let reply = h.say(Intent::CheckBalance, "xx-unknown", "").await;

    assert_eq!(
        reply.texts(),
        vec!["Your current balance in account acct_savings_1 is 10 rupees."]
    );
}

#[tokio::test]
async fn test_speech_adds_audio_after_text() {
    let speech = RecordingSynthesizer::default();
    let h = Harness::with_speech(Box::new(speech.clone()));

    let reply = h.say(Intent::Greet, "ta", "").await;

    assert_eq!(reply.messages.len(), 2);
    assert!(matches!(reply.messages[0], OutgoingMessage::Text { .. }));
    assert_eq!(
        reply.messages[1],
        OutgoingMessage::audio("audio://1", "ta")
    );
    let calls = speech.calls.lock().await;
    assert_eq!(calls[0].0, reply.texts()[0]);
    assert_eq!(calls[0].1, "ta");
}

#[tokio::test]
async fn test_speech_failure_keeps_text_reply() {
    let h = Harness::new();

    let reply = h.say(Intent::Goodbye, "en", "").await;

    assert_eq!(reply.texts(), vec!["Thanks for banking with us. Goodbye!"]);
    assert_eq!(reply.audio_count(), 0);
}

#[tokio::test]
async fn test_error_reply_is_also_spoken() {
    let speech = RecordingSynthesizer::default();
    let h = Harness::with_speech(Box::new(speech.clone()));
    h.bank.set_offline(true);

    let reply = h.say(Intent::PayBill, "en", "").await;

    assert_eq!(reply.texts(), vec!["Sorry, I couldn't pay your bill right now."]);
    assert_eq!(reply.audio_count(), 1);
}

#[tokio::test]
async fn test_history_reads_at_most_three_items() {
    let h = Harness::new();
    h.set(keys::AMOUNT, json!(100)).await;
    for _ in 0..5 {
        h.say(Intent::MakeTransfer, "en", "").await;
    }

    let reply = h.say(Intent::GetTransactions, "en", "").await;

    let text = reply.texts()[0];
    assert!(text.starts_with("Here are your recent transactions:"));
    assert_eq!(text.matches("100 rupees to acct_friend_riya on").count(), HISTORY_SUMMARY_LIMIT);
}

#[tokio::test]
async fn test_empty_history() {
    let h = Harness::new();

    let reply = h.say(Intent::GetTransactions, "en", "").await;

    assert_eq!(
        reply.texts(),
        vec!["No recent transactions found for account acct_savings_1."]
    );
}

#[tokio::test]
async fn test_bill_payment_uses_default_amount() {
    let h = Harness::new();

    let reply = h.say(Intent::PayBill, "en", "pay my electricity bill").await;

    assert_eq!(
        reply.texts(),
        vec!["Your bill of 500 rupees has been paid from acct_savings_1. Transaction ID TXN000001."]
    );
    let ledger = h.bank.ledger().await;
    assert_eq!(ledger[0].to_account, "demo_electricity_board");
    assert_eq!(h.slot(keys::LAST_TX_ID).await, Some(json!("TXN000001")));
}

#[tokio::test]
async fn test_bill_payment_never_needs_otp() {
    let h = Harness::new();
    h.set(keys::AMOUNT, json!(9000)).await;

    let reply = h.say(Intent::PayBill, "en", "").await;

    assert!(reply.texts()[0].starts_with("Your bill of 9000 rupees has been paid"));
    assert!(h.outbox.deliveries().await.is_empty());
}

#[tokio::test]
async fn test_insufficient_funds_is_an_error_reply() {
    let h = Harness::new();
    h.set(keys::AMOUNT, json!(4000)).await;
    h.set(keys::FROM_ACCOUNT, json!("acct_friend_riya")).await;
    h.set(keys::TO_ACCOUNT, json!("acct_savings_1")).await;

    let reply = h.say(Intent::MakeTransfer, "en", "").await;

    assert_eq!(reply.texts(), vec!["Sorry, I couldn't complete the transfer right now."]);
    assert!(reply.slots.is_empty());
}

#[tokio::test]
async fn test_chat_intents_use_default_locale_when_missing() {
    let h = Harness::new();
    let turn = Turn::new("sess-1", "");

    let reply = h.assistant.handle(Intent::LoanInfo, &turn, &h.store).await;

    assert!(reply.texts()[0].contains("2,50,000"));
    assert!(!reply.texts()[0].starts_with("You are"));
}
