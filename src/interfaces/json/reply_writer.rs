use crate::domain::slots::SlotOp;
use crate::domain::turn::{OutgoingMessage, TurnReply};
use crate::error::Result;
use serde::Serialize;
use std::io::Write;

/// A turn's reply tagged with who asked and what for.
#[derive(Debug, Serialize)]
pub struct ReplyRecord<'a> {
    pub sender: &'a str,
    pub intent: &'a str,
    pub messages: &'a [OutgoingMessage],
    pub slots: &'a [SlotOp],
}

impl<'a> ReplyRecord<'a> {
    pub fn new(sender: &'a str, intent: &'a str, reply: &'a TurnReply) -> Self {
        Self {
            sender,
            intent,
            messages: &reply.messages,
            slots: &reply.slots,
        }
    }
}

/// Writes one JSON object per line.
pub struct ReplyWriter<W: Write> {
    writer: W,
}

impl<W: Write> ReplyWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn write_reply(&mut self, record: &ReplyRecord<'_>) -> Result<()> {
        serde_json::to_writer(&mut self.writer, record)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    #[test]
    fn test_writes_one_line_per_reply() {
        let reply = TurnReply {
            messages: vec![
                OutgoingMessage::text("OTP verified."),
                OutgoingMessage::audio("tts_responses/reply_000001_en.mp3", "en"),
            ],
            slots: vec![SlotOp::set("otp_verified", true), SlotOp::clear("pending_transfer_amount")],
        };

        let mut buf = Vec::new();
        {
            let mut writer = ReplyWriter::new(&mut buf);
            writer.write_reply(&ReplyRecord::new("cust_1", "verify_otp", &reply)).unwrap();
            writer.write_reply(&ReplyRecord::new("cust_1", "greet", &TurnReply::default())).unwrap();
        }

        let output = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["messages"][0], json!({"kind": "text", "body": "OTP verified."}));
        assert_eq!(first["messages"][1]["kind"], json!("audio"));
        assert_eq!(first["slots"][1], json!({"name": "pending_transfer_amount", "value": null}));
    }
}
