//! JSON serialization for WebSocket messages.

use super::types::OutboundMessage;

/// Serialize an outbound message to its wire text.
pub fn serialize_outbound(msg: &OutboundMessage) -> Result<String, serde_json::Error> {
    serde_json::to_string(msg)
}

/// Parse wire text back into an outbound message.
pub fn deserialize_outbound(text: &str) -> Result<OutboundMessage, serde_json::Error> {
    serde_json::from_str(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use murmur_core::types::SubjectId;

    #[test]
    fn test_wire_shape() {
        let sender = SubjectId::new();
        let msg = OutboundMessage::broadcast(sender, serde_json::json!({"text": "hi"}));
        let text = serialize_outbound(&msg).unwrap();

        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["type"], "broadcast");
        assert_eq!(value["sender"], sender.to_string());
        assert_eq!(value["payload"]["text"], "hi");
        assert!(value["sent_at"].is_string());

        assert_eq!(deserialize_outbound(&text).unwrap(), msg);
    }
}
