//! Frame parsing and validation
//!
//! Parses inbound text frames into the `ClientFrame` enum and validates chat
//! content against the configured bounds.

use serde_json::Value;

use crate::error::ProtocolError;
use crate::protocol::ClientFrame;

/// Parses a raw inbound frame into a `ClientFrame`.
///
/// Distinguishes the two rejection cases: a frame that is not a JSON object
/// with the expected fields is `InvalidPayload`, while a well-formed frame
/// with an unrecognized `type` is `UnknownType`. Both only ever cost the
/// sender an `error` frame.
pub fn parse_frame(raw: &str) -> Result<ClientFrame, ProtocolError> {
    let value: Value = serde_json::from_str(raw).map_err(|_| ProtocolError::InvalidPayload)?;

    let kind = value
        .get("type")
        .and_then(Value::as_str)
        .ok_or(ProtocolError::InvalidPayload)?;

    match kind {
        "setUsername" | "chatMessage" => {
            serde_json::from_value(value).map_err(|_| ProtocolError::InvalidPayload)
        }
        other => Err(ProtocolError::UnknownType(other.to_string())),
    }
}

/// Validates chat text: non-empty after trimming, bounded length.
///
/// Returns the trimmed content on success. The length bound is a policy
/// tunable, not a correctness requirement; over-length text is rejected
/// rather than truncated.
pub fn validate_content(content: &str, max_length: usize) -> Result<&str, ProtocolError> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(ProtocolError::EmptyContent);
    }
    if trimmed.chars().count() > max_length {
        return Err(ProtocolError::OversizedContent { limit: max_length });
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_frames() {
        let frame = parse_frame(r#"{"type":"setUsername","username":"Alice"}"#).unwrap();
        assert_eq!(
            frame,
            ClientFrame::SetUsername {
                username: "Alice".to_string()
            }
        );

        let frame = parse_frame(r#"{"type":"chatMessage","content":"hello"}"#).unwrap();
        assert_eq!(
            frame,
            ClientFrame::ChatMessage {
                content: "hello".to_string()
            }
        );
    }

    #[test]
    fn malformed_json_is_invalid_payload() {
        assert_eq!(parse_frame("not json"), Err(ProtocolError::InvalidPayload));
        assert_eq!(parse_frame(""), Err(ProtocolError::InvalidPayload));
    }

    #[test]
    fn missing_or_mistyped_fields_are_invalid_payload() {
        // No type field at all
        assert_eq!(
            parse_frame(r#"{"username":"Alice"}"#),
            Err(ProtocolError::InvalidPayload)
        );
        // Known type, missing payload field
        assert_eq!(
            parse_frame(r#"{"type":"setUsername"}"#),
            Err(ProtocolError::InvalidPayload)
        );
        // Known type, wrong payload type
        assert_eq!(
            parse_frame(r#"{"type":"chatMessage","content":42}"#),
            Err(ProtocolError::InvalidPayload)
        );
    }

    #[test]
    fn unrecognized_type_is_unknown_type() {
        assert_eq!(
            parse_frame(r#"{"type":"teleport","destination":"moon"}"#),
            Err(ProtocolError::UnknownType("teleport".to_string()))
        );
    }

    #[test]
    fn content_validation_trims_and_bounds() {
        assert_eq!(validate_content("  hello  ", 2000), Ok("hello"));
        assert_eq!(validate_content("  ", 2000), Err(ProtocolError::EmptyContent));
        assert_eq!(validate_content("", 2000), Err(ProtocolError::EmptyContent));
        assert_eq!(
            validate_content("abcdef", 5),
            Err(ProtocolError::OversizedContent { limit: 5 })
        );
        // Bound counts characters, not bytes
        assert_eq!(validate_content("héllo", 5), Ok("héllo"));
    }
}
