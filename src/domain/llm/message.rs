use serde::{Deserialize, Serialize};

/// Role of a message in the conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

/// Content part for multimodal messages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { url: String },
    ImageBase64 { data: String, media_type: String },
}

impl ContentPart {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn image_url(url: impl Into<String>) -> Self {
        Self::ImageUrl { url: url.into() }
    }

    pub fn image_base64(data: impl Into<String>, media_type: impl Into<String>) -> Self {
        Self::ImageBase64 {
            data: data.into(),
            media_type: media_type.into(),
        }
    }
}

/// One turn in a conversation. Content is either plain text or an ordered
/// sequence of multimodal parts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    #[serde(flatten)]
    content: MessageContent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
enum MessageContent {
    Text { content: String },
    Parts { content: Vec<ContentPart> },
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self::text(MessageRole::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::text(MessageRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::text(MessageRole::Assistant, content)
    }

    pub fn text(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: MessageContent::Text {
                content: content.into(),
            },
        }
    }

    pub fn user_with_parts(parts: Vec<ContentPart>) -> Self {
        Self {
            role: MessageRole::User,
            content: MessageContent::Parts { content: parts },
        }
    }

    /// First text content of the message, if any.
    pub fn content_text(&self) -> Option<&str> {
        match &self.content {
            MessageContent::Text { content } => Some(content),
            MessageContent::Parts { content } => content.iter().find_map(|p| {
                if let ContentPart::Text { text } = p {
                    Some(text.as_str())
                } else {
                    None
                }
            }),
        }
    }

    /// Multimodal parts in order; empty for plain-text messages.
    pub fn content_parts(&self) -> &[ContentPart] {
        match &self.content {
            MessageContent::Text { .. } => &[],
            MessageContent::Parts { content } => content,
        }
    }

    pub fn is_multimodal(&self) -> bool {
        matches!(self.content, MessageContent::Parts { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_message() {
        let msg = ChatMessage::user("Explain photosynthesis");
        assert_eq!(msg.role, MessageRole::User);
        assert_eq!(msg.content_text(), Some("Explain photosynthesis"));
        assert!(!msg.is_multimodal());
        assert!(msg.content_parts().is_empty());
    }

    #[test]
    fn test_text_serialization_is_flat() {
        let msg = ChatMessage::assistant("Sure, let's start.");
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"role\":\"assistant\""));
        assert!(json.contains("\"content\":\"Sure, let's start.\""));
    }

    #[test]
    fn test_multimodal_parts_keep_order() {
        let msg = ChatMessage::user_with_parts(vec![
            ContentPart::text("Describe this paper"),
            ContentPart::image_base64("aGVsbG8=", "image/jpeg"),
        ]);

        assert!(msg.is_multimodal());
        assert_eq!(msg.content_parts().len(), 2);
        assert_eq!(msg.content_text(), Some("Describe this paper"));
        assert!(matches!(
            msg.content_parts()[1],
            ContentPart::ImageBase64 { .. }
        ));
    }
}
