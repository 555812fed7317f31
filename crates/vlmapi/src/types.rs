#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

impl ChatRole {
    pub fn as_wire_str(self) -> &'static str {
        match self {
            ChatRole::System => "system",
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }
}

#[derive(Clone, Debug)]
pub enum ChatPart {
    Text(String),
    Image { data_b64: String, mime_type: String },
}

impl ChatPart {
    pub fn text(text: impl Into<String>) -> Self {
        ChatPart::Text(text.into())
    }

    pub fn image_b64(data_b64: impl Into<String>, mime_type: impl Into<String>) -> Self {
        ChatPart::Image {
            data_b64: data_b64.into(),
            mime_type: mime_type.into(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: Vec<ChatPart>,
}

impl ChatMessage {
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: vec![ChatPart::text(text)],
        }
    }

    pub fn user(content: Vec<ChatPart>) -> Self {
        Self {
            role: ChatRole::User,
            content,
        }
    }
}

#[derive(Clone)]
pub struct VlmClient {
    pub(crate) endpoint: String,
    pub(crate) model: String,
}

impl VlmClient {
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            model: model.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}
