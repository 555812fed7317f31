use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use serde_json::{json, Value};

use crate::models::{ChatCompletionResponse, ChoiceContent, ModelListResponse};
use crate::types::{ChatMessage, ChatPart, VlmClient};

pub const FALLBACK_MODEL_ID: &str = "local-model";

const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// Confirms the server is reachable and returns the active model identifier.
pub async fn discover_model(endpoint: &str) -> Result<String> {
    let url = format!("{}/models", endpoint.trim_end_matches('/'));

    let http_client = Client::builder()
        .timeout(HEALTH_CHECK_TIMEOUT)
        .build()
        .context("Failed to build HTTP client")?;

    let response: ModelListResponse = http_client
        .get(&url)
        .send()
        .await
        .with_context(|| format!("Request to {url} failed"))?
        .error_for_status()
        .context("Server returned non-success status")?
        .json()
        .await
        .context("Failed to decode model list JSON")?;

    Ok(select_model_id(response))
}

fn select_model_id(response: ModelListResponse) -> String {
    response
        .data
        .into_iter()
        .next()
        .map(|entry| entry.id)
        .unwrap_or_else(|| FALLBACK_MODEL_ID.to_string())
}

/// Sends a chat completion and returns the first choice's message text.
/// No timeout is applied: local inference latency is unbounded.
pub async fn send_chat_completion(client: &VlmClient, messages: &[ChatMessage]) -> Result<String> {
    let url = format!(
        "{}/chat/completions",
        client.endpoint().trim_end_matches('/')
    );
    let payload = build_chat_payload(client.model(), messages);

    let http_client = Client::new();
    let response_text = http_client
        .post(url)
        .header("Content-Type", "application/json")
        .json(&payload)
        .send()
        .await
        .context("Captioning request failed")?
        .error_for_status()
        .context("Server returned non-success status")?
        .text()
        .await
        .context("Failed to read response body")?;

    let response: ChatCompletionResponse = serde_json::from_str(&response_text)
        .with_context(|| format!("Failed to decode completion JSON: {response_text}"))?;

    extract_message_text(response)
}

pub fn build_chat_payload(model: &str, messages: &[ChatMessage]) -> Value {
    json!({
        "model": model,
        "messages": messages.iter().map(convert_message).collect::<Vec<Value>>()
    })
}

fn convert_message(message: &ChatMessage) -> Value {
    let role = message.role.as_wire_str();

    let mut content_items = Vec::new();
    let mut text_segments = Vec::new();
    let mut only_text = true;

    for part in &message.content {
        match part {
            ChatPart::Text(text) => {
                text_segments.push(text.clone());
                content_items.push(json!({
                    "type": "text",
                    "text": text
                }));
            }
            ChatPart::Image {
                data_b64,
                mime_type,
            } => {
                only_text = false;
                let data_url = format!("data:{mime_type};base64,{data_b64}");
                content_items.push(json!({
                    "type": "image_url",
                    "image_url": { "url": data_url }
                }));
            }
        }
    }

    if only_text {
        json!({
            "role": role,
            "content": text_segments.join("\n")
        })
    } else {
        json!({
            "role": role,
            "content": content_items
        })
    }
}

fn extract_message_text(response: ChatCompletionResponse) -> Result<String> {
    let first_choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("No choices returned from server"))?;

    match first_choice.message.content {
        Some(ChoiceContent::Text(text)) => Ok(text),
        Some(ChoiceContent::Parts(parts)) => Ok(parts
            .into_iter()
            .filter(|part| matches!(part.kind.as_str(), "text" | "output_text"))
            .filter_map(|part| part.text)
            .collect::<Vec<_>>()
            .join("\n")),
        None => Ok(String::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChatRole;

    #[test]
    fn payload_carries_model_and_wire_roles() {
        let messages = vec![
            ChatMessage::system("Describe images."),
            ChatMessage::user(vec![ChatPart::text("What is this?")]),
        ];

        let payload = build_chat_payload("llava", &messages);

        assert_eq!(payload["model"], "llava");
        assert_eq!(payload["messages"][0]["role"], "system");
        assert_eq!(payload["messages"][0]["content"], "Describe images.");
        assert_eq!(payload["messages"][1]["role"], "user");
    }

    #[test]
    fn multimodal_user_message_lists_image_before_text() {
        let messages = vec![ChatMessage::user(vec![
            ChatPart::image_b64("QUJD", "image/png"),
            ChatPart::text("Caption this image."),
        ])];

        let payload = build_chat_payload("llava", &messages);
        let content = &payload["messages"][0]["content"];

        assert_eq!(content[0]["type"], "image_url");
        assert_eq!(
            content[0]["image_url"]["url"],
            "data:image/png;base64,QUJD"
        );
        assert_eq!(content[1]["type"], "text");
        assert_eq!(content[1]["text"], "Caption this image.");
    }

    #[test]
    fn text_only_message_is_a_plain_string() {
        let messages = vec![ChatMessage::user(vec![ChatPart::text("hello")])];
        let payload = build_chat_payload("llava", &messages);

        assert_eq!(payload["messages"][0]["content"], "hello");
    }

    #[test]
    fn assistant_role_maps_to_wire_name() {
        assert_eq!(ChatRole::Assistant.as_wire_str(), "assistant");
    }

    #[test]
    fn first_model_id_wins() {
        let response: ModelListResponse = serde_json::from_str(
            r#"{"data": [{"id": "llava-v1.6"}, {"id": "qwen2-vl"}]}"#,
        )
        .unwrap();

        assert_eq!(select_model_id(response), "llava-v1.6");
    }

    #[test]
    fn empty_model_list_falls_back_to_sentinel() {
        let empty: ModelListResponse = serde_json::from_str(r#"{"data": []}"#).unwrap();
        let missing: ModelListResponse = serde_json::from_str(r#"{}"#).unwrap();

        assert_eq!(select_model_id(empty), FALLBACK_MODEL_ID);
        assert_eq!(select_model_id(missing), FALLBACK_MODEL_ID);
    }

    #[test]
    fn extracts_plain_string_content() {
        let response: ChatCompletionResponse = serde_json::from_str(
            r#"{"choices": [{"message": {"content": "A cat on a mat"}}]}"#,
        )
        .unwrap();

        assert_eq!(extract_message_text(response).unwrap(), "A cat on a mat");
    }

    #[test]
    fn extracts_text_from_part_list_content() {
        let response: ChatCompletionResponse = serde_json::from_str(
            r#"{"choices": [{"message": {"content": [
                {"type": "text", "text": "A dog"},
                {"type": "text", "text": "on grass"}
            ]}}]}"#,
        )
        .unwrap();

        assert_eq!(extract_message_text(response).unwrap(), "A dog\non grass");
    }

    #[test]
    fn missing_choices_is_an_error() {
        let response: ChatCompletionResponse =
            serde_json::from_str(r#"{"choices": []}"#).unwrap();

        assert!(extract_message_text(response).is_err());
    }

    #[test]
    fn null_content_yields_empty_text() {
        let response: ChatCompletionResponse = serde_json::from_str(
            r#"{"choices": [{"message": {"content": null}}]}"#,
        )
        .unwrap();

        assert_eq!(extract_message_text(response).unwrap(), "");
    }
}
