use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::fs;
use tokio::fs::try_exists;
use tokio::sync::mpsc::UnboundedSender;

use vlmapi::utils::{detect_mime_type, encode_image_to_base64};
use vlmapi::{discover_model, send_chat_completion, ChatMessage, ChatPart, VlmClient};

use crate::caption::finalize_caption;
use crate::error::RunError;
use crate::fs_utils::{caption_path, list_images};
use crate::models::{CaptionSettings, RunEvent, RunOutcome};

/// One captioning run over a folder. Images are processed strictly in
/// sequence; the shared flag is checked at each iteration boundary, so a
/// stop request lets the in-flight image finish.
pub struct CaptionRun {
    settings: CaptionSettings,
    running: Arc<AtomicBool>,
    events: UnboundedSender<RunEvent>,
}

impl CaptionRun {
    pub fn new(
        settings: CaptionSettings,
        running: Arc<AtomicBool>,
        events: UnboundedSender<RunEvent>,
    ) -> Self {
        Self {
            settings,
            running,
            events,
        }
    }

    fn log(&self, message: impl Into<String>) {
        let _ = self.events.send(RunEvent::Log(message.into()));
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub async fn execute(&self) -> Result<RunOutcome, RunError> {
        self.log("--- Starting Process ---");
        self.log(format!("Server: {}", self.settings.server_url));

        let model_id = discover_model(&self.settings.server_url)
            .await
            .map_err(|cause| RunError::ServerUnreachable {
                url: self.settings.server_url.clone(),
                cause,
            })?;
        self.log(format!("Connected. Model: {model_id}"));

        let folder = Path::new(&self.settings.folder_path);
        let image_files = list_images(folder).await?;

        if image_files.is_empty() {
            self.log("No images found in folder.");
            return Ok(RunOutcome::default());
        }

        self.log(format!("Found {} image(s).", image_files.len()));

        let client = VlmClient::new(self.settings.server_url.as_str(), model_id);
        let mut processed = 0usize;

        for file_name in &image_files {
            if !self.is_running() {
                break;
            }

            let image_path = folder.join(file_name);
            let target = caption_path(&image_path);

            match try_exists(&target).await {
                Ok(true) => {
                    self.log(format!("Skipping '{file_name}' (caption exists)."));
                    continue;
                }
                Ok(false) => {}
                Err(err) => {
                    self.log(format!("Error on '{file_name}': {err}"));
                    continue;
                }
            }

            self.log(format!("Processing '{file_name}'..."));

            match self.caption_one(&client, &image_path, &target).await {
                Ok(true) => {
                    self.log(format!("Done: '{file_name}'"));
                    processed += 1;
                }
                Ok(false) => {
                    self.log(format!(
                        "Warning: Empty caption for '{file_name}', skipping."
                    ));
                }
                Err(err) => {
                    self.log(format!("Error on '{file_name}': {err:#}"));
                }
            }
        }

        self.log(format!("Finished! Total processed: {processed}"));
        Ok(RunOutcome { processed })
    }

    /// Captions a single image. Returns false when the post-processed
    /// caption came back empty and no file was written.
    async fn caption_one(
        &self,
        client: &VlmClient,
        image_path: &Path,
        target: &Path,
    ) -> Result<bool> {
        let data_b64 = encode_image_to_base64(image_path).await?;
        let mime_type = detect_mime_type(image_path);

        let mut messages = Vec::new();
        if !self.settings.system_instruction.is_empty() {
            messages.push(ChatMessage::system(self.settings.system_instruction.as_str()));
        }
        messages.push(ChatMessage::user(vec![
            ChatPart::image_b64(data_b64, mime_type),
            ChatPart::text(self.settings.prompt.as_str()),
        ]));

        let raw_text = send_chat_completion(client, &messages).await?;
        let caption = finalize_caption(&raw_text);

        if caption.is_empty() {
            return Ok(false);
        }

        fs::write(target, &caption)
            .await
            .with_context(|| format!("Failed to write caption file '{}'", target.display()))?;

        Ok(true)
    }
}
