use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

use crate::config;
use crate::constants::DEFAULT_SERVER_URL;
use crate::error::RunError;
use crate::models::{CaptionSettings, RunEvent, RunOutcome};
use crate::runner::CaptionRun;

/// Owns the Idle/Running state and the single background worker. At most
/// one run is active at a time: start while running and stop while idle
/// are both no-ops.
pub struct RunController {
    config_path: PathBuf,
    running: Arc<AtomicBool>,
    events: UnboundedSender<RunEvent>,
    worker: Option<JoinHandle<()>>,
}

impl RunController {
    pub fn new(config_path: PathBuf) -> (Self, UnboundedReceiver<RunEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        (
            Self {
                config_path,
                running: Arc::new(AtomicBool::new(false)),
                events,
                worker: None,
            },
            receiver,
        )
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Validates the folder, persists the settings, and spawns the worker.
    pub async fn start(&mut self, settings: CaptionSettings) -> Result<(), RunError> {
        if self.is_running() {
            return Ok(());
        }

        let settings = normalize_settings(settings);

        if !Path::new(&settings.folder_path).is_dir() {
            return Err(RunError::InvalidFolder(settings.folder_path));
        }

        config::save_settings(&self.config_path, &settings).await;

        self.running.store(true, Ordering::SeqCst);

        let running = Arc::clone(&self.running);
        let events = self.events.clone();
        self.worker = Some(tokio::spawn(async move {
            let run = CaptionRun::new(settings, Arc::clone(&running), events.clone());
            let outcome = match run.execute().await {
                Ok(outcome) => outcome,
                Err(err) => {
                    let _ = events.send(RunEvent::Log(err.to_string()));
                    RunOutcome::default()
                }
            };

            running.store(false, Ordering::SeqCst);
            let _ = events.send(RunEvent::Finished(outcome));
        }));

        Ok(())
    }

    /// Requests cooperative cancellation. The worker observes the flag at
    /// the next iteration boundary and lets the current image finish.
    pub fn stop(&self) {
        if !self.is_running() {
            return;
        }

        self.running.store(false, Ordering::SeqCst);
        let _ = self.events.send(RunEvent::Log(
            "Stop requested. Will finish current image and stop.".to_string(),
        ));
    }

    /// Waits for the worker task, if one was spawned.
    pub async fn join(&mut self) {
        if let Some(handle) = self.worker.take() {
            let _ = handle.await;
        }
    }
}

fn normalize_settings(settings: CaptionSettings) -> CaptionSettings {
    let server_url = settings.server_url.trim();
    CaptionSettings {
        server_url: if server_url.is_empty() {
            DEFAULT_SERVER_URL.to_string()
        } else {
            server_url.to_string()
        },
        folder_path: settings.folder_path.trim().to_string(),
        system_instruction: settings.system_instruction.trim().to_string(),
        prompt: settings.prompt.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::CONFIG_FILE_NAME;

    fn settings_for(folder: &str, server_url: &str) -> CaptionSettings {
        CaptionSettings {
            server_url: server_url.to_string(),
            folder_path: folder.to_string(),
            system_instruction: String::new(),
            prompt: "Describe the image.".to_string(),
        }
    }

    #[tokio::test]
    async fn start_rejects_missing_folder_and_stays_idle() {
        let dir = tempfile::tempdir().unwrap();
        let (mut controller, _events) =
            RunController::new(dir.path().join(CONFIG_FILE_NAME));

        let missing = dir.path().join("gone").display().to_string();
        let err = controller
            .start(settings_for(&missing, "http://localhost:1234/v1"))
            .await
            .unwrap_err();

        assert!(matches!(err, RunError::InvalidFolder(_)));
        assert!(!controller.is_running());
    }

    #[tokio::test]
    async fn stop_while_idle_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let (controller, mut events) =
            RunController::new(dir.path().join(CONFIG_FILE_NAME));

        controller.stop();

        assert!(!controller.is_running());
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn unreachable_server_finishes_with_zero_processed() {
        let dir = tempfile::tempdir().unwrap();
        let folder = dir.path().join("images");
        tokio::fs::create_dir(&folder).await.unwrap();
        tokio::fs::write(folder.join("a.png"), b"png").await.unwrap();

        let (mut controller, mut events) =
            RunController::new(dir.path().join(CONFIG_FILE_NAME));

        // Port 1 on localhost refuses connections immediately.
        controller
            .start(settings_for(
                &folder.display().to_string(),
                "http://127.0.0.1:1/v1",
            ))
            .await
            .unwrap();

        let outcome = loop {
            match events.recv().await.unwrap() {
                RunEvent::Finished(outcome) => break outcome,
                RunEvent::Log(_) => {}
            }
        };

        controller.join().await;
        assert_eq!(outcome.processed, 0);
        assert!(!controller.is_running());
        assert!(!folder.join("a.txt").exists());
    }

    #[tokio::test]
    async fn start_persists_settings_before_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let folder = dir.path().join("images");
        tokio::fs::create_dir(&folder).await.unwrap();

        let config_path = dir.path().join(CONFIG_FILE_NAME);
        let (mut controller, mut events) = RunController::new(config_path.clone());

        controller
            .start(settings_for(
                &folder.display().to_string(),
                "http://127.0.0.1:1/v1",
            ))
            .await
            .unwrap();

        let saved = config::load(&config_path).await;
        assert_eq!(saved.prompt, "Describe the image.");
        assert_eq!(saved.folder_path, folder.display().to_string());

        while let Some(event) = events.recv().await {
            if matches!(event, RunEvent::Finished(_)) {
                break;
            }
        }
        controller.join().await;
    }

    #[tokio::test]
    async fn blank_server_url_falls_back_to_default() {
        let normalized = normalize_settings(settings_for("  /tmp/x  ", "   "));
        assert_eq!(normalized.server_url, DEFAULT_SERVER_URL);
        assert_eq!(normalized.folder_path, "/tmp/x");
    }
}
