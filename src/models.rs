use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_SERVER_URL;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Dark,
    #[default]
    Light,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }
}

/// On-disk configuration. Unknown fields in the file are ignored on load
/// but preserved by the merge-on-save path in `config`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptionerConfig {
    pub server_url: String,
    pub folder_path: String,
    pub system_instruction: String,
    pub prompt: String,
    pub theme: Theme,
}

impl Default for CaptionerConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            folder_path: String::new(),
            system_instruction: String::new(),
            prompt: String::new(),
            theme: Theme::default(),
        }
    }
}

impl CaptionerConfig {
    pub fn settings(&self) -> CaptionSettings {
        CaptionSettings {
            server_url: self.server_url.clone(),
            folder_path: self.folder_path.clone(),
            system_instruction: self.system_instruction.clone(),
            prompt: self.prompt.clone(),
        }
    }
}

/// The subset of the configuration a captioning run needs.
#[derive(Clone, Debug)]
pub struct CaptionSettings {
    pub server_url: String,
    pub folder_path: String,
    pub system_instruction: String,
    pub prompt: String,
}

/// Messages from the worker to whoever is presenting the run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RunEvent {
    Log(String),
    Finished(RunOutcome),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunOutcome {
    pub processed: usize,
}
