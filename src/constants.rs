pub const DEFAULT_SERVER_URL: &str = "http://localhost:1234/v1";
pub const CONFIG_FILE_NAME: &str = "caption_config.json";
pub const SUPPORTED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp"];
pub const CAPTION_EXTENSION: &str = "txt";
