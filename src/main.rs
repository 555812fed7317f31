use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use image_captioner::config;
use image_captioner::models::RunEvent;
use image_captioner::RunController;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config_path = config::default_path();
    let mut config = config::load(&config_path).await;

    if let Some(folder) = std::env::args().nth(1) {
        config.folder_path = folder;
    }

    let (mut controller, mut events) = RunController::new(config_path);

    if let Err(err) = controller.start(config.settings()).await {
        error!("{err}");
        std::process::exit(1);
    }

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(RunEvent::Log(line)) => info!("{line}"),
                Some(RunEvent::Finished(_)) | None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                controller.stop();
            }
        }
    }

    controller.join().await;
}
