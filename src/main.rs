use anyhow::Context;
use booklist_kernel::settings::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().with_context(|| "failed to load booklist settings")?;
    booklist_telemetry::init(&settings.telemetry)
        .with_context(|| "failed to initialize telemetry")?;

    tracing::info!(
        env = ?settings.environment,
        backend = ?settings.storage.backend,
        "booklist-app starting"
    );

    let mut list = booklist_app::open_reading_list(&settings).await?;

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let result = booklist_app::screen::run(&mut list, stdin, std::io::stdout())
        .await
        .with_context(|| "terminal session failed");

    // Let the last write land even if the session ended badly.
    list.shutdown().await;

    tracing::info!("booklist-app stopped");
    result
}
