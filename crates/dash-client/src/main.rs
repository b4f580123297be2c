use anyhow::Context;
use dash_client::api::ReceiverApi;
use dash_client::blocks::{Block, RenderInstruction};
use dash_client::poller::{Session, SessionEnd};
use dash_proto::config::Config;
use tokio::sync::mpsc;
use tracing::{debug, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load()?;

    // File logging under the platform data dir.
    let data_dir = dash_proto::platform::data_dir();
    std::fs::create_dir_all(&data_dir)?;
    let log_path = data_dir.join("xrit-dash.log");
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(log_file)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(config.log.filter.clone())),
        )
        .init();

    info!("Log file: {:?}", log_path);
    info!("Config loaded from: {:?}", Config::config_path());

    let api = ReceiverApi::new(&config.receiver.base_url);
    info!("Receiver API: {}", api.base_url());

    // The presentation seam: instructions flow out over a channel; this
    // binary's stand-in renderer just traces them.
    let (render_tx, mut render_rx) = mpsc::channel::<(Block, RenderInstruction)>(64);
    tokio::spawn(async move {
        while let Some((block, instruction)) = render_rx.recv().await {
            match instruction {
                RenderInstruction::Time { .. } => {} // 10 Hz, too chatty to log
                other => debug!("[render] {}: {:?}", block.title(), other),
            }
        }
    });

    // One session per UTC day; date rollover restarts from a fresh config
    // fetch, like the upstream dashboard's page reload.
    loop {
        let receiver = api
            .fetch_config()
            .await
            .context("failed to get receiver configuration")?;
        info!(
            "{} {} dashboard, xrit-rx v{}, polling every {}s",
            receiver.spacecraft, receiver.downlink, receiver.version, receiver.interval
        );

        let session = Session::start(&config, api.clone(), receiver, render_tx.clone()).await;
        match session.run().await {
            SessionEnd::DateRollover => {
                info!("restarting session for the new UTC day");
            }
        }
    }
}
