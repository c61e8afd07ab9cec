use std::sync::Arc;

use clap::Parser;
use reqwest::Url;
use shiurbank_player::{
    PlaybackController, PlayerConfig, PlayerSystem,
    audio::playback::RodioElement,
    library::PlayableItem,
    ui::app::App,
    util::{hook::set_panic_hook, log::initialize_logging},
};

/// Play ShiurBank recordings in the terminal.
#[derive(Debug, Parser)]
#[command(name = "shiurbank-player", version)]
struct Cli {
    /// Server the streaming endpoint lives on.
    #[arg(long, env = "SHIURBANK_BASE_URL", default_value = "http://localhost:8080/")]
    base_url: Url,

    /// Series bucket the files belong to.
    #[arg(long, env = "SHIURBANK_SERIES_ID")]
    series: Option<i64>,

    /// Seconds skipped by the arrow keys.
    #[arg(long, default_value_t = 15.0)]
    seek_step: f64,

    /// Starting playback speed.
    #[arg(long, default_value_t = 1.0)]
    rate: f32,

    /// Give up on a recording whose length is still unknown after this many
    /// 100ms polls. 0 waits forever.
    #[arg(long, default_value_t = 600)]
    metadata_attempts: u32,

    /// Recording file names, or full stream URLs.
    #[arg(required = true)]
    files: Vec<String>,
}

impl Cli {
    fn config(&self) -> PlayerConfig {
        PlayerConfig {
            seek_step_secs: self.seek_step,
            initial_rate: self.rate,
            metadata_max_attempts: (self.metadata_attempts > 0).then_some(self.metadata_attempts),
            ..PlayerConfig::default()
        }
    }

    fn items(&self) -> Vec<PlayableItem> {
        self.files
            .iter()
            .map(|file| PlayableItem::from_arg(file, self.series))
            .collect()
    }
}

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> color_eyre::Result<()> {
    setup()?;
    let cli = Cli::parse();
    let config = cli.config();

    let element = RodioElement::new()?;
    let probe = Arc::new(RodioElement::format_probe());
    let mut controller = PlaybackController::new(element, probe, cli.base_url.clone(), config.clone());
    controller.register(cli.items());

    let (event_tx, event_rx) = flume::unbounded();
    let (player, task) = PlayerSystem::spawn(controller, event_tx);

    let mut app = App::new(player.clone(), event_rx, config.seek_step_secs);
    let result = app.run().await;

    let _ = player.shutdown();
    let _ = task.await;
    result
}

fn setup() -> color_eyre::Result<()> {
    color_eyre::install()?;
    dotenv::dotenv().ok();
    set_panic_hook();
    initialize_logging()
}
