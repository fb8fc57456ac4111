use std::io::stdout;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use color_eyre::Result;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture, KeyEventKind, MouseEventKind};
use crossterm::execute;

use tbm::action::{Action, Direction};
use tbm::app::App;
use tbm::config::{self, Config, load_config, load_config_from_path};
use tbm::event::{Event, EventHandler};
use tbm::system::collector::MetricsSource;
use tbm::system::platform::{self, native_collector};
use tbm::system::sampler::{Poller, Sampler};
use tbm::{logging, ui};

#[derive(Parser)]
#[command(
    name = "tbm",
    version,
    about = "Terminal system monitor with fuzzy process search"
)]
struct Cli {
    /// Path to config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Sampling interval in milliseconds
    #[arg(long)]
    interval: Option<u64>,

    /// Redraw tick in milliseconds
    #[arg(long)]
    refresh_rate: Option<u64>,

    /// Initial sort column: cpu, memory, pid, name
    #[arg(long)]
    sort: Option<String>,

    /// Color theme: dark, light, mono
    #[arg(long)]
    theme: Option<String>,

    /// Write logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Print one snapshot as JSON and exit.
    #[arg(long, default_value_t = false)]
    once: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let config = load_config_for_cli(&cli);
    logging::init(&config.logging)?;
    tracing::info!(platform = platform::PLATFORM_NAME, "starting");

    if cli.once {
        return print_once(native_collector(), config.sampler.interval()).await;
    }

    let mut sampler = Sampler::with_interval(native_collector(), config.sampler.interval());
    sampler.start();

    let mut terminal = ratatui::init();
    execute!(stdout(), EnableMouseCapture)?;

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = execute!(std::io::stdout(), DisableMouseCapture);
        ratatui::restore();
        original_hook(panic_info);
    }));

    let result = run(&mut terminal, &config, &sampler).await;

    execute!(stdout(), DisableMouseCapture)?;
    ratatui::restore();
    sampler.stop().await;

    result
}

async fn run<S: MetricsSource + 'static>(
    terminal: &mut ratatui::DefaultTerminal,
    config: &Config,
    sampler: &Sampler<S>,
) -> Result<()> {
    let tick_rate = Duration::from_millis(config.general.refresh_rate_ms.max(1));
    let mut app = App::new(config, sampler.current_snapshot());
    let mut events = EventHandler::new(tick_rate, sampler.subscribe());

    terminal.draw(|frame| ui::draw(frame, &mut app))?;

    while app.running {
        if let Some(event) = events.next().await {
            let mut should_draw = false;
            match event {
                Event::Key(key) => {
                    if key.kind == KeyEventKind::Press {
                        let action = app.map_key(key);
                        app.dispatch(action);
                        should_draw = true;
                    }
                }
                Event::Mouse(mouse) => {
                    let action = match mouse.kind {
                        MouseEventKind::ScrollUp => Action::Navigate(Direction::Up),
                        MouseEventKind::ScrollDown => Action::Navigate(Direction::Down),
                        _ => Action::None,
                    };
                    if action != Action::None {
                        app.dispatch(action);
                        should_draw = true;
                    }
                }
                Event::Snapshot(snapshot) => {
                    app.apply_snapshot(snapshot);
                    should_draw = true;
                }
                Event::Tick | Event::Resize => {
                    should_draw = true;
                }
            }
            if should_draw {
                terminal.draw(|frame| ui::draw(frame, &mut app))?;
            }
        }
    }

    Ok(())
}

async fn print_once<S: MetricsSource>(source: S, interval: Duration) -> Result<()> {
    let snapshot = Poller::new(source).settled(interval).await;
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}

fn load_config_for_cli(cli: &Cli) -> config::Config {
    let mut config = match &cli.config {
        Some(path) => load_config_from_path(path),
        None => load_config(),
    };

    if let Some(interval) = cli.interval {
        config.sampler.interval_ms = interval;
    }
    if let Some(rate) = cli.refresh_rate {
        config.general.refresh_rate_ms = rate;
    }
    if let Some(ref sort) = cli.sort {
        config.general.default_sort = sort.clone();
    }
    if let Some(ref theme) = cli.theme {
        config.colors.theme = theme.clone();
    }
    if let Some(ref path) = cli.log_file {
        config.logging.file = Some(path.clone());
    }

    config
}
