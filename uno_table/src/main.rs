use actix::{Actor, Addr};
use clap::Parser;
use serde_json::{Map, Value};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uno_table::{
    command::{parse_command, Command, HELP},
    render::render,
    sound::SoundController,
    view::{
        message::{
            CallUno, CheckHealth, ChooseWildColor, CreateGame, DismissBanner, Draw, GetView,
            JoinGame, PlaySelected, PushSettings, Refresh, Restart, SelectCard, SetPollInterval,
            ToggleAutoRefresh, ToggleSound,
        },
        table::{SelectOutcome, TableView, UiSettings},
    },
    ApiClient, LoggerManager, Table, TableActor,
};
use uno_env::UnoConfig;

#[derive(Parser, Debug)]
#[command(name = "uno_table", about = "Play UNO against a remote game service from the terminal")]
struct Args {
    /// Game service URL; overrides UNO_API_BASE / UNO_BACKEND_URL and the config file
    #[arg(long)]
    base_url: Option<String>,

    /// Per-request timeout in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Auto-refresh interval in milliseconds
    #[arg(long)]
    poll_ms: Option<u64>,

    #[arg(long)]
    no_auto_refresh: bool,
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // 1. .env and layered config
    uno_env::init()?;
    let args = Args::parse();
    let config = UnoConfig::global().clone();

    // 2. logging, then anything the config load had to say
    let _logger = LoggerManager::setup(&config.logging);
    if let Some(e) = UnoConfig::load_error() {
        warn!("Failed to load config: {}. Using defaults.", e);
    }
    debug!("Configuration: {:?}", config);

    // 3. transport
    let mut api_config = config.api.clone();
    if let Some(timeout_ms) = args.timeout_ms {
        api_config.timeout_ms = timeout_ms;
    }
    let api = ApiClient::from_config(&api_config, args.base_url.as_deref())?;
    info!("Using game service at {}", api.base_url());

    // 4. table
    let sound = SoundController::from_preferences();
    let settings = UiSettings {
        auto_refresh: config.ui.auto_refresh && !args.no_auto_refresh,
        poll_interval_ms: args.poll_ms.unwrap_or(config.ui.poll_interval_ms),
        sound_enabled: sound.is_enabled(),
    };
    let (tx, mut frames) = mpsc::unbounded_channel();
    let table = TableActor::new(Table::new(settings), api, sound)
        .with_redraw(tx)
        .start();

    // 5. prompt loop
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            Some(view) = frames.recv() => draw_frame(&view),
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_command(&line) {
                    Ok(Command::Quit) => break,
                    Ok(command) => run(&table, command).await?,
                    Err(e) => eprintln!("{}", e),
                }
            }
        }
    }

    info!("Leaving the table");
    Ok(())
}

/// Network commands are fire-and-forget; their outcome arrives as a frame.
async fn run(table: &Addr<TableActor>, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Show => draw_frame(&table.send(GetView).await?),
        Command::New => table.do_send(CreateGame),
        Command::Draw => table.do_send(Draw),
        Command::Play => table.do_send(PlaySelected),
        Command::Restart => table.do_send(Restart),
        Command::Refresh => table.do_send(Refresh),
        Command::Uno => table.do_send(CallUno),
        Command::Join { game_id, name } => table.do_send(JoinGame { game_id, name }),
        Command::Set { key, value } => {
            let mut patch = Map::new();
            patch.insert(key, value);
            table.do_send(PushSettings(Value::Object(patch)));
        }
        Command::Select(index) => {
            if table.send(SelectCard(index)).await? == SelectOutcome::Ignored {
                eprintln!("card {} can't be selected right now", index);
            }
        }
        Command::Color(color) => table.do_send(ChooseWildColor(color)),
        Command::Auto => table.do_send(ToggleAutoRefresh),
        Command::Interval(ms) => table.do_send(SetPollInterval(ms)),
        Command::Sound => table.do_send(ToggleSound),
        Command::Dismiss => table.do_send(DismissBanner),
        Command::Health => match table.send(CheckHealth).await? {
            Ok(body) => println!(
                "service is up: {}",
                body.map(|b| b.to_string()).unwrap_or_else(|| "(no body)".to_string())
            ),
            Err(e) => {
                warn!("Health check failed: {}", e);
                println!("service unavailable: {}", e);
            }
        },
        Command::Help => println!("{}", HELP),
        Command::Quit => {}
    }
    Ok(())
}

fn draw_frame(view: &TableView) {
    print!("\x1b[2J\x1b[H{}> ", render(view));
    let _ = std::io::stdout().flush();
}
