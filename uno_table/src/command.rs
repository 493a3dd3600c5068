use serde_json::Value;

use crate::card::CardColor;

pub const HELP: &str = "\
commands:
  new                 start a game against the CPU
  draw                draw a card
  select N            select (or unselect) hand card N
  color C             wild color: red, yellow, green, blue
  play                play the selected card
  restart             restart the current game
  refresh             fetch the latest state now
  uno                 call UNO
  join ID [NAME]      join an existing game
  set KEY VALUE       update a game setting on the server
  auto                toggle auto-refresh
  interval MS         auto-refresh interval (min 400)
  sound               toggle sound
  dismiss             hide the banner
  health              ping the game service
  help                this text
  quit";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Show,
    New,
    Draw,
    Select(usize),
    Color(CardColor),
    Play,
    Restart,
    Refresh,
    Uno,
    Join { game_id: String, name: Option<String> },
    Set { key: String, value: Value },
    Auto,
    Interval(u64),
    Sound,
    Dismiss,
    Health,
    Help,
    Quit,
}

/// Parses one line typed at the table prompt. An empty line just redraws.
pub fn parse_command(line: &str) -> Result<Command, String> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(Command::Show);
    };
    let rest: Vec<&str> = words.collect();

    let command = match head.to_ascii_lowercase().as_str() {
        "new" | "n" => Command::New,
        "draw" | "d" => Command::Draw,
        "select" | "s" => {
            let index = rest
                .first()
                .ok_or("usage: select N")?
                .parse::<usize>()
                .map_err(|_| "select needs a card number".to_string())?;
            Command::Select(index)
        }
        "color" | "c" => {
            let color = rest
                .first()
                .and_then(|c| CardColor::parse(c))
                .ok_or("usage: color <red|yellow|green|blue>")?;
            Command::Color(color)
        }
        "play" | "p" => Command::Play,
        "restart" => Command::Restart,
        "refresh" | "r" => Command::Refresh,
        "uno" => Command::Uno,
        "join" => {
            let game_id = rest.first().ok_or("usage: join ID [NAME]")?.to_string();
            let name = (rest.len() > 1).then(|| rest[1..].join(" "));
            Command::Join { game_id, name }
        }
        "set" => {
            if rest.len() < 2 {
                return Err("usage: set KEY VALUE".to_string());
            }
            let raw = rest[1..].join(" ");
            let value = serde_json::from_str(&raw).unwrap_or(Value::String(raw));
            Command::Set {
                key: rest[0].to_string(),
                value,
            }
        }
        "auto" => Command::Auto,
        "interval" => {
            let raw = rest.first().ok_or("usage: interval MS")?;
            Command::Interval(
                raw.parse::<u64>()
                    .unwrap_or(uno_env::DEFAULT_POLL_INTERVAL_MS),
            )
        }
        "sound" => Command::Sound,
        "dismiss" | "x" => Command::Dismiss,
        "health" => Command::Health,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => return Err(format!("unknown command `{}` (try `help`)", other)),
    };
    Ok(command)
}
