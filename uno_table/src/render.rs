use std::fmt::Write;

use crate::card::{card_label, card_text};
use crate::view::table::{HandCard, TableView};

const RULE: &str = "------------------------------------------------------------";

/// One full text frame of the table.
pub fn render(view: &TableView) -> String {
    let mut out = String::new();

    let _ = writeln!(
        out,
        "UNO | Status: {} | Turn: {}{}",
        view.status.to_uppercase(),
        view.turn,
        if view.loading { " | working..." } else { "" }
    );
    if let Some(banner) = &view.banner {
        let _ = writeln!(out, "!! {}  (dismiss to hide)", banner);
    }
    if let Some(message) = &view.message {
        let _ = writeln!(out, "{}", message);
    }
    let _ = writeln!(out, "{}", RULE);

    let _ = writeln!(out, "Players");
    for row in &view.players {
        let p = &row.player;
        let _ = writeln!(
            out,
            "{} {} [{}]  Hand: {}  Score: {}",
            if row.is_current { ">" } else { " " },
            p.name,
            if p.is_ai { "CPU" } else { "You" },
            p.hand_count
                .map(|n| n.to_string())
                .unwrap_or_else(|| "—".to_string()),
            p.score
        );
    }
    let _ = writeln!(
        out,
        "Game: {}  Direction: {}",
        view.game_id.as_deref().unwrap_or("—"),
        if view.direction == 1 { "Clockwise" } else { "Counter" }
    );
    let _ = writeln!(out, "{}", RULE);

    let _ = writeln!(
        out,
        "Draw pile: {}    Discard: {}    Color: {}",
        view.draw_pile_count
            .map(|n| n.to_string())
            .unwrap_or_else(|| "—".to_string()),
        view.top
            .as_ref()
            .map(|c| format!("[{}]", card_label(c)))
            .unwrap_or_else(|| "—".to_string()),
        view.current_color.to_uppercase()
    );
    let _ = writeln!(out, "{}", RULE);

    let _ = writeln!(out, "Your hand ({})", view.hand.len());
    if view.hand.is_empty() {
        let _ = writeln!(out, "  No cards in hand.");
    }
    for card in &view.hand {
        let _ = writeln!(out, "{}", hand_line(card));
    }
    if let Some(color) = view.wild_picker {
        let _ = writeln!(out, "Wild color: {}  (change with `color <red|yellow|green|blue>`)", color);
    }

    let _ = writeln!(out, "{}", RULE);
    let _ = writeln!(
        out,
        "select N, then play. draw to draw.  auto-refresh: {} ({}ms)  sound: {}",
        if view.settings.auto_refresh { "on" } else { "off" },
        view.settings.poll_interval().as_millis(),
        if view.settings.sound_enabled { "on" } else { "off" }
    );
    out
}

fn hand_line(hand: &HandCard) -> String {
    let color = hand.card.color.map(|c| c.as_str()).unwrap_or("wild");
    format!(
        "{} {:>2}. {:<7} {:<8}{}",
        if hand.selected { "*" } else { " " },
        hand.index,
        color,
        card_text(&hand.card),
        if hand.playable { "" } else { "  (not playable)" }
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::table::{Table, UiSettings};
    use serde_json::json;

    #[test]
    fn test_placeholder_frame() {
        let frame = render(&Table::new(UiSettings::default()).view());
        assert!(frame.starts_with("UNO | Status: IDLE | Turn: You"));
        assert!(frame.contains("Game: —  Direction: Clockwise"));
        assert!(frame.contains("No cards in hand."));
        assert!(frame.contains("Draw pile: 60"));
        assert!(frame.contains("[blue 5]"));
    }

    #[test]
    fn test_hand_marks_and_wild_picker() {
        let mut table = Table::new(UiSettings::default());
        table.apply_created(Some(json!({
            "gameId": "g1",
            "direction": -1,
            "you": {"hand": [{"color": "red", "value": "9"}, {"value": "WILD_DRAW_FOUR"}]},
            "discardTop": {"color": "blue", "value": "5"},
            "players": [{"name": "Ann", "hand": [1, 2]}, {"name": "Bot", "isAI": true}]
        })));
        table.select_card(1);
        table.show_banner("Not your turn");

        let frame = render(&table.view());
        assert!(frame.contains("!! Not your turn"));
        assert!(frame.contains("Direction: Counter"));
        assert!(frame.contains("> Ann [You]  Hand: 2  Score: 0"));
        assert!(frame.contains("  Bot [CPU]  Hand: —"));
        assert!(frame.contains("red     9         (not playable)"));
        assert!(frame.contains("*  1. wild    WILD +4"));
        assert!(frame.contains("Wild color: red"));
    }
}
