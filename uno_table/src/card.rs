use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardColor {
    Red,
    Yellow,
    Green,
    Blue,
}

/// Playable colors, also the choices offered after a wild.
pub const UNO_COLORS: [CardColor; 4] = [
    CardColor::Red,
    CardColor::Yellow,
    CardColor::Green,
    CardColor::Blue,
];

impl CardColor {
    pub fn as_str(&self) -> &'static str {
        match self {
            CardColor::Red => "red",
            CardColor::Yellow => "yellow",
            CardColor::Green => "green",
            CardColor::Blue => "blue",
        }
    }

    /// Case-insensitive; anything outside the four colors is `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "red" => Some(CardColor::Red),
            "yellow" => Some(CardColor::Yellow),
            "green" => Some(CardColor::Green),
            "blue" => Some(CardColor::Blue),
            _ => None,
        }
    }
}

impl fmt::Display for CardColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical card as the table shows it. `raw` keeps the server payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    pub id: String,
    pub color: Option<CardColor>,
    pub value: Option<String>,
    pub raw: Value,
}

const COLOR_KEYS: [&str; 3] = ["color", "colour", "suit"];
const VALUE_KEYS: [&str; 4] = ["value", "rank", "type", "name"];
const ID_KEYS: [&str; 3] = ["id", "card_id", "cardId"];

/// Maps whatever card shape the service sent to a [`Card`].
///
/// Only `null` yields `None`. Missing or oddly typed fields degrade to
/// `None` fields, and the id falls back to `"{color}:{value}"` so the same
/// payload always gets the same identity.
pub fn normalize_card(raw: &Value) -> Option<Card> {
    if raw.is_null() {
        return None;
    }

    let raw_color = COLOR_KEYS.iter().find_map(|k| truthy_text(raw.get(*k)));
    let value = VALUE_KEYS.iter().find_map(|k| present_text(raw.get(*k)));
    let id = ID_KEYS
        .iter()
        .find_map(|k| truthy_text(raw.get(*k)))
        .unwrap_or_else(|| {
            format!(
                "{}:{}",
                raw_color.as_deref().unwrap_or("wild"),
                value.as_deref().unwrap_or("null")
            )
        });

    Some(Card {
        id,
        color: raw_color.as_deref().and_then(CardColor::parse),
        value,
        raw: raw.clone(),
    })
}

/// Normalizes every non-null entry of a JSON array.
pub fn normalize_cards(raw: Option<&Value>) -> Vec<Card> {
    raw.and_then(Value::as_array)
        .map(|cards| cards.iter().filter_map(normalize_card).collect())
        .unwrap_or_default()
}

// Non-empty strings and non-zero numbers, as a string.
fn truthy_text(v: Option<&Value>) -> Option<String> {
    match v? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        Value::Bool(true) => Some("true".to_string()),
        _ => None,
    }
}

// Anything scalar that isn't null.
fn present_text(v: Option<&Value>) -> Option<String> {
    match v? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

pub fn is_wild(card: &Card) -> bool {
    card.value
        .as_deref()
        .map(|v| v.to_lowercase().contains("wild"))
        .unwrap_or(false)
}

/// Short face label for a card.
pub fn card_text(card: &Card) -> String {
    let value = card.value.as_deref().unwrap_or("");
    match value.to_uppercase().as_str() {
        "WILD" => "WILD".to_string(),
        "WILD_DRAW_FOUR" | "WILD+4" | "WILD4" => "WILD +4".to_string(),
        "DRAW_TWO" | "+2" => "+2".to_string(),
        "SKIP" => "SKIP".to_string(),
        "REVERSE" => "REV".to_string(),
        _ => value.to_string(),
    }
}

/// `"red 7"`, `"wild WILD +4"`; used in frames and logs.
pub fn card_label(card: &Card) -> String {
    format!(
        "{} {}",
        card.color.map(|c| c.as_str()).unwrap_or("wild"),
        card_text(card)
    )
}
