use serde_json::{json, Map, Value};

use crate::card::{normalize_card, normalize_cards, Card, CardColor};

/// Read-only view of one seat at the table.
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub id: Option<String>,
    pub name: String,
    pub hand_count: Option<u64>,
    pub is_ai: bool,
    pub score: i64,
}

/// The local player's id and cards.
#[derive(Debug, Clone, PartialEq)]
pub struct You {
    pub player_id: String,
    pub hand: Vec<Card>,
}

/// Local, advisory copy of the game state.
///
/// Kept as a JSON object because services disagree on field names; the
/// accessors below know the aliases. Only [`GameSnapshot::merge`] and the
/// view layer's own bookkeeping write to it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GameSnapshot {
    fields: Map<String, Value>,
}

impl GameSnapshot {
    /// What the table shows before a game exists.
    pub fn placeholder() -> Self {
        let value = json!({
            "gameId": null,
            "status": "idle",
            "message": "No game yet. Start one with `new`.",
            "currentPlayerIndex": 0,
            "direction": 1,
            "players": [
                { "id": "p1", "name": "You", "handCount": 7, "isAI": false, "score": 0 },
                { "id": "p2", "name": "CPU", "handCount": 7, "isAI": true, "score": 0 }
            ],
            "you": { "playerId": "p1", "hand": [] },
            "discardTop": { "color": "blue", "value": "5" },
            "currentColor": "blue",
            "drawPileCount": 60
        });
        Self::from_value(value)
    }

    /// Non-object values give an empty snapshot.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(fields) => Self { fields },
            _ => Self::default(),
        }
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.fields.clone())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn set(&mut self, key: &str, value: Value) {
        self.fields.insert(key.to_string(), value);
    }

    /// Shallow merge of a server response: every top-level key of
    /// `response` overwrites ours. Anything that isn't an object is ignored.
    pub fn merge(&mut self, response: Option<&Value>) {
        let Some(Value::Object(incoming)) = response else {
            return;
        };
        for (key, value) in incoming {
            self.fields.insert(key.clone(), value.clone());
        }
    }

    /// [`merge`](Self::merge) for a response that describes the game itself.
    /// The game id is re-derived from the response, or kept from before
    /// when the response has none.
    pub fn merge_game(&mut self, response: Option<&Value>) {
        if !matches!(response, Some(Value::Object(_))) {
            return;
        }
        let previous_id = self.game_id();
        self.merge(response);
        if let Some(id) = game_id_of(response).or(previous_id) {
            self.fields.insert("gameId".to_string(), Value::String(id));
        }
    }

    /// [`merge`](Self::merge) for an action response. Whatever ids it
    /// carries, the game id stays the one we had.
    pub fn merge_action(&mut self, response: Option<&Value>) {
        let previous_id = self.game_id();
        self.merge(response);
        if let Some(id) = previous_id {
            self.fields.insert("gameId".to_string(), Value::String(id));
        }
    }

    pub fn game_id(&self) -> Option<String> {
        ["gameId", "id", "game_id"]
            .iter()
            .find_map(|k| truthy_text(self.get(k)))
    }

    pub fn status(&self) -> String {
        truthy_text(self.get("status")).unwrap_or_else(|| "idle".to_string())
    }

    pub fn message(&self) -> Option<String> {
        truthy_text(self.get("message"))
    }

    pub fn current_player_index(&self) -> usize {
        self.first_present(&["currentPlayerIndex", "current_player_index"])
            .and_then(Value::as_u64)
            .and_then(|idx| usize::try_from(idx).ok())
            .unwrap_or(0)
    }

    pub fn direction(&self) -> i64 {
        self.get("direction").and_then(Value::as_i64).unwrap_or(1)
    }

    pub fn players(&self) -> Vec<Player> {
        self.player_values()
            .iter()
            .enumerate()
            .map(|(idx, p)| project_player(idx, p))
            .collect()
    }

    pub fn current_player_name(&self) -> String {
        let idx = self.current_player_index();
        self.player_values()
            .get(idx)
            .and_then(|p| truthy_text(p.get("name")))
            .unwrap_or_else(|| format!("Player {}", idx.saturating_add(1)))
    }

    pub fn discard_top(&self) -> Option<Card> {
        let top = ["discardTop", "discard_top", "top_discard"]
            .iter()
            .find_map(|k| self.get(k).filter(|v| truthy(v)))
            .or_else(|| {
                self.get("discard")
                    .and_then(Value::as_array)
                    .and_then(|pile| pile.last())
            })?;
        normalize_card(top)
    }

    /// The color set by the server, e.g. after a wild. `None` when absent
    /// or not one of the four colors.
    pub fn current_color(&self) -> Option<CardColor> {
        self.raw_current_color()
            .as_deref()
            .and_then(CardColor::parse)
    }

    /// Current color as displayed: the server's, else the top card's, else `"wild"`.
    pub fn current_color_label(&self) -> String {
        self.raw_current_color()
            .or_else(|| self.discard_top().and_then(|c| c.color).map(|c| c.to_string()))
            .unwrap_or_else(|| "wild".to_string())
    }

    pub fn draw_pile_count(&self) -> Option<u64> {
        self.first_present(&["drawPileCount", "draw_pile_count", "drawCount"])
            .and_then(Value::as_u64)
    }

    pub fn you(&self) -> You {
        if let Some(you) = self.get("you").filter(|y| y.get("hand").is_some_and(truthy)) {
            let player_id = ["playerId", "id"]
                .iter()
                .find_map(|k| truthy_text(you.get(k)))
                .unwrap_or_else(|| "you".to_string());
            return You {
                player_id,
                hand: normalize_cards(you.get("hand")),
            };
        }

        let me = self.player_values().iter().find(|p| {
            ["isYou", "is_you", "isHuman", "is_human"]
                .iter()
                .any(|k| p.get(k).is_some_and(truthy))
        });
        You {
            player_id: me
                .and_then(|p| truthy_text(p.get("id")))
                .unwrap_or_else(|| "you".to_string()),
            hand: normalize_cards(me.and_then(|p| p.get("hand"))),
        }
    }

    fn raw_current_color(&self) -> Option<String> {
        ["currentColor", "current_color"]
            .iter()
            .find_map(|k| truthy_text(self.get(k)))
    }

    fn player_values(&self) -> &[Value] {
        self.get("players")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn first_present(&self, keys: &[&str]) -> Option<&Value> {
        keys.iter()
            .find_map(|k| self.get(k).filter(|v| !v.is_null()))
    }
}

/// Game id carried by a response body, if any.
pub fn game_id_of(body: Option<&Value>) -> Option<String> {
    let body = body?;
    ["gameId", "id", "game_id"]
        .iter()
        .find_map(|k| truthy_text(body.get(k)))
}

fn project_player(idx: usize, p: &Value) -> Player {
    let hand_count = ["handCount", "hand_count"]
        .iter()
        .find_map(|k| p.get(k).and_then(Value::as_u64))
        .or_else(|| {
            p.get("hand")
                .and_then(Value::as_array)
                .map(|h| h.len() as u64)
        });

    Player {
        id: truthy_text(p.get("id")),
        name: truthy_text(p.get("name")).unwrap_or_else(|| format!("Player {}", idx + 1)),
        hand_count,
        is_ai: ["isAI", "is_ai"]
            .iter()
            .any(|k| p.get(k).is_some_and(truthy)),
        score: p.get("score").and_then(Value::as_i64).unwrap_or(0),
    }
}

fn truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn truthy_text(v: Option<&Value>) -> Option<String> {
    match v.filter(|v| truthy(v))? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_projection() {
        let s = GameSnapshot::placeholder();
        assert_eq!(s.game_id(), None);
        assert_eq!(s.status(), "idle");
        assert_eq!(s.current_player_name(), "You");
        assert_eq!(s.players().len(), 2);
        assert!(s.players()[1].is_ai);
        assert_eq!(s.current_color(), Some(CardColor::Blue));
        assert_eq!(s.draw_pile_count(), Some(60));
        assert_eq!(s.discard_top().unwrap().id, "blue:5");
        assert!(s.you().hand.is_empty());
        assert!(s.message().is_some());
    }

    #[test]
    fn test_merge_is_shallow_and_keeps_game_id() {
        let mut s = GameSnapshot::from_value(json!({
            "gameId": "g1",
            "status": "playing",
            "players": [{"name": "A"}, {"name": "B"}],
            "drawPileCount": 40
        }));

        s.merge(Some(&json!({"drawPileCount": 39, "players": [{"name": "C"}]})));

        assert_eq!(s.game_id().as_deref(), Some("g1"));
        assert_eq!(s.status(), "playing");
        assert_eq!(s.draw_pile_count(), Some(39));
        assert_eq!(s.players().len(), 1);
        assert_eq!(s.players()[0].name, "C");
    }

    #[test]
    fn test_merge_game_takes_alias_id_from_response() {
        let mut s = GameSnapshot::placeholder();
        s.merge_game(Some(&json!({"game_id": "abc", "status": "playing"})));
        assert_eq!(s.game_id().as_deref(), Some("abc"));
        assert_eq!(s.get("gameId"), Some(&json!("abc")));
    }

    #[test]
    fn test_action_merge_keeps_game_id_over_card_id() {
        let mut s = GameSnapshot::from_value(json!({"gameId": "g1"}));
        s.merge_action(Some(&json!({"id": "card-42", "drawPileCount": 49})));
        assert_eq!(s.game_id().as_deref(), Some("g1"));
        assert_eq!(s.draw_pile_count(), Some(49));

        // snake-case services only ever sent `id`
        let mut s = GameSnapshot::from_value(json!({"id": "g9"}));
        s.merge_action(Some(&json!({"id": "card-7", "gameId": null})));
        assert_eq!(s.game_id().as_deref(), Some("g9"));
    }

    #[test]
    fn test_plain_merge_overwrites_keys_only() {
        let mut s = GameSnapshot::from_value(json!({"gameId": "g1"}));
        s.merge(Some(&json!({"game_id": "other"})));
        assert_eq!(s.get("gameId"), Some(&json!("g1")));
        assert_eq!(s.get("game_id"), Some(&json!("other")));
    }

    #[test]
    fn test_huge_player_index_does_not_panic() {
        let s = GameSnapshot::from_value(json!({
            "currentPlayerIndex": u64::MAX,
            "players": [{"name": "A"}]
        }));
        let name = s.current_player_name();
        assert!(name.starts_with("Player "));

        let s = GameSnapshot::from_value(json!({"currentPlayerIndex": 5, "players": []}));
        assert_eq!(s.current_player_name(), "Player 6");
    }

    #[test]
    fn test_merge_ignores_null_and_non_objects() {
        let before = GameSnapshot::placeholder();
        let mut s = before.clone();
        s.merge(None);
        s.merge(Some(&Value::Null));
        s.merge(Some(&json!([1, 2, 3])));
        s.merge_game(Some(&Value::Null));
        s.merge_action(None);
        assert_eq!(s, before);
    }

    #[test]
    fn test_snake_case_service_shape() {
        let s = GameSnapshot::from_value(json!({
            "id": "g9",
            "current_player_index": 1,
            "direction": -1,
            "players": [
                {"id": "h", "name": "Ann", "is_human": true, "hand": [{"color": "red", "value": "3"}]},
                {"id": "c", "is_ai": true, "hand_count": 4, "score": 12}
            ],
            "discard": [{"color": "red", "value": "1"}, {"color": "green", "value": "8"}],
            "current_color": "green",
            "draw_pile_count": 0
        }));

        assert_eq!(s.game_id().as_deref(), Some("g9"));
        assert_eq!(s.current_player_index(), 1);
        assert_eq!(s.current_player_name(), "Player 2");
        assert_eq!(s.direction(), -1);
        assert_eq!(s.discard_top().unwrap().id, "green:8");
        assert_eq!(s.current_color(), Some(CardColor::Green));
        assert_eq!(s.draw_pile_count(), Some(0));

        let players = s.players();
        assert_eq!(players[0].hand_count, Some(1));
        assert!(!players[0].is_ai);
        assert_eq!(players[1].hand_count, Some(4));
        assert_eq!(players[1].score, 12);

        let you = s.you();
        assert_eq!(you.player_id, "h");
        assert_eq!(you.hand.len(), 1);
    }

    #[test]
    fn test_you_hand_wins_over_players() {
        let s = GameSnapshot::from_value(json!({
            "you": {"id": "me", "hand": [{"value": "WILD"}, null]},
            "players": [{"id": "other", "isYou": true, "hand": []}]
        }));
        let you = s.you();
        assert_eq!(you.player_id, "me");
        assert_eq!(you.hand.len(), 1);
    }

    #[test]
    fn test_unknown_player_id_is_you() {
        assert_eq!(GameSnapshot::default().you().player_id, "you");
        let s = GameSnapshot::from_value(json!({"you": {"hand": [{"value": "3"}]}}));
        assert_eq!(s.you().player_id, "you");
    }

    #[test]
    fn test_current_color_label_falls_back() {
        let s = GameSnapshot::from_value(json!({"discardTop": {"colour": "yellow", "value": "2"}}));
        assert_eq!(s.current_color(), None);
        assert_eq!(s.current_color_label(), "yellow");

        let s = GameSnapshot::from_value(json!({"discardTop": {"value": "WILD"}}));
        assert_eq!(s.current_color_label(), "wild");
    }
}
