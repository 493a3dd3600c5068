use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::api::{ApiError, ApiResult, PlayRequest};
use crate::card::{card_label, is_wild, Card, CardColor};
use crate::rules::can_play_on;
use crate::snapshot::{game_id_of, GameSnapshot, Player};

pub const NO_GAME_BANNER: &str = "Create a game first.";

#[derive(Debug, Clone, PartialEq)]
pub struct UiSettings {
    pub auto_refresh: bool,
    pub poll_interval_ms: u64,
    pub sound_enabled: bool,
}

impl UiSettings {
    /// Never shorter than the configured floor.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(uno_env::effective_poll_interval_ms(self.poll_interval_ms))
    }
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            auto_refresh: true,
            poll_interval_ms: uno_env::DEFAULT_POLL_INTERVAL_MS,
            sound_enabled: true,
        }
    }
}

/// User-triggered requests. Polls are not actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Create,
    Draw,
    Play,
    Restart,
    Join,
    CallUno,
    PushSettings,
}

impl Action {
    fn clears_selection(&self) -> bool {
        matches!(
            self,
            Action::Create | Action::Draw | Action::Play | Action::Restart
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SelectOutcome {
    Selected(Card),
    Cleared,
    /// Unknown index, unplayable card, or a request in flight.
    Ignored,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerRow {
    pub player: Player,
    pub is_current: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HandCard {
    pub index: usize,
    pub card: Card,
    pub playable: bool,
    pub selected: bool,
}

/// Everything a frame needs, already derived from the snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct TableView {
    pub status: String,
    pub turn: String,
    pub game_id: Option<String>,
    pub direction: i64,
    pub message: Option<String>,
    pub players: Vec<PlayerRow>,
    pub top: Option<Card>,
    pub current_color: String,
    pub draw_pile_count: Option<u64>,
    pub hand: Vec<HandCard>,
    pub banner: Option<String>,
    pub loading: bool,
    pub can_draw: bool,
    /// Set while the selected card is a wild: the color that will be sent.
    pub wild_picker: Option<CardColor>,
    pub settings: UiSettings,
}

/// The table's UI state with no I/O attached.
#[derive(Debug, Clone)]
pub struct Table {
    snapshot: GameSnapshot,
    loading: bool,
    banner: Option<String>,
    selected: Option<Card>,
    wild_color: CardColor,
    pub settings: UiSettings,
}

impl Table {
    pub fn new(settings: UiSettings) -> Self {
        Self {
            snapshot: GameSnapshot::placeholder(),
            loading: false,
            banner: None,
            selected: None,
            wild_color: CardColor::Red,
            settings,
        }
    }

    pub fn snapshot(&self) -> &GameSnapshot {
        &self.snapshot
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn banner(&self) -> Option<&str> {
        self.banner.as_deref()
    }

    pub fn selected(&self) -> Option<&Card> {
        self.selected.as_ref()
    }

    pub fn wild_color(&self) -> CardColor {
        self.wild_color
    }

    pub fn game_id(&self) -> Option<String> {
        self.snapshot.game_id()
    }

    /// The game id, or a "create a game first" banner when there is none.
    pub fn require_game(&mut self) -> Option<String> {
        let id = self.game_id();
        if id.is_none() {
            self.banner = Some(NO_GAME_BANNER.to_string());
        }
        id
    }

    /// Starts a user action. Returns `false`, changing nothing, while
    /// another action is still in flight.
    pub fn begin_action(&mut self) -> bool {
        if self.loading {
            debug!("Action refused: request already in flight");
            return false;
        }
        self.loading = true;
        self.banner = None;
        true
    }

    pub fn finish_action(&mut self) {
        self.loading = false;
    }

    /// Merges the create response and returns the id it named, if any,
    /// so the caller can fetch the full state.
    pub fn apply_created(&mut self, body: Option<Value>) -> Option<String> {
        let created_id = game_id_of(body.as_ref());
        self.snapshot.merge_game(body.as_ref());
        self.snapshot.set("status", Value::String("playing".to_string()));
        self.snapshot.set("message", Value::Null);
        self.selected = None;
        info!("Game created: {:?}", created_id);
        created_id
    }

    pub fn apply_full_state(&mut self, game_id: &str, body: Option<Value>) {
        self.snapshot.merge(body.as_ref());
        self.snapshot
            .set("gameId", Value::String(game_id.to_string()));
    }

    pub fn apply_joined(&mut self, game_id: &str, body: Option<Value>) {
        self.snapshot.merge_game(body.as_ref());
        if game_id_of(body.as_ref()).is_none() {
            self.snapshot
                .set("gameId", Value::String(game_id.to_string()));
        }
    }

    pub fn apply_action(&mut self, action: Action, body: Option<Value>) {
        debug!("{:?} succeeded", action);
        self.snapshot.merge_action(body.as_ref());
        if action.clears_selection() {
            self.selected = None;
        }
    }

    /// The earlier snapshot stays as it was; only the banner changes.
    pub fn apply_failure(&mut self, action: Action, err: &ApiError) {
        warn!("{:?} failed: {}", action, err);
        self.banner = Some(err.to_string());
    }

    /// Background refresh outcome. Leaves `loading` alone.
    pub fn apply_poll(&mut self, result: ApiResult<Option<Value>>) {
        match result {
            Ok(body) => self.snapshot.merge_game(body.as_ref()),
            Err(err) => {
                warn!("Refresh failed: {}", err);
                self.banner = Some(err.to_string());
            }
        }
    }

    pub fn show_banner(&mut self, text: impl Into<String>) {
        self.banner = Some(text.into());
    }

    pub fn dismiss_banner(&mut self) {
        self.banner = None;
    }

    pub fn hand(&self) -> Vec<Card> {
        self.snapshot.you().hand
    }

    pub fn is_playable(&self, card: &Card) -> bool {
        can_play_on(
            self.snapshot.discard_top().as_ref(),
            Some(card),
            self.snapshot.current_color(),
        )
    }

    /// Toggles selection of the hand card at `index`.
    pub fn select_card(&mut self, index: usize) -> SelectOutcome {
        if self.loading {
            return SelectOutcome::Ignored;
        }
        let Some(card) = self.hand().into_iter().nth(index) else {
            return SelectOutcome::Ignored;
        };
        if !self.is_playable(&card) {
            debug!("Ignoring unplayable {}", card_label(&card));
            return SelectOutcome::Ignored;
        }

        if self.selected.as_ref().is_some_and(|s| s.id == card.id) {
            self.selected = None;
            SelectOutcome::Cleared
        } else {
            self.selected = Some(card.clone());
            SelectOutcome::Selected(card)
        }
    }

    pub fn choose_wild_color(&mut self, color: CardColor) {
        self.wild_color = color;
    }

    /// Request body for the selected card; carries the chosen color only for wilds.
    pub fn play_request(&self) -> Option<PlayRequest> {
        let card = self.selected.as_ref()?;
        Some(PlayRequest {
            card_id: card.id.clone(),
            chosen_color: is_wild(card).then_some(self.wild_color),
        })
    }

    pub fn view(&self) -> TableView {
        let top = self.snapshot.discard_top();
        let current_color = self.snapshot.current_color();
        let current_idx = self.snapshot.current_player_index();
        let selected_id = self.selected.as_ref().map(|c| c.id.as_str());
        let game_id = self.game_id();

        let hand = self
            .hand()
            .into_iter()
            .enumerate()
            .map(|(index, card)| HandCard {
                index,
                playable: can_play_on(top.as_ref(), Some(&card), current_color),
                selected: selected_id == Some(card.id.as_str()),
                card,
            })
            .collect();

        let players = self
            .snapshot
            .players()
            .into_iter()
            .enumerate()
            .map(|(idx, player)| PlayerRow {
                player,
                is_current: idx == current_idx,
            })
            .collect();

        TableView {
            status: self.snapshot.status(),
            turn: self.snapshot.current_player_name(),
            can_draw: game_id.is_some() && !self.loading,
            game_id,
            direction: self.snapshot.direction(),
            message: self.snapshot.message(),
            players,
            current_color: self.snapshot.current_color_label(),
            top,
            draw_pile_count: self.snapshot.draw_pile_count(),
            hand,
            banner: self.banner.clone(),
            loading: self.loading,
            wild_picker: self
                .selected
                .as_ref()
                .filter(|c| is_wild(c))
                .map(|_| self.wild_color),
            settings: self.settings.clone(),
        }
    }
}
