use actix::Message;
use serde_json::Value;

use crate::api::ApiResult;
use crate::card::CardColor;
use crate::view::table::{SelectOutcome, TableView};

#[derive(Message)]
#[rtype(result = "()")]
pub struct CreateGame;

#[derive(Message)]
#[rtype(result = "()")]
pub struct Draw;

#[derive(Message)]
#[rtype(result = "()")]
pub struct PlaySelected;

#[derive(Message)]
#[rtype(result = "()")]
pub struct Restart;

#[derive(Message)]
#[rtype(result = "()")]
pub struct Refresh;

#[derive(Message)]
#[rtype(result = "()")]
pub struct CallUno;

#[derive(Message)]
#[rtype(result = "()")]
pub struct JoinGame {
    pub game_id: String,
    pub name: Option<String>,
}

/// PATCHes the given object to the game's settings endpoint.
#[derive(Message)]
#[rtype(result = "()")]
pub struct PushSettings(pub Value);

#[derive(Message)]
#[rtype(result = "ApiResult<Option<Value>>")]
pub struct CheckHealth;

#[derive(Message)]
#[rtype(result = "SelectOutcome")]
pub struct SelectCard(pub usize);

#[derive(Message)]
#[rtype(result = "()")]
pub struct ChooseWildColor(pub CardColor);

#[derive(Message)]
#[rtype(result = "()")]
pub struct DismissBanner;

#[derive(Message)]
#[rtype(result = "()")]
pub struct ToggleAutoRefresh;

#[derive(Message)]
#[rtype(result = "()")]
pub struct SetPollInterval(pub u64);

#[derive(Message)]
#[rtype(result = "()")]
pub struct ToggleSound;

#[derive(Message)]
#[rtype(result = "TableView")]
pub struct GetView;
