use actix::{ActorFutureExt, Handler, MessageResult, ResponseActFuture, WrapFuture};
use serde_json::json;
use tracing::info;

use crate::api::ApiResult;
use crate::card::card_label;
use crate::sound::SoundCue;
use crate::view::{
    message::{
        CallUno, CheckHealth, ChooseWildColor, CreateGame, DismissBanner, Draw, GetView, JoinGame,
        PlaySelected, PushSettings, Refresh, Restart, SelectCard, SetPollInterval, ToggleAutoRefresh,
        ToggleSound,
    },
    table::{Action, SelectOutcome},
    TableActor,
};

impl Handler<CreateGame> for TableActor {
    type Result = ResponseActFuture<Self, ()>;

    fn handle(&mut self, _msg: CreateGame, _ctx: &mut Self::Context) -> Self::Result {
        if !self.table.begin_action() {
            return Self::done();
        }
        info!("Creating game");
        self.sound.play(SoundCue::Click);
        self.publish();

        let api = self.api.clone();
        Box::pin(
            async move { api.create_game(Some(json!({ "mode": "singleplayer" }))).await }
                .into_actor(self)
                .then(|result, act, ctx| {
                    let created_id = match result {
                        Ok(body) => act.table.apply_created(body),
                        Err(err) => {
                            act.sound.play(SoundCue::Error);
                            act.table.apply_failure(Action::Create, &err);
                            None
                        }
                    };
                    act.after_change(ctx);

                    let api = act.api.clone();
                    async move {
                        match created_id {
                            Some(id) => {
                                let full = api.get_game_state(&id).await;
                                Some((id, full))
                            }
                            None => None,
                        }
                    }
                    .into_actor(act)
                })
                .map(|full, act, ctx| {
                    if let Some((id, result)) = full {
                        match result {
                            Ok(body) => act.table.apply_full_state(&id, body),
                            Err(err) => {
                                act.sound.play(SoundCue::Error);
                                act.table.apply_failure(Action::Create, &err);
                            }
                        }
                    }
                    act.table.finish_action();
                    act.after_change(ctx);
                }),
        )
    }
}

impl Handler<Draw> for TableActor {
    type Result = ResponseActFuture<Self, ()>;

    fn handle(&mut self, _msg: Draw, _ctx: &mut Self::Context) -> Self::Result {
        let Some(game_id) = self.table.require_game() else {
            self.publish();
            return Self::done();
        };
        if !self.table.begin_action() {
            return Self::done();
        }
        info!("Drawing a card in {}", game_id);
        self.sound.play(SoundCue::Draw);

        let api = self.api.clone();
        self.dispatch(Action::Draw, async move {
            api.draw_card(&game_id, None).await
        })
    }
}

impl Handler<PlaySelected> for TableActor {
    type Result = ResponseActFuture<Self, ()>;

    fn handle(&mut self, _msg: PlaySelected, _ctx: &mut Self::Context) -> Self::Result {
        let Some(game_id) = self.table.require_game() else {
            self.publish();
            return Self::done();
        };
        let Some(request) = self.table.play_request() else {
            return Self::done();
        };
        if !self.table.begin_action() {
            return Self::done();
        }
        if let Some(card) = self.table.selected() {
            info!("Playing {} in {}", card_label(card), game_id);
        }
        self.sound.play(SoundCue::Play);

        let api = self.api.clone();
        self.dispatch(Action::Play, async move {
            api.play_card(&game_id, &request).await
        })
    }
}

impl Handler<Restart> for TableActor {
    type Result = ResponseActFuture<Self, ()>;

    fn handle(&mut self, _msg: Restart, _ctx: &mut Self::Context) -> Self::Result {
        let Some(game_id) = self.table.game_id() else {
            return Self::done();
        };
        if !self.table.begin_action() {
            return Self::done();
        }
        info!("Restarting {}", game_id);
        self.sound.play(SoundCue::Click);

        let api = self.api.clone();
        self.dispatch(Action::Restart, async move {
            api.restart_game(&game_id).await
        })
    }
}

impl Handler<CallUno> for TableActor {
    type Result = ResponseActFuture<Self, ()>;

    fn handle(&mut self, _msg: CallUno, _ctx: &mut Self::Context) -> Self::Result {
        let Some(game_id) = self.table.require_game() else {
            self.publish();
            return Self::done();
        };
        if !self.table.begin_action() {
            return Self::done();
        }
        let player_id = self.table.snapshot().you().player_id;
        info!("{} calls UNO in {}", player_id, game_id);
        self.sound.play(SoundCue::Click);

        let api = self.api.clone();
        self.dispatch(Action::CallUno, async move {
            api.call_uno(&game_id, Some(json!({ "playerId": player_id })))
                .await
        })
    }
}

impl Handler<JoinGame> for TableActor {
    type Result = ResponseActFuture<Self, ()>;

    fn handle(&mut self, msg: JoinGame, _ctx: &mut Self::Context) -> Self::Result {
        if !self.table.begin_action() {
            return Self::done();
        }
        info!("Joining {}", msg.game_id);
        self.sound.play(SoundCue::Click);
        self.publish();

        let api = self.api.clone();
        let JoinGame { game_id, name } = msg;
        let payload = name.map(|name| json!({ "name": name }));
        Box::pin(
            async move {
                let result = api.join_game(&game_id, payload).await;
                (game_id, result)
            }
            .into_actor(self)
            .map(|(game_id, result), act, ctx| {
                match result {
                    Ok(body) => act.table.apply_joined(&game_id, body),
                    Err(err) => {
                        act.sound.play(SoundCue::Error);
                        act.table.apply_failure(Action::Join, &err);
                    }
                }
                act.table.finish_action();
                act.after_change(ctx);
            }),
        )
    }
}

impl Handler<PushSettings> for TableActor {
    type Result = ResponseActFuture<Self, ()>;

    fn handle(&mut self, msg: PushSettings, _ctx: &mut Self::Context) -> Self::Result {
        let Some(game_id) = self.table.require_game() else {
            self.publish();
            return Self::done();
        };
        if !self.table.begin_action() {
            return Self::done();
        }
        info!("Updating settings of {}: {}", game_id, msg.0);

        let api = self.api.clone();
        self.dispatch(Action::PushSettings, async move {
            api.update_settings(&game_id, Some(msg.0)).await
        })
    }
}

impl Handler<Refresh> for TableActor {
    type Result = ResponseActFuture<Self, ()>;

    fn handle(&mut self, _msg: Refresh, _ctx: &mut Self::Context) -> Self::Result {
        if self.table.loading() {
            return Self::done();
        }
        let Some(game_id) = self.table.game_id() else {
            return Self::done();
        };

        let api = self.api.clone();
        Box::pin(
            async move { api.get_game_state(&game_id).await }
                .into_actor(self)
                .map(|result, act, ctx| {
                    act.table.apply_poll(result);
                    act.after_change(ctx);
                }),
        )
    }
}

impl Handler<CheckHealth> for TableActor {
    type Result = ResponseActFuture<Self, ApiResult<Option<serde_json::Value>>>;

    fn handle(&mut self, _msg: CheckHealth, _ctx: &mut Self::Context) -> Self::Result {
        let api = self.api.clone();
        Box::pin(async move { api.health().await }.into_actor(self))
    }
}

impl Handler<SelectCard> for TableActor {
    type Result = MessageResult<SelectCard>;

    fn handle(&mut self, msg: SelectCard, _ctx: &mut Self::Context) -> Self::Result {
        let outcome = self.table.select_card(msg.0);
        if outcome != SelectOutcome::Ignored {
            self.sound.play(SoundCue::Click);
            self.publish();
        }
        MessageResult(outcome)
    }
}

impl Handler<ChooseWildColor> for TableActor {
    type Result = ();

    fn handle(&mut self, msg: ChooseWildColor, _ctx: &mut Self::Context) {
        self.table.choose_wild_color(msg.0);
        self.publish();
    }
}

impl Handler<DismissBanner> for TableActor {
    type Result = ();

    fn handle(&mut self, _msg: DismissBanner, _ctx: &mut Self::Context) {
        self.table.dismiss_banner();
        self.publish();
    }
}

impl Handler<ToggleAutoRefresh> for TableActor {
    type Result = ();

    fn handle(&mut self, _msg: ToggleAutoRefresh, ctx: &mut Self::Context) {
        self.table.settings.auto_refresh = !self.table.settings.auto_refresh;
        info!("Auto-refresh {}", on_off(self.table.settings.auto_refresh));
        self.after_change(ctx);
    }
}

impl Handler<SetPollInterval> for TableActor {
    type Result = ();

    fn handle(&mut self, msg: SetPollInterval, ctx: &mut Self::Context) {
        self.table.settings.poll_interval_ms = msg.0;
        self.after_change(ctx);
    }
}

impl Handler<ToggleSound> for TableActor {
    type Result = ();

    fn handle(&mut self, _msg: ToggleSound, _ctx: &mut Self::Context) {
        let enabled = !self.sound.is_enabled();
        self.sound.set_enabled(enabled);
        self.table.settings.sound_enabled = enabled;
        info!("Sound {}", on_off(enabled));
        self.publish();
    }
}

impl Handler<GetView> for TableActor {
    type Result = MessageResult<GetView>;

    fn handle(&mut self, _msg: GetView, _ctx: &mut Self::Context) -> Self::Result {
        MessageResult(self.table.view())
    }
}

fn on_off(flag: bool) -> &'static str {
    if flag {
        "on"
    } else {
        "off"
    }
}
