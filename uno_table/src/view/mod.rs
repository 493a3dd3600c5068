use actix::{
    fut, Actor, ActorFutureExt, AsyncContext, Context, ContextFutureSpawner, ResponseActFuture,
    SpawnHandle, WrapFuture,
};
use serde_json::Value;
use std::future::Future;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info};

use crate::api::{ApiClient, ApiResult};
use crate::sound::{SoundController, SoundCue};
use crate::view::table::{Action, Table, TableView};

pub mod handler;
pub mod message;
pub mod table;

struct PollTimer {
    handle: SpawnHandle,
    game_id: String,
    every: Duration,
}

/// Drives a [`Table`] from user messages and a background poll.
///
/// Messages are handled one at a time; requests run as spawned futures, so
/// a poll can land while a user action is in flight. Whichever response
/// arrives last wins the merge.
pub struct TableActor {
    pub(crate) table: Table,
    pub(crate) api: ApiClient,
    pub(crate) sound: SoundController,
    poll: Option<PollTimer>,
    redraw: Option<UnboundedSender<TableView>>,
}

impl Actor for TableActor {
    type Context = Context<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        info!("Table started against {}", self.api.base_url());
        self.after_change(ctx);
    }
}

impl TableActor {
    pub fn new(table: Table, api: ApiClient, sound: SoundController) -> Self {
        Self {
            table,
            api,
            sound,
            poll: None,
            redraw: None,
        }
    }

    /// Every state change sends a fresh view down `tx`.
    pub fn with_redraw(mut self, tx: UnboundedSender<TableView>) -> Self {
        self.redraw = Some(tx);
        self
    }

    pub(crate) fn publish(&self) {
        if let Some(tx) = &self.redraw {
            let _ = tx.send(self.table.view());
        }
    }

    pub(crate) fn after_change(&mut self, ctx: &mut Context<Self>) {
        self.sync_polling(ctx);
        self.publish();
    }

    /// Keeps exactly one poll timer alive while there is a game and
    /// auto-refresh is on; restarts it when the id or interval changes.
    fn sync_polling(&mut self, ctx: &mut Context<Self>) {
        let wanted = match (self.table.settings.auto_refresh, self.table.game_id()) {
            (true, Some(game_id)) => Some((game_id, self.table.settings.poll_interval())),
            _ => None,
        };
        let current = self
            .poll
            .as_ref()
            .map(|p| (p.game_id.clone(), p.every));
        if wanted == current {
            return;
        }

        if let Some(old) = self.poll.take() {
            ctx.cancel_future(old.handle);
            debug!("Polling for {} stopped", old.game_id);
        }
        if let Some((game_id, every)) = wanted {
            debug!("Polling {} every {:?}", game_id, every);
            let handle = ctx.run_interval(every, |act, ctx| act.poll_once(ctx));
            self.poll = Some(PollTimer {
                handle,
                game_id,
                every,
            });
        }
    }

    fn poll_once(&mut self, ctx: &mut Context<Self>) {
        let Some(game_id) = self.table.game_id() else {
            return;
        };
        let api = self.api.clone();
        async move { api.get_game_state(&game_id).await }
            .into_actor(self)
            .map(|result, act, ctx| {
                act.table.apply_poll(result);
                act.after_change(ctx);
            })
            .spawn(ctx);
    }

    #[cfg(test)]
    pub(crate) fn is_polling(&self) -> bool {
        self.poll.is_some()
    }

    /// Runs a user action's request and folds the outcome into the table.
    /// The caller has already passed `begin_action`.
    pub(crate) fn dispatch<F>(&mut self, action: Action, request: F) -> ResponseActFuture<Self, ()>
    where
        F: Future<Output = ApiResult<Option<Value>>> + 'static,
    {
        self.publish();
        Box::pin(
            request
                .into_actor(self)
                .map(move |result, act, ctx| act.finish(action, result, ctx)),
        )
    }

    pub(crate) fn finish(
        &mut self,
        action: Action,
        result: ApiResult<Option<Value>>,
        ctx: &mut Context<Self>,
    ) {
        match result {
            Ok(body) => self.table.apply_action(action, body),
            Err(err) => {
                self.sound.play(SoundCue::Error);
                self.table.apply_failure(action, &err);
            }
        }
        self.table.finish_action();
        self.after_change(ctx);
    }

    pub(crate) fn done() -> ResponseActFuture<Self, ()> {
        Box::pin(fut::ready(()))
    }
}
