//! Entering and leaving the conversation.

use super::Turn;
use crate::bot::engine::EngineError;
use crate::bot::messenger::Reply;
use crate::bot::state::{Session, State};
use crate::bot::views::root_menu;

/// `/movies` and `/start`: register the user and show the root menu.
pub(super) async fn start(turn: &mut Turn<'_>) -> Result<(), EngineError> {
    let language = turn.register_sender().await?;
    turn.session = Session::fresh(language);

    let t = turn.texts();
    turn.send(Reply::text(t.greeting).with_keyboard(root_menu(t)))
        .await;
    Ok(())
}

/// Back from a results listing to the root menu.
pub(super) async fn return_to_start(turn: &mut Turn<'_>) -> Result<(), EngineError> {
    turn.session.language = turn.register_sender().await?;
    turn.session.state = Some(State::SelectingAction);
    turn.session.pending_filter = None;
    let had_filters = turn.session.filters.take().is_some();

    let t = turn.texts();
    turn.strip_keyboard().await;
    turn.send(Reply::text(t.greeting).with_keyboard(root_menu(t)))
        .await;
    if had_filters {
        turn.delete_trigger_message().await;
    }
    Ok(())
}

/// Back from the discover menu; drops everything but the language.
pub(super) async fn back_to_start(turn: &mut Turn<'_>) -> Result<(), EngineError> {
    return_to_start(turn).await?;
    turn.session.wipe();
    Ok(())
}

/// Done button on the root menu.
pub(super) async fn end(turn: &mut Turn<'_>) -> Result<(), EngineError> {
    let t = turn.texts();
    turn.edit(Reply::text(t.see_you)).await;
    turn.session.state = None;
    Ok(())
}

/// `/stop`. Inside discovery the chat parks in [`State::Stopping`] until the
/// next start.
pub(super) async fn stop(turn: &mut Turn<'_>, nested: bool) -> Result<(), EngineError> {
    let t = turn.texts();
    turn.send(Reply::text(t.bye)).await;
    turn.session = if nested {
        Session {
            state: Some(State::Stopping),
            language: std::mem::take(&mut turn.session.language),
            ..Session::default()
        }
    } else {
        Session::default()
    };
    Ok(())
}
