use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::{backend::Backend, Terminal};
use tracing::debug;

use crate::alert::{DismissRequest, LifecycleState};
use crate::app::App;
use crate::config::Config;
use crate::ui::{render_alert, ViewAction};

/// Result of handling a key event.
pub enum HandleResult {
    /// Continue running the app
    Continue,
    /// Exit the app without waiting for the alert
    Exit,
}

/// Run the alert until it has been dismissed and detached.
///
/// Must be driven inside a `LocalSet`: transitions run as local tasks.
pub async fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    config: &Config,
) -> io::Result<()> {
    let frame = Duration::from_millis(config.animation.frame_ms);
    let idle = Duration::from_millis(config.behavior.idle_poll_ms);

    app.alert.did_load();
    tokio::task::spawn_local(app.alert.present());
    tokio::task::yield_now().await;

    loop {
        app.sync();

        // Apply batched tree writes; a detached alert ends the loop
        if app.host.flush() > 0 && app.host.is_detached() {
            break;
        }

        terminal.draw(|f| render_alert(f, &app.alert, &app.view))?;

        if event::poll(Duration::ZERO)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match handle_key_event(app, key.code, key.modifiers) {
                        HandleResult::Exit => return Ok(()),
                        HandleResult::Continue => {}
                    }
                }
            }
        }

        // Fast ticks while animating, slower when idle
        let animating = matches!(
            app.alert.state(),
            LifecycleState::Presenting | LifecycleState::Dismissing
        );
        tokio::time::sleep(if animating { frame } else { idle }).await;
    }

    app.alert.did_unload();
    app.sync();
    Ok(())
}

/// Handle a key event and return whether to continue or exit.
fn handle_key_event(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> HandleResult {
    if code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
        return HandleResult::Exit;
    }

    // The alert only takes input once it is fully presented
    if app.alert.state() != LifecycleState::Presented {
        return HandleResult::Continue;
    }

    match app.view.handle_key(&mut app.alert, code, modifiers) {
        ViewAction::None => {}
        ViewAction::Activate(index) => {
            if let Some(dismissal) = app.alert.button_click(index) {
                tokio::task::spawn_local(dismissal);
            }
        }
        ViewAction::Backdrop => match app.alert.backdrop_click() {
            Some(dismissal) => {
                tokio::task::spawn_local(dismissal);
            }
            None => debug!("backdrop dismiss disabled"),
        },
        ViewAction::DismissRequest => {
            let mut request = DismissRequest::new();
            tokio::task::spawn_local(app.alert.handle_dismiss_request(&mut request));
        }
    }
    HandleResult::Continue
}
