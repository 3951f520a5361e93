use std::time::Instant;

use crossterm::event::{Event, KeyCode, KeyEventKind, KeyModifiers};
use tokio::sync::mpsc;

use crate::gateway::{ChatTurn, Gateway};
use crate::panes::PaneStyle;
use crate::tui::types::{App, CallOrigin, CompletionCall, Mode, PendingCall, TuiMsg};

use super::async_ops::spawn_completion;

pub fn handle_event(
    gateway: &Gateway,
    tx: &mpsc::UnboundedSender<TuiMsg>,
    app: &mut App,
    event: Event,
) {
    if let Event::Key(key) = event {
        if key.kind == KeyEventKind::Press {
            handle_key(gateway, tx, app, key);
        }
    }
}

pub fn handle_key(
    gateway: &Gateway,
    tx: &mpsc::UnboundedSender<TuiMsg>,
    app: &mut App,
    key: crossterm::event::KeyEvent,
) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    if key.code == KeyCode::Char('c') && ctrl {
        app.should_quit = true;
        return;
    }

    match app.mode {
        Mode::Help => {
            if matches!(
                key.code,
                KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q')
            ) {
                app.mode = Mode::List;
            }
        }
        Mode::List => match key.code {
            KeyCode::Esc => app.should_quit = true,
            KeyCode::F(1) => app.mode = Mode::Help,
            KeyCode::Enter => {
                if let Some(call) = submit_prompt(app) {
                    spawn_completion(gateway.clone(), tx.clone(), call);
                }
            }
            KeyCode::Up => move_selection(app, -1),
            KeyCode::Down => move_selection(app, 1),
            KeyCode::Tab => zoom_selection(app),
            KeyCode::PageUp => {
                app.scroll_from_bottom = app.scroll_from_bottom.saturating_add(5)
            }
            KeyCode::PageDown => {
                app.scroll_from_bottom = app.scroll_from_bottom.saturating_sub(5)
            }
            _ => edit_input(app, key.code, ctrl),
        },
        Mode::Zoomed => match key.code {
            KeyCode::Esc => leave_zoom(app),
            KeyCode::F(1) => app.mode = Mode::Help,
            KeyCode::Enter => {
                if let Some(call) = begin_refine(app) {
                    spawn_completion(gateway.clone(), tx.clone(), call);
                }
            }
            _ => edit_input(app, key.code, ctrl),
        },
    }
}

/// `LIST --submit--> LIST`. Empty prompts warn locally and never reach the
/// gateway; a non-empty prompt produces exactly one call with no context.
pub fn submit_prompt(app: &mut App) -> Option<CompletionCall> {
    if app.waiting {
        return None;
    }
    let prompt = app.take_input().trim().to_string();
    if prompt.is_empty() {
        app.status = "Please enter a valid prompt.".to_string();
        return None;
    }

    start_waiting(app, prompt.clone(), CallOrigin::Submit);
    Some(CompletionCall {
        prompt,
        context: Vec::new(),
        max_tokens: app.max_tokens(),
    })
}

/// `ZOOMED(i) --refine--> LIST`. The call carries entry i's prompt and full
/// response as prior turns. Empty text: the flat style still drops back to
/// the list (the zoom pointer is cleared on any refine submission), the
/// sectioned style stays zoomed. Observed behavior from the two source
/// dashboards, kept as-is.
pub fn begin_refine(app: &mut App) -> Option<CompletionCall> {
    if app.waiting {
        return None;
    }
    let focus = app.store.focus()?;

    let text = app.take_input().trim().to_string();
    if text.is_empty() {
        app.status = "Please enter a valid follow-up question.".to_string();
        if app.style == PaneStyle::Flat {
            leave_zoom(app);
        }
        return None;
    }

    let entry = app.store.entry(focus.entry_index())?;
    let context = vec![
        ChatTurn::user(entry.prompt()),
        ChatTurn::assistant(entry.response_text()),
    ];

    start_waiting(app, text.clone(), CallOrigin::Refine);
    Some(CompletionCall {
        prompt: text,
        context,
        max_tokens: app.max_tokens(),
    })
}

/// `LIST --zoom--> ZOOMED` on the current selection.
pub fn zoom_selection(app: &mut App) {
    let targets = app.store.zoom_targets();
    let Some(target) = targets.get(app.selected).copied() else {
        return;
    };
    app.store.set_focus(target);
    app.mode = Mode::Zoomed;
    app.input.clear();
    app.cursor = 0;
    app.status = "Zoomed. Enter refines, Esc goes back.".to_string();
}

/// `ZOOMED --back--> LIST`. Entries untouched.
pub fn leave_zoom(app: &mut App) {
    app.store.clear_focus();
    app.mode = Mode::List;
    app.input.clear();
    app.cursor = 0;
}

fn start_waiting(app: &mut App, prompt: String, origin: CallOrigin) {
    app.waiting = true;
    app.spinner_step = 0;
    app.spinner_last = Instant::now();
    app.pending = Some(PendingCall { prompt, origin });
    app.status = match origin {
        CallOrigin::Submit => "Generating response…".to_string(),
        CallOrigin::Refine => "Generating refined response…".to_string(),
    };
}

fn move_selection(app: &mut App, delta: isize) {
    let len = app.store.zoom_targets().len();
    if len == 0 {
        app.selected = 0;
        return;
    }
    let cur = app.selected.min(len - 1) as isize;
    let next = (cur + delta).clamp(0, (len - 1) as isize);
    app.selected = next as usize;
}

fn edit_input(app: &mut App, code: KeyCode, ctrl: bool) {
    match code {
        KeyCode::Backspace => {
            if app.cursor > 0 && app.cursor <= app.input.len() {
                app.cursor -= 1;
                app.input.remove(app.cursor);
            }
        }
        KeyCode::Left => app.cursor = app.cursor.saturating_sub(1),
        KeyCode::Right => app.cursor = (app.cursor + 1).min(app.input.len()),
        KeyCode::Home => app.cursor = 0,
        KeyCode::End => app.cursor = app.input.len(),
        KeyCode::Char(ch) => {
            if ctrl {
                return;
            }
            if app.cursor > app.input.len() {
                app.cursor = app.input.len();
            }
            app.input.insert(app.cursor, ch);
            app.cursor += 1;
        }
        _ => {}
    }
}
