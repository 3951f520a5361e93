use crate::panes::{MISSING_COMPLETION, PaneStyle, ResponseEntry};
use crate::tui::types::{App, CallOrigin, Mode, TuiMsg};

/// Applies a finished gateway call to the store. Success or failure, exactly
/// one entry is appended; after a refine the zoom pointer is cleared and the
/// view returns to the list.
pub fn handle_tui_msg(app: &mut App, msg: TuiMsg) {
    match msg {
        TuiMsg::Completed(res) => {
            app.waiting = false;
            let Some(pending) = app.pending.take() else {
                return;
            };

            match res {
                Ok(text) => {
                    append_completion(app, &pending.prompt, &text);
                    app.status = format!("Response {} ready.", app.store.len());
                }
                Err(err) => match app.style {
                    // The failure is displayed as if it were a completion.
                    PaneStyle::Flat => {
                        app.store.append(ResponseEntry::flat(
                            pending.prompt.as_str(),
                            format!("Error: {err}"),
                        ));
                        app.status = format!("Response {} ready.", app.store.len());
                    }
                    PaneStyle::Sectioned => {
                        app.store.append(ResponseEntry::sectioned(
                            pending.prompt.as_str(),
                            MISSING_COMPLETION,
                        ));
                        app.status = format!("Completion failed: {err}");
                    }
                },
            }

            if pending.origin == CallOrigin::Refine {
                app.store.clear_focus();
                app.mode = Mode::List;
            }
            app.scroll_from_bottom = 0;
        }
    }
}

fn append_completion(app: &mut App, prompt: &str, completion: &str) {
    let entry = match app.style {
        PaneStyle::Flat => ResponseEntry::flat(prompt, completion),
        PaneStyle::Sectioned => ResponseEntry::sectioned(prompt, completion),
    };
    app.store.append(entry);
}

#[cfg(test)]
mod tests {
    use crate::errors::CliError;
    use crate::panes::{MISSING_COMPLETION, PaneStyle, ResponseEntry};
    use crate::tui::types::{App, CallOrigin, Mode, PendingCall, TuiMsg};

    use super::handle_tui_msg;

    fn app(style: PaneStyle) -> App {
        App::new(
            style,
            "https://api.openai.com".to_string(),
            "gpt-3.5-turbo".to_string(),
        )
    }

    fn pending(app: &mut App, prompt: &str, origin: CallOrigin) {
        app.waiting = true;
        app.pending = Some(PendingCall {
            prompt: prompt.to_string(),
            origin,
        });
    }

    #[test]
    fn success_appends_flat_entry() {
        let mut app = app(PaneStyle::Flat);
        pending(&mut app, "hello", CallOrigin::Submit);

        handle_tui_msg(&mut app, TuiMsg::Completed(Ok("hi there".to_string())));

        assert!(!app.waiting);
        assert_eq!(app.store.len(), 1);
        assert_eq!(
            app.store.entries()[0],
            ResponseEntry::flat("hello", "hi there")
        );
        assert_eq!(app.store.focus(), None);
    }

    #[test]
    fn flat_failure_is_displayed_as_the_response() {
        let mut app = app(PaneStyle::Flat);
        pending(&mut app, "hello", CallOrigin::Submit);

        handle_tui_msg(
            &mut app,
            TuiMsg::Completed(Err(CliError::RateLimited("rate limited".to_string()))),
        );

        assert_eq!(app.store.len(), 1);
        assert_eq!(
            app.store.entries()[0].response_text(),
            "Error: rate limited"
        );
    }

    #[test]
    fn sectioned_failure_stores_placeholder_and_notice() {
        let mut app = app(PaneStyle::Sectioned);
        pending(&mut app, "hello", CallOrigin::Submit);

        handle_tui_msg(
            &mut app,
            TuiMsg::Completed(Err(CliError::Server("upstream exploded".to_string()))),
        );

        assert_eq!(app.store.len(), 1);
        assert_eq!(app.store.entries()[0].response_text(), MISSING_COMPLETION);
        assert_eq!(app.status, "Completion failed: upstream exploded");
    }

    #[test]
    fn refine_completion_clears_focus_and_returns_to_list() {
        let mut app = app(PaneStyle::Flat);
        app.store.append(ResponseEntry::flat("q0", "a0"));
        app.store.set_focus(crate::panes::Focus::Entry(0));
        app.mode = Mode::Zoomed;
        pending(&mut app, "explain more", CallOrigin::Refine);

        handle_tui_msg(&mut app, TuiMsg::Completed(Ok("sure".to_string())));

        assert_eq!(app.store.len(), 2);
        assert_eq!(app.store.focus(), None);
        assert_eq!(app.mode, Mode::List);
    }

    #[test]
    fn sectioned_success_splits_completion() {
        let mut app = app(PaneStyle::Sectioned);
        pending(&mut app, "hello", CallOrigin::Submit);

        handle_tui_msg(&mut app, TuiMsg::Completed(Ok("abcdefghi".to_string())));

        match &app.store.entries()[0] {
            ResponseEntry::Sectioned { sections, .. } => {
                assert_eq!(sections.len(), 3);
                assert_eq!(sections[0].content, "abc");
            }
            other => panic!("expected sectioned entry, got {other:?}"),
        }
    }

    #[test]
    fn stray_completion_without_pending_is_dropped() {
        let mut app = app(PaneStyle::Flat);
        handle_tui_msg(&mut app, TuiMsg::Completed(Ok("orphan".to_string())));
        assert!(app.store.is_empty());
    }
}
