use std::io;
use std::time::{Duration, Instant};

use clap::Args;
use crossterm::cursor::Show;
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap};
use ratatui::{Frame, Terminal};
use tokio::sync::mpsc;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::app::Runtime;
use crate::errors::CliError;
use crate::panes::{Focus, PaneStyle, ResponseEntry, preview};
use crate::tui::handlers::{handle_event, handle_tui_msg};
use crate::tui::types::{App, Mode, TuiMsg};

#[derive(Debug, Args)]
pub struct DashArgs {
    /// Model id override, e.g. "gpt-4"
    #[arg(short = 'm', long = "model")]
    pub model: Option<String>,
    /// Split each completion into Introduction/Analysis/Conclusion panes
    #[arg(long)]
    pub sectioned: bool,
}

struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> Result<Self, CliError> {
        enable_raw_mode()
            .map_err(|e| CliError::Generic(format!("Failed to enable raw mode: {e}")))?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)
            .map_err(|e| CliError::Generic(format!("Failed to enter alternate screen: {e}")))?;
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let mut stdout = io::stdout();
        let _ = execute!(stdout, Show, LeaveAlternateScreen);
    }
}

pub async fn handle(runtime: &Runtime, args: DashArgs) -> Result<(), CliError> {
    if runtime.output.json {
        return Err(CliError::Usage(
            "`--json` is not supported for `panes dash`.".to_string(),
        ));
    }

    // Key resolution happens here, before the terminal is taken over and
    // before any gateway call can be issued.
    let gateway = runtime.gateway(args.model.as_deref())?;

    let style = if args.sectioned {
        PaneStyle::Sectioned
    } else {
        PaneStyle::Flat
    };
    let mut app = App::new(
        style,
        runtime.resolved_api_url()?,
        gateway.model().to_string(),
    );

    let guard = TerminalGuard::enter()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| CliError::Generic(format!("Failed to init terminal: {e}")))?;
    terminal
        .clear()
        .map_err(|e| CliError::Generic(format!("Failed to clear terminal: {e}")))?;

    let (tx, mut rx) = mpsc::unbounded_channel::<TuiMsg>();

    loop {
        update_spinner(&mut app);
        terminal
            .draw(|f| ui(f, &mut app))
            .map_err(|e| CliError::Generic(format!("Failed to draw: {e}")))?;

        if app.should_quit {
            break;
        }

        while let Ok(msg) = rx.try_recv() {
            handle_tui_msg(&mut app, msg);
        }

        // Faster cadence while a completion is in flight so the spinner moves.
        let poll_ms = if app.waiting || app.mode != Mode::List {
            50
        } else {
            120
        };
        if crossterm::event::poll(Duration::from_millis(poll_ms))
            .map_err(|e| CliError::Generic(format!("Event poll failed: {e}")))?
        {
            let event = crossterm::event::read()
                .map_err(|e| CliError::Generic(format!("Event read failed: {e}")))?;
            handle_event(&gateway, &tx, &mut app, event);
        }
    }

    terminal
        .show_cursor()
        .map_err(|e| CliError::Generic(format!("Failed to restore cursor: {e}")))?;
    drop(guard);
    Ok(())
}

fn update_spinner(app: &mut App) {
    if app.waiting && app.spinner_last.elapsed() >= Duration::from_millis(120) {
        app.spinner_step = app.spinner_step.wrapping_add(1);
        app.spinner_last = Instant::now();
    }
}

const SPINNER_FRAMES: [&str; 4] = ["|", "/", "-", "\\"];

fn spinner_frame(step: u64) -> &'static str {
    SPINNER_FRAMES[(step as usize) % SPINNER_FRAMES.len()]
}

fn ui(f: &mut Frame<'_>, app: &mut App) {
    let size = f.area();

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),    // panes
            Constraint::Length(3), // prompt / follow-up input
            Constraint::Length(3), // info panel
        ])
        .split(size);

    match app.mode {
        Mode::Zoomed => render_zoomed(f, app, layout[0]),
        _ => render_pane_list(f, app, layout[0]),
    }

    let input = render_input(app);
    f.render_widget(input, layout[1]);

    if app.mode != Mode::Help {
        let prefix_cols = INPUT_PREFIX.width();
        let cursor_cols: usize = app.input[..app.cursor.min(app.input.len())]
            .iter()
            .map(|c| c.width().unwrap_or(0))
            .sum();
        let x = layout[1]
            .x
            .saturating_add(1)
            .saturating_add(prefix_cols as u16)
            .saturating_add(cursor_cols as u16);
        let y = layout[1].y.saturating_add(1);
        f.set_cursor_position((x.min(layout[1].x + layout[1].width.saturating_sub(2)), y));
    }

    render_info_panel(f, app, layout[2]);

    if app.mode == Mode::Help {
        let area = centered_rect(60, 50, size);
        f.render_widget(Clear, area);
        f.render_widget(render_help(), area);
    }
}

fn render_pane_list(f: &mut Frame<'_>, app: &App, area: Rect) {
    let height = area.height.saturating_sub(2).max(1) as usize;

    let all_lines = build_list_lines(app);
    let total = all_lines.len();
    let max_scroll = total.saturating_sub(height);
    let scroll = app.scroll_from_bottom.min(max_scroll);
    let top = max_scroll.saturating_sub(scroll);
    let end = (top + height).min(total);
    let visible = all_lines[top..end].to_vec();

    let widget = Paragraph::new(Text::from(visible))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .title("Responses (Up/Down select, Tab zoom, PgUp/PgDn scroll)"),
        )
        .wrap(Wrap { trim: false });
    f.render_widget(widget, area);
}

/// One run of lines per entry: a title, the content (preview for flat
/// entries, full text per section otherwise), a separating blank line. The
/// current zoom target carries a marker.
fn build_list_lines(app: &App) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    if app.store.is_empty() {
        lines.push(Line::from(Span::styled(
            "No responses yet. Type a prompt below and press Enter.",
            Style::default().fg(Color::DarkGray),
        )));
        return lines;
    }

    let mut target_idx = 0usize;
    for (i, entry) in app.store.entries().iter().enumerate() {
        match entry {
            ResponseEntry::Flat { prompt, response } => {
                let selected = target_idx == app.selected;
                lines.push(title_line(&pane_title(i), selected));
                lines.push(prompt_line(prompt));
                lines.push(Line::from(preview(response)));
                target_idx += 1;
            }
            ResponseEntry::Sectioned { prompt, sections } => {
                lines.push(title_line(&pane_title(i), false));
                lines.push(prompt_line(prompt));
                for section in sections {
                    let selected = target_idx == app.selected;
                    lines.push(section_line(&section.name, selected));
                    lines.push(Line::from(section.content.clone()));
                    target_idx += 1;
                }
            }
        }
        lines.push(Line::from(""));
    }

    lines
}

fn pane_title(entry_index: usize) -> String {
    format!("Response {}", entry_index + 1)
}

fn title_line(title: &str, selected: bool) -> Line<'static> {
    let marker = if selected { "▶ " } else { "  " };
    Line::from(vec![
        Span::styled(
            marker.to_string(),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            title.to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
    ])
}

fn prompt_line(prompt: &str) -> Line<'static> {
    Line::from(Span::styled(
        format!("  > {}", preview(prompt)),
        Style::default().fg(Color::DarkGray),
    ))
}

fn section_line(name: &str, selected: bool) -> Line<'static> {
    let marker = if selected { "▶ " } else { "  " };
    Line::from(vec![
        Span::styled(
            marker.to_string(),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            name.to_string(),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
    ])
}

fn render_zoomed(f: &mut Frame<'_>, app: &App, area: Rect) {
    let Some(focus) = app.store.focus() else {
        render_pane_list(f, app, area);
        return;
    };
    let Some(entry) = app.store.entry(focus.entry_index()) else {
        return;
    };

    let (title, content) = match (focus, entry) {
        (Focus::Section { section, .. }, ResponseEntry::Sectioned { sections, .. }) => {
            let s = &sections[section.min(sections.len().saturating_sub(1))];
            (
                format!(
                    "Zoomed View — {} / {} (Esc back)",
                    pane_title(focus.entry_index()),
                    s.name
                ),
                s.content.clone(),
            )
        }
        _ => (
            format!("Zoomed View — {} (Esc back)", pane_title(focus.entry_index())),
            entry.response_text(),
        ),
    };

    let mut lines = vec![prompt_line(entry.prompt()), Line::from("")];
    for l in content.lines() {
        lines.push(Line::from(l.to_string()));
    }
    if content.is_empty() {
        lines.push(Line::from(""));
    }

    let widget = Paragraph::new(Text::from(lines))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Double)
                .title(title),
        )
        .wrap(Wrap { trim: false });
    f.render_widget(widget, area);
}

const INPUT_PREFIX: &str = "> ";

fn render_input(app: &App) -> Paragraph<'static> {
    let input = app.input.iter().collect::<String>();
    let title = match app.mode {
        Mode::Zoomed => "Follow-up (Enter refine, Esc back)",
        _ => "Prompt (Enter submit, F1 help)",
    };

    Paragraph::new(Line::from(vec![
        Span::styled(
            INPUT_PREFIX,
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::raw(input),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .title(title),
    )
    .wrap(Wrap { trim: false })
}

fn render_info_panel(f: &mut Frame<'_>, app: &App, area: Rect) {
    let style_label = match app.style {
        PaneStyle::Flat => "flat",
        PaneStyle::Sectioned => "sectioned",
    };

    let status = if app.waiting {
        format!("{} {}", spinner_frame(app.spinner_step), app.status)
    } else {
        app.status.clone()
    };

    let lines = vec![
        Line::from(format!(" {status}")),
        Line::from(Span::styled(
            format!(
                " model: {}  |  style: {}  |  responses: {}  |  api: {}",
                app.model_label,
                style_label,
                app.store.len(),
                app.api_url
            ),
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let panel = Paragraph::new(Text::from(lines))
        .style(Style::default().bg(Color::Rgb(30, 30, 40)).fg(Color::White));
    f.render_widget(panel, area);
}

fn render_help() -> Paragraph<'static> {
    let lines = vec![
        Line::from(Span::styled(
            "Keys",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("Enter       submit prompt / follow-up"),
        Line::from("Up/Down     select a pane (or section)"),
        Line::from("Tab         zoom into the selection"),
        Line::from("Esc         back from zoom / quit"),
        Line::from("PgUp/PgDn   scroll the pane list"),
        Line::from("Ctrl+C      quit"),
        Line::from(""),
        Line::from("Esc, Enter or q closes this help."),
    ];

    Paragraph::new(Text::from(lines))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .title("Help"),
        )
        .wrap(Wrap { trim: false })
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

#[cfg(test)]
mod tests {
    use crate::panes::{PaneStyle, ResponseEntry};
    use crate::tui::types::App;

    use super::{SPINNER_FRAMES, build_list_lines, pane_title, spinner_frame};

    #[test]
    fn spinner_cycles_through_frames() {
        for step in 0..8u64 {
            assert_eq!(
                spinner_frame(step),
                SPINNER_FRAMES[(step as usize) % SPINNER_FRAMES.len()]
            );
        }
    }

    #[test]
    fn pane_titles_are_one_based() {
        assert_eq!(pane_title(0), "Response 1");
        assert_eq!(pane_title(9), "Response 10");
    }

    #[test]
    fn list_lines_cover_every_entry() {
        let mut app = App::new(
            PaneStyle::Sectioned,
            "https://api.openai.com".to_string(),
            "gpt-3.5-turbo".to_string(),
        );
        app.store.append(ResponseEntry::sectioned("q0", "abcdef"));
        app.store.append(ResponseEntry::sectioned("q1", "ghijkl"));

        // Per entry: title + prompt + 3 * (section header + content) + blank.
        let lines = build_list_lines(&app);
        assert_eq!(lines.len(), 2 * (2 + 6 + 1));
    }

    #[test]
    fn empty_store_renders_hint() {
        let app = App::new(
            PaneStyle::Flat,
            "https://api.openai.com".to_string(),
            "gpt-3.5-turbo".to_string(),
        );
        assert_eq!(build_list_lines(&app).len(), 1);
    }
}
