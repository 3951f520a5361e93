use std::time::Instant;

use crate::errors::CliError;
use crate::gateway::ChatTurn;
use crate::panes::{PaneStore, PaneStyle};

/// Output cap applied in sectioned style only.
pub const SECTIONED_MAX_TOKENS: u32 = 150;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    List,
    Zoomed,
    Help,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallOrigin {
    Submit,
    Refine,
}

/// Bookkeeping for the single in-flight gateway call. Present exactly while
/// `waiting` is true.
#[derive(Debug, Clone)]
pub struct PendingCall {
    pub prompt: String,
    pub origin: CallOrigin,
}

/// Everything `spawn_completion` hands to the gateway task.
#[derive(Debug, Clone)]
pub struct CompletionCall {
    pub prompt: String,
    pub context: Vec<ChatTurn>,
    pub max_tokens: Option<u32>,
}

#[derive(Debug)]
pub enum TuiMsg {
    Completed(Result<String, CliError>),
}

#[derive(Debug)]
pub struct App {
    pub mode: Mode,
    pub should_quit: bool,

    pub style: PaneStyle,
    pub store: PaneStore,
    /// Index into `store.zoom_targets()` for the list-view selection.
    pub selected: usize,

    pub input: Vec<char>,
    pub cursor: usize,
    pub waiting: bool,
    pub pending: Option<PendingCall>,

    pub status: String,
    pub spinner_step: u64,
    pub spinner_last: Instant,
    pub scroll_from_bottom: usize,

    pub api_url: String,
    pub model_label: String,
}

impl App {
    pub fn new(style: PaneStyle, api_url: String, model_label: String) -> Self {
        Self {
            mode: Mode::List,
            should_quit: false,
            style,
            store: PaneStore::new(),
            selected: 0,
            input: Vec::new(),
            cursor: 0,
            waiting: false,
            pending: None,
            status: "Enter a prompt. Tab zooms, F1 help, Esc quits.".to_string(),
            spinner_step: 0,
            spinner_last: Instant::now(),
            scroll_from_bottom: 0,
            api_url,
            model_label,
        }
    }

    pub fn max_tokens(&self) -> Option<u32> {
        match self.style {
            PaneStyle::Flat => None,
            PaneStyle::Sectioned => Some(SECTIONED_MAX_TOKENS),
        }
    }

    pub fn take_input(&mut self) -> String {
        let text = self.input.iter().collect::<String>();
        self.input.clear();
        self.cursor = 0;
        text
    }
}
