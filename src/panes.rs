//! Session-scoped view state for the dashboard: the ordered list of produced
//! responses and the optional zoom pointer. Created empty when a dashboard
//! session starts, owned by that session, discarded on exit.

pub const PREVIEW_CHARS: usize = 300;
pub const SECTION_NAMES: [&str; 3] = ["Introduction", "Analysis", "Conclusion"];

/// Placeholder stored in place of a completion the gateway failed to produce
/// (sectioned style only; the flat style stores the error text itself).
pub const MISSING_COMPLETION: &str = "(no response)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaneStyle {
    Flat,
    Sectioned,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub name: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseEntry {
    Flat {
        prompt: String,
        response: String,
    },
    Sectioned {
        prompt: String,
        sections: Vec<Section>,
    },
}

impl ResponseEntry {
    pub fn flat(prompt: impl Into<String>, response: impl Into<String>) -> Self {
        Self::Flat {
            prompt: prompt.into(),
            response: response.into(),
        }
    }

    pub fn sectioned(prompt: impl Into<String>, completion: &str) -> Self {
        Self::Sectioned {
            prompt: prompt.into(),
            sections: split_sections(completion),
        }
    }

    pub fn prompt(&self) -> &str {
        match self {
            Self::Flat { prompt, .. } | Self::Sectioned { prompt, .. } => prompt,
        }
    }

    /// Full completion text. For sectioned entries this is the concatenation
    /// of the section contents, which round-trips to the original string.
    pub fn response_text(&self) -> String {
        match self {
            Self::Flat { response, .. } => response.clone(),
            Self::Sectioned { sections, .. } => {
                sections.iter().map(|s| s.content.as_str()).collect()
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Entry(usize),
    Section { entry: usize, section: usize },
}

impl Focus {
    pub fn entry_index(self) -> usize {
        match self {
            Focus::Entry(i) => i,
            Focus::Section { entry, .. } => entry,
        }
    }
}

/// Append-only store plus zoom pointer. Single logical user, mutated only on
/// the event-loop thread; indices handed out at append time stay valid
/// because entries are never removed.
#[derive(Debug, Default)]
pub struct PaneStore {
    entries: Vec<ResponseEntry>,
    focus: Option<Focus>,
}

impl PaneStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, entry: ResponseEntry) -> usize {
        self.entries.push(entry);
        self.entries.len() - 1
    }

    pub fn entries(&self) -> &[ResponseEntry] {
        &self.entries
    }

    pub fn entry(&self, index: usize) -> Option<&ResponseEntry> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn focus(&self) -> Option<Focus> {
        self.focus
    }

    pub fn set_focus(&mut self, focus: Focus) {
        self.focus = Some(focus);
    }

    pub fn clear_focus(&mut self) {
        self.focus = None;
    }

    /// Everything the list view can zoom into, in display order: one target
    /// per entry in flat style, one per (entry, section) in sectioned style.
    pub fn zoom_targets(&self) -> Vec<Focus> {
        let mut targets = Vec::new();
        for (i, entry) in self.entries.iter().enumerate() {
            match entry {
                ResponseEntry::Flat { .. } => targets.push(Focus::Entry(i)),
                ResponseEntry::Sectioned { sections, .. } => {
                    for s in 0..sections.len() {
                        targets.push(Focus::Section {
                            entry: i,
                            section: s,
                        });
                    }
                }
            }
        }
        targets
    }
}

/// First `PREVIEW_CHARS` characters, with an ellipsis when something was
/// actually cut off.
pub fn preview(text: &str) -> String {
    let mut out: String = text.chars().take(PREVIEW_CHARS).collect();
    if text.chars().count() > PREVIEW_CHARS {
        out.push('…');
    }
    out
}

/// Proportional character slicing at floor(L/3) and floor(2L/3). Not a
/// semantic split; the boundaries fall wherever the arithmetic puts them.
pub fn split_sections(completion: &str) -> Vec<Section> {
    let total = completion.chars().count();
    let first = byte_offset(completion, total / 3);
    let second = byte_offset(completion, total * 2 / 3);

    vec![
        Section {
            name: SECTION_NAMES[0].to_string(),
            content: completion[..first].to_string(),
        },
        Section {
            name: SECTION_NAMES[1].to_string(),
            content: completion[first..second].to_string(),
        },
        Section {
            name: SECTION_NAMES[2].to_string(),
            content: completion[second..].to_string(),
        },
    ]
}

fn byte_offset(text: &str, char_index: usize) -> usize {
    text.char_indices()
        .nth(char_index)
        .map(|(i, _)| i)
        .unwrap_or(text.len())
}

#[cfg(test)]
mod tests {
    use super::{
        Focus, PREVIEW_CHARS, PaneStore, ResponseEntry, SECTION_NAMES, preview, split_sections,
    };

    #[test]
    fn append_preserves_order_and_only_grows() {
        let mut store = PaneStore::new();
        for n in 0..5 {
            let idx = store.append(ResponseEntry::flat(format!("q{n}"), format!("a{n}")));
            assert_eq!(idx, n);
        }
        assert_eq!(store.len(), 5);
        for (i, entry) in store.entries().iter().enumerate() {
            assert_eq!(entry.prompt(), format!("q{i}"));
        }
    }

    #[test]
    fn focus_lifecycle() {
        let mut store = PaneStore::new();
        store.append(ResponseEntry::flat("hello", "hi there"));
        assert_eq!(store.focus(), None);

        store.set_focus(Focus::Entry(0));
        assert_eq!(store.focus(), Some(Focus::Entry(0)));
        assert!(store.entry(store.focus().unwrap().entry_index()).is_some());

        store.clear_focus();
        assert_eq!(store.focus(), None);
    }

    #[test]
    fn split_lengths_follow_third_boundaries() {
        for len in [0usize, 1, 2, 3, 7, 10, 299, 300] {
            let text: String = std::iter::repeat('x').take(len).collect();
            let sections = split_sections(&text);
            assert_eq!(sections.len(), 3);
            assert_eq!(sections[0].content.chars().count(), len / 3);
            assert_eq!(
                sections[1].content.chars().count(),
                len * 2 / 3 - len / 3
            );
            assert_eq!(
                sections[2].content.chars().count(),
                len - len * 2 / 3
            );
        }
    }

    #[test]
    fn split_round_trips_exactly() {
        for text in ["", "ab", "hello world, this is a completion", "héllo wörld ← ünïcode ☃"] {
            let sections = split_sections(text);
            let rejoined: String = sections.iter().map(|s| s.content.as_str()).collect();
            assert_eq!(rejoined, text);
        }
    }

    #[test]
    fn section_names_are_fixed() {
        let sections = split_sections("some completion text");
        let names: Vec<&str> = sections.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, SECTION_NAMES);
    }

    #[test]
    fn sectioned_entry_rejoins_to_original() {
        let entry = ResponseEntry::sectioned("q", "résponse with multibyte chars ✓");
        assert_eq!(entry.response_text(), "résponse with multibyte chars ✓");
    }

    #[test]
    fn preview_truncates_at_300_chars() {
        let short = "short response";
        assert_eq!(preview(short), short);

        let long: String = std::iter::repeat('y').take(PREVIEW_CHARS + 50).collect();
        let p = preview(&long);
        assert_eq!(p.chars().count(), PREVIEW_CHARS + 1);
        assert!(p.ends_with('…'));
    }

    #[test]
    fn zoom_targets_flatten_sections() {
        let mut store = PaneStore::new();
        store.append(ResponseEntry::flat("q0", "a0"));
        store.append(ResponseEntry::sectioned("q1", "abcdef"));

        let targets = store.zoom_targets();
        assert_eq!(targets.len(), 4);
        assert_eq!(targets[0], Focus::Entry(0));
        assert_eq!(
            targets[1],
            Focus::Section {
                entry: 1,
                section: 0
            }
        );
        assert_eq!(
            targets[3],
            Focus::Section {
                entry: 1,
                section: 2
            }
        );
    }
}
