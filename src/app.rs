use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::action::{Action, Direction};
use crate::config::{Config, parse_key};
use crate::system::process::ProcessRecord;
use crate::system::registry::{ProcessRegistry, SortBy};
use crate::system::snapshot::Snapshot;
use crate::ui::theme::Theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Filter,
    Help,
}

#[derive(Debug, Clone)]
pub struct ResolvedKeybinds {
    pub quit: KeyCode,
    pub filter: KeyCode,
    pub help: KeyCode,
    pub cycle_sort: KeyCode,
    pub reverse_sort: KeyCode,
}

impl ResolvedKeybinds {
    pub fn from_config(kb: &crate::config::KeybindsConfig) -> Self {
        Self {
            quit: parse_key(&kb.quit).unwrap_or(KeyCode::Char('q')),
            filter: parse_key(&kb.filter).unwrap_or(KeyCode::Char('/')),
            help: parse_key(&kb.help).unwrap_or(KeyCode::Char('?')),
            cycle_sort: parse_key(&kb.cycle_sort).unwrap_or(KeyCode::Char('s')),
            reverse_sort: parse_key(&kb.reverse_sort).unwrap_or(KeyCode::Char('r')),
        }
    }

    /// Returns (key_label, description) pairs for all configurable keybinds.
    pub fn help_entries(&self) -> Vec<(String, &'static str)> {
        let mut entries = vec![
            (key_label(self.quit), "Quit"),
            (key_label(self.filter), "Filter processes"),
            (key_label(self.cycle_sort), "Cycle sort column"),
            (key_label(self.reverse_sort), "Reverse sort order"),
            (key_label(self.help), "Toggle help"),
        ];
        entries.push(("↑↓".to_string(), "Move selection"));
        entries.push(("PgUp/PgDn".to_string(), "Page"));
        entries.push(("Home/End".to_string(), "First / last"));
        entries.push(("Ctrl+C".to_string(), "Quit (always)"));
        entries
    }
}

fn key_label(code: KeyCode) -> String {
    match code {
        KeyCode::Char(' ') => "Space".to_string(),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Esc => "Esc".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::Backspace => "Bksp".to_string(),
        KeyCode::Delete => "Del".to_string(),
        _ => "?".to_string(),
    }
}

pub struct App {
    pub running: bool,
    pub snapshot: Arc<Snapshot>,
    pub registry: ProcessRegistry,
    /// Rows in display order: ranked matches while filtering, else sorted.
    pub rows: Vec<ProcessRecord>,
    pub selected_index: usize,
    pub scroll_offset: usize,
    pub viewport_rows: usize,
    pub max_rows: usize,
    pub input_mode: InputMode,
    pub filter_text: String,
    pub sort_by: SortBy,
    pub sort_descending: bool,
    pub theme: Theme,
    pub keybinds: ResolvedKeybinds,
}

impl App {
    pub fn new(config: &Config, snapshot: Arc<Snapshot>) -> Self {
        let mut app = App {
            running: true,
            snapshot: Arc::new(Snapshot::default()),
            registry: ProcessRegistry::with_threshold(config.filter.threshold),
            rows: Vec::new(),
            selected_index: 0,
            scroll_offset: 0,
            viewport_rows: 0,
            max_rows: config.general.max_rows,
            input_mode: InputMode::Normal,
            filter_text: String::new(),
            sort_by: SortBy::from_str_config(&config.general.default_sort),
            sort_descending: config.general.sort_descending,
            theme: Theme::from_config(&config.colors.theme),
            keybinds: ResolvedKeybinds::from_config(&config.keybinds),
        };
        app.apply_snapshot(snapshot);
        app
    }

    /// Takes a newer snapshot, keeping the selection on the same pid when
    /// that process is still listed. Older snapshots are ignored.
    pub fn apply_snapshot(&mut self, snapshot: Arc<Snapshot>) {
        if snapshot.sequence < self.snapshot.sequence {
            return;
        }
        self.registry.set_processes(snapshot.processes.clone());
        self.snapshot = snapshot;
        self.refresh_rows();
    }

    fn refresh_rows(&mut self) {
        let selected = self.selected_pid();
        self.rows = if self.filter_text.is_empty() {
            self.registry.sort(self.sort_by, self.sort_descending)
        } else {
            self.registry.filter(&self.filter_text)
        };

        self.selected_index = selected
            .and_then(|pid| self.rows.iter().position(|p| p.pid == pid))
            .unwrap_or(self.selected_index)
            .min(self.rows.len().saturating_sub(1));
        self.clamp_scroll();
    }

    /// Called by the renderer with the number of table rows that fit.
    pub fn set_viewport(&mut self, rows: usize) {
        self.viewport_rows = if self.max_rows > 0 {
            rows.min(self.max_rows)
        } else {
            rows
        };
        self.clamp_scroll();
    }

    fn clamp_scroll(&mut self) {
        let page = self.viewport_rows.max(1);
        if self.selected_index < self.scroll_offset {
            self.scroll_offset = self.selected_index;
        } else if self.selected_index >= self.scroll_offset + page {
            self.scroll_offset = self.selected_index + 1 - page;
        }
        let max_offset = self.rows.len().saturating_sub(page);
        self.scroll_offset = self.scroll_offset.min(max_offset);
    }

    pub fn visible_rows(&self) -> &[ProcessRecord] {
        let start = self.scroll_offset.min(self.rows.len());
        let end = (start + self.viewport_rows).min(self.rows.len());
        &self.rows[start..end]
    }

    pub fn map_key(&self, key: KeyEvent) -> Action {
        // Ctrl+C always quits (hardwired safety)
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Action::Quit;
        }

        match self.input_mode {
            InputMode::Normal => self.map_key_normal(key),
            InputMode::Filter => self.map_key_filter(key),
            InputMode::Help => self.map_key_help(key),
        }
    }

    fn map_key_normal(&self, key: KeyEvent) -> Action {
        let code = key.code;
        let kb = &self.keybinds;

        // Movement keys are hardwired (not configurable)
        match code {
            KeyCode::Up => return Action::Navigate(Direction::Up),
            KeyCode::Down => return Action::Navigate(Direction::Down),
            KeyCode::PageUp => return Action::Navigate(Direction::PageUp),
            KeyCode::PageDown => return Action::Navigate(Direction::PageDown),
            KeyCode::Home => return Action::Navigate(Direction::Top),
            KeyCode::End => return Action::Navigate(Direction::Bottom),
            _ => {}
        }

        if code == kb.quit {
            return Action::Quit;
        }
        if code == kb.filter {
            return Action::EnterFilterMode;
        }
        if code == kb.help {
            return Action::ToggleHelp;
        }
        if code == kb.cycle_sort {
            return Action::CycleSort;
        }
        if code == kb.reverse_sort {
            return Action::ReverseSort;
        }
        if code == KeyCode::Esc && !self.filter_text.is_empty() {
            return Action::ClearFilter;
        }

        Action::None
    }

    fn map_key_help(&self, key: KeyEvent) -> Action {
        let code = key.code;
        // In help mode, only the help key and Esc dismiss, everything else is ignored
        if code == self.keybinds.help || code == KeyCode::Esc {
            return Action::ToggleHelp;
        }
        Action::None
    }

    fn map_key_filter(&self, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Esc => Action::ClearFilter,
            KeyCode::Enter => Action::ApplyFilter,
            KeyCode::Up => Action::Navigate(Direction::Up),
            KeyCode::Down => Action::Navigate(Direction::Down),
            KeyCode::Backspace => {
                let mut text = self.filter_text.clone();
                text.pop();
                Action::UpdateFilter(text)
            }
            KeyCode::Char(c) => {
                let mut text = self.filter_text.clone();
                text.push(c);
                Action::UpdateFilter(text)
            }
            _ => Action::None,
        }
    }

    pub fn dispatch(&mut self, action: Action) {
        match action {
            Action::Quit => self.running = false,
            Action::Navigate(dir) => self.navigate(dir),
            Action::EnterFilterMode => {
                self.input_mode = InputMode::Filter;
            }
            Action::ApplyFilter => {
                self.input_mode = InputMode::Normal;
            }
            Action::ClearFilter => {
                self.filter_text.clear();
                self.input_mode = InputMode::Normal;
                self.refresh_rows();
            }
            Action::UpdateFilter(text) => {
                self.filter_text = text;
                self.selected_index = 0;
                self.scroll_offset = 0;
                self.refresh_rows();
            }
            Action::CycleSort => {
                self.sort_by = self.sort_by.next();
                self.refresh_rows();
            }
            Action::ReverseSort => {
                self.sort_descending = !self.sort_descending;
                self.refresh_rows();
            }
            Action::ToggleHelp => {
                self.input_mode = if self.input_mode == InputMode::Help {
                    InputMode::Normal
                } else {
                    InputMode::Help
                };
            }
            Action::None => {}
        }
    }

    fn navigate(&mut self, direction: Direction) {
        if self.rows.is_empty() {
            return;
        }
        let last = self.rows.len() - 1;
        let page = self.viewport_rows.max(1);
        self.selected_index = match direction {
            Direction::Up => self.selected_index.saturating_sub(1),
            Direction::Down => (self.selected_index + 1).min(last),
            Direction::PageUp => self.selected_index.saturating_sub(page),
            Direction::PageDown => (self.selected_index + page).min(last),
            Direction::Top => 0,
            Direction::Bottom => last,
        };
        self.clamp_scroll();
    }

    pub fn selected_pid(&self) -> Option<u32> {
        self.rows.get(self.selected_index).map(|p| p.pid)
    }

    pub fn selected_process(&self) -> Option<&ProcessRecord> {
        self.rows.get(self.selected_index)
    }

    pub fn show_help(&self) -> bool {
        self.input_mode == InputMode::Help
    }

    pub fn help_entries(&self) -> Vec<(String, &'static str)> {
        self.keybinds.help_entries()
    }
}
