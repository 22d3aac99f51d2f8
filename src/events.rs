use crate::app::{App, InputMode, Screen};
use crate::explorer::Tab;
use crate::ui;
use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::prelude::*;
use std::time::{Duration, Instant};

pub fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    let mut last_spinner_tick = Instant::now();
    let spinner_interval = Duration::from_millis(80);

    loop {
        // Tick spinner while any fetch is outstanding
        if app.is_loading() && last_spinner_tick.elapsed() >= spinner_interval {
            app.tick_spinner();
            last_spinner_tick = Instant::now();
        }

        // Pick up finished fetches (non-blocking)
        app.poll_fetches();

        // Clear status messages after the configured timeout
        app.clear_expired_status();

        terminal.draw(|f| ui::draw(f, app))?;

        // Poll for events with short timeout for responsive UI
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && handle_key(app, key) {
                    return Ok(());
                }
            }
        }
    }
}

/// Returns true when the app should quit
pub fn handle_key(app: &mut App, key: KeyEvent) -> bool {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    if matches!(app.screen, Screen::Connect(_)) {
        return handle_connect_key(app, key);
    }

    match app.input_mode {
        InputMode::Help => {
            let kb = &app.config.keybindings;
            match key.code {
                KeyCode::Esc => app.input_mode = InputMode::Normal,
                KeyCode::Char(c) if c == kb.help || c == kb.quit => app.input_mode = InputMode::Normal,
                _ => {}
            }
            false
        }
        InputMode::Search => {
            handle_search_key(app, key);
            false
        }
        InputMode::Normal => handle_explorer_key(app, key),
    }
}

fn handle_connect_key(app: &mut App, key: KeyEvent) -> bool {
    if key.code == KeyCode::Esc {
        return true;
    }
    if key.code == KeyCode::Enter {
        app.submit_connect();
        return false;
    }

    if let Some(form) = app.connect_form_mut() {
        match key.code {
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => form.focus_next(),
            KeyCode::Backspace => form.pop_char(),
            KeyCode::Char(c) => form.push_char(c),
            _ => {}
        }
    }
    false
}

fn handle_search_key(app: &mut App, key: KeyEvent) {
    let Some(explorer) = app.explorer_mut() else {
        return;
    };
    match key.code {
        KeyCode::Esc => {
            explorer.set_search_text(String::new());
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Enter => app.input_mode = InputMode::Normal,
        KeyCode::Backspace => explorer.pop_search_char(),
        KeyCode::Char(c) => explorer.push_search_char(c),
        _ => {}
    }
}

fn handle_explorer_key(app: &mut App, key: KeyEvent) -> bool {
    let kb = app.config.keybindings.clone();
    let page = app.config.settings.page_jump;
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match key.code {
        KeyCode::Char('d') if ctrl => with_explorer(app, |e| e.cursor_down(page)),
        KeyCode::Char('u') if ctrl => with_explorer(app, |e| e.cursor_up(page)),

        KeyCode::Char(c) if c == kb.quit => return true,
        KeyCode::Char(c) if c == kb.help => app.input_mode = InputMode::Help,

        // Tabs
        KeyCode::Char('1') => app.select_tab(Tab::Projects),
        KeyCode::Char('2') => app.select_tab(Tab::Pipelines),
        KeyCode::Char('3') => app.select_tab(Tab::Releases),
        KeyCode::Tab => with_explorer(app, |e| e.next_tab()),
        KeyCode::BackTab => with_explorer(app, |e| e.prev_tab()),

        // Navigation
        KeyCode::Char(c) if c == kb.down => with_explorer(app, |e| e.cursor_down(1)),
        KeyCode::Down => with_explorer(app, |e| e.cursor_down(1)),
        KeyCode::Char(c) if c == kb.up => with_explorer(app, |e| e.cursor_up(1)),
        KeyCode::Up => with_explorer(app, |e| e.cursor_up(1)),
        KeyCode::Char(c) if c == kb.top => with_explorer(app, |e| e.cursor_top()),
        KeyCode::Home => with_explorer(app, |e| e.cursor_top()),
        KeyCode::Char(c) if c == kb.bottom => with_explorer(app, |e| e.cursor_bottom()),
        KeyCode::End => with_explorer(app, |e| e.cursor_bottom()),
        KeyCode::Enter => app.activate(),

        // Filters
        KeyCode::Char(c) if c == kb.search => app.input_mode = InputMode::Search,
        KeyCode::Char(c) if c == kb.production_filter => app.toggle_production_filter(),
        KeyCode::Esc => with_explorer(app, |e| e.set_search_text(String::new())),

        // Actions
        KeyCode::Char(c) if c == kb.refresh => app.refresh(),
        KeyCode::Char(c) if c == kb.open => app.open_current_row(),
        KeyCode::Char(c) if c == kb.copy_id => app.copy_current_id(),
        KeyCode::Char(c) if c == kb.disconnect => app.disconnect(),
        _ => {}
    }
    false
}

fn with_explorer(app: &mut App, f: impl FnOnce(&mut crate::explorer::Explorer)) {
    if let Some(explorer) = app.explorer_mut() {
        f(explorer);
    }
}
