mod connect;
mod explorer;
mod help;

use crate::app::{App, InputMode, Screen};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph},
};

pub fn draw(f: &mut Frame, app: &mut App) {
    let size = f.area();

    // Main vertical layout: content + status bar (1)
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // Main content
            Constraint::Length(1), // Status/help bar
        ])
        .split(size);

    match &app.screen {
        Screen::Connect(form) => connect::draw(f, form, &app.config.theme, chunks[0]),
        Screen::Explore(ex) => explorer::draw(f, app, ex, chunks[0]),
    }

    // Bottom: Status/help bar
    draw_status_bar(f, app, chunks[1]);

    // Overlays
    if app.input_mode == InputMode::Help {
        help::draw_popup(f, app, size);
    }
}

fn draw_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let style = if app.status_is_error {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let content = if let Some(msg) = &app.status_message {
        msg.clone()
    } else {
        let kb = &app.config.keybindings;
        match (&app.screen, app.input_mode) {
            (Screen::Connect(_), _) => "Tab:next field  Enter:connect  Esc:quit".into(),
            (Screen::Explore(_), InputMode::Search) => "Enter:apply  Esc:clear".into(),
            (Screen::Explore(_), InputMode::Help) => "Esc:close".into(),
            (Screen::Explore(explorer), InputMode::Normal) => {
                let filter_hint = if explorer.active_tab() == crate::explorer::Tab::Releases {
                    format!("{}:prod w/o approvers  ", kb.production_filter)
                } else {
                    String::new()
                };
                format!(
                    "{}/{}:nav  1-3/Tab:tabs  Enter:select  {}:search  {filter_hint}{}:refresh  {}:open  {}:copy id  {}:disconnect  {}:help  {}:quit",
                    kb.down, kb.up, kb.search, kb.refresh, kb.open, kb.copy_id, kb.disconnect, kb.help, kb.quit
                )
            }
        }
    };

    let paragraph = Paragraph::new(content).style(style);
    f.render_widget(paragraph, area);
}

// Helper: create a centered rect
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}

// Helper: styled block with focus indicator
pub fn styled_block<'a>(title: &'a str, focused: bool, theme: &'a crate::config::Theme) -> Block<'a> {
    let border_color = if focused {
        theme.parse_color(&theme.border_active)
    } else {
        theme.parse_color(&theme.border)
    };

    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(format!(" {title} "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::explorer::tests::{explorer, loaded_explorer, release};
    use crate::explorer::FetchOutcome;
    use ratatui::backend::TestBackend;

    fn rendered(app: &mut App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        let buffer = terminal.backend().buffer();
        buffer
            .content
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_connect_screen_renders_form() {
        let mut app = App::new(Config::default(), None);
        let screen = rendered(&mut app);
        assert!(screen.contains("Azure DevOps Configuration"));
        assert!(screen.contains("Base URL"));
        assert!(screen.contains("API Key"));
    }

    #[test]
    fn test_connect_screen_masks_key_and_shows_errors() {
        let mut app = App::new(Config::default(), None);
        {
            let form = app.connect_form_mut().unwrap();
            form.focus = crate::connect::Field::ApiKey;
            form.push_char('s');
            form.push_char('3');
        }
        app.submit_connect();

        let screen = rendered(&mut app);
        assert!(!screen.contains("s3"));
        assert!(screen.contains("Please enter a valid URL"));
    }

    #[test]
    fn test_releases_tab_renders_filter_toggle() {
        let mut app = App::new(Config::default(), None);
        let mut explorer = loaded_explorer(vec![release(1, "Production", 0)]);
        explorer.select_tab(crate::explorer::Tab::Releases);
        app.screen = Screen::Explore(explorer);

        let screen = rendered(&mut app);
        assert!(screen.contains("Production without approvers"));
        assert!(screen.contains("Release-1"));
        assert!(screen.contains("no approvers"));
    }

    #[test]
    fn test_hints_follow_configured_keys() {
        let mut config = Config::default();
        config.keybindings.refresh = 'R';
        config.keybindings.help = 'h';
        let mut app = App::new(config, None);
        let mut ex = explorer();
        let ticket = ex.start().remove(0);
        ex.apply(FetchOutcome { ticket, result: Err("HTTP 500".into()) });
        app.screen = Screen::Explore(ex);
        app.input_mode = InputMode::Help;

        let screen = rendered(&mut app);
        assert!(screen.contains("Press 'R' to retry."));
        assert!(screen.contains("Press h or Esc to close"));
    }
}
