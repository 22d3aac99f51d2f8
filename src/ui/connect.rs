use crate::config::Theme;
use crate::connect::{ConnectForm, Field};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

const FORM_WIDTH: u16 = 64;
const FORM_HEIGHT: u16 = 14;

pub fn draw(f: &mut Frame, form: &ConnectForm, theme: &Theme, area: Rect) {
    let outer = super::centered_rect(FORM_WIDTH, FORM_HEIGHT, area);
    f.render_widget(Clear, outer);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.parse_color(&theme.border_active)))
        .title(" Azure DevOps Configuration ")
        .title_style(Style::default().fg(theme.parse_color(&theme.highlight)).add_modifier(Modifier::BOLD));
    let inner = block.inner(outer);
    f.render_widget(block, outer);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Base URL
            Constraint::Length(1), // Base URL error
            Constraint::Length(3), // API key
            Constraint::Length(1), // API key error
            Constraint::Min(0),    // Hint
        ])
        .split(inner);

    draw_input(f, form, theme, Field::BaseUrl, chunks[0], chunks[1]);
    draw_input(f, form, theme, Field::ApiKey, chunks[2], chunks[3]);

    let hint = if form.errors.is_empty() {
        Paragraph::new("The key is kept in memory for this session only.")
            .style(Style::default().fg(theme.parse_color(&theme.text_muted)))
    } else {
        Paragraph::new("Fix the highlighted fields and press Enter.")
            .style(Style::default().fg(theme.parse_color(&theme.warning)))
    };
    f.render_widget(hint, chunks[4]);
}

fn draw_input(f: &mut Frame, form: &ConnectForm, theme: &Theme, field: Field, area: Rect, error_area: Rect) {
    let focused = form.focus == field;
    let (title, shown) = match field {
        Field::BaseUrl => ("Base URL", form.base_url.clone()),
        // Never echo the key
        Field::ApiKey => ("API Key", "•".repeat(form.api_key.chars().count())),
    };
    let placeholder = match field {
        Field::BaseUrl => "https://dev.azure.com/your-org",
        Field::ApiKey => "personal access token",
    };

    let block = super::styled_block(title, focused, theme);
    let paragraph = if shown.is_empty() && !focused {
        Paragraph::new(placeholder).style(Style::default().fg(theme.parse_color(&theme.text_muted)))
    } else {
        Paragraph::new(shown.as_str()).style(Style::default().fg(theme.parse_color(&theme.text)))
    };
    f.render_widget(paragraph.block(block), area);

    if let Some(error) = form.errors.for_field(field) {
        let line = Paragraph::new(format!(" {error}"))
            .style(Style::default().fg(theme.parse_color(&theme.failure)));
        f.render_widget(line, error_area);
    }

    if focused {
        let cursor_x = area.x + 1 + shown.chars().count() as u16;
        let cursor_y = area.y + 1;
        if cursor_x < area.x + area.width.saturating_sub(1) {
            f.set_cursor_position((cursor_x, cursor_y));
        }
    }
}
