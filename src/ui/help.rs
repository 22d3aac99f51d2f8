use crate::app::App;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

pub fn draw_popup(f: &mut Frame, app: &App, area: Rect) {
    let kb = &app.config.keybindings;
    let help_text = format!(
        r#"
NAVIGATION
  {}/{} ↑/↓       Move down/up
  {}/{}           Go to top/bottom
  Ctrl+d/u      Page down/up
  1/2/3         Projects/Pipelines/Releases
  Tab           Next tab
  Enter         Select project

FILTERS
  {}             Search by name
  {}             Production without approvers
                (Releases tab)
  Esc           Clear search

ACTIONS
  {}             Open in browser
  {}             Copy ID
  {}             Refresh data
  {}             Disconnect
  {}             Toggle help
  {}             Quit
"#,
        kb.down,
        kb.up,
        kb.top,
        kb.bottom,
        kb.search,
        kb.production_filter,
        kb.open,
        kb.copy_id,
        kb.refresh,
        kb.disconnect,
        kb.help,
        kb.quit,
    );

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.config.theme.parse_color(&app.config.theme.border_active)))
        .title(format!(" Help - Press {} or Esc to close ", kb.help));

    let inner = super::centered_rect(50, 26, area);
    f.render_widget(Clear, inner);

    let paragraph = Paragraph::new(help_text)
        .block(block)
        .wrap(Wrap { trim: false });
    f.render_widget(paragraph, inner);
}
