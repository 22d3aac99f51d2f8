use crate::app::{App, InputMode};
use crate::config::Theme;
use crate::explorer::view::{self, Body, EnvironmentRow, Panel, PipelineRow, ProjectRow, ReleaseRow};
use crate::explorer::Explorer;
use chrono::Utc;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Tabs};

pub fn draw(f: &mut Frame, app: &App, explorer: &Explorer, area: Rect) {
    let view = view::render(explorer, Utc::now());
    let theme = &app.config.theme;
    let refresh = app.config.keybindings.refresh;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Tabs
            Constraint::Length(3), // Search / filter
            Constraint::Min(0),    // Body
        ])
        .split(area);

    draw_tabs(f, app, &view, chunks[0]);
    draw_search(f, app, &view, chunks[1]);

    let body_area = chunks[2];
    match &view.body {
        Body::Projects(panel) => draw_panel(f, theme, refresh, "Projects", panel, view.cursor, body_area, |row| {
            project_item(row, theme)
        }),
        Body::Pipelines(panel) => draw_panel(f, theme, refresh, "Pipelines", panel, view.cursor, body_area, |row| {
            pipeline_item(row, theme)
        }),
        Body::Releases(panel) => draw_panel(f, theme, refresh, "Releases", panel, view.cursor, body_area, |row| {
            release_item(row, theme)
        }),
    }
}

fn draw_tabs(f: &mut Frame, app: &App, view: &view::ExplorerView, area: Rect) {
    let theme = &app.config.theme;
    let titles: Vec<Line> = view.tabs.iter().map(|t| Line::from(t.title.clone())).collect();
    let selected = view.tabs.iter().position(|t| t.active).unwrap_or(0);

    let mut title = match &view.project_name {
        Some(name) => format!(" {name} "),
        None => " No project selected ".to_string(),
    };
    if app.is_loading() {
        title.push_str(&format!("{} ", app.spinner_char()));
    }

    let tabs = Tabs::new(titles)
        .block(super::styled_block(title.trim(), false, theme))
        .select(selected)
        .style(Style::default().fg(theme.parse_color(&theme.text_muted)))
        .highlight_style(
            Style::default()
                .fg(theme.parse_color(&theme.highlight))
                .add_modifier(Modifier::BOLD),
        );
    f.render_widget(tabs, area);
}

fn draw_search(f: &mut Frame, app: &App, view: &view::ExplorerView, area: Rect) {
    let theme = &app.config.theme;
    let searching = app.input_mode == InputMode::Search;

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(match view.production_filter {
            Some(_) => [Constraint::Min(0), Constraint::Length(36)],
            None => [Constraint::Min(0), Constraint::Length(0)],
        })
        .split(area);

    let text = view.search_text.as_str();
    let input = Paragraph::new(text)
        .style(Style::default().fg(theme.parse_color(&theme.text)))
        .block(super::styled_block("Search", searching, theme));
    f.render_widget(input, chunks[0]);

    if searching {
        let cursor_x = chunks[0].x + 1 + text.chars().count() as u16;
        if cursor_x < chunks[0].x + chunks[0].width.saturating_sub(1) {
            f.set_cursor_position((cursor_x, chunks[0].y + 1));
        }
    }

    if let Some(active) = view.production_filter {
        let (mark, color) = if active {
            ("[x]", theme.parse_color(&theme.warning))
        } else {
            ("[ ]", theme.parse_color(&theme.text_muted))
        };
        let toggle = Paragraph::new(Line::from(vec![
            Span::styled(mark, Style::default().fg(color).add_modifier(Modifier::BOLD)),
            Span::raw(" "),
            Span::styled("Production without approvers", Style::default().fg(color)),
        ]))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.parse_color(&theme.border))),
        );
        f.render_widget(toggle, chunks[1]);
    }
}

#[allow(clippy::too_many_arguments)]
fn draw_panel<T>(
    f: &mut Frame,
    theme: &Theme,
    refresh: char,
    label: &str,
    panel: &Panel<T>,
    cursor: usize,
    area: Rect,
    item: impl Fn(&T) -> ListItem<'static>,
) {
    match panel {
        Panel::Loading => {
            let block = super::styled_block(label, true, theme);
            let msg = Paragraph::new(format!("  Loading {}...", label.to_lowercase()))
                .style(Style::default().fg(theme.parse_color(&theme.text_muted)))
                .block(block);
            f.render_widget(msg, area);
        }
        Panel::Failed(message) => {
            let block = super::styled_block(label, true, theme);
            let msg = Paragraph::new(vec![
                Line::from(Span::styled(
                    format!("  {message}"),
                    Style::default().fg(theme.parse_color(&theme.failure)),
                )),
                Line::from(Span::styled(
                    format!("  Press '{refresh}' to retry."),
                    Style::default().fg(theme.parse_color(&theme.text_muted)),
                )),
            ])
            .block(block);
            f.render_widget(msg, area);
        }
        Panel::Rows { rows, total } => {
            let title = format!("{label} ({}/{total})", rows.len());
            let block = super::styled_block(&title, true, theme);

            if rows.is_empty() {
                let msg = if *total > 0 {
                    "  No matches. Press Esc to clear search.".to_string()
                } else {
                    format!("  Nothing here yet. Press '{refresh}' to refresh.")
                };
                let list = List::new(vec![ListItem::new(msg)])
                    .block(block)
                    .style(Style::default().fg(theme.parse_color(&theme.text_muted)));
                f.render_widget(list, area);
                return;
            }

            let items: Vec<ListItem> = rows.iter().map(&item).collect();
            let list = List::new(items)
                .block(block)
                .highlight_style(Style::default().bg(Color::Rgb(40, 44, 52)).add_modifier(Modifier::BOLD))
                .highlight_symbol("▸ ");

            let mut state = ListState::default();
            state.select(Some(cursor.min(rows.len() - 1)));
            f.render_stateful_widget(list, area, &mut state);
        }
    }
}

fn project_item(row: &ProjectRow, theme: &Theme) -> ListItem<'static> {
    let marker = if row.selected { "● " } else { "  " };
    let mut spans = vec![
        Span::styled(marker, Style::default().fg(theme.parse_color(&theme.highlight))),
        Span::styled(row.name.clone(), Style::default().fg(theme.parse_color(&theme.text))),
    ];
    if let Some(description) = &row.description {
        spans.push(Span::styled(
            format!("  {description}"),
            Style::default().fg(theme.parse_color(&theme.text_muted)),
        ));
    }
    ListItem::new(Line::from(spans))
}

fn pipeline_item(row: &PipelineRow, theme: &Theme) -> ListItem<'static> {
    let muted = Style::default().fg(theme.parse_color(&theme.text_muted));
    ListItem::new(Line::from(vec![
        Span::styled("● ", Style::default().fg(theme.tone_color(row.tone))),
        Span::styled(row.name.clone(), Style::default().fg(theme.parse_color(&theme.text))),
        Span::styled(format!("  #{} rev {}", row.id, row.revision), muted),
        Span::styled(format!("  {}", row.status), Style::default().fg(theme.tone_color(row.tone))),
    ]))
}

fn release_item(row: &ReleaseRow, theme: &Theme) -> ListItem<'static> {
    let muted = Style::default().fg(theme.parse_color(&theme.text_muted));
    let mut header = vec![
        Span::styled(row.name.clone(), Style::default().fg(theme.parse_color(&theme.text))),
        Span::styled(format!("  #{}  {}", row.id, row.status), muted),
    ];
    if let Some(age) = &row.age {
        header.push(Span::styled(format!("  {age} ago"), muted));
    }

    let mut lines = vec![Line::from(header)];
    lines.extend(row.environments.iter().map(|env| environment_line(env, theme)));
    ListItem::new(lines)
}

fn environment_line(env: &EnvironmentRow, theme: &Theme) -> Line<'static> {
    let muted = Style::default().fg(theme.parse_color(&theme.text_muted));
    let mut spans = vec![
        Span::raw("    "),
        Span::styled("● ", Style::default().fg(theme.tone_color(env.tone))),
        Span::styled(env.name.clone(), Style::default().fg(theme.parse_color(&theme.text))),
        Span::styled(format!("  {}", env.status), Style::default().fg(theme.tone_color(env.tone))),
    ];

    if env.unguarded {
        spans.push(Span::styled(
            "  ⚠ no approvers",
            Style::default().fg(theme.parse_color(&theme.warning)).add_modifier(Modifier::BOLD),
        ));
    } else if !env.approvers.is_empty() {
        spans.push(Span::styled(format!("  approvers: {}", env.approvers.join(", ")), muted));
    }
    Line::from(spans)
}
