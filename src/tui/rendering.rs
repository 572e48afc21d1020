use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Margin, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{
        Block, Borders, Clear, List, ListItem, Paragraph, Scrollbar, ScrollbarOrientation, Wrap,
    },
    Frame,
};

use super::app::App;
use super::models::{Focus, InputMode};
use super::param_input::param_hint;
use super::utils::centered_rect;

pub fn ui(f: &mut Frame, app: &App) {
    let size = f.area();

    render_main_screen(f, size, app);

    match &app.input_mode {
        InputMode::Normal => {}
        InputMode::ChooseRuleType => render_rule_type_popup(f),
        InputMode::EditParams { .. } => render_param_popup(f, app),
    }

    if app.show_help {
        render_help_popup(f, app);
    }
}

pub fn render_main_screen(f: &mut Frame, area: Rect, app: &App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Length(3),
        ])
        .split(area);

    render_header(f, rows[0], app);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(rows[1]);

    render_episode_list(f, columns[0], app);

    if app.show_preview {
        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(5), Constraint::Length(8)])
            .split(columns[1]);
        render_rule_list(f, right[0], app);
        render_preview_panel(f, right[1], app);
    } else {
        render_rule_list(f, columns[1], app);
    }

    render_status_bar(f, rows[2], app);
}

pub fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let title = format!(
        "Batch Rename - {} episodes, {} rules{}",
        app.stats.total,
        app.session.rules().len(),
        if app.unsaved { " [modified]" } else { "" }
    );

    let header = Paragraph::new(title)
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .style(Style::default().fg(Color::White))
                .border_style(Style::default().fg(Color::Cyan)),
        );
    f.render_widget(header, area);
}

fn focus_border(app: &App, focus: Focus) -> Style {
    if app.focus == focus {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::Blue)
    }
}

pub fn render_episode_list(f: &mut Frame, area: Rect, app: &App) {
    let items: Vec<ListItem> = app
        .session
        .items()
        .iter()
        .enumerate()
        .map(|(row, item)| {
            let mut spans = vec![
                Span::styled(format!("{:>4} ", item.episode_index), Style::default().fg(Color::DarkGray)),
                Span::styled(item.title.clone(), Style::default().fg(Color::White)),
            ];

            if let Some(proposed) = app.preview.title_for(row, item) {
                if proposed != item.title {
                    spans.push(Span::styled(" -> ", Style::default().fg(Color::DarkGray)));
                    spans.push(Span::styled(proposed.to_string(), Style::default().fg(Color::Yellow)));
                }
            }

            ListItem::new(Line::from(spans))
        })
        .collect();

    let title = format!("Episodes ({} will change)", app.stats.changed);
    let list = List::new(items)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(focus_border(app, Focus::Episodes)),
        )
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    f.render_stateful_widget(list, area, &mut app.episode_state.clone());

    if app.session.items().len() > area.height.saturating_sub(2) as usize {
        let scrollbar = Scrollbar::default()
            .orientation(ScrollbarOrientation::VerticalRight)
            .begin_symbol(Some("^"))
            .end_symbol(Some("v"));

        f.render_stateful_widget(
            scrollbar,
            area.inner(Margin {
                vertical: 1,
                horizontal: 0,
            }),
            &mut app.scroll_state.clone(),
        );
    }
}

pub fn render_rule_list(f: &mut Frame, area: Rect, app: &App) {
    let items: Vec<ListItem> = app
        .session
        .rules()
        .rules()
        .iter()
        .enumerate()
        .map(|(i, rule)| {
            let (mark, style) = if rule.enabled {
                ("[x]", Style::default().fg(Color::Green))
            } else {
                ("[ ]", Style::default().fg(Color::DarkGray))
            };
            ListItem::new(Line::from(vec![
                Span::styled(format!("{} {}. ", mark, i + 1), style),
                Span::styled(rule.summary(), style),
            ]))
        })
        .collect();

    let title = if app.session.clear_rules_on_apply() {
        "Rules (cleared after apply)"
    } else {
        "Rules"
    };

    let list = List::new(items)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(focus_border(app, Focus::Rules)),
        )
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");

    f.render_stateful_widget(list, area, &mut app.rule_state.clone());
}

pub fn render_preview_panel(f: &mut Frame, area: Rect, app: &App) {
    let (Some(row), Some(item)) = (app.episode_state.selected(), app.selected_item()) else {
        return;
    };

    let proposed = app.preview.title_for(row, item).unwrap_or(item.title.as_str());
    let proposed_style = if proposed == item.title {
        Style::default().fg(Color::Gray)
    } else {
        Style::default().fg(Color::Green)
    };

    let mut lines = vec![
        Line::from(vec![
            Span::raw("Before: "),
            Span::styled(item.title.clone(), Style::default().fg(Color::Red)),
        ]),
        Line::from(vec![
            Span::raw("After:  "),
            Span::styled(proposed.to_string(), proposed_style),
        ]),
    ];

    for failure in app
        .preview
        .failures()
        .iter()
        .filter(|pf| pf.row == row)
    {
        lines.push(Line::from(Span::styled(
            format!("{} rule failed: {}", failure.failure.rule_type, failure.failure.message),
            Style::default().fg(Color::Red),
        )));
    }

    let panel = Paragraph::new(Text::from(lines))
        .block(
            Block::default()
                .title(format!("Episode {}", item.episode_id))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Green)),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(panel, area);
}

pub fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(area);

    let (text, style) = match &app.status_message {
        Some(msg) => (msg.clone(), Style::default().fg(Color::Cyan)),
        None => (
            format!("{} of {} titles will change", app.stats.changed, app.stats.total),
            Style::default().fg(Color::Green),
        ),
    };

    let status = Paragraph::new(text)
        .style(style)
        .block(Block::default().borders(Borders::ALL).title("Status"));
    f.render_widget(status, chunks[0]);

    let controls_text = if app.session.can_undo() {
        "Enter apply, u undo, h help, q quit"
    } else {
        "a add rule, Enter apply, h help, q quit"
    };

    let controls = Paragraph::new(controls_text)
        .style(Style::default().fg(Color::Gray))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("Controls"));
    f.render_widget(controls, chunks[1]);
}

pub fn render_rule_type_popup(f: &mut Frame) {
    let popup_area = centered_rect(40, 50, f.area());

    let lines = vec![
        Line::from(Span::styled("Add rule", Style::default().add_modifier(Modifier::BOLD))),
        Line::from(""),
        Line::from("  r  replace text"),
        Line::from("  x  regex replace"),
        Line::from("  i  insert text"),
        Line::from("  d  delete"),
        Line::from("  n  number (serialize)"),
        Line::from("  c  change case"),
        Line::from("  s  strip"),
        Line::from(""),
        Line::from(Span::styled("Esc to cancel", Style::default().fg(Color::Gray))),
    ];

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .title("Rule type")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow)),
    );

    f.render_widget(Clear, popup_area);
    f.render_widget(paragraph, popup_area);
}

pub fn render_param_popup(f: &mut Frame, app: &App) {
    let InputMode::EditParams { rule_type, editing } = &app.input_mode else {
        return;
    };

    let popup_area = centered_rect(70, 30, f.area());
    let title = match editing {
        Some(id) => format!("Edit {} rule #{}", rule_type, id),
        None => format!("New {} rule", rule_type),
    };

    let lines = vec![
        Line::from(Span::styled(
            format!("Parameters: {}", param_hint(*rule_type)),
            Style::default().fg(Color::Gray),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled(app.param_input.clone(), Style::default().fg(Color::Yellow)),
            Span::styled("_", Style::default().add_modifier(Modifier::SLOW_BLINK)),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            "key=value; ... (quote text with \"...\")  Enter: save  Esc: cancel",
            Style::default().fg(Color::Gray),
        )),
    ];

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow)),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(Clear, popup_area);
    f.render_widget(paragraph, popup_area);
}

pub fn render_help_popup(f: &mut Frame, app: &App) {
    let popup_area = centered_rect(60, 70, f.area());

    let help_text = vec![
        Line::from(vec![Span::styled("Batch Rename - Help", Style::default().add_modifier(Modifier::BOLD))]),
        Line::from(""),
        Line::from("Navigation:"),
        Line::from("  Up/k Down/j - Move in the focused list"),
        Line::from("  Tab         - Switch between episodes and rules"),
        Line::from(""),
        Line::from("Rules:"),
        Line::from("  a           - Add rule"),
        Line::from("  e           - Edit selected rule"),
        Line::from("  Space       - Enable/disable selected rule"),
        Line::from("  d/Del       - Remove selected rule"),
        Line::from("  [ / ]       - Move selected rule up/down"),
        Line::from(""),
        Line::from("Titles:"),
        Line::from("  Enter       - Apply rules to all titles"),
        Line::from("  u           - Undo last apply"),
        Line::from(format!(
            "  c           - Clear rules after apply (now {})",
            if app.session.clear_rules_on_apply() { "on" } else { "off" }
        )),
        Line::from("  s           - Save titles to the output file"),
        Line::from("  p           - Toggle preview panel"),
        Line::from("  h/F1        - Toggle this help"),
        Line::from("  q/Esc       - Quit"),
        Line::from(""),
        Line::from(vec![Span::styled("Press Esc or h to close", Style::default().fg(Color::Gray))]),
    ];

    let paragraph = Paragraph::new(help_text)
        .block(
            Block::default()
                .title("Help")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow)),
        )
        .wrap(Wrap { trim: true });

    f.render_widget(Clear, popup_area);
    f.render_widget(paragraph, popup_area);
}
