use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use cocycle_core::view::{truncate_string, RideDetailView, RidePage};

use crate::app::{App, AppState};

use super::map_canvas::render_map;
use super::styles;

/// Widest a participant name is shown before truncation
const MAX_NAME_WIDTH: usize = 24;

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Title bar
            Constraint::Min(10),   // Main content
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, app, chunks[0]);
    render_main_content(frame, app, chunks[1]);
    render_status_bar(frame, app, chunks[2]);

    if matches!(app.state, AppState::ShowingHelp) {
        render_help_overlay(frame);
    }
}

fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let title = match &app.page {
        RidePage::Ready(view) => format!("  {}", view.title),
        _ => "  cocycle".to_string(),
    };
    let help_hint = "[?] Help";
    let padding = (area.width as usize).saturating_sub(title.chars().count() + help_hint.len() + 2);

    let line = Line::from(vec![
        Span::styled(title, styles::title_style()),
        Span::raw(" ".repeat(padding)),
        Span::styled(help_hint, styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::border_style());
    frame.render_widget(Paragraph::new(line).block(block), area);
}

fn render_main_content(frame: &mut Frame, app: &App, area: Rect) {
    let view = match &app.page {
        RidePage::Loading => {
            render_message(frame, area, "Loading ride...", styles::muted_style());
            return;
        }
        RidePage::NotFound => {
            render_message(
                frame,
                area,
                "Ride not found. It may have been cancelled or removed.",
                styles::error_style(),
            );
            return;
        }
        RidePage::Ready(view) => view,
    };

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(12), Constraint::Length(8)])
        .split(columns[0]);

    render_details(frame, view, left[0]);
    render_participants(frame, view, app.scroll, left[1]);
    render_map(frame, &app.map, columns[1]);
}

fn render_message(frame: &mut Frame, area: Rect, message: &str, style: ratatui::style::Style) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style());
    let paragraph = Paragraph::new(Line::from(Span::styled(message.to_string(), style))).block(block);
    frame.render_widget(paragraph, area);
}

fn field<'a>(label: &'a str, value: String) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!("{:<12}", label), styles::label_style()),
        Span::styled(value, styles::value_style()),
    ])
}

fn render_details(frame: &mut Frame, view: &RideDetailView, area: Rect) {
    let mut header = vec![Span::styled(
        format!(" {} ", view.ride_type),
        styles::ride_type_style(view.type_color),
    )];
    for badge in &view.badges {
        header.push(Span::raw(" "));
        header.push(Span::styled(format!("[{}]", badge.label()), styles::highlight_style()));
    }

    let mut lines = vec![Line::from(header), Line::default()];

    if let Some(countdown) = &view.countdown {
        lines.push(Line::from(Span::styled(countdown.clone(), styles::success_style())));
    }
    lines.push(field("Date", view.date_label.clone()));
    lines.push(field("Time", view.time_label.clone()));
    lines.push(field("Distance", view.distance_label.clone()));
    lines.push(field("Pace", format!("{} km/h", view.pace_label)));

    let riders = match view.spots_left {
        Some(spots) => format!("{} ({} spots left)", view.riders_label, spots),
        None => format!("{} (full)", view.riders_label),
    };
    lines.push(field("Riders", riders));
    lines.push(field("Meet at", view.meeting_point.clone()));

    if let Some(cafe) = &view.cafe {
        lines.push(field("Café", cafe.name.clone()));
    }

    lines.push(Line::default());
    lines.push(Line::from(vec![
        Span::styled("Host        ", styles::label_style()),
        Span::styled(format!("({}) ", view.host.initials()), styles::highlight_style()),
        Span::styled(view.host.name.clone(), styles::value_style()),
        Span::styled(format!(" · {}", view.host.level), styles::muted_style()),
    ]));

    if let Some(description) = &view.description {
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(description.clone(), styles::value_style())));
    }

    lines.push(Line::default());
    lines.push(Line::from(Span::styled(view.deep_link.clone(), styles::muted_style())));

    let block = Block::default()
        .title(" Ride ")
        .borders(Borders::ALL)
        .border_style(styles::border_style());
    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn render_participants(frame: &mut Frame, view: &RideDetailView, scroll: usize, area: Rect) {
    let title = format!(" Riders ({}) ", view.participants.len());
    let lines: Vec<Line> = if view.participants.is_empty() {
        vec![Line::from(Span::styled("No other riders yet", styles::muted_style()))]
    } else {
        view.participants
            .iter()
            .skip(scroll)
            .map(|p| {
                Line::from(vec![
                    Span::styled(
                        format!("{:<width$}", truncate_string(&p.name, MAX_NAME_WIDTH), width = MAX_NAME_WIDTH + 1),
                        styles::value_style(),
                    ),
                    Span::styled(p.level.clone(), styles::muted_style()),
                ])
            })
            .collect()
    };

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(styles::border_style());
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let left = match (&app.status_message, &app.ride_cache) {
        (Some(message), _) => message.clone(),
        (None, Some(cached)) => format!("Updated {}", cached.age_display()),
        (None, None) => String::new(),
    };
    let keys = "[r] refresh  [q] quit";
    let padding = (area.width as usize).saturating_sub(left.chars().count() + keys.len() + 2);

    let line = Line::from(vec![
        Span::raw(format!(" {}", left)),
        Span::raw(" ".repeat(padding)),
        Span::styled(keys, styles::help_key_style()),
    ]);
    frame.render_widget(Paragraph::new(line).style(styles::status_bar_style()), area);
}

fn render_help_overlay(frame: &mut Frame) {
    let area = centered_rect(40, 10, frame.area());
    let keys = [
        ("r", "Refresh ride"),
        ("j / ↓", "Scroll riders down"),
        ("k / ↑", "Scroll riders up"),
        ("?", "Toggle help"),
        ("q / Esc", "Quit"),
    ];
    let lines: Vec<Line> = keys
        .iter()
        .map(|(key, desc)| {
            Line::from(vec![
                Span::styled(format!("{:<10}", key), styles::help_key_style()),
                Span::styled(*desc, styles::value_style()),
            ])
        })
        .collect();

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_style(styles::border_style());
    frame.render_widget(Clear, area);
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}
