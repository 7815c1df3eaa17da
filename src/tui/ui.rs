use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Gauge, Paragraph, Row, Table},
    Frame,
};

use crate::models::{PaletteColor, Task};
use crate::schedule::week_overview;
use super::app::{App, InputField, InputMode, ViewMode};

fn block_color(task: &Task) -> Color {
    if task.completed {
        return Color::DarkGray;
    }
    match PaletteColor::resolve(task.color.as_deref()) {
        PaletteColor::Indigo => Color::Rgb(99, 102, 241),
        PaletteColor::Emerald => Color::Rgb(16, 185, 129),
        PaletteColor::Amber => Color::Rgb(245, 158, 11),
        PaletteColor::Rose => Color::Rgb(244, 63, 94),
        PaletteColor::Sky => Color::Rgb(14, 165, 233),
    }
}

pub fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Clock
            Constraint::Length(6), // Now
            Constraint::Length(3), // Next
            Constraint::Min(0),    // Schedule
            Constraint::Length(3), // Help
        ].as_ref())
        .split(f.area());

    render_dashboard(f, app, &chunks[..3]);

    match app.view_mode {
        ViewMode::Day => render_day(f, app, chunks[3]),
        ViewMode::Week => render_week(f, app, chunks[3]),
    }

    let help_text = match (&app.input_mode, &app.status) {
        (InputMode::Normal, Some(status)) => status.clone(),
        (InputMode::Normal, None) => match app.view_mode {
            ViewMode::Day => "q: Quit | j/k: Move | h/l: Day | Space: Done | a: Add | n/s/e/o: Name/Start/End/Note | c: Colour | d: Del | v: Week".to_string(),
            ViewMode::Week => "q: Quit | h/l: Day | v: Day View".to_string(),
        },
        (InputMode::Editing, _) => "Enter: Save | Esc: Cancel".to_string(),
        (InputMode::Adding, _) => "Enter: Next Step | Esc: Cancel".to_string(),
    };

    let help = Paragraph::new(help_text)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));

    f.render_widget(help, chunks[4]);

    if app.input_mode != InputMode::Normal {
        render_input(f, app);
    }
}

fn render_dashboard(f: &mut Frame, app: &App, areas: &[Rect]) {
    let now = app.planner.now();
    let view = app.planner.view();

    let clock = Paragraph::new(Line::from(vec![
        Span::styled(
            format!("{}, {}  ", view.today, now.format("%Y-%m-%d")),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::raw(now.format("%H:%M").to_string()),
        Span::styled(now.format(":%S").to_string(), Style::default().fg(Color::DarkGray)),
    ]))
    .block(Block::default().borders(Borders::ALL).title("FocusFlow"));
    f.render_widget(clock, areas[0]);

    let now_block = Block::default().borders(Borders::ALL).title("Now");
    match view.active {
        Some(t) => {
            let inner = now_block.inner(areas[1]);
            f.render_widget(now_block, areas[1]);
            let rows = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(1), Constraint::Length(2), Constraint::Length(1)].as_ref())
                .split(inner);
            let title = Line::from(vec![
                Span::styled(t.name.clone(), Style::default().fg(block_color(t)).add_modifier(Modifier::BOLD)),
                Span::styled(format!("  ends at {}", t.end_time), Style::default().fg(Color::Gray)),
            ]);
            f.render_widget(Paragraph::new(title), rows[0]);
            f.render_widget(
                Paragraph::new(t.note.clone().unwrap_or_default()).style(Style::default().fg(Color::Gray)),
                rows[1],
            );
            let gauge = Gauge::default()
                .gauge_style(Style::default().fg(block_color(t)).bg(Color::Black))
                .ratio(view.progress_percent / 100.0)
                .label(format!("{:.0}%", view.progress_percent));
            f.render_widget(gauge, rows[2]);
        }
        None => {
            let free = Paragraph::new(vec![
                Line::from(Span::styled("Free Time", Style::default().add_modifier(Modifier::BOLD))),
                Line::from("Relax and recharge."),
            ])
            .style(Style::default().fg(Color::Gray))
            .block(now_block);
            f.render_widget(free, areas[1]);
        }
    }

    let next_line = match view.next {
        Some(t) => Line::from(vec![
            Span::styled(format!("Starts at {}  ", t.start_time), Style::default().fg(Color::Gray)),
            Span::styled(t.name.clone(), Style::default().add_modifier(Modifier::BOLD)),
        ]),
        None => Line::from(Span::styled("No more tasks scheduled for today.", Style::default().fg(Color::DarkGray))),
    };
    f.render_widget(Paragraph::new(next_line).block(Block::default().borders(Borders::ALL).title("Up Next")), areas[2]);
}

fn render_day(f: &mut Frame, app: &mut App, area: Rect) {
    let view = app.planner.view();
    let active_id = view.active.map(|t| t.id.clone());
    let is_today = view.today == app.shown_day;

    let rows: Vec<Row> = app
        .shown_agenda()
        .into_iter()
        .map(|t| {
            let status = if is_today && active_id.as_deref() == Some(t.id.as_str()) {
                "Now"
            } else if t.completed {
                "Done"
            } else if !t.is_well_formed() {
                "Invalid"
            } else {
                ""
            };
            Row::new(vec![
                Cell::from(t.start_time.to_string()),
                Cell::from(t.end_time.to_string()),
                Cell::from(t.name.clone()),
                Cell::from(t.note.clone().unwrap_or_default()),
                Cell::from(status),
            ])
            .style(Style::default().fg(block_color(t)))
        })
        .collect();

    let widths = [
        Constraint::Length(6),
        Constraint::Length(6),
        Constraint::Min(20),
        Constraint::Min(20),
        Constraint::Length(8),
    ];

    let table = Table::new(rows, widths)
        .header(Row::new(vec!["Start", "End", "Name", "Note", "Status"])
            .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
            .bottom_margin(1))
        .block(Block::default().borders(Borders::ALL).title(format!("{}'s Schedule", app.shown_day)))
        .row_highlight_style(Style::default().add_modifier(Modifier::BOLD).bg(Color::DarkGray))
        .highlight_symbol(">> ");

    f.render_stateful_widget(table, area, &mut app.state);
}

fn render_week(f: &mut Frame, app: &App, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 7); 7].as_ref())
        .split(area);

    for ((day, agenda), column) in week_overview(app.planner.tasks()).into_iter().zip(columns.iter()) {
        let lines: Vec<Line> = agenda
            .iter()
            .flat_map(|t| {
                let style = Style::default().fg(block_color(t));
                [
                    Line::from(Span::styled(format!("{}-{}", t.start_time, t.end_time), style)),
                    Line::from(Span::styled(t.name.clone(), style.add_modifier(Modifier::BOLD))),
                ]
            })
            .collect();
        let mut title_style = Style::default();
        if day == app.shown_day {
            title_style = title_style.fg(Color::Cyan).add_modifier(Modifier::BOLD);
        }
        let block = Block::default()
            .borders(Borders::ALL)
            .title(Span::styled(day.short(), title_style));
        f.render_widget(Paragraph::new(lines).block(block), *column);
    }
}

fn render_input(f: &mut Frame, app: &App) {
    let area = centered_rect(60, 3, f.area()); // Fixed height of 3 (border + 1 line)
    f.render_widget(Clear, area);

    let title = match app.input_mode {
        InputMode::Adding => match app.add_state.step {
            0 => format!("Add to {}: Enter Name", app.shown_day),
            1 => format!("Add to {}: Enter Start (HH:MM)", app.shown_day),
            2 => format!("Add to {}: Enter End (HH:MM)", app.shown_day),
            _ => format!("Add to {}: Enter Note (Optional)", app.shown_day),
        },
        InputMode::Editing => match app.input_field {
            InputField::Name => "Edit Name",
            InputField::Start => "Edit Start (HH:MM)",
            InputField::End => "Edit End (HH:MM)",
            InputField::Note => "Edit Note",
            InputField::None => "Edit",
        }
        .to_string(),
        InputMode::Normal => String::new(),
    };

    let input = Paragraph::new(app.input_buffer.as_str())
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL).title(title));

    f.render_widget(input, area);
}

fn centered_rect(percent_x: u16, height: u16, r: Rect) -> Rect {
    let margin = r.height.saturating_sub(height) / 2;
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(margin),
            Constraint::Length(height),
            Constraint::Length(margin),
        ].as_ref())
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ].as_ref())
        .split(popup_layout[1])[1]
}
