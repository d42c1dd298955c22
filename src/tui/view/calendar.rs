use crate::calendar::{DayCell, MonthGrid, WEEKDAY_HEADERS};
use crate::timefmt;
use crate::tui::state::AppState;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

pub fn draw_calendar(f: &mut Frame, state: &AppState, area: Rect) {
    let grid = MonthGrid::build(state.tasks(), state.calendar.displayed_month, state.today);
    let weeks = grid.weeks();

    let title = if state.loading {
        format!(" {} (Loading...) ", timefmt::month_title(grid.month))
    } else {
        format!(" {} ", timefmt::month_title(grid.month))
    };
    let outer = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .title_alignment(Alignment::Center);
    let inner = outer.inner(area);
    f.render_widget(outer, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(inner);

    let columns = || {
        Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Ratio(1, 7); 7])
    };

    for (col, name) in columns().split(chunks[0]).iter().zip(WEEKDAY_HEADERS) {
        let header = Paragraph::new(name)
            .alignment(Alignment::Center)
            .style(Style::default().add_modifier(Modifier::BOLD));
        f.render_widget(header, *col);
    }

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Ratio(1, weeks.len().max(1) as u32); weeks.len()])
        .split(chunks[1]);

    for (week, row) in weeks.iter().zip(rows.iter()) {
        for (slot, cell_area) in week.iter().zip(columns().split(*row).iter()) {
            if let Some(day) = slot {
                draw_day_cell(f, day, day.date == state.calendar.selected, *cell_area);
            }
        }
    }

    let legend = Paragraph::new(Line::from(vec![
        Span::styled("■ ", Style::default().fg(Color::Blue)),
        Span::raw("Today  "),
        Span::styled("■ ", Style::default().fg(Color::Yellow)),
        Span::raw("Selected  "),
        Span::styled("■ ", Style::default().fg(Color::Green)),
        Span::raw("Has tasks"),
    ]))
    .style(Style::default().fg(Color::DarkGray))
    .alignment(Alignment::Center);
    f.render_widget(legend, chunks[2]);
}

fn draw_day_cell(f: &mut Frame, day: &DayCell<'_>, selected: bool, area: Rect) {
    let border_style = if selected {
        Style::default().fg(Color::Yellow)
    } else if day.has_tasks() {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let number_style = if day.is_today {
        Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };

    let mut lines = vec![Line::from(Span::styled(
        day.date.format("%-d").to_string(),
        number_style,
    ))];
    lines.extend(day.labels().map(|label| Line::from(label.to_string())));
    if day.overflow() > 0 {
        lines.push(Line::from(Span::styled(
            format!("+{} more", day.overflow()),
            Style::default().fg(Color::DarkGray),
        )));
    }

    let cell = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style),
    );
    f.render_widget(cell, area);
}
