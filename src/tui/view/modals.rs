use super::{centered_fixed, centered_rect};
use crate::model::Task;
use crate::timefmt;
use crate::tui::form::{FormField, TaskForm};
use chrono::NaiveDate;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
};

const FORM_LABELS: [(FormField, &str); 3] = [
    (FormField::Text, " Task "),
    (FormField::Date, " Date (YYYY-MM-DD) "),
    (FormField::Time, " Time (HH:MM) "),
];

pub fn draw_form(f: &mut Frame, title: &str, form: &TaskForm) {
    let area = centered_fixed(60, 11, f.area());
    f.render_widget(Clear, area);

    let outer = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(Style::default().fg(Color::Yellow));
    let inner = outer.inner(area);
    f.render_widget(outer, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
        ])
        .split(inner);

    for ((field, label), row) in FORM_LABELS.iter().zip(rows.iter()) {
        let input = form.field(*field);
        let focused = form.focus == *field;
        let style = if focused {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };
        let before = Span::raw(input.before_cursor()).width() as u16;
        let (scroll, column) = cursor_column(before, row.width.saturating_sub(2));
        let widget = Paragraph::new(input.value())
            .style(style)
            .scroll((0, if focused { scroll } else { 0 }))
            .block(Block::default().borders(Borders::ALL).title(*label));
        f.render_widget(widget, *row);

        if focused {
            f.set_cursor_position((row.x + 1 + column, row.y + 1));
        }
    }
}

/// Horizontal scroll and cursor column for an input `inner_width` cells wide,
/// given the display width of the text left of the cursor.
fn cursor_column(before: u16, inner_width: u16) -> (u16, u16) {
    let last = inner_width.saturating_sub(1);
    let scroll = before.saturating_sub(last);
    (scroll, before - scroll)
}

pub fn draw_delete_prompt(f: &mut Frame, text: &str) {
    let area = centered_fixed(50, 9, f.area());
    let lines = vec![
        Line::from("Are you sure you want to delete this task?"),
        Line::from(""),
        Line::from(Span::styled(
            text.to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "This action cannot be undone.",
            Style::default().fg(Color::Red),
        )),
        Line::from(Span::styled(
            "y: Delete   n: Cancel",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    let prompt = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Delete Task ")
                .border_style(Style::default().fg(Color::Red)),
        );
    f.render_widget(Clear, area);
    f.render_widget(prompt, area);
}

pub fn draw_details(f: &mut Frame, task: &Task) {
    let area = centered_fixed(60, 8, f.area());
    let label = Style::default().add_modifier(Modifier::BOLD);
    let status = if task.completed { "Completed" } else { "Pending" };
    let lines = vec![
        Line::from(vec![Span::styled("Task:   ", label), Span::raw(task.text.clone())]),
        Line::from(vec![
            Span::styled("Date:   ", label),
            Span::raw(timefmt::format_date(task.date)),
        ]),
        Line::from(vec![
            Span::styled("Time:   ", label),
            Span::raw(timefmt::display_time(&task.time)),
        ]),
        Line::from(vec![Span::styled("Status: ", label), Span::raw(status)]),
    ];
    let details = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title(" Task Details "));
    f.render_widget(Clear, area);
    f.render_widget(details, area);
}

pub fn draw_day_tasks(f: &mut Frame, date: NaiveDate, tasks: &[&Task], selected: usize) {
    let area = centered_rect(60, 60, f.area());
    f.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Tasks for {} ", timefmt::day_title(date)))
        .border_style(Style::default().fg(Color::Yellow));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(2)])
        .split(inner);

    let items: Vec<ListItem> = tasks
        .iter()
        .map(|t| {
            let (checkbox, text_style) = if t.completed {
                (
                    "[x] ",
                    Style::default()
                        .fg(Color::DarkGray)
                        .add_modifier(Modifier::CROSSED_OUT),
                )
            } else {
                ("[ ] ", Style::default())
            };
            ListItem::new(vec![
                Line::from(vec![
                    Span::raw(checkbox),
                    Span::styled(t.text.clone(), text_style),
                ]),
                Line::from(Span::styled(
                    format!("    Time: {}", timefmt::display_time(&t.time)),
                    Style::default().fg(Color::Cyan),
                )),
            ])
        })
        .collect();

    let mut list_state = ListState::default();
    if !tasks.is_empty() {
        list_state.select(Some(selected.min(tasks.len() - 1)));
    }
    let list = List::new(items).highlight_style(
        Style::default()
            .add_modifier(Modifier::BOLD)
            .bg(Color::Blue),
    );
    f.render_stateful_widget(list, chunks[0], &mut list_state);

    let hints = Paragraph::new(
        "e: Edit | d: Delete | Space: Toggle | a: Add Task to This Date | Esc: Close",
    )
    .style(Style::default().fg(Color::DarkGray))
    .wrap(Wrap { trim: true })
    .alignment(Alignment::Center);
    f.render_widget(hints, chunks[1]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use ratatui::{Terminal, backend::TestBackend, buffer::Buffer, layout::Rect};

    fn contains(buf: &Buffer, needle: &str) -> bool {
        (0..buf.area.height).any(|y| {
            let row: String = (0..buf.area.width).map(|x| buf[(x, y)].symbol()).collect();
            row.contains(needle)
        })
    }

    #[test]
    fn test_day_tasks_popup() {
        let on = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
        let now = Utc::now();
        let task = Task {
            id: 1,
            text: "Pay rent".to_string(),
            date: on,
            time: "09:05".to_string(),
            completed: false,
            created_at: now,
            updated_at: now,
        };
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        terminal
            .draw(|f| draw_day_tasks(f, on, &[&task], 0))
            .unwrap();
        let buf = terminal.backend().buffer();
        assert!(contains(buf, "Tasks for April 1, 2024"));
        assert!(contains(buf, "Pay rent"));
        assert!(contains(buf, "Time: 9:05 AM"));
        assert!(contains(buf, "a: Add Task to This Date"));
    }

    #[test]
    fn test_form_shows_field_values() {
        let mut form = TaskForm::default();
        form.text.set("Buy milk");
        form.date.set("2024-04-01");
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal
            .draw(|f| draw_form(f, " Add Task ", &form))
            .unwrap();
        let buf = terminal.backend().buffer();
        assert!(contains(buf, "Add Task"));
        assert!(contains(buf, "Buy milk"));
        assert!(contains(buf, "2024-04-01"));
        assert!(contains(buf, "Time (HH:MM)"));
    }

    #[test]
    fn test_cursor_column_scrolls_long_input() {
        assert_eq!(cursor_column(0, 10), (0, 0));
        assert_eq!(cursor_column(9, 10), (0, 9));
        assert_eq!(cursor_column(25, 10), (16, 9));
        assert_eq!(cursor_column(3, 0), (3, 0));
    }

    #[test]
    fn test_form_cursor_uses_display_width() {
        let mut form = TaskForm::default();
        form.text.set("日本語");
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal
            .draw(|f| draw_form(f, " Add Task ", &form))
            .unwrap();
        let area = centered_fixed(60, 11, Rect::new(0, 0, 100, 30));
        let cursor = terminal.get_cursor_position().unwrap();
        // outer border + field border, then three double-width glyphs
        assert_eq!(cursor.x, area.x + 2 + 6);
        assert_eq!(cursor.y, area.y + 2);
    }

    #[test]
    fn test_form_cursor_stays_inside_popup() {
        let mut form = TaskForm::default();
        form.text.set("x".repeat(200));
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal
            .draw(|f| draw_form(f, " Add Task ", &form))
            .unwrap();
        let area = centered_fixed(60, 11, Rect::new(0, 0, 100, 30));
        let cursor = terminal.get_cursor_position().unwrap();
        assert!(cursor.x < area.x + area.width - 2);
    }
}
