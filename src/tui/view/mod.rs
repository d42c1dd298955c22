mod calendar;
mod modals;

use crate::config::ViewMode;
use crate::tui::state::{AppState, Level, Modal};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Tabs},
};

pub const EMPTY_LIST_MSG: &str = "Your task list is empty. Add a task to get started!";

pub fn draw(f: &mut Frame, state: &mut AppState) {
    let v_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(f.area());

    draw_header(f, state, v_chunks[0]);
    match state.view {
        ViewMode::List => draw_task_list(f, state, v_chunks[1]),
        ViewMode::Calendar => calendar::draw_calendar(f, state, v_chunks[1]),
    }
    draw_footer(f, state, v_chunks[2]);

    match &state.modal {
        Modal::Idle => {}
        Modal::Creating => modals::draw_form(f, " Add Task ", &state.draft),
        Modal::Editing(session) => modals::draw_form(f, " Edit Task ", &session.form),
        Modal::ConfirmingDelete(task) => modals::draw_delete_prompt(f, &task.text),
        Modal::Details(id) => {
            if let Some(task) = state.store.get(*id) {
                modals::draw_details(f, task);
            }
        }
        Modal::DayTasks { date, selected } => {
            modals::draw_day_tasks(f, *date, &state.store.on_date(*date), *selected)
        }
    }
}

fn draw_header(f: &mut Frame, state: &AppState, area: Rect) {
    let selected = match state.view {
        ViewMode::List => 0,
        ViewMode::Calendar => 1,
    };
    let tabs = Tabs::new(vec!["[1] List", "[2] Calendar"])
        .select(selected)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" My To-Do List "),
        )
        .highlight_style(
            Style::default()
                .add_modifier(Modifier::BOLD)
                .bg(Color::Blue),
        );
    f.render_widget(tabs, area);
}

fn draw_task_list(f: &mut Frame, state: &mut AppState, area: Rect) {
    let title = if state.loading {
        " Tasks (Loading...) ".to_string()
    } else {
        format!(" Tasks ({}) ", state.store.len())
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(Style::default().fg(Color::Yellow));

    if state.store.is_empty() {
        let msg = if state.loading { "Loading..." } else { EMPTY_LIST_MSG };
        let empty = Paragraph::new(msg)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center)
            .block(block);
        f.render_widget(empty, area);
        return;
    }

    let task_items: Vec<ListItem> = state
        .tasks()
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
                ("[ ] ", Style::default().fg(Color::White))
            };
            ListItem::new(Line::from(vec![
                Span::raw(checkbox),
                Span::styled(t.text.clone(), text_style),
                Span::styled(
                    format!("  ({})", t.schedule_label()),
                    Style::default().fg(Color::Cyan),
                ),
            ]))
        })
        .collect();

    let task_list = List::new(task_items).block(block).highlight_style(
        Style::default()
            .add_modifier(Modifier::BOLD)
            .bg(Color::Blue),
    );
    f.render_stateful_widget(task_list, area, &mut state.list_state);
}

fn draw_footer(f: &mut Frame, state: &AppState, area: Rect) {
    let f_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let (message, color) = match &state.notification {
        Some(n) => (
            n.message.clone(),
            match n.level {
                Level::Info => Color::Cyan,
                Level::Success => Color::Green,
                Level::Error => Color::Red,
            },
        ),
        None if state.loading => ("Loading...".to_string(), Color::Cyan),
        None => ("Ready.".to_string(), Color::Cyan),
    };
    let status = Paragraph::new(message)
        .style(Style::default().fg(color))
        .block(
            Block::default()
                .borders(Borders::LEFT | Borders::TOP | Borders::BOTTOM)
                .title(" Status "),
        );

    let help = Paragraph::new(help_text(state))
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Right)
        .block(
            Block::default()
                .borders(Borders::RIGHT | Borders::TOP | Borders::BOTTOM)
                .title(" Actions "),
        );
    f.render_widget(status, f_chunks[0]);
    f.render_widget(help, f_chunks[1]);
}

fn help_text(state: &AppState) -> &'static str {
    match (&state.modal, state.view) {
        (Modal::Creating | Modal::Editing(_), _) => "Enter:Save | Tab:Next field | Esc:Cancel",
        (Modal::ConfirmingDelete(_), _) => "y:Delete | n:Cancel",
        (Modal::Details(_), _) => "Esc:Close",
        (Modal::DayTasks { .. }, _) => "e:Edit | d:Del | Space:Done | a:Add | Esc:Close",
        (Modal::Idle, ViewMode::List) => {
            "a:Add | Space:Done | i:Info | e:Edit | d:Del | Tab:Calendar | r:Reload | q:Quit"
        }
        (Modal::Idle, ViewMode::Calendar) => {
            "Arrows:Day | Enter:Open | a:Add | p/n:Month | t:Today | Tab:List | q:Quit"
        }
    }
}

/// Helper function to create a centered rect using up certain percentages of the available rect.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

/// Like [`centered_rect`] but with a fixed height in rows, clamped to the area.
pub(crate) fn centered_fixed(percent_x: u16, height: u16, r: Rect) -> Rect {
    let horizontal = centered_rect(percent_x, 100, r);
    let height = height.min(r.height);
    Rect {
        x: horizontal.x,
        y: r.y + (r.height - height) / 2,
        width: horizontal.width,
        height,
    }
}
