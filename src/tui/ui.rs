use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table},
    Frame,
};
use crate::commands::{recurrence_label, status_label};
use crate::models::Task;
use crate::ranking::{progress_percentage, remaining_label};
use crate::urgency::compute_urgency;
use super::app::{App, InputMode};

const GAUGE_WIDTH: usize = 10;

pub fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // Table
            Constraint::Length(3)  // Help
        ].as_ref())
        .split(f.area());

    app.clamp_selection();
    let now = app.tracker.now();
    let rows: Vec<Row> = app
        .visible()
        .into_iter()
        .map(|t| task_row(t, compute_urgency(t, now)))
        .collect();

    let widths = [
        Constraint::Length(2),
        Constraint::Length(4),
        Constraint::Min(20),
        Constraint::Length(12),
        Constraint::Length(4),
        Constraint::Length(15),
        Constraint::Length(16),
        Constraint::Length(8),
        Constraint::Length(8),
        Constraint::Length(18),
    ];

    let title = format!(
        "Taskpulse - {}{}",
        now.format("%H:%M"),
        if app.show_completed { "" } else { " (hiding completed)" }
    );
    let table = Table::new(rows, widths)
        .header(Row::new(vec!["", "ID", "Title", "Category", "Pri", "Left", "Progress", "Score", "Status", "Repeats"])
            .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
            .bottom_margin(1))
        .block(Block::default().borders(Borders::ALL).title(title))
        .row_highlight_style(Style::default().add_modifier(Modifier::BOLD).bg(Color::DarkGray))
        .highlight_symbol(">> ");

    f.render_stateful_widget(table, chunks[0], &mut app.state);

    let help_text = match app.input_mode {
        InputMode::Normal => match &app.message {
            Some(msg) => format!("{} | q: Quit | a: Add | s: Start | p: Pause | x: Stop | Space: Done | d: Del | c: Toggle Done", msg),
            None => "q: Quit | a: Add | s: Start | p: Pause | x: Stop | Space: Done | d: Del | c: Toggle Done".to_string(),
        },
        InputMode::Adding => "Enter: Next Step | Esc: Cancel".to_string(),
    };

    let help = Paragraph::new(help_text)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));

    f.render_widget(help, chunks[1]);

    // Render Input Box if needed
    if app.input_mode == InputMode::Adding {
        let area = centered_rect(70, 3, f.area());
        f.render_widget(Clear, area); // Clear the area first

        let input = Paragraph::new(app.input_buffer.as_str())
            .style(Style::default().fg(Color::Yellow))
            .block(Block::default().borders(Borders::ALL).title(app.add_step.prompt()));

        f.render_widget(input, area);
    }
}

fn task_row(t: &Task, score: f64) -> Row<'static> {
    let expired = !t.completed && t.elapsed_time_seconds >= t.total_seconds();
    let style = if t.completed {
        Style::default().fg(Color::DarkGray)
    } else if t.is_running && expired {
        Style::default().fg(Color::Red)
    } else if t.is_running {
        Style::default().fg(Color::Green)
    } else if score > 150.0 {
        Style::default().fg(Color::Red)
    } else if score > 80.0 {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };

    Row::new(vec![
        Cell::from(if t.is_running { "▶" } else { "" }),
        Cell::from(t.id.to_string()),
        Cell::from(t.title.clone()),
        Cell::from(t.category.to_string()),
        Cell::from(t.priority.to_string()),
        Cell::from(remaining_label(t)),
        Cell::from(gauge(progress_percentage(t))),
        Cell::from(format!("{:.1}", score)),
        Cell::from(status_label(t)),
        Cell::from(recurrence_label(t)),
    ]).style(style)
}

/// Text progress bar, e.g. `█████░░░░░ 50%`.
fn gauge(pct: f64) -> String {
    let filled = ((pct / 100.0) * GAUGE_WIDTH as f64).round() as usize;
    let filled = filled.min(GAUGE_WIDTH);
    format!("{}{} {:>3.0}%", "█".repeat(filled), "░".repeat(GAUGE_WIDTH - filled), pct)
}

fn centered_rect(percent_x: u16, height: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(r.height.saturating_sub(height) / 2),
            Constraint::Length(height),
            Constraint::Length(r.height.saturating_sub(height) / 2),
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gauge_fills_proportionally() {
        assert_eq!(gauge(0.0), "░░░░░░░░░░   0%");
        assert_eq!(gauge(50.0), "█████░░░░░  50%");
        assert_eq!(gauge(100.0), "██████████ 100%");
    }
}
