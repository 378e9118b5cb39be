use crate::app::{App, Pane};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
};
use tasklist_core::{FilterMode, LoginField, TaskRow};

pub fn draw(frame: &mut Frame, app: &App) {
    // Only one of the two screens is ever shown
    if app.state.is_authenticated() {
        draw_task_screen(frame, app);
    } else {
        draw_login_screen(frame, app);
    }

    if let Some(error) = &app.error_message {
        draw_error_popup(frame, error);
    }
}

fn focused_style(focused: bool) -> Style {
    if focused {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    }
}

fn key_hint(key: &'static str, color: Color) -> Span<'static> {
    Span::styled(key, Style::default().fg(color).add_modifier(Modifier::BOLD))
}

fn draw_login_screen(frame: &mut Frame, app: &App) {
    let form = &app.state.login_form;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints([
            Constraint::Percentage(30),
            Constraint::Percentage(40),
            Constraint::Percentage(30),
        ])
        .split(frame.area());

    let auth_block = Block::default()
        .title(" Login ")
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .style(Style::default().fg(Color::Cyan));

    frame.render_widget(auth_block.clone(), chunks[1]);

    let inner_area = auth_block.inner(chunks[1]);
    let auth_chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(2), // Email field
            Constraint::Length(1), // Spacing
            Constraint::Length(2), // Password field
            Constraint::Length(1), // Error
            Constraint::Min(0),    // Instructions
        ])
        .split(inner_area);

    draw_underlined_field(
        frame,
        auth_chunks[0],
        format!("Email: {}", form.email),
        form.focus == LoginField::Email,
    );
    draw_underlined_field(
        frame,
        auth_chunks[2],
        format!("Password: {}", "*".repeat(form.password.chars().count())),
        form.focus == LoginField::Password,
    );

    if let Some(error) = &form.error {
        let error_line = Paragraph::new(error.as_str())
            .style(Style::default().fg(Color::Red))
            .alignment(Alignment::Center);
        frame.render_widget(error_line, auth_chunks[3]);
    }

    let instructions = Paragraph::new(vec![
        Line::from(""),
        Line::from(vec![
            Span::raw("Press "),
            key_hint("Tab", Color::Cyan),
            Span::raw(" to switch fields | "),
            key_hint("Enter", Color::Green),
            Span::raw(" to login | "),
            key_hint("Esc", Color::Red),
            Span::raw(" to quit"),
        ]),
    ])
    .style(Style::default().fg(Color::Gray))
    .alignment(Alignment::Center);
    frame.render_widget(instructions, auth_chunks[4]);

    let (area, offset, len) = match form.focus {
        LoginField::Email => (auth_chunks[0], 7, form.email.chars().count()),
        LoginField::Password => (auth_chunks[2], 10, form.password.chars().count()),
    };
    let last_column = area.x + area.width.saturating_sub(1);
    frame.set_cursor_position((cursor_column(area.x + offset, len, last_column), area.y));
}

fn draw_underlined_field(frame: &mut Frame, area: Rect, text: String, focused: bool) {
    frame.render_widget(Paragraph::new(text).style(focused_style(focused)), area);

    let underline = Paragraph::new("─".repeat(area.width as usize))
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(
        underline,
        Rect {
            x: area.x,
            y: area.y + 1,
            width: area.width,
            height: 1,
        },
    );
}

fn cursor_column(start: u16, len: usize, last_column: u16) -> u16 {
    let len = u16::try_from(len).unwrap_or(u16::MAX);
    start.saturating_add(len).min(last_column)
}

fn draw_task_screen(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(3), // Filters
            Constraint::Length(3), // Add form
            Constraint::Min(0),    // Tasks
            Constraint::Length(2), // Status
        ])
        .split(frame.area());

    let header = Paragraph::new(" Task List ")
        .style(
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Thick),
        );
    frame.render_widget(header, chunks[0]);

    draw_filter_bar(frame, app, chunks[1]);
    draw_add_form(frame, app, chunks[2]);
    draw_task_list(frame, app, chunks[3]);
    draw_status_line(frame, app, chunks[4]);
}

fn draw_filter_bar(frame: &mut Frame, app: &App, area: Rect) {
    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    let mode = app.state.filter.mode();
    let mut spans = Vec::new();
    for (key, filter_mode) in [
        ('a', FilterMode::All),
        ('d', FilterMode::Done),
        ('p', FilterMode::Pending),
    ] {
        let style = if mode == filter_mode {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        spans.push(Span::styled(
            format!(" [{}] {} ", key, filter_mode.label()),
            style,
        ));
        spans.push(Span::raw(" "));
    }
    if let Some(tag) = app.state.filter.active_tag() {
        spans.push(Span::styled(
            format!(" tag: {} ", tag),
            Style::default()
                .fg(Color::Black)
                .bg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        ));
    }

    let filters = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .title(" Filter ")
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded),
    );
    frame.render_widget(filters, halves[0]);

    draw_input(
        frame,
        halves[1],
        " Filter by tag ",
        &app.state.tag_input,
        app.focus == Pane::TagFilter,
    );
}

fn draw_add_form(frame: &mut Frame, app: &App, area: Rect) {
    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    draw_input(
        frame,
        halves[0],
        " New task ",
        &app.state.add_form.text,
        app.focus == Pane::TaskText,
    );
    draw_input(
        frame,
        halves[1],
        " Tags (comma separated) ",
        &app.state.add_form.tags,
        app.focus == Pane::TaskTags,
    );
}

fn draw_input(frame: &mut Frame, area: Rect, title: &str, value: &str, focused: bool) {
    let border_style = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let input = Paragraph::new(value).style(focused_style(focused)).block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(border_style),
    );
    frame.render_widget(input, area);

    if focused {
        // Stay left of the right border
        let last_column = area.x + area.width.saturating_sub(2);
        let column = cursor_column(area.x + 1, value.chars().count(), last_column);
        frame.set_cursor_position((column, area.y + 1));
    }
}

fn draw_task_list(frame: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .state
        .visible_tasks()
        .map(TaskRow::new)
        .map(|row| {
            let mut spans = if row.is_done() {
                vec![
                    Span::styled("[x] ", Style::default().fg(Color::Green)),
                    Span::styled(
                        row.text().to_string(),
                        Style::default()
                            .fg(Color::DarkGray)
                            .add_modifier(Modifier::CROSSED_OUT),
                    ),
                ]
            } else {
                vec![
                    Span::raw("[ ] "),
                    Span::styled(row.text().to_string(), Style::default().fg(Color::White)),
                ]
            };
            if let Some(tags) = row.tags_label() {
                spans.push(Span::raw(" "));
                spans.push(Span::styled(tags, Style::default().fg(Color::Cyan)));
            }
            if row.can_complete() {
                spans.push(Span::styled(
                    "  (c: complete)",
                    Style::default().fg(Color::DarkGray),
                ));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    let title = format!(" Tasks ({}) ", app.state.filter.mode().label());
    let border_style = if app.focus == Pane::List {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    let list = List::new(items)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(border_style),
        )
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        );

    let mut list_state = ListState::default();
    if app.focus == Pane::List && app.visible_count() > 0 {
        list_state.select(Some(app.selected));
    }
    frame.render_stateful_widget(list, area, &mut list_state);
}

fn draw_status_line(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = Vec::new();
    if app.in_flight > 0 {
        spans.push(Span::styled(
            "Loading...",
            Style::default().fg(Color::Yellow),
        ));
    }
    if let Some(notice) = &app.state.notice {
        if !spans.is_empty() {
            spans.push(Span::raw(" | "));
        }
        spans.push(Span::styled(
            notice.as_str(),
            Style::default().fg(Color::Red),
        ));
    }

    let line = if !spans.is_empty() {
        Line::from(spans)
    } else {
        Line::from(vec![
            key_hint("Tab", Color::Cyan),
            Span::raw(" switch | "),
            key_hint("a/d/p", Color::Cyan),
            Span::raw(" filter | "),
            key_hint("c", Color::Green),
            Span::raw(" complete | "),
            key_hint("r", Color::Cyan),
            Span::raw(" refresh | "),
            key_hint("Ctrl+L", Color::Magenta),
            Span::raw(" sign out | "),
            key_hint("Esc", Color::Red),
            Span::raw(" quit"),
        ])
    };

    let status = Paragraph::new(line)
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::TOP));
    frame.render_widget(status, area);
}

fn draw_error_popup(frame: &mut Frame, error: &str) {
    let area = centered_rect(60, 20, frame.area());

    let popup_block = Block::default()
        .title(" Error ")
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .style(Style::default().fg(Color::Red));

    let error_text = Paragraph::new(error)
        .wrap(Wrap { trim: true })
        .style(Style::default().fg(Color::White))
        .block(popup_block);

    frame.render_widget(Clear, area);
    frame.render_widget(error_text, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
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

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{Terminal, backend::TestBackend};
    use tasklist_core::{Outcome, Task};

    fn render(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|frame| draw(frame, app)).unwrap();
        let buffer = terminal.backend().buffer();
        buffer
            .content
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn signed_in_with(tasks: Vec<Task>) -> App {
        let mut app = App::new();
        app.apply(Outcome::LoggedIn(Ok("tok".to_string())));
        let seq = app.state.latest_fetch();
        app.apply(Outcome::Fetched {
            seq,
            result: Ok(tasks),
        });
        app
    }

    #[test]
    fn test_login_screen_masks_password() {
        let mut app = App::new();
        app.state.login_form.email = "ana@example.com".to_string();
        app.state.login_form.password = "secret".to_string();

        let screen = render(&app);
        assert!(screen.contains("Email: ana@example.com"));
        assert!(screen.contains("Password: ******"));
        assert!(!screen.contains("secret"));
        assert!(!screen.contains("Tasks ("));
    }

    #[test]
    fn test_task_screen_shows_rows_and_tags() {
        let app = signed_in_with(vec![
            Task::new(1, "buy milk", false).with_tags(["home", "urgent"]),
            Task::new(2, "call mum", true),
        ]);

        let screen = render(&app);
        assert!(!screen.contains("Login"));
        assert!(screen.contains("[ ] buy milk [tags: home, urgent]"));
        assert!(screen.contains("[x] call mum"));
        assert!(screen.contains("Tasks (All)"));
    }

    #[test]
    fn test_error_popup_is_drawn() {
        let mut app = signed_in_with(Vec::new());
        app.error_message = Some("Could not save task".to_string());
        assert!(render(&app).contains("Could not save task"));
    }

    #[test]
    fn test_notice_replaces_help_line() {
        let mut app = signed_in_with(Vec::new());
        app.state.notice = Some("Could not load tasks".to_string());
        let screen = render(&app);
        assert!(screen.contains("Could not load tasks"));
        assert!(!screen.contains("sign out"));
    }

    #[test]
    fn test_loading_shows_alongside_notice() {
        let mut app = signed_in_with(Vec::new());
        app.state.notice = Some("Could not load tasks".to_string());
        app.in_flight = 1;

        let screen = render(&app);
        assert!(screen.contains("Loading..."));
        assert!(screen.contains("Could not load tasks"));
    }

    #[test]
    fn test_cursor_stays_inside_input_box() {
        let mut app = signed_in_with(Vec::new());
        app.focus = Pane::TagFilter;
        app.state.tag_input = "x".repeat(200);

        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|frame| draw(frame, &app)).unwrap();
        let cursor = terminal.get_cursor_position().unwrap();
        // Tag input spans columns 55..100 on the filter row
        assert_eq!(cursor.y, 4);
        assert_eq!(cursor.x, 98);
    }

    #[test]
    fn test_login_cursor_stays_on_field() {
        let mut app = App::new();
        app.state.login_form.email = "a".repeat(300);

        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|frame| draw(frame, &app)).unwrap();
        let cursor = terminal.get_cursor_position().unwrap();
        assert!(cursor.x < 100);
    }
}
