use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Tabs, Wrap},
    Frame,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use super::{App, Tab};
use crate::models::{weekday_name, ScheduleEntry, WEEKDAY_NAMES};
use crate::schedule::{week_label, CourseColor, GridCell, Hsl, WeekSelection};

const ACCENT: Color = Color::Cyan;
const HEADER_BG: Color = Color::DarkGray;
const SELECTED_BG: Color = Color::Rgb(40, 40, 60);
const DIM: Color = Color::DarkGray;
const WARN: Color = Color::Yellow;
const BAD: Color = Color::Red;

/// Width of the period label column ("12 21:45").
const SLOT_LABEL_WIDTH: u16 = 9;

// ─── Main render ────────────────────────────────────────────────────────────

pub fn render(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(f.area());

    render_tabs(f, app, chunks[0]);
    render_week_badge(f, app, chunks[0]);

    let body = if app.show_detail {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(68), Constraint::Percentage(32)])
            .split(chunks[1]);
        render_detail(f, app, cols[1]);
        cols[0]
    } else {
        chunks[1]
    };

    match app.active_tab {
        Tab::Timetable => render_timetable(f, app, body),
        Tab::Courses => render_courses(f, app, body),
    }

    render_status_bar(f, app, chunks[2]);
}

// ─── Tab Bar ────────────────────────────────────────────────────────────────

fn render_tabs(f: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = Tab::ALL
        .iter()
        .enumerate()
        .map(|(i, tab)| {
            Line::from(vec![
                Span::styled(format!(" {} ", i + 1), Style::default().fg(DIM)),
                Span::styled(format!("{} ", tab.title()), Style::default().fg(Color::White)),
            ])
        })
        .collect();

    let selected = Tab::ALL
        .iter()
        .position(|t| *t == app.active_tab)
        .unwrap_or(0);

    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::BOTTOM)
                .title(" Timetable ")
                .title_style(Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)),
        )
        .select(selected)
        .highlight_style(
            Style::default()
                .fg(ACCENT)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        );

    f.render_widget(tabs, area);
}

fn render_week_badge(f: &mut Frame, app: &App, tab_area: Rect) {
    let text = format!(" {}  {}节 ", app.selection.label(), app.max_slot);
    let width = text.width() as u16;
    let badge_area = Rect {
        x: tab_area.right().saturating_sub(width),
        y: tab_area.y,
        width: width.min(tab_area.width),
        height: 1,
    };
    f.render_widget(
        Paragraph::new(text).style(Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)),
        badge_area,
    );
}

// ─── Status Bar ─────────────────────────────────────────────────────────────

fn render_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let conflicts = app.grid.conflicts().len();
    let mut spans = vec![
        Span::styled(" ", Style::default()),
        Span::styled(&app.status_message, Style::default().fg(Color::White)),
    ];
    if conflicts > 0 {
        spans.push(Span::styled(
            format!("  {conflicts} 处冲突"),
            Style::default().fg(BAD).add_modifier(Modifier::BOLD),
        ));
    }
    spans.push(Span::styled(
        "  q:quit  Tab:switch  hjkl:move  [/]:week  a:all  m:slots  Enter:detail  r:reload  ",
        Style::default().fg(DIM),
    ));

    f.render_widget(
        Paragraph::new(Line::from(spans)).style(Style::default().bg(HEADER_BG)),
        area,
    );
}

// ─── Timetable ──────────────────────────────────────────────────────────────

fn to_color(hsl: Hsl) -> Color {
    let (r, g, b) = hsl.to_rgb();
    Color::Rgb(r, g, b)
}

fn render_timetable(f: &mut Frame, app: &mut App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", app.selection.label()))
        .title_style(Style::default().fg(ACCENT));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let max_slot = app.max_slot as u16;
    if inner.height < 2 || inner.width <= SLOT_LABEL_WIDTH + 7 || max_slot == 0 {
        return;
    }

    let col_width = (inner.width - SLOT_LABEL_WIDTH) / 7;
    let row_height = ((inner.height - 1) / max_slot).max(1);
    let grid_top = inner.y + 1;
    let bottom = inner.bottom();

    for (day, name) in WEEKDAY_NAMES.iter().enumerate() {
        let x = inner.x + SLOT_LABEL_WIDTH + day as u16 * col_width;
        let is_cursor_col = day as u8 + 1 == app.cursor_day;
        f.render_widget(
            Paragraph::new(Span::styled(
                pad_center(name, col_width as usize),
                Style::default()
                    .fg(if is_cursor_col { ACCENT } else { Color::White })
                    .add_modifier(Modifier::BOLD),
            )),
            Rect { x, y: inner.y, width: col_width, height: 1 },
        );
    }

    let selected_start = app.selected_cell().map(|(slot, _)| slot);
    let show_weeks = app.selection == WeekSelection::All;

    // Clone out the rows so color lookups can borrow the cache mutably.
    let rows = app.grid.rows.clone();
    for row in &rows {
        let y = grid_top + (row.slot as u16 - 1) * row_height;
        if y >= bottom {
            break;
        }

        let time = app
            .config
            .slot_time(row.slot)
            .map(|t| t.start.format("%H:%M").to_string())
            .unwrap_or_default();
        f.render_widget(
            Paragraph::new(Span::styled(
                format!("{:>2} {time}", row.slot),
                Style::default().fg(DIM),
            )),
            Rect { x: inner.x, y, width: SLOT_LABEL_WIDTH, height: 1 },
        );

        for (day, cell) in row.cells.iter().enumerate() {
            if cell.is_occupied {
                continue;
            }
            let span_rows = cell.row_span.max(1) as u16;
            let rect = Rect {
                x: inner.x + SLOT_LABEL_WIDTH + day as u16 * col_width,
                y,
                width: col_width,
                height: (row_height * span_rows).min(bottom - y),
            };
            let selected =
                day as u8 + 1 == app.cursor_day && selected_start == Some(row.slot);
            render_cell(f, app, cell, rect, selected, show_weeks);
        }
    }
}

fn render_cell(
    f: &mut Frame,
    app: &mut App,
    cell: &GridCell,
    rect: Rect,
    selected: bool,
    show_weeks: bool,
) {
    let width = rect.width.saturating_sub(1) as usize;

    let Some(first) = cell.courses.first() else {
        if selected {
            f.render_widget(
                Paragraph::new("").style(Style::default().bg(SELECTED_BG)),
                rect,
            );
        }
        return;
    };

    let color = app.color(first);
    let mut style = Style::default()
        .bg(to_color(color.background))
        .fg(to_color(color.text));
    if selected {
        style = style.add_modifier(Modifier::REVERSED);
    }

    let mut lines: Vec<Line> = Vec::new();
    if cell.is_conflict() {
        lines.push(Line::from(Span::styled(
            truncate(&format!("冲突 ×{}", cell.courses.len()), width),
            Style::default().fg(BAD).add_modifier(Modifier::BOLD),
        )));
        for course in &cell.courses {
            lines.push(Line::from(truncate(&course.course_name, width)));
        }
    } else if cell.courses.len() > 1 {
        // Shared cell on disjoint weeks.
        for course in &cell.courses {
            lines.push(Line::from(Span::styled(
                truncate(&course.course_name, width),
                Style::default().add_modifier(Modifier::BOLD),
            )));
            lines.push(Line::from(truncate(&week_label(&course.weeks), width)));
        }
    } else {
        lines.push(Line::from(Span::styled(
            truncate(&first.course_name, width),
            Style::default().add_modifier(Modifier::BOLD),
        )));
        if !first.location.is_empty() {
            lines.push(Line::from(truncate(&format!("@{}", first.location), width)));
        }
        if let Some(teacher) = &first.teacher_name {
            lines.push(Line::from(truncate(teacher, width)));
        }
        if show_weeks {
            lines.push(Line::from(truncate(&week_label(&first.weeks), width)));
        }
    }

    let border = to_color(color.border);
    f.render_widget(
        Paragraph::new(lines).style(style).block(
            Block::default()
                .borders(Borders::LEFT)
                .border_style(Style::default().fg(border).bg(to_color(color.background))),
        ),
        rect,
    );
}

// ─── Courses ────────────────────────────────────────────────────────────────

fn render_courses(f: &mut Frame, app: &mut App, area: Rect) {
    let courses = app.courses.clone();
    let mut items: Vec<ListItem> = Vec::with_capacity(courses.len());

    for (i, course) in courses.iter().enumerate() {
        let color = app.color(course);
        let is_selected = i == app.course_list_state.selected;
        let marker = if is_selected { "> " } else { "  " };
        let style = if is_selected {
            Style::default().bg(SELECTED_BG).fg(Color::White)
        } else {
            Style::default().fg(Color::White)
        };

        items.push(ListItem::new(Line::from(vec![
            Span::styled(marker, Style::default().fg(ACCENT)),
            Span::styled("██ ", Style::default().fg(to_color(color.background))),
            Span::styled(pad_right(&course.course_name, 24), style.add_modifier(Modifier::BOLD)),
            Span::styled(
                format!(
                    " {} {}-{}节",
                    weekday_name(course.weekday),
                    course.start_slot,
                    course.end_slot
                ),
                Style::default().fg(ACCENT),
            ),
            Span::styled(
                format!("  {}", pad_right(&course.location, 10)),
                Style::default().fg(DIM),
            ),
            Span::styled(format!("  {}", week_label(&course.weeks)), Style::default().fg(WARN)),
        ])));
    }

    if items.is_empty() {
        items.push(ListItem::new("  没有课程。"));
    }

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" 课程 ({}) ", courses.len()))
            .title_style(Style::default().fg(ACCENT)),
    );

    app.course_list_state
        .inner
        .select(Some(app.course_list_state.selected));
    f.render_stateful_widget(list, area, &mut app.course_list_state.inner);
}

// ─── Detail ─────────────────────────────────────────────────────────────────

fn render_detail(f: &mut Frame, app: &mut App, area: Rect) {
    let selected: Vec<ScheduleEntry> = match app.active_tab {
        Tab::Timetable => app
            .selected_cell()
            .map(|(_, cell)| cell.courses.clone())
            .unwrap_or_default(),
        Tab::Courses => app.selected_course().cloned().into_iter().collect(),
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" 详情 ")
        .title_style(Style::default().fg(ACCENT));

    if selected.is_empty() {
        f.render_widget(Paragraph::new("  此时段没有课程。").block(block), area);
        return;
    }

    let conflict = app.active_tab == Tab::Timetable
        && app.selected_cell().is_some_and(|(_, cell)| cell.is_conflict());

    let mut lines: Vec<Line> = Vec::new();
    if conflict {
        lines.push(Line::from(Span::styled(
            format!("时间冲突：{} 门课程", selected.len()),
            Style::default().fg(BAD).add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(""));
    }
    for (i, course) in selected.iter().enumerate() {
        if i > 0 {
            lines.push(Line::from(Span::styled("────", Style::default().fg(DIM))));
        }
        let color = app.color(course);
        lines.extend(detail_lines(app, course, color));
    }

    f.render_widget(
        Paragraph::new(lines).wrap(Wrap { trim: true }).block(block),
        area,
    );
}

fn detail_lines(app: &App, course: &ScheduleEntry, color: CourseColor) -> Vec<Line<'static>> {
    let field = |label: &str, value: String| {
        Line::from(vec![
            Span::styled(format!("{label}: "), Style::default().fg(DIM)),
            Span::raw(value),
        ])
    };
    let opt = |v: &Option<String>| v.clone().unwrap_or_else(|| "-".into());

    let times = match (
        app.config.slot_time(course.start_slot),
        app.config.slot_time(course.end_slot),
    ) {
        (Some(s), Some(e)) => format!(
            " ({}-{})",
            s.start.format("%H:%M"),
            e.end.format("%H:%M")
        ),
        _ => String::new(),
    };

    let location = [
        course.campus.as_deref(),
        course.building.as_deref(),
        Some(course.location.as_str()),
    ]
    .into_iter()
    .flatten()
    .filter(|s| !s.is_empty())
    .collect::<Vec<_>>()
    .join(" / ");

    vec![
        Line::from(Span::styled(
            course.course_name.clone(),
            Style::default()
                .fg(to_color(color.background))
                .add_modifier(Modifier::BOLD),
        )),
        field("课程代码", course.course_code.clone()),
        field("教师", opt(&course.teacher_name)),
        field(
            "班级",
            course
                .teaching_class_name
                .clone()
                .or_else(|| course.class_name.clone())
                .unwrap_or_else(|| "-".into()),
        ),
        field("地点", if location.is_empty() { "-".into() } else { location }),
        field("教室类型", opt(&course.classroom_type)),
        field(
            "时间",
            format!(
                "{} 第{}-{}节{times}",
                weekday_name(course.weekday),
                course.start_slot,
                course.end_slot
            ),
        ),
        field("周次", week_label(&course.weeks)),
        field(
            "总学时",
            course
                .total_hours
                .map(|h| format!("{h}"))
                .unwrap_or_else(|| "-".into()),
        ),
        field("学时类型", opt(&course.credit_hour_type)),
        field(
            "连堂",
            course
                .consecutive_sessions
                .map(|n| n.to_string())
                .unwrap_or_else(|| "-".into()),
        ),
        field("颜色", color.background.to_string()),
    ]
}

// ─── Text helpers ───────────────────────────────────────────────────────────

/// Cut `s` to at most `width` terminal columns, ending in "…" when cut.
fn truncate(s: &str, width: usize) -> String {
    if s.width() <= width {
        return s.to_string();
    }
    if width == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in s.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out
}

fn pad_right(s: &str, width: usize) -> String {
    let cut = truncate(s, width);
    let fill = width.saturating_sub(cut.width());
    format!("{cut}{}", " ".repeat(fill))
}

fn pad_center(s: &str, width: usize) -> String {
    let cut = truncate(s, width);
    let fill = width.saturating_sub(cut.width());
    format!("{}{cut}", " ".repeat(fill / 2))
}
