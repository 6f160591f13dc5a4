pub mod event;
pub mod ui;

use crate::config::Config;
use crate::models::ScheduleEntry;
use crate::schedule::{
    available_weeks, build_grid, merge_weeks, ColorCache, CourseColor, GridCell, TimetableGrid,
    WeekSelection,
};
use crate::source::{self, LoadedSchedule};
use chrono::{DateTime, Local};
use ratatui::widgets::ListState as RListState;
use std::path::PathBuf;

// ─── Navigation ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Timetable,
    Courses,
}

impl Tab {
    pub const ALL: [Tab; 2] = [Tab::Timetable, Tab::Courses];

    pub fn title(&self) -> &'static str {
        match self {
            Tab::Timetable => "课表",
            Tab::Courses => "课程列表",
        }
    }

    pub fn next(&self) -> Tab {
        let idx = Tab::ALL.iter().position(|t| t == self).unwrap_or(0);
        Tab::ALL[(idx + 1) % Tab::ALL.len()]
    }

    pub fn prev(&self) -> Tab {
        let idx = Tab::ALL.iter().position(|t| t == self).unwrap_or(0);
        if idx == 0 {
            Tab::ALL[Tab::ALL.len() - 1]
        } else {
            Tab::ALL[idx - 1]
        }
    }
}

/// Tracks logical selection plus a persistent ratatui scroll offset.
pub struct ListState {
    pub inner: RListState,
    pub selected: usize,
    pub len: usize,
}

impl ListState {
    pub fn new() -> Self {
        let mut inner = RListState::default();
        inner.select(Some(0));
        Self { inner, selected: 0, len: 0 }
    }

    /// Move down — clamped at the last item (no wrap-around).
    pub fn select_next(&mut self) {
        if self.len > 0 && self.selected + 1 < self.len {
            self.selected += 1;
        }
    }

    /// Move up — clamped at the first item (no wrap-around).
    pub fn select_prev(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
        }
    }

    pub fn set_len(&mut self, len: usize) {
        self.len = len;
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
    }
}

impl Default for ListState {
    fn default() -> Self {
        Self::new()
    }
}

// ─── App State ──────────────────────────────────────────────────────────────

pub struct App {
    pub config: Config,
    pub schedule_path: PathBuf,
    pub running: bool,
    pub active_tab: Tab,

    // Data
    pub entries: Vec<ScheduleEntry>,
    pub weeks: Vec<u32>,
    /// All-weeks view of `entries`, ordered by weekday then start slot.
    pub courses: Vec<ScheduleEntry>,

    // Derived view; rebuilt only when entries, selection or max_slot change.
    pub selection: WeekSelection,
    pub max_slot: u32,
    pub grid: TimetableGrid,
    pub colors: ColorCache,

    // UI state
    pub cursor_day: u8,
    pub cursor_slot: u32,
    pub show_detail: bool,
    pub course_list_state: ListState,

    // Status
    pub status_message: String,
    pub loaded_at: Option<DateTime<Local>>,
    pub needs_reload: bool,
}

impl App {
    pub fn new(config: Config, schedule_path: PathBuf, selection: WeekSelection) -> Self {
        let max_slot = config.max_slot;
        Self {
            config,
            schedule_path,
            running: true,
            active_tab: Tab::Timetable,
            entries: Vec::new(),
            weeks: Vec::new(),
            courses: Vec::new(),
            selection,
            max_slot,
            grid: build_grid(&[], selection, max_slot),
            colors: ColorCache::new(),
            cursor_day: 1,
            cursor_slot: 1,
            show_detail: false,
            course_list_state: ListState::new(),
            status_message: "Loading...".into(),
            loaded_at: None,
            needs_reload: false,
        }
    }

    /// Re-read the schedule file. Failures leave the current data in place.
    pub fn reload(&mut self) {
        match source::load_schedule(&self.schedule_path) {
            Ok(loaded) => self.apply_schedule(loaded),
            Err(e) => {
                tracing::error!(error = %format!("{e:#}"), "reload failed");
                self.status_message = format!("Load error: {e:#}");
            }
        }
    }

    pub fn apply_schedule(&mut self, loaded: LoadedSchedule) {
        self.weeks = available_weeks(&loaded.entries);
        self.courses = merge_weeks(&loaded.entries);
        self.courses
            .sort_by_key(|c| (c.weekday, c.start_slot, c.end_slot));
        self.course_list_state.set_len(self.courses.len());
        self.entries = loaded.entries;
        self.loaded_at = Some(loaded.loaded_at);

        if let WeekSelection::Week(w) = self.selection {
            if !self.weeks.contains(&w) && !self.weeks.is_empty() {
                tracing::warn!(week = w, "selected week has no classes");
            }
        }
        self.rebuild_grid();

        let synced = loaded.loaded_at.format("%H:%M:%S");
        self.status_message = if loaded.rejected > 0 {
            format!(
                "{} 条记录已加载，{} 条无效记录已跳过 ({synced})",
                self.entries.len(),
                loaded.rejected
            )
        } else {
            format!("{} 条记录已加载 ({synced})", self.entries.len())
        };
    }

    pub fn rebuild_grid(&mut self) {
        self.grid = build_grid(&self.entries, self.selection, self.max_slot);
        let conflicts = self.grid.conflicts();
        if !conflicts.is_empty() {
            tracing::warn!(?conflicts, selection = ?self.selection, "double-booked cells");
        }
    }

    pub fn set_selection(&mut self, selection: WeekSelection) {
        if selection == self.selection {
            return;
        }
        tracing::debug!(from = ?self.selection, to = ?selection, "week selection changed");
        self.selection = selection;
        self.rebuild_grid();
    }

    /// Step forward through weeks that have classes; from all-weeks mode this
    /// lands on the first one.
    pub fn next_week(&mut self) {
        let next = match self.selection {
            WeekSelection::All => self.weeks.first().copied(),
            WeekSelection::Week(w) => self.weeks.iter().copied().find(|&x| x > w),
        };
        if let Some(week) = next {
            self.set_selection(WeekSelection::Week(week));
        }
    }

    /// Step back through weeks; stepping back from the first week returns to
    /// all-weeks mode.
    pub fn prev_week(&mut self) {
        if let WeekSelection::Week(w) = self.selection {
            let prev = self.weeks.iter().copied().rev().find(|&x| x < w);
            self.set_selection(prev.map_or(WeekSelection::All, WeekSelection::Week));
        }
    }

    pub fn toggle_all_weeks(&mut self) {
        match self.selection {
            WeekSelection::All => self.next_week(),
            WeekSelection::Week(_) => self.set_selection(WeekSelection::All),
        }
    }

    pub fn toggle_max_slot(&mut self) {
        let next = if self.max_slot == 12 { 10 } else { 12 };
        if self.config.slot_times.len() < next as usize {
            self.status_message = format!("slot_times 仅配置了 {} 节", self.config.slot_times.len());
            return;
        }
        self.max_slot = next;
        self.cursor_slot = self.cursor_slot.min(next);
        self.rebuild_grid();
    }

    // ── Cursor ───────────────────────────────────────────────────────────

    /// Start slot and cell under the cursor, resolving covered rows to the
    /// cell that spans them.
    pub fn selected_cell(&self) -> Option<(u32, &GridCell)> {
        self.grid.owning_cell(self.cursor_day, self.cursor_slot)
    }

    pub fn move_left(&mut self) {
        self.cursor_day = if self.cursor_day <= 1 { 7 } else { self.cursor_day - 1 };
    }

    pub fn move_right(&mut self) {
        self.cursor_day = if self.cursor_day >= 7 { 1 } else { self.cursor_day + 1 };
    }

    pub fn move_down(&mut self) {
        let next = match self.selected_cell() {
            Some((start, cell)) => start + cell.row_span.max(1),
            None => self.cursor_slot + 1,
        };
        if next <= self.max_slot {
            self.cursor_slot = next;
        }
    }

    pub fn move_up(&mut self) {
        let current = self
            .selected_cell()
            .map_or(self.cursor_slot, |(start, _)| start);
        if current > 1 {
            self.cursor_slot = self
                .grid
                .owning_cell(self.cursor_day, current - 1)
                .map_or(current - 1, |(start, _)| start);
        }
    }

    pub fn selected_course(&self) -> Option<&ScheduleEntry> {
        self.courses.get(self.course_list_state.selected)
    }

    pub fn color(&mut self, entry: &ScheduleEntry) -> CourseColor {
        self.colors.get(&entry.color_key())
    }
}
