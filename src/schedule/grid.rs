//! Lays a flat per-week schedule out as a slot × weekday grid.
//!
//! The backend sends one record per course per teaching week. In single-week
//! mode the records for that week are laid out directly; in all-weeks mode
//! records sharing `(course code, weekday, start, end, location)` are folded
//! into one entry carrying every week they occur in. Consecutive-period
//! courses occupy a single start cell with `row_span > 1`, and the rows below
//! it are flagged `is_occupied` so the renderer skips them.

use std::collections::HashMap;

use crate::models::ScheduleEntry;

pub const DAYS_PER_WEEK: usize = 7;

// ─── Week selection ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WeekSelection {
    #[default]
    All,
    Week(u32),
}

impl From<u32> for WeekSelection {
    /// `0` selects all weeks.
    fn from(week: u32) -> Self {
        if week == 0 {
            Self::All
        } else {
            Self::Week(week)
        }
    }
}

impl WeekSelection {
    pub fn label(self) -> String {
        match self {
            Self::All => "全部周".into(),
            Self::Week(w) => format!("第{w}周"),
        }
    }
}

// ─── Grid ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GridCell {
    /// Entries drawn in this cell: those starting here plus any that start
    /// inside its span.
    pub courses: Vec<ScheduleEntry>,
    pub row_span: u32,
    /// Covered by a course that started in an earlier row.
    pub is_occupied: bool,
}

impl GridCell {
    pub fn is_empty(&self) -> bool {
        self.courses.is_empty() && !self.is_occupied
    }

    /// Two of the courses meet in the same slot in the same week. Courses
    /// sharing a cell on disjoint weeks (odd/even alternation) are not a
    /// conflict.
    pub fn is_conflict(&self) -> bool {
        self.courses.iter().enumerate().any(|(i, a)| {
            self.courses[i + 1..].iter().any(|b| {
                a.start_slot <= b.end_slot
                    && b.start_slot <= a.end_slot
                    && a.weeks.iter().any(|w| b.has_week(*w))
            })
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridRow {
    pub slot: u32,
    /// Indexed by weekday - 1.
    pub cells: [GridCell; DAYS_PER_WEEK],
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimetableGrid {
    pub max_slot: u32,
    pub selection: WeekSelection,
    pub rows: Vec<GridRow>,
}

impl TimetableGrid {
    pub fn cell(&self, weekday: u8, slot: u32) -> Option<&GridCell> {
        if weekday == 0 || slot == 0 {
            return None;
        }
        self.rows
            .get(slot as usize - 1)
            .and_then(|row| row.cells.get(weekday as usize - 1))
    }

    /// The start cell whose content covers `(weekday, slot)`, with its slot.
    pub fn owning_cell(&self, weekday: u8, slot: u32) -> Option<(u32, &GridCell)> {
        let mut s = slot;
        while s >= 1 {
            let cell = self.cell(weekday, s)?;
            if !cell.is_occupied {
                return Some((s, cell));
            }
            s -= 1;
        }
        None
    }

    /// `(weekday, slot)` of every start cell whose courses collide.
    pub fn conflicts(&self) -> Vec<(u8, u32)> {
        let mut out = Vec::new();
        for row in &self.rows {
            for (idx, cell) in row.cells.iter().enumerate() {
                if cell.is_conflict() {
                    out.push((idx as u8 + 1, row.slot));
                }
            }
        }
        out
    }

    pub fn course_count(&self) -> usize {
        self.rows
            .iter()
            .flat_map(|r| r.cells.iter())
            .map(|c| c.courses.len())
            .sum()
    }
}

// ─── Merge / filter ─────────────────────────────────────────────────────────

/// Fold entries that describe the same recurring occurrence into one,
/// keeping first-seen order and the first entry's metadata.
pub fn merge_weeks(entries: &[ScheduleEntry]) -> Vec<ScheduleEntry> {
    let mut merged: Vec<ScheduleEntry> = Vec::new();
    let mut index: HashMap<(String, u8, u32, u32, String), usize> = HashMap::new();

    for entry in entries {
        let (code, weekday, start, end, location) = entry.merge_key();
        let key = (code.to_string(), weekday, start, end, location.to_string());
        match index.get(&key) {
            Some(&i) => merged[i].weeks.extend_from_slice(&entry.weeks),
            None => {
                index.insert(key, merged.len());
                merged.push(entry.clone());
            }
        }
    }

    for entry in &mut merged {
        entry.weeks.sort_unstable();
        entry.weeks.dedup();
    }
    merged
}

pub fn filter_week(entries: &[ScheduleEntry], week: u32) -> Vec<ScheduleEntry> {
    entries.iter().filter(|e| e.has_week(week)).cloned().collect()
}

/// Every teaching week that appears in the schedule, ascending.
pub fn available_weeks(entries: &[ScheduleEntry]) -> Vec<u32> {
    let mut weeks: Vec<u32> = entries.iter().flat_map(|e| e.weeks.iter().copied()).collect();
    weeks.sort_unstable();
    weeks.dedup();
    weeks
}

// ─── Layout ─────────────────────────────────────────────────────────────────

pub fn build_grid(
    entries: &[ScheduleEntry],
    selection: WeekSelection,
    max_slot: u32,
) -> TimetableGrid {
    let visible = match selection {
        WeekSelection::All => merge_weeks(entries),
        WeekSelection::Week(w) => filter_week(entries, w),
    };

    let mut by_day: [Vec<&ScheduleEntry>; DAYS_PER_WEEK] = Default::default();
    for entry in &visible {
        if let Some(day) = (entry.weekday as usize).checked_sub(1) {
            if let Some(list) = by_day.get_mut(day) {
                list.push(entry);
            }
        }
    }

    let mut columns: Vec<std::vec::IntoIter<GridCell>> = by_day
        .iter()
        .map(|day| layout_day(day, max_slot).into_iter())
        .collect();

    let rows = (1..=max_slot)
        .map(|slot| GridRow {
            slot,
            cells: std::array::from_fn(|day| columns[day].next().unwrap_or_default()),
        })
        .collect();

    TimetableGrid {
        max_slot,
        selection,
        rows,
    }
}

/// Lay out one weekday top-down. A course starting inside a span opened in
/// an earlier row joins that start cell and may extend it; the row itself
/// stays occupied.
fn layout_day(day: &[&ScheduleEntry], max_slot: u32) -> Vec<GridCell> {
    let mut cells: Vec<GridCell> = (0..max_slot).map(|_| GridCell::default()).collect();
    let mut owner: Option<usize> = None;
    let mut covered_until = 0;

    for slot in 1..=max_slot {
        let idx = slot as usize - 1;
        let starting: Vec<ScheduleEntry> = day
            .iter()
            .filter(|e| e.start_slot == slot)
            .map(|e| (*e).clone())
            .collect();
        let reach = starting.iter().map(|e| e.end_slot.min(max_slot)).max();

        if slot <= covered_until {
            cells[idx].is_occupied = true;
            if let Some(o) = owner {
                cells[o].courses.extend(starting);
            }
        } else if !starting.is_empty() {
            owner = Some(idx);
            cells[idx].courses = starting;
        } else {
            continue;
        }

        covered_until = covered_until.max(reach.unwrap_or(slot));
        if let Some(o) = owner {
            cells[o].row_span = covered_until - o as u32;
        }
    }
    cells
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(
        code: &str,
        weekday: u8,
        start: u32,
        end: u32,
        week: u32,
        location: &str,
    ) -> ScheduleEntry {
        ScheduleEntry {
            id: format!("{code}-{week}"),
            course_uuid: code.to_lowercase(),
            course_name: code.to_string(),
            course_code: code.to_string(),
            teacher_name: None,
            class_name: None,
            teaching_class_name: None,
            location: location.to_string(),
            campus: None,
            building: None,
            weekday,
            start_slot: start,
            end_slot: end,
            weeks: vec![week],
            classroom_type: None,
            total_hours: None,
            credit_hour_type: None,
            consecutive_sessions: None,
        }
    }

    #[test]
    fn zero_selects_all_weeks() {
        assert_eq!(WeekSelection::from(0), WeekSelection::All);
        assert_eq!(WeekSelection::from(4), WeekSelection::Week(4));
    }

    #[test]
    fn empty_schedule_gives_empty_grid() {
        let grid = build_grid(&[], WeekSelection::All, 12);
        assert_eq!(grid.rows.len(), 12);
        assert!(grid.rows.iter().all(|r| r.cells.iter().all(GridCell::is_empty)));
    }

    #[test]
    fn merge_unions_weeks() {
        let entries = vec![
            entry("CS101", 1, 1, 2, 3, "A301"),
            entry("CS101", 1, 1, 2, 1, "A301"),
            entry("CS101", 1, 1, 2, 3, "A301"),
            entry("CS101", 1, 1, 2, 2, "B202"),
            entry("MA201", 2, 3, 4, 1, "A301"),
        ];
        let merged = merge_weeks(&entries);
        assert_eq!(merged.len(), 3);
        assert_eq!(merged[0].weeks, vec![1, 3]);
        assert_eq!(merged[0].location, "A301");
        assert_eq!(merged[1].weeks, vec![2]);
        assert_eq!(merged[2].course_code, "MA201");
    }

    #[test]
    fn merge_is_idempotent() {
        let entries = vec![
            entry("CS101", 1, 1, 2, 1, "A301"),
            entry("CS101", 1, 1, 2, 2, "A301"),
            entry("PE100", 5, 7, 8, 4, "操场"),
        ];
        let once = merge_weeks(&entries);
        assert_eq!(merge_weeks(&once), once);
    }

    #[test]
    fn span_marks_covered_rows() {
        let entries = vec![entry("CS101", 3, 2, 4, 1, "A301")];
        let grid = build_grid(&entries, WeekSelection::Week(1), 10);

        let start = grid.cell(3, 2).unwrap();
        assert_eq!(start.row_span, 3);
        assert!(!start.is_occupied);
        assert_eq!(start.courses.len(), 1);

        let occupied: Vec<u32> = grid
            .rows
            .iter()
            .filter(|r| r.cells[2].is_occupied)
            .map(|r| r.slot)
            .collect();
        assert_eq!(occupied, vec![3, 4]);
        assert!(grid.cell(3, 1).unwrap().is_empty());
        assert!(grid.cell(3, 5).unwrap().is_empty());
    }

    #[test]
    fn single_week_filters_other_weeks() {
        let entries = vec![
            entry("CS101", 1, 1, 2, 1, "A301"),
            entry("CS101", 1, 1, 2, 2, "A301"),
            entry("MA201", 2, 3, 3, 2, "A301"),
        ];
        let grid = build_grid(&entries, WeekSelection::Week(1), 10);
        assert_eq!(grid.course_count(), 1);
        assert_eq!(grid.cell(1, 1).unwrap().courses[0].weeks, vec![1]);
        assert!(grid.cell(2, 3).unwrap().is_empty());
    }

    #[test]
    fn single_week_accepts_pre_merged_entries() {
        let merged = merge_weeks(&[
            entry("CS101", 1, 1, 2, 1, "A301"),
            entry("CS101", 1, 1, 2, 3, "A301"),
        ]);
        let grid = build_grid(&merged, WeekSelection::Week(3), 10);
        assert_eq!(grid.course_count(), 1);
        let grid = build_grid(&merged, WeekSelection::Week(2), 10);
        assert_eq!(grid.course_count(), 0);
    }

    #[test]
    fn double_booking_is_surfaced() {
        let entries = vec![
            entry("CS101", 4, 5, 6, 1, "A301"),
            entry("MA201", 4, 5, 7, 1, "B202"),
        ];
        let grid = build_grid(&entries, WeekSelection::Week(1), 10);
        let cell = grid.cell(4, 5).unwrap();
        assert_eq!(cell.courses.len(), 2);
        assert_eq!(cell.row_span, 3);
        assert!(grid.cell(4, 6).unwrap().is_occupied);
        assert!(grid.cell(4, 7).unwrap().is_occupied);
        assert_eq!(grid.conflicts(), vec![(4, 5)]);
    }

    #[test]
    fn span_past_max_slot_is_clamped() {
        let entries = vec![entry("EV900", 6, 9, 12, 1, "C101")];
        let grid = build_grid(&entries, WeekSelection::All, 10);
        assert_eq!(grid.rows.len(), 10);
        assert_eq!(grid.cell(6, 9).unwrap().row_span, 2);
        assert!(grid.cell(6, 10).unwrap().is_occupied);
    }

    #[test]
    fn start_past_max_slot_is_dropped() {
        let entries = vec![entry("EV900", 6, 11, 12, 1, "C101")];
        let grid = build_grid(&entries, WeekSelection::All, 10);
        assert_eq!(grid.course_count(), 0);
    }

    #[test]
    fn owning_cell_resolves_covered_rows() {
        let entries = vec![entry("CS101", 2, 3, 5, 1, "A301")];
        let grid = build_grid(&entries, WeekSelection::All, 10);
        let (slot, cell) = grid.owning_cell(2, 5).unwrap();
        assert_eq!(slot, 3);
        assert_eq!(cell.courses[0].course_code, "CS101");
        let (slot, cell) = grid.owning_cell(2, 8).unwrap();
        assert_eq!(slot, 8);
        assert!(cell.is_empty());
    }

    #[test]
    fn available_weeks_are_sorted_unique() {
        let entries = vec![
            entry("CS101", 1, 1, 2, 4, "A301"),
            entry("CS101", 1, 1, 2, 2, "A301"),
            entry("MA201", 2, 1, 2, 4, "A301"),
        ];
        assert_eq!(available_weeks(&entries), vec![2, 4]);
    }

    #[test]
    fn late_start_inside_span_joins_owning_cell() {
        let entries = vec![
            entry("CS101", 1, 1, 3, 1, "A301"),
            entry("MA201", 1, 2, 2, 1, "B202"),
        ];
        let grid = build_grid(&entries, WeekSelection::Week(1), 10);

        let start = grid.cell(1, 1).unwrap();
        assert_eq!(start.row_span, 3);
        let codes: Vec<&str> = start.courses.iter().map(|c| c.course_code.as_str()).collect();
        assert_eq!(codes, vec!["CS101", "MA201"]);

        let occupied: Vec<u32> = grid
            .rows
            .iter()
            .filter(|r| r.cells[0].is_occupied)
            .map(|r| r.slot)
            .collect();
        assert_eq!(occupied, vec![2, 3]);
        assert!(grid.cell(1, 2).unwrap().courses.is_empty());
        assert_eq!(grid.course_count(), 2);
        assert_eq!(grid.conflicts(), vec![(1, 1)]);
    }

    #[test]
    fn late_start_extends_span() {
        let entries = vec![
            entry("CS101", 2, 1, 2, 1, "A301"),
            entry("MA201", 2, 2, 4, 1, "B202"),
        ];
        let grid = build_grid(&entries, WeekSelection::Week(1), 10);
        assert_eq!(grid.cell(2, 1).unwrap().row_span, 4);
        assert!((2..=4).all(|s| grid.cell(2, s).unwrap().is_occupied));
        assert!(grid.cell(2, 5).unwrap().is_empty());
    }

    #[test]
    fn alternating_weeks_share_a_cell_without_conflict() {
        let mut entries = Vec::new();
        for w in [1, 3, 5] {
            entries.push(entry("ODD", 2, 1, 2, w, "R1"));
        }
        for w in [2, 4, 6] {
            entries.push(entry("EVEN", 2, 1, 2, w, "R2"));
        }
        let grid = build_grid(&entries, WeekSelection::All, 10);
        let cell = grid.cell(2, 1).unwrap();
        assert_eq!(cell.courses.len(), 2);
        assert!(!cell.is_conflict());
        assert!(grid.conflicts().is_empty());

        entries.push(entry("EXTRA", 2, 2, 2, 3, "R3"));
        let grid = build_grid(&entries, WeekSelection::All, 10);
        assert_eq!(grid.conflicts(), vec![(2, 1)]);
    }
}
