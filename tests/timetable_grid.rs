use serde_json::json;
use timetable_tui::schedule::{
    build_grid, color_for, format_weeks, merge_weeks, week_label, ColorCache, WeekSelection,
};
use timetable_tui::source::parse_schedule;

fn record(code: &str, day: i64, start: i64, end: i64, week: i64, room: &str) -> serde_json::Value {
    json!({
        "class_assignment_uuid": format!("{code}-{day}-{start}-{week}"),
        "course_uuid": format!("uuid-{code}"),
        "course_name": code,
        "course_code": code,
        "teacher_uuid": "t-1",
        "teacher_name": "张老师",
        "teaching_class_uuid": "tc-1",
        "teaching_class_name": "计科2301",
        "classroom_name": room,
        "campus_name": "主校区",
        "building_name": "A栋",
        "day_of_week": day,
        "start_slot": start,
        "end_slot": end,
        "week": week,
        "total_hours": 32.0,
        "credit_hour_type_name": "理论",
        "consecutive_sessions": end - start + 1
    })
}

#[test]
fn all_weeks_scenario() {
    let body = json!([
        record("CS101", 1, 1, 2, 1, "A301"),
        record("CS101", 1, 1, 2, 2, "A301"),
    ])
    .to_string();
    let loaded = parse_schedule(&body).expect("parse schedule");
    let grid = build_grid(&loaded.entries, WeekSelection::from(0), 4);

    assert_eq!(grid.rows.len(), 4);

    let start = grid.cell(1, 1).expect("cell 1/1");
    assert_eq!(start.courses.len(), 1);
    assert_eq!(start.courses[0].weeks, vec![1, 2]);
    assert_eq!(start.row_span, 2);
    assert!(!start.is_occupied);
    assert_eq!(week_label(&start.courses[0].weeks), "第1-2周");

    assert!(grid.cell(1, 2).expect("cell 1/2").is_occupied);
    assert!(grid.cell(1, 3).expect("cell 1/3").is_empty());
    assert!(grid.cell(1, 4).expect("cell 1/4").is_empty());

    for day in 2..=7 {
        for slot in 1..=4 {
            assert!(grid.cell(day, slot).unwrap().is_empty(), "{day}/{slot}");
        }
    }
}

#[test]
fn occupied_rows_match_span_for_every_entry() {
    let body = json!([
        record("CS101", 1, 1, 2, 1, "A301"),
        record("MA201", 2, 3, 5, 1, "B202"),
        record("PH110", 3, 6, 6, 1, "C101"),
        record("EN120", 5, 7, 10, 1, "D404"),
    ])
    .to_string();
    let loaded = parse_schedule(&body).unwrap();
    let grid = build_grid(&loaded.entries, WeekSelection::Week(1), 12);

    for entry in &loaded.entries {
        let day = entry.weekday as usize - 1;
        let occupied = grid
            .rows
            .iter()
            .filter(|r| r.cells[day].is_occupied)
            .count() as u32;
        assert_eq!(occupied, entry.end_slot - entry.start_slot, "{}", entry.course_code);

        let start = grid.cell(entry.weekday, entry.start_slot).unwrap();
        assert!(!start.is_occupied);
        assert_eq!(start.row_span, entry.end_slot - entry.start_slot + 1);
    }
}

#[test]
fn biweekly_course_in_all_weeks_mode() {
    let body = json!((1..=8)
        .filter(|w| w % 2 == 0)
        .map(|w| record("PE100", 4, 7, 8, w, "操场"))
        .collect::<Vec<_>>())
    .to_string();
    let loaded = parse_schedule(&body).unwrap();
    let merged = merge_weeks(&loaded.entries);
    assert_eq!(merged.len(), 1);
    assert_eq!(format_weeks(&merged[0].weeks), "2-8周(双)");

    let grid = build_grid(&loaded.entries, WeekSelection::All, 10);
    assert_eq!(grid.cell(4, 7).unwrap().courses[0].weeks, vec![2, 4, 6, 8]);

    let grid = build_grid(&loaded.entries, WeekSelection::Week(3), 10);
    assert_eq!(grid.course_count(), 0);
}

#[test]
fn same_course_in_another_room_stays_separate() {
    let body = json!([
        record("CS101", 1, 1, 2, 1, "A301"),
        record("CS101", 1, 1, 2, 2, "B202"),
    ])
    .to_string();
    let loaded = parse_schedule(&body).unwrap();
    let grid = build_grid(&loaded.entries, WeekSelection::All, 10);
    let cell = grid.cell(1, 1).unwrap();
    assert_eq!(cell.courses.len(), 2);
    assert!(!cell.is_conflict());
    assert!(grid.conflicts().is_empty());
}

#[test]
fn overlapping_rooms_in_the_same_week_conflict() {
    let body = json!([
        record("CS101", 1, 1, 3, 1, "A301"),
        record("MA201", 1, 2, 2, 1, "B202"),
    ])
    .to_string();
    let loaded = parse_schedule(&body).unwrap();
    let grid = build_grid(&loaded.entries, WeekSelection::All, 10);
    let cell = grid.cell(1, 1).unwrap();
    assert_eq!(cell.row_span, 3);
    assert_eq!(cell.courses.len(), 2);
    assert!(grid.cell(1, 2).unwrap().is_occupied);
    assert_eq!(grid.conflicts(), vec![(1, 1)]);
}

#[test]
fn colors_survive_fresh_cache() {
    let mut a = ColorCache::new();
    let mut b = ColorCache::new();
    assert_eq!(a.get("uuid-CS101"), b.get("uuid-CS101"));
    assert_eq!(a.get("uuid-CS101"), color_for("uuid-CS101"));
}
