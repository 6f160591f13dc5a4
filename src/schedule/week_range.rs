//! Compact display of the teaching weeks a course meets in.

/// Returned for an empty week set.
pub const NO_WEEKS: &str = "无";

/// Compress a set of week numbers into a short label.
///
/// Runs of consecutive weeks become `"a-b"` and are joined with `", "`. Sets
/// of more than two weeks that share parity collapse to `"min-max周(双)"` or
/// `"min-max周(单)"` without checking for gaps, so `{2, 4, 10}` reads the same
/// as a full biweekly run from 2 to 10.
pub fn format_weeks(weeks: &[u32]) -> String {
    let mut weeks = weeks.to_vec();
    weeks.sort_unstable();
    weeks.dedup();

    let (Some(&first), Some(&last)) = (weeks.first(), weeks.last()) else {
        return NO_WEEKS.into();
    };

    if weeks.len() == 1 {
        return format!("第{first}周");
    }

    if weeks.len() > 2 {
        if weeks.iter().all(|w| w % 2 == 0) {
            return format!("{first}-{last}周(双)");
        }
        if weeks.iter().all(|w| w % 2 == 1) {
            return format!("{first}-{last}周(单)");
        }
    }

    let mut runs: Vec<String> = Vec::new();
    let mut start = first;
    let mut prev = first;
    for &w in &weeks[1..] {
        if w != prev + 1 {
            runs.push(format_run(start, prev));
            start = w;
        }
        prev = w;
    }
    runs.push(format_run(start, prev));

    runs.join(", ")
}

fn format_run(start: u32, end: u32) -> String {
    if start == end {
        start.to_string()
    } else {
        format!("{start}-{end}")
    }
}

/// Label shown on a timetable cell: plain run lists are wrapped as `"第…周"`.
pub fn week_label(weeks: &[u32]) -> String {
    let formatted = format_weeks(weeks);
    if formatted == NO_WEEKS || formatted.contains('周') {
        formatted
    } else {
        format!("第{formatted}周")
    }
}
