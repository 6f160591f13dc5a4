use serde::{Deserialize, Serialize};

// ─── Wire record ────────────────────────────────────────────────────────────

/// One course occurrence in one teaching week, as returned by the
/// academic-affairs backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleItem {
    pub class_assignment_uuid: String,
    pub course_uuid: Option<String>,
    pub course_name: Option<String>,
    #[serde(default)]
    pub course_code: Option<String>,
    pub teacher_uuid: Option<String>,
    pub teacher_name: Option<String>,
    pub teaching_class_uuid: Option<String>,
    pub teaching_class_name: Option<String>,
    #[serde(default)]
    pub class_name: Option<String>,
    pub classroom_name: Option<String>,
    #[serde(default)]
    pub classroom_type: Option<String>,
    pub campus_name: Option<String>,
    pub building_name: Option<String>,
    pub day_of_week: i64,
    pub start_slot: i64,
    pub end_slot: i64,
    pub week: i64,
    pub total_hours: Option<f64>,
    pub credit_hour_type_name: Option<String>,
    pub consecutive_sessions: Option<u32>,
}

/// Response envelope used by the backend around list payloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    pub code: Option<i64>,
    pub message: Option<String>,
    pub data: T,
}

// ─── Validation ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScheduleError {
    #[error("{id}: weekday {weekday} is outside 1-7")]
    InvalidWeekday { id: String, weekday: i64 },
    #[error("{id}: slot range {start}-{end} is invalid")]
    InvalidSlotRange { id: String, start: i64, end: i64 },
    #[error("{id}: week {week} is not a positive teaching week")]
    InvalidWeek { id: String, week: i64 },
}

// ─── Domain record ──────────────────────────────────────────────────────────

/// A validated schedule entry. `weeks` is sorted, unique and never empty; an
/// entry fresh from the wire holds exactly one week, a merged entry holds the
/// union of its group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub id: String,
    pub course_uuid: String,
    pub course_name: String,
    pub course_code: String,
    pub teacher_name: Option<String>,
    pub class_name: Option<String>,
    pub teaching_class_name: Option<String>,
    pub location: String,
    pub campus: Option<String>,
    pub building: Option<String>,
    pub weekday: u8,
    pub start_slot: u32,
    pub end_slot: u32,
    pub weeks: Vec<u32>,
    pub classroom_type: Option<String>,
    pub total_hours: Option<f64>,
    pub credit_hour_type: Option<String>,
    pub consecutive_sessions: Option<u32>,
}

/// Identity of a recurring course occurrence across weeks.
pub type MergeKey<'a> = (&'a str, u8, u32, u32, &'a str);

impl ScheduleEntry {
    pub fn merge_key(&self) -> MergeKey<'_> {
        (
            self.course_code.as_str(),
            self.weekday,
            self.start_slot,
            self.end_slot,
            self.location.as_str(),
        )
    }

    /// Number of slot rows the entry covers.
    pub fn span(&self) -> u32 {
        self.end_slot - self.start_slot + 1
    }

    pub fn covers(&self, slot: u32) -> bool {
        self.start_slot <= slot && slot <= self.end_slot
    }

    /// Key used for color assignment: the course uuid, or code + name when
    /// the backend sent none.
    pub fn color_key(&self) -> String {
        if self.course_uuid.is_empty() {
            format!("{}{}", self.course_code, self.course_name)
        } else {
            self.course_uuid.clone()
        }
    }

    pub fn has_week(&self, week: u32) -> bool {
        self.weeks.contains(&week)
    }
}

impl TryFrom<ScheduleItem> for ScheduleEntry {
    type Error = ScheduleError;

    fn try_from(item: ScheduleItem) -> Result<Self, Self::Error> {
        let id = item.class_assignment_uuid;

        if !(1..=7).contains(&item.day_of_week) {
            return Err(ScheduleError::InvalidWeekday {
                id,
                weekday: item.day_of_week,
            });
        }
        if item.start_slot < 1
            || item.start_slot > item.end_slot
            || u32::try_from(item.end_slot).is_err()
        {
            return Err(ScheduleError::InvalidSlotRange {
                id,
                start: item.start_slot,
                end: item.end_slot,
            });
        }
        if item.week < 1 || u32::try_from(item.week).is_err() {
            return Err(ScheduleError::InvalidWeek { id, week: item.week });
        }

        let course_uuid = item.course_uuid.unwrap_or_default();
        let course_code = item
            .course_code
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| course_uuid.clone());

        Ok(Self {
            id,
            course_uuid,
            course_name: item.course_name.unwrap_or_else(|| "未命名课程".into()),
            course_code,
            teacher_name: item.teacher_name,
            class_name: item.class_name,
            teaching_class_name: item.teaching_class_name,
            location: item.classroom_name.unwrap_or_default(),
            campus: item.campus_name,
            building: item.building_name,
            weekday: item.day_of_week as u8,
            start_slot: item.start_slot as u32,
            end_slot: item.end_slot as u32,
            weeks: vec![item.week as u32],
            classroom_type: item.classroom_type,
            total_hours: item.total_hours,
            credit_hour_type: item.credit_hour_type_name,
            consecutive_sessions: item.consecutive_sessions,
        })
    }
}

// ─── Weekdays ───────────────────────────────────────────────────────────────

pub const WEEKDAY_NAMES: [&str; 7] = ["周一", "周二", "周三", "周四", "周五", "周六", "周日"];

pub fn weekday_name(weekday: u8) -> &'static str {
    WEEKDAY_NAMES
        .get(weekday.wrapping_sub(1) as usize)
        .copied()
        .unwrap_or("?")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(day: i64, start: i64, end: i64, week: i64) -> ScheduleItem {
        serde_json::from_value(json!({
            "class_assignment_uuid": "a-1",
            "course_uuid": "c-1",
            "course_name": "数据结构",
            "teacher_uuid": null,
            "teacher_name": "王老师",
            "teaching_class_uuid": null,
            "teaching_class_name": "计科2301",
            "classroom_name": "A301",
            "campus_name": "主校区",
            "building_name": "A栋",
            "day_of_week": day,
            "start_slot": start,
            "end_slot": end,
            "week": week,
            "total_hours": 64.0,
            "credit_hour_type_name": "理论",
            "consecutive_sessions": 2
        }))
        .unwrap()
    }

    #[test]
    fn converts_valid_item() {
        let entry = ScheduleEntry::try_from(item(3, 1, 2, 5)).unwrap();
        assert_eq!(entry.weekday, 3);
        assert_eq!(entry.weeks, vec![5]);
        assert_eq!(entry.span(), 2);
        assert_eq!(entry.course_code, "c-1");
        assert_eq!(entry.location, "A301");
        assert_eq!(entry.color_key(), "c-1");
    }

    #[test]
    fn rejects_out_of_range_weekday() {
        assert!(matches!(
            ScheduleEntry::try_from(item(0, 1, 2, 1)),
            Err(ScheduleError::InvalidWeekday { weekday: 0, .. })
        ));
        assert!(matches!(
            ScheduleEntry::try_from(item(8, 1, 2, 1)),
            Err(ScheduleError::InvalidWeekday { weekday: 8, .. })
        ));
    }

    #[test]
    fn rejects_inverted_or_zero_slots() {
        assert!(matches!(
            ScheduleEntry::try_from(item(1, 3, 2, 1)),
            Err(ScheduleError::InvalidSlotRange { .. })
        ));
        assert!(matches!(
            ScheduleEntry::try_from(item(1, 0, 2, 1)),
            Err(ScheduleError::InvalidSlotRange { .. })
        ));
    }

    #[test]
    fn rejects_week_zero() {
        assert!(matches!(
            ScheduleEntry::try_from(item(1, 1, 2, 0)),
            Err(ScheduleError::InvalidWeek { week: 0, .. })
        ));
    }

    #[test]
    fn color_key_falls_back_to_code_and_name() {
        let mut raw = item(1, 1, 1, 1);
        raw.course_uuid = None;
        raw.course_code = Some("CS101".into());
        let entry = ScheduleEntry::try_from(raw).unwrap();
        assert_eq!(entry.color_key(), "CS101数据结构");
    }

    #[test]
    fn weekday_names() {
        assert_eq!(weekday_name(1), "周一");
        assert_eq!(weekday_name(7), "周日");
        assert_eq!(weekday_name(0), "?");
    }
}
