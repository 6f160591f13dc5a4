pub mod color;
pub mod grid;
pub mod week_range;

pub use color::{color_for, ColorCache, CourseColor, Hsl};
pub use grid::{
    available_weeks, build_grid, filter_week, merge_weeks, GridCell, GridRow, TimetableGrid,
    WeekSelection,
};
pub use week_range::{format_weeks, week_label};
