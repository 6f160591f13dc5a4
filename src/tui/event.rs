use crossterm::event::{self, Event, KeyCode, KeyModifiers};
use std::time::Duration;

use super::{App, Tab};

pub fn poll_event(timeout: Duration) -> anyhow::Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

pub fn handle_key(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
    match (code, modifiers) {
        (KeyCode::Char('q'), _) | (KeyCode::Char('c'), KeyModifiers::CONTROL) => {
            app.running = false;
            return;
        }
        (KeyCode::Tab, _) => {
            app.active_tab = app.active_tab.next();
            return;
        }
        (KeyCode::BackTab, _) => {
            app.active_tab = app.active_tab.prev();
            return;
        }
        (KeyCode::Char('1'), _) => {
            app.active_tab = Tab::Timetable;
            return;
        }
        (KeyCode::Char('2'), _) => {
            app.active_tab = Tab::Courses;
            return;
        }
        _ => {}
    }

    match code {
        KeyCode::Char(']') | KeyCode::Char('n') => app.next_week(),
        KeyCode::Char('[') | KeyCode::Char('p') => app.prev_week(),
        KeyCode::Char('a') => app.toggle_all_weeks(),
        KeyCode::Char('m') => app.toggle_max_slot(),
        KeyCode::Enter | KeyCode::Char('d') => app.show_detail = !app.show_detail,
        KeyCode::Esc => app.show_detail = false,
        KeyCode::Char('r') => app.needs_reload = true,
        _ => match app.active_tab {
            Tab::Timetable => handle_grid_key(app, code),
            Tab::Courses => handle_list_key(app, code),
        },
    }
}

fn handle_grid_key(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Left | KeyCode::Char('h') => app.move_left(),
        KeyCode::Right | KeyCode::Char('l') => app.move_right(),
        KeyCode::Down | KeyCode::Char('j') => app.move_down(),
        KeyCode::Up | KeyCode::Char('k') => app.move_up(),
        KeyCode::Home | KeyCode::Char('g') => app.cursor_slot = 1,
        KeyCode::End | KeyCode::Char('G') => {
            app.cursor_slot = app.max_slot;
        }
        _ => {}
    }
}

fn handle_list_key(app: &mut App, code: KeyCode) {
    let ls = &mut app.course_list_state;
    match code {
        KeyCode::Down | KeyCode::Char('j') => ls.select_next(),
        KeyCode::Up | KeyCode::Char('k') => ls.select_prev(),
        KeyCode::Home | KeyCode::Char('g') => ls.selected = 0,
        KeyCode::End | KeyCode::Char('G') => {
            if ls.len > 0 {
                ls.selected = ls.len - 1;
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::schedule::WeekSelection;
    use std::path::PathBuf;

    fn app() -> App {
        App::new(Config::default(), PathBuf::from("unused.json"), WeekSelection::All)
    }

    #[test]
    fn quit_keys() {
        let mut a = app();
        handle_key(&mut a, KeyCode::Char('q'), KeyModifiers::NONE);
        assert!(!a.running);

        let mut a = app();
        handle_key(&mut a, KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert!(!a.running);
    }

    #[test]
    fn tab_switching() {
        let mut a = app();
        handle_key(&mut a, KeyCode::Tab, KeyModifiers::NONE);
        assert_eq!(a.active_tab, Tab::Courses);
        handle_key(&mut a, KeyCode::Tab, KeyModifiers::NONE);
        assert_eq!(a.active_tab, Tab::Timetable);
        handle_key(&mut a, KeyCode::Char('2'), KeyModifiers::NONE);
        assert_eq!(a.active_tab, Tab::Courses);
    }

    #[test]
    fn grid_keys_move_cursor() {
        let mut a = app();
        handle_key(&mut a, KeyCode::Char('l'), KeyModifiers::NONE);
        handle_key(&mut a, KeyCode::Char('j'), KeyModifiers::NONE);
        assert_eq!((a.cursor_day, a.cursor_slot), (2, 2));
        handle_key(&mut a, KeyCode::Char('G'), KeyModifiers::NONE);
        assert_eq!(a.cursor_slot, 12);
    }

    #[test]
    fn detail_and_reload_flags() {
        let mut a = app();
        handle_key(&mut a, KeyCode::Enter, KeyModifiers::NONE);
        assert!(a.show_detail);
        handle_key(&mut a, KeyCode::Esc, KeyModifiers::NONE);
        assert!(!a.show_detail);
        handle_key(&mut a, KeyCode::Char('r'), KeyModifiers::NONE);
        assert!(a.needs_reload);
    }
}
