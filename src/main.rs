use anyhow::{bail, Context, Result};
use crossterm::{
    event::{Event, KeyEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use timetable_tui::config::Config;
use timetable_tui::logging;
use timetable_tui::schedule::WeekSelection;
use timetable_tui::tui::{self, App};

struct Args {
    schedule_path: Option<PathBuf>,
    week: Option<u32>,
    max_slot: Option<u32>,
}

fn parse_args(args: &[String]) -> Result<Args> {
    let mut parsed = Args {
        schedule_path: None,
        week: None,
        max_slot: None,
    };
    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--week" | "-w" => {
                let v = iter.next().with_context(|| "--week needs a value")?;
                parsed.week = Some(
                    v.parse()
                        .with_context(|| format!("--week expects a number, got {v}"))?,
                );
            }
            "--slots" | "-s" => {
                let v = iter.next().with_context(|| "--slots needs a value")?;
                parsed.max_slot = Some(
                    v.parse()
                        .with_context(|| format!("--slots expects 10 or 12, got {v}"))?,
                );
            }
            other if other.starts_with('-') => bail!("Unknown option {other}. See --help."),
            path => parsed.schedule_path = Some(PathBuf::from(path)),
        }
    }
    Ok(parsed)
}

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.iter().any(|a| a == "--init") {
        let path = Config::generate_default()?;
        println!("Generated config file at: {}", path.display());
        println!("Point schedule_path at a schedule JSON export, then run timetable-tui.");
        return Ok(());
    }

    if args.iter().any(|a| a == "--help" || a == "-h") {
        println!("timetable-tui — weekly course timetable in the terminal");
        println!();
        println!("USAGE:");
        println!("  timetable-tui [SCHEDULE.json] [--week N] [--slots 10|12]");
        println!("  timetable-tui --init    Generate a default config file");
        println!();
        println!("  --week N     Week to show on startup (0 = all weeks merged)");
        println!("  --slots N    Periods per day, 10 or 12");
        println!();
        println!("CONFIG:");
        println!("  File: ~/.config/timetable-tui/config.toml");
        println!("  Or set env vars: TIMETABLE_SCHEDULE, TIMETABLE_MAX_SLOT, TIMETABLE_WEEK");
        println!();
        println!("KEYBINDINGS:");
        println!("  Tab / 1-2          Switch tabs");
        println!("  h j k l / arrows   Move the cursor");
        println!("  [ / ]              Previous / next week");
        println!("  a                  Toggle all-weeks mode");
        println!("  m                  Toggle 10 / 12 periods");
        println!("  Enter              Toggle the detail pane");
        println!("  r                  Reload the schedule file");
        println!("  q / Ctrl+C         Quit");
        return Ok(());
    }

    let args = parse_args(&args)?;

    let mut config = Config::load().with_context(|| {
        "Failed to load configuration.\n\
         Run `timetable-tui --init` to generate a config file,\n\
         or set TIMETABLE_SCHEDULE and friends as environment variables."
    })?;
    if let Some(max_slot) = args.max_slot {
        config.max_slot = max_slot;
        config.validate()?;
    }

    let schedule_path = args
        .schedule_path
        .or_else(|| config.schedule_path.clone())
        .with_context(|| {
            "No schedule file given. Pass a path, set schedule_path in config.toml, \
             or set TIMETABLE_SCHEDULE."
        })?;

    let log_path = logging::init(config.tracing_level()?)?;
    tracing::info!(log = %log_path.display(), schedule = %schedule_path.display(), "starting");

    let selection = WeekSelection::from(args.week.unwrap_or(config.default_week));
    let mut app = App::new(config, schedule_path, selection);
    app.reload();

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        tracing::error!(error = %format!("{e:#}"), "exited with error");
        eprintln!("Error: {e:#}");
    }

    Ok(())
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| tui::ui::render(f, app))?;

        if let Some(Event::Key(KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            ..
        })) = tui::event::poll_event(Duration::from_millis(250))?
        {
            tui::event::handle_key(app, code, modifiers);
        }

        if !app.running {
            break;
        }

        if app.needs_reload {
            app.needs_reload = false;
            app.reload();
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        std::iter::once("timetable-tui")
            .chain(args.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn parses_flags_and_path() {
        let args = parse_args(&argv(&["s.json", "--week", "3", "--slots", "10"])).unwrap();
        assert_eq!(args.schedule_path, Some(PathBuf::from("s.json")));
        assert_eq!(args.week, Some(3));
        assert_eq!(args.max_slot, Some(10));
    }

    #[test]
    fn rejects_unknown_flag_and_missing_value() {
        assert!(parse_args(&argv(&["--bogus"])).is_err());
        assert!(parse_args(&argv(&["--week"])).is_err());
        assert!(parse_args(&argv(&["--week", "x"])).is_err());
    }
}
