use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use clap::Parser;
use std::io::{self, Write};
use std::path::PathBuf;
use time_budget::display::{format_adjusted, format_adjusted_in, format_anchor, format_anchor_in};
use time_budget::{
    CalendarZone, Config, ItemId, KeyValueStore, MemoryStore, PersistenceResult, PlannerSession,
    Schedule, StoreBackend, SystemClock, export_timeline_csv_in, load_schedule_from_json,
    parse_duration, save_schedule_to_json,
};
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser)]
#[clap(about = "Work backward from an end time through a list of timed steps")]
struct Args {
    /// TOML config file (defaults to ./timebudget.toml)
    #[clap(long)]
    config: Option<PathBuf>,
    /// Where the schedule is saved
    #[clap(long)]
    store: Option<PathBuf>,
    #[clap(long, value_enum)]
    backend: Option<StoreBackend>,
    /// Show times and count months in UTC instead of local time
    #[clap(long)]
    utc: bool,
}

struct View {
    utc: bool,
}

impl View {
    fn time(&self, ts: DateTime<Utc>) -> String {
        if self.utc {
            format_adjusted_in(ts, &Utc)
        } else {
            format_adjusted(ts)
        }
    }

    fn anchor(&self, ts: DateTime<Utc>) -> String {
        if self.utc {
            format_anchor_in(ts, &Utc)
        } else {
            format_anchor(ts)
        }
    }

    fn zone(&self) -> CalendarZone {
        if self.utc {
            CalendarZone::Utc
        } else {
            CalendarZone::Local
        }
    }

    fn export_csv(&self, schedule: &Schedule, path: &str) -> PersistenceResult<()> {
        if self.utc {
            export_timeline_csv_in(schedule, path, &Utc)
        } else {
            export_timeline_csv_in(schedule, path, &Local)
        }
    }
}

type Session = PlannerSession<Box<dyn KeyValueStore>>;

fn init_logging(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_filter.as_str()));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn render_table(session: &Session, view: &View) -> String {
    let header = ["#", "id", "name", "duration", "start by"];
    let rows: Vec<[String; 5]> = session
        .timeline()
        .into_iter()
        .enumerate()
        .map(|(idx, entry)| {
            [
                (idx + 1).to_string(),
                entry.id.to_string(),
                entry.name,
                entry.duration_text,
                view.time(entry.adjusted),
            ]
        })
        .collect();

    let mut widths: Vec<usize> = header.iter().map(|h| h.len()).collect();
    for row in &rows {
        for (ci, cell) in row.iter().enumerate() {
            widths[ci] = widths[ci].max(cell.chars().count());
        }
    }

    let mut sep = String::from("+");
    for w in &widths {
        sep.push_str(&"-".repeat(*w + 2));
        sep.push('+');
    }

    let push_row = |out: &mut String, cells: &[&str]| {
        out.push('|');
        for (ci, cell) in cells.iter().enumerate() {
            out.push(' ');
            out.push_str(cell);
            let pad = widths[ci].saturating_sub(cell.chars().count());
            out.push_str(&" ".repeat(pad));
            out.push_str(" |");
        }
        out.push('\n');
    };

    let mut out = format!("End time: {}\n", view.anchor(session.schedule().end_timestamp()));
    out.push_str(&sep);
    out.push('\n');
    push_row(&mut out, &header[..]);
    out.push_str(&sep);
    out.push('\n');
    for row in &rows {
        let cells: Vec<&str> = row.iter().map(String::as_str).collect();
        push_row(&mut out, &cells[..]);
    }
    out.push_str(&sep);
    out.push('\n');
    if !rows.is_empty() {
        out.push_str(&format!(
            "Begin by: {}\n",
            view.time(session.earliest_start())
        ));
    }
    out
}

fn print_help() {
    println!(
        "Commands:\n  help                        Show this help\n  show                        Show the schedule\n  end <when>                  Set the end time (RFC 3339 or YYYY-MM-DD HH:MM local)\n  add [name...]               Append a new item\n  name <n> <text...>          Rename item n\n  dur <n> <text...>           Set item n's duration text (e.g. 1 hour 3 minutes)\n  rm <n>                      Remove item n\n  up <n>                      Move item n one slot toward the end\n  down <n>                    Move item n one slot toward the start\n  parse <text...>             Show how a duration text is read\n  save <json|csv> <path>      Export the schedule\n  load json <path>            Replace the schedule from a JSON export\n  quit|exit                   Exit"
    );
}

fn parse_end_time(input: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(input) {
        return Some(ts.with_timezone(&Utc));
    }
    let naive = NaiveDateTime::parse_from_str(input, "%Y-%m-%d %H:%M").ok()?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|ts| ts.with_timezone(&Utc))
}

fn resolve(session: &Session, position: Option<&str>) -> Result<ItemId, String> {
    let Some(position) = position else {
        return Err("Missing item number".to_string());
    };
    let n: usize = position
        .parse()
        .map_err(|_| format!("Invalid item number '{position}'"))?;
    n.checked_sub(1)
        .and_then(|idx| session.schedule().items().get(idx))
        .map(|item| item.id().clone())
        .ok_or_else(|| format!("No item {n}"))
}

/// Splits off the first word; the rest keeps its inner spacing.
fn split_word(input: &str) -> (&str, &str) {
    match input.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim_start()),
        None => (input, ""),
    }
}

fn open_session(config: &Config, zone: CalendarZone) -> Session {
    let store: Box<dyn KeyValueStore> = match config.open_store() {
        Ok(store) => store,
        Err(err) => {
            tracing::warn!(error = %err, "could not open store, changes will not be kept");
            Box::new(MemoryStore::new())
        }
    };
    PlannerSession::open(store, SystemClock).with_zone(zone)
}

fn main() {
    let args = Args::parse();
    let mut config = match Config::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
    };
    if let Some(store) = args.store {
        config.store_path = store;
    }
    if let Some(backend) = args.backend {
        config.store_backend = backend;
    }
    init_logging(&config);

    let view = View { utc: args.utc };
    let mut session = open_session(&config, view.zone());

    println!("Time Budget - type 'help' for commands\n");
    println!("{}", render_table(&session, &view));

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        line.clear();
        match stdin.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let input = line.trim_start().trim_end_matches(['\r', '\n']);
        if input.trim().is_empty() {
            continue;
        }

        let (cmd, rest) = split_word(input);
        let mut parts = rest.split_whitespace();

        match cmd {
            "help" => print_help(),
            "quit" | "exit" => break,
            "show" => println!("{}", render_table(&session, &view)),
            "end" => {
                let when = rest.trim();
                if when.is_empty() {
                    println!("Usage: end <RFC 3339 | YYYY-MM-DD HH:MM>");
                    continue;
                }
                match parse_end_time(when) {
                    Some(end) => {
                        session.set_end_timestamp(end);
                        println!("End time set.\n{}", render_table(&session, &view));
                    }
                    None => println!("Invalid time (RFC 3339 or YYYY-MM-DD HH:MM)"),
                }
            }
            "add" => {
                let id = session.add_item();
                if !rest.is_empty() {
                    session.set_item_name(&id, rest);
                }
                println!("Added item {}.", session.schedule().len());
                println!("{}", render_table(&session, &view));
            }
            "name" | "dur" => {
                let (position, text) = split_word(rest);
                let position = Some(position).filter(|p| !p.is_empty());
                let id = match resolve(&session, position) {
                    Ok(id) => id,
                    Err(msg) => {
                        println!("{msg}");
                        continue;
                    }
                };
                if cmd == "name" {
                    session.set_item_name(&id, text);
                } else {
                    session.set_item_duration(&id, text);
                }
                println!("{}", render_table(&session, &view));
            }
            "rm" | "up" | "down" => {
                let id = match resolve(&session, parts.next()) {
                    Ok(id) => id,
                    Err(msg) => {
                        println!("{msg}");
                        continue;
                    }
                };
                match cmd {
                    "rm" => {
                        session.remove_item(&id);
                        println!("Removed item.");
                    }
                    "up" => {
                        session.move_up(&id);
                    }
                    _ => {
                        session.move_down(&id);
                    }
                }
                println!("{}", render_table(&session, &view));
            }
            "parse" => println!("{}", parse_duration(rest)),
            "save" => {
                let fmt = parts.next();
                let path = parts.next();
                let res = match (fmt, path) {
                    (Some("json"), Some(path)) => save_schedule_to_json(session.schedule(), path),
                    (Some("csv"), Some(path)) => view.export_csv(session.schedule(), path),
                    _ => {
                        println!("Usage: save <json|csv> <path>");
                        continue;
                    }
                };
                match res {
                    Ok(()) => println!("Schedule saved to {}.", path.unwrap_or_default()),
                    Err(e) => println!("Error saving schedule: {}", e),
                }
            }
            "load" => match (parts.next(), parts.next()) {
                (Some("json"), Some(path)) => match load_schedule_from_json(path) {
                    Ok(loaded) => {
                        session.replace_schedule(loaded);
                        println!("Schedule loaded from {}.", path);
                        println!("{}", render_table(&session, &view));
                    }
                    Err(e) => println!("Error loading schedule: {}", e),
                },
                _ => println!("Usage: load json <path>"),
            },
            _ => println!("Unknown command. Type 'help'."),
        }
    }
}
