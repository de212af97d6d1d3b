use colored::*;
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone, Copy)]
enum Level {
    Ok,
    Info,
    Warning,
    Error,
    Debug,
}

/// UTC wall clock as `HH:MM:SS.mmm`
fn timestamp() -> String {
    match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(elapsed) => {
            let secs = elapsed.as_secs();
            format!(
                "{:02}:{:02}:{:02}.{:03}",
                (secs / 3600) % 24,
                (secs / 60) % 60,
                secs % 60,
                elapsed.subsec_millis()
            )
        }
        Err(_) => "00:00:00.000".to_string(),
    }
}

fn paint(level: Level, text: &str) -> ColoredString {
    match level {
        Level::Ok => text.green(),
        Level::Info => text.blue(),
        Level::Warning => text.yellow(),
        Level::Error => text.red(),
        Level::Debug => text.normal(),
    }
}

fn emit(level: Level, component: &str, msg: &str) {
    let line = format!(
        "[{}][{}] {}",
        timestamp(),
        paint(level, component).bold(),
        paint(level, msg)
    );
    match level {
        Level::Warning | Level::Error => eprintln!("{}", line),
        _ => println!("{}", line),
    }
}

pub fn ok(component: &str, msg: &str) {
    emit(Level::Ok, component, msg);
}

pub fn info(component: &str, msg: &str) {
    emit(Level::Info, component, msg);
}

pub fn warning(component: &str, msg: &str) {
    emit(Level::Warning, component, msg);
}

pub fn error(component: &str, msg: &str) {
    emit(Level::Error, component, msg);
}

pub fn debug(component: &str, msg: &str) {
    emit(Level::Debug, component, msg);
}
