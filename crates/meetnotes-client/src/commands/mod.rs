//! Subcommand implementations.

pub mod admin;
pub mod auth;
pub mod calendar;
pub mod config;
pub mod notes;

use std::io::Read;

use chrono::{DateTime, Local, Utc};
use serde::Serialize;

use crate::error::{ClientError, ClientResult};

/// Prints `value` as pretty JSON.
pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> ClientResult<()> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| ClientError::Protocol(format!("failed to format output: {}", e)))?;
    println!("{}", text);
    Ok(())
}

/// Resolves a content argument; `-` reads standard input.
pub(crate) fn read_content(arg: &str) -> ClientResult<String> {
    let content = if arg == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        arg.to_string()
    };
    if content.trim().is_empty() {
        return Err(ClientError::Input("content must not be empty".to_string()));
    }
    Ok(content)
}

pub(crate) fn format_time(time: DateTime<Utc>) -> String {
    time.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

/// First line of `text`, cut to `max` characters.
pub(crate) fn preview(text: &str, max: usize) -> String {
    let line = text.lines().next().unwrap_or_default();
    if line.chars().count() > max {
        let cut: String = line.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", cut)
    } else if text.lines().nth(1).is_some() {
        format!("{} …", line)
    } else {
        line.to_string()
    }
}
