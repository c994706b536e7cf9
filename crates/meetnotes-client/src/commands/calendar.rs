//! Calendar commands.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::api::ApiClient;
use crate::error::ClientResult;

use super::print_json;

pub async fn upcoming(
    api: &ApiClient,
    from: Option<DateTime<Utc>>,
    to: Option<DateTime<Utc>>,
    json: bool,
) -> ClientResult<()> {
    let events = api.upcoming(from, to).await?;
    if json {
        return print_json(&events);
    }
    let events = events.as_array().map(Vec::as_slice).unwrap_or_default();
    if events.is_empty() {
        println!("No upcoming events.");
        return Ok(());
    }
    for event in events {
        println!("{}", event_line(event));
    }
    Ok(())
}

pub async fn event(api: &ApiClient, event_id: &str, json: bool) -> ClientResult<()> {
    let event = api.event(event_id).await?;
    if json {
        return print_json(&event);
    }
    println!("{}", event_line(&event));
    if let Some(description) = event["description"].as_str() {
        println!();
        println!("{}", description);
    }
    Ok(())
}

pub async fn watch(api: &ApiClient, json: bool) -> ClientResult<()> {
    let channel = api.watch().await?;
    if json {
        return print_json(&channel);
    }
    println!(
        "Watching calendar (channel {})",
        channel["id"].as_str().unwrap_or("?")
    );
    Ok(())
}

/// `start  id  summary` for a Google event resource.
fn event_line(event: &Value) -> String {
    let start = event["start"]["dateTime"]
        .as_str()
        .or_else(|| event["start"]["date"].as_str())
        .unwrap_or("?");
    let id = event["id"].as_str().unwrap_or("?");
    let summary = event["summary"].as_str().unwrap_or("(no title)");
    format!("{:<25} {:<28} {}", start, id, summary)
}
