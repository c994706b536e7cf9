//! Note commands.

use meetnotes_core::Note;

use crate::api::ApiClient;
use crate::error::ClientResult;

use super::{format_time, preview, print_json, read_content};

pub async fn list(api: &ApiClient, json: bool) -> ClientResult<()> {
    let notes = api.list_notes().await?;
    if json {
        return print_json(&notes);
    }
    if notes.is_empty() {
        println!("No notes.");
        return Ok(());
    }
    for note in &notes {
        println!(
            "{:<28} {}  {}",
            note.event_id,
            format_time(note.updated_at),
            preview(&note.content, 60)
        );
    }
    Ok(())
}

pub async fn show(api: &ApiClient, event_id: &str, json: bool) -> ClientResult<()> {
    let note = api.get_note(event_id).await?;
    if json {
        return print_json(&note);
    }
    print_header(&note);
    println!();
    println!("{}", note.content);
    Ok(())
}

pub async fn history(api: &ApiClient, event_id: &str, json: bool) -> ClientResult<()> {
    let note = api.get_note(event_id).await?;
    if json {
        return print_json(note.versions());
    }
    print_header(&note);
    for (i, version) in note.versions().iter().enumerate() {
        println!();
        println!(
            "#{} {} by {}",
            i + 1,
            format_time(version.timestamp),
            version.editor
        );
        println!("{}", version.content);
    }
    println!();
    println!(
        "current {} by {}",
        format_time(note.updated_at),
        note.last_editor
    );
    println!("{}", note.content);
    Ok(())
}

/// Creates or updates a note.
///
/// Existing notes go through `PUT`, new ones through `POST`; both upsert, so
/// losing a race with a concurrent creator is harmless.
pub async fn put(api: &ApiClient, event_id: &str, content: &str, json: bool) -> ClientResult<()> {
    let content = read_content(content)?;
    let note = match api.get_note(event_id).await {
        Ok(_) => api.update_note(event_id, &content).await?,
        Err(e) if e.status() == Some(404) => api.create_note(event_id, &content).await?,
        Err(e) => return Err(e),
    };
    if json {
        return print_json(&note);
    }
    println!(
        "Saved note for {} ({} earlier versions)",
        note.event_id,
        note.versions().len()
    );
    Ok(())
}

fn print_header(note: &Note) {
    println!("event:   {}", note.event_id);
    println!("owner:   {}", note.user_email);
    println!(
        "updated: {} by {}",
        format_time(note.updated_at),
        note.last_editor
    );
    println!("created: {}", format_time(note.created_at));
    if !note.versions().is_empty() {
        println!("history: {} versions", note.versions().len());
    }
}
