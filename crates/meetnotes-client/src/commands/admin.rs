//! Administrative commands.

use crate::api::ApiClient;
use crate::error::ClientResult;

use super::{format_time, preview, print_json, read_content};

pub async fn notes(api: &ApiClient, json: bool) -> ClientResult<()> {
    let notes = api.admin_notes().await?;
    if json {
        return print_json(&notes);
    }
    for note in &notes {
        println!(
            "{:<28} {:<28} {}  {}",
            note.id,
            note.user_email,
            format_time(note.updated_at),
            preview(&note.content, 40)
        );
    }
    println!("{} notes", notes.len());
    Ok(())
}

pub async fn edit(api: &ApiClient, note_id: &str, content: &str) -> ClientResult<()> {
    let content = read_content(content)?;
    let message = api.admin_update_note(note_id, &content).await?;
    println!("{}", message);
    Ok(())
}

pub async fn users(api: &ApiClient, json: bool) -> ClientResult<()> {
    let users = api.admin_users().await?;
    if json {
        return print_json(&users);
    }
    for user in &users {
        println!(
            "{:<36} {:<8} since {}",
            user.email,
            user.role.as_str(),
            format_time(user.created_at)
        );
    }
    Ok(())
}

pub async fn set_role(api: &ApiClient, email: &str, role: &str) -> ClientResult<()> {
    let message = api.set_role(email, &role.to_ascii_uppercase()).await?;
    println!("{}", message);
    Ok(())
}
