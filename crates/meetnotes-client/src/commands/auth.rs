//! Sign-in and session commands.

use chrono::Utc;

use crate::api::ApiClient;
use crate::error::ClientResult;
use crate::token::{TokenStore, TokenSummary};

/// Prints the consent URL and what to do with the redirect.
pub async fn login(api: &ApiClient, json: bool) -> ClientResult<()> {
    let url = api.auth_url().await?;
    if json {
        return super::print_json(&serde_json::json!({ "url": url }));
    }
    println!("Open this URL in your browser and sign in with Google:");
    println!();
    println!("  {}", url);
    println!();
    println!("After sign-in you are redirected to a URL containing `token=...`.");
    println!("Store that value with: meetnotes token set <TOKEN>");
    Ok(())
}

pub fn logout(tokens: &TokenStore) -> ClientResult<()> {
    if tokens.clear()? {
        println!("Signed out.");
    } else {
        println!("No stored session.");
    }
    Ok(())
}

/// Stores a token after checking it at least looks like a session token.
pub fn set_token(tokens: &TokenStore, token: &str) -> ClientResult<()> {
    let summary = TokenSummary::decode(token.trim())?;
    tokens.save(token)?;
    println!(
        "Stored session for {} ({}) in {}",
        summary.email,
        summary.role,
        tokens.path().display()
    );
    Ok(())
}

pub fn show_token(tokens: &TokenStore, json: bool) -> ClientResult<()> {
    let token = tokens.require()?;
    let summary = TokenSummary::decode(&token)?;
    let expired = summary.is_expired(Utc::now());
    if json {
        return super::print_json(&serde_json::json!({
            "email": summary.email,
            "name": summary.name,
            "role": summary.role,
            "expiresAt": summary.exp.to_rfc3339(),
            "expired": expired,
        }));
    }
    println!("email:   {}", summary.email);
    if let Some(name) = &summary.name {
        println!("name:    {}", name);
    }
    println!("role:    {}", summary.role);
    println!(
        "expires: {}{}",
        super::format_time(summary.exp),
        if expired { " (expired)" } else { "" }
    );
    Ok(())
}

pub async fn whoami(api: &ApiClient, json: bool) -> ClientResult<()> {
    let user = api.verify().await?;
    if json {
        return super::print_json(&user);
    }
    match &user.name {
        Some(name) => println!("{} <{}>", name, user.email),
        None => println!("{}", user.email),
    }
    Ok(())
}

pub async fn health(api: &ApiClient, json: bool) -> ClientResult<()> {
    let health = api.health().await?;
    if json {
        return super::print_json(&health);
    }
    println!("server: {}", health.status);
    Ok(())
}
