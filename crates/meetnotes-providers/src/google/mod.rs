//! Google identity and calendar clients.
//!
//! ```ignore
//! use meetnotes_providers::google::{GoogleCalendar, GoogleConfig, GoogleOAuth, OAuthCredentials};
//!
//! let config = GoogleConfig::new(
//!     OAuthCredentials::new(client_id, client_secret),
//!     "http://localhost:3001/api/auth/google/callback",
//! );
//! let identity = GoogleOAuth::new(config.clone())?;
//! let calendar = GoogleCalendar::new(&config)?;
//! ```

mod calendar;
mod config;
mod oauth;

pub use calendar::GoogleCalendar;
pub use config::{GoogleConfig, OAuthCredentials};
pub use oauth::GoogleOAuth;
