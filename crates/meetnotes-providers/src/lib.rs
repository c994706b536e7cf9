//! Identity and calendar providers.
//!
//! - [`IdentityProvider`]: OAuth code exchange, token refresh, profile lookup
//! - [`CalendarApi`]: calendar event listing, lookup and push channels
//! - [`google`]: implementations of both against Google APIs
//! - [`ProviderError`]: upstream failure with a coarse [`ProviderErrorCode`]

pub mod error;
pub mod google;
pub mod provider;

pub use error::{ProviderError, ProviderErrorCode, ProviderResult};
pub use provider::{
    BoxFuture, CalendarApi, EventWindow, IdentityProfile, IdentityProvider, TokenSet,
    UnconfiguredProvider, WatchChannel,
};
