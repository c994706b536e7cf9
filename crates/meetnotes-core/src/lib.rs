//! Core types: notes, versions, roles, access decisions, tracing

pub mod access;
pub mod note;
pub mod role;
pub mod tracing;

pub use access::{AccessDenied, AccessGate, Actor, Operation};
pub use note::{Note, NoteVersion, next_update_time, truncate_to_millis};
pub use role::{InvalidRole, OwnerIdentity, Role, UserRole, normalize_email};
pub use tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
