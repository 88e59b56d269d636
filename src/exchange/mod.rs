//! Credential exchange
//!
//! Session state machine for trading identity-provider credentials for
//! backend-issued tokens.

mod flow;
mod session;

pub use flow::{AuthState, ExchangeFlow, WidgetEvent};
pub use session::{AuthLogEntry, LogKind, Session};
