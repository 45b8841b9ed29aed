//! Token lifecycle and authorization core.

pub mod codec;
pub mod gate;
pub mod service;
pub mod store;
pub mod token;

pub use gate::{decide, AccessLevel, AuthorizationDecision, DecisionReason};
pub use service::{AuthError, RevokeOutcome, TokenPair, TokenService};
pub use store::{InMemoryTokenStore, RefreshRecord, TokenStore};
pub use token::{Token, TokenError, TokenKind, UserId};
