//! MedStore core session types

pub mod session;

pub use session::{
    ACCESS_TOKEN_KEY, MemorySessionStore, REFRESH_TOKEN_KEY, SessionContext, SessionEvent,
    SessionStore, SubscriptionId, TokenPair, USER_KEY,
};
