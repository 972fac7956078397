//! Outbound WhatsApp notifications: phone normalization, message
//! composition, and the dispatch boundary that absorbs provider failures.

pub mod composer;
pub mod dispatcher;
pub mod phone;

pub use dispatcher::{Direction, DispatchConfig, MessageSender, NotificationDispatcher};
