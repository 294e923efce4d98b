//! Database entities.

#![allow(missing_docs)]

pub mod event;
pub mod session;
pub mod support_message;
pub mod support_ticket;
pub mod user;

pub use event::Entity as Event;
pub use session::Entity as Session;
pub use support_message::Entity as SupportMessage;
pub use support_ticket::Entity as SupportTicket;
pub use user::Entity as User;
