//! Business logic services.

#![allow(missing_docs)]

pub mod event;
pub mod session;
pub mod support;
pub mod user;

pub use event::{EventDetailsInput, EventService, EventWithUsers, ModerateEventInput};
pub use session::{SessionService, SignedIn};
pub use support::{
    CreateTicketInput, PromoterApplicationInput, SupportService, TicketSummary, TicketThread,
};
pub use user::{SignupInput, UpdateProfileInput, UpdateUserInput, UserService};
