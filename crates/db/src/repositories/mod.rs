//! Repositories wrapping entity queries behind `AppResult`.

mod event;
mod session;
mod support;
mod user;

pub use event::{EventFilter, EventRepository, featured_query};
pub use session::SessionRepository;
pub use support::SupportRepository;
pub use user::UserRepository;
