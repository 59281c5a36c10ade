//! Row types and request payloads for every IPMS resource.
//!
//! Row types (`Task`, `Project`, ...) mirror table rows and serialize as API
//! responses. `*Create` payloads carry defaults for omitted fields, `*Update`
//! payloads are partial, and `*Filter` types double as HTTP query strings.

mod activity;
mod concept;
mod idea;
mod journal;
mod log;
mod mindmap;
mod profile;
mod project;
mod task;
mod user;

pub use activity::*;
pub use concept::*;
pub use idea::*;
pub use journal::*;
pub use log::*;
pub use mindmap::*;
pub use profile::*;
pub use project::*;
pub use task::*;
pub use user::*;

/// Default page size for project and log listings.
pub(crate) fn default_page_limit() -> u32 {
    10
}

/// Default page size for activity and journal entry listings.
pub(crate) fn default_feed_limit() -> u32 {
    50
}
