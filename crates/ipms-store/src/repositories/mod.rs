//! Per-table repositories.
//!
//! Every repository is a unit struct whose methods take `&Connection`, so
//! they compose inside [`Database::transaction`](crate::Database::transaction).
//! Ownership scoping (`user_id = ?`) happens in SQL, never after the fact.

mod activities;
mod concepts;
mod ideas;
mod journals;
mod logs;
mod members;
mod mindmaps;
mod profiles;
mod project_activities;
mod projects;
mod tasks;
mod tokens;
mod users;

pub use activities::ActivityRepo;
pub use concepts::ConceptNoteRepo;
pub use ideas::{IdeaRepo, TagRepo};
pub use journals::{JournalEntryRepo, JournalRepo};
pub use logs::{LogEntryRepo, LogRepo};
pub use members::MemberRepo;
pub use mindmaps::MindmapRepo;
pub use profiles::ProfileRepo;
pub use project_activities::ProjectActivityRepo;
pub use projects::{Access, ProjectRepo};
pub use tasks::TaskRepo;
pub use tokens::{PasswordResetRepo, RefreshTokenRepo};
pub use users::{NewUser, UserRepo};
