//! Enumerations persisted as text columns.
//!
//! Every enum serializes as its `snake_case` wire name, which is also the
//! value stored in `SQLite`. [`FromStr`] accepts exactly the wire name.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A text value that does not name any variant of the target enum.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value}")]
pub struct UnknownVariant {
    /// Name of the enum being parsed.
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        $name:ident (default $default:ident) {
            $($(#[$vmeta:meta])* $variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $($(#[$vmeta])* #[serde(rename = $text)] $variant,)+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// The wire and column name.
            #[must_use]
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::$default
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    _ => Err(UnknownVariant {
                        kind: stringify!($name),
                        value: s.to_owned(),
                    }),
                }
            }
        }
    };
}

text_enum! {
    /// Workflow state of a task.
    TaskStatus (default Todo) {
        /// Not started.
        Todo => "todo",
        /// Being worked on.
        InProgress => "in_progress",
        /// Finished.
        Done => "done",
    }
}

text_enum! {
    /// Task urgency.
    TaskPriority (default Medium) {
        /// Low priority.
        Low => "low",
        /// Medium priority.
        Medium => "medium",
        /// High priority.
        High => "high",
    }
}

text_enum! {
    /// Lifecycle state of a project.
    ProjectStatus (default Planning) {
        /// Being scoped.
        Planning => "planning",
        /// In progress.
        Active => "active",
        /// Paused.
        OnHold => "on_hold",
        /// Delivered.
        Completed => "completed",
        /// Abandoned.
        Cancelled => "cancelled",
    }
}

text_enum! {
    /// Maturity of an idea.
    IdeaStatus (default Draft) {
        /// Captured, not yet developed.
        Draft => "draft",
        /// Being developed.
        InProgress => "in_progress",
        /// Shipped.
        Implemented => "implemented",
        /// Shelved.
        Archived => "archived",
    }
}

text_enum! {
    /// Kind of a log.
    LogType (default Note) {
        /// Free-form note.
        Note => "note",
        /// Progress update.
        Progress => "progress",
        /// Problem report.
        Issue => "issue",
        /// Recorded decision.
        Decision => "decision",
        /// Anything else.
        Other => "other",
    }
}

text_enum! {
    /// A user's role inside a project.
    MemberRole (default Member) {
        /// The project owner. Exactly one per project.
        Owner => "owner",
        /// Elevated collaborator.
        Manager => "manager",
        /// Regular collaborator.
        Member => "member",
    }
}

text_enum! {
    /// What happened in a project activity timeline entry.
    ProjectActionType (default Note) {
        /// Project created.
        Create => "create",
        /// Project fields changed.
        Update => "update",
        /// Member added.
        AddMember => "add_member",
        /// Member removed.
        RemoveMember => "remove_member",
        /// Task created inside the project.
        AddTask => "add_task",
        /// Task in the project marked done.
        CompleteTask => "complete_task",
        /// Idea linked to the project.
        Link => "link",
        /// Idea unlinked from the project.
        Unlink => "unlink",
        /// Free-form note.
        Note => "note",
    }
}

text_enum! {
    /// Direction for list sorting.
    SortOrder (default Asc) {
        /// Ascending.
        Asc => "asc",
        /// Descending.
        Desc => "desc",
    }
}

text_enum! {
    /// Columns a task list may be sorted by.
    TaskSortField (default CreatedAt) {
        /// Due date.
        DueDate => "due_date",
        /// Priority, ordered low < medium < high.
        Priority => "priority",
        /// Status, ordered todo < in progress < done.
        Status => "status",
        /// Creation time.
        CreatedAt => "created_at",
    }
}

text_enum! {
    /// Columns a project list may be sorted by.
    ProjectSortField (default CreatedAt) {
        /// Creation time.
        CreatedAt => "created_at",
        /// Last modification time.
        UpdatedAt => "updated_at",
        /// Title.
        Title => "title",
        /// Status.
        Status => "status",
    }
}

impl SortOrder {
    /// SQL keyword for this direction.
    #[must_use]
    pub fn sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
