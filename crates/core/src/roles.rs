//! Profile roles and the two sides of a conversation.

use crate::types::DbId;

define_text_enum! {
    /// Role chosen at onboarding. Stored in `profiles.role`.
    ProfileRole ("profile role") {
        GeneralContractor = "general_contractor",
        Trade = "trade",
    }
}

define_text_enum! {
    /// Which side of a thread is acting. Stored in `project_messages.sender_role`.
    Party ("party") {
        Gc = "gc",
        Trade = "trade",
    }
}

define_text_enum! {
    /// How a rolodex link came to exist.
    LinkSource ("link source") {
        Invite = "invite",
        Manual = "manual",
    }
}

impl ProfileRole {
    /// The conversation side a profile with this role speaks for.
    pub fn party(self) -> Party {
        match self {
            ProfileRole::GeneralContractor => Party::Gc,
            ProfileRole::Trade => Party::Trade,
        }
    }
}

impl Party {
    /// The other side of the conversation.
    pub fn opposite(self) -> Party {
        match self {
            Party::Gc => Party::Trade,
            Party::Trade => Party::Gc,
        }
    }
}

/// Returns `true` iff `user_id` created the project and therefore acts as
/// its general contractor.
pub fn is_gc_for_project(project_created_by: DbId, user_id: DbId) -> bool {
    project_created_by == user_id
}
