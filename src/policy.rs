//! Pure authorization predicates over (actor, entity) snapshots.
//!
//! No side effects and no errors: a missing owner or an insufficient role
//! evaluates to "not permitted". Callers translate `false` into a rejection.

use crate::auth::{Actor, Role};
use crate::models::{Article, Comment, ForumCategory, ForumComment, ForumThread, Id};

/// Implemented by content entities subject to ownership checks.
pub trait Owned {
    fn owner_id(&self) -> Option<Id>;

    /// True when edits (but not deletions) are suspended, e.g. a locked thread.
    fn edit_locked(&self) -> bool {
        false
    }
}

impl Owned for Article {
    fn owner_id(&self) -> Option<Id> {
        Some(self.author_id)
    }
}

impl Owned for Comment {
    fn owner_id(&self) -> Option<Id> {
        Some(self.author_id)
    }
}

impl Owned for ForumCategory {
    fn owner_id(&self) -> Option<Id> {
        Some(self.user_id)
    }
}

impl Owned for ForumThread {
    fn owner_id(&self) -> Option<Id> {
        Some(self.user_id)
    }

    fn edit_locked(&self) -> bool {
        self.is_locked
    }
}

impl Owned for ForumComment {
    fn owner_id(&self) -> Option<Id> {
        Some(self.user_id)
    }
}

fn owns(actor: &Actor, entity: &impl Owned) -> bool {
    entity.owner_id() == Some(actor.id)
}

pub fn can_edit(actor: &Actor, entity: &impl Owned) -> bool {
    match actor.role {
        Role::Admin => true,
        Role::Author => owns(actor, entity) && !entity.edit_locked(),
        Role::User => false,
    }
}

/// Deletion ignores the edit lock: an owning author may delete a locked thread.
pub fn can_delete(actor: &Actor, entity: &impl Owned) -> bool {
    match actor.role {
        Role::Admin => true,
        Role::Author => owns(actor, entity),
        Role::User => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Item {
        owner: Option<Id>,
        locked: bool,
    }

    impl Owned for Item {
        fn owner_id(&self) -> Option<Id> {
            self.owner
        }
        fn edit_locked(&self) -> bool {
            self.locked
        }
    }

    fn actor(id: Id, role: Role) -> Actor {
        Actor { id, role }
    }

    #[test]
    fn admin_edits_and_deletes_anything() {
        let item = Item { owner: Some(42), locked: true };
        let admin = actor(1, Role::Admin);
        assert!(can_edit(&admin, &item));
        assert!(can_delete(&admin, &item));
    }

    #[test]
    fn author_limited_to_own_content() {
        let mine = Item { owner: Some(7), locked: false };
        let theirs = Item { owner: Some(8), locked: false };
        let author = actor(7, Role::Author);
        assert!(can_edit(&author, &mine));
        assert!(can_delete(&author, &mine));
        assert!(!can_edit(&author, &theirs));
        assert!(!can_delete(&author, &theirs));
    }

    #[test]
    fn lock_suspends_owner_edits_but_not_deletes() {
        let locked = Item { owner: Some(7), locked: true };
        let author = actor(7, Role::Author);
        assert!(!can_edit(&author, &locked));
        assert!(can_delete(&author, &locked));
        assert!(can_edit(&actor(1, Role::Admin), &locked));
    }

    #[test]
    fn plain_users_never_moderate_content() {
        let mine = Item { owner: Some(3), locked: false };
        let user = actor(3, Role::User);
        assert!(!can_edit(&user, &mine));
        assert!(!can_delete(&user, &mine));
    }

    #[test]
    fn unowned_entity_denies_non_admins() {
        let orphan = Item { owner: None, locked: false };
        assert!(!can_edit(&actor(7, Role::Author), &orphan));
        assert!(can_delete(&actor(1, Role::Admin), &orphan));
    }
}
