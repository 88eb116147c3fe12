//! Collection and document paths.
//!
//! Every path is built from an identity's uid; there is no constructor that
//! takes a free-form path, so no code can address another user's items.

use std::fmt;

const USERS: &str = "users";
const DREAM_ITEMS: &str = "dreamItems";

/// Path of a user's item collection: `users/{uid}/dreamItems`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CollectionPath {
    uid: String,
}

impl CollectionPath {
    pub fn dream_items(uid: impl Into<String>) -> Self {
        Self { uid: uid.into() }
    }

    /// The uid that owns this collection.
    pub fn owner(&self) -> &str {
        &self.uid
    }

    /// Path of one document inside this collection.
    pub fn doc(&self, id: impl Into<String>) -> DocPath {
        DocPath {
            collection: self.clone(),
            id: id.into(),
        }
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{USERS}/{}/{DREAM_ITEMS}", self.uid)
    }
}

/// Path of a single item document: `users/{uid}/dreamItems/{id}`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DocPath {
    collection: CollectionPath,
    id: String,
}

impl DocPath {
    pub fn collection(&self) -> &CollectionPath {
        &self.collection
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for DocPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_are_scoped_to_uid() {
        let col = CollectionPath::dream_items("u1");
        assert_eq!(col.to_string(), "users/u1/dreamItems");
        assert_eq!(col.owner(), "u1");

        let doc = col.doc("item9");
        assert_eq!(doc.to_string(), "users/u1/dreamItems/item9");
        assert_eq!(doc.collection(), &col);
        assert_eq!(doc.id(), "item9");
    }

    #[test]
    fn test_different_users_never_share_a_path() {
        assert_ne!(
            CollectionPath::dream_items("alice"),
            CollectionPath::dream_items("bob")
        );
    }
}
