use inkwell_core::{BlogPost, Category, User};
use inkwell_query::FieldTypes;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// An entity that a [`Repository`](crate::Repository) can persist.
pub trait Document: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Collection (document store) or table (relational store) name.
    const COLLECTION: &'static str;

    /// Storage key of the identifier field.
    const ID_FIELD: &'static str;

    fn id(&self) -> Option<&str>;

    fn set_id(&mut self, id: String);

    /// Field kinds used for raw filter coercion and timestamp handling.
    fn field_types() -> FieldTypes;
}

impl Document for BlogPost {
    const COLLECTION: &'static str = BlogPost::COLLECTION;
    const ID_FIELD: &'static str = "_id";

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn set_id(&mut self, id: String) {
        self.id = Some(id);
    }

    fn field_types() -> FieldTypes {
        BlogPost::field_types()
    }
}

impl Document for Category {
    const COLLECTION: &'static str = Category::COLLECTION;
    const ID_FIELD: &'static str = "_id";

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn set_id(&mut self, id: String) {
        self.id = Some(id);
    }

    fn field_types() -> FieldTypes {
        Category::field_types()
    }
}

impl Document for User {
    const COLLECTION: &'static str = User::TABLE;
    const ID_FIELD: &'static str = "id";

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn set_id(&mut self, id: String) {
        self.id = Some(id);
    }

    fn field_types() -> FieldTypes {
        User::field_types()
    }
}
