use crate::models::{FieldValue, TypeDescriptor};

/// Caller-supplied access to live entities, replacing runtime reflection.
pub trait FieldAccessor {
    type Entity;

    /// Entity type of a live entity; must match the audit log's entity type.
    fn entity_type(&self, entity: &Self::Entity) -> String;

    /// Stable string identity, matching the records' subject id.
    fn subject_id(&self, entity: &Self::Entity) -> String;

    /// Current value of a field, or `None` when the entity has no such field.
    fn get_field(&self, entity: &Self::Entity, name: &str) -> Option<FieldValue>;

    /// Declared type of a field, or `None` when the field is unknown.
    fn field_type(&self, entity_type: &str, name: &str) -> Option<TypeDescriptor>;
}
