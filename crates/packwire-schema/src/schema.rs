//! Ordered field lists.
//!
//! Declaration order is the wire order, so a [`Schema`] is a `Vec`, never a
//! map. Uniqueness of names is checked by [`SchemaBuilder`] when each field is
//! registered; a built `Schema` can't be modified.

use packwire_codec::WireType;
use serde::{Deserialize, Serialize};

use crate::SchemaError;

// ---------------------------------------------------------------------------
// Field
// ---------------------------------------------------------------------------

/// One named, typed slot in a schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub wire: WireType,
}

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

/// An immutable, ordered list of uniquely-named fields.
///
/// Serializes as a JSON array of `{ "name", "wire" }` objects. Deserializing
/// goes back through [`SchemaBuilder`], so a config file with a repeated name
/// is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<Field>", into = "Vec<Field>")]
pub struct Schema {
    fields: Vec<Field>,
}

impl Schema {
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::new()
    }

    /// Fields in wire order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Wire type of the field called `name`.
    pub fn get(&self, name: &str) -> Option<&WireType> {
        self.fields.iter().find(|f| f.name == name).map(|f| &f.wire)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Field names in wire order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// A builder seeded with a copy of this schema's fields.
    pub fn to_builder(&self) -> SchemaBuilder {
        SchemaBuilder {
            fields: self.fields.clone(),
        }
    }
}

impl TryFrom<Vec<Field>> for Schema {
    type Error = SchemaError;

    fn try_from(fields: Vec<Field>) -> Result<Self, Self::Error> {
        fields
            .into_iter()
            .try_fold(SchemaBuilder::new(), |b, f| b.field(f.name, f.wire))
            .map(SchemaBuilder::build)
    }
}

impl From<Schema> for Vec<Field> {
    fn from(schema: Schema) -> Self {
        schema.fields
    }
}

// ---------------------------------------------------------------------------
// SchemaBuilder
// ---------------------------------------------------------------------------

/// Collects fields for a [`Schema`], rejecting duplicate names.
///
/// ```rust
/// use packwire_codec::WireType;
/// use packwire_schema::Schema;
///
/// let schema = Schema::builder()
///     .field("name", WireType::String16)?
///     .field("score", WireType::Int32)?
///     .array_field("tags", WireType::DynamicString8)?
///     .build();
/// assert_eq!(schema.names().collect::<Vec<_>>(), ["name", "score", "tags"]);
/// # Ok::<(), packwire_schema::SchemaError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct SchemaBuilder {
    fields: Vec<Field>,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a field.
    ///
    /// # Errors
    /// [`SchemaError::DuplicateField`] if `name` is already registered.
    pub fn field(mut self, name: impl Into<String>, wire: WireType) -> Result<Self, SchemaError> {
        let name = name.into();
        if self.contains(&name) {
            return Err(SchemaError::DuplicateField(name));
        }
        self.fields.push(Field { name, wire });
        Ok(self)
    }

    /// Appends a field holding an array of `element`.
    pub fn array_field(
        self,
        name: impl Into<String>,
        element: WireType,
    ) -> Result<Self, SchemaError> {
        self.field(name, WireType::array_of(element))
    }

    /// Appends several fields, keeping the order they're given in.
    pub fn set_fields<I, N>(self, fields: I) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = (N, WireType)>,
        N: Into<String>,
    {
        fields
            .into_iter()
            .try_fold(self, |builder, (name, wire)| builder.field(name, wire))
    }

    /// Appends every field of `schema`.
    pub fn include(self, schema: &Schema) -> Result<Self, SchemaError> {
        schema
            .fields()
            .iter()
            .try_fold(self, |builder, f| builder.field(f.name.clone(), f.wire.clone()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f.name == name)
    }

    pub fn build(self) -> Schema {
        Schema {
            fields: self.fields,
        }
    }
}
