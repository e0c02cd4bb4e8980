#![deny(missing_docs)]

//! # Schema Nodes
//!
//! Constructors over `utoipa`'s OpenAPI schema model.
//!
//! A use-site schema is a [`RefOr<Schema>`]: structure shapes never appear
//! inline, they are emitted once into the component registry and referenced
//! by name with [`reference`]. Scalars, lists and maps are built with
//! `ObjectBuilder` / `ArrayBuilder`.

use serde_json::Value;
use utoipa::openapi::extensions::ExtensionsBuilder;
use utoipa::openapi::schema::{
    AdditionalProperties, ArrayBuilder, KnownFormat, Object, ObjectBuilder, OneOfBuilder,
    SchemaFormat, Type,
};
use utoipa::openapi::Ref;

pub use utoipa::openapi::{RefOr, Schema};

/// Prefix of component references.
pub const COMPONENTS_PREFIX: &str = "#/components/schemas/";

/// Extension key marking exception schemas.
pub const EXCEPTION_EXTENSION: &str = "x-exception";

/// A reference to the named component.
pub fn reference(name: impl Into<String>) -> RefOr<Schema> {
    RefOr::Ref(Ref::from_schema_name(name))
}

/// The referenced component name, for reference nodes.
pub fn ref_name(schema: &RefOr<Schema>) -> Option<&str> {
    match schema {
        RefOr::Ref(r) => r.ref_location.strip_prefix(COMPONENTS_PREFIX),
        RefOr::T(_) => None,
    }
}

/// The object body of an inline node.
pub fn as_object(schema: &Schema) -> Option<&Object> {
    match schema {
        Schema::Object(o) => Some(o),
        _ => None,
    }
}

/// True if the component carries the exception marker.
pub fn is_exception(schema: &Schema) -> bool {
    as_object(schema)
        .and_then(|o| o.extensions.as_ref())
        .and_then(|e| e.get(EXCEPTION_EXTENSION))
        .is_some_and(|v| v == &Value::Bool(true))
}

/// A plain `type: string` node.
pub fn string() -> RefOr<Schema> {
    ObjectBuilder::new().schema_type(Type::String).into()
}

/// A typed node with a known format, e.g. `integer`/`int64`.
pub fn formatted(ty: Type, format: KnownFormat) -> ObjectBuilder {
    ObjectBuilder::new()
        .schema_type(ty)
        .format(Some(SchemaFormat::KnownFormat(format)))
}

/// `type: object` accepting arbitrary additional properties.
pub fn free_form_map() -> RefOr<Schema> {
    ObjectBuilder::new()
        .schema_type(Type::Object)
        .additional_properties(Some(AdditionalProperties::<Schema>::FreeForm(true)))
        .into()
}

/// `type: array` of `items`.
pub fn array(items: RefOr<Schema>, max_items: Option<usize>) -> RefOr<Schema> {
    ArrayBuilder::new().items(items).max_items(max_items).into()
}

/// A `oneOf` union; a single alternative is returned unwrapped.
pub fn one_of(mut items: Vec<RefOr<Schema>>) -> RefOr<Schema> {
    if items.len() == 1 {
        return items.remove(0);
    }
    items
        .into_iter()
        .fold(OneOfBuilder::new(), |b, item| b.item(item))
        .into()
}

/// Marks an object builder as an exception schema.
pub fn mark_exception(builder: ObjectBuilder) -> ObjectBuilder {
    builder.extensions(Some(
        ExtensionsBuilder::new()
            .add(EXCEPTION_EXTENSION, true)
            .build(),
    ))
}

/// Carries a model bound into an OpenAPI `minimum`/`maximum`.
///
/// Integral values stay integral at their full width; anything else is
/// carried as a float.
pub fn bound(value: &serde_json::Number) -> utoipa::Number {
    if let Some(v) = value.as_i64().and_then(|v| isize::try_from(v).ok()) {
        utoipa::Number::Int(v)
    } else if let Some(v) = value.as_u64().and_then(|v| usize::try_from(v).ok()) {
        utoipa::Number::UInt(v)
    } else {
        utoipa::Number::Float(value.as_f64().unwrap_or_default())
    }
}

/// Carries a model bound into a length or item count.
///
/// Negative bounds clamp to zero; fractional ones are truncated.
pub fn count(value: &serde_json::Number) -> usize {
    if let Some(v) = value.as_u64() {
        usize::try_from(v).unwrap_or(usize::MAX)
    } else if value.as_i64().is_some() {
        0
    } else {
        let v = value.as_f64().unwrap_or_default();
        if v <= 0.0 {
            0
        } else {
            v as usize
        }
    }
}
