#![deny(missing_docs)]

//! # Schema Synthesizer
//!
//! Renders shapes into `utoipa` [`Schema`] trees.
//!
//! Every structure shape is synthesized exactly once into the component
//! registry and referenced by name everywhere else, including from inside
//! itself. That is what makes recursion over cyclic shape graphs terminate:
//! a structure that is already in progress or complete is never re-entered.
//! Scalars, lists and maps are inlined at the point of use.

use crate::error::{AppError, AppResult};
use crate::schema::{self, RefOr, Schema};
use crate::spec::{ApiSpec, ShapeKind, ShapeSpec};
use indexmap::IndexMap;
use std::collections::HashSet;
use std::sync::Arc;
use utoipa::openapi::schema::{KnownFormat, ObjectBuilder, Type};

/// Receives structure shapes encountered while rendering.
///
/// The building synthesizer registers them; a frozen registry only checks
/// they are present.
trait StructureSink {
    fn structure(&mut self, name: &str) -> AppResult<()>;
}

/// The frozen, name-keyed store of synthesized structure schemas.
#[derive(Debug, Clone, Default)]
pub struct ComponentRegistry {
    components: IndexMap<String, Arc<Schema>>,
}

impl ComponentRegistry {
    /// Synthesizes every shape of `spec` and freezes the resulting registry.
    ///
    /// Unknown shape kinds and list shapes without an element fail here, even
    /// when no operation reaches them.
    pub fn build(spec: &ApiSpec) -> AppResult<Self> {
        let mut synth = Synthesizer::new(spec);
        for name in spec.shapes.keys() {
            synth.synthesize(name)?;
        }
        let registry = synth.finish();
        tracing::debug!(components = registry.len(), "component registry built");
        Ok(registry)
    }

    /// Component schema by structure name.
    pub fn get(&self, name: &str) -> Option<&Arc<Schema>> {
        self.components.get(name)
    }

    /// True if a structure of that name was synthesized.
    pub fn contains(&self, name: &str) -> bool {
        self.components.contains_key(name)
    }

    /// Iterates `(name, schema)` pairs in shape declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Arc<Schema>)> + '_ {
        self.components.iter()
    }

    /// Number of components.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// True when no structure shapes exist.
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Renders the use-site schema of a shape against this registry.
    ///
    /// Structures come back as references; every structure they point at is
    /// already registered, so nothing is synthesized.
    pub fn schema_for(&self, spec: &ApiSpec, referrer: &str, name: &str) -> AppResult<RefOr<Schema>> {
        let mut frozen = Frozen(self);
        render(spec, referrer, name, &mut frozen, &mut Vec::new())
    }
}

struct Frozen<'r>(&'r ComponentRegistry);

impl StructureSink for Frozen<'_> {
    fn structure(&mut self, name: &str) -> AppResult<()> {
        if self.0.contains(name) {
            Ok(())
        } else {
            Err(AppError::NotFound {
                kind: "component",
                name: name.to_string(),
            })
        }
    }
}

/// Lazily synthesizes shapes, populating a component registry as it goes.
pub struct Synthesizer<'a> {
    spec: &'a ApiSpec,
    registry: IndexMap<String, Arc<Schema>>,
    in_progress: HashSet<String>,
    syntheses: usize,
}

impl<'a> Synthesizer<'a> {
    /// Creates a synthesizer with an empty registry.
    pub fn new(spec: &'a ApiSpec) -> Self {
        Self {
            spec,
            registry: IndexMap::new(),
            in_progress: HashSet::new(),
            syntheses: 0,
        }
    }

    /// Returns the use-site schema of a shape.
    ///
    /// Structures are registered (once) and returned as a reference; all other
    /// kinds are rendered inline. Calling this twice for the same name yields
    /// equal results and does not re-synthesize anything.
    pub fn synthesize(&mut self, name: &str) -> AppResult<RefOr<Schema>> {
        let spec = self.spec;
        render(spec, name, name, self, &mut Vec::new())
    }

    /// Returns the registered component for a structure, synthesizing it if needed.
    pub fn component(&mut self, name: &str) -> AppResult<Arc<Schema>> {
        self.register(name)?;
        self.registry.get(name).cloned().ok_or_else(|| AppError::NotFound {
            kind: "component",
            name: name.to_string(),
        })
    }

    /// Freezes the registry, ordering components by shape declaration order.
    pub fn finish(mut self) -> ComponentRegistry {
        tracing::trace!(syntheses = self.syntheses, "freezing component registry");
        let mut components = IndexMap::with_capacity(self.registry.len());
        for name in self.spec.shapes.keys() {
            if let Some(schema) = self.registry.shift_remove(name) {
                components.insert(name.clone(), schema);
            }
        }
        ComponentRegistry { components }
    }

    fn register(&mut self, name: &str) -> AppResult<()> {
        if self.registry.contains_key(name) || self.in_progress.contains(name) {
            return Ok(());
        }
        let spec = self.spec;
        let shape = spec.shape(name, name)?;
        if !shape.is_structure() {
            return Err(AppError::General(format!(
                "Shape '{}' is a {}, not a structure",
                name, shape.kind
            )));
        }
        self.in_progress.insert(name.to_string());

        let mut object = ObjectBuilder::new();
        for (member_name, member_ref) in &shape.members {
            let referrer = format!("{}.{}", name, member_name);
            let schema = render(spec, &referrer, &member_ref.shape, self, &mut Vec::new())?;
            object = object.property(member_name.clone(), schema);
        }
        for required in &shape.required {
            object = object.required(required.clone());
        }
        if shape.exception {
            object = schema::mark_exception(object);
        }

        self.in_progress.remove(name);
        self.registry
            .insert(name.to_string(), Arc::new(Schema::Object(object.build())));
        self.syntheses += 1;
        tracing::trace!(component = %name, "synthesized component");
        Ok(())
    }
}

impl StructureSink for Synthesizer<'_> {
    fn structure(&mut self, name: &str) -> AppResult<()> {
        self.register(name)
    }
}

fn render<S: StructureSink>(
    spec: &ApiSpec,
    referrer: &str,
    name: &str,
    sink: &mut S,
    lists: &mut Vec<String>,
) -> AppResult<RefOr<Schema>> {
    let shape = spec.shape(referrer, name)?;
    let kind = shape
        .shape_kind()
        .ok_or_else(|| AppError::UnknownShapeKind {
            shape: name.to_string(),
            kind: shape.kind.clone(),
        })?;

    let schema: RefOr<Schema> = match kind {
        ShapeKind::String | ShapeKind::Character => string_schema(shape).into(),
        ShapeKind::Integer => numeric_schema(Type::Integer, KnownFormat::Int32, shape).into(),
        ShapeKind::Long => numeric_schema(Type::Integer, KnownFormat::Int64, shape).into(),
        ShapeKind::Float => numeric_schema(Type::Number, KnownFormat::Float, shape).into(),
        ShapeKind::Double => numeric_schema(Type::Number, KnownFormat::Double, shape).into(),
        ShapeKind::Boolean => ObjectBuilder::new().schema_type(Type::Boolean).into(),
        ShapeKind::Blob => schema::formatted(Type::String, KnownFormat::Byte).into(),
        ShapeKind::Timestamp => schema::formatted(Type::String, KnownFormat::DateTime).into(),
        ShapeKind::Map => {
            for (slot, entry) in [("key", &shape.key), ("value", &shape.value)] {
                if let Some(entry) = entry {
                    spec.shape(&format!("{}.{}", name, slot), &entry.shape)?;
                }
            }
            schema::free_form_map()
        }
        ShapeKind::List => {
            let element = shape
                .member
                .as_ref()
                .ok_or_else(|| AppError::MissingListElement(name.to_string()))?;
            if lists.iter().any(|l| l == name) {
                return Err(AppError::CyclicList(name.to_string()));
            }
            lists.push(name.to_string());
            let items = render(spec, &format!("{}.member", name), &element.shape, sink, lists);
            lists.pop();
            schema::array(items?, shape.max.as_ref().map(schema::count))
        }
        ShapeKind::Structure => {
            sink.structure(name)?;
            schema::reference(name)
        }
    };
    Ok(schema)
}

fn string_schema(shape: &ShapeSpec) -> ObjectBuilder {
    let enum_values = (!shape.enum_values.is_empty()).then(|| shape.enum_values.clone());
    ObjectBuilder::new()
        .schema_type(Type::String)
        .min_length(shape.min.as_ref().map(schema::count))
        .max_length(shape.max.as_ref().map(schema::count))
        .pattern(shape.pattern.clone())
        .enum_values(enum_values)
}

fn numeric_schema(ty: Type, format: KnownFormat, shape: &ShapeSpec) -> ObjectBuilder {
    schema::formatted(ty, format)
        .minimum(shape.min.as_ref().map(schema::bound))
        .maximum(shape.max.as_ref().map(schema::bound))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::parse_api_spec;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use utoipa::openapi::schema::Object;

    fn spec_with_shapes(shapes: serde_json::Value) -> ApiSpec {
        let doc = json!({
            "metadata": {"apiVersion": "1", "protocol": "json"},
            "operations": {},
            "shapes": shapes
        });
        parse_api_spec(&doc.to_string()).unwrap()
    }

    fn to_json<T: serde::Serialize>(schema: &T) -> serde_json::Value {
        serde_json::to_value(schema).unwrap()
    }

    fn object(registry: &ComponentRegistry, name: &str) -> Object {
        schema::as_object(registry.get(name).unwrap()).unwrap().clone()
    }

    #[test]
    fn test_scalar_kinds() {
        let spec = spec_with_shapes(json!({
            "S": {"type": "string", "min": 1, "max": 10, "pattern": "^x", "enum": ["x", "xx"]},
            "I": {"type": "integer", "min": 0, "max": 5},
            "L": {"type": "long"},
            "D": {"type": "double", "min": 0.5},
            "F": {"type": "float"},
            "B": {"type": "boolean"},
            "Blob": {"type": "blob"},
            "T": {"type": "timestamp"},
            "M": {"type": "map", "key": {"shape": "S"}, "value": {"shape": "S"}}
        }));
        let mut synth = Synthesizer::new(&spec);
        let mut rendered = |name: &str| to_json(&synth.synthesize(name).unwrap());
        assert_eq!(
            rendered("S"),
            json!({"type": "string", "minLength": 1, "maxLength": 10, "pattern": "^x", "enum": ["x", "xx"]})
        );
        assert_eq!(
            rendered("I"),
            json!({"type": "integer", "format": "int32", "minimum": 0, "maximum": 5})
        );
        assert_eq!(rendered("L"), json!({"type": "integer", "format": "int64"}));
        assert_eq!(
            rendered("D"),
            json!({"type": "number", "format": "double", "minimum": 0.5})
        );
        assert_eq!(rendered("F"), json!({"type": "number", "format": "float"}));
        assert_eq!(rendered("B"), json!({"type": "boolean"}));
        assert_eq!(rendered("Blob"), json!({"type": "string", "format": "byte"}));
        assert_eq!(rendered("T"), json!({"type": "string", "format": "date-time"}));
        assert_eq!(rendered("M"), json!({"type": "object", "additionalProperties": true}));
        assert!(synth.finish().is_empty());
    }

    #[test]
    fn test_long_bounds_keep_full_width() {
        let spec = spec_with_shapes(json!({
            "Big": {"type": "long", "min": i64::MIN, "max": i64::MAX}
        }));
        let rendered = to_json(&Synthesizer::new(&spec).synthesize("Big").unwrap());
        assert_eq!(rendered["maximum"], json!(9223372036854775807i64));
        assert_eq!(rendered["minimum"], json!(-9223372036854775808i64));
        assert_eq!(rendered["format"], "int64");
    }

    #[test]
    fn test_list_inlines_items_and_max() {
        let spec = spec_with_shapes(json!({
            "Names": {"type": "list", "member": {"shape": "Name"}, "max": 20},
            "Name": {"type": "string"}
        }));
        let mut synth = Synthesizer::new(&spec);
        assert_eq!(
            to_json(&synth.synthesize("Names").unwrap()),
            json!({"type": "array", "items": {"type": "string"}, "maxItems": 20})
        );
    }

    #[test]
    fn test_self_cycle_terminates_with_reference() {
        let spec = spec_with_shapes(json!({
            "Node": {"type": "structure", "members": {"Next": {"shape": "Node"}, "Label": {"shape": "Name"}}},
            "Name": {"type": "string"}
        }));
        let registry = ComponentRegistry::build(&spec).unwrap();
        let node = object(&registry, "Node");
        assert_eq!(node.properties["Next"], schema::reference("Node"));
        assert_eq!(node.properties["Label"], schema::string());
    }

    #[test]
    fn test_two_cycle_terminates_with_references() {
        let spec = spec_with_shapes(json!({
            "A": {"type": "structure", "members": {"b": {"shape": "B"}}},
            "B": {"type": "structure", "members": {"a": {"shape": "A"}, "as": {"shape": "AList"}}},
            "AList": {"type": "list", "member": {"shape": "A"}}
        }));
        let registry = ComponentRegistry::build(&spec).unwrap();
        let a = object(&registry, "A");
        let b = object(&registry, "B");
        assert_eq!(schema::ref_name(&a.properties["b"]), Some("B"));
        assert_eq!(schema::ref_name(&b.properties["a"]), Some("A"));
        assert_eq!(
            to_json(&b.properties["as"]),
            json!({"type": "array", "items": {"$ref": "#/components/schemas/A"}})
        );
        let names: Vec<&String> = registry.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[test]
    fn test_structure_synthesized_once() {
        let spec = spec_with_shapes(json!({
            "Shared": {"type": "structure", "members": {"Id": {"shape": "Id"}}},
            "One": {"type": "structure", "members": {"s": {"shape": "Shared"}}},
            "Two": {"type": "structure", "members": {"s": {"shape": "Shared"}, "t": {"shape": "Shared"}}},
            "Many": {"type": "list", "member": {"shape": "Shared"}},
            "Id": {"type": "string"}
        }));
        let mut synth = Synthesizer::new(&spec);
        for name in ["One", "Two", "Many", "Shared", "One"] {
            synth.synthesize(name).unwrap();
        }
        assert_eq!(synth.syntheses, 3);

        let first = synth.component("Shared").unwrap();
        let second = synth.component("Shared").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(synth.syntheses, 3);
    }

    #[test]
    fn test_required_members_carried() {
        let spec = spec_with_shapes(json!({
            "Req": {"type": "structure", "required": ["Id"], "members": {"Id": {"shape": "Id"}, "Note": {"shape": "Id"}}},
            "Id": {"type": "string"}
        }));
        let registry = ComponentRegistry::build(&spec).unwrap();
        assert_eq!(
            to_json(&**registry.get("Req").unwrap()),
            json!({
                "type": "object",
                "required": ["Id"],
                "properties": {"Id": {"type": "string"}, "Note": {"type": "string"}}
            })
        );
    }

    #[test]
    fn test_exception_annotation() {
        let spec = spec_with_shapes(json!({
            "Boom": {"type": "structure", "exception": true, "members": {"Message": {"shape": "Msg"}}},
            "Msg": {"type": "string"}
        }));
        let registry = ComponentRegistry::build(&spec).unwrap();
        assert!(schema::is_exception(registry.get("Boom").unwrap()));
        assert_eq!(to_json(&**registry.get("Boom").unwrap())["x-exception"], json!(true));
    }

    #[test]
    fn test_unknown_kind_is_fatal() {
        let spec = spec_with_shapes(json!({"Doc": {"type": "document"}}));
        match ComponentRegistry::build(&spec) {
            Err(AppError::UnknownShapeKind { shape, kind }) => {
                assert_eq!(shape, "Doc");
                assert_eq!(kind, "document");
            }
            other => panic!("expected unknown kind, got {:?}", other.map(|r| r.len())),
        }
    }

    #[test]
    fn test_list_without_element_is_fatal() {
        let spec = spec_with_shapes(json!({"Bad": {"type": "list"}}));
        let err = ComponentRegistry::build(&spec).unwrap_err();
        assert!(matches!(err, AppError::MissingListElement(n) if n == "Bad"));
    }

    #[test]
    fn test_list_cycle_without_structure_is_reported() {
        let spec = spec_with_shapes(json!({"Loop": {"type": "list", "member": {"shape": "Loop"}}}));
        let err = ComponentRegistry::build(&spec).unwrap_err();
        assert!(matches!(err, AppError::CyclicList(n) if n == "Loop"));
    }

    #[test]
    fn test_dangling_map_value_is_fatal() {
        let spec = spec_with_shapes(json!({
            "M": {"type": "map", "key": {"shape": "Nope"}, "value": {"shape": "Gone"}}
        }));
        match ComponentRegistry::build(&spec) {
            Err(AppError::DanglingReference { referrer, target }) => {
                assert_eq!(referrer, "M.key");
                assert_eq!(target, "Nope");
            }
            other => panic!("expected dangling reference, got {:?}", other.map(|r| r.len())),
        }

        let spec = spec_with_shapes(json!({
            "Holder": {"type": "structure", "members": {"tags": {"shape": "M"}}},
            "M": {"type": "map", "key": {"shape": "K"}, "value": {"shape": "Gone"}},
            "K": {"type": "string"}
        }));
        let err = ComponentRegistry::build(&spec).unwrap_err();
        assert!(matches!(err, AppError::DanglingReference { ref referrer, .. } if referrer == "M.value"));
    }

    #[test]
    fn test_frozen_schema_for_member_shapes() {
        let spec = spec_with_shapes(json!({
            "Widget": {"type": "structure", "members": {"Id": {"shape": "WidgetId"}}},
            "WidgetId": {"type": "string"},
            "Widgets": {"type": "list", "member": {"shape": "Widget"}}
        }));
        let registry = ComponentRegistry::build(&spec).unwrap();
        assert_eq!(
            to_json(&registry.schema_for(&spec, "x", "Widgets").unwrap()),
            json!({"type": "array", "items": {"$ref": "#/components/schemas/Widget"}})
        );
        assert_eq!(registry.schema_for(&spec, "x", "WidgetId").unwrap(), schema::string());
        let err = registry.schema_for(&spec, "x", "Missing").unwrap_err();
        assert!(matches!(err, AppError::DanglingReference { .. }));
    }
}
