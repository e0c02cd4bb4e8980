#![deny(missing_docs)]

//! # Resource Inference
//!
//! Derives the primary entities of an API from its creation operations.
//!
//! A `Create{Name}` (or `CreateOrUpdate{Name}`) operation is taken to create a
//! `Name` resource. Its properties are the members of the operation's input
//! shape, merged with the body members of its output shape.

use crate::error::{AppError, AppResult};
use crate::graph::{Object, ObjectId, Operation, ShapeGraph};
use crate::inflection::Inflector;
use crate::schema::{RefOr, Schema};
use crate::spec::{ApiSpec, Protocol};
use crate::synthesizer::ComponentRegistry;
use indexmap::IndexMap;
use serde::Serialize;

const CREATE_PREFIXES: [&str; 2] = ["CreateOrUpdate", "Create"];

/// An inferred domain entity.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    /// Singular form, e.g. `Cluster`.
    pub singular_name: String,
    /// Plural form, e.g. `Clusters`.
    pub plural_name: String,
    /// Property name to use-site schema.
    pub properties: IndexMap<String, RefOr<Schema>>,
    /// Required property names, copied from the creation input shape.
    pub required: Vec<String>,
}

impl Resource {
    /// True if `property` must be supplied on creation.
    pub fn is_required(&self, property: &str) -> bool {
        self.required.iter().any(|r| r == property)
    }
}

/// Strips the creation prefix from an operation name.
///
/// `CreateOrUpdate` is tried before `Create`, so `CreateOrUpdateTags` yields
/// `Tags` rather than `OrUpdateTags`.
pub fn creation_target(operation: &str) -> Option<&str> {
    CREATE_PREFIXES
        .iter()
        .find_map(|prefix| operation.strip_prefix(prefix))
}

/// True if a creation operation may create a top-level resource under `protocol`.
///
/// Only URI-routed JSON APIs are constrained: a request URI with more than one
/// `/` is taken to address a sub-resource or an action.
pub fn is_top_level(protocol: &Protocol, request_uri: &str) -> bool {
    match protocol {
        Protocol::RestJson => request_uri.matches('/').count() <= 1,
        _ => true,
    }
}

/// Infers resources from every creation operation of the graph.
///
/// The result is keyed by the name left after stripping the creation prefix.
/// When two operations derive the same name, the later one wins.
pub fn infer_resources(
    spec: &ApiSpec,
    graph: &ShapeGraph,
    registry: &ComponentRegistry,
    inflector: &dyn Inflector,
) -> AppResult<IndexMap<String, Resource>> {
    let protocol = &spec.metadata.protocol;
    let mut resources = IndexMap::new();

    for op in graph.operations() {
        let Some(obj_name) = creation_target(&op.name) else {
            continue;
        };
        let singular_name = inflector.singular(obj_name);
        if singular_name == "Tag" {
            tracing::debug!(operation = %op.name, "skipping tag operation");
            continue;
        }
        if !is_top_level(protocol, &op.request_uri) {
            tracing::debug!(operation = %op.name, uri = %op.request_uri, "skipping nested operation");
            continue;
        }

        let resource = build_resource(spec, graph, registry, op, singular_name, inflector.plural(obj_name))?;
        if resources.insert(obj_name.to_string(), resource).is_some() {
            tracing::warn!(resource = %obj_name, operation = %op.name, "resource derived twice; keeping the later one");
        }
    }

    tracing::debug!(resources = resources.len(), "resources inferred");
    Ok(resources)
}

fn build_resource(
    spec: &ApiSpec,
    graph: &ShapeGraph,
    registry: &ComponentRegistry,
    op: &Operation,
    singular_name: String,
    plural_name: String,
) -> AppResult<Resource> {
    let mut resource = Resource {
        singular_name,
        plural_name,
        properties: IndexMap::new(),
        required: Vec::new(),
    };

    if let Some(input_id) = op.input {
        let input = payload_structure(graph, op, input_id, "input")?;
        for (member_name, member) in &input.members {
            let target = &graph.get(member.target).name;
            let referrer = format!("{}.{}", input.name, member_name);
            let schema = registry.schema_for(spec, &referrer, target)?;
            resource.properties.insert(member_name.clone(), schema);
        }
        resource.required = input.required.clone();
    }

    if let Some(output_id) = op.output {
        let output = payload_structure(graph, op, output_id, "output")?;
        let body = unwrap_envelope(graph, output, &resource.singular_name);
        for (member_name, member) in &body.members {
            if member.location.as_ref().is_some_and(|l| l.is_header_or_uri()) {
                continue;
            }
            if resource.properties.contains_key(member_name) {
                continue;
            }
            let target = &graph.get(member.target).name;
            let referrer = format!("{}.{}", body.name, member_name);
            let schema = registry.schema_for(spec, &referrer, target)?;
            resource.properties.insert(member_name.clone(), schema);
        }
    }

    Ok(resource)
}

fn payload_structure<'g>(
    graph: &'g ShapeGraph,
    op: &Operation,
    id: ObjectId,
    role: &str,
) -> AppResult<&'g Object> {
    let object = graph.get(id);
    if object.data_type != "structure" {
        return Err(AppError::General(format!(
            "Expected {} shape '{}' of operation '{}' to be a structure but found {}",
            role, object.name, op.name, object.data_type
        )));
    }
    Ok(object)
}

/// Returns the member whose members should be merged.
///
/// An output with exactly one member named like the resource (ignoring case)
/// is an envelope; its single member is merged in its place.
fn unwrap_envelope<'g>(graph: &'g ShapeGraph, output: &'g Object, singular_name: &str) -> &'g Object {
    if output.members.len() != 1 {
        return output;
    }
    match output.members.iter().next() {
        Some((name, member)) if name.eq_ignore_ascii_case(singular_name) => graph.get(member.target),
        _ => output,
    }
}
