#![deny(missing_docs)]

//! # API Model
//!
//! The entry point for querying one service API.
//!
//! An [`ApiModel`] owns the parsed documents and derives everything else on
//! first demand: the shape graph, then the component registry, then the
//! resources. Each is computed once and kept for the lifetime of the model;
//! later calls hand out the same instance.

use crate::document::build_openapi;
use crate::error::AppResult;
use crate::filter::{ObjectFilter, OperationFilter};
use crate::graph::{Object, ObjectKind, Operation, ShapeGraph};
use crate::inflection::{EnglishInflector, Inflector};
use crate::resource::{infer_resources, Resource};
use crate::schema::Schema;
use crate::spec::{self, ApiSpec, DocSpec, Protocol};
use crate::synthesizer::ComponentRegistry;
use indexmap::IndexMap;
use once_cell::sync::OnceCell;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use utoipa::openapi::schema::ObjectBuilder;
use utoipa::openapi::OpenApi;

/// Counts and metadata describing an API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSummary {
    /// Short alias (directory name), e.g. `sns`.
    pub alias: String,
    /// Full service name, possibly empty.
    pub full_name: String,
    /// API version string.
    pub api_version: String,
    /// Wire protocol tag.
    pub protocol: String,
    /// Number of operations.
    pub operations: usize,
    /// Number of scalar shapes.
    pub scalars: usize,
    /// Number of plain structure shapes.
    pub objects: usize,
    /// Number of payload shapes.
    pub payloads: usize,
    /// Number of exception shapes.
    pub exceptions: usize,
    /// Number of list shapes.
    pub lists: usize,
}

/// A parsed API with lazily derived, memoized views.
pub struct ApiModel {
    alias: String,
    spec: ApiSpec,
    docs: Option<DocSpec>,
    inflector: Option<Arc<dyn Inflector + Send + Sync>>,
    graph: OnceCell<ShapeGraph>,
    components: OnceCell<ComponentRegistry>,
    resources: OnceCell<IndexMap<String, Resource>>,
}

impl ApiModel {
    /// Wraps already-parsed documents.
    pub fn new(alias: impl Into<String>, spec: ApiSpec, docs: Option<DocSpec>) -> Self {
        Self {
            alias: alias.into(),
            spec,
            docs,
            inflector: None,
            graph: OnceCell::new(),
            components: OnceCell::new(),
            resources: OnceCell::new(),
        }
    }

    /// Parses the model (and optional documentation) from JSON text.
    pub fn from_json(alias: impl Into<String>, model_json: &str, docs_json: Option<&str>) -> AppResult<Self> {
        let spec = spec::parse_api_spec(model_json)?;
        let docs = docs_json.map(spec::parse_doc_spec).transpose()?;
        Ok(Self::new(alias, spec, docs))
    }

    /// Loads the model from disk. A missing documentation file is ignored.
    pub fn load(alias: impl Into<String>, model_path: &Path, docs_path: Option<&Path>) -> AppResult<Self> {
        let spec = spec::load_api_spec(model_path)?;
        let docs = match docs_path {
            Some(path) => spec::load_doc_spec(path)?,
            None => None,
        };
        Ok(Self::new(alias, spec, docs))
    }

    /// Replaces the inflector used for resource names.
    ///
    /// Has no effect once resources have been inferred.
    pub fn with_inflector(mut self, inflector: Arc<dyn Inflector + Send + Sync>) -> Self {
        self.inflector = Some(inflector);
        self
    }

    /// Short alias of the API.
    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// The raw model document.
    pub fn spec(&self) -> &ApiSpec {
        &self.spec
    }

    /// The documentation document, if one was supplied.
    pub fn docs(&self) -> Option<&DocSpec> {
        self.docs.as_ref()
    }

    /// Wire protocol.
    pub fn protocol(&self) -> &Protocol {
        &self.spec.metadata.protocol
    }

    /// The classified shape graph.
    pub fn graph(&self) -> AppResult<&ShapeGraph> {
        self.graph
            .get_or_try_init(|| ShapeGraph::build(&self.spec, self.docs.as_ref()))
    }

    /// The component registry. Builds the graph first.
    pub fn components(&self) -> AppResult<&ComponentRegistry> {
        self.graph()?;
        self.components
            .get_or_try_init(|| ComponentRegistry::build(&self.spec))
    }

    /// Inferred resources keyed by derived object name.
    pub fn resources(&self) -> AppResult<&IndexMap<String, Resource>> {
        self.resources.get_or_try_init(|| {
            let graph = self.graph()?;
            let registry = self.components()?;
            match &self.inflector {
                Some(inflector) => infer_resources(&self.spec, graph, registry, inflector.as_ref()),
                None => infer_resources(&self.spec, graph, registry, EnglishInflector::shared()),
            }
        })
    }

    /// Operations passing `filter`, sorted by name.
    pub fn operations(&self, filter: &OperationFilter) -> AppResult<Vec<&Operation>> {
        let mut ops: Vec<&Operation> = self
            .graph()?
            .operations()
            .iter()
            .filter(|op| filter.matches(op))
            .collect();
        ops.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(ops)
    }

    /// Objects passing `filter`, sorted by name.
    pub fn objects(&self, filter: &ObjectFilter) -> AppResult<Vec<&Object>> {
        let mut objects: Vec<&Object> = self
            .graph()?
            .objects()
            .iter()
            .filter(|obj| filter.matches(obj))
            .collect();
        objects.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(objects)
    }

    /// Operation by exact name.
    pub fn operation(&self, name: &str) -> AppResult<Option<&Operation>> {
        Ok(self.graph()?.operation(name))
    }

    /// Object by exact shape name.
    pub fn object(&self, name: &str) -> AppResult<Option<&Object>> {
        Ok(self.graph()?.object(name))
    }

    /// Component schema by structure name.
    pub fn component(&self, name: &str) -> AppResult<Option<Arc<Schema>>> {
        Ok(self.components()?.get(name).cloned())
    }

    /// Resource by name.
    ///
    /// Tries the exact key first, then any key, singular or plural form
    /// ignoring case, so `cluster`, `Clusters` and `Cluster` all find the
    /// `Cluster` resource.
    pub fn resource(&self, name: &str) -> AppResult<Option<&Resource>> {
        let resources = self.resources()?;
        if let Some(resource) = resources.get(name) {
            return Ok(Some(resource));
        }
        Ok(resources.iter().find_map(|(key, r)| {
            let hit = key.eq_ignore_ascii_case(name)
                || r.singular_name.eq_ignore_ascii_case(name)
                || r.plural_name.eq_ignore_ascii_case(name);
            hit.then_some(r)
        }))
    }

    /// Object schema for a resource: its properties plus required list.
    pub fn resource_schema(&self, name: &str) -> AppResult<Option<Schema>> {
        Ok(self.resource(name)?.map(|r| {
            let object = r
                .properties
                .iter()
                .fold(ObjectBuilder::new(), |b, (property, schema)| {
                    b.property(property.clone(), schema.clone())
                });
            let object = r
                .required
                .iter()
                .fold(object, |b, required| b.required(required.clone()));
            Schema::Object(object.build())
        }))
    }

    /// Counts and metadata.
    pub fn summary(&self) -> AppResult<ApiSummary> {
        let graph = self.graph()?;
        let metadata = &self.spec.metadata;
        Ok(ApiSummary {
            alias: self.alias.clone(),
            full_name: metadata.service_full_name.clone(),
            api_version: metadata.api_version.clone(),
            protocol: metadata.protocol.to_string(),
            operations: graph.operations().len(),
            scalars: graph.count(ObjectKind::Scalar),
            objects: graph.count(ObjectKind::Object),
            payloads: graph.count(ObjectKind::Payload),
            exceptions: graph.count(ObjectKind::Exception),
            lists: graph.count(ObjectKind::List),
        })
    }

    /// The full OpenAPI document.
    pub fn openapi(&self) -> AppResult<OpenApi> {
        let graph = self.graph()?;
        let registry = self.components()?;
        build_openapi(&self.alias, &self.spec, graph, registry, self.docs.as_ref())
    }
}
