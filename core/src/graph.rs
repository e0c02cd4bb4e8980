#![deny(missing_docs)]

//! # Shape Graph
//!
//! Converts the flat shape map of an [`ApiSpec`] into an arena of classified,
//! cross-referencing [`Object`] nodes, and resolves every operation against it.
//!
//! Member edges are [`ObjectId`] indices into the arena, so self-referential and
//! mutually recursive structures need no owning back-pointers.

use crate::error::{AppError, AppResult};
use crate::spec::{ApiSpec, DocSpec, Location};
use indexmap::IndexMap;
use std::fmt;
use std::str::FromStr;

/// Classification of a shape in the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ObjectKind {
    /// Any non-structure, non-list shape.
    Scalar,
    /// A structure that is neither an exception nor an operation payload.
    Object,
    /// A shape used as some operation's input or output.
    Payload,
    /// A structure flagged as an exception.
    Exception,
    /// A list shape.
    List,
}

impl ObjectKind {
    /// All kinds, in display order.
    pub const ALL: [ObjectKind; 5] = [
        ObjectKind::Scalar,
        ObjectKind::Object,
        ObjectKind::Payload,
        ObjectKind::Exception,
        ObjectKind::List,
    ];

    /// Lowercase name used on the command line and in tables.
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectKind::Scalar => "scalar",
            ObjectKind::Object => "object",
            ObjectKind::Payload => "payload",
            ObjectKind::Exception => "exception",
            ObjectKind::List => "list",
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ObjectKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        ObjectKind::ALL
            .into_iter()
            .find(|k| k.as_str() == lower || format!("{}s", k.as_str()) == lower)
            .ok_or_else(|| AppError::General(format!("Unknown object type '{}'", s)))
    }
}

/// Index of an [`Object`] inside a [`ShapeGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(usize);

impl ObjectId {
    /// Raw arena index.
    pub fn index(self) -> usize {
        self.0
    }
}

/// An edge from a structure (or list) to the shape of one of its members.
#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    /// Target node.
    pub target: ObjectId,
    /// Wire location of the member, if tagged.
    pub location: Option<Location>,
}

/// A resolved graph node, one per shape name.
#[derive(Debug, Clone, PartialEq)]
pub struct Object {
    /// Shape name.
    pub name: String,
    /// Classification after the override pass.
    pub kind: ObjectKind,
    /// Raw shape `type`.
    pub data_type: String,
    /// Member name to target node. Lists carry one synthetic member keyed by the element shape name;
    /// maps carry `key` and `value`.
    pub members: IndexMap<String, Member>,
    /// Required member names.
    pub required: Vec<String>,
}

/// A resolved operation.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    /// Operation name.
    pub name: String,
    /// HTTP method.
    pub method: String,
    /// Request URI template.
    pub request_uri: String,
    /// Declared success status code, if any.
    pub response_code: Option<u16>,
    /// Input payload node.
    pub input: Option<ObjectId>,
    /// Output payload node.
    pub output: Option<ObjectId>,
    /// Error nodes, in declaration order.
    pub errors: Vec<ObjectId>,
    /// Documentation text, when a documentation document was supplied.
    pub documentation: Option<String>,
}

/// The arena of objects plus the resolved operations.
#[derive(Debug, Clone, Default)]
pub struct ShapeGraph {
    objects: Vec<Object>,
    index: IndexMap<String, ObjectId>,
    operations: Vec<Operation>,
}

impl ShapeGraph {
    /// Builds the graph from a spec document.
    ///
    /// Runs the classification pass, the member wiring pass and the
    /// operation-override pass in that order. Any dangling reference aborts
    /// the build; no partial graph is returned.
    pub fn build(spec: &ApiSpec, docs: Option<&DocSpec>) -> AppResult<Self> {
        let mut graph = ShapeGraph::default();

        for (name, shape) in &spec.shapes {
            let kind = if !shape.is_structure() && !shape.is_list() {
                ObjectKind::Scalar
            } else if shape.is_structure() && shape.exception {
                ObjectKind::Exception
            } else if shape.is_list() {
                ObjectKind::List
            } else {
                ObjectKind::Object
            };
            tracing::trace!(shape = %name, %kind, "classified shape");
            let id = ObjectId(graph.objects.len());
            graph.objects.push(Object {
                name: name.clone(),
                kind,
                data_type: shape.kind.clone(),
                members: IndexMap::new(),
                required: shape.required.clone(),
            });
            graph.index.insert(name.clone(), id);
        }

        for (name, shape) in &spec.shapes {
            let owner = graph.id_of(name)?;
            let mut members = IndexMap::new();
            if shape.is_structure() {
                for (member_name, member_ref) in &shape.members {
                    let target = graph.resolve(&format!("{}.{}", name, member_name), &member_ref.shape)?;
                    members.insert(
                        member_name.clone(),
                        Member {
                            target,
                            location: member_ref.location.clone(),
                        },
                    );
                }
            } else if shape.is_list() {
                if let Some(element) = &shape.member {
                    let target = graph.resolve(&format!("{}.member", name), &element.shape)?;
                    members.insert(
                        element.shape.clone(),
                        Member {
                            target,
                            location: None,
                        },
                    );
                }
            } else if shape.is_map() {
                for (slot, entry) in [("key", &shape.key), ("value", &shape.value)] {
                    if let Some(entry) = entry {
                        let target = graph.resolve(&format!("{}.{}", name, slot), &entry.shape)?;
                        members.insert(
                            slot.to_string(),
                            Member {
                                target,
                                location: None,
                            },
                        );
                    }
                }
            }
            graph.objects[owner.0].members = members;
        }

        for (op_name, op_spec) in &spec.operations {
            let input = match &op_spec.input {
                Some(r) => Some(graph.resolve(&format!("{}.input", op_name), &r.shape)?),
                None => None,
            };
            let output = match &op_spec.output {
                Some(r) => Some(graph.resolve(&format!("{}.output", op_name), &r.shape)?),
                None => None,
            };
            let errors = op_spec
                .errors
                .iter()
                .map(|r| graph.resolve(&format!("{}.errors", op_name), &r.shape))
                .collect::<AppResult<Vec<_>>>()?;

            for payload in input.iter().chain(output.iter()) {
                graph.mark_payload(*payload);
            }

            graph.operations.push(Operation {
                name: op_name.clone(),
                method: op_spec.http.method.clone(),
                request_uri: op_spec.http.request_uri.clone(),
                response_code: op_spec.http.response_code,
                input,
                output,
                errors,
                documentation: docs.and_then(|d| d.operation(op_name)).map(str::to_string),
            });
        }

        tracing::debug!(
            objects = graph.objects.len(),
            operations = graph.operations.len(),
            "shape graph built"
        );
        Ok(graph)
    }

    fn resolve(&self, referrer: &str, target: &str) -> AppResult<ObjectId> {
        self.index
            .get(target)
            .copied()
            .ok_or_else(|| AppError::dangling(referrer, target))
    }

    fn id_of(&self, name: &str) -> AppResult<ObjectId> {
        self.resolve(name, name)
    }

    fn mark_payload(&mut self, id: ObjectId) {
        let obj = &mut self.objects[id.0];
        if obj.kind != ObjectKind::Exception {
            obj.kind = ObjectKind::Payload;
        }
    }

    /// Node by id.
    ///
    /// Ids are only minted by this graph, so indexing cannot go out of bounds.
    pub fn get(&self, id: ObjectId) -> &Object {
        &self.objects[id.0]
    }

    /// Node by shape name.
    pub fn object(&self, name: &str) -> Option<&Object> {
        self.index.get(name).map(|id| self.get(*id))
    }

    /// Id of the node for a shape name.
    pub fn lookup(&self, name: &str) -> Option<ObjectId> {
        self.index.get(name).copied()
    }

    /// All nodes, in shape declaration order.
    pub fn objects(&self) -> &[Object] {
        &self.objects
    }

    /// All resolved operations, in declaration order.
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Operation by name.
    pub fn operation(&self, name: &str) -> Option<&Operation> {
        self.operations.iter().find(|op| op.name == name)
    }

    /// Number of nodes carrying the given classification.
    pub fn count(&self, kind: ObjectKind) -> usize {
        self.objects.iter().filter(|o| o.kind == kind).count()
    }
}
