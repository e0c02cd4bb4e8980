#![deny(missing_docs)]

//! # OpenAPI Document
//!
//! Assembles the full OpenAPI document of an API: every structure component
//! plus one path operation per resolved operation.

use crate::error::AppResult;
use crate::graph::{Operation, ShapeGraph};
use crate::schema::{self, RefOr, Schema};
use crate::spec::{ApiSpec, DocSpec, Protocol};
use crate::synthesizer::ComponentRegistry;
use indexmap::IndexMap;
use utoipa::openapi::path::{HttpMethod, OperationBuilder};
use utoipa::openapi::request_body::RequestBodyBuilder;
use utoipa::openapi::{
    ComponentsBuilder, ContentBuilder, InfoBuilder, OpenApi, OpenApiBuilder, Paths, Required,
    ResponseBuilder,
};

/// Success status used when an operation declares none.
pub const DEFAULT_SUCCESS_CODE: u16 = 200;

/// Status used for error shapes that declare none.
pub const DEFAULT_ERROR_CODE: u16 = 400;

const JSON_MEDIA_TYPE: &str = "application/json";

/// Builds the OpenAPI document.
///
/// `title` is used when the model carries no service name. Operations with an
/// HTTP method OpenAPI has no slot for are left out with a warning.
pub fn build_openapi(
    title: &str,
    spec: &ApiSpec,
    graph: &ShapeGraph,
    registry: &ComponentRegistry,
    docs: Option<&DocSpec>,
) -> AppResult<OpenApi> {
    let full_name = spec.metadata.service_full_name.as_str();
    let info = InfoBuilder::new()
        .title(if full_name.is_empty() { title } else { full_name })
        .version(spec.metadata.api_version.as_str())
        .description(docs.and_then(|d| d.service.clone()))
        .build();

    let components = registry
        .iter()
        .fold(ComponentsBuilder::new(), |b, (name, component)| {
            b.schema(name.clone(), Schema::clone(component))
        })
        .build();

    let mut paths = Paths::new();
    for op in graph.operations() {
        let path = operation_path(&spec.metadata.protocol, op);
        let Some(method) = http_method(&op.method) else {
            tracing::warn!(%path, method = %op.method, operation = %op.name, "unsupported HTTP method; operation left out");
            continue;
        };
        let operation = build_operation(spec, graph, registry, op)?;
        if paths.get_path_operation(&path, method.clone()).is_some() {
            tracing::warn!(%path, method = %op.method, operation = %op.name, "operation replaces an earlier one on the same path");
        }
        paths.add_path_operation(&path, vec![method], operation);
    }

    let openapi = OpenApiBuilder::new()
        .info(info)
        .paths(paths)
        .components(Some(components))
        .build();
    tracing::debug!(
        paths = openapi.paths.paths.len(),
        components = registry.len(),
        "openapi document assembled"
    );
    Ok(openapi)
}

/// The path key for an operation.
///
/// Action-dispatched protocols route every call through the same URI, so the
/// operation name is appended as a fragment to keep the operations apart.
pub fn operation_path(protocol: &Protocol, op: &Operation) -> String {
    match protocol {
        Protocol::Query | Protocol::Ec2 | Protocol::Json => {
            format!("{}#action={}", op.request_uri, op.name)
        }
        _ => op.request_uri.clone(),
    }
}

/// Maps a model HTTP method onto its path item slot, ignoring case.
pub fn http_method(method: &str) -> Option<HttpMethod> {
    match method.to_ascii_uppercase().as_str() {
        "GET" => Some(HttpMethod::Get),
        "PUT" => Some(HttpMethod::Put),
        "POST" => Some(HttpMethod::Post),
        "DELETE" => Some(HttpMethod::Delete),
        "OPTIONS" => Some(HttpMethod::Options),
        "HEAD" => Some(HttpMethod::Head),
        "PATCH" => Some(HttpMethod::Patch),
        "TRACE" => Some(HttpMethod::Trace),
        _ => None,
    }
}

fn json_content(schema: RefOr<Schema>) -> utoipa::openapi::Content {
    ContentBuilder::new().schema(Some(schema)).build()
}

fn build_operation(
    spec: &ApiSpec,
    graph: &ShapeGraph,
    registry: &ComponentRegistry,
    op: &Operation,
) -> AppResult<utoipa::openapi::path::Operation> {
    let mut builder = OperationBuilder::new()
        .operation_id(Some(op.name.as_str()))
        .description(op.documentation.clone());

    if let Some(input) = op.input {
        let name = &graph.get(input).name;
        let schema = registry.schema_for(spec, &format!("{}.input", op.name), name)?;
        let body = RequestBodyBuilder::new()
            .content(JSON_MEDIA_TYPE, json_content(schema))
            .required(Some(Required::True))
            .build();
        builder = builder.request_body(Some(body));
    }

    let success = op.response_code.unwrap_or(DEFAULT_SUCCESS_CODE).to_string();
    let mut response = ResponseBuilder::new().description("Success");
    if let Some(output) = op.output {
        let name = &graph.get(output).name;
        let schema = registry.schema_for(spec, &format!("{}.output", op.name), name)?;
        response = response.content(JSON_MEDIA_TYPE, json_content(schema));
    }
    builder = builder.response(success, response);

    for (code, (names, schema)) in error_responses(spec, graph, registry, op)? {
        let response = ResponseBuilder::new()
            .description(names.join(", "))
            .content(JSON_MEDIA_TYPE, json_content(schema));
        builder = builder.response(code.to_string(), response);
    }
    Ok(builder.build())
}

/// Groups error shapes by status code, in order of first appearance.
///
/// A code shared by several shapes gets a `oneOf` of their schemas.
fn error_responses(
    spec: &ApiSpec,
    graph: &ShapeGraph,
    registry: &ComponentRegistry,
    op: &Operation,
) -> AppResult<IndexMap<u16, (Vec<String>, RefOr<Schema>)>> {
    let mut grouped: IndexMap<u16, (Vec<String>, Vec<RefOr<Schema>>)> = IndexMap::new();
    let referrer = format!("{}.errors", op.name);
    for id in &op.errors {
        let name = &graph.get(*id).name;
        let shape = spec.shape(&referrer, name)?;
        let code = shape
            .error
            .as_ref()
            .and_then(|e| e.http_status_code)
            .unwrap_or(DEFAULT_ERROR_CODE);
        let schema = registry.schema_for(spec, &referrer, name)?;
        let entry = grouped.entry(code).or_default();
        entry.0.push(name.clone());
        entry.1.push(schema);
    }

    Ok(grouped
        .into_iter()
        .map(|(code, (names, schemas))| (code, (names, schema::one_of(schemas))))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::parse_api_spec;
    use serde_json::Value;

    const EKS: &str = r#"{
        "metadata": {"apiVersion": "2017-11-01", "serviceFullName": "Amazon Elastic Kubernetes Service", "protocol": "rest-json"},
        "operations": {
            "CreateCluster": {
                "http": {"method": "POST", "requestUri": "/clusters"},
                "input": {"shape": "CreateClusterRequest"},
                "output": {"shape": "CreateClusterResponse"},
                "errors": [
                    {"shape": "ResourceInUseException"},
                    {"shape": "InvalidParameterException"},
                    {"shape": "ServerException"},
                    {"shape": "NoSuchThing"}
                ]
            },
            "DeleteCluster": {
                "http": {"method": "DELETE", "requestUri": "/clusters/{name}", "responseCode": 202},
                "input": {"shape": "DeleteClusterRequest"}
            }
        },
        "shapes": {
            "CreateClusterRequest": {"type": "structure", "required": ["name"], "members": {"name": {"shape": "String"}}},
            "CreateClusterResponse": {"type": "structure", "members": {"cluster": {"shape": "Cluster"}}},
            "DeleteClusterRequest": {"type": "structure", "members": {"name": {"shape": "String", "location": "uri", "locationName": "name"}}},
            "Cluster": {"type": "structure", "members": {"name": {"shape": "String"}}},
            "String": {"type": "string"},
            "ResourceInUseException": {"type": "structure", "members": {}, "exception": true, "error": {"httpStatusCode": 409}},
            "InvalidParameterException": {"type": "structure", "members": {}, "exception": true, "error": {"httpStatusCode": 400}},
            "ServerException": {"type": "structure", "members": {}, "exception": true, "error": {"httpStatusCode": 500}},
            "NoSuchThing": {"type": "structure", "members": {}, "exception": true}
        }
    }"#;

    fn document(json: &str, docs: Option<&DocSpec>) -> Value {
        let spec = parse_api_spec(json).unwrap();
        let graph = ShapeGraph::build(&spec, docs).unwrap();
        let registry = ComponentRegistry::build(&spec).unwrap();
        let openapi = build_openapi("eks", &spec, &graph, &registry, docs).unwrap();
        serde_json::to_value(&openapi).unwrap()
    }

    #[test]
    fn test_info_and_components() {
        let doc = document(EKS, None);
        assert_eq!(doc["info"]["title"], "Amazon Elastic Kubernetes Service");
        assert_eq!(doc["info"]["version"], "2017-11-01");
        let schemas = doc["components"]["schemas"].as_object().unwrap();
        assert_eq!(schemas.len(), 8);
        assert!(schemas.contains_key("Cluster"));
        assert!(!schemas.contains_key("String"));
    }

    #[test]
    fn test_request_and_success_response() {
        let doc = document(EKS, None);
        let create = &doc["paths"]["/clusters"]["post"];
        assert_eq!(create["operationId"], "CreateCluster");
        assert_eq!(
            create["requestBody"]["content"]["application/json"]["schema"]["$ref"],
            "#/components/schemas/CreateClusterRequest"
        );
        assert_eq!(create["requestBody"]["required"], true);
        assert_eq!(
            create["responses"]["200"]["content"]["application/json"]["schema"]["$ref"],
            "#/components/schemas/CreateClusterResponse"
        );

        let delete = &doc["paths"]["/clusters/{name}"]["delete"];
        assert_eq!(delete["operationId"], "DeleteCluster");
        assert!(delete["responses"]["202"].is_object());
        assert!(delete["responses"]["200"].is_null());
    }

    #[test]
    fn test_errors_grouped_by_status_code() {
        let doc = document(EKS, None);
        let responses = &doc["paths"]["/clusters"]["post"]["responses"];
        assert_eq!(
            responses["409"]["content"]["application/json"]["schema"]["$ref"],
            "#/components/schemas/ResourceInUseException"
        );
        assert_eq!(
            responses["500"]["content"]["application/json"]["schema"]["$ref"],
            "#/components/schemas/ServerException"
        );
        let shared = responses["400"]["content"]["application/json"]["schema"]["oneOf"]
            .as_array()
            .unwrap();
        assert_eq!(shared.len(), 2);
        assert_eq!(shared[0]["$ref"], "#/components/schemas/InvalidParameterException");
        assert_eq!(shared[1]["$ref"], "#/components/schemas/NoSuchThing");
    }

    #[test]
    fn test_action_fragment_for_query_protocol() {
        let json = r#"{
            "metadata": {"apiVersion": "2010-03-31", "protocol": "query"},
            "operations": {
                "CreateTopic": {"http": {"method": "POST", "requestUri": "/"}},
                "DeleteTopic": {"http": {"method": "POST", "requestUri": "/"}}
            },
            "shapes": {}
        }"#;
        let doc = document(json, None);
        let paths = doc["paths"].as_object().unwrap();
        assert_eq!(paths.len(), 2);
        assert!(paths.contains_key("/#action=CreateTopic"));
        assert!(paths.contains_key("/#action=DeleteTopic"));
        assert_eq!(doc["info"]["title"], "eks");
    }

    #[test]
    fn test_descriptions_from_docs() {
        let docs = DocSpec {
            service: Some("Kubernetes control planes.".into()),
            operations: [("CreateCluster".to_string(), "Creates a cluster.".to_string())]
                .into_iter()
                .collect(),
        };
        let doc = document(EKS, Some(&docs));
        assert_eq!(doc["info"]["description"], "Kubernetes control planes.");
        assert_eq!(doc["paths"]["/clusters"]["post"]["description"], "Creates a cluster.");
        assert!(doc["paths"]["/clusters/{name}"]["delete"]["description"].is_null());
    }

    #[test]
    fn test_operation_path() {
        let op = Operation {
            name: "Publish".into(),
            method: "POST".into(),
            request_uri: "/".into(),
            response_code: None,
            input: None,
            output: None,
            errors: vec![],
            documentation: None,
        };
        assert_eq!(operation_path(&Protocol::Query, &op), "/#action=Publish");
        assert_eq!(operation_path(&Protocol::Json, &op), "/#action=Publish");
        assert_eq!(operation_path(&Protocol::RestJson, &op), "/");
    }

    #[test]
    fn test_http_method_mapping() {
        assert!(matches!(http_method("post"), Some(HttpMethod::Post)));
        assert!(matches!(http_method("PATCH"), Some(HttpMethod::Patch)));
        assert!(http_method("CONNECT").is_none());
    }

    #[test]
    fn test_unsupported_method_is_left_out() {
        let json = r#"{
            "metadata": {"apiVersion": "1", "protocol": "rest-json"},
            "operations": {
                "Tunnel": {"http": {"method": "CONNECT", "requestUri": "/tunnel"}},
                "Ping": {"http": {"method": "GET", "requestUri": "/ping"}}
            },
            "shapes": {}
        }"#;
        let doc = document(json, None);
        let paths = doc["paths"].as_object().unwrap();
        assert_eq!(paths.len(), 1);
        assert_eq!(doc["paths"]["/ping"]["get"]["operationId"], "Ping");
        assert_eq!(doc["paths"]["/ping"]["get"]["responses"]["200"]["description"], "Success");
    }

    #[test]
    fn test_exception_component_carries_marker() {
        let doc = document(EKS, None);
        let schemas = &doc["components"]["schemas"];
        assert_eq!(schemas["ServerException"]["x-exception"], true);
        assert!(schemas["Cluster"]["x-exception"].is_null());
        assert_eq!(schemas["CreateClusterRequest"]["required"], serde_json::json!(["name"]));
    }
}
