use openapiv3::{OpenAPI, ReferenceOr};
use serde_json::Value;

use crate::error::ExtractError;

/// Operation keys of a path item, in the order they are reported.
pub const HTTP_METHODS: [&str; 8] = [
    "get", "put", "post", "delete", "options", "head", "patch", "trace",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Method {
    pub verb: String,
    pub summary: Option<String>,
}

/// One key of the document's path map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointRecord {
    /// The key exactly as it appears in the document, e.g. `/api/Users/{id}`.
    pub api_path: String,
    /// `api_path` without the base path and without leading slashes.
    pub relative_path: String,
    pub methods: Vec<Method>,
}

impl EndpointRecord {
    pub fn verbs(&self) -> impl Iterator<Item = &str> {
        self.methods.iter().map(|method| method.verb.as_str())
    }
}

/// Read every path of `document`, in document order.
///
/// OpenAPI 3 documents go through the typed model; anything else (Swagger 2.0
/// in particular) is read from the raw `paths` object.
pub fn extract_endpoints(
    document: &Value,
    base_path: &str,
) -> Result<Vec<EndpointRecord>, ExtractError> {
    match serde_json::from_value::<OpenAPI>(document.clone()) {
        Ok(spec) => Ok(endpoints_from_openapi(&spec, base_path)),
        Err(err) => {
            tracing::debug!("not an OpenAPI 3 document ({err}), reading raw path map");
            endpoints_from_raw(document, base_path)
        }
    }
}

fn endpoints_from_openapi(spec: &OpenAPI, base_path: &str) -> Vec<EndpointRecord> {
    spec.paths
        .paths
        .iter()
        .map(|(path, path_item)| {
            let mut methods = match path_item {
                ReferenceOr::Item(path_item) => path_item
                    .iter()
                    .map(|(verb, operation)| Method {
                        verb: verb.to_string(),
                        summary: operation.summary.clone(),
                    })
                    .collect(),
                ReferenceOr::Reference { reference } => {
                    tracing::debug!(path = %path, reference = %reference, "path item is a reference");
                    Vec::new()
                }
            };
            sort_methods(&mut methods);

            EndpointRecord {
                api_path: path.clone(),
                relative_path: strip_base_path(path, base_path),
                methods,
            }
        })
        .collect()
}

fn endpoints_from_raw(document: &Value, base_path: &str) -> Result<Vec<EndpointRecord>, ExtractError> {
    let paths = document
        .get("paths")
        .and_then(Value::as_object)
        .ok_or(ExtractError::MissingPaths)?;

    Ok(paths
        .iter()
        .map(|(path, item)| {
            let methods = match item.as_object() {
                Some(operations) => HTTP_METHODS
                    .iter()
                    .filter_map(|verb| {
                        operations.get(*verb).map(|operation| Method {
                            verb: verb.to_string(),
                            summary: operation
                                .get("summary")
                                .and_then(Value::as_str)
                                .map(str::to_string),
                        })
                    })
                    .collect(),
                None => Vec::new(),
            };

            EndpointRecord {
                api_path: path.clone(),
                relative_path: strip_base_path(path, base_path),
                methods,
            }
        })
        .collect())
}

fn sort_methods(methods: &mut [Method]) {
    methods.sort_by_key(|method| {
        HTTP_METHODS
            .iter()
            .position(|verb| *verb == method.verb)
            .unwrap_or(HTTP_METHODS.len())
    });
}

/// Remove the first occurrence of `base_path`, then any leading `/`.
///
/// Paths that do not contain `base_path` pass through unchanged apart from the
/// leading slashes.
pub fn strip_base_path(path: &str, base_path: &str) -> String {
    let stripped = match path.find(base_path) {
        Some(start) => format!("{}{}", &path[..start], &path[start + base_path.len()..]),
        None => {
            tracing::debug!(path, base_path, "base path not found, keeping path as is");
            path.to_string()
        }
    };

    stripped.trim_start_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn petstore_v3() -> Value {
        json!({
            "openapi": "3.0.1",
            "info": { "title": "Pets", "version": "v1" },
            "paths": {
                "/api/Users/{id}": {
                    "delete": { "responses": {} },
                    "get": { "summary": "Get a user", "responses": {} }
                },
                "/api/Users": {
                    "post": { "responses": {} }
                },
                "/api/Orders/{orderId}/lines": {
                    "parameters": [],
                    "get": { "responses": {} }
                }
            }
        })
    }

    #[test]
    fn test_strip_base_path() {
        assert_eq!(strip_base_path("/api/Users/{id}", "/api/"), "Users/{id}");
        assert_eq!(strip_base_path("/api/Users", "/api"), "Users");
        assert_eq!(strip_base_path("/v1/api/Users", "/api/"), "v1Users");
        assert_eq!(strip_base_path("/health", "/api/"), "health");
        assert_eq!(strip_base_path("/api/", "/api/"), "");
    }

    #[test]
    fn stripped_path_never_starts_with_base_path() {
        for path in ["/api/Users", "/api/api/Users", "/api/", "/api/Users/{id}/api/x"] {
            let relative = strip_base_path(path, "/api/");
            assert!(!relative.starts_with("/api/"), "{path} -> {relative}");
        }
    }

    #[test]
    fn openapi_document_keeps_key_order() {
        let records = extract_endpoints(&petstore_v3(), "/api/").unwrap();

        let paths: Vec<_> = records.iter().map(|r| r.relative_path.as_str()).collect();
        assert_eq!(paths, ["Users/{id}", "Users", "Orders/{orderId}/lines"]);
        assert_eq!(records[0].api_path, "/api/Users/{id}");
    }

    #[test]
    fn methods_are_reported_in_canonical_order() {
        let records = extract_endpoints(&petstore_v3(), "/api/").unwrap();

        assert_eq!(records[0].verbs().collect::<Vec<_>>(), ["get", "delete"]);
        assert_eq!(records[0].methods[0].summary.as_deref(), Some("Get a user"));
        assert_eq!(records[2].verbs().collect::<Vec<_>>(), ["get"]);
    }

    #[test]
    fn swagger_two_document_is_read_from_raw_paths() {
        let document = json!({
            "swagger": "2.0",
            "info": { "title": "Legacy", "version": "1" },
            "paths": {
                "/api/Clients/{clientId}": {
                    "parameters": [],
                    "put": { "summary": "Replace client" },
                    "get": {}
                },
                "/api/Clients": { "get": {} }
            }
        });

        let records = extract_endpoints(&document, "/api/").unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].relative_path, "Clients/{clientId}");
        assert_eq!(records[0].verbs().collect::<Vec<_>>(), ["get", "put"]);
        assert_eq!(records[0].methods[1].summary.as_deref(), Some("Replace client"));
        assert_eq!(records[1].relative_path, "Clients");
    }

    #[test]
    fn document_without_paths_is_rejected() {
        let err = extract_endpoints(&json!({ "swagger": "2.0" }), "/api/").unwrap_err();
        assert!(matches!(err, ExtractError::MissingPaths));
    }
}
