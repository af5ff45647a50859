//! OpenAPI Generator (§4.5): emits an OpenAPI 3.0.3 YAML document for a
//! resource's filter/sort/aggregation parameters, honoring the
//! aggregation allow-list and index policy. Grounded on
//! `core/swagger.py`'s `swagger_parameters`/`swagger_component`/
//! `build_swagger_file`.

mod matrix;

use matrix::{supported_kinds, swagger_scalar_type, OPERATOR_DESCRIPTIONS};
use serde_yaml::{Mapping, Value};
use tabular_common::model::Schema;

fn str_val(s: impl Into<String>) -> Value {
    Value::String(s.into())
}

fn mapping(pairs: Vec<(&str, Value)>) -> Value {
    let mut map = Mapping::new();
    for (key, value) in pairs {
        map.insert(str_val(key), value);
    }
    Value::Mapping(map)
}

fn mapping_owned(pairs: Vec<(String, Value)>) -> Value {
    let mut map = Mapping::new();
    for (key, value) in pairs {
        map.insert(str_val(key), value);
    }
    Value::Mapping(map)
}

fn fixed_parameters() -> Vec<Value> {
    vec![
        mapping(vec![
            ("name", str_val("page")),
            ("in", str_val("query")),
            ("description", str_val("Specific page (page=value)")),
            ("required", Value::Bool(false)),
            ("schema", mapping(vec![("type", str_val("integer"))])),
        ]),
        mapping(vec![
            ("name", str_val("page_size")),
            ("in", str_val("query")),
            (
                "description",
                str_val("Number of results per page (page_size=value)"),
            ),
            ("required", Value::Bool(false)),
            ("schema", mapping(vec![("type", str_val("integer"))])),
        ]),
        mapping(vec![
            ("name", str_val("columns")),
            ("in", str_val("query")),
            (
                "description",
                str_val("Columns to keep in the result (columns=column1,column3,...)"),
            ),
            ("required", Value::Bool(false)),
            ("schema", mapping(vec![("type", str_val("string"))])),
            ("style", str_val("form")),
            ("explode", Value::Bool(false)),
        ]),
    ]
}

fn operator_parameter(column: &str, suffix: &str, description: String, is_valueless: bool) -> Value {
    let mut pairs = vec![
        ("name", str_val(format!("{column}__{suffix}"))),
        ("in", str_val("query")),
        ("description", str_val(description)),
        ("required", Value::Bool(false)),
    ];
    if is_valueless {
        pairs.push(("schema", mapping(vec![("type", str_val("boolean"))])));
        pairs.push(("allowEmptyValue", Value::Bool(true)));
    } else {
        pairs.push(("schema", mapping(vec![("type", str_val("string"))])));
    }
    mapping(pairs)
}

/// Builds the `parameters` array for one resource, honoring the
/// aggregation allow-list and index policy (columns outside
/// `allowed_columns`, when set, are skipped entirely).
pub fn swagger_parameters(
    schema: &Schema,
    aggregation_allowed: bool,
    allowed_columns: Option<&[&str]>,
) -> Vec<Value> {
    let mut parameters = fixed_parameters();
    for column in schema {
        if let Some(allowed) = allowed_columns {
            if !allowed.contains(&column.name.as_str()) {
                continue;
            }
        }
        let kinds = supported_kinds(column.type_);
        for op in OPERATOR_DESCRIPTIONS {
            if op.is_aggregator && !aggregation_allowed {
                continue;
            }
            if kinds.contains(&op.suffix) {
                parameters.push(operator_parameter(
                    &column.name,
                    op.suffix,
                    (op.describe)(&column.name),
                    !op.takes_value,
                ));
            }
        }
        if kinds.contains(&"sort") {
            let name = &column.name;
            parameters.push(mapping(vec![
                ("name", str_val(format!("{name}__sort"))),
                ("in", str_val("query")),
                (
                    "description",
                    str_val(format!(
                        "Sort ascending or descending on column: {name} ({name}__sort=asc or {name}__sort=desc)"
                    )),
                ),
                ("required", Value::Bool(false)),
                ("schema", mapping(vec![("type", str_val("string"))])),
            ]));
        }
        if kinds.contains(&"compare") {
            let name = &column.name;
            for (suffix, label) in [
                ("less", "Less than"),
                ("greater", "Greater than"),
                ("strictly_less", "Strictly less than"),
                ("strictly_greater", "Strictly greater than"),
            ] {
                parameters.push(mapping(vec![
                    ("name", str_val(format!("{name}__{suffix}"))),
                    ("in", str_val("query")),
                    (
                        "description",
                        str_val(format!("{label} in column: {name} ({name}__{suffix}=value)")),
                    ),
                    ("required", Value::Bool(false)),
                    ("schema", mapping(vec![("type", str_val("string"))])),
                ]));
            }
        }
    }
    parameters
}

fn swagger_component(schema: &Schema) -> Value {
    let mut resource_props = Mapping::new();
    for column in schema {
        resource_props.insert(
            str_val(column.name.clone()),
            mapping(vec![("type", str_val(swagger_scalar_type(column.type_)))]),
        );
    }
    mapping(vec![(
        "schemas",
        mapping(vec![
            (
                "ResourceData",
                mapping(vec![
                    ("type", str_val("object")),
                    (
                        "properties",
                        mapping(vec![
                            (
                                "data",
                                mapping(vec![
                                    ("type", str_val("array")),
                                    (
                                        "items",
                                        mapping(vec![(
                                            "$ref",
                                            str_val("#/components/schemas/Resource"),
                                        )]),
                                    ),
                                ]),
                            ),
                            (
                                "links",
                                mapping(vec![
                                    ("type", str_val("object")),
                                    (
                                        "properties",
                                        mapping(vec![
                                            (
                                                "profile",
                                                mapping(vec![("type", str_val("string"))]),
                                            ),
                                            ("next", mapping(vec![("type", str_val("string"))])),
                                            ("prev", mapping(vec![("type", str_val("string"))])),
                                            (
                                                "swagger",
                                                mapping(vec![("type", str_val("string"))]),
                                            ),
                                        ]),
                                    ),
                                ]),
                            ),
                            (
                                "meta",
                                mapping(vec![
                                    ("type", str_val("object")),
                                    (
                                        "properties",
                                        mapping(vec![
                                            ("page", mapping(vec![("type", str_val("integer"))])),
                                            (
                                                "page_size",
                                                mapping(vec![("type", str_val("integer"))]),
                                            ),
                                            (
                                                "total",
                                                mapping(vec![("type", str_val("integer"))]),
                                            ),
                                        ]),
                                    ),
                                ]),
                            ),
                        ]),
                    ),
                ]),
            ),
            (
                "Resource",
                mapping(vec![
                    ("type", str_val("object")),
                    ("properties", Value::Mapping(resource_props)),
                ]),
            ),
        ]),
    )])
}

fn path_item(summary: &str, description: &str, operation_id: &str, content_type: &str, parameters: Vec<Value>) -> Value {
    mapping(vec![
        (
            "get",
            mapping(vec![
                ("summary", str_val(summary)),
                ("description", str_val(description)),
                ("operationId", str_val(operation_id)),
                (
                    "responses",
                    mapping(vec![
                        (
                            "200",
                            mapping(vec![
                                ("description", str_val("successful operation")),
                                (
                                    "content",
                                    mapping(vec![(
                                        content_type,
                                        if content_type == "application/json" {
                                            mapping(vec![(
                                                "schema",
                                                mapping(vec![(
                                                    "$ref",
                                                    str_val("#/components/schemas/ResourceData"),
                                                )]),
                                            )])
                                        } else {
                                            mapping(vec![])
                                        },
                                    )]),
                                ),
                            ]),
                        ),
                        ("400", mapping(vec![("description", str_val("Invalid query string"))])),
                        ("404", mapping(vec![("description", str_val("Resource not found"))])),
                    ]),
                ),
            ]),
        ),
        ("parameters", Value::Sequence(parameters)),
    ])
}

/// Builds the OpenAPI 3.0.3 document for `resource_id`, serialized as
/// YAML.
pub fn build_openapi_document(
    resource_id: &str,
    schema: &Schema,
    aggregation_allowed: bool,
    allowed_columns: Option<&[&str]>,
) -> String {
    let parameters = swagger_parameters(schema, aggregation_allowed, allowed_columns);
    let components = swagger_component(schema);

    let doc = mapping(vec![
        ("openapi", str_val("3.0.3")),
        (
            "info",
            mapping(vec![
                ("title", str_val("Tabular API")),
                (
                    "description",
                    str_val("Retrieve data for a specified resource with optional filtering and sorting."),
                ),
                ("version", str_val("1.0.0")),
            ]),
        ),
        (
            "tags",
            Value::Sequence(vec![mapping(vec![
                ("name", str_val("Data retrieval")),
                (
                    "description",
                    str_val("Retrieve data for a specified resource"),
                ),
            ])]),
        ),
        (
            "paths",
            mapping_owned(vec![
                (
                    format!("/api/resources/{resource_id}/data/"),
                    path_item(
                        "Get resource data from its ID",
                        "Returns resource data based on ID as JSON, each row is a dictionary.",
                        "getResourceDataFromId",
                        "application/json",
                        parameters.clone(),
                    ),
                ),
                (
                    format!("/api/resources/{resource_id}/data/csv/"),
                    path_item(
                        "Get resource data from its ID in CSV format",
                        "Returns resource data based on ID as a CSV file.",
                        "getResourceDataFromIdCSV",
                        "text/csv",
                        parameters.clone(),
                    ),
                ),
                (
                    format!("/api/resources/{resource_id}/data/json/"),
                    path_item(
                        "Get resource data from its ID in JSON format",
                        "Returns resource data based on ID as a JSON file.",
                        "getResourceDataFromIdJSON",
                        "application/json",
                        parameters,
                    ),
                ),
            ]),
        ),
        ("components", components),
    ]);

    serde_yaml::to_string(&doc).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabular_common::model::{Column, ColumnType};

    fn sample_schema() -> Schema {
        vec![
            Column {
                name: "amount".to_string(),
                type_: ColumnType::Float,
            },
            Column {
                name: "label".to_string(),
                type_: ColumnType::String,
            },
        ]
    }

    #[test]
    fn fixed_parameters_always_present() {
        let params = swagger_parameters(&sample_schema(), false, None);
        let names: Vec<String> = params
            .iter()
            .filter_map(|p| p.get("name").and_then(|n| n.as_str()).map(str::to_string))
            .collect();
        assert!(names.contains(&"page".to_string()));
        assert!(names.contains(&"page_size".to_string()));
        assert!(names.contains(&"columns".to_string()));
    }

    #[test]
    fn aggregators_omitted_when_not_allowed() {
        let params = swagger_parameters(&sample_schema(), false, None);
        assert!(!params.iter().any(|p| p
            .get("name")
            .and_then(|n| n.as_str())
            .map(|n| n.ends_with("__avg"))
            .unwrap_or(false)));
    }

    #[test]
    fn aggregators_present_when_allowed() {
        let params = swagger_parameters(&sample_schema(), true, None);
        assert!(params.iter().any(|p| p
            .get("name")
            .and_then(|n| n.as_str())
            .map(|n| n == "amount__avg")
            .unwrap_or(false)));
    }

    #[test]
    fn index_policy_excludes_other_columns() {
        let params = swagger_parameters(&sample_schema(), true, Some(&["amount"]));
        assert!(!params.iter().any(|p| p
            .get("name")
            .and_then(|n| n.as_str())
            .map(|n| n.starts_with("label__"))
            .unwrap_or(false)));
    }

    #[test]
    fn json_columns_only_get_null_operators() {
        let schema = vec![Column {
            name: "payload".to_string(),
            type_: ColumnType::Json,
        }];
        let params = swagger_parameters(&schema, true, None);
        let names: Vec<String> = params
            .iter()
            .filter_map(|p| p.get("name").and_then(|n| n.as_str()).map(str::to_string))
            .filter(|n| n.starts_with("payload__"))
            .collect();
        assert_eq!(names.len(), 2);
        assert!(names.contains(&"payload__isnull".to_string()));
        assert!(names.contains(&"payload__isnotnull".to_string()));
    }

    #[test]
    fn document_renders_as_yaml() {
        let doc = build_openapi_document("rid-1", &sample_schema(), true, None);
        assert!(doc.contains("openapi: 3.0.3"));
        assert!(doc.contains("/api/resources/rid-1/data/"));
    }
}
