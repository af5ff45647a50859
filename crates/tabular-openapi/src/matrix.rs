//! Type-to-operator compatibility matrix (§4.5), carried over from
//! `core/swagger.py`'s `TYPE_POSSIBILITIES` / `MAP_TYPES` /
//! `OPERATORS_DESCRIPTIONS` as the authoritative contract.

use tabular_common::model::ColumnType;

/// Operator catalogue entries a column's semantic type supports,
/// before `sort` and `compare` are expanded into their concrete
/// parameters.
pub fn supported_kinds(column_type: ColumnType) -> &'static [&'static str] {
    match column_type {
        ColumnType::String | ColumnType::Date | ColumnType::Datetime => &[
            "isnull",
            "isnotnull",
            "compare",
            "contains",
            "notcontains",
            "differs",
            "exact",
            "in",
            "notin",
            "sort",
            "groupby",
            "count",
        ],
        ColumnType::Float | ColumnType::Int => &[
            "isnull",
            "isnotnull",
            "compare",
            "differs",
            "exact",
            "in",
            "notin",
            "sort",
            "groupby",
            "count",
            "avg",
            "max",
            "min",
            "sum",
        ],
        ColumnType::Bool => &["isnull", "isnotnull", "differs", "exact", "sort", "groupby", "count"],
        ColumnType::Json => &["isnull", "isnotnull"],
    }
}

/// OpenAPI scalar type used in the `ResourceData` schema component.
/// Unmapped semantic types (string, date, datetime, json) default to
/// `string`.
pub fn swagger_scalar_type(column_type: ColumnType) -> &'static str {
    match column_type {
        ColumnType::Bool => "boolean",
        ColumnType::Int => "integer",
        ColumnType::Float => "number",
        _ => "string",
    }
}

/// One entry from the operator catalogue: the DSL suffix, whether it
/// is an aggregator (gated by the aggregation allow-list and given a
/// boolean/`allowEmptyValue` schema), and its human description
/// template (`{}` is replaced with the column name).
pub struct OperatorDescription {
    pub suffix: &'static str,
    pub is_aggregator: bool,
    pub takes_value: bool,
    pub describe: fn(&str) -> String,
}

pub const OPERATOR_DESCRIPTIONS: &[OperatorDescription] = &[
    OperatorDescription {
        suffix: "exact",
        is_aggregator: false,
        takes_value: true,
        describe: |c| format!("Exact match in column: {c} ({c}__exact=value)"),
    },
    OperatorDescription {
        suffix: "differs",
        is_aggregator: false,
        takes_value: true,
        describe: |c| format!("Differs from in column: {c} ({c}__differs=value)"),
    },
    OperatorDescription {
        suffix: "isnull",
        is_aggregator: false,
        takes_value: false,
        describe: |c| format!("Is `NULL` in column: {c} ({c}__isnull)"),
    },
    OperatorDescription {
        suffix: "isnotnull",
        is_aggregator: false,
        takes_value: false,
        describe: |c| format!("Is not `NULL` in column: {c} ({c}__isnotnull)"),
    },
    OperatorDescription {
        suffix: "contains",
        is_aggregator: false,
        takes_value: true,
        describe: |c| format!("String contains in column: {c} ({c}__contains=value)"),
    },
    OperatorDescription {
        suffix: "notcontains",
        is_aggregator: false,
        takes_value: true,
        describe: |c| format!("String does not contain in column: {c} ({c}__notcontains=value)"),
    },
    OperatorDescription {
        suffix: "in",
        is_aggregator: false,
        takes_value: true,
        describe: |c| format!("Value in list in column: {c} ({c}__in=value1,value2,...)"),
    },
    OperatorDescription {
        suffix: "notin",
        is_aggregator: false,
        takes_value: true,
        describe: |c| format!("Value not in list in column: {c} ({c}__notin=value1,value2,...)"),
    },
    OperatorDescription {
        suffix: "groupby",
        is_aggregator: true,
        takes_value: false,
        describe: |c| format!("Performs `group by values` operation in column: {c}"),
    },
    OperatorDescription {
        suffix: "count",
        is_aggregator: true,
        takes_value: false,
        describe: |c| format!("Performs `count values` operation in column: {c}"),
    },
    OperatorDescription {
        suffix: "avg",
        is_aggregator: true,
        takes_value: false,
        describe: |c| format!("Performs `mean` operation in column: {c}"),
    },
    OperatorDescription {
        suffix: "min",
        is_aggregator: true,
        takes_value: false,
        describe: |c| format!("Performs `minimum` operation in column: {c}"),
    },
    OperatorDescription {
        suffix: "max",
        is_aggregator: true,
        takes_value: false,
        describe: |c| format!("Performs `maximum` operation in column: {c}"),
    },
    OperatorDescription {
        suffix: "sum",
        is_aggregator: true,
        takes_value: false,
        describe: |c| format!("Performs `sum` operation in column: {c}"),
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_columns_only_support_null_checks() {
        assert_eq!(supported_kinds(ColumnType::Json), &["isnull", "isnotnull"]);
    }

    #[test]
    fn numeric_types_support_aggregation() {
        assert!(supported_kinds(ColumnType::Int).contains(&"avg"));
        assert!(!supported_kinds(ColumnType::Bool).contains(&"avg"));
    }

    #[test]
    fn swagger_scalar_defaults_to_string() {
        assert_eq!(swagger_scalar_type(ColumnType::Date), "string");
        assert_eq!(swagger_scalar_type(ColumnType::Int), "integer");
    }
}
