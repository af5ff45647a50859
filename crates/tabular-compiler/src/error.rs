use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CompileError {
    #[error("argument '{0}' could not be parsed")]
    Malformed(String),

    #[error("Aggregation parameters `{operators}` are not allowed for resource '{resource_id}'")]
    AggregationNotAllowed {
        resource_id: String,
        operators: String,
    },

    #[error("{column} is not among the allowed columns: {allowed}")]
    ColumnNotAllowed { column: String, allowed: String },

    #[error("the argument `columns` cannot be set alongside aggregators")]
    ColumnsWithAggregators,
}
