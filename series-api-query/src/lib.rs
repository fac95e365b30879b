pub mod builder;
pub mod function;
pub mod model;
pub mod params;
pub mod table;

pub use builder::{
    BuiltQuery, QueryParam, build_range_query, build_row_query, build_search_query,
    build_statistics_query, build_summary_query,
};
pub use function::AggregateFunction;
pub use model::{
    Metadata, QueryOutcome, RangeOutcome, SearchOutcome, SeriesRow, Statistics, TableSummary,
};
pub use params::{
    QueryParams, RangeParams, SearchParams, parse_query_string, sanitize, validate_params,
    validate_range_params, validate_search_params,
};
pub use table::TableName;
