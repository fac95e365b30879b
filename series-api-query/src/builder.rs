use chrono::{NaiveDate, NaiveTime};

use crate::function::AggregateFunction;
use crate::params::{QueryParams, RangeParams, SearchParams};
use crate::table::TableName;

/// 키 컬럼 프로젝션 (컬럼 타입과 무관하게 text)
const KEY_COLUMNS: &str = "\"index\"::text AS \"index\", date::text AS date, time::text AS time";

/// 날짜 조건 ($1 바인딩)
const DATE_FILTER: &str = "WHERE date::text = $1";

const GROUP_BY: &str = "GROUP BY \"index\", date, time";

/// 원본 컬럼 타입 기준 정렬 (별칭 src 로 한정)
const ORDER_BY: &str = "ORDER BY src.date, src.time, src.\"index\"";

/// 빈 문자열은 NULL 로 보는 숫자 값
const NUMERIC_VALUE: &str = "NULLIF(TRIM(value::text), '')::numeric";

/// 검색 값 비교 허용 오차
const VALUE_TOLERANCE: &str = "1e-6";

/// 쿼리 바인딩 값
#[derive(Debug, Clone, PartialEq)]
pub enum QueryParam {
    Text(String),
    Date(NaiveDate),
    Time(NaiveTime),
    Float(f64),
}

/// 실행 가능한 쿼리와 바인딩 값 ($1, $2, ... 순서)
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltQuery {
    pub sql: String,
    pub params: Vec<QueryParam>,
    pub function: AggregateFunction,
}

impl BuiltQuery {
    fn raw(sql: String, params: Vec<QueryParam>) -> Self {
        Self {
            sql,
            params,
            function: AggregateFunction::Raw,
        }
    }
}

fn select_rows(table: &TableName, function: AggregateFunction) -> String {
    format!(
        "SELECT {KEY_COLUMNS}, {} AS value FROM {} AS src",
        function.value_expression(),
        table.quoted(),
    )
}

/// 데이터 행 쿼리 생성
pub fn build_row_query(table: &TableName, params: &QueryParams) -> BuiltQuery {
    let mut sql = format!("{} {DATE_FILTER}", select_rows(table, params.function));

    if params.function.is_grouped() {
        sql.push(' ');
        sql.push_str(GROUP_BY);
    }

    sql.push(' ');
    sql.push_str(ORDER_BY);

    BuiltQuery {
        sql,
        params: vec![QueryParam::Text(params.date.clone())],
        function: params.function,
    }
}

/// 통계 쿼리 생성 (function 과 무관하게 전체 행 대상)
pub fn build_statistics_query(table: &TableName, params: &QueryParams) -> BuiltQuery {
    let sql = format!(
        "SELECT COUNT(*) AS count, \
         MIN({NUMERIC_VALUE})::float8 AS min_value, \
         MAX({NUMERIC_VALUE})::float8 AS max_value, \
         AVG({NUMERIC_VALUE})::float8 AS avg_value \
         FROM {} {DATE_FILTER}",
        table.quoted(),
    );

    BuiltQuery {
        sql,
        params: vec![QueryParam::Text(params.date.clone())],
        function: params.function,
    }
}

/// 기간 조회 쿼리 생성 (양 끝 날짜 포함)
pub fn build_range_query(table: &TableName, params: &RangeParams) -> BuiltQuery {
    let sql = format!(
        "{} WHERE date::date BETWEEN $1 AND $2 {ORDER_BY}",
        select_rows(table, AggregateFunction::Raw),
    );

    BuiltQuery::raw(
        sql,
        vec![QueryParam::Date(params.start), QueryParam::Date(params.end)],
    )
}

/// 검색 쿼리 생성. 조건이 없으면 전체 행
pub fn build_search_query(table: &TableName, params: &SearchParams) -> BuiltQuery {
    let mut conditions = Vec::new();
    let mut binds = Vec::new();

    if let Some(index) = &params.index {
        binds.push(QueryParam::Text(index.clone()));
        conditions.push(format!("\"index\"::text = ${}", binds.len()));
    }
    if let Some(date) = params.date {
        binds.push(QueryParam::Date(date));
        conditions.push(format!("date::date = ${}", binds.len()));
    }
    if let Some(time) = params.time {
        binds.push(QueryParam::Time(time));
        conditions.push(format!("time::time = ${}", binds.len()));
    }
    if let Some(value) = params.value {
        binds.push(QueryParam::Float(value));
        conditions.push(format!(
            "ABS({NUMERIC_VALUE}::float8 - ${}) < {VALUE_TOLERANCE}",
            binds.len()
        ));
    }

    let filter = if conditions.is_empty() {
        "TRUE".to_string()
    } else {
        conditions.join(" AND ")
    };

    let sql = format!(
        "{} WHERE {filter} {ORDER_BY}",
        select_rows(table, AggregateFunction::Raw),
    );

    BuiltQuery::raw(sql, binds)
}

/// 테이블 개요 쿼리 생성 (빈 날짜 제외)
pub fn build_summary_query(table: &TableName) -> String {
    format!(
        "SELECT COUNT(*) AS total_rows, \
         COUNT(DISTINCT \"index\") AS unique_indices, \
         MIN(NULLIF(date::text, '')) AS min_date, \
         MAX(NULLIF(date::text, '')) AS max_date \
         FROM {}",
        table.quoted(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(function: AggregateFunction) -> QueryParams {
        QueryParams {
            table: "sensor1".to_string(),
            date: "2024-01-01".to_string(),
            function,
        }
    }

    fn table() -> TableName {
        TableName::parse("sensor1").unwrap()
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn raw_query_is_ordered_and_ungrouped() {
        let query = build_row_query(&table(), &params(AggregateFunction::Raw));
        assert_eq!(
            query.sql,
            "SELECT \"index\"::text AS \"index\", date::text AS date, time::text AS time, \
             NULLIF(TRIM(value::text), '')::numeric::float8 AS value FROM \"sensor1\" AS src WHERE date::text = $1 \
             ORDER BY src.date, src.time, src.\"index\""
        );
        assert_eq!(query.params, vec![QueryParam::Text("2024-01-01".to_string())]);
    }

    #[test]
    fn key_columns_are_projected_as_text() {
        let query = build_row_query(&table(), &params(AggregateFunction::Raw));
        assert!(!query.sql.contains("bigint"));
        assert!(query.sql.contains("\"index\"::text AS \"index\""));
    }

    #[test]
    fn aggregate_queries_group_before_ordering() {
        for function in [
            AggregateFunction::Average,
            AggregateFunction::Min,
            AggregateFunction::Max,
            AggregateFunction::Sum,
        ] {
            let query = build_row_query(&table(), &params(function));
            assert!(query.sql.contains(function.value_expression()));
            assert!(query.sql.ends_with(
                "WHERE date::text = $1 GROUP BY \"index\", date, time \
                 ORDER BY src.date, src.time, src.\"index\""
            ));
        }
    }

    #[test]
    fn date_is_never_inlined() {
        let mut p = params(AggregateFunction::Sum);
        p.date = "2024-01-01' OR '1'='1".to_string();
        let query = build_row_query(&table(), &p);
        assert!(!query.sql.contains("2024-01-01"));
        assert_eq!(query.params, vec![QueryParam::Text(p.date.clone())]);
    }

    #[test]
    fn statistics_query_ignores_function() {
        let raw = build_statistics_query(&table(), &params(AggregateFunction::Raw));
        let max = build_statistics_query(&table(), &params(AggregateFunction::Max));
        assert_eq!(raw.sql, max.sql);
        assert!(raw.sql.starts_with("SELECT COUNT(*) AS count"));
        assert!(raw.sql.ends_with("FROM \"sensor1\" WHERE date::text = $1"));
        assert!(!raw.sql.contains("GROUP BY"));
    }

    #[test]
    fn range_query_binds_both_dates() {
        let query = build_range_query(
            &table(),
            &RangeParams {
                table: "sensor1".to_string(),
                start: day(1),
                end: day(3),
            },
        );
        assert!(query.sql.contains("WHERE date::date BETWEEN $1 AND $2 ORDER BY"));
        assert!(!query.sql.contains("GROUP BY"));
        assert_eq!(
            query.params,
            vec![QueryParam::Date(day(1)), QueryParam::Date(day(3))]
        );
        assert_eq!(query.function, AggregateFunction::Raw);
    }

    #[test]
    fn search_query_numbers_only_present_conditions() {
        let query = build_search_query(
            &table(),
            &SearchParams {
                table: "sensor1".to_string(),
                index: None,
                date: Some(day(2)),
                time: None,
                value: Some(1.5),
            },
        );
        assert!(query.sql.contains(
            "WHERE date::date = $1 \
             AND ABS(NULLIF(TRIM(value::text), '')::numeric::float8 - $2) < 1e-6 ORDER BY"
        ));
        assert_eq!(
            query.params,
            vec![QueryParam::Date(day(2)), QueryParam::Float(1.5)]
        );
    }

    #[test]
    fn search_query_with_all_conditions() {
        let time = NaiveTime::from_hms_opt(12, 0, 0).unwrap();
        let query = build_search_query(
            &table(),
            &SearchParams {
                table: "sensor1".to_string(),
                index: Some("7".to_string()),
                date: Some(day(1)),
                time: Some(time),
                value: Some(2.0),
            },
        );
        assert!(query.sql.contains(
            "WHERE \"index\"::text = $1 AND date::date = $2 AND time::time = $3 \
             AND ABS(NULLIF(TRIM(value::text), '')::numeric::float8 - $4) < 1e-6"
        ));
        assert_eq!(query.params.len(), 4);
        assert_eq!(query.params[0], QueryParam::Text("7".to_string()));
        assert_eq!(query.params[2], QueryParam::Time(time));
    }

    #[test]
    fn search_without_conditions_matches_everything() {
        let query = build_search_query(
            &table(),
            &SearchParams {
                table: "sensor1".to_string(),
                index: None,
                date: None,
                time: None,
                value: None,
            },
        );
        assert!(query.sql.contains("FROM \"sensor1\" AS src WHERE TRUE ORDER BY"));
        assert!(query.params.is_empty());
    }

    #[test]
    fn summary_query_targets_quoted_table() {
        let sql = build_summary_query(&table());
        assert!(sql.ends_with("FROM \"sensor1\""));
        assert!(sql.contains("COUNT(DISTINCT \"index\")"));
    }
}
