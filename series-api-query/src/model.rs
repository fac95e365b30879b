use serde::Serialize;

use crate::function::AggregateFunction;
use crate::params::{QueryParams, RangeParams, SearchParams};

/// 조회 결과 행 (키 컬럼은 text 로 투영, 빈 셀은 null)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesRow {
    pub index: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub value: Option<f64>,
}

/// 날짜 필터 전체에 대한 통계
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Statistics {
    pub count: i64,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
    pub avg_value: Option<f64>,
}

/// 테이블 개요
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableSummary {
    pub table: String,
    pub total_rows: i64,
    pub unique_indices: i64,
    pub min_date: Option<String>,
    pub max_date: Option<String>,
}

/// 응답 메타데이터 (정규화된 파라미터)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Metadata {
    pub table: String,
    pub date: String,
    pub function: AggregateFunction,
}

impl From<&QueryParams> for Metadata {
    fn from(params: &QueryParams) -> Self {
        Self {
            table: params.table.clone(),
            date: params.date.clone(),
            function: params.function,
        }
    }
}

/// 한 요청의 조회 결과
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryOutcome {
    pub data: Vec<SeriesRow>,
    pub statistics: Statistics,
    pub metadata: Metadata,
}

/// 기간 조회 결과
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RangeOutcome {
    pub data: Vec<SeriesRow>,
    pub metadata: RangeParams,
}

/// 데이터 포인트 검색 결과
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchOutcome {
    pub data: Vec<SeriesRow>,
    pub metadata: SearchParams,
}
