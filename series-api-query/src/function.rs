use std::fmt;

use serde::Serialize;

/// 값 컬럼에 적용되는 집계 함수
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregateFunction {
    #[default]
    Raw,
    Average,
    Min,
    Max,
    Sum,
}

impl AggregateFunction {
    pub const ALL: [AggregateFunction; 5] = [
        AggregateFunction::Raw,
        AggregateFunction::Average,
        AggregateFunction::Min,
        AggregateFunction::Max,
        AggregateFunction::Sum,
    ];

    /// 요청 파라미터 키로 조회
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.key() == key)
    }

    /// 요청 파라미터 키
    pub const fn key(self) -> &'static str {
        match self {
            AggregateFunction::Raw => "raw",
            AggregateFunction::Average => "average",
            AggregateFunction::Min => "min",
            AggregateFunction::Max => "max",
            AggregateFunction::Sum => "sum",
        }
    }

    /// `value` 컬럼 프로젝션
    pub const fn value_expression(self) -> &'static str {
        match self {
            AggregateFunction::Raw => "NULLIF(TRIM(value::text), '')::numeric::float8",
            AggregateFunction::Average => "AVG(NULLIF(TRIM(value::text), '')::numeric)::float8",
            AggregateFunction::Min => "MIN(NULLIF(TRIM(value::text), '')::numeric)::float8",
            AggregateFunction::Max => "MAX(NULLIF(TRIM(value::text), '')::numeric)::float8",
            AggregateFunction::Sum => "SUM(NULLIF(TRIM(value::text), '')::numeric)::float8",
        }
    }

    /// (index, date, time) 그룹핑 여부
    pub const fn is_grouped(self) -> bool {
        !matches!(self, AggregateFunction::Raw)
    }
}

impl fmt::Display for AggregateFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}
