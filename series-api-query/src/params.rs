use std::collections::HashMap;

use chrono::{NaiveDate, NaiveTime};
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use series_api_error::{ApiError, Result};

use crate::function::AggregateFunction;

static MARKUP_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>?").expect("valid tag regex"));

/// 필수 파라미터 (검사 순서 유지)
const REQUIRED: [&str; 2] = ["table", "date"];

/// 검증 및 기본값 적용이 끝난 요청 파라미터
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryParams {
    pub table: String,
    pub date: String,
    pub function: AggregateFunction,
}

/// 기간 조회 파라미터 (양 끝 포함)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RangeParams {
    pub table: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// 데이터 포인트 검색 조건. 비어 있는 조건은 무시
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchParams {
    pub table: String,
    pub index: Option<String>,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub value: Option<f64>,
}

/// 쿼리스트링 디코딩 (중복 키는 첫 값 사용)
pub fn parse_query_string(query: &str) -> HashMap<String, String> {
    let mut params = HashMap::new();
    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        params
            .entry(key.into_owned())
            .or_insert_with(|| value.into_owned());
    }
    params
}

/// 자유 입력 정리: 태그, 제어문자, 따옴표류 제거 후 trim
pub fn sanitize(input: &str) -> String {
    let stripped = MARKUP_TAG.replace_all(input, "");
    stripped
        .chars()
        .filter(|c| !c.is_control() && !matches!(c, '\'' | '"' | '`'))
        .collect::<String>()
        .trim()
        .to_string()
}

fn required(params: &HashMap<String, String>, key: &str) -> Result<String> {
    params
        .get(key)
        .map(|v| sanitize(v))
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::MissingParameter(key.to_string()))
}

fn optional(params: &HashMap<String, String>, key: &str) -> Option<String> {
    params
        .get(key)
        .map(|v| sanitize(v))
        .filter(|v| !v.is_empty())
}

fn invalid(key: &str, reason: &str) -> ApiError {
    ApiError::InvalidParameter(key.to_string(), reason.to_string())
}

fn parse_date(key: &str, value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| invalid(key, "expected YYYY-MM-DD"))
}

/// HH:MM 은 HH:MM:00 으로 취급
fn parse_time(key: &str, value: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .map_err(|_| invalid(key, "expected HH:MM:SS or HH:MM"))
}

/// 소수점 6자리로 반올림한 유한 실수
fn parse_value(key: &str, value: &str) -> Result<f64> {
    match value.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok((v * 1e6).round() / 1e6),
        _ => Err(invalid(key, "expected a number")),
    }
}

/// 필수 파라미터 검증 후 정규화
pub fn validate_params(
    params: &HashMap<String, String>,
    strict_function: bool,
) -> Result<QueryParams> {
    let [table, date] = REQUIRED;
    let table = required(params, table)?;
    let date = required(params, date)?;

    let function = match params.get("function").map(|v| sanitize(v)) {
        None => AggregateFunction::Raw,
        Some(key) if key.is_empty() => AggregateFunction::Raw,
        Some(key) => match AggregateFunction::from_key(&key) {
            Some(function) => function,
            None if strict_function => return Err(ApiError::UnknownFunction(key)),
            None => {
                debug!("알 수 없는 function '{key}', raw 로 대체");
                AggregateFunction::Raw
            }
        },
    };

    Ok(QueryParams {
        table,
        date,
        function,
    })
}

/// 기간 조회 파라미터 검증
pub fn validate_range_params(params: &HashMap<String, String>) -> Result<RangeParams> {
    let table = required(params, "table")?;
    let start = parse_date("start", &required(params, "start")?)?;
    let end = parse_date("end", &required(params, "end")?)?;

    if end < start {
        return Err(invalid("end", "must not be before start"));
    }

    Ok(RangeParams { table, start, end })
}

/// 검색 파라미터 검증 (table 외 조건은 모두 선택)
pub fn validate_search_params(params: &HashMap<String, String>) -> Result<SearchParams> {
    let table = required(params, "table")?;
    let index = optional(params, "index");
    let date = optional(params, "date")
        .map(|v| parse_date("date", &v))
        .transpose()?;
    let time = optional(params, "time")
        .map(|v| parse_time("time", &v))
        .transpose()?;
    let value = optional(params, "value")
        .map(|v| parse_value("value", &v))
        .transpose()?;

    Ok(SearchParams {
        table,
        index,
        date,
        time,
        value,
    })
}
