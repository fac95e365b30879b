use std::collections::HashMap;

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Method, Request, Response, StatusCode};
use log::{debug, error, info};

use series_api_error::{ApiError, Result};
use series_api_query::{
    Metadata, QueryOutcome, RangeOutcome, SearchOutcome, TableName, TableSummary,
    build_range_query, build_row_query, build_search_query, build_statistics_query,
    parse_query_string, sanitize, validate_params, validate_range_params,
    validate_search_params,
};

use crate::http::{data_response, envelope_response, error_response, success_response};
use crate::state::AppState;

/// 조회 요청 핸들러 (본문은 사용하지 않음)
pub async fn query_handler<B>(req: Request<B>, state: AppState) -> Result<Response<Full<Bytes>>> {
    debug!("incoming: {} {}", req.method(), req.uri());

    if req.method() != Method::GET {
        return Ok(envelope_response(
            StatusCode::METHOD_NOT_ALLOWED,
            "Method not allowed",
            Some(req.method().as_str()),
        ));
    }

    let path = req.uri().path().to_string();
    let params = parse_query_string(req.uri().query().unwrap_or(""));
    drop(req);

    let response = match path.as_str() {
        "/" | "/data" => respond(handle_data(&params, &state).await, |o| success_response(o)),
        "/range" => respond(handle_range(&params, &state).await, |o| success_response(o)),
        "/search" => respond(handle_search(&params, &state).await, |o| success_response(o)),
        "/tables" => respond(handle_tables(&state).await, |tables| data_response(tables)),
        "/summary" => respond(handle_summary(&params, &state).await, |s| data_response(s)),
        "/health" => respond(state.store.health().await, |h| data_response(h)),
        path => {
            debug!("알 수 없는 경로: {path}");
            envelope_response(StatusCode::NOT_FOUND, "Not found", Some(path))
        }
    };

    Ok(response)
}

/// 결과를 응답으로 변환 (실패는 500 에러 봉투)
fn respond<T, F>(result: Result<T>, on_success: F) -> Response<Full<Bytes>>
where
    F: FnOnce(&T) -> Response<Full<Bytes>>,
{
    match result {
        Ok(value) => on_success(&value),
        Err(e) => {
            if e.is_validation() {
                info!("요청 거부: {e}");
            } else {
                error!("요청 처리 실패: {e}");
            }
            error_response(&e)
        }
    }
}

/// 허용 목록 조회 (미등록이면 재탐색 후 재시도)
async fn resolve(name: &str, state: &AppState) -> Result<TableName> {
    state
        .registry
        .resolve_or_refresh(name, &state.config, state.store.as_ref())
        .await
}

/// 검증 → 허용 목록 → 데이터 쿼리 → 통계 쿼리
async fn handle_data(params: &HashMap<String, String>, state: &AppState) -> Result<QueryOutcome> {
    let params = validate_params(params, state.config.strict_function)?;
    let table = resolve(&params.table, state).await?;

    let row_query = build_row_query(&table, &params);
    let stats_query = build_statistics_query(&table, &params);

    let data = state.store.fetch_rows(&row_query).await?;
    let statistics = state.store.fetch_statistics(&stats_query).await?;

    debug!(
        "조회 완료: table={}, date={}, function={}, rows={}",
        params.table,
        params.date,
        params.function,
        data.len()
    );

    Ok(QueryOutcome {
        data,
        statistics,
        metadata: Metadata::from(&params),
    })
}

/// 기간 조회 (차트용 원본 행)
async fn handle_range(params: &HashMap<String, String>, state: &AppState) -> Result<RangeOutcome> {
    let params = validate_range_params(params)?;
    let table = resolve(&params.table, state).await?;

    let data = state
        .store
        .fetch_rows(&build_range_query(&table, &params))
        .await?;
    debug!(
        "기간 조회 완료: table={}, {}..={}, rows={}",
        params.table,
        params.start,
        params.end,
        data.len()
    );

    Ok(RangeOutcome {
        data,
        metadata: params,
    })
}

/// 데이터 포인트 검색
async fn handle_search(
    params: &HashMap<String, String>,
    state: &AppState,
) -> Result<SearchOutcome> {
    let params = validate_search_params(params)?;
    let table = resolve(&params.table, state).await?;

    let data = state
        .store
        .fetch_rows(&build_search_query(&table, &params))
        .await?;
    debug!("검색 완료: table={}, rows={}", params.table, data.len());

    Ok(SearchOutcome {
        data,
        metadata: params,
    })
}

/// 테이블 목록 (재탐색 간격이 지났으면 먼저 갱신)
async fn handle_tables(state: &AppState) -> Result<Vec<String>> {
    state
        .registry
        .refresh_if_due(&state.config, state.store.as_ref())
        .await;
    state.registry.tables()
}

/// 테이블 개요
async fn handle_summary(
    params: &HashMap<String, String>,
    state: &AppState,
) -> Result<TableSummary> {
    let name = params
        .get("table")
        .map(|v| sanitize(v))
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::MissingParameter("table".to_string()))?;
    let table = resolve(&name, state).await?;
    state.store.table_summary(&table).await
}
