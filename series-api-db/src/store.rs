use async_trait::async_trait;
use log::{debug, error};
use serde::Serialize;
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;

use series_api_error::{ApiError, Result};
use series_api_query::{
    BuiltQuery, QueryParam, SeriesRow, Statistics, TableName, TableSummary, build_summary_query,
};

use crate::pool::{DatabasePool, PoolStatus};
use crate::sql::SELECT_SERIES_TABLES;

/// 시계열 조회 저장소
#[async_trait]
pub trait SeriesStore: Send + Sync {
    /// 데이터 행 조회
    async fn fetch_rows(&self, query: &BuiltQuery) -> Result<Vec<SeriesRow>>;

    /// 통계 행 조회
    async fn fetch_statistics(&self, query: &BuiltQuery) -> Result<Statistics>;

    /// 테이블 개요 조회
    async fn table_summary(&self, table: &TableName) -> Result<TableSummary>;

    /// 스키마에서 조회 가능한 테이블 이름 탐색
    async fn list_tables(&self, schema: &str) -> Result<Vec<String>>;

    /// 연결 상태 확인
    async fn health(&self) -> Result<StoreHealth>;
}

/// 저장소 상태
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreHealth {
    pub database: &'static str,
    pub pool: PoolStatus,
}

#[async_trait]
impl SeriesStore for DatabasePool {
    async fn fetch_rows(&self, query: &BuiltQuery) -> Result<Vec<SeriesRow>> {
        let conn = self.get_connection().await?;
        debug!("데이터 쿼리 실행: {}", query.sql);

        let binds = bind(&query.params);
        let stmt = self.timed(conn.prepare_cached(&query.sql)).await?;
        let rows = self
            .timed(conn.query(&stmt, &binds))
            .await
            .inspect_err(|e| error!("데이터 쿼리 실패: {e}"))?;

        rows.iter().map(series_row).collect()
    }

    async fn fetch_statistics(&self, query: &BuiltQuery) -> Result<Statistics> {
        let conn = self.get_connection().await?;
        debug!("통계 쿼리 실행: {}", query.sql);

        let binds = bind(&query.params);
        let stmt = self.timed(conn.prepare_cached(&query.sql)).await?;
        let row = self
            .timed(conn.query_one(&stmt, &binds))
            .await
            .inspect_err(|e| error!("통계 쿼리 실패: {e}"))?;

        Ok(Statistics {
            count: row.try_get("count")?,
            min_value: row.try_get("min_value")?,
            max_value: row.try_get("max_value")?,
            avg_value: row.try_get("avg_value")?,
        })
    }

    async fn table_summary(&self, table: &TableName) -> Result<TableSummary> {
        let conn = self.get_connection().await?;
        let sql = build_summary_query(table);
        debug!("개요 쿼리 실행: {sql}");

        let row = self
            .timed(conn.query_one(sql.as_str(), &[]))
            .await
            .inspect_err(|e| error!("개요 쿼리 실패: {e}"))?;

        Ok(TableSummary {
            table: table.to_string(),
            total_rows: row.try_get("total_rows")?,
            unique_indices: row.try_get("unique_indices")?,
            min_date: row.try_get("min_date")?,
            max_date: row.try_get("max_date")?,
        })
    }

    async fn list_tables(&self, schema: &str) -> Result<Vec<String>> {
        let conn = self.get_connection().await?;
        let stmt = self.timed(conn.prepare_cached(SELECT_SERIES_TABLES)).await?;
        let rows = self
            .timed(conn.query(&stmt, &[&schema]))
            .await
            .inspect_err(|e| error!("테이블 탐색 실패: {e}"))?;

        rows.iter()
            .map(|row| row.try_get::<_, String>(0).map_err(ApiError::from))
            .collect()
    }

    async fn health(&self) -> Result<StoreHealth> {
        self.ping().await?;
        Ok(StoreHealth {
            database: "up",
            pool: self.pool_status(),
        })
    }
}

/// 바인딩 값을 드라이버 파라미터로 변환
fn bind(params: &[QueryParam]) -> Vec<&(dyn ToSql + Sync)> {
    params.iter().map(as_sql).collect()
}

fn as_sql(param: &QueryParam) -> &(dyn ToSql + Sync) {
    match param {
        QueryParam::Text(v) => v,
        QueryParam::Date(v) => v,
        QueryParam::Time(v) => v,
        QueryParam::Float(v) => v,
    }
}

/// 결과 행 변환
fn series_row(row: &Row) -> Result<SeriesRow> {
    Ok(SeriesRow {
        index: row.try_get("index")?,
        date: row.try_get("date")?,
        time: row.try_get("time")?,
        value: row.try_get("value")?,
    })
}
