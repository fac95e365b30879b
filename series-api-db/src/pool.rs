use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod, Runtime};
use log::{debug, info};
use serde::Serialize;
use tokio_postgres::{
    NoTls,
    config::{Config, SslMode},
};

use series_api_config::DbConfig;
use series_api_error::{ApiError, Result, conn_err};

/// 헬스체크 쿼리
const PING_QUERY: &str = "SELECT 1";

/// db 풀 인스턴스
#[derive(Clone)]
pub struct DatabasePool {
    pool: Arc<Pool>,
    query_timeout: Option<Duration>,
}

impl DatabasePool {
    /// db 풀 생성
    pub async fn new(dbconfig: &DbConfig) -> Result<Self> {
        info!("db 풀 초기화");

        // PostgreSQL 설정 생성
        let pg_config = Self::create_pg_config(dbconfig);

        // 연결 풀 생성
        let pool = Self::create_connection_pool(pg_config, dbconfig)?;

        let query_timeout = match dbconfig.pool.query_timeout_seconds {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };

        let db_pool = Self {
            pool: Arc::new(pool),
            query_timeout,
        };

        // 연결 테스트
        db_pool
            .ping()
            .await
            .map_err(|e| conn_err(format!("데이터베이스 연결 테스트 실패: {e}")))?;

        info!(
            "데이터베이스 연결 풀 초기화 완료 (최대 연결 수: {})",
            dbconfig.pool.max_connections
        );

        Ok(db_pool)
    }

    /// `PostgreSQL` 설정 생성
    fn create_pg_config(dbconfig: &DbConfig) -> Config {
        let ssl_mode = match dbconfig.connection.sslmode.to_lowercase().as_str() {
            "disable" => SslMode::Disable,
            "require" => SslMode::Require,
            _ => SslMode::Prefer,
        };

        let mut pg_config = Config::new();
        pg_config
            .host(dbconfig.connection.host.as_str())
            .port(dbconfig.connection.port)
            .dbname(dbconfig.connection.database.as_str())
            .user(dbconfig.connection.user.as_str())
            .password(dbconfig.connection.password.as_str())
            .ssl_mode(ssl_mode)
            .application_name("series-api")
            .connect_timeout(Duration::from_secs(
                dbconfig.pool.connection_timeout_seconds,
            ))
            .keepalives(true);

        pg_config
    }

    /// 연결 풀 생성
    fn create_connection_pool(pg_config: Config, dbconfig: &DbConfig) -> Result<Pool> {
        // 연결 풀 설정
        let mgr_config = ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        };
        let mgr = Manager::from_config(pg_config, NoTls, mgr_config);

        // 풀 빌더 설정
        Pool::builder(mgr)
            .max_size(dbconfig.pool.max_connections)
            .runtime(Runtime::Tokio1)
            .recycle_timeout(Some(Duration::from_secs(dbconfig.pool.recycle_seconds)))
            .build()
            .map_err(|e| conn_err(format!("db 풀 생성 실패: {e}")))
    }

    /// 연결 풀에서 연결 가져오기 (실패는 캐시하지 않음, 다음 호출 시 재연결)
    pub async fn get_connection(&self) -> Result<deadpool_postgres::Object> {
        self.pool
            .get()
            .await
            .map_err(|e| conn_err(format!("연결 풀에서 연결 가져오기 실패: {e}")))
    }

    /// 간단한 쿼리로 연결 확인
    pub async fn ping(&self) -> Result<()> {
        let conn = self.get_connection().await?;
        self.timed(conn.query_one(PING_QUERY, &[])).await?;
        debug!("데이터베이스 ping 성공");
        Ok(())
    }

    /// 설정된 쿼리 타임아웃 적용
    pub async fn timed<F, T, E>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = std::result::Result<T, E>>,
        E: Into<ApiError>,
    {
        match self.query_timeout {
            Some(limit) => tokio::time::timeout(limit, fut).await?.map_err(Into::into),
            None => fut.await.map_err(Into::into),
        }
    }

    /// 연결 풀 상태 정보
    pub fn pool_status(&self) -> PoolStatus {
        let status = self.pool.status();
        PoolStatus {
            size: status.size,
            available: status.available,
            waiting: status.waiting,
        }
    }

    /// 연결 풀 종료
    pub fn close(&self) {
        self.pool.close();
        info!("데이터베이스 연결 풀 종료");
    }
}

/// 연결 풀 상태 정보
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PoolStatus {
    pub size: usize,
    pub available: usize,
    pub waiting: usize,
}

/// 데이터베이스 풀 초기화 함수
pub async fn initialize_dbpool(config: &DbConfig) -> Result<DatabasePool> {
    DatabasePool::new(config).await
}
