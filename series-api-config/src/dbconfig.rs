use std::path::Path;
use std::fs::File;
use std::io::Read;

use serde::{Deserialize, Serialize};

use series_api_error::{Result, config_err};

/// 데이터베이스 설정
#[derive(Default, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DbConfig {
    /// 데이터베이스 연결 설정
    pub connection: ConnectionConfig,
    /// 연결 풀 설정
    pub pool: PoolConfig,
}

impl DbConfig {
    /// 설정파일에서 db 설정 로드
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        let config: DbConfig = serde_yml::from_str(&contents)?;

        Ok(config)
    }

    /// 환경변수로 연결정보 덮어쓰기 (자격증명은 파일보다 환경변수 우선)
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let conn = &mut self.connection;
        if let Some(host) = lookup("SERIES_DB_HOST") {
            conn.host = host;
        }
        if let Some(port) = lookup("SERIES_DB_PORT") {
            conn.port = port
                .parse()
                .map_err(|e| config_err(format!("SERIES_DB_PORT 파싱 실패: {e}")))?;
        }
        if let Some(database) = lookup("SERIES_DB_NAME") {
            conn.database = database;
        }
        if let Some(user) = lookup("SERIES_DB_USER") {
            conn.user = user;
        }
        if let Some(password) = lookup("SERIES_DB_PASSWORD") {
            conn.password = password;
        }
        if let Some(sslmode) = lookup("SERIES_DB_SSLMODE") {
            conn.sslmode = sslmode;
        }
        Ok(())
    }
}

/// db 연결설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: String,
    pub sslmode: String,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            database: "examdb".to_string(),
            user: "postgres".to_string(),
            password: String::new(),
            sslmode: "disable".to_string(),
        }
    }
}

/// 데이터베이스 연결 풀 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// 최대 연결 수
    pub max_connections: usize,
    /// 연결 타임아웃(초)
    pub connection_timeout_seconds: u64,
    /// 연결 재사용 전 대기 시간(초)
    pub recycle_seconds: u64,
    /// 쿼리 타임아웃(초), 0이면 드라이버 기본값
    pub query_timeout_seconds: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: 5,
            connection_timeout_seconds: 30,
            recycle_seconds: 1_800,    // 30분마다 연결 갱신
            query_timeout_seconds: 0,
        }
    }
}
