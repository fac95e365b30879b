use std::path::Path;

use log::{info, warn};

use series_api_error::{ApiError, Result};

use crate::config::Config;
use crate::dbconfig::DbConfig;

const SERVER_CONFIG_FILE: &str = "config.yml";
const DB_CONFIG_FILE: &str = "db.yml";

/// 통합 세팅 인스턴스
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub server: Config,
    pub database: DbConfig,
}

impl Settings {
    /// Setting 생성 (설정파일 + 환경변수)
    pub fn new() -> Result<Self> {
        let server = Self::load_server_config(SERVER_CONFIG_FILE)?;
        let database = Self::load_db_config(DB_CONFIG_FILE)?;
        Self::with_env(server, database, |key| std::env::var(key).ok())
    }

    /// 환경변수 덮어쓰기 후 검증
    fn with_env<F>(mut server: Config, mut database: DbConfig, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        server.apply_env(&env)?;
        database.apply_env(&env)?;
        server.validate()?;

        if database.connection.password.is_empty() {
            warn!("DB 비밀번호가 설정되지 않음 (SERIES_DB_PASSWORD 또는 db.yml)");
        }

        Ok(Self { server, database })
    }

    /// 서버 설정 로드
    fn load_server_config<P: AsRef<Path>>(path: P) -> Result<Config> {
        let path = path.as_ref();
        // yml 파일 유무 확인
        if path.exists() {
            info!("서버 설정파일 로드: {}", path.display());
            Config::from_file(path)
                .map_err(|e| ApiError::Config(format!("서버 설정파일 로드 실패: {}", e)))
        } else {
            // 기본설정사용
            info!("서버 기본설정 사용");
            Ok(Config::new())
        }
    }

    /// db 설정 로드
    fn load_db_config<P: AsRef<Path>>(path: P) -> Result<DbConfig> {
        let path = path.as_ref();
        // yml 파일 유무 확인
        if path.exists() {
            info!("DB 설정파일 로드: {}", path.display());
            DbConfig::from_file(path)
                .map_err(|e| ApiError::Config(format!("DB 설정파일 로드 실패: {}", e)))
        } else {
            // 기본설정사용
            info!("DB 기본설정 사용");
            Ok(DbConfig::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_files_fall_back_to_defaults() {
        let server = Settings::load_server_config("does-not-exist/config.yml").unwrap();
        let database = Settings::load_db_config("does-not-exist/db.yml").unwrap();
        assert_eq!(server.bind_port, 8080);
        assert_eq!(database.connection.host, "localhost");
    }

    #[test]
    fn unreadable_yaml_is_config_error() {
        let dir = std::env::temp_dir().join(format!("series-api-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.yml");
        std::fs::write(&path, "bind_port: [not, a, port]\n").unwrap();

        let err = Settings::load_server_config(&path).unwrap_err();
        assert!(matches!(err, ApiError::Config(_)));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn zero_worker_threads_fail_before_runtime_start() {
        let server: Config = serde_yml::from_str("worker_threads: 0\n").unwrap();
        let err = Settings::with_env(server, DbConfig::default(), |_| None).unwrap_err();
        assert!(matches!(err, ApiError::Config(_)));
    }

    #[test]
    fn env_overrides_are_validated() {
        let err = Settings::with_env(Config::new(), DbConfig::default(), |key| {
            (key == "SERIES_API_BIND_HOST").then(|| "example.com".to_string())
        })
        .unwrap_err();
        assert!(matches!(err, ApiError::Config(_)));

        let settings = Settings::with_env(Config::new(), DbConfig::default(), |key| {
            (key == "SERIES_DB_HOST").then(|| "db".to_string())
        })
        .unwrap();
        assert_eq!(settings.database.connection.host, "db");
    }
}
