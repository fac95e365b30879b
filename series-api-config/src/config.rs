use std::fs::File;
use std::io::Read;
use std::net::{IpAddr, SocketAddr};
use std::path::Path;

use serde::{Deserialize, Serialize};

use series_api_error::{Result, config_err};

/// 조회 서버 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub bind_host: String,
    pub bind_port: u16,
    pub worker_threads: Option<usize>,
    /// 알 수 없는 function 값을 raw 로 대체하지 않고 거부
    pub strict_function: bool,
    /// 조회 허용 테이블 목록
    pub allowed_tables: Vec<String>,
    /// 시작 시 스키마에서 조회 가능한 테이블 탐색
    pub discover_tables: bool,
    pub discovery_schema: String,
    /// 허용 목록에 없는 테이블 요청 시 재탐색 최소 간격
    pub discovery_refresh_seconds: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    /// 기본설정으로 생성
    #[must_use]
    pub fn new() -> Self {
        Self {
            bind_host: "0.0.0.0".to_string(),
            bind_port: 8080,
            worker_threads: None,
            strict_function: false,
            allowed_tables: Vec::new(),
            discover_tables: true,
            discovery_schema: "public".to_string(),
            discovery_refresh_seconds: 30,
        }
    }

    /// 설정파일에서 설정 로드
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        let config = serde_yml::from_str(&contents)?;

        Ok(config)
    }

    /// 환경변수로 바인딩 주소 덮어쓰기
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("SERIES_API_BIND_HOST") {
            self.bind_host = host;
        }
        if let Some(port) = lookup("SERIES_API_BIND_PORT") {
            self.bind_port = port
                .parse()
                .map_err(|e| config_err(format!("SERIES_API_BIND_PORT 파싱 실패: {e}")))?;
        }
        Ok(())
    }

    /// 바인딩 주소 (bind_host 는 IP 리터럴)
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self.bind_host.parse()?;
        Ok(SocketAddr::new(ip, self.bind_port))
    }

    /// 런타임 생성 전 설정값 검증
    pub fn validate(&self) -> Result<()> {
        if self.worker_threads == Some(0) {
            return Err(config_err("worker_threads 는 1 이상이어야 함"));
        }
        self.bind_addr()?;
        Ok(())
    }
}
