use std::error::Error as StdError;
use std::fmt;
use std::io;
use std::net::AddrParseError;
use std::sync::PoisonError;
use tokio::time::error::Elapsed;
use deadpool_postgres::PoolError;
use serde_yml::Error as YmlError;
use tokio_postgres::Error as PgError;

/// 조회 서비스의 모든 에러 타입을 정의합니다.
#[derive(Debug)]
pub enum ApiError {
    /// 필수 파라미터 누락 (파라미터 이름)
    MissingParameter(String),

    /// 알 수 없는 집계 함수 (strict 모드에서만 발생)
    UnknownFunction(String),

    /// 형식이 잘못된 파라미터 (파라미터 이름, 사유)
    InvalidParameter(String, String),

    /// 허용 목록에 없는 테이블
    UnknownTable(String),

    /// 데이터베이스 연결 에러
    Connection(String),

    /// 쿼리 준비/실행 에러
    Query(String),

    /// 타임아웃 에러
    Timeout(String),

    /// 설정 관련 에러
    Config(String),

    /// 네트워크 입출력 에러
    Io(io::Error),

    /// 내부 상태 관련 에러
    Internal(String),

    /// 기타 에러
    Other(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::MissingParameter(key) => {
                write!(f, "Parameter '{}' is missing or empty", key)
            }
            ApiError::UnknownFunction(key) => write!(f, "Unknown aggregation function '{}'", key),
            ApiError::InvalidParameter(key, reason) => {
                write!(f, "Parameter '{}' is invalid: {}", key, reason)
            }
            ApiError::UnknownTable(name) => write!(f, "Unknown table '{}'", name),
            ApiError::Connection(msg) => write!(f, "connection error: {}", msg),
            ApiError::Query(msg) => write!(f, "query error: {}", msg),
            ApiError::Timeout(msg) => write!(f, "timeout: {}", msg),
            ApiError::Config(msg) => write!(f, "config error: {}", msg),
            ApiError::Io(err) => write!(f, "I/O error: {}", err),
            ApiError::Internal(msg) => write!(f, "internal error: {}", msg),
            ApiError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl StdError for ApiError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            ApiError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl ApiError {
    /// 응답 봉투의 `error` 필드에 들어갈 요약 메시지
    pub fn summary(&self) -> String {
        match self {
            ApiError::MissingParameter(_)
            | ApiError::UnknownFunction(_)
            | ApiError::InvalidParameter(..)
            | ApiError::UnknownTable(_) => self.to_string(),
            ApiError::Connection(_) => "Database connection failed".to_string(),
            _ => "Processing error".to_string(),
        }
    }

    /// 응답 봉투의 `details` 필드. 검증 에러는 하위 원인이 없으므로 None
    pub fn details(&self) -> Option<String> {
        match self {
            ApiError::MissingParameter(_)
            | ApiError::UnknownFunction(_)
            | ApiError::InvalidParameter(..)
            | ApiError::UnknownTable(_) => None,
            ApiError::Connection(msg)
            | ApiError::Query(msg)
            | ApiError::Timeout(msg)
            | ApiError::Config(msg)
            | ApiError::Internal(msg)
            | ApiError::Other(msg) => Some(msg.clone()),
            ApiError::Io(err) => Some(err.to_string()),
        }
    }

    /// 요청 검증 단계에서 발생한 에러인지 여부
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ApiError::MissingParameter(_)
                | ApiError::UnknownFunction(_)
                | ApiError::InvalidParameter(..)
                | ApiError::UnknownTable(_)
        )
    }
}

/// Result 타입 별칭 정의
pub type Result<T> = std::result::Result<T, ApiError>;

/// From 트레이트 구현으로 다양한 에러 타입을 ApiError로 변환
impl From<io::Error> for ApiError {
    fn from(err: io::Error) -> Self {
        ApiError::Io(err)
    }
}

impl From<AddrParseError> for ApiError {
    fn from(err: AddrParseError) -> Self {
        ApiError::Config(format!("주소 파싱 에러: {}", err))
    }
}

impl From<PoolError> for ApiError {
    fn from(err: PoolError) -> Self {
        ApiError::Connection(format!("{}", err))
    }
}

impl From<PgError> for ApiError {
    fn from(err: PgError) -> Self {
        // 끊어진 연결은 쿼리 에러가 아니라 연결 에러로 분류
        if err.is_closed() {
            ApiError::Connection(pg_message(&err))
        } else {
            ApiError::Query(pg_message(&err))
        }
    }
}

impl From<Elapsed> for ApiError {
    fn from(err: Elapsed) -> Self {
        ApiError::Timeout(format!("쿼리 실행 타임아웃: {}", err))
    }
}

impl<T> From<PoisonError<T>> for ApiError {
    fn from(err: PoisonError<T>) -> Self {
        ApiError::Internal(format!("락 포이즌 에러: {}", err))
    }
}

impl From<String> for ApiError {
    fn from(err: String) -> Self {
        ApiError::Other(err)
    }
}

impl From<&str> for ApiError {
    fn from(err: &str) -> Self {
        ApiError::Other(err.to_string())
    }
}

impl From<YmlError> for ApiError {
    fn from(err: YmlError) -> Self {
        ApiError::Config(format!("YAML 파싱 에러: {}", err))
    }
}

/// PostgreSQL 에러 본문. 서버 에러는 message/detail/hint, 그 외는 source 체인
pub fn pg_message(err: &PgError) -> String {
    match err.as_db_error() {
        Some(db) => {
            let mut msg = db.message().to_string();
            if let Some(detail) = db.detail() {
                msg.push_str(": ");
                msg.push_str(detail);
            }
            if let Some(hint) = db.hint() {
                msg.push_str(" (hint: ");
                msg.push_str(hint);
                msg.push(')');
            }
            msg
        }
        None => error_chain(err),
    }
}

/// 에러와 source 체인을 ": " 로 연결
pub fn error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut msg = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !msg.ends_with(&text) {
            msg.push_str(": ");
            msg.push_str(&text);
        }
        source = cause.source();
    }
    msg
}

/// 에러 처리 유틸리티 함수
pub fn config_err<E: fmt::Display>(err: E) -> ApiError {
    ApiError::Config(format!("{}", err))
}

pub fn conn_err<E: fmt::Display>(err: E) -> ApiError {
    ApiError::Connection(format!("{}", err))
}

pub fn query_err<E: fmt::Display>(err: E) -> ApiError {
    ApiError::Query(format!("{}", err))
}
