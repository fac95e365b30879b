use std::collections::BTreeSet;
use std::sync::{Mutex, RwLock};
use std::time::{Duration, Instant};

use log::{debug, info, warn};

use series_api_config::Config;
use series_api_db::SeriesStore;
use series_api_error::{ApiError, Result};
use series_api_query::TableName;

/// 조회 허용 테이블 목록
pub struct TableRegistry {
    tables: RwLock<BTreeSet<TableName>>,
    /// 마지막 스키마 탐색 시각
    discovered_at: Mutex<Option<Instant>>,
}

impl Default for TableRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TableRegistry {
    /// 빈 `TableRegistry` 생성
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(BTreeSet::new()),
            discovered_at: Mutex::new(None),
        }
    }

    /// 이름 목록으로 생성 (규칙에 맞지 않는 이름은 건너뜀)
    pub fn with_tables<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let registry = Self::new();
        if let Ok(mut guard) = registry.tables.write() {
            guard.extend(names.into_iter().filter_map(|name| parse_logged(name.as_ref())));
        }
        registry
    }

    /// 초기화: 설정 목록 + (옵션) 스키마 탐색
    pub async fn init(&self, config: &Config, store: &dyn SeriesStore) -> Result<()> {
        self.clear()?;
        self.load_static(config)?;

        if config.discover_tables {
            *self.discovered_at.lock()? = Some(Instant::now());
            self.discover(config, store).await?;
        }

        info!("조회 허용 테이블 {}개 등록", self.len());
        Ok(())
    }

    /// 허용 목록에서 테이블 식별자 조회
    pub fn resolve(&self, name: &str) -> Result<TableName> {
        let table = TableName::parse(name)?;
        if self.contains(&table)? {
            Ok(table)
        } else {
            debug!("허용 목록에 없는 테이블 요청: {name}");
            Err(ApiError::UnknownTable(name.to_string()))
        }
    }

    /// 목록에 없으면 스키마를 다시 탐색한 뒤 한 번 더 조회
    pub async fn resolve_or_refresh(
        &self,
        name: &str,
        config: &Config,
        store: &dyn SeriesStore,
    ) -> Result<TableName> {
        let table = TableName::parse(name)?;
        if self.contains(&table)? {
            return Ok(table);
        }

        if self.claim_refresh(config)? {
            debug!("'{name}' 미등록, 스키마 재탐색");
            self.discover(config, store).await?;
            if self.contains(&table)? {
                return Ok(table);
            }
        }

        debug!("허용 목록에 없는 테이블 요청: {name}");
        Err(ApiError::UnknownTable(name.to_string()))
    }

    /// 재탐색 간격이 지났으면 스키마 탐색. 실패 시 기존 목록 유지
    pub async fn refresh_if_due(&self, config: &Config, store: &dyn SeriesStore) {
        match self.claim_refresh(config) {
            Ok(true) => {
                if let Err(e) = self.discover(config, store).await {
                    warn!("테이블 재탐색 실패, 기존 목록 사용: {e}");
                }
            }
            Ok(false) => {}
            Err(e) => warn!("테이블 재탐색 상태 확인 실패: {e}"),
        }
    }

    /// 정렬된 테이블 이름 목록
    pub fn tables(&self) -> Result<Vec<String>> {
        let guard = self.tables.read()?;
        Ok(guard.iter().map(ToString::to_string).collect())
    }

    pub fn len(&self) -> usize {
        self.tables.read().map(|guard| guard.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn contains(&self, table: &TableName) -> Result<bool> {
        Ok(self.tables.read()?.contains(table))
    }

    /// 탐색이 켜져 있고 간격이 지났으면 탐색 시각을 갱신하고 true
    fn claim_refresh(&self, config: &Config) -> Result<bool> {
        if !config.discover_tables {
            return Ok(false);
        }

        let mut guard = self.discovered_at.lock()?;
        let interval = Duration::from_secs(config.discovery_refresh_seconds);
        let due = match *guard {
            Some(at) => at.elapsed() >= interval,
            None => true,
        };
        if due {
            *guard = Some(Instant::now());
        }
        Ok(due)
    }

    /// 기존목록 초기화
    fn clear(&self) -> Result<()> {
        self.tables.write()?.clear();
        Ok(())
    }

    /// 설정파일 목록 로드
    fn load_static(&self, config: &Config) -> Result<()> {
        let mut guard = self.tables.write()?;
        for name in &config.allowed_tables {
            if let Some(table) = parse_logged(name) {
                debug!("허용 목록에 테이블 추가: {table}");
                guard.insert(table);
            }
        }
        Ok(())
    }

    /// 스키마 탐색 결과와 설정 목록으로 교체 (삭제된 테이블은 빠짐)
    async fn discover(&self, config: &Config, store: &dyn SeriesStore) -> Result<()> {
        debug!(
            "스키마 '{}' 에서 조회 가능한 테이블 탐색 중...",
            config.discovery_schema
        );

        let names = store.list_tables(&config.discovery_schema).await?;

        let mut tables: BTreeSet<TableName> = config
            .allowed_tables
            .iter()
            .filter_map(|name| parse_logged(name))
            .collect();
        tables.extend(names.iter().filter_map(|name| parse_logged(name)));

        let mut guard = self.tables.write()?;
        info!(
            "테이블 탐색 완료. {}개 → {}개",
            guard.len(),
            tables.len()
        );
        *guard = tables;
        Ok(())
    }
}

fn parse_logged(name: &str) -> Option<TableName> {
    match TableName::parse(name) {
        Ok(table) => Some(table),
        Err(_) => {
            warn!("식별자 규칙에 맞지 않는 테이블 이름 무시: {name}");
            None
        }
    }
}
