use std::io::Write;
use std::sync::Arc;

use log::{error, info, LevelFilter};
use env_logger::Builder;
use chrono::Local;

use series_api_acl::TableRegistry;
use series_api_config::Settings;
use series_api_db::initialize_dbpool;
use series_api_error::Result;
use series_api_server::{AppState, QueryServer};

/// 로거 세팅
fn setup_logger() {
    #[cfg(debug_assertions)]
    {
        Builder::new()
            .filter(None, LevelFilter::Debug)
            .format(|buf,record| {
                writeln!(
                    buf,
                    "[{} {} {}:{}] {}",
                    Local::now().format("%Y-%m-%d %H:%M:%S"),
                    record.level(),
                    record.file().unwrap_or("unknown"),
                    record.line().unwrap_or(0),
                    record.args()
                )
            })
            .init()
    }

    #[cfg(not(debug_assertions))]
    {
        Builder::new()
            .filter(None, LevelFilter::Info)
            .format(|buf, record| {
                writeln!(
                    buf,
                    "[{} {}] {}",
                    Local::now().format("%Y-%m-%d %H:%M:%S"),
                    record.level(),
                    record.args()
                )
            })
            .init();
    }
}

/// 종료 신호 대기
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("종료 신호 대기 실패: {e}");
    }
}

async fn serve(settings: Settings) -> Result<()> {
    // db 세팅
    let db_pool = initialize_dbpool(&settings.database).await?;

    // 조회 허용 테이블 로드
    let registry = Arc::new(TableRegistry::new());
    registry.init(&settings.server, &db_pool).await?;
    if registry.is_empty() {
        error!("조회 가능한 테이블이 없음 (allowed_tables 또는 discover_tables 확인)");
    }

    let state = AppState::new(Arc::new(db_pool.clone()), registry, settings.server);
    let result = QueryServer::new(state).run(shutdown_signal()).await;

    db_pool.close();
    result
}

fn main() -> Result<()> {
    // 로거 세팅
    setup_logger();

    info!("series-api 서버 시작");

    // 통합 설정 로드
    let settings = Settings::new()?;

    let worker_threads = settings
        .server
        .worker_threads
        .unwrap_or_else(num_cpus::get);
    info!("워커 스레드 {worker_threads}개");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(worker_threads)
        .enable_all()
        .build()?;

    runtime.block_on(serve(settings))
}
