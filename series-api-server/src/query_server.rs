use std::future::Future;

use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as AutoConnBuilder;
use log::{debug, error, info};
use tokio::net::TcpListener;

use crate::query_handler::query_handler;
use crate::state::AppState;

use series_api_error::Result;

/// 조회 서버 구조체
pub struct QueryServer {
    /// 핸들러 공유 상태
    state: AppState,
}

impl QueryServer {
    /// 새로운 조회 서버 인스턴스를 생성
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    /// 서버실행 (shutdown 이 완료되면 accept 중단)
    pub async fn run<S>(&self, shutdown: S) -> Result<()>
    where
        S: Future<Output = ()>,
    {
        // 바인딩 주소
        let addr = self.state.config.bind_addr()?;
        let listener = TcpListener::bind(addr).await?;
        info!("조회 서버 시작: {addr}");

        tokio::pin!(shutdown);

        loop {
            let (stream, client_addr) = tokio::select! {
                accepted = listener.accept() => accepted?,
                () = &mut shutdown => {
                    info!("종료 신호 수신, 연결 수락 중단");
                    break;
                }
            };
            let state = self.state.clone();

            tokio::spawn(async move {
                let io = TokioIo::new(stream);
                if let Err(err) = AutoConnBuilder::new(TokioExecutor::new())
                    .serve_connection(
                        io,
                        service_fn(move |req| query_handler(req, state.clone())),
                    )
                    .await
                {
                    error!("커넥션 에러: {err}");
                } else {
                    debug!("커넥션 종료: {client_addr}");
                }
            });
        }

        Ok(())
    }
}
