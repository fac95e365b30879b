use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{CONTENT_TYPE, HeaderValue};
use hyper::{Response, StatusCode};
use log::error;
use serde::Serialize;

use series_api_error::ApiError;

/// 직렬화 실패 시 응답 본문
const FALLBACK_BODY: &str =
    r#"{"error":"Processing error","details":"response serialization failed","status":"error"}"#;

#[derive(Serialize)]
struct OutcomeEnvelope<'a, T: Serialize> {
    status: &'static str,
    #[serde(flatten)]
    outcome: &'a T,
}

#[derive(Serialize)]
struct DataEnvelope<'a, T: Serialize> {
    status: &'static str,
    data: &'a T,
}

#[derive(Serialize)]
struct ErrorEnvelope<'a> {
    error: &'a str,
    details: Option<&'a str>,
    status: &'static str,
}

/// JSON 응답 생성
pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<Full<Bytes>> {
    let (status, bytes) = match serde_json::to_vec(body) {
        Ok(bytes) => (status, Bytes::from(bytes)),
        Err(e) => {
            error!("응답 직렬화 실패: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, Bytes::from_static(FALLBACK_BODY.as_bytes()))
        }
    };

    let mut response = Response::new(Full::new(bytes));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}

/// 조회 성공 응답 (결과 필드를 status 와 같은 수준에 펼침)
pub fn success_response<T: Serialize>(outcome: &T) -> Response<Full<Bytes>> {
    json_response(
        StatusCode::OK,
        &OutcomeEnvelope {
            status: "success",
            outcome,
        },
    )
}

/// `{status, data}` 형태 성공 응답
pub fn data_response<T: Serialize>(data: &T) -> Response<Full<Bytes>> {
    json_response(
        StatusCode::OK,
        &DataEnvelope {
            status: "success",
            data,
        },
    )
}

/// 에러응답 (모든 처리 실패는 500)
pub fn error_response(err: &ApiError) -> Response<Full<Bytes>> {
    let details = err.details();
    envelope_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        &err.summary(),
        details.as_deref(),
    )
}

/// 라우팅 에러 등 상태코드를 지정하는 에러응답
pub fn envelope_response(
    status: StatusCode,
    message: &str,
    details: Option<&str>,
) -> Response<Full<Bytes>> {
    json_response(
        status,
        &ErrorEnvelope {
            error: message,
            details,
            status: "error",
        },
    )
}
