use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::{HeaderName, HeaderValue},
    Error, HttpMessage,
};
use futures_util::future::LocalBoxFuture;
use std::future::{ready, Ready};
use uuid::Uuid;

/// Headers checked, in order, for an id the caller already assigned
const INBOUND_ID_HEADERS: [&str; 2] = ["x-external-id", "x-request-id"];

/// Correlation id attached to each request's extensions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrelationId(pub String);

/// Tags every request with a correlation id
///
/// PakaiLink callbacks carry `X-EXTERNAL-ID`, which is reused so log lines can
/// be matched against the provider's records. Otherwise a UUID is generated.
/// The id is echoed back in `X-Request-ID`.
pub struct RequestId;

impl<S, B> Transform<S, ServiceRequest> for RequestId
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RequestIdMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestIdMiddleware { service }))
    }
}

pub struct RequestIdMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for RequestIdMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let request_id = INBOUND_ID_HEADERS
            .iter()
            .find_map(|name| {
                req.headers()
                    .get(*name)
                    .and_then(|h| h.to_str().ok())
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        req.extensions_mut()
            .insert(CorrelationId(request_id.clone()));

        tracing::info!(
            request_id = %request_id,
            method = %req.method(),
            path = %req.path(),
            "Incoming request"
        );

        let fut = self.service.call(req);

        Box::pin(async move {
            let mut res = fut.await?;

            tracing::info!(
                request_id = %request_id,
                status = %res.status(),
                "Request completed"
            );

            if let Ok(value) = HeaderValue::from_str(&request_id) {
                res.headers_mut()
                    .insert(HeaderName::from_static("x-request-id"), value);
            }

            Ok(res)
        })
    }
}
