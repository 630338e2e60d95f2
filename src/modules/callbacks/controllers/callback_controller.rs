use crate::core::AppError;
use crate::modules::callbacks::models::{CallbackResponse, CallbackType};
use crate::modules::callbacks::services::{error_response, CallbackService};
use actix_web::{post, web, HttpRequest, HttpResponse};
use std::sync::Arc;
use tracing::{error, info, warn};

/// HTTP boundary for PakaiLink payment callbacks
///
/// Routes, under the configured prefix:
/// - `POST /virtual-account`
/// - `POST /qris`
/// - `POST /emoney`
/// - `POST /transfer`
/// - `POST /retail`
/// - `POST /topup`
pub struct CallbackController {
    service: Arc<CallbackService>,
}

impl CallbackController {
    pub fn new(service: Arc<CallbackService>) -> Self {
        Self { service }
    }

    /// Register callback routes under `prefix`
    pub fn configure(cfg: &mut web::ServiceConfig, service: Arc<CallbackService>, prefix: &str) {
        let controller = web::Data::new(Self::new(service));

        cfg.service(
            web::scope(prefix)
                .app_data(controller)
                .service(receive_callback),
        );
    }
}

/// POST {prefix}/{callback_type}
///
/// The body is taken as raw bytes so the signature is checked against exactly
/// what PakaiLink sent.
///
/// # Headers
/// * `X-SIGNATURE` - base64 HMAC-SHA512 of `body + X-TIMESTAMP`
/// * `X-TIMESTAMP` - SNAP timestamp
///
/// # Returns
/// * `200 OK` - `{"responseCode":"2000000","responseMessage":"Success",...}`
/// * `400 Bad Request` - body could not be decoded
/// * `401 Unauthorized` - missing header or signature mismatch
/// * `404 Not Found` - unknown callback type
/// * `500 Internal Server Error` - anything else
#[post("/{callback_type}")]
async fn receive_callback(
    req: HttpRequest,
    path: web::Path<String>,
    body: web::Bytes,
    controller: web::Data<CallbackController>,
) -> HttpResponse {
    let segment = path.into_inner();
    let Some(kind) = CallbackType::from_route_segment(&segment) else {
        warn!(segment = segment.as_str(), "Callback for unknown type");
        return HttpResponse::NotFound().json(CallbackResponse::error(
            "4040000",
            format!("Unknown callback type: {}", segment),
            None,
        ));
    };

    info!(callback_type = %kind, bytes = body.len(), "Received callback");

    let signature = header(&req, "X-SIGNATURE");
    let timestamp = header(&req, "X-TIMESTAMP");

    match controller
        .service
        .handle_callback(kind, &body, signature, timestamp)
    {
        Ok(event) => {
            let reference = event
                .record()
                .map(|record| record.partner_reference_no().to_string())
                .unwrap_or_default();
            HttpResponse::Ok().json(CallbackResponse::success(reference))
        }
        Err(err) => {
            log_failure(kind, &err);
            let (status, envelope) = error_response(&err, kind, &body);
            HttpResponse::build(status).json(envelope)
        }
    }
}

fn header<'a>(req: &'a HttpRequest, name: &str) -> Option<&'a str> {
    req.headers().get(name).and_then(|h| h.to_str().ok())
}

fn log_failure(kind: CallbackType, err: &AppError) {
    match err {
        AppError::MissingHeader(_) | AppError::InvalidSignature => {
            error!(callback_type = %kind, error = %err, "Callback rejected");
        }
        _ => error!(callback_type = %kind, error = %err, "Callback failed"),
    }
}
