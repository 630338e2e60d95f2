use actix_web::{web, App, HttpServer};
use anyhow::Context;
use pakailink::config::Config;
use pakailink::middleware::RequestId;
use pakailink::modules::auth::{AuthService, InMemoryTokenStore};
use pakailink::modules::callbacks::{BroadcastEventBus, CallbackController, CallbackService, PaymentEvent};
use pakailink::modules::health::{self, HealthState};
use pakailink::modules::signature::SignatureService;
use std::sync::Arc;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("pakailink={},actix_web=info", config.app.log_level).into());
    let json_logs = std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));
    let registry = tracing_subscriber::registry().with(filter);
    if json_logs {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    config.validate().context("Configuration validation failed")?;

    tracing::info!("Starting PakaiLink callback receiver");
    tracing::info!("Environment: {}", config.app.env);
    tracing::info!("Server binding to: {}", config.server.bind_address());

    let pakailink = &config.pakailink;

    let mut signer = SignatureService::new(&pakailink.private_key_path, &pakailink.client_secret);
    if let Some(public_key_path) = &pakailink.public_key_path {
        signer = signer.with_public_key(public_key_path);
    }
    let signer = Arc::new(signer);

    let auth = Arc::new(
        AuthService::new(pakailink, signer.clone(), Arc::new(InMemoryTokenStore::new()))
            .context("Failed to initialize auth service")?,
    );

    let bus = Arc::new(BroadcastEventBus::default());
    spawn_event_logger(&bus);
    let callbacks = Arc::new(CallbackService::new(signer, bus));

    let health_state = web::Data::new(HealthState {
        auth,
        callbacks_enabled: pakailink.callbacks.enabled,
    });
    let callbacks_enabled = pakailink.callbacks.enabled;
    let callback_prefix = pakailink.callbacks.prefix.clone();

    if callbacks_enabled {
        tracing::info!(prefix = %callback_prefix, "Callback routes enabled");
    }

    // Start HTTP server
    let bind_address = config.server.bind_address();
    let server = HttpServer::new(move || {
        let callbacks = callbacks.clone();
        let callback_prefix = callback_prefix.clone();
        let health_state = health_state.clone();

        App::new()
            .wrap(RequestId)
            .wrap(TracingLogger::default())
            .configure(|cfg| health::configure(cfg, health_state))
            .configure(|cfg| {
                if callbacks_enabled {
                    CallbackController::configure(cfg, callbacks, &callback_prefix);
                }
            })
    })
    .workers(config.server.workers)
    .bind(&bind_address)
    .with_context(|| format!("Failed to bind {}", bind_address))?
    .run();

    tracing::info!("Server started at http://{}", bind_address);

    server.await.context("Server terminated with an error")
}

/// Log every verified payment so the receiver is useful on its own
fn spawn_event_logger(bus: &BroadcastEventBus) {
    let mut events = bus.subscribe();

    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(PaymentEvent::CallbackReceived(_)) => {}
                Ok(event) => {
                    if let Some(record) = event.record() {
                        tracing::info!(
                            event = event.name(),
                            partner_reference_no = record.partner_reference_no(),
                            status = ?record.status(),
                            "Payment event"
                        );
                    }
                }
                Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped = skipped, "Event logger lagged behind");
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    });
}
