use std::env;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use solace_api::config::{Config, StorageBackend};
use solace_api::rate_limit::RateLimiter;
use solace_api::state::AppState;
use solace_audit::log::AuditLog;
use solace_audit::sink::StoreSink;
use solace_bedrock::mapping::BedrockMappingAnalyzer;
use solace_import::analyzer::MappingAnalyzer;
use solace_import::wizard::ImportWizard;
use solace_practice::dispatch::LoggingDispatcher;
use solace_practice::messaging::MessagingService;
use solace_practice::tasks::TaskService;
use solace_storage::SharedStore;
use solace_storage::memory::MemoryStore;
use solace_storage::s3::S3Store;

const EXPIRY_INTERVAL: Duration = Duration::from_secs(60 * 60);

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Structured JSON logging for CloudWatch
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let config = Config::from_env()?;
    let aws = if config.needs_aws() {
        Some(aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await)
    } else {
        None
    };

    let store: SharedStore = match (&config.storage, &aws) {
        (StorageBackend::S3 { bucket }, Some(aws)) => {
            let s3 = S3Store::new(aws_sdk_s3::Client::new(aws), bucket.clone());
            tracing::info!(bucket = s3.bucket(), "using S3 storage");
            Arc::new(s3)
        }
        _ => {
            tracing::info!("using in-memory storage");
            Arc::new(MemoryStore::new())
        }
    };

    let analyzer: Option<Arc<dyn MappingAnalyzer>> = match (&config.mapping_model, &aws) {
        (Some(model_id), Some(aws)) => {
            tracing::info!(model_id, "AI column mapping enabled");
            Some(Arc::new(BedrockMappingAnalyzer::new(aws, model_id.clone())))
        }
        _ => None,
    };

    let state = AppState {
        messaging: MessagingService::new(store.clone(), Arc::new(LoggingDispatcher)),
        tasks: TaskService::new(store.clone()),
        imports: Arc::new(ImportWizard::new(store.clone(), analyzer)),
        audit: AuditLog::new(Arc::new(StoreSink::new(store.clone()))),
        limiter: RateLimiter::in_memory(config.read_limit, config.write_limit, config.rate_window),
        store,
    };

    if config.seed_demo {
        let summary = solace_practice::demo::seed(&state.messaging, &state.tasks).await?;
        tracing::info!(?summary, "seeded demo data");
    }

    spawn_task_expiry(state.tasks.clone());

    let app = solace_api::build_router(state);

    if env::var_os("AWS_LAMBDA_RUNTIME_API").is_some() {
        lambda_http::run(app).await.map_err(|e| eyre::eyre!(e))
    } else {
        let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
        tracing::info!(addr = %config.bind_addr, "listening");
        axum::serve(listener, app).await?;
        Ok(())
    }
}

/// Expire overdue pending tasks now and then hourly.
fn spawn_task_expiry(tasks: TaskService) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(EXPIRY_INTERVAL);
        loop {
            interval.tick().await;
            let today = jiff::Timestamp::now().to_zoned(jiff::tz::TimeZone::UTC).date();
            if let Err(e) = tasks.expire_overdue(today).await {
                tracing::warn!(error = %e, "task expiry failed");
            }
        }
    });
}
