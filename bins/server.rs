use dotenvy::dotenv;
use tracing::{error, info};
use uuid::Uuid;

fn init_logging() {
    common::utils::logging::init_logging_from_env();
    info!(service = "account-service", event = "logger_init", "tracing subscriber initialized");
}

fn build_runtime(worker_threads: Option<usize>) -> std::io::Result<tokio::runtime::Runtime> {
    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();
    if let Some(w) = worker_threads { builder.worker_threads(w); }
    builder.build()
}

fn main() -> std::process::ExitCode {
    // Load .env first so RUST_LOG / LOG_FORMAT / OTLP settings from it take effect
    dotenv().ok();

    let cfg = configs::AppConfig::load_and_validate();
    let worker_threads = cfg.as_ref().ok().and_then(|c| c.server.worker_threads);

    let rt = match build_runtime(worker_threads) {
        Ok(rt) => rt,
        Err(e) => {
            init_logging();
            error!(service = "account-service", event = "runtime_build_failed", error = %e, "failed to build tokio runtime");
            return std::process::ExitCode::FAILURE;
        }
    };
    // The OTLP batch exporter is spawned onto this runtime
    let _rt_guard = rt.enter();
    init_logging();

    let service_id = Uuid::new_v4();
    let pid = std::process::id();
    let version = env!("CARGO_PKG_VERSION");

    std::panic::set_hook(Box::new({
        let service_id = service_id;
        move |info| {
            error!(
                service = "account-service",
                event = "panic",
                %service_id,
                pid,
                message = %info,
                "unhandled panic occurred"
            );
        }
    }));

    let cfg = match cfg {
        Ok(cfg) => cfg,
        Err(e) => {
            error!(service = "account-service", event = "config_invalid", error = %e, "failed to load configuration");
            common::utils::logging::shutdown_tracing();
            return std::process::ExitCode::FAILURE;
        }
    };

    info!(
        service = "account-service",
        event = "start",
        %service_id,
        pid,
        version,
        threads = worker_threads.unwrap_or_default(),
        "account service starting"
    );

    // server::run drains connections on Ctrl+C and returns Ok
    let code = rt.block_on(async move {
        match server::run(cfg).await {
            Ok(()) => {
                info!(service = "account-service", event = "stop", %service_id, pid, "account service stopped");
                std::process::ExitCode::SUCCESS
            }
            Err(e) => {
                error!(service = "account-service", event = "run_failed", error = %e, "account service failed");
                std::process::ExitCode::FAILURE
            }
        }
    });
    common::utils::logging::shutdown_tracing();
    code
}
