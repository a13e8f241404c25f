mod utils;
pub mod model;
mod routes;
mod middleware;

use tracing::info;
use dotenv::dotenv;
use std::sync::Arc;
use actix_service::ServiceFactory;
use opentelemetry_jaeger::Uninstall;
use middleware::{identity, request_id};
use actix_web_opentelemetry::RequestTracing as OpenTelemetryMiddleware;
use opentelemetry::{global, sdk::{propagation::TraceContextPropagator,trace,trace::Sampler}};
use tracing_subscriber::{prelude::__tracing_subscriber_SubscriberExt, Registry, util::SubscriberInitExt};
use actix_web::{App, HttpServer, body::Body, dev::{ServiceRequest, ServiceResponse}, middleware::Condition, web, web::Data};
use utils::{config::default_env, context::PartialRequestContext};
use routes::admin::config;

pub use middleware::request_id::REQUEST_ID_HEADER;
pub use utils::{config::Configuration, context::InitialisationContext, errors::InternalError};

pub const APP_NAME: &'static str = "Config Inspector"; // Keep in sync with cargo.toml

///
/// The HTTP endpoints are wired-in here.
///
fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg
        // Admin/internal
        .route("/config", web::get().to(config::handle));
}

///
/// Initialise configuration and tracing, then start the HTTP server.
///
/// Called from main.rs. The split from binary to library means we can write integration tests
/// in the /tests folder which can call various public methods in this file to create the service
/// with near-identical set-up as the runtime instance.
///
pub async fn lib_main() -> Result<(), std::io::Error> {
    let (ctx, _uninstall) = init_everything()?;
    let init_ctx = Arc::new(ctx);
    let server_cfg = init_ctx.config().clone();

    // Start the HTTP server now, spawning an App for each worker thread.
    HttpServer::new(move || app(init_ctx.clone()))
        .bind(format!("0.0.0.0:{}", server_cfg.port))?
        .keep_alive(server_cfg.keep_alive)
        .client_timeout(server_cfg.client_timeout * 1000) // Millis.
        .run()
        .await
}

///
/// Initialise configuration and tracing.
///
/// Return a context object which can be passed into HTTP request handlers to access config. Also
/// return the Jaeger guard which, when dropped, will terminate the Jaeger tracing pipeline.
///
pub fn init_everything() -> Result<(InitialisationContext, Option<Uninstall>), InternalError> {
    // Load any local dev settings as environment variables from a .env file.
    dotenv().ok();

    // Default log level to INFO if it's not specified.
    default_env("RUST_LOG", "INFO");

    // Load the service configuration into struct.
    let config = Configuration::from_env()?;

    // Initialise open-telemetry distributed tracing.
    let uninstall = init_tracing(&config)?;

    info!("{}\n{}", BANNER, config.fmt_console()?);

    // Create a context object that can be used as a parameter in any HTTP request handler.
    // Actix_web will wrap in a Data wrapper (essentially an Arc) and share it amongst each
    // worker thread.
    Ok((InitialisationContext::new(config), uninstall))
}

///
/// Initialise tracing and plug-in the Jaeger feature if enabled.
///
fn init_tracing(config: &Configuration) -> Result<Option<Uninstall>, InternalError> {
    global::set_text_map_propagator(TraceContextPropagator::new());

    let jaeger = match config.distributed_tracing {
        true => { // Install the Jaeger pipeline.
            let (tracer, uninstall) = opentelemetry_jaeger::new_pipeline()
                .with_service_name(APP_NAME)
                .with_trace_config(trace::config().with_default_sampler(Sampler::AlwaysOn))
                .with_agent_endpoint(config.jaeger_endpoint.clone().unwrap_or_default())
                .install()
                .map_err(|err| InternalError::InvalidConfiguration { cause: format!("Unable to build Jaeger pipeline: {}", err) })?;
            Some((tracer, uninstall))
        },
        false => None
    };

    match jaeger {
        Some((tracer, uninstall)) => {
            if let Err(err) = Registry::default()
                .with(tracing_subscriber::EnvFilter::from_default_env()) // Set the tracing level to match RUST_LOG env variable.
                .with(tracing_subscriber::fmt::layer().with_test_writer())
                .with(tracing_opentelemetry::layer().with_tracer(tracer))
                .try_init() {
                    info!("Tracing already initialised: {}", err.to_string()); // Allowed error here - tests call this fn repeatedly.
            }
            Ok(Some(uninstall))
        },
        None => {
            if let Err(err) = Registry::default()
                .with(tracing_subscriber::EnvFilter::from_default_env()) // Set the tracing level to match RUST_LOG env variable.
                .with(tracing_subscriber::fmt::layer().with_test_writer())
                .try_init() {
                    info!("Tracing already initialised: {}", err.to_string()); // Allowed error here - tests call this fn repeatedly.
            }
            Ok(None)
        },
    }
}

///
/// Create a configured actix_web HttpServer App with configured middleware, data and routes.
///
pub fn app(ctx: Arc<InitialisationContext>) -> App<
    impl ServiceFactory<
        Request = ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = ()>,
    Body> {

    App::new()
        // Work out who the caller is from the upstream gateway's headers.
        .wrap(identity::Middleware::new(ctx.config()))
        .wrap(request_id::Middleware::new(Data::new(PartialRequestContext::from(ctx.clone()))))

        // Enable open-telemetry tracing on incoming requests.
        .wrap(Condition::new(ctx.config().distributed_tracing, OpenTelemetryMiddleware::new()))

        // Add the routes to this root url path.
        .service(web::scope(&ctx.config().base_url).configure(configure_routes))
}

const BANNER: &str = r#"
   ___           __ _        ___                          _
  / __|___ _ _  / _(_)__ _  |_ _|_ _  ____ __  ___ __ __| |_ ___ _ _
 | (__/ _ \ ' \|  _| / _` |  | || ' \(_-< '_ \/ -_) _/ _|  _/ _ \ '_|
  \___\___/_||_|_| |_\__, | |___|_||_/__/ .__/\___\__\__|\__\___/_|
                     |___/              |_|          Rust / Actix Web
"#;
