use dotenvy::dotenv;
use rocket::config::Shutdown;
use rocket::figment::Figment;
use rocket::request::FlashMessage;
use rocket::response::{Flash, Redirect};
use rocket::{catch, catchers, Build, Request, Rocket};
use rocket_prometheus::PrometheusMetrics;

use crate::client::ApiClient;
use crate::config::BackendConfig;
use crate::entities::Kind;

pub mod client;
pub mod config;
pub mod entities;
pub mod error;
pub mod instrumentation;
pub mod otlp;
pub mod slice;
pub mod views;

pub struct Context {
    client: ApiClient,
}

impl Context {
    pub fn client(&self) -> &ApiClient {
        &self.client
    }
}

const CSS_VERSION: &str = std::env!("CSS_VERSION");

pub struct TplContext<'a> {
    cur_module: &'a str,
    err_msg: Vec<String>,
    success_msg: Vec<String>,
    css_version: &'a str,
    menu: &'static [Kind],
}

impl<'a> TplContext<'a> {
    pub fn from_flash(module: &'a str, flash: Option<FlashMessage<'_>>) -> Self {
        let mut tpl = Self {
            cur_module: module,
            err_msg: vec![],
            success_msg: vec![],
            css_version: CSS_VERSION,
            menu: &Kind::ALL,
        };

        if let Some(flash) = flash {
            match flash.kind() {
                "success" => tpl.success_msg.push(flash.message().to_string()),
                _ => tpl.err_msg.push(flash.message().to_string()),
            }
        }

        tpl
    }

    pub fn with_error(mut self, error: Option<String>) -> Self {
        self.err_msg.extend(error);
        self
    }
}

fn nothing_at(req: &Request<'_>) -> Flash<Redirect> {
    tracing::info!("No route for {}", req.uri());
    Flash::error(
        Redirect::to("/"),
        format!("There's nothing at {}", req.uri().path()),
    )
}

#[catch(404)]
fn not_found(req: &Request<'_>) -> Flash<Redirect> {
    nothing_at(req)
}

/// Path segments that aren't an entity kind or an id.
#[catch(422)]
fn unprocessable(req: &Request<'_>) -> Flash<Redirect> {
    nothing_at(req)
}

/// Builds the admin application against the backend described by `figment`.
pub fn build_rocket(figment: Figment) -> crate::error::Result<Rocket<Build>> {
    let backend_config = BackendConfig::from_figment(&figment)?;
    tracing::info!("Using backend at {}", backend_config.api_root);

    let client = ApiClient::new(&backend_config.api_root, backend_config.timeout)?;
    let ctx = Context { client };

    let prometheus = PrometheusMetrics::new().with_request_filter(|request| {
        request.uri().path() != "/metrics" && request.uri().path() != "/health"
    });
    instrumentation::register_backend_metrics(prometheus.registry())?;

    Ok(rocket::custom(figment)
        .attach(prometheus.clone())
        .mount("/", views::routes())
        .mount("/metrics", prometheus)
        .register("/", catchers![not_found, unprocessable])
        .manage(ctx)
        .manage(backend_config))
}

#[rocket::main]
pub async fn main() -> crate::error::Result<()> {
    dotenv().ok();

    let _sentry_guard = if let Ok(sentry_dsn) = std::env::var("SENTRY_DSN") {
        Some(sentry::init((
            sentry_dsn,
            sentry::ClientOptions {
                release: Some(
                    format!("{}@{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")).into(),
                ),
                environment: Some(
                    std::env::var("ROCKET_PROFILE")
                        .unwrap_or_else(|_| "dev".to_string())
                        .into(),
                ),
                traces_sample_rate: 1.0,
                ..Default::default()
            },
        )))
    } else {
        None
    };

    let otlp_endpoint = std::env::var("OTLP_ENDPOINT").ok();
    let _guard = otlp::init_tracing_subscriber(otlp_endpoint)?;

    let shutdown_config = Shutdown {
        grace: 0,
        mercy: 0,
        ..Default::default()
    };
    let figment = rocket::Config::figment().merge(("shutdown", shutdown_config));

    build_rocket(figment)?.launch().await?;

    Ok(())
}
