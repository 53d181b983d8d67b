use std::borrow::Cow;
use std::ffi::OsStr;
use std::path::PathBuf;

use crate::config::BackendConfig;
use crate::entities::Kind;
use crate::{Context, TplContext};
use askama::Template;
use askama_web::WebTemplate;
use rocket::http::{ContentType, Status};
use rocket::request::FlashMessage;
use rocket::routes;
use rocket::serde::json::Json;
use rocket::{get, State};
use serde::Serialize;

pub mod display;
pub mod entity;
pub mod form;

#[derive(Template, WebTemplate)]
#[template(path = "index.html")]
struct IndexTpl<'a> {
    base: TplContext<'a>,
    kinds: &'static [Kind],
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    backend: &'static str,
    api_root: String,
}

#[get("/health")]
#[tracing::instrument(skip_all)]
async fn health(
    ctx: &State<Context>,
    backend_config: &State<BackendConfig>,
) -> (Status, Json<HealthResponse>) {
    let backend_ok = ctx.client().health().await;

    let response = HealthResponse {
        status: if backend_ok { "healthy" } else { "unhealthy" },
        backend: if backend_ok { "ok" } else { "error" },
        api_root: backend_config.api_root.clone(),
    };

    let status = if backend_ok {
        Status::Ok
    } else {
        Status::ServiceUnavailable
    };

    (status, Json(response))
}

#[get("/")]
#[tracing::instrument(skip_all)]
fn root<'a>(flash: Option<FlashMessage<'_>>) -> IndexTpl<'a> {
    IndexTpl {
        base: TplContext::from_flash("home", flash),
        kinds: &Kind::ALL,
    }
}

#[get("/static/<file..>")]
#[tracing::instrument]
fn dist(file: PathBuf) -> Option<(ContentType, Cow<'static, [u8]>)> {
    let filename = file.display().to_string();
    let asset = Asset::get(&filename)?;
    let content_type = file
        .extension()
        .and_then(OsStr::to_str)
        .and_then(ContentType::from_extension)
        .unwrap_or(ContentType::Bytes);

    Some((content_type, asset.data))
}

#[derive(rust_embed::RustEmbed)]
#[folder = "./static/"]
struct Asset;

pub fn routes() -> Vec<rocket::Route> {
    let mut all_routes = routes![root, dist, health];
    all_routes.extend(entity::routes());
    all_routes
}
