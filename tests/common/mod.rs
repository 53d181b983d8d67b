use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::sync::atomic::AtomicU16;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use alterra_admin::client::ApiClient;
use anyhow::Result;
use rocket::config::{LogLevel, Shutdown};
use rocket::fairing::AdHoc;
use rocket::http::Status;
use rocket::local::asynchronous::Client;
use rocket::serde::json::Json;
use rocket::{delete, get, patch, post, put, routes, State};
use serde_json::Value;
use uuid::Uuid;

static PORT: AtomicU16 = AtomicU16::new(47100);

#[allow(dead_code)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailMode {
    Everything,
    Lists,
}

#[allow(dead_code)]
#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub method: String,
    pub uri: String,
    pub content_type: Option<String>,
}

/// In-memory stand-in for the REST backend: one JSON array per resource.
#[derive(Default)]
pub struct Store {
    collections: Mutex<HashMap<String, Vec<Value>>>,
    failing: Mutex<HashMap<String, FailMode>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl Store {
    fn check(&self, resource: &str, is_list: bool) -> Result<(), Status> {
        match self.failing.lock().unwrap().get(resource) {
            Some(FailMode::Everything) => Err(Status::InternalServerError),
            Some(FailMode::Lists) if is_list => Err(Status::InternalServerError),
            _ => Ok(()),
        }
    }
}

pub struct FakeBackend {
    port: u16,
    store: Arc<Store>,
    shutdown: rocket::Shutdown,
}

impl Drop for FakeBackend {
    fn drop(&mut self) {
        self.shutdown.clone().notify();
    }
}

#[allow(dead_code)]
impl FakeBackend {
    pub fn url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    pub fn api_client(&self) -> ApiClient {
        ApiClient::new(&self.url(), Duration::from_secs(5)).unwrap()
    }

    /// Stores `entity` as is, giving it a fresh id. Returns that id.
    pub fn seed(&self, resource: &str, mut entity: Value) -> String {
        let id = Uuid::new_v4().to_string();
        entity["id"] = Value::String(id.clone());
        self.store
            .collections
            .lock()
            .unwrap()
            .entry(resource.to_string())
            .or_default()
            .push(entity);
        id
    }

    pub fn all(&self, resource: &str) -> Vec<Value> {
        self.store
            .collections
            .lock()
            .unwrap()
            .get(resource)
            .cloned()
            .unwrap_or_default()
    }

    pub fn fail(&self, resource: &str, mode: FailMode) {
        self.store
            .failing
            .lock()
            .unwrap()
            .insert(resource.to_string(), mode);
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.store.requests.lock().unwrap().clone()
    }
}

#[get("/api/<resource>")]
fn list_entities(resource: &str, store: &State<Arc<Store>>) -> Result<Json<Vec<Value>>, Status> {
    store.check(resource, true)?;
    let collections = store.collections.lock().unwrap();
    Ok(Json(collections.get(resource).cloned().unwrap_or_default()))
}

#[get("/api/<resource>/<id>")]
fn get_entity(resource: &str, id: &str, store: &State<Arc<Store>>) -> Result<Json<Value>, Status> {
    store.check(resource, false)?;
    let collections = store.collections.lock().unwrap();
    collections
        .get(resource)
        .and_then(|entities| entities.iter().find(|entity| entity["id"] == id))
        .cloned()
        .map(Json)
        .ok_or(Status::NotFound)
}

#[post("/api/<resource>", data = "<body>")]
fn create_entity(
    resource: &str,
    body: String,
    store: &State<Arc<Store>>,
) -> Result<(Status, Json<Value>), Status> {
    store.check(resource, false)?;
    let mut entity: Value = serde_json::from_str(&body).map_err(|_| Status::BadRequest)?;
    if !entity.get("id").map_or(true, Value::is_null) {
        return Err(Status::BadRequest);
    }

    entity["id"] = Value::String(Uuid::new_v4().to_string());
    store
        .collections
        .lock()
        .unwrap()
        .entry(resource.to_string())
        .or_default()
        .push(entity.clone());

    Ok((Status::Created, Json(entity)))
}

#[put("/api/<resource>/<id>", data = "<body>")]
fn update_entity(
    resource: &str,
    id: &str,
    body: String,
    store: &State<Arc<Store>>,
) -> Result<Json<Value>, Status> {
    store.check(resource, false)?;
    let entity: Value = serde_json::from_str(&body).map_err(|_| Status::BadRequest)?;
    if entity["id"] != id {
        return Err(Status::BadRequest);
    }

    let mut collections = store.collections.lock().unwrap();
    let existing = collections
        .get_mut(resource)
        .and_then(|entities| entities.iter_mut().find(|entity| entity["id"] == id))
        .ok_or(Status::NotFound)?;
    *existing = entity.clone();

    Ok(Json(entity))
}

#[patch("/api/<resource>/<id>", data = "<body>")]
fn partial_update_entity(
    resource: &str,
    id: &str,
    body: String,
    store: &State<Arc<Store>>,
) -> Result<Json<Value>, Status> {
    store.check(resource, false)?;
    let patch: Value = serde_json::from_str(&body).map_err(|_| Status::BadRequest)?;
    let patch = patch.as_object().ok_or(Status::BadRequest)?;

    let mut collections = store.collections.lock().unwrap();
    let existing = collections
        .get_mut(resource)
        .and_then(|entities| entities.iter_mut().find(|entity| entity["id"] == id))
        .ok_or(Status::NotFound)?;
    for (key, value) in patch {
        if !value.is_null() {
            existing[key] = value.clone();
        }
    }

    Ok(Json(existing.clone()))
}

#[delete("/api/<resource>/<id>")]
fn delete_entity(resource: &str, id: &str, store: &State<Arc<Store>>) -> Result<Status, Status> {
    store.check(resource, false)?;
    let mut collections = store.collections.lock().unwrap();
    let entities = collections.get_mut(resource).ok_or(Status::NotFound)?;
    let before = entities.len();
    entities.retain(|entity| entity["id"] != id);

    if entities.len() == before {
        return Err(Status::NotFound);
    }
    Ok(Status::NoContent)
}

#[get("/management/health")]
fn health() -> Json<Value> {
    Json(serde_json::json!({ "status": "UP" }))
}

pub async fn start_backend() -> Result<FakeBackend> {
    let port = PORT.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
    let store = Arc::new(Store::default());

    let config = rocket::Config {
        port,
        address: Ipv4Addr::LOCALHOST.into(),
        log_level: LogLevel::Off,
        shutdown: Shutdown {
            ctrlc: false,
            #[cfg(unix)]
            signals: Default::default(),
            grace: 0,
            mercy: 0,
            ..Default::default()
        },
        ..rocket::Config::debug_default()
    };

    let rocket = rocket::custom(config)
        .mount(
            "/",
            routes![
                list_entities,
                get_entity,
                create_entity,
                update_entity,
                partial_update_entity,
                delete_entity,
                health
            ],
        )
        .attach(AdHoc::on_request("Record requests", |req, _| {
            Box::pin(async move {
                if let Some(store) = req.rocket().state::<Arc<Store>>() {
                    store.requests.lock().unwrap().push(RecordedRequest {
                        method: req.method().to_string(),
                        uri: req.uri().to_string(),
                        content_type: req.content_type().map(|ct| ct.to_string()),
                    });
                }
            })
        }))
        .manage(store.clone())
        .ignite()
        .await?;

    let backend = FakeBackend {
        port,
        store,
        shutdown: rocket.shutdown(),
    };
    tokio::spawn(rocket.launch());

    let mut tries_left = 50;
    while tries_left > 0 {
        if backend.api_client().health().await {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
        tries_left -= 1;
    }

    if tries_left == 0 {
        panic!("Failed to start the fake backend on port {}", port);
    }

    Ok(backend)
}

/// The admin application, pointed at `backend`.
#[allow(dead_code)]
pub async fn admin_client(backend: &FakeBackend) -> Result<Client> {
    let figment = rocket::Config::figment()
        .merge(("backend.api_root", backend.url()))
        .merge(("log_level", "off"));
    let rocket = alterra_admin::build_rocket(figment).map_err(|e| e.0)?;

    Ok(Client::tracked(rocket).await?)
}
