use anyhow::Result;
use rocket::http::{ContentType, Status};
use rocket::local::asynchronous::Client;
use serde_json::json;

mod common;
use common::{admin_client, start_backend, FailMode};

async fn submit(client: &Client, uri: &str, body: &str) -> (Status, Option<String>, String) {
    let response = client
        .post(uri.to_string())
        .header(ContentType::Form)
        .body(body.to_string())
        .dispatch()
        .await;

    let status = response.status();
    let location = response.headers().get_one("Location").map(str::to_string);
    let body = response.into_string().await.unwrap_or_default();
    (status, location, body)
}

async fn page(client: &Client, uri: &str) -> (Status, String) {
    let response = client.get(uri.to_string()).dispatch().await;
    let status = response.status();
    (status, response.into_string().await.unwrap_or_default())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_home_lists_every_entity() -> Result<()> {
    let backend = start_backend().await?;
    let client = admin_client(&backend).await?;

    let (status, body) = page(&client, "/").await;
    assert_eq!(status, Status::Ok);
    for slug in ["profile", "game-config", "room-config", "floor-config", "challenge"] {
        assert!(body.contains(&format!("href=\"/{}\"", slug)), "{}", slug);
    }

    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_empty_list() -> Result<()> {
    let backend = start_backend().await?;
    let client = admin_client(&backend).await?;

    let (status, body) = page(&client, "/room-config").await;
    assert_eq!(status, Status::Ok);
    assert!(body.contains("No Room Configs found"));
    assert!(body.contains("href=\"/room-config/new\""));

    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_room_shows_its_room_config() -> Result<()> {
    let backend = start_backend().await?;
    let client = admin_client(&backend).await?;

    let (status, location, _) = submit(
        &client,
        "/room-config/new",
        "setup=standard&numOfDoors=2&numOfPrizes=1",
    )
    .await;
    assert_eq!(status, Status::SeeOther);
    assert_eq!(location.as_deref(), Some("/room-config"));

    let configs = backend.all("room-configs");
    assert_eq!(configs.len(), 1);
    assert_eq!(configs[0]["numOfDoors"], 2);
    let config_id = configs[0]["id"].as_str().unwrap().to_string();

    let (_, body) = page(&client, "/room-config").await;
    assert!(body.contains("A new Room Config is created with identifier"));
    assert!(body.contains(&config_id));

    let (status, body) = page(&client, "/room/new").await;
    assert_eq!(status, Status::Ok);
    assert!(body.contains(&format!("<option value=\"{}\"", config_id)));

    let (status, location, _) = submit(
        &client,
        "/room/new",
        &format!("introText=&roomName=hall&location={}&name=", config_id),
    )
    .await;
    assert_eq!(status, Status::SeeOther);
    assert_eq!(location.as_deref(), Some("/room"));

    let rooms = backend.all("rooms");
    assert_eq!(rooms.len(), 1);
    assert_eq!(rooms[0]["location"]["id"], config_id.as_str());
    assert_eq!(rooms[0]["location"]["setup"], "standard");
    assert!(rooms[0]["name"].is_null());
    let room_id = rooms[0]["id"].as_str().unwrap().to_string();

    let (status, body) = page(&client, &format!("/room/{}", room_id)).await;
    assert_eq!(status, Status::Ok);
    assert!(body.contains("<dt>Location</dt>"));
    assert!(body.contains(&format!("href=\"/room-config/{}\"", config_id)));

    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_invalid_forms_are_rendered_again() -> Result<()> {
    let backend = start_backend().await?;
    let client = admin_client(&backend).await?;

    let (status, _, body) = submit(
        &client,
        "/room-config/new",
        "setup=standard&numOfDoors=two&numOfPrizes=1",
    )
    .await;
    assert_eq!(status, Status::Ok);
    assert!(body.contains("This field should be a number."));
    assert!(body.contains("value=\"two\""));
    assert!(backend.all("room-configs").is_empty());

    let (status, _, body) = submit(&client, "/profile/new", "name=&auth0UserId=auth0%7C1").await;
    assert_eq!(status, Status::Ok);
    assert!(body.contains("This field is required."));
    assert!(body.contains("value=\"auth0|1\""));
    assert!(backend.all("profiles").is_empty());

    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_backend_failure_keeps_the_form() -> Result<()> {
    let backend = start_backend().await?;
    let client = admin_client(&backend).await?;
    backend.fail("prizes", FailMode::Everything);

    let (status, _, body) = submit(&client, "/prize/new", "prizeName=gold&pips=3").await;
    assert_eq!(status, Status::Ok);
    assert!(body.contains("Request failed with status code 500"));
    assert!(body.contains("value=\"gold\""));

    let (status, body) = page(&client, "/prize").await;
    assert_eq!(status, Status::Ok);
    assert!(body.contains("Request failed with status code 500"));

    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_edit_door() -> Result<()> {
    let backend = start_backend().await?;
    let client = admin_client(&backend).await?;
    let prize_id = backend.seed("prizes", json!({ "prizeName": "gold" }));
    let door_id = backend.seed(
        "doors",
        json!({ "doorName": "north", "prizes": [{ "id": prize_id }], "name": null }),
    );

    let (status, body) = page(&client, &format!("/door/{}/edit", door_id)).await;
    assert_eq!(status, Status::Ok);
    assert!(body.contains("value=\"north\""));
    assert!(body.contains(&format!("value=\"{}\" readonly", door_id)));

    let (status, location, _) = submit(
        &client,
        &format!("/door/{}/edit", door_id),
        "doorName=south&name=",
    )
    .await;
    assert_eq!(status, Status::SeeOther);
    assert_eq!(location.as_deref(), Some("/door"));

    let doors = backend.all("doors");
    assert_eq!(doors[0]["doorName"], "south");
    assert_eq!(doors[0]["prizes"][0]["id"], prize_id.as_str());

    let (_, body) = page(&client, &format!("/door/{}", door_id)).await;
    assert!(body.contains("south"));

    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_delete_door() -> Result<()> {
    let backend = start_backend().await?;
    let client = admin_client(&backend).await?;
    let door_id = backend.seed("doors", json!({ "doorName": "north" }));

    let (status, body) = page(&client, &format!("/door/{}/delete", door_id)).await;
    assert_eq!(status, Status::Ok);
    assert!(body.contains(&format!(
        "Are you sure you want to delete Door {}?",
        door_id
    )));

    let (status, location, _) = submit(&client, &format!("/door/{}/delete", door_id), "").await;
    assert_eq!(status, Status::SeeOther);
    assert_eq!(location.as_deref(), Some("/door"));
    assert!(backend.all("doors").is_empty());

    let (_, body) = page(&client, "/door").await;
    assert!(body.contains(&format!("A Door is deleted with identifier {}", door_id)));
    assert!(body.contains("No Doors found"));

    let (status, location, _) = submit(&client, &format!("/door/{}/delete", door_id), "").await;
    assert_eq!(status, Status::Ok);
    assert_eq!(location, None);

    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_map_tasks_are_dungeons() -> Result<()> {
    let backend = start_backend().await?;
    let client = admin_client(&backend).await?;
    let crypt = backend.seed("dungeons", json!({ "dungeonName": "crypt" }));
    let tower = backend.seed("dungeons", json!({ "dungeonName": "tower" }));

    let (_, body) = page(&client, "/map/new").await;
    assert!(body.contains("multiple"));
    assert!(body.contains(&crypt));
    assert!(body.contains(&tower));

    let (status, _, _) = submit(
        &client,
        "/map/new",
        &format!("mapName=overworld&tasks={}&tasks={}&game=", crypt, tower),
    )
    .await;
    assert_eq!(status, Status::SeeOther);

    let maps = backend.all("maps");
    assert_eq!(maps[0]["tasks"], json!([{ "id": crypt }, { "id": tower }]));
    assert!(maps[0]["game"].is_null());

    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unreachable_references_leave_empty_dropdowns() -> Result<()> {
    let backend = start_backend().await?;
    let client = admin_client(&backend).await?;
    let config_id = backend.seed("room-configs", json!({ "setup": "standard" }));
    backend.fail("room-configs", FailMode::Lists);

    let (status, body) = page(&client, "/room/new").await;
    assert_eq!(status, Status::Ok);
    assert!(body.contains("Failed to load Room Configs: Request failed with status code 500"));
    assert!(!body.contains(&config_id));
    assert!(body.contains("<select id=\"location\" name=\"location\">"));

    let (status, _, body) = submit(
        &client,
        "/room/new",
        &format!("roomName=hall&location={}&name=", config_id),
    )
    .await;
    assert_eq!(status, Status::Ok);
    assert!(body.contains("This entity doesn"));
    assert!(backend.all("rooms").is_empty());

    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unknown_tasks_are_rejected() -> Result<()> {
    let backend = start_backend().await?;
    let client = admin_client(&backend).await?;
    let crypt = backend.seed("dungeons", json!({ "dungeonName": "crypt" }));
    let stranger = uuid::Uuid::new_v4();

    let (status, _, body) = submit(
        &client,
        "/map/new",
        &format!("mapName=overworld&tasks={}&tasks={}&game=", crypt, stranger),
    )
    .await;
    assert_eq!(status, Status::Ok);
    assert!(body.contains("invalid-feedback"));
    assert!(body.contains("value=\"overworld\""));
    assert!(backend.all("maps").is_empty());

    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_missing_pages_redirect() -> Result<()> {
    let backend = start_backend().await?;
    let client = admin_client(&backend).await?;

    let response = client.get("/unicorn").dispatch().await;
    assert_eq!(response.status(), Status::SeeOther);
    assert_eq!(response.headers().get_one("Location"), Some("/"));

    for uri in ["/room/not-an-id", "/room/not-an-id/edit", "/room/not-an-id/delete"] {
        let response = client.get(uri).dispatch().await;
        assert_eq!(response.status(), Status::SeeOther, "{}", uri);
        assert_eq!(response.headers().get_one("Location"), Some("/"), "{}", uri);
    }

    let (_, body) = page(&client, "/").await;
    assert!(body.contains("nothing at /room/not-an-id/delete"));

    let missing = uuid::Uuid::new_v4();
    let response = client.get(format!("/floor/{}", missing)).dispatch().await;
    assert_eq!(response.status(), Status::SeeOther);
    assert_eq!(response.headers().get_one("Location"), Some("/floor"));

    let (_, body) = page(&client, "/floor").await;
    assert!(body.contains(&format!(
        "Failed to load Floor {}: Request failed with status code 404",
        missing
    )));

    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_health_and_metrics() -> Result<()> {
    let backend = start_backend().await?;
    let client = admin_client(&backend).await?;

    let response = client.get("/health").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    let health: serde_json::Value = serde_json::from_str(&response.into_string().await.unwrap())?;
    assert_eq!(health["status"], "healthy");
    assert_eq!(health["backend"], "ok");

    page(&client, "/card").await;
    let (status, body) = page(&client, "/metrics").await;
    assert_eq!(status, Status::Ok);
    assert!(body.contains("backend_requests_count"));

    drop(backend);
    let mut status = Status::Ok;
    for _ in 0..50 {
        status = client.get("/health").dispatch().await.status();
        if status == Status::ServiceUnavailable {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    }
    assert_eq!(status, Status::ServiceUnavailable);

    Ok(())
}
