//! Integration tests for home and room endpoints.

mod common;

use axum::http::{Method, StatusCode};
use common::{
    assign, create_home, create_profile, create_test_app, delete_request_with_auth,
    get_request_with_auth, json_request_with_auth, register_device, room_id, send,
};
use domain::store::{HomeStore, ProfileStore};
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn test_create_and_list_homes() {
    let (app, store) = create_test_app();
    let owner = create_profile(&store).await;

    let home = create_home(&app, &owner, &["living room", "bedroom"]).await;
    assert_eq!(home["name"], "Home");
    assert_eq!(home["location"], "Turin");
    assert_eq!(home["rooms"].as_array().unwrap().len(), 2);
    assert!(home["rooms"][0]["devices"].as_array().unwrap().is_empty());
    assert!(home.get("createdAt").is_some());

    let (status, homes) = send(&app, get_request_with_auth("/api/v1/homes", &owner.token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(homes.as_array().unwrap().len(), 1);
    assert_eq!(homes[0]["id"], home["id"]);

    let profile = store.find_profile(owner.id).await.unwrap().unwrap();
    assert_eq!(profile.home_ids.len(), 1);
}

#[tokio::test]
async fn test_list_homes_only_returns_own_homes() {
    let (app, store) = create_test_app();
    let alice = create_profile(&store).await;
    let bob = create_profile(&store).await;
    create_home(&app, &alice, &[]).await;

    let (status, homes) = send(&app, get_request_with_auth("/api/v1/homes", &bob.token)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(homes.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_create_home_validation() {
    let (app, store) = create_test_app();
    let owner = create_profile(&store).await;

    for body in [
        json!({ "name": "", "location": "Turin" }),
        json!({ "name": "Home", "location": "x".repeat(51) }),
        json!({ "name": "Home", "location": "Turin", "rooms": [{ "name": "attic", "floor": 301 }] }),
        json!({ "location": "Turin" }),
    ] {
        let (status, response) = send(
            &app,
            json_request_with_auth(Method::POST, "/api/v1/homes", body, &owner.token),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response["error"], "validation_error");
    }

    let (_, homes, _) = store.counts().await;
    assert_eq!(homes, 0);
}

#[tokio::test]
async fn test_update_home() {
    let (app, store) = create_test_app();
    let owner = create_profile(&store).await;
    let home = create_home(&app, &owner, &[]).await;
    let uri = format!("/api/v1/homes/{}", home["id"].as_str().unwrap());

    let (status, body) = send(
        &app,
        json_request_with_auth(
            Method::PUT,
            &uri,
            json!({ "name": "Cottage", "location": "Aosta" }),
            &owner.token,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "home has been updated");

    let (_, homes) = send(&app, get_request_with_auth("/api/v1/homes", &owner.token)).await;
    assert_eq!(homes[0]["name"], "Cottage");
    assert_eq!(homes[0]["location"], "Aosta");
}

#[tokio::test]
async fn test_update_home_not_owned() {
    let (app, store) = create_test_app();
    let owner = create_profile(&store).await;
    let other = create_profile(&store).await;
    let home = create_home(&app, &owner, &[]).await;

    let (status, body) = send(
        &app,
        json_request_with_auth(
            Method::PUT,
            &format!("/api/v1/homes/{}", home["id"].as_str().unwrap()),
            json!({ "name": "Mine now", "location": "Elsewhere" }),
            &other.token,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "not_owned");
    assert_eq!(body["message"], "cannot update a home that is not in your profile");

    let stored = store
        .find_home(home["id"].as_str().unwrap().parse().unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.name, "Home");
}

#[tokio::test]
async fn test_delete_home() {
    let (app, store) = create_test_app();
    let owner = create_profile(&store).await;
    let home = create_home(&app, &owner, &["room1"]).await;
    let uri = format!("/api/v1/homes/{}", home["id"].as_str().unwrap());

    let (status, body) = send(&app, delete_request_with_auth(&uri, &owner.token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "home has been deleted");

    let (_, homes) = send(&app, get_request_with_auth("/api/v1/homes", &owner.token)).await;
    assert!(homes.as_array().unwrap().is_empty());
    let (_, home_count, _) = store.counts().await;
    assert_eq!(home_count, 0);

    // A second delete finds the home gone from the profile.
    let (status, body) = send(&app, delete_request_with_auth(&uri, &owner.token)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "not_owned");
}

#[tokio::test]
async fn test_delete_home_keeps_devices() {
    let (app, store) = create_test_app();
    let owner = create_profile(&store).await;
    let home = create_home(&app, &owner, &["room1"]).await;
    let device = register_device(&app, &owner).await;
    let (status, _) = assign(
        &app,
        &owner,
        device["id"].as_str().unwrap(),
        home["id"].as_str().unwrap(),
        &room_id(&home, "room1"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        delete_request_with_auth(
            &format!("/api/v1/homes/{}", home["id"].as_str().unwrap()),
            &owner.token,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, devices) = send(&app, get_request_with_auth("/api/v1/devices", &owner.token)).await;
    assert_eq!(devices.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_delete_home_not_owned() {
    let (app, store) = create_test_app();
    let owner = create_profile(&store).await;
    let other = create_profile(&store).await;
    let home = create_home(&app, &owner, &[]).await;

    let (status, body) = send(
        &app,
        delete_request_with_auth(
            &format!("/api/v1/homes/{}", home["id"].as_str().unwrap()),
            &other.token,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "cannot delete a home that is not in your profile");

    let (_, home_count, _) = store.counts().await;
    assert_eq!(home_count, 1);
}

#[tokio::test]
async fn test_room_lifecycle() {
    let (app, store) = create_test_app();
    let owner = create_profile(&store).await;
    let home = create_home(&app, &owner, &[]).await;
    let rooms_uri = format!("/api/v1/homes/{}/rooms", home["id"].as_str().unwrap());

    let (status, body) = send(
        &app,
        json_request_with_auth(
            Method::POST,
            &rooms_uri,
            json!({ "name": "cellar", "floor": -1 }),
            &owner.token,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "room added to the home");

    let (status, rooms) = send(&app, get_request_with_auth(&rooms_uri, &owner.token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rooms.as_array().unwrap().len(), 1);
    assert_eq!(rooms[0]["floor"], -1);
    let room_uri = format!("{}/{}", rooms_uri, rooms[0]["id"].as_str().unwrap());

    let (status, body) = send(
        &app,
        json_request_with_auth(
            Method::PUT,
            &room_uri,
            json!({ "name": "wine cellar", "floor": -2 }),
            &owner.token,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "room has been updated");

    let (_, rooms) = send(&app, get_request_with_auth(&rooms_uri, &owner.token)).await;
    assert_eq!(rooms[0]["name"], "wine cellar");
    assert_eq!(rooms[0]["floor"], -2);

    let (status, body) = send(&app, delete_request_with_auth(&room_uri, &owner.token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "room has been deleted");

    let (_, rooms) = send(&app, get_request_with_auth(&rooms_uri, &owner.token)).await;
    assert!(rooms.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_update_unknown_room_is_not_found() {
    let (app, store) = create_test_app();
    let owner = create_profile(&store).await;
    let home = create_home(&app, &owner, &["room1"]).await;

    let (status, body) = send(
        &app,
        json_request_with_auth(
            Method::PUT,
            &format!(
                "/api/v1/homes/{}/rooms/{}",
                home["id"].as_str().unwrap(),
                Uuid::new_v4()
            ),
            json!({ "name": "ghost", "floor": 0 }),
            &owner.token,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn test_room_operations_not_owned() {
    let (app, store) = create_test_app();
    let owner = create_profile(&store).await;
    let other = create_profile(&store).await;
    let home = create_home(&app, &owner, &["room1"]).await;
    let rooms_uri = format!("/api/v1/homes/{}/rooms", home["id"].as_str().unwrap());

    let (status, body) = send(&app, get_request_with_auth(&rooms_uri, &other.token)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "not_owned");

    let (status, _) = send(
        &app,
        json_request_with_auth(
            Method::POST,
            &rooms_uri,
            json!({ "name": "intruder", "floor": 0 }),
            &other.token,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        delete_request_with_auth(
            &format!("{}/{}", rooms_uri, room_id(&home, "room1")),
            &other.token,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, rooms) = send(&app, get_request_with_auth(&rooms_uri, &owner.token)).await;
    assert_eq!(rooms.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_list_rooms_of_missing_home_document() {
    let (app, store) = create_test_app();
    let owner = create_profile(&store).await;
    let home = create_home(&app, &owner, &["room1"]).await;
    let home_id: Uuid = home["id"].as_str().unwrap().parse().unwrap();

    // The profile still lists the home but its document is gone.
    store.delete_home(home_id).await.unwrap();

    let (status, body) = send(
        &app,
        get_request_with_auth(&format!("/api/v1/homes/{}/rooms", home_id), &owner.token),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "cannot find rooms for that home");
}

#[tokio::test]
async fn test_malformed_home_id() {
    let (app, store) = create_test_app();
    let owner = create_profile(&store).await;

    let (status, body) = send(
        &app,
        delete_request_with_auth("/api/v1/homes/12345", &owner.token),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
}
