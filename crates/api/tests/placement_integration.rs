//! Integration tests for device placement (PUT /api/v1/devices/:device_id).

mod common;

use axum::http::{Method, StatusCode};
use common::{
    assign, create_home, create_profile, create_test_app, json_request, register_device,
    room_id, rooms_holding, send,
};
use serde_json::json;

#[tokio::test]
async fn test_assign_then_move_between_rooms() {
    let (app, store) = create_test_app();
    let owner = create_profile(&store).await;
    let home = create_home(&app, &owner, &["room1", "room2"]).await;
    let device = register_device(&app, &owner).await;

    let home_id = home["id"].as_str().unwrap();
    let device_id = device["id"].as_str().unwrap();
    let room1 = room_id(&home, "room1");
    let room2 = room_id(&home, "room2");

    let (status, body) = assign(&app, &owner, device_id, home_id, &room1).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "device has been assigned to room");
    assert_eq!(rooms_holding(&app, &owner, home_id, device_id).await, vec!["room1"]);

    let (status, _) = assign(&app, &owner, device_id, home_id, &room2).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rooms_holding(&app, &owner, home_id, device_id).await, vec!["room2"]);
}

#[tokio::test]
async fn test_assign_is_idempotent() {
    let (app, store) = create_test_app();
    let owner = create_profile(&store).await;
    let home = create_home(&app, &owner, &["kitchen"]).await;
    let device = register_device(&app, &owner).await;

    let home_id = home["id"].as_str().unwrap();
    let device_id = device["id"].as_str().unwrap();
    let kitchen = room_id(&home, "kitchen");

    for _ in 0..2 {
        let (status, _) = assign(&app, &owner, device_id, home_id, &kitchen).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, rooms) = send(
        &app,
        common::get_request_with_auth(&format!("/api/v1/homes/{}/rooms", home_id), &owner.token),
    )
    .await;
    assert_eq!(rooms[0]["devices"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_assign_moves_device_across_homes() {
    let (app, store) = create_test_app();
    let owner = create_profile(&store).await;
    let first = create_home(&app, &owner, &["office"]).await;
    let second = create_home(&app, &owner, &["garage"]).await;
    let device = register_device(&app, &owner).await;

    let device_id = device["id"].as_str().unwrap();
    let first_id = first["id"].as_str().unwrap();
    let second_id = second["id"].as_str().unwrap();

    let (status, _) = assign(&app, &owner, device_id, first_id, &room_id(&first, "office")).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) =
        assign(&app, &owner, device_id, second_id, &room_id(&second, "garage")).await;
    assert_eq!(status, StatusCode::OK);

    assert!(rooms_holding(&app, &owner, first_id, device_id).await.is_empty());
    assert_eq!(
        rooms_holding(&app, &owner, second_id, device_id).await,
        vec!["garage"]
    );
}

#[tokio::test]
async fn test_assign_requires_authentication() {
    let (app, store) = create_test_app();
    let owner = create_profile(&store).await;
    let home = create_home(&app, &owner, &["room1"]).await;
    let device = register_device(&app, &owner).await;

    let (status, body) = send(
        &app,
        json_request(
            Method::PUT,
            &format!("/api/v1/devices/{}", device["id"].as_str().unwrap()),
            json!({ "homeId": home["id"], "roomId": room_id(&home, "room1") }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");
}

#[tokio::test]
async fn test_assign_device_of_another_profile_is_denied() {
    let (app, store) = create_test_app();
    let owner = create_profile(&store).await;
    let intruder = create_profile(&store).await;
    let device = register_device(&app, &owner).await;
    let intruder_home = create_home(&app, &intruder, &["den"]).await;

    let device_id = device["id"].as_str().unwrap();
    let home_id = intruder_home["id"].as_str().unwrap();
    let (status, body) =
        assign(&app, &intruder, device_id, home_id, &room_id(&intruder_home, "den")).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");
    assert!(rooms_holding(&app, &intruder, home_id, device_id).await.is_empty());
}

#[tokio::test]
async fn test_assign_into_home_of_another_profile_is_denied() {
    let (app, store) = create_test_app();
    let owner = create_profile(&store).await;
    let neighbour = create_profile(&store).await;
    let device = register_device(&app, &owner).await;
    let neighbour_home = create_home(&app, &neighbour, &["hall"]).await;

    let home_id = neighbour_home["id"].as_str().unwrap();
    let device_id = device["id"].as_str().unwrap();
    let (status, _) =
        assign(&app, &owner, device_id, home_id, &room_id(&neighbour_home, "hall")).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(rooms_holding(&app, &neighbour, home_id, device_id).await.is_empty());
}

#[tokio::test]
async fn test_assign_unknown_room_is_not_found_and_keeps_placement() {
    let (app, store) = create_test_app();
    let owner = create_profile(&store).await;
    let home = create_home(&app, &owner, &["room1"]).await;
    let device = register_device(&app, &owner).await;

    let home_id = home["id"].as_str().unwrap();
    let device_id = device["id"].as_str().unwrap();
    let (status, _) = assign(&app, &owner, device_id, home_id, &room_id(&home, "room1")).await;
    assert_eq!(status, StatusCode::OK);

    let missing_room = uuid::Uuid::new_v4().to_string();
    let (status, body) = assign(&app, &owner, device_id, home_id, &missing_room).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], format!("Cannot find room id = {}", missing_room));

    // The failed request did not strip the existing placement.
    assert_eq!(rooms_holding(&app, &owner, home_id, device_id).await, vec!["room1"]);
}

#[tokio::test]
async fn test_assign_malformed_ids() {
    let (app, store) = create_test_app();
    let owner = create_profile(&store).await;
    let home = create_home(&app, &owner, &["room1"]).await;
    let device = register_device(&app, &owner).await;

    let home_id = home["id"].as_str().unwrap();
    let device_id = device["id"].as_str().unwrap();
    let room1 = room_id(&home, "room1");

    for (device, home, room) in [
        ("not-an-id", home_id, room1.as_str()),
        (device_id, "not-an-id", room1.as_str()),
        (device_id, home_id, "not-an-id"),
    ] {
        let (status, body) = assign(&app, &owner, device, home, room).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "validation_error");
    }
}

#[tokio::test]
async fn test_assign_rejects_missing_body_fields() {
    let (app, store) = create_test_app();
    let owner = create_profile(&store).await;
    let device = register_device(&app, &owner).await;

    let (status, body) = send(
        &app,
        common::json_request_with_auth(
            Method::PUT,
            &format!("/api/v1/devices/{}", device["id"].as_str().unwrap()),
            json!({ "homeId": uuid::Uuid::new_v4() }),
            &owner.token,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn test_assign_store_outage_is_service_unavailable() {
    let (app, store) = create_test_app();
    let owner = create_profile(&store).await;
    let home = create_home(&app, &owner, &["room1"]).await;
    let device = register_device(&app, &owner).await;

    store.fail_on("pull_device_from_rooms").await;
    let (status, body) = assign(
        &app,
        &owner,
        device["id"].as_str().unwrap(),
        home["id"].as_str().unwrap(),
        &room_id(&home, "room1"),
    )
    .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "service_unavailable");
}
