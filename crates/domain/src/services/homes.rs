//! Home and room lifecycle.
//!
//! None of these operations touch placement. Deleting a home or a room drops
//! the placements recorded in it along with the document.

use chrono::Utc;
use shared::ids::parse_resource_id;
use tracing::info;
use uuid::Uuid;

use crate::error::ServiceError;
use crate::models::home::{
    CreateHomeRequest, CreateRoomRequest, UpdateHomeRequest, UpdateRoomRequest,
};
use crate::models::{Home, Room};
use crate::services::guard::{AuthorizationGuard, Resource};
use crate::services::orphan::record_orphan_write;
use crate::store::{HomeStore, ProfileStore};

pub const HOME_UPDATED: &str = "home has been updated";
pub const HOME_DELETED: &str = "home has been deleted";
pub const ROOM_ADDED: &str = "room added to the home";
pub const ROOM_UPDATED: &str = "room has been updated";
pub const ROOM_DELETED: &str = "room has been deleted";

fn not_owned(action: &'static str) -> impl FnOnce(Resource) -> ServiceError {
    move |_| {
        ServiceError::NotOwned(format!(
            "cannot {} a home that is not in your profile",
            action
        ))
    }
}

fn room_missing() -> ServiceError {
    ServiceError::NotFound("room not found".into())
}

pub struct HomeService<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S> HomeService<'a, S>
where
    S: ProfileStore + HomeStore + ?Sized,
{
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    fn guard(&self) -> AuthorizationGuard<'a, S> {
        AuthorizationGuard::new(self.store)
    }

    /// Homes in the caller's home set.
    pub async fn list(&self, profile_id: Uuid) -> Result<Vec<Home>, ServiceError> {
        let profile = self.guard().resolve_profile(profile_id).await?;
        Ok(self.store.find_homes(&profile.home_ids).await?)
    }

    /// Inserts the home, then appends its id to the caller's home set.
    pub async fn create(
        &self,
        profile_id: Uuid,
        request: CreateHomeRequest,
    ) -> Result<Home, ServiceError> {
        let profile = self.guard().resolve_profile(profile_id).await?;
        let home = request.into_home(Utc::now());

        self.store.insert_home(&home).await?;
        if let Err(err) = self.store.add_home_to_profile(profile.id, home.id).await {
            record_orphan_write("create_home", home.id, &err);
        }

        info!(
            profile_id = %profile.id,
            home_id = %home.id,
            rooms = home.rooms.len(),
            "Home created"
        );
        Ok(home)
    }

    pub async fn update(
        &self,
        profile_id: Uuid,
        home_id: &str,
        request: &UpdateHomeRequest,
    ) -> Result<(), ServiceError> {
        let home_id = parse_resource_id(home_id, "homeId")?;

        let denied = not_owned("update");
        self.guard()
            .guarded(profile_id, Resource::Home(home_id), denied, || async move {
                let updated = self
                    .store
                    .update_home_fields(home_id, &request.name, &request.location, Utc::now())
                    .await?;
                if !updated {
                    return Err(ServiceError::NotFound("home not found".into()));
                }
                Ok(())
            })
            .await
    }

    /// Strips the id from the caller's home set, then deletes the document.
    pub async fn delete(&self, profile_id: Uuid, home_id: &str) -> Result<(), ServiceError> {
        let home_id = parse_resource_id(home_id, "homeId")?;

        let denied = not_owned("delete");
        self.guard()
            .guarded(profile_id, Resource::Home(home_id), denied, || async move {
                self.store.remove_home_from_profile(profile_id, home_id).await?;
                if let Err(err) = self.store.delete_home(home_id).await {
                    record_orphan_write("delete_home", home_id, &err);
                }
                info!(profile_id = %profile_id, home_id = %home_id, "Home deleted");
                Ok(())
            })
            .await
    }

    pub async fn list_rooms(
        &self,
        profile_id: Uuid,
        home_id: &str,
    ) -> Result<Vec<Room>, ServiceError> {
        let home_id = parse_resource_id(home_id, "homeId")?;

        let denied = not_owned("get rooms of");
        self.guard()
            .guarded(profile_id, Resource::Home(home_id), denied, || async move {
                match self.store.find_home(home_id).await? {
                    Some(home) => Ok(home.rooms),
                    None => Err(ServiceError::NotFound("cannot find rooms for that home".into())),
                }
            })
            .await
    }

    pub async fn add_room(
        &self,
        profile_id: Uuid,
        home_id: &str,
        request: CreateRoomRequest,
    ) -> Result<Room, ServiceError> {
        let home_id = parse_resource_id(home_id, "homeId")?;

        let denied = not_owned("create a room in");
        self.guard()
            .guarded(profile_id, Resource::Home(home_id), denied, || async move {
                let room = Room::new(request.name, request.floor, Utc::now());
                if !self.store.push_room(home_id, &room).await? {
                    return Err(ServiceError::NotFound("cannot find home".into()));
                }
                Ok(room)
            })
            .await
    }

    pub async fn update_room(
        &self,
        profile_id: Uuid,
        home_id: &str,
        room_id: &str,
        request: &UpdateRoomRequest,
    ) -> Result<(), ServiceError> {
        let home_id = parse_resource_id(home_id, "homeId")?;
        let room_id = parse_resource_id(room_id, "roomId")?;

        let denied = not_owned("update a room in");
        self.guard()
            .guarded(profile_id, Resource::Home(home_id), denied, || async move {
                let updated = self
                    .store
                    .update_room_fields(home_id, room_id, &request.name, request.floor, Utc::now())
                    .await?;
                if !updated {
                    return Err(room_missing());
                }
                Ok(())
            })
            .await
    }

    pub async fn delete_room(
        &self,
        profile_id: Uuid,
        home_id: &str,
        room_id: &str,
    ) -> Result<(), ServiceError> {
        let home_id = parse_resource_id(home_id, "homeId")?;
        let room_id = parse_resource_id(room_id, "roomId")?;

        let denied = not_owned("delete a room in");
        self.guard()
            .guarded(profile_id, Resource::Home(home_id), denied, || async move {
                if !self.store.remove_room(home_id, room_id, Utc::now()).await? {
                    return Err(room_missing());
                }
                Ok(())
            })
            .await
    }
}
