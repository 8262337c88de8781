//! Room records and handlers.
//!
//! Routes: `room/{roomid}/{get,create,delete,set}`.
//! Rooms carry a shallow-nested pose; the pose is patched as a whole.

use std::sync::Arc;

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::merge::{apply_field, merge, FieldDescriptor, Kind, Patchable};
use crate::resources::{endpoint, load_record, save_record, try_load_record};
use crate::routing::context::{RequestContext, Response};
use crate::routing::filter::Filters;
use crate::routing::middleware::Stack;
use crate::routing::tree::Group;
use crate::store::EntityStore;

/// Room position: floor plus in-floor coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Pose {
    #[serde(rename = "z")]
    pub floor: i64,
    pub x: i64,
    pub y: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Room {
    pub id: String,
    pub name: String,
    pub description: String,
    pub pose: Pose,
}

/// Partial room update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomPatch {
    pub id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub pose: Option<Pose>,
}

impl Patchable for Room {
    type Patch = RoomPatch;

    fn kind() -> Kind {
        Kind::Room
    }

    fn fields() -> &'static [FieldDescriptor<Room, RoomPatch>] {
        const FIELDS: &[FieldDescriptor<Room, RoomPatch>] = &[
            FieldDescriptor {
                name: "id",
                identity: true,
                apply: |_, p| p.id.is_some(),
            },
            FieldDescriptor {
                name: "name",
                identity: false,
                apply: |r, p| apply_field(&mut r.name, &p.name),
            },
            FieldDescriptor {
                name: "description",
                identity: false,
                apply: |r, p| apply_field(&mut r.description, &p.description),
            },
            FieldDescriptor {
                name: "pose",
                identity: false,
                apply: |r, p| apply_field(&mut r.pose, &p.pose),
            },
        ];
        FIELDS
    }
}

#[derive(Clone)]
pub struct RoomManager {
    store: Arc<dyn EntityStore>,
}

impl RoomManager {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    /// The room subtree, mounted by the server under `room/`.
    pub fn group(&self, guards: &Filters, stack: &Stack) -> Group {
        Group::new().child(
            "{roomid}/",
            Group::new()
                .child(
                    "get",
                    endpoint(self, Self::get).guard_all(guards).wrap_all(stack),
                )
                .child(
                    "create",
                    endpoint(self, Self::create)
                        .guard_all(guards)
                        .wrap_all(stack),
                )
                .child(
                    "delete",
                    endpoint(self, Self::delete)
                        .guard_all(guards)
                        .wrap_all(stack),
                )
                .child(
                    "set",
                    endpoint(self, Self::set).guard_all(guards).wrap_all(stack),
                ),
        )
    }

    async fn get(self, ctx: RequestContext) -> Result<Response, ApiError> {
        let id = ctx.require_param("roomid")?;
        let room: Room = load_record(self.store.as_ref(), &id).await?;
        Ok(Response::json(StatusCode::OK, &room))
    }

    async fn create(self, ctx: RequestContext) -> Result<Response, ApiError> {
        let id = ctx.require_param("roomid")?;
        if try_load_record::<Room>(self.store.as_ref(), &id)
            .await?
            .is_some()
        {
            return Err(ApiError::AlreadyExists(Kind::Room));
        }

        let mut room: Room = ctx.decode()?;
        room.id = id.clone();
        save_record(self.store.as_ref(), &id, &room).await?;
        Ok(Response::json(StatusCode::OK, &room))
    }

    async fn delete(self, ctx: RequestContext) -> Result<Response, ApiError> {
        let id = ctx.require_param("roomid")?;
        if !self.store.delete(Kind::Room, &id).await? {
            return Err(ApiError::NotFound(Kind::Room));
        }
        Ok(Response::success())
    }

    async fn set(self, ctx: RequestContext) -> Result<Response, ApiError> {
        let id = ctx.require_param("roomid")?;
        let current: Room = load_record(self.store.as_ref(), &id).await?;
        let patch: RoomPatch = ctx.decode()?;
        let updated = merge(&current, &patch)?;
        save_record(self.store.as_ref(), &id, &updated).await?;
        Ok(Response::json(StatusCode::OK, &updated))
    }
}
