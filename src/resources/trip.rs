//! Trip records and handlers.
//!
//! Routes: `trip/{tripid}/{get,create,delete,set,start,complete}`.
//! Trips belong to a journey and move between two rooms; completing the
//! last trip of a journey finishes the journey.

use std::sync::Arc;

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::merge::{apply_field, merge, FieldDescriptor, Kind, Patchable};
use crate::resources::journey::Journey;
use crate::resources::{endpoint, load_record, save_record, try_load_record, unix_now};
use crate::routing::context::{RequestContext, Response};
use crate::routing::filter::Filters;
use crate::routing::middleware::Stack;
use crate::routing::tree::Group;
use crate::store::EntityStore;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Trip {
    pub id: String,
    pub journey_id: String,
    pub description: String,
    #[serde(rename = "start")]
    pub start_room: String,
    #[serde(rename = "end")]
    pub end_room: String,
    pub success: bool,
    pub left_at: i64,
    pub arrived_at: i64,
}

/// Partial trip update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TripPatch {
    pub id: Option<String>,
    pub journey_id: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "start")]
    pub start_room: Option<String>,
    #[serde(rename = "end")]
    pub end_room: Option<String>,
    pub success: Option<bool>,
    pub left_at: Option<i64>,
    pub arrived_at: Option<i64>,
}

impl Patchable for Trip {
    type Patch = TripPatch;

    fn kind() -> Kind {
        Kind::Trip
    }

    fn fields() -> &'static [FieldDescriptor<Trip, TripPatch>] {
        const FIELDS: &[FieldDescriptor<Trip, TripPatch>] = &[
            FieldDescriptor {
                name: "id",
                identity: true,
                apply: |_, p| p.id.is_some(),
            },
            FieldDescriptor {
                name: "journey_id",
                identity: false,
                apply: |r, p| apply_field(&mut r.journey_id, &p.journey_id),
            },
            FieldDescriptor {
                name: "description",
                identity: false,
                apply: |r, p| apply_field(&mut r.description, &p.description),
            },
            FieldDescriptor {
                name: "start",
                identity: false,
                apply: |r, p| apply_field(&mut r.start_room, &p.start_room),
            },
            FieldDescriptor {
                name: "end",
                identity: false,
                apply: |r, p| apply_field(&mut r.end_room, &p.end_room),
            },
            FieldDescriptor {
                name: "success",
                identity: false,
                apply: |r, p| apply_field(&mut r.success, &p.success),
            },
            FieldDescriptor {
                name: "left_at",
                identity: false,
                apply: |r, p| apply_field(&mut r.left_at, &p.left_at),
            },
            FieldDescriptor {
                name: "arrived_at",
                identity: false,
                apply: |r, p| apply_field(&mut r.arrived_at, &p.arrived_at),
            },
        ];
        FIELDS
    }
}

#[derive(Clone)]
pub struct TripManager {
    store: Arc<dyn EntityStore>,
}

impl TripManager {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    /// The trip subtree, mounted by the server under `trip/`.
    pub fn group(&self, guards: &Filters, stack: &Stack) -> Group {
        Group::new().child(
            "{tripid}/",
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
                )
                .child(
                    "start",
                    endpoint(self, Self::start)
                        .guard_all(guards)
                        .wrap_all(stack),
                )
                .child(
                    "complete",
                    endpoint(self, Self::complete)
                        .guard_all(guards)
                        .wrap_all(stack),
                ),
        )
    }

    async fn get(self, ctx: RequestContext) -> Result<Response, ApiError> {
        let id = ctx.require_param("tripid")?;
        let trip: Trip = load_record(self.store.as_ref(), &id).await?;
        Ok(Response::json(StatusCode::OK, &trip))
    }

    /// Create a trip and register it on its owning journey.
    async fn create(self, ctx: RequestContext) -> Result<Response, ApiError> {
        let id = ctx.require_param("tripid")?;
        if try_load_record::<Trip>(self.store.as_ref(), &id)
            .await?
            .is_some()
        {
            return Err(ApiError::AlreadyExists(Kind::Trip));
        }

        let mut trip: Trip = ctx.decode()?;
        trip.id = id.clone();

        let mut journey: Journey = load_record(self.store.as_ref(), &trip.journey_id).await?;
        journey.trips.push(trip.id.clone());

        save_record(self.store.as_ref(), &id, &trip).await?;
        save_record(self.store.as_ref(), &journey.id, &journey).await?;
        Ok(Response::json(StatusCode::OK, &trip))
    }

    async fn delete(self, ctx: RequestContext) -> Result<Response, ApiError> {
        let id = ctx.require_param("tripid")?;
        if !self.store.delete(Kind::Trip, &id).await? {
            return Err(ApiError::NotFound(Kind::Trip));
        }
        Ok(Response::success())
    }

    async fn set(self, ctx: RequestContext) -> Result<Response, ApiError> {
        let id = ctx.require_param("tripid")?;
        let current: Trip = load_record(self.store.as_ref(), &id).await?;
        let patch: TripPatch = ctx.decode()?;
        let updated = merge(&current, &patch)?;
        save_record(self.store.as_ref(), &id, &updated).await?;
        Ok(Response::json(StatusCode::OK, &updated))
    }

    /// Stamp the departure and mark this trip current on its journey.
    async fn start(self, ctx: RequestContext) -> Result<Response, ApiError> {
        let id = ctx.require_param("tripid")?;
        let mut trip: Trip = load_record(self.store.as_ref(), &id).await?;
        let mut journey: Journey = load_record(self.store.as_ref(), &trip.journey_id).await?;

        journey.latest_trip = trip.id.clone();
        trip.left_at = unix_now();

        save_record(self.store.as_ref(), &id, &trip).await?;
        save_record(self.store.as_ref(), &journey.id, &journey).await?;
        Ok(Response::json(StatusCode::OK, &trip))
    }

    /// Stamp the arrival; completing the journey's last trip finishes
    /// the journey.
    async fn complete(self, ctx: RequestContext) -> Result<Response, ApiError> {
        let id = ctx.require_param("tripid")?;
        let mut trip: Trip = load_record(self.store.as_ref(), &id).await?;
        let mut journey: Journey = load_record(self.store.as_ref(), &trip.journey_id).await?;

        if journey.trips.last() == Some(&trip.id) {
            journey.finished = true;
            save_record(self.store.as_ref(), &journey.id, &journey).await?;
        }

        trip.arrived_at = unix_now();
        trip.success = true;
        save_record(self.store.as_ref(), &id, &trip).await?;
        Ok(Response::json(StatusCode::OK, &trip))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Bytes;

    use crate::store::MemoryStore;

    fn ctx(id: &str, body: &str) -> RequestContext {
        RequestContext {
            params: [("tripid".to_string(), id.to_string())].into(),
            body: Bytes::from(body.to_string()),
            ..RequestContext::default()
        }
    }

    async fn seeded() -> TripManager {
        let store = Arc::new(MemoryStore::new());
        save_record(
            store.as_ref(),
            "j1",
            &Journey {
                id: "j1".into(),
                trips: vec!["t1".into(), "t2".into()],
                ..Journey::default()
            },
        )
        .await
        .unwrap();
        for trip_id in ["t1", "t2"] {
            save_record(
                store.as_ref(),
                trip_id,
                &Trip {
                    id: trip_id.into(),
                    journey_id: "j1".into(),
                    ..Trip::default()
                },
            )
            .await
            .unwrap();
        }
        TripManager::new(store)
    }

    #[tokio::test]
    async fn room_names_use_wire_aliases() {
        let manager = seeded().await;
        manager
            .clone()
            .set(ctx("t1", r#"{"start":"lobby","end":"lab"}"#))
            .await
            .unwrap();

        let trip: Trip = load_record(manager.store.as_ref(), "t1").await.unwrap();
        assert_eq!(trip.start_room, "lobby");
        assert_eq!(trip.end_room, "lab");
    }

    #[tokio::test]
    async fn create_registers_trip_on_journey() {
        let manager = seeded().await;
        manager
            .clone()
            .create(ctx("t3", r#"{"journey_id":"j1"}"#))
            .await
            .unwrap();

        let journey: Journey = load_record(manager.store.as_ref(), "j1").await.unwrap();
        assert_eq!(journey.trips.last().map(String::as_str), Some("t3"));
    }

    #[tokio::test]
    async fn completing_last_trip_finishes_journey() {
        let manager = seeded().await;

        manager.clone().complete(ctx("t1", "")).await.unwrap();
        let journey: Journey = load_record(manager.store.as_ref(), "j1").await.unwrap();
        assert!(!journey.finished);

        manager.clone().complete(ctx("t2", "")).await.unwrap();
        let journey: Journey = load_record(manager.store.as_ref(), "j1").await.unwrap();
        assert!(journey.finished);

        let trip: Trip = load_record(manager.store.as_ref(), "t2").await.unwrap();
        assert!(trip.success);
        assert!(trip.arrived_at > 0);
    }

    #[tokio::test]
    async fn start_marks_trip_current_on_journey() {
        let manager = seeded().await;
        manager.clone().start(ctx("t2", "")).await.unwrap();

        let journey: Journey = load_record(manager.store.as_ref(), "j1").await.unwrap();
        assert_eq!(journey.latest_trip, "t2");
        let trip: Trip = load_record(manager.store.as_ref(), "t2").await.unwrap();
        assert!(trip.left_at > 0);
    }
}
