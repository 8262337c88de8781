//! Journey records and handlers.
//!
//! Routes: `journey/{journeyid}/{get,create,delete,set,start,complete}`.
//! Journeys belong to a user and own an ordered list of trips. Starting a
//! journey stamps the clocks and publishes a `JourneyStarted` message;
//! publish failures are logged, never surfaced to the client.

use std::sync::Arc;

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::merge::{apply_field, merge, FieldDescriptor, Kind, Patchable};
use crate::notify::{JourneyStarted, Notifier};
use crate::resources::trip::Trip;
use crate::resources::user::User;
use crate::resources::{endpoint, load_record, save_record, try_load_record, unix_now};
use crate::routing::context::{RequestContext, Response};
use crate::routing::filter::Filters;
use crate::routing::middleware::Stack;
use crate::routing::tree::Group;
use crate::store::EntityStore;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Journey {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub start_at: i64,
    pub finished_at: i64,
    pub trips: Vec<String>,
    pub latest_trip: String,
    pub finished: bool,
}

/// Partial journey update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct JourneyPatch {
    pub id: Option<String>,
    pub user_id: Option<String>,
    pub name: Option<String>,
    pub start_at: Option<i64>,
    pub finished_at: Option<i64>,
    pub trips: Option<Vec<String>>,
    pub latest_trip: Option<String>,
    pub finished: Option<bool>,
}

impl Patchable for Journey {
    type Patch = JourneyPatch;

    fn kind() -> Kind {
        Kind::Journey
    }

    fn fields() -> &'static [FieldDescriptor<Journey, JourneyPatch>] {
        const FIELDS: &[FieldDescriptor<Journey, JourneyPatch>] = &[
            FieldDescriptor {
                name: "id",
                identity: true,
                apply: |_, p| p.id.is_some(),
            },
            FieldDescriptor {
                name: "user_id",
                identity: false,
                apply: |r, p| apply_field(&mut r.user_id, &p.user_id),
            },
            FieldDescriptor {
                name: "name",
                identity: false,
                apply: |r, p| apply_field(&mut r.name, &p.name),
            },
            FieldDescriptor {
                name: "start_at",
                identity: false,
                apply: |r, p| apply_field(&mut r.start_at, &p.start_at),
            },
            FieldDescriptor {
                name: "finished_at",
                identity: false,
                apply: |r, p| apply_field(&mut r.finished_at, &p.finished_at),
            },
            FieldDescriptor {
                name: "trips",
                identity: false,
                apply: |r, p| apply_field(&mut r.trips, &p.trips),
            },
            FieldDescriptor {
                name: "latest_trip",
                identity: false,
                apply: |r, p| apply_field(&mut r.latest_trip, &p.latest_trip),
            },
            FieldDescriptor {
                name: "finished",
                identity: false,
                apply: |r, p| apply_field(&mut r.finished, &p.finished),
            },
        ];
        FIELDS
    }
}

#[derive(Clone)]
pub struct JourneyManager {
    store: Arc<dyn EntityStore>,
    notifier: Arc<dyn Notifier>,
    channel: String,
}

impl JourneyManager {
    pub fn new(store: Arc<dyn EntityStore>, notifier: Arc<dyn Notifier>, channel: String) -> Self {
        Self {
            store,
            notifier,
            channel,
        }
    }

    /// The journey subtree, mounted by the server under `journey/`.
    pub fn group(&self, guards: &Filters, stack: &Stack) -> Group {
        Group::new().child(
            "{journeyid}/",
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
        let id = ctx.require_param("journeyid")?;
        let journey: Journey = load_record(self.store.as_ref(), &id).await?;
        Ok(Response::json(StatusCode::OK, &journey))
    }

    /// Create a journey and register it on its owning user.
    async fn create(self, ctx: RequestContext) -> Result<Response, ApiError> {
        let id = ctx.require_param("journeyid")?;
        if try_load_record::<Journey>(self.store.as_ref(), &id)
            .await?
            .is_some()
        {
            return Err(ApiError::AlreadyExists(Kind::Journey));
        }

        let mut journey: Journey = ctx.decode()?;
        journey.id = id.clone();

        let mut user: User = load_record(self.store.as_ref(), &journey.user_id).await?;
        user.journeys.push(journey.id.clone());

        save_record(self.store.as_ref(), &id, &journey).await?;
        save_record(self.store.as_ref(), &user.id, &user).await?;
        Ok(Response::json(StatusCode::OK, &journey))
    }

    async fn delete(self, ctx: RequestContext) -> Result<Response, ApiError> {
        let id = ctx.require_param("journeyid")?;
        if !self.store.delete(Kind::Journey, &id).await? {
            return Err(ApiError::NotFound(Kind::Journey));
        }
        Ok(Response::success())
    }

    async fn set(self, ctx: RequestContext) -> Result<Response, ApiError> {
        let id = ctx.require_param("journeyid")?;
        let current: Journey = load_record(self.store.as_ref(), &id).await?;
        let patch: JourneyPatch = ctx.decode()?;
        let updated = merge(&current, &patch)?;
        save_record(self.store.as_ref(), &id, &updated).await?;
        Ok(Response::json(StatusCode::OK, &updated))
    }

    /// Stamp the journey start, mark it current on the user, open its
    /// latest trip and announce the start on the notifier channel.
    async fn start(self, ctx: RequestContext) -> Result<Response, ApiError> {
        let id = ctx.require_param("journeyid")?;
        let mut journey: Journey = load_record(self.store.as_ref(), &id).await?;
        let mut user: User = load_record(self.store.as_ref(), &journey.user_id).await?;
        let mut trip: Trip = load_record(self.store.as_ref(), &journey.latest_trip).await?;

        let now = unix_now();
        user.latest_journey = journey.id.clone();
        trip.left_at = now;
        journey.start_at = now;

        self.announce_start(&user, &journey).await;

        save_record(self.store.as_ref(), &trip.id, &trip).await?;
        save_record(self.store.as_ref(), &id, &journey).await?;
        save_record(self.store.as_ref(), &user.id, &user).await?;
        Ok(Response::json(StatusCode::OK, &journey))
    }

    async fn complete(self, ctx: RequestContext) -> Result<Response, ApiError> {
        let id = ctx.require_param("journeyid")?;
        let mut journey: Journey = load_record(self.store.as_ref(), &id).await?;
        journey.finished = true;
        save_record(self.store.as_ref(), &id, &journey).await?;
        Ok(Response::json(StatusCode::OK, &journey))
    }

    /// Fire-and-forget publish; failures are logged, never propagated.
    async fn announce_start(&self, user: &User, journey: &Journey) {
        let message = JourneyStarted {
            user_id: user.id.clone(),
            journey_id: journey.id.clone(),
        };
        let payload = match serde_json::to_value(&message) {
            Ok(payload) => payload,
            Err(err) => {
                tracing::error!(error = %err, "journey start message encoding failed");
                return;
            }
        };
        match self.notifier.publish(&self.channel, payload).await {
            Ok(()) => tracing::info!(
                journey_id = %journey.id,
                channel = %self.channel,
                "journey start published"
            ),
            Err(err) => tracing::warn!(
                journey_id = %journey.id,
                error = %err,
                "journey start publish failed"
            ),
        }
    }
}
