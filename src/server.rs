//! Server composition.
//!
//! # Responsibilities
//! - Hold named handles to each resource manager and the shared
//!   collaborators (entity store, notifier)
//! - Declare the route tree, compile it once, and serve it
//!
//! # Design Decisions
//! - Explicit composition: managers receive their collaborators by
//!   `Arc` handle at construction, nothing is embedded or inherited
//! - The compiled router is immutable while serving
//! - tower-http layers (trace, timeout) wrap the whole router

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::schema::AppConfig;
use crate::notify::{HttpNotifier, Notifier, NullNotifier};
use crate::resources::{JourneyManager, RoomManager, TripManager, UserManager};
use crate::routing::builder::{build, into_router, BuildError};
use crate::routing::filter::Filters;
use crate::routing::middleware::{self, Stack};
use crate::routing::tree::{Group, RouteNode};
use crate::routing::RequireHeader;
use crate::store::{EntityStore, MemoryStore};

/// The composed backend: configuration, collaborators, managers.
pub struct Server {
    config: AppConfig,
    users: UserManager,
    journeys: JourneyManager,
    trips: TripManager,
    rooms: RoomManager,
}

impl Server {
    /// Compose a server with the default collaborators: the in-memory
    /// store and the configured notifier (or a no-op one when disabled).
    pub fn new(config: AppConfig) -> Self {
        let store: Arc<dyn EntityStore> = Arc::new(MemoryStore::new());
        let notifier: Arc<dyn Notifier> = if config.notifier.enabled {
            match HttpNotifier::new(&config.notifier) {
                Ok(notifier) => Arc::new(notifier),
                Err(err) => {
                    tracing::error!(error = %err, "notifier setup failed, publishing disabled");
                    Arc::new(NullNotifier)
                }
            }
        } else {
            Arc::new(NullNotifier)
        };
        Self::with_collaborators(config, store, notifier)
    }

    /// Compose a server around externally supplied collaborators.
    pub fn with_collaborators(
        config: AppConfig,
        store: Arc<dyn EntityStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let channel = config.notifier.channel.clone();
        Self {
            users: UserManager::new(store.clone()),
            journeys: JourneyManager::new(store.clone(), notifier, channel),
            trips: TripManager::new(store.clone()),
            rooms: RoomManager::new(store),
            config,
        }
    }

    /// Declare the full route tree: one subtree per resource, every
    /// endpoint guarded by the configured filters and wrapped in the
    /// request-id and logging middleware.
    pub fn route_tree(&self) -> RouteNode {
        let guards: Filters = match &self.config.api_key {
            Some(key) => vec![Arc::new(RequireHeader::new("x-api-key", key.clone()))],
            None => Filters::new(),
        };
        let stack: Stack = vec![middleware::request_id(), middleware::request_log()];

        Group::new()
            .child("user/", self.users.group(&guards, &stack))
            .child("journey/", self.journeys.group(&guards, &stack))
            .child("trip/", self.trips.group(&guards, &stack))
            .child("room/", self.rooms.group(&guards, &stack))
            .into()
    }

    /// Compile the route tree into the servable axum router.
    pub fn router(&self) -> Result<Router, BuildError> {
        let routes = build(&self.route_tree(), "")?;
        tracing::info!(routes = routes.len(), "route tree compiled");

        let router = into_router(routes)
            .layer(TimeoutLayer::new(Duration::from_secs(
                self.config.listener.request_timeout_secs,
            )))
            .layer(TraceLayer::new_for_http());
        Ok(router)
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let router = self
            .router()
            .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidInput, err))?;

        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, router).await
    }
}
