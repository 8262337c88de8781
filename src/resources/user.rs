//! User records and handlers.
//!
//! Routes: `user/{userid}/{get,create,delete,set}`.

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

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct User {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub description: String,
    pub likes: Vec<String>,
    pub grade: i64,
    pub journeys: Vec<String>,
    pub latest_journey: String,
}

/// Partial user update. Every field is explicitly present or absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UserPatch {
    pub id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub description: Option<String>,
    pub likes: Option<Vec<String>>,
    pub grade: Option<i64>,
    pub journeys: Option<Vec<String>>,
    pub latest_journey: Option<String>,
}

impl Patchable for User {
    type Patch = UserPatch;

    fn kind() -> Kind {
        Kind::User
    }

    fn fields() -> &'static [FieldDescriptor<User, UserPatch>] {
        const FIELDS: &[FieldDescriptor<User, UserPatch>] = &[
            FieldDescriptor {
                name: "id",
                identity: true,
                apply: |_, p| p.id.is_some(),
            },
            FieldDescriptor {
                name: "first_name",
                identity: false,
                apply: |r, p| apply_field(&mut r.first_name, &p.first_name),
            },
            FieldDescriptor {
                name: "last_name",
                identity: false,
                apply: |r, p| apply_field(&mut r.last_name, &p.last_name),
            },
            FieldDescriptor {
                name: "description",
                identity: false,
                apply: |r, p| apply_field(&mut r.description, &p.description),
            },
            FieldDescriptor {
                name: "likes",
                identity: false,
                apply: |r, p| apply_field(&mut r.likes, &p.likes),
            },
            FieldDescriptor {
                name: "grade",
                identity: false,
                apply: |r, p| apply_field(&mut r.grade, &p.grade),
            },
            FieldDescriptor {
                name: "journeys",
                identity: false,
                apply: |r, p| apply_field(&mut r.journeys, &p.journeys),
            },
            FieldDescriptor {
                name: "latest_journey",
                identity: false,
                apply: |r, p| apply_field(&mut r.latest_journey, &p.latest_journey),
            },
        ];
        FIELDS
    }
}

#[derive(Clone)]
pub struct UserManager {
    store: Arc<dyn EntityStore>,
}

impl UserManager {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    /// The user subtree, mounted by the server under `user/`.
    pub fn group(&self, guards: &Filters, stack: &Stack) -> Group {
        Group::new().child(
            "{userid}/",
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
        let id = ctx.require_param("userid")?;
        let user: User = load_record(self.store.as_ref(), &id).await?;
        Ok(Response::json(StatusCode::OK, &user))
    }

    async fn create(self, ctx: RequestContext) -> Result<Response, ApiError> {
        let id = ctx.require_param("userid")?;
        if try_load_record::<User>(self.store.as_ref(), &id)
            .await?
            .is_some()
        {
            return Err(ApiError::AlreadyExists(Kind::User));
        }

        let mut user: User = ctx.decode()?;
        user.id = id.clone();
        save_record(self.store.as_ref(), &id, &user).await?;
        Ok(Response::json(StatusCode::OK, &user))
    }

    async fn delete(self, ctx: RequestContext) -> Result<Response, ApiError> {
        let id = ctx.require_param("userid")?;
        if !self.store.delete(Kind::User, &id).await? {
            return Err(ApiError::NotFound(Kind::User));
        }
        Ok(Response::success())
    }

    async fn set(self, ctx: RequestContext) -> Result<Response, ApiError> {
        let id = ctx.require_param("userid")?;
        let current: User = load_record(self.store.as_ref(), &id).await?;
        let patch: UserPatch = ctx.decode()?;
        let updated = merge(&current, &patch)?;
        save_record(self.store.as_ref(), &id, &updated).await?;
        Ok(Response::json(StatusCode::OK, &updated))
    }
}
