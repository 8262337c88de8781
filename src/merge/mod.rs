//! Generic field-level merge ("patch") engine.
//!
//! # Responsibilities
//! - Apply a partial update onto a stored record, field by field
//! - Keep one algorithm for all record kinds via descriptor tables
//! - Enforce explicit field presence and identity-field immutability
//!
//! # Design Decisions
//! - Presence is explicit: a patch field is `Option<T>`, and `Some(zero)`
//!   is present. No null-like value sniffing on the record itself.
//! - Per-kind behavior lives in a declarative `FieldDescriptor` table,
//!   not in per-kind merge code. No runtime type introspection.
//! - A patch carrying an identity field is rejected (`ImmutableField`),
//!   uniformly for every kind.
//! - Pure and synchronous: the input record is never touched; the merged
//!   copy is returned.

use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::resources::journey::{Journey, JourneyPatch};
use crate::resources::room::{Room, RoomPatch};
use crate::resources::trip::{Trip, TripPatch};
use crate::resources::user::{User, UserPatch};

/// The four record kinds handled by this backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    User,
    Journey,
    Trip,
    Room,
}

impl Kind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::User => "user",
            Kind::Journey => "journey",
            Kind::Trip => "trip",
            Kind::Room => "room",
        }
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Merge failure. The input record is untouched in every case.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MergeError {
    #[error("kind mismatch: expected {expected}, found {found}")]
    KindMismatch { expected: Kind, found: Kind },

    #[error("field {0:?} is immutable")]
    ImmutableField(&'static str),
}

/// One row of a per-kind descriptor table.
pub struct FieldDescriptor<R, P> {
    /// Wire name, for diagnostics.
    pub name: &'static str,
    /// Identity fields are never written from a patch.
    pub identity: bool,
    /// Applies the patch field to the record when present and reports
    /// presence. For identity fields this must only report, never write.
    pub apply: fn(&mut R, &P) -> bool,
}

/// A record kind with a partial-update schema and a descriptor table.
pub trait Patchable: Clone + 'static {
    type Patch: DeserializeOwned + Default + 'static;

    fn kind() -> Kind;

    /// The full descriptor table for this kind, identity fields included.
    fn fields() -> &'static [FieldDescriptor<Self, Self::Patch>];
}

/// Copy `source` over `target` when present; report presence. The
/// workhorse behind every mutable descriptor row.
pub fn apply_field<T: Clone>(target: &mut T, source: &Option<T>) -> bool {
    match source {
        Some(value) => {
            *target = value.clone();
            true
        }
        None => false,
    }
}

/// Apply `patch` onto `current`, honoring field presence.
///
/// Absent fields keep the current value; present fields overwrite it,
/// even with a zero/empty value. Idempotent under repeated application.
pub fn merge<R: Patchable>(current: &R, patch: &R::Patch) -> Result<R, MergeError> {
    let mut merged = current.clone();
    for field in R::fields() {
        let present = (field.apply)(&mut merged, patch);
        if field.identity && present {
            return Err(MergeError::ImmutableField(field.name));
        }
    }
    Ok(merged)
}

/// A record of any kind, for kind-checked dispatch.
#[derive(Debug, Clone, PartialEq)]
pub enum AnyRecord {
    User(User),
    Journey(Journey),
    Trip(Trip),
    Room(Room),
}

/// A patch of any kind.
#[derive(Debug, Clone)]
pub enum AnyPatch {
    User(UserPatch),
    Journey(JourneyPatch),
    Trip(TripPatch),
    Room(RoomPatch),
}

impl AnyRecord {
    pub fn kind(&self) -> Kind {
        match self {
            AnyRecord::User(_) => Kind::User,
            AnyRecord::Journey(_) => Kind::Journey,
            AnyRecord::Trip(_) => Kind::Trip,
            AnyRecord::Room(_) => Kind::Room,
        }
    }
}

impl AnyPatch {
    pub fn kind(&self) -> Kind {
        match self {
            AnyPatch::User(_) => Kind::User,
            AnyPatch::Journey(_) => Kind::Journey,
            AnyPatch::Trip(_) => Kind::Trip,
            AnyPatch::Room(_) => Kind::Room,
        }
    }
}

/// Kind-checked merge: errors with `KindMismatch` when the patch kind
/// differs from the record kind, otherwise dispatches to [`merge`].
pub fn merge_any(current: &AnyRecord, patch: &AnyPatch) -> Result<AnyRecord, MergeError> {
    match (current, patch) {
        (AnyRecord::User(c), AnyPatch::User(p)) => merge(c, p).map(AnyRecord::User),
        (AnyRecord::Journey(c), AnyPatch::Journey(p)) => merge(c, p).map(AnyRecord::Journey),
        (AnyRecord::Trip(c), AnyPatch::Trip(p)) => merge(c, p).map(AnyRecord::Trip),
        (AnyRecord::Room(c), AnyPatch::Room(p)) => merge(c, p).map(AnyRecord::Room),
        _ => Err(MergeError::KindMismatch {
            expected: current.kind(),
            found: patch.kind(),
        }),
    }
}
