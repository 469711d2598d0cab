//! Data models for Trip Journal resources.
//!
//! - `Trip`, `TripCreate`, `TripUpdate`: top-level journeys
//! - `Event`, `EventCreate`, `EventUpdate`, `Location`: stops within a trip
//! - `Media`, `MediaCreate`: photos attached to an event
//! - `ResourceId`: opaque server-issued identifier shared by all of them

pub mod event;
pub mod id;
pub mod media;
pub mod trip;

pub use event::{Event, EventCreate, EventUpdate, Location};
pub use id::ResourceId;
pub use media::{Media, MediaCreate};
pub use trip::{Trip, TripCreate, TripUpdate};
