//! Shared-element ("hero") transitions.
//!
//! A tile in the list and the detail view that shows the same story are
//! tagged with the same [`ElementKey`](story_deck_protocol::ElementKey).
//! Their markers report on-screen rects into a [`GeometryRegistry`]; the
//! [`TransitionCoordinator`] drives each key's [`TransitionRecord`] through
//! its phases and the overlay draws a floating ghost between the two rects.
//!
//! Everything here runs on the single UI thread. The stores are plain
//! values owned by the app root and passed by reference.

pub mod coordinator;
pub mod curve;
pub mod geometry;
pub mod ghost;
pub mod marker;
pub mod record;
pub mod registry;

pub use coordinator::{TransitionCoordinator, TransitionEvent, TransitionRequest, TransitionTiming};
pub use curve::SnappyCurve;
pub use geometry::{Anchor, AnchorRole, GeometryRegistry};
pub use ghost::GhostContent;
pub use marker::{DestinationMarker, SourceMarker};
pub use record::{Completion, Phase, TransitionRecord};
pub use registry::TransitionRegistry;
