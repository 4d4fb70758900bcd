//! Referly Core
//!
//! Foundational primitives shared by the Referly crates:
//!
//! - **Geometry**: rects, points, and the viewport used by progress sources
//! - **Events**: event types and a listener registry with leak accounting
//! - **Context**: explicit application context (theme, sound, motion, navigation)
//!
//! # Example
//!
//! ```rust
//! use referly_core::events::{event_types, Event, EventData, ListenerRegistry};
//!
//! let mut registry = ListenerRegistry::new();
//! let id = registry.add_listener(event_types::SCROLL, |_event| {});
//!
//! let fired = registry.dispatch(&Event::new(
//!     event_types::SCROLL,
//!     EventData::Scroll { x: 0.0, y: 120.0 },
//! ));
//! assert_eq!(fired, 1);
//!
//! registry.remove_listener(id);
//! assert_eq!(registry.listener_count(event_types::SCROLL), 0);
//! ```

pub mod context;
pub mod events;
pub mod geometry;

pub use context::{AppContext, AppContextBuilder, MotionPreference, NavigationState, SoundSettings, ThemeMode};
pub use events::{Event, EventData, EventType, ListenerId, ListenerRegistry, SharedRegistry};
pub use geometry::{Point, Rect, Size, Viewport};
