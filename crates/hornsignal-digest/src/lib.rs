//! Weekly "Risk Delta" digest: reads two adjacent 7-day windows from the
//! event store, aggregates into topline/high-severity/hot-regions/actor
//! sections, and renders to JSON, HTML, and plain text.

mod bundle;
mod builder;
mod dispatch;
mod math;
mod rationale;
mod regions;
mod render;
mod types;

pub use builder::{build_digest, compute_window_bounds, WindowBounds};
pub use dispatch::{DigestDispatcher, LoggingDispatcher};
pub use render::{render_html, render_json, render_text, subject_line};
pub use types::{ActorSpike, Digest, HighSeverityEvent, HotRegion, Topline, TypeCount};
