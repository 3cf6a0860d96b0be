//! # Discovery
//!
//! Discovery turns the full café list into what the user actually sees.
//!
//! ```text
//!  backend café list ──► DiscoveryEngine ──► visible cafés ──► renderer
//!                         ▲          ▲
//!              committed filters   committed search
//! ```
//!
//! ## Pieces
//!
//! - [`filter`]: [`FilterConfig`] and the pure [`compute_visible`] function.
//! - [`draft`]: [`Drafted`] (panel draft vs committed) and [`SearchBox`]
//!   (pending vs committed text).
//! - [`engine`]: [`DiscoveryEngine`], which owns all of the above and the
//!   derived visible set.
//!
//! ## Invariant
//!
//! The visible set is always `compute_visible(all, committed_search,
//! committed_filters)`. Typing, opening the panel or editing a draft never
//! changes it; replacing the café set, submitting a search or applying the
//! panel always recomputes it.

pub mod draft;
pub mod engine;
pub mod filter;

pub use draft::{Drafted, SearchBox};
pub use engine::DiscoveryEngine;
pub use filter::{compute_visible, compute_visible_with, DistanceSource, FilterConfig};
