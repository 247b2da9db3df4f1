//! In-memory cache tables for SK Docs.
//!
//! This crate provides the mechanics behind the documentation cache layer:
//!
//! - [`TtlCache`]: keyed table whose entries expire a fixed time after
//!   insertion, with lazy replacement on access and per-key single-flight
//! - [`Clock`]: time source, so expiry can be tested without sleeping
//!   ([`SystemClock`] in production, [`ManualClock`] in tests)
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use std::time::Duration;
//! use skdocs_cache::{ManualClock, TtlCache};
//!
//! let clock = Arc::new(ManualClock::default());
//! let cache = TtlCache::new(Duration::from_secs(60), clock.clone());
//!
//! cache.insert("intro", 1);
//! assert_eq!(cache.get(&"intro"), Some(1));
//!
//! clock.advance(Duration::from_secs(61));
//! assert_eq!(cache.get(&"intro"), None);
//! ```

mod clock;
mod ttl;

pub use clock::{Clock, ManualClock, SystemClock};
pub use ttl::TtlCache;
