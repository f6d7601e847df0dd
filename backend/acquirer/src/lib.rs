//! # Fix Acquisition
//!
//! Best-effort geolocation sampling. The served page runs the same protocol in
//! the browser; this crate is the typed version used by the tester and tests.
//!
//!
//!
//! ## Flow
//!
//! - Subscribe to a continuous update stream, high accuracy, no cached fixes
//! - Keep the most accurate sample seen so far (lower radius wins)
//! - Stop as soon as a sample reaches the target accuracy
//! - Otherwise stop at the deadline and hand back the best sample
//! - No sample at the deadline means no fix
//!
//!
//!
//! ## Cancellation
//!
//! The update stream and the deadline ticker race inside one `select!`.
//! Whichever branch ends the acquisition returns, which drops the other. A
//! dropped [`Watch`] releases its device subscription, so late updates have
//! nowhere to land.
//!
//!
//!
//! ## Notes
//!
//! ### Fallback
//! Some devices behave better with one-off requests. [`acquire_single_shot`]
//! splits the budget in two: one precise attempt, then one coarse attempt if
//! the first timed out.
//!
//! ### Single flight
//! The page disables its button while a fix is pending. [`FixTrigger`] is the
//! same rule: a second acquisition while one is running is refused.

pub mod best_fix;
pub mod error;
pub mod sample;
pub mod simulated;
pub mod single_shot;
pub mod source;
pub mod submission;
pub mod trigger;

pub use best_fix::{FixConfig, acquire_best_fix};
pub use error::{AcquireError, SourceError};
pub use sample::LocationSample;
pub use simulated::{ScriptedSource, WatchStats};
pub use single_shot::acquire_single_shot;
pub use source::{LocationSource, PositionOptions, Update, Watch, WatchCallbacks, callback_watch};
pub use submission::LocationSubmission;
pub use trigger::FixTrigger;
