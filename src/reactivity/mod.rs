//! Dependency tracking and change propagation.
//!
//! Reads performed while a computation is running are recorded against
//! the `(target, key)` pair that was read. Writing that pair replays every
//! recorded computation synchronously, before the write returns.
//!
//! Dependency bookkeeping lives in a thread-local runtime; a target's entry
//! is created on its first tracked read and dropped with its last handle.

pub mod effect;
pub mod reference;
pub mod runtime;
pub mod tracked;

pub use effect::{run_effect, Effect, EffectId};
pub use reference::{make_ref, Ref};
pub use runtime::{configure, untracked, PropertyKey, Symbol, TargetId};
pub use tracked::{make_tracked, Tracked};
