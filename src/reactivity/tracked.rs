use crate::bail;
use crate::config::TriggerPolicy;
use crate::err;
use crate::reactivity::runtime::{self, PropertyKey, TargetId};
use crate::result::VireoResult;
use bevy_reflect::{GetPath, Reflect, ReflectRef};
use std::any::type_name;
use std::cell::RefCell;
use std::fmt::{Debug, Formatter};
use std::rc::Rc;

/// A state container whose property reads and writes are observed
///
/// Properties are addressed by reflect paths (`"count"`, `"user.name"`,
/// `"todos[0]"`). Each path is its own tracking key.
pub struct Tracked<T: Reflect> {
    inner: Rc<TrackedInner<T>>,
}

struct TrackedInner<T> {
    target: TargetId,
    value: RefCell<T>,
}

impl<T> Drop for TrackedInner<T> {
    fn drop(&mut self) {
        runtime::forget_target(self.target);
    }
}

impl<T: Reflect> Clone for Tracked<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Reflect + Debug> Debug for Tracked<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tracked")
            .field("target", &self.inner.target)
            .field("value", &self.inner.value)
            .finish()
    }
}

pub fn make_tracked<T: Reflect>(value: T) -> VireoResult<Tracked<T>> {
    Tracked::new(value)
}

impl<T: Reflect> Tracked<T> {
    pub fn new(value: T) -> VireoResult<Self> {
        match value.reflect_ref() {
            ReflectRef::Struct(_)
            | ReflectRef::TupleStruct(_)
            | ReflectRef::Tuple(_)
            | ReflectRef::Map(_) => {}
            _ => bail!(Tracking: "Cannot track {}: not a keyed container", type_name::<T>()),
        }
        Ok(Self {
            inner: Rc::new(TrackedInner {
                target: TargetId::next(),
                value: RefCell::new(value),
            }),
        })
    }

    pub fn target(&self) -> TargetId {
        self.inner.target
    }

    /// Read a clone of the property at `path`
    pub fn get<V: Reflect + Clone>(&self, path: &str) -> VireoResult<V> {
        self.with(path, |value: &V| value.clone())
    }

    /// Borrow the property at `path`
    ///
    /// `f` must not write to this object.
    pub fn with<V: Reflect, R>(&self, path: &str, f: impl FnOnce(&V) -> R) -> VireoResult<R> {
        let state = self
            .inner
            .value
            .try_borrow()
            .map_err(|_| err!(Tracking: "Cannot read '{}' while it is being written", path))?;
        let value = state.path::<V>(path).map_err(|error| {
            err!(Tracking: "Cannot read '{}' on {}: {}", path, type_name::<T>(), error)
        })?;
        runtime::track(self.inner.target, &PropertyKey::from(path));
        Ok(f(value))
    }

    /// Read without recording a dependency
    pub fn peek<V: Reflect + Clone>(&self, path: &str) -> VireoResult<V> {
        runtime::untracked(|| self.get(path))
    }

    pub fn set<V: Reflect>(&self, path: &str, value: V) -> VireoResult<()> {
        self.update(path, move |slot: &mut V| *slot = value)
    }

    /// Mutate the property at `path` in place, then replay its dependents
    pub fn update<V: Reflect>(&self, path: &str, f: impl FnOnce(&mut V)) -> VireoResult<()> {
        let changed = {
            let mut state = self
                .inner
                .value
                .try_borrow_mut()
                .map_err(|_| err!(Tracking: "Cannot write '{}' while it is being read", path))?;
            let slot = state.path_mut::<V>(path).map_err(|error| {
                err!(Tracking: "Cannot write '{}' on {}: {}", path, type_name::<T>(), error)
            })?;
            match runtime::trigger_policy() {
                TriggerPolicy::Always => {
                    f(slot);
                    true
                }
                TriggerPolicy::SkipIfUnchanged => {
                    let old_value = slot.clone_value();
                    f(slot);
                    !slot
                        .reflect_partial_eq(&*old_value)
                        .unwrap_or(false)
                }
            }
        };
        if !changed {
            return Ok(());
        }
        self.trigger_key(&PropertyKey::from(path))
    }

    /// Record a read of an arbitrary key, e.g. a symbol
    pub fn track_key(&self, key: &PropertyKey) {
        runtime::track(self.inner.target, key);
    }

    pub fn trigger_key(&self, key: &PropertyKey) -> VireoResult<()> {
        runtime::trigger(self.inner.target, key)
    }

    /// Number of computations depending on `key`
    pub fn dependents(&self, key: impl Into<PropertyKey>) -> usize {
        runtime::dependency_count(self.inner.target, &key.into())
    }
}
