use crate::config::TriggerPolicy;
use crate::err;
use crate::reactivity::runtime::{self, PropertyKey, TargetId};
use crate::result::VireoResult;
use std::cell::{RefCell, RefMut};
use std::fmt::{Debug, Formatter};
use std::rc::Rc;

/// A single observable slot, tracked under the key `"value"`
pub struct Ref<T> {
    inner: Rc<RefInner<T>>,
}

struct RefInner<T> {
    target: TargetId,
    value: RefCell<T>,
}

impl<T> Drop for RefInner<T> {
    fn drop(&mut self) {
        runtime::forget_target(self.target);
    }
}

impl<T> Clone for Ref<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Debug> Debug for Ref<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Ref({:?})", self.inner.value.borrow())
    }
}

pub fn make_ref<T: Clone + PartialEq + 'static>(value: T) -> Ref<T> {
    Ref {
        inner: Rc::new(RefInner {
            target: TargetId::next(),
            value: RefCell::new(value),
        }),
    }
}

impl<T: Clone + PartialEq + 'static> Ref<T> {
    pub fn target(&self) -> TargetId {
        self.inner.target
    }

    pub fn get(&self) -> T {
        self.with(T::clone)
    }

    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        runtime::track(self.inner.target, &PropertyKey::value());
        f(&self.inner.value.borrow())
    }

    pub fn set(&self, value: T) -> VireoResult<()> {
        let changed = {
            let mut slot = self.slot_mut()?;
            let changed = *slot != value;
            *slot = value;
            changed
        };
        self.trigger_if(changed)
    }

    pub fn update(&self, f: impl FnOnce(&mut T)) -> VireoResult<()> {
        let changed = {
            let mut slot = self.slot_mut()?;
            let old_value = slot.clone();
            f(&mut slot);
            *slot != old_value
        };
        self.trigger_if(changed)
    }

    fn slot_mut(&self) -> VireoResult<RefMut<'_, T>> {
        self.inner
            .value
            .try_borrow_mut()
            .map_err(|_| err!(Tracking: "Cannot write ref {} while it is being read", self.inner.target))
    }

    fn trigger_if(&self, changed: bool) -> VireoResult<()> {
        if !changed && runtime::trigger_policy() == TriggerPolicy::SkipIfUnchanged {
            return Ok(());
        }
        runtime::trigger(self.inner.target, &PropertyKey::value())
    }

    pub fn dependents(&self) -> usize {
        runtime::dependency_count(self.inner.target, &PropertyKey::value())
    }
}
