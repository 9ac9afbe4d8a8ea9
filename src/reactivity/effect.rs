use crate::reactivity::runtime::{self, PropertyKey, TargetId};
use crate::result::VireoResult;
use std::cell::{Cell, RefCell};
use std::fmt::{Debug, Display, Formatter};
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};

static NEXT_EFFECT_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EffectId(u64);

impl Display for EffectId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub type EffectFunction = Box<dyn Fn() -> VireoResult<()>>;

/// A tracked computation
///
/// Clones share identity: re-running a clone never adds a second entry to
/// any dependency set.
#[derive(Clone)]
pub struct Effect {
    inner: Rc<EffectInner>,
}

struct EffectInner {
    id: EffectId,
    function: EffectFunction,
    running: Cell<bool>,
    disposed: Cell<bool>,
    dependencies: RefCell<Vec<(TargetId, PropertyKey)>>,
}

impl Debug for Effect {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Effect({})", self.inner.id)
    }
}

/// Run `function` once as the active computation and keep it registered
/// with everything it read
///
/// If the first run fails the computation is disposed, since no handle to
/// it escapes.
pub fn run_effect(function: impl Fn() -> VireoResult<()> + 'static) -> VireoResult<Effect> {
    let effect = Effect::new(function);
    debug!("Running effect {}", effect.id());
    if let Err(error) = effect.run() {
        effect.dispose();
        return Err(error);
    }
    Ok(effect)
}

impl Effect {
    pub fn new(function: impl Fn() -> VireoResult<()> + 'static) -> Self {
        Self {
            inner: Rc::new(EffectInner {
                id: EffectId(NEXT_EFFECT_ID.fetch_add(1, Ordering::Relaxed)),
                function: Box::new(function),
                running: Cell::new(false),
                disposed: Cell::new(false),
                dependencies: RefCell::new(Vec::new()),
            }),
        }
    }

    pub fn id(&self) -> EffectId {
        self.inner.id
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.get()
    }

    pub fn is_running(&self) -> bool {
        self.inner.running.get()
    }

    /// Run the computation, collecting its reads
    ///
    /// A computation that is already running is not re-entered.
    pub fn run(&self) -> VireoResult<()> {
        if self.is_disposed() {
            return Ok(());
        }
        if self.is_running() {
            warn!("Effect {} triggered itself while running, skipping", self.id());
            return Ok(());
        }
        self.inner.running.set(true);
        runtime::push_active(self.clone());
        let _guard = RunGuard { effect: self };
        (self.inner.function)()
    }

    /// Remove the computation from every dependency set it joined
    pub fn dispose(&self) {
        if self.inner.disposed.replace(true) {
            return;
        }
        debug!("Disposing effect {}", self.id());
        let dependencies = std::mem::take(&mut *self.inner.dependencies.borrow_mut());
        let removed = runtime::remove_effect(self.id(), dependencies);
        drop(removed);
    }

    /// Number of (target, key) pairs this computation has read
    pub fn dependency_count(&self) -> usize {
        self.inner.dependencies.borrow().len()
    }

    pub(crate) fn record_dependency(&self, target: TargetId, key: PropertyKey) {
        self.inner.dependencies.borrow_mut().push((target, key));
    }
}

struct RunGuard<'a> {
    effect: &'a Effect,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        let popped = runtime::pop_active();
        self.effect.inner.running.set(false);
        drop(popped);
    }
}
