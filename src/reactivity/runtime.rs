use crate::config::{ReactivityConfig, TriggerPolicy};
use crate::reactivity::effect::{Effect, EffectId};
use crate::result::VireoResult;
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{error, trace};

static NEXT_TARGET_ID: AtomicU64 = AtomicU64::new(1);
static NEXT_SYMBOL_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a tracked object or ref, independent of its contents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetId(u64);

impl TargetId {
    pub(crate) fn next() -> Self {
        Self(NEXT_TARGET_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl Display for TargetId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An opaque, process-unique property key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol {
    id: u64,
    description: &'static str,
}

impl Symbol {
    pub fn new(description: &'static str) -> Self {
        Self {
            id: NEXT_SYMBOL_ID.fetch_add(1, Ordering::Relaxed),
            description,
        }
    }

    pub fn description(&self) -> &'static str {
        self.description
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PropertyKey {
    Name(String),
    Symbol(Symbol),
}

impl PropertyKey {
    /// The sole key of a ref
    pub fn value() -> Self {
        Self::Name("value".to_string())
    }
}

impl From<&str> for PropertyKey {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for PropertyKey {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl From<Symbol> for PropertyKey {
    fn from(symbol: Symbol) -> Self {
        Self::Symbol(symbol)
    }
}

impl Display for PropertyKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            PropertyKey::Name(name) => write!(f, "{name}"),
            PropertyKey::Symbol(symbol) => write!(f, "Symbol({})", symbol.description),
        }
    }
}

type DependencySet = BTreeMap<EffectId, Effect>;

#[derive(Default)]
struct Runtime {
    targets: HashMap<TargetId, HashMap<PropertyKey, DependencySet>>,
    active: Vec<Effect>,
    config: ReactivityConfig,
}

thread_local! {
    static RUNTIME: RefCell<Runtime> = RefCell::new(Runtime::default());
}

pub fn configure(config: ReactivityConfig) {
    RUNTIME.with(|runtime| runtime.borrow_mut().config = config);
}

pub fn trigger_policy() -> TriggerPolicy {
    RUNTIME.with(|runtime| runtime.borrow().config.trigger_policy)
}

/// Record that the active computation, if any, read `key` on `target`
pub fn track(target: TargetId, key: &PropertyKey) {
    let recorded = RUNTIME.with(|runtime| {
        let mut runtime = runtime.borrow_mut();
        let effect = match runtime.active.last() {
            Some(effect) if !effect.is_disposed() => effect.clone(),
            _ => return None,
        };
        let dependency_set = runtime
            .targets
            .entry(target)
            .or_default()
            .entry(key.clone())
            .or_default();
        if dependency_set.contains_key(&effect.id()) {
            return None;
        }
        dependency_set.insert(effect.id(), effect.clone());
        Some(effect)
    });
    if let Some(effect) = recorded {
        trace!("Effect {} depends on {}.{}", effect.id(), target, key);
        effect.record_dependency(target, key.clone());
    }
}

/// Re-run every computation that read `key` on `target`
///
/// All dependents run even when one fails; the first error is returned.
pub fn trigger(target: TargetId, key: &PropertyKey) -> VireoResult<()> {
    let effects: Vec<Effect> = RUNTIME.with(|runtime| {
        runtime
            .borrow()
            .targets
            .get(&target)
            .and_then(|keys| keys.get(key))
            .map(|dependency_set| dependency_set.values().cloned().collect())
            .unwrap_or_default()
    });
    if effects.is_empty() {
        return Ok(());
    }
    trace!("Triggering {} effects for {}.{}", effects.len(), target, key);
    let mut first_error = None;
    for effect in effects {
        if let Err(err) = effect.run() {
            error!("Effect {} failed after change to {}.{}: {:?}", effect.id(), target, key, err);
            first_error.get_or_insert(err);
        }
    }
    first_error.map_or(Ok(()), Err)
}

/// Run `f` with no active computation, so that its reads record nothing
pub fn untracked<R>(f: impl FnOnce() -> R) -> R {
    let saved = RUNTIME.with(|runtime| std::mem::take(&mut runtime.borrow_mut().active));
    let _restore = RestoreActive(Some(saved));
    f()
}

struct RestoreActive(Option<Vec<Effect>>);

impl Drop for RestoreActive {
    fn drop(&mut self) {
        if let Some(saved) = self.0.take() {
            let displaced = RUNTIME.with(|runtime| {
                std::mem::replace(&mut runtime.borrow_mut().active, saved)
            });
            drop(displaced);
        }
    }
}

/// Size of the dependency set for `key` on `target`
pub fn dependency_count(target: TargetId, key: &PropertyKey) -> usize {
    RUNTIME.with(|runtime| {
        runtime
            .borrow()
            .targets
            .get(&target)
            .and_then(|keys| keys.get(key))
            .map_or(0, |dependency_set| dependency_set.len())
    })
}

/// Whether `target` has an entry in the dependency map
pub fn has_dependency_entry(target: TargetId) -> bool {
    RUNTIME.with(|runtime| runtime.borrow().targets.contains_key(&target))
}

pub(crate) fn push_active(effect: Effect) {
    RUNTIME.with(|runtime| runtime.borrow_mut().active.push(effect));
}

pub(crate) fn pop_active() -> Option<Effect> {
    RUNTIME
        .try_with(|runtime| runtime.borrow_mut().active.pop())
        .ok()
        .flatten()
}

pub(crate) fn remove_effect(
    id: EffectId,
    dependencies: Vec<(TargetId, PropertyKey)>,
) -> Vec<Effect> {
    RUNTIME
        .try_with(|runtime| {
            let mut runtime = runtime.borrow_mut();
            let mut removed = vec![];
            for (target, key) in dependencies {
                if let Some(dependency_set) = runtime
                    .targets
                    .get_mut(&target)
                    .and_then(|keys| keys.get_mut(&key))
                {
                    removed.extend(dependency_set.remove(&id));
                }
            }
            removed
        })
        .unwrap_or_default()
}

/// Drop the bookkeeping for a target that is no longer reachable
pub(crate) fn forget_target(target: TargetId) {
    // Removed effects may own the last handle of other targets, so they
    // are dropped only after the runtime borrow is released.
    let removed = RUNTIME
        .try_with(|runtime| {
            runtime
                .try_borrow_mut()
                .ok()
                .and_then(|mut runtime| runtime.targets.remove(&target))
        })
        .ok()
        .flatten();
    if removed.is_some() {
        trace!("Forgot dependencies of {}", target);
    }
    drop(removed);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactivity::effect::run_effect;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_track_outside_effect_records_nothing() {
        let target = TargetId::next();
        track(target, &"count".into());
        assert!(!has_dependency_entry(target));
        assert_eq!(0, dependency_count(target, &"count".into()));
        trigger(target, &"count".into()).unwrap();
    }

    #[test]
    fn test_track_and_trigger() {
        let target = TargetId::next();
        let runs = Rc::new(Cell::new(0));
        let effect_runs = runs.clone();
        let _effect = run_effect(move || {
            effect_runs.set(effect_runs.get() + 1);
            track(target, &"count".into());
            track(target, &"count".into());
            Ok(())
        })
        .unwrap();
        assert_eq!(1, runs.get());
        assert_eq!(1, dependency_count(target, &"count".into()));

        trigger(target, &"count".into()).unwrap();
        assert_eq!(2, runs.get());
        assert_eq!(1, dependency_count(target, &"count".into()));

        trigger(target, &"other".into()).unwrap();
        assert_eq!(2, runs.get());
    }

    #[test]
    fn test_symbol_keys_are_distinct() {
        let first = Symbol::new("key");
        let second = Symbol::new("key");
        assert_ne!(first, second);
        assert_ne!(PropertyKey::from(first), PropertyKey::from(second));
        assert_eq!("Symbol(key)", PropertyKey::from(first).to_string());
    }

    #[test]
    fn test_untracked_reads_record_nothing() {
        let target = TargetId::next();
        let _effect = run_effect(move || {
            untracked(|| track(target, &"hidden".into()));
            track(target, &"visible".into());
            Ok(())
        })
        .unwrap();
        assert_eq!(0, dependency_count(target, &"hidden".into()));
        assert_eq!(1, dependency_count(target, &"visible".into()));
    }

    #[test]
    fn test_forget_target() {
        let target = TargetId::next();
        let _effect = run_effect(move || {
            track(target, &"count".into());
            Ok(())
        })
        .unwrap();
        assert!(has_dependency_entry(target));
        forget_target(target);
        assert!(!has_dependency_entry(target));
    }

    #[test]
    fn test_configure() {
        assert_eq!(TriggerPolicy::Always, trigger_policy());
        configure(ReactivityConfig {
            trigger_policy: TriggerPolicy::SkipIfUnchanged,
        });
        assert_eq!(TriggerPolicy::SkipIfUnchanged, trigger_policy());
        configure(ReactivityConfig::default());
    }
}
