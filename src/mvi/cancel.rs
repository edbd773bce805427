//! Effect identifiers and the registry that cancels in-flight work.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use futures::stream::AbortHandle;
use parking_lot::Mutex;

/// Identifier scoping cancellation of one or more in-flight effects.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EffectId(Cow<'static, str>);

impl EffectId {
    pub const fn new(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&'static str> for EffectId {
    fn from(name: &'static str) -> Self {
        Self::new(name)
    }
}

impl From<String> for EffectId {
    fn from(name: String) -> Self {
        Self(Cow::Owned(name))
    }
}

impl fmt::Display for EffectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Shared table of abort handles keyed by [`EffectId`].
///
/// One registry belongs to one store; every executor clone shares it.
#[derive(Clone, Default)]
pub struct CancellationRegistry {
    inner: Arc<Mutex<RegistryInner>>,
}

#[derive(Default)]
struct RegistryInner {
    next_token: u64,
    handles: HashMap<EffectId, Vec<(u64, AbortHandle)>>,
}

impl CancellationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track an abort handle under `id`. Returns a token for [`unregister`].
    ///
    /// [`unregister`]: CancellationRegistry::unregister
    pub fn register(&self, id: EffectId, handle: AbortHandle) -> u64 {
        let mut inner = self.inner.lock();
        inner.next_token += 1;
        let token = inner.next_token;
        inner.handles.entry(id).or_default().push((token, handle));
        token
    }

    /// Forget a handle whose effect has finished.
    pub fn unregister(&self, id: &EffectId, token: u64) {
        let mut inner = self.inner.lock();
        if let Some(handles) = inner.handles.get_mut(id) {
            handles.retain(|(t, _)| *t != token);
            if handles.is_empty() {
                inner.handles.remove(id);
            }
        }
    }

    /// Abort every effect tagged `id`. Unknown ids are a no-op.
    ///
    /// Returns the number of effects that were aborted.
    pub fn cancel(&self, id: &EffectId) -> usize {
        let handles = self.inner.lock().handles.remove(id).unwrap_or_default();
        for (_, handle) in &handles {
            handle.abort();
        }
        if !handles.is_empty() {
            tracing::debug!(effect = %id, count = handles.len(), "Cancelled in-flight effects");
        }
        handles.len()
    }

    /// Abort everything, used on store shutdown.
    pub fn cancel_all(&self) {
        let drained: Vec<_> = self.inner.lock().handles.drain().collect();
        for (_, handles) in drained {
            for (_, handle) in handles {
                handle.abort();
            }
        }
    }

    pub fn is_in_flight(&self, id: &EffectId) -> bool {
        self.inner.lock().handles.contains_key(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_unknown_id_is_noop() {
        let registry = CancellationRegistry::new();
        assert_eq!(registry.cancel(&EffectId::new("missing")), 0);
    }

    #[test]
    fn cancel_aborts_all_handles_for_id() {
        let registry = CancellationRegistry::new();
        let id = EffectId::new("timer");
        let (a, _) = AbortHandle::new_pair();
        let (b, _) = AbortHandle::new_pair();
        registry.register(id.clone(), a.clone());
        registry.register(id.clone(), b.clone());

        assert_eq!(registry.cancel(&id), 2);
        assert!(a.is_aborted());
        assert!(b.is_aborted());
        assert!(!registry.is_in_flight(&id));
    }

    #[test]
    fn unregister_removes_only_that_token() {
        let registry = CancellationRegistry::new();
        let id = EffectId::from("load".to_string());
        let (a, _) = AbortHandle::new_pair();
        let (b, _) = AbortHandle::new_pair();
        let first = registry.register(id.clone(), a);
        registry.register(id.clone(), b.clone());

        registry.unregister(&id, first);
        assert!(registry.is_in_flight(&id));
        assert_eq!(registry.cancel(&id), 1);
        assert!(b.is_aborted());
    }
}
