//! Injectable UUID source.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use uuid::Uuid;

/// Function producing fresh ids, held in feature environments so reducers
/// never mint ids themselves.
#[derive(Clone)]
pub struct UuidGenerator(Arc<dyn Fn() -> Uuid + Send + Sync>);

impl UuidGenerator {
    pub fn new(generate: impl Fn() -> Uuid + Send + Sync + 'static) -> Self {
        Self(Arc::new(generate))
    }

    /// Random v4 ids.
    pub fn live() -> Self {
        Self::new(Uuid::new_v4)
    }

    /// `00000000-0000-0000-0000-000000000001`, then `...02`, and so on.
    pub fn incrementing() -> Self {
        let next = Arc::new(AtomicU64::new(1));
        Self::new(move || Uuid::from_u128(u128::from(next.fetch_add(1, Ordering::SeqCst))))
    }

    pub fn generate(&self) -> Uuid {
        (self.0)()
    }
}

impl fmt::Debug for UuidGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("UuidGenerator(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incrementing_is_deterministic_across_clones() {
        let ids = UuidGenerator::incrementing();
        let clone = ids.clone();
        assert_eq!(ids.generate(), Uuid::from_u128(1));
        assert_eq!(clone.generate(), Uuid::from_u128(2));
    }
}
