//! Shared state handles.
//!
//! `Entity<T>` is the unit of shared, observable state: pages keep their view
//! state in one, background tasks update it, and the render loop redraws when
//! it changes. Every entity carries an `EntityId`, which the router uses as
//! page identity.

use std::num::NonZeroU64;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, Weak};
use tokio::sync::watch;

/// Global counter for generating unique entity IDs.
static NEXT_ENTITY_ID: AtomicU64 = AtomicU64::new(1);

/// A unique identifier for an entity across the application lifetime.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityId(NonZeroU64);

impl EntityId {
    fn next() -> Self {
        let id = NEXT_ENTITY_ID.fetch_add(1, Ordering::Relaxed);
        // Starts at 1 and only increments.
        Self(NonZeroU64::new(id).unwrap_or(NonZeroU64::MIN))
    }
}

impl std::fmt::Debug for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Shared state wrapper with RwLock.
pub type SharedState<T> = Arc<RwLock<T>>;

/// Strong handle to a piece of shared state.
pub struct Entity<T: ?Sized + Send + Sync> {
    pub(crate) id: EntityId,
    pub(crate) inner: SharedState<T>,
    pub(crate) tx: watch::Sender<()>,
}

/// A weak handle to an entity.
pub struct WeakEntity<T: ?Sized + Send + Sync> {
    id: EntityId,
    inner: Weak<RwLock<T>>,
    tx: watch::Sender<()>,
}

impl<T: Send + Sync> Entity<T> {
    /// Create a new entity with the given initial value.
    pub fn new(value: T) -> Self {
        let (tx, _) = watch::channel(());
        Self {
            id: EntityId::next(),
            inner: Arc::new(RwLock::new(value)),
            tx,
        }
    }
}

impl<T: ?Sized + Send + Sync> Entity<T> {
    /// Get the unique ID of this entity.
    pub fn entity_id(&self) -> EntityId {
        self.id
    }

    /// Update the inner value using a closure and notify subscribers.
    pub fn update<F, R>(&self, f: F) -> crate::Result<R>
    where
        F: FnOnce(&mut T) -> R,
    {
        let mut guard = self
            .inner
            .write()
            .map_err(|_| crate::Error::LockPoisoned { what: "entity" })?;
        let res = f(&mut *guard);
        drop(guard);
        let _ = self.tx.send(());
        Ok(res)
    }

    /// Read the inner value using a closure.
    pub fn read<F, R>(&self, f: F) -> crate::Result<R>
    where
        F: FnOnce(&T) -> R,
    {
        let guard = self
            .inner
            .read()
            .map_err(|_| crate::Error::LockPoisoned { what: "entity" })?;
        Ok(f(&*guard))
    }

    /// Downgrade this entity to a weak handle. Background tasks hold one so
    /// a late result does not keep a dropped page's state alive.
    pub fn downgrade(&self) -> WeakEntity<T> {
        WeakEntity {
            id: self.id,
            inner: Arc::downgrade(&self.inner),
            tx: watch::Sender::clone(&self.tx),
        }
    }

    /// Subscribe to changes of this entity.
    pub fn subscribe(&self) -> watch::Receiver<()> {
        self.tx.subscribe()
    }
}

impl<T: ?Sized + Send + Sync> WeakEntity<T> {
    /// Upgrade this weak handle to a strong handle, if the entity is still alive.
    pub fn upgrade(&self) -> Option<Entity<T>> {
        self.inner.upgrade().map(|inner| Entity {
            id: self.id,
            inner,
            tx: watch::Sender::clone(&self.tx),
        })
    }

    /// Update the entity if it is still alive.
    pub fn update<F, R>(&self, f: F) -> Option<crate::Result<R>>
    where
        F: FnOnce(&mut T) -> R,
    {
        self.upgrade().map(|entity| entity.update(f))
    }
}

impl<T: ?Sized + Send + Sync> Clone for Entity<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            inner: Arc::clone(&self.inner),
            tx: watch::Sender::clone(&self.tx),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_ids_are_unique() {
        let a = Entity::new(1);
        let b = Entity::new(1);
        assert_ne!(a.entity_id(), b.entity_id());
        assert_eq!(a.clone().entity_id(), a.entity_id());
    }

    #[test]
    fn test_update_and_read() {
        let entity = Entity::new(vec![1, 2]);
        entity.update(|v| v.push(3)).unwrap();
        assert_eq!(entity.read(|v| v.len()).unwrap(), 3);
    }

    #[test]
    fn test_weak_entity_dies_with_last_strong_handle() {
        let entity = Entity::new(String::from("hola"));
        let weak = entity.downgrade();
        assert!(weak.update(|s| s.push('!')).is_some());
        assert_eq!(entity.read(|s| s.clone()).unwrap(), "hola!");
        drop(entity);
        assert!(weak.upgrade().is_none());
        assert!(weak.update(|s| s.clear()).is_none());
    }

    #[tokio::test]
    async fn test_update_notifies_subscribers() {
        let entity = Entity::new(0u32);
        let mut rx = entity.subscribe();
        entity.update(|n| *n += 1).unwrap();
        assert!(rx.has_changed().unwrap());
        rx.changed().await.unwrap();
        assert_eq!(entity.read(|n| *n).unwrap(), 1);
    }
}
