//! Reusable instance pool that grows on demand.

use std::fmt;

use merge_grid_core::{ElementId, PoolStats};

/// Lifecycle hooks invoked when an instance enters or leaves the free set.
pub trait Poolable {
    /// Activates the instance before it is handed out.
    fn on_acquire(&mut self);
    /// Deactivates the instance as it returns to the free set.
    fn on_release(&mut self);
    /// Reports whether the instance is currently handed out.
    fn is_active(&self) -> bool;
}

/// Pool owning every instance it ever created.
///
/// Instances are addressed by [`ElementId`], which is the slot index and stays
/// stable across reuse. Released instances are kept on a LIFO free list and
/// handed out again before the factory is consulted.
pub struct Pool<T> {
    slots: Vec<Option<T>>,
    free: Vec<ElementId>,
    factory: Box<dyn FnMut() -> T>,
}

impl<T: Poolable> Pool<T> {
    /// Creates a pool and pre-creates `warm_up` inactive instances.
    pub fn new<F>(warm_up: usize, factory: F) -> Self
    where
        F: FnMut() -> T + 'static,
    {
        let mut pool = Self {
            slots: Vec::with_capacity(warm_up),
            free: Vec::with_capacity(warm_up),
            factory: Box::new(factory),
        };
        for _ in 0..warm_up {
            let id = pool.create();
            pool.free.push(id);
        }
        pool
    }

    /// Hands out an activated instance, creating one when the free set is empty.
    pub fn acquire(&mut self) -> ElementId {
        let id = self.free.pop().unwrap_or_else(|| self.create());
        if let Some(instance) = self.get_mut(id) {
            instance.on_acquire();
        }
        id
    }

    /// Returns an instance to the free set.
    ///
    /// Unknown identifiers and instances that are already inactive are
    /// ignored, so a repeated release never puts an instance on the free list
    /// twice. Returns whether the release took effect.
    pub fn release(&mut self, id: ElementId) -> bool {
        let Some(instance) = self.get_mut(id) else {
            return false;
        };
        if !instance.is_active() {
            return false;
        }
        instance.on_release();
        self.free.push(id);
        true
    }

    /// Drops every free instance and empties the free set.
    ///
    /// Instances that are still handed out keep their slots.
    pub fn clear(&mut self) {
        for id in self.free.drain(..) {
            if let Some(slot) = usize::try_from(id.get())
                .ok()
                .and_then(|index| self.slots.get_mut(index))
            {
                *slot = None;
            }
        }
    }

    /// Shared access to an instance.
    #[must_use]
    pub fn get(&self, id: ElementId) -> Option<&T> {
        let index = usize::try_from(id.get()).ok()?;
        self.slots.get(index).and_then(Option::as_ref)
    }

    /// Exclusive access to an instance.
    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut T> {
        let index = usize::try_from(id.get()).ok()?;
        self.slots.get_mut(index).and_then(Option::as_mut)
    }

    /// Number of instances currently handed out.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.slots
            .iter()
            .flatten()
            .filter(|instance| instance.is_active())
            .count()
    }

    /// Number of instances owned by the pool.
    #[must_use]
    pub fn total_count(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    /// Number of instances waiting in the free set.
    #[must_use]
    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    /// Reports whether `id` is waiting in the free set.
    #[must_use]
    pub fn is_free(&self, id: ElementId) -> bool {
        self.free.contains(&id)
    }

    /// Captures the pool counters.
    #[must_use]
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            active: self.active_count(),
            total: self.total_count(),
        }
    }

    fn create(&mut self) -> ElementId {
        let id = ElementId::new(u32::try_from(self.slots.len()).unwrap_or(u32::MAX));
        self.slots.push(Some((self.factory)()));
        id
    }
}

impl<T> fmt::Debug for Pool<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Pool")
            .field("slots", &self.slots.len())
            .field("free", &self.free)
            .finish_non_exhaustive()
    }
}
