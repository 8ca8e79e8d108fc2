use std::any::{Any, type_name};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::kernel::error::{Error, Result};

/// A component as stored in the registry.
pub type SharedComponent = Arc<dyn Any + Send + Sync>;

/// Lookup service mapping component ids to configured instances.
///
/// Kernels fill the registry while booting and hand out shared references
/// afterwards, so lookups never need a lock.
#[derive(Default)]
pub struct DependencyRegistry {
    instances: HashMap<String, SharedComponent>,
}

impl DependencyRegistry {
    /// Create a new empty dependency registry
    pub fn new() -> Self {
        Self {
            instances: HashMap::new(),
        }
    }

    /// Register a component instance under `id`, replacing any previous one.
    pub fn register_instance<V>(&mut self, id: impl Into<String>, instance: Arc<V>)
    where
        V: Any + Send + Sync,
    {
        self.instances.insert(id.into(), instance);
    }

    /// Register an already type-erased component.
    pub fn register_shared(&mut self, id: impl Into<String>, instance: SharedComponent) {
        self.instances.insert(id.into(), instance);
    }

    pub fn has(&self, id: &str) -> bool {
        self.instances.contains_key(id)
    }

    /// Get a component by id, failing when it is not registered.
    pub fn get(&self, id: &str) -> Result<SharedComponent> {
        self.instances
            .get(id)
            .cloned()
            .ok_or_else(|| Error::ComponentNotFound { id: id.to_string() })
    }

    /// Get a component by id and downcast it to `T`.
    pub fn get_concrete<T: Any + Send + Sync>(&self, id: &str) -> Result<Arc<T>> {
        let component = self.get(id)?;
        Arc::downcast::<T>(component).map_err(|_| Error::ComponentTypeMismatch {
            id: id.to_string(),
            expected: type_name::<T>(),
        })
    }

    /// Ids of all registered components, sorted.
    pub fn get_registered_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.instances.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Clear all instances.
    pub fn clear(&mut self) {
        self.instances.clear();
    }
}

impl fmt::Debug for DependencyRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DependencyRegistry")
            .field("ids", &self.get_registered_ids())
            .finish()
    }
}
