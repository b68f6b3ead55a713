use std::any::{Any, TypeId};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::entity::EntityId;
use crate::error::{RuntimeError, RuntimeResult};

/// Per-entity data attached to entities.
///
/// Components are plain data types with a fixed byte layout. They must be
/// default-constructible so batched entity creation can materialize rows
/// without per-entity values.
///
/// # Example
/// ```
/// use wb_runtime::Component;
///
/// #[derive(Debug, Clone, Copy, Default, PartialEq)]
/// struct Health { value: u32 }
/// impl Component for Health {}
/// ```
pub trait Component: Any + Send + Sync + Default {}

/// Type key identifying one component kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct ComponentKey(TypeId);

/// Identifier plus fixed byte layout for one kind of per-entity data.
///
/// The harness treats descriptors as opaque tokens; only the runtime
/// looks inside. Two descriptors are equal exactly when they name the
/// same Rust type.
#[derive(Clone, Copy)]
pub struct ComponentDescriptor {
    key: ComponentKey,
    name: &'static str,
    size: usize,
    init: fn() -> Box<dyn Any + Send + Sync>,
}

impl ComponentDescriptor {
    /// Descriptor for the component type `C`.
    pub fn of<C: Component>() -> Self {
        Self {
            key: ComponentKey(TypeId::of::<C>()),
            name: std::any::type_name::<C>(),
            size: std::mem::size_of::<C>(),
            init: || Box::new(C::default()),
        }
    }

    /// Fully-qualified name of the component type.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Fixed byte size of one component value.
    pub fn size(&self) -> usize {
        self.size
    }

    pub(crate) fn key(&self) -> ComponentKey {
        self.key
    }

    pub(crate) fn new_row(&self) -> Box<dyn Any + Send + Sync> {
        (self.init)()
    }
}

impl fmt::Debug for ComponentDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentDescriptor")
            .field("name", &self.name)
            .field("size", &self.size)
            .finish()
    }
}

impl PartialEq for ComponentDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for ComponentDescriptor {}

/// An ordered, duplicate-free set of component descriptors describing
/// the full component layout of an entity.
///
/// Cheap to clone; the descriptor list is shared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Archetype {
    descriptors: Arc<[ComponentDescriptor]>,
}

impl Archetype {
    /// Build an archetype from a descriptor list.
    ///
    /// Rejects sets in which the same component type appears twice;
    /// each type can be attached to an entity at most once.
    pub fn new(descriptors: &[ComponentDescriptor]) -> RuntimeResult<Self> {
        for (i, desc) in descriptors.iter().enumerate() {
            if descriptors[..i].iter().any(|d| d.key() == desc.key()) {
                return Err(RuntimeError::DuplicateComponent(desc.name()));
            }
        }
        Ok(Self {
            descriptors: descriptors.into(),
        })
    }

    /// The descriptors in caller order.
    pub fn descriptors(&self) -> &[ComponentDescriptor] {
        &self.descriptors
    }

    /// Number of component types in the archetype.
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// True for the empty archetype (entities with no components).
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Total fixed byte size of one entity's component data.
    pub fn total_size(&self) -> usize {
        self.descriptors.iter().map(ComponentDescriptor::size).sum()
    }
}

/// Storage for every row of a single component type.
///
/// Rows are keyed by entity and iterate in ascending entity order.
pub(crate) struct ComponentStore {
    pub(crate) descriptor: ComponentDescriptor,
    pub(crate) rows: BTreeMap<EntityId, Box<dyn Any + Send + Sync>>,
}

impl ComponentStore {
    pub(crate) fn new(descriptor: ComponentDescriptor) -> Self {
        Self {
            descriptor,
            rows: BTreeMap::new(),
        }
    }
}

impl fmt::Debug for ComponentStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentStore")
            .field("component", &self.descriptor.name())
            .field("rows", &self.rows.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, Default, PartialEq)]
    struct Health {
        value: u32,
    }
    impl Component for Health {}

    #[derive(Debug, Clone, Copy, Default, PartialEq)]
    struct Armor {
        value: u32,
    }
    impl Component for Armor {}

    #[test]
    fn descriptor_identity_is_the_type() {
        assert_eq!(
            ComponentDescriptor::of::<Health>(),
            ComponentDescriptor::of::<Health>()
        );
        assert_ne!(
            ComponentDescriptor::of::<Health>(),
            ComponentDescriptor::of::<Armor>()
        );
    }

    #[test]
    fn descriptor_reports_fixed_size() {
        assert_eq!(ComponentDescriptor::of::<Health>().size(), 4);
    }

    #[test]
    fn archetype_rejects_duplicates() {
        let health = ComponentDescriptor::of::<Health>();
        let result = Archetype::new(&[health, health]);
        assert!(matches!(result, Err(RuntimeError::DuplicateComponent(_))));
    }

    #[test]
    fn archetype_preserves_order_and_size() {
        let archetype = Archetype::new(&[
            ComponentDescriptor::of::<Health>(),
            ComponentDescriptor::of::<Armor>(),
        ])
        .unwrap();
        assert_eq!(archetype.len(), 2);
        assert_eq!(archetype.total_size(), 8);
        assert_eq!(archetype.descriptors()[0].name(), std::any::type_name::<Health>());
    }

    #[test]
    fn empty_archetype_is_allowed() {
        let archetype = Archetype::new(&[]).unwrap();
        assert!(archetype.is_empty());
        assert_eq!(archetype.total_size(), 0);
    }
}
