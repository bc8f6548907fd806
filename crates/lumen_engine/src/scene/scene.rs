//! # Scene
//!
//! A [`Scene`] aggregates what one frame draws: non-owning references to entities
//! and lights, plus at most one image-based-lighting [`Environment`]. Everything it
//! points at is owned by the application and must outlive the scene, which the `'a`
//! lifetime enforces.
//!
//! ## Storage
//! Entities are kept in one group per model (models are compared by address). Groups
//! are ordered by the first appearance of their model and entities by insertion
//! within their group, so [`Scene::entities`] yields all instances of a model back to
//! back without the caller sorting anything. Finding the group is a hash lookup and
//! adding to it is a push, which keeps appends amortized O(1).
//!
//! Every collection grows by [`GROWTH_STEP`] slots whenever it is full, and capacity
//! never shrinks. All reservations for an insertion happen before anything is
//! written, so an allocation failure is reported as [`SceneError::OutOfMemory`] with
//! the scene's contents exactly as they were.

use std::collections::{HashMap, TryReserveError};

use thiserror::Error;

use crate::render::primitives::Model;
use crate::render::resources::Environment;
use crate::render::systems::lighting::Light;

use super::entity::Entity;

/// Slots added each time a scene collection is full
pub const GROWTH_STEP: usize = 16;

/// Scene errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    /// Backing storage could not grow
    #[error("Scene storage could not grow: {0}")]
    OutOfMemory(#[from] TryReserveError),
}

/// Result type for scene operations
pub type SceneResult<T> = Result<T, SceneError>;

/// Address of a model, the identity entities are grouped by
type ModelKey = usize;

fn model_key(model: &Model<'_>) -> ModelKey {
    std::ptr::from_ref(model) as ModelKey
}

/// Fallible, step-wise growth of scene storage
#[derive(Debug, Default)]
struct Growth {
    #[cfg(test)]
    allocations_before_failure: Option<usize>,
}

impl Growth {
    /// Make room for one more element, adding [`GROWTH_STEP`] slots when full
    fn reserve_step<T>(&mut self, storage: &mut Vec<T>) -> Result<(), TryReserveError> {
        if storage.len() < storage.capacity() {
            return Ok(());
        }
        self.allocate()?;
        storage.try_reserve_exact(GROWTH_STEP)?;
        log::trace!("Scene storage grew to {} slots", storage.capacity());
        Ok(())
    }

    /// Make room for one more model group in the lookup table
    fn reserve_key(&mut self, index: &mut HashMap<ModelKey, usize>) -> Result<(), TryReserveError> {
        if index.len() < index.capacity() {
            return Ok(());
        }
        self.allocate()?;
        index.try_reserve(GROWTH_STEP)
    }

    #[cfg(not(test))]
    #[allow(clippy::unused_self, clippy::unnecessary_wraps)]
    fn allocate(&mut self) -> Result<(), TryReserveError> {
        Ok(())
    }

    #[cfg(test)]
    fn allocate(&mut self) -> Result<(), TryReserveError> {
        if let Some(remaining) = self.allocations_before_failure.as_mut() {
            if *remaining == 0 {
                self.allocations_before_failure = None;
                return Err(Vec::<u8>::new().try_reserve(usize::MAX).unwrap_err());
            }
            *remaining -= 1;
        }
        Ok(())
    }
}

/// The renderable aggregate of one frame
#[derive(Debug, Default)]
pub struct Scene<'a> {
    groups: Vec<Vec<&'a Entity<'a>>>,
    group_index: HashMap<ModelKey, usize>,
    entity_count: usize,
    lights: Vec<&'a Light>,
    environment: Option<&'a Environment>,
    growth: Growth,
}

impl<'a> Scene<'a> {
    /// Empty scene; nothing is allocated until the first insertion
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entity, keeping entities grouped by model
    ///
    /// The same entity may be added more than once; it is then drawn once per entry.
    pub fn add_entity(&mut self, entity: &'a Entity<'a>) -> SceneResult<()> {
        let key = model_key(entity.model());

        if let Some(&index) = self.group_index.get(&key) {
            self.growth.reserve_step(&mut self.groups[index])?;
            self.groups[index].push(entity);
        } else {
            self.growth.reserve_step(&mut self.groups)?;
            self.growth.reserve_key(&mut self.group_index)?;
            let mut group = Vec::new();
            self.growth.reserve_step(&mut group)?;

            group.push(entity);
            self.group_index.insert(key, self.groups.len());
            self.groups.push(group);
            log::trace!("Scene now holds {} models", self.groups.len());
        }

        self.entity_count += 1;
        Ok(())
    }

    /// Register a light
    pub fn add_light(&mut self, light: &'a Light) -> SceneResult<()> {
        self.growth.reserve_step(&mut self.lights)?;
        self.lights.push(light);
        Ok(())
    }

    /// Replace the environment reference (last write wins)
    pub fn assign_environment(&mut self, environment: &'a Environment) {
        self.environment = Some(environment);
    }

    /// Entities in draw order: grouped by model, insertion order within a group
    pub fn entities(&self) -> impl Iterator<Item = &'a Entity<'a>> + '_ {
        self.groups.iter().flat_map(|group| group.iter().copied())
    }

    /// Number of registered entities
    pub fn entity_count(&self) -> usize {
        self.entity_count
    }

    /// Number of distinct models among the registered entities
    pub fn model_count(&self) -> usize {
        self.groups.len()
    }

    /// Lights in registration order
    pub fn lights(&self) -> &[&'a Light] {
        &self.lights
    }

    /// Number of registered lights
    pub fn light_count(&self) -> usize {
        self.lights.len()
    }

    /// Image-based lighting environment, if assigned
    pub fn environment(&self) -> Option<&'a Environment> {
        self.environment
    }

    /// Allocated entity slots across all model groups
    pub fn entity_capacity(&self) -> usize {
        self.groups.iter().map(Vec::capacity).sum()
    }

    /// Allocated light slots
    pub fn light_capacity(&self) -> usize {
        self.lights.capacity()
    }

    /// Let `successes` more storage growths succeed, then fail the next one
    #[cfg(test)]
    fn fail_growth_after(&mut self, successes: usize) {
        self.growth.allocations_before_failure = Some(successes);
    }
}
