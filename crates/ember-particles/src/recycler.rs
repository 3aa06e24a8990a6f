//! Sprite arena with a LIFO free list for O(1) reuse

use crate::host::{Instantiator, ParticleContainer, ParticleHandle};
use crate::sprite::ParticleSprite;
use ember_core::Result;

/// Stable index of a sprite inside its recycler's arena
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct SpriteId(u32);

impl SpriteId {
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

/// Borrowed host collaborators needed to create a new sprite
pub struct SpriteFactory<'a, H> {
    pub container: &'a mut dyn ParticleContainer<H>,
    pub instantiator: &'a mut dyn Instantiator<H>,
}

/// Owns every sprite ever created for one system.
///
/// Sprites never leave the arena; retiring one pushes its id onto the free
/// list, and the next acquire pops the most recently retired id.
pub struct ParticleRecycler<H> {
    sprites: Vec<ParticleSprite<H>>,
    free: Vec<SpriteId>,
}

impl<H> Default for ParticleRecycler<H> {
    fn default() -> Self {
        Self {
            sprites: Vec::new(),
            free: Vec::new(),
        }
    }
}

impl<H: ParticleHandle> ParticleRecycler<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sprites ever created. Never decreases.
    pub fn total_created(&self) -> usize {
        self.sprites.len()
    }

    /// Number of retired sprites waiting for reuse
    pub fn pool_size(&self) -> usize {
        self.free.len()
    }

    pub fn get(&self, id: SpriteId) -> Option<&ParticleSprite<H>> {
        self.sprites.get(id.index())
    }

    pub fn get_mut(&mut self, id: SpriteId) -> Option<&mut ParticleSprite<H>> {
        self.sprites.get_mut(id.index())
    }

    pub(crate) fn sprite(&self, id: SpriteId) -> &ParticleSprite<H> {
        &self.sprites[id.index()]
    }

    pub(crate) fn sprite_mut(&mut self, id: SpriteId) -> &mut ParticleSprite<H> {
        &mut self.sprites[id.index()]
    }

    /// Hand out an active sprite, reusing the last retired one when possible.
    ///
    /// Only fails when the host cannot create or attach a new handle.
    pub fn acquire(
        &mut self,
        max_alive_time: f32,
        factory: &mut SpriteFactory<'_, H>,
    ) -> Result<SpriteId> {
        if let Some(id) = self.free.pop() {
            self.sprite_mut(id).activate(max_alive_time);
            return Ok(id);
        }

        let mut handle = factory.instantiator.instantiate()?;
        let name = format!("particleSprite{}", self.sprites.len());
        factory.container.add_child(&name, &mut handle)?;

        let id = SpriteId(self.sprites.len() as u32);
        self.sprites.push(ParticleSprite::new(handle, max_alive_time));
        log::trace!("[particles] created {name}");
        Ok(id)
    }

    /// Deactivate a sprite and store it for reuse
    pub fn release(&mut self, id: SpriteId) {
        debug_assert!(!self.free.contains(&id), "sprite {id:?} released twice");
        self.sprite_mut(id).deactivate();
        self.free.push(id);
    }
}
