//! Particle burst hook
//!
//! Completed rolls ask the installed [`ParticleBurst`] for a celebratory
//! effect. Headless apps keep the default [`NoParticles`]; the windowed app
//! installs a GPU effect (see `hanabi_fx`). Every spawned burst is tagged
//! with a despawn time and cleaned up by [`despawn_expired_bursts`].

use bevy::prelude::*;

/// Something that can spawn a one-shot particle effect.
pub trait ParticleBurst: Send + Sync + 'static {
    /// Spawn an effect at `origin`, returning its entity if one was created.
    fn burst(&self, commands: &mut Commands, origin: Vec3) -> Option<Entity>;
}

/// Burst hook that spawns nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoParticles;

impl ParticleBurst for NoParticles {
    fn burst(&self, _commands: &mut Commands, _origin: Vec3) -> Option<Entity> {
        None
    }
}

/// The installed burst hook.
#[derive(Resource)]
pub struct ParticleHooks {
    pub burst: Box<dyn ParticleBurst>,
}

impl Default for ParticleHooks {
    fn default() -> Self {
        Self::new(NoParticles)
    }
}

impl ParticleHooks {
    pub fn new(burst: impl ParticleBurst) -> Self {
        Self {
            burst: Box::new(burst),
        }
    }

    /// Fire the hook and schedule the result for removal after `lifetime` seconds.
    pub fn spawn_burst(
        &self,
        commands: &mut Commands,
        origin: Vec3,
        now: f32,
        lifetime: f32,
    ) -> Option<Entity> {
        let entity = self.burst.burst(commands, origin)?;
        commands.entity(entity).insert(ParticleBurstInstance {
            despawn_at: now + lifetime.max(0.0),
        });
        Some(entity)
    }
}

/// A live particle burst and the elapsed time at which it is removed.
#[derive(Component, Debug, Clone, Copy)]
pub struct ParticleBurstInstance {
    pub despawn_at: f32,
}

pub fn despawn_expired_bursts(
    mut commands: Commands,
    time: Res<Time>,
    bursts: Query<(Entity, &ParticleBurstInstance)>,
) {
    let now = time.elapsed_secs();
    for (entity, burst) in &bursts {
        if now >= burst.despawn_at {
            commands.entity(entity).despawn();
        }
    }
}
