use bevy::prelude::*;
use bevy_hanabi::prelude::*;

use crate::luck_lab::particles::{ParticleBurst, ParticleHooks};

/// GPU sparkle burst played when a roll lands.
#[derive(Clone)]
pub struct HanabiBurst {
    pub effect: Handle<EffectAsset>,
}

impl ParticleBurst for HanabiBurst {
    fn burst(&self, commands: &mut Commands, origin: Vec3) -> Option<Entity> {
        let entity = commands
            .spawn((
                ParticleEffect::new(self.effect.clone()),
                Transform::from_translation(origin),
                Visibility::Visible,
                Name::new("RollBurst"),
            ))
            .id();
        Some(entity)
    }
}

pub fn init_hanabi_burst(mut commands: Commands, mut effects: ResMut<Assets<EffectAsset>>) {
    let effect = effects.add(make_roll_burst_fx());
    commands.insert_resource(ParticleHooks::new(HanabiBurst { effect }));
}

fn make_roll_burst_fx() -> EffectAsset {
    let mut color = bevy_hanabi::Gradient::new();
    color.add_key(0.0, Vec4::new(6.0, 5.0, 1.5, 1.0));
    color.add_key(0.4, Vec4::new(2.0, 3.0, 6.0, 0.9));
    color.add_key(1.0, Vec4::new(0.0, 0.0, 0.0, 0.0));

    let mut size = bevy_hanabi::Gradient::new();
    size.add_key(0.0, Vec3::splat(0.03));
    size.add_key(0.5, Vec3::splat(0.04));
    size.add_key(1.0, Vec3::splat(0.005));

    let w = ExprWriter::new();
    let center = w.lit(Vec3::ZERO).expr();
    let radius = w.lit(0.15).expr();

    // Speed in [1.5:4.0]
    let speed = w
        .lit(1.5)
        .add(w.rand(ScalarType::Float).mul(w.lit(2.5)));

    // Lifetime in [0.6:1.4]
    let lifetime = w
        .lit(0.6)
        .add(w.rand(ScalarType::Float).mul(w.lit(0.8)));

    let gravity = w.lit(Vec3::new(0.0, -3.0, 0.0)).expr();
    let drag = w.lit(1.5).expr();

    let module = w.finish();

    EffectAsset::new(2048, SpawnerSettings::once(400.0.into()), module)
        .with_name("roll_burst")
        .init(SetPositionSphereModifier {
            center,
            radius,
            dimension: ShapeDimension::Surface,
        })
        .init(SetVelocitySphereModifier {
            center,
            speed: speed.expr(),
        })
        .init(SetAttributeModifier::new(Attribute::LIFETIME, lifetime.expr()))
        .update(AccelModifier::new(gravity))
        .update(LinearDragModifier::new(drag))
        .render(ColorOverLifetimeModifier::new(color))
        .render(SizeOverLifetimeModifier {
            gradient: size,
            screen_space_size: false,
        })
}
