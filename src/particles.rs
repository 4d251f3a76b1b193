//! Emoji rain: the live set of falling glyphs.
//!
//! [`ParticleField`] owns every particle. New ones enter through
//! [`ParticleField::spawn_one`] (ambient rain) or [`ParticleField::burst`]
//! (heart taps); existing ones only change inside [`ParticleField::tick`].

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::config::{MAX_BURST, RainConfig, SpeedRange};
use crate::rng::{RandomSource, Xorshift};

/// The fixed glyph alphabet of the rain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Glyph {
    Sob,
    Heart,
    FingerHeart,
    Ribbon,
    TwoHearts,
    Grin,
}

impl Glyph {
    pub const ALL: [Glyph; 6] = [
        Glyph::Sob,
        Glyph::Heart,
        Glyph::FingerHeart,
        Glyph::Ribbon,
        Glyph::TwoHearts,
        Glyph::Grin,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Glyph::Sob => "😭",
            Glyph::Heart => "❤️",
            Glyph::FingerHeart => "🫰",
            Glyph::Ribbon => "🎀",
            Glyph::TwoHearts => "💕",
            Glyph::Grin => "😁",
        }
    }
}

/// Glyphs serialize as the emoji itself so JS can render a snapshot as-is.
#[cfg(feature = "serde")]
impl Serialize for Glyph {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

pub type ParticleId = u64;

/// One falling glyph. Positions are percentages of the container.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Particle {
    id: ParticleId,
    glyph: Glyph,
    x: f64,
    y: f64,
    speed: f64,
    rotation: f64,
}

impl Particle {
    pub fn id(&self) -> ParticleId {
        self.id
    }
    pub fn glyph(&self) -> Glyph {
        self.glyph
    }
    pub fn x(&self) -> f64 {
        self.x
    }
    pub fn y(&self) -> f64 {
        self.y
    }
    pub fn speed(&self) -> f64 {
        self.speed
    }
    pub fn rotation(&self) -> f64 {
        self.rotation
    }
}

pub struct ParticleField<R: RandomSource = Xorshift> {
    particles: Vec<Particle>,
    next_id: ParticleId,
    rng: R,
    tuning: RainConfig,
}

impl ParticleField<Xorshift> {
    pub fn new(tuning: RainConfig) -> Self {
        Self::with_rng(tuning, Xorshift::from_entropy())
    }
}

impl<R: RandomSource> ParticleField<R> {
    pub fn with_rng(tuning: RainConfig, rng: R) -> Self {
        Self {
            particles: Vec::new(),
            next_id: 0,
            rng,
            tuning,
        }
    }

    pub fn tuning(&self) -> &RainConfig {
        &self.tuning
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Append one ambient particle and return its id.
    pub fn spawn_one(&mut self) -> ParticleId {
        let speed = self.tuning.ambient_speed;
        let p = self.make_particle(speed);
        let id = p.id;
        self.particles.push(p);
        id
    }

    /// Append `count` particles at once using the burst speed range.
    /// Returns the number appended (always `count`).
    pub fn burst(&mut self, count: usize) -> usize {
        let speed = self.tuning.burst_speed;
        self.particles.reserve(count.min(MAX_BURST));
        for _ in 0..count {
            let p = self.make_particle(speed);
            self.particles.push(p);
        }
        count
    }

    /// Advance every particle one step, then drop the ones that left the frame.
    /// Returns how many were culled.
    pub fn tick(&mut self) -> usize {
        let step = self.tuning.rotation_step;
        let cull_y = self.tuning.cull_y;
        for p in self.particles.iter_mut() {
            p.y += p.speed;
            p.rotation += step;
        }
        let before = self.particles.len();
        self.particles.retain(|p| p.y < cull_y);
        before - self.particles.len()
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }

    fn make_particle(&mut self, speed: SpeedRange) -> Particle {
        let id = self.next_id;
        self.next_id += 1;
        Particle {
            id,
            glyph: Glyph::ALL[self.rng.index(Glyph::ALL.len())],
            x: self.rng.range(0.0, 100.0),
            y: self.tuning.spawn_y,
            speed: self.rng.range(speed.min, speed.max),
            rotation: self.rng.range(0.0, 360.0),
        }
    }
}
