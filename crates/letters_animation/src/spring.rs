//! Spring physics for the jump preset
//!
//! RK4-integrated damped spring. The jump preset describes its curve the way
//! UI toolkits usually do, as a damping ratio and a stiffness, and samples
//! the displacement at the elapsed time of a character's reveal.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Medium bouncy damping ratio (visible overshoot)
pub const DAMPING_RATIO_MEDIUM_BOUNCY: f32 = 0.5;
/// Medium-low stiffness (a relaxed, readable jump)
pub const STIFFNESS_MEDIUM_LOW: f32 = 400.0;

/// Integration step used when sampling a spring at an arbitrary time
const SAMPLE_STEP: f32 = 1.0 / 240.0;

/// User-facing spring parameters
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpringParams {
    #[serde(default = "default_damping_ratio")]
    pub damping_ratio: f32,
    #[serde(default = "default_stiffness")]
    pub stiffness: f32,
}

fn default_damping_ratio() -> f32 {
    DAMPING_RATIO_MEDIUM_BOUNCY
}

fn default_stiffness() -> f32 {
    STIFFNESS_MEDIUM_LOW
}

impl Default for SpringParams {
    fn default() -> Self {
        Self {
            damping_ratio: DAMPING_RATIO_MEDIUM_BOUNCY,
            stiffness: STIFFNESS_MEDIUM_LOW,
        }
    }
}

impl SpringParams {
    pub fn new(damping_ratio: f32, stiffness: f32) -> Self {
        Self {
            damping_ratio,
            stiffness,
        }
    }

    pub fn config(&self) -> SpringConfig {
        SpringConfig::from_damping_ratio(self.damping_ratio, self.stiffness)
    }
}

/// Physical configuration of a spring
#[derive(Clone, Copy, Debug)]
pub struct SpringConfig {
    pub stiffness: f32,
    pub damping: f32,
    pub mass: f32,
}

impl SpringConfig {
    pub fn new(stiffness: f32, damping: f32, mass: f32) -> Self {
        Self {
            stiffness,
            damping,
            mass,
        }
    }

    /// Unit-mass spring whose damping is `ratio` times critical damping
    pub fn from_damping_ratio(ratio: f32, stiffness: f32) -> Self {
        let stiffness = stiffness.max(f32::EPSILON);
        Self {
            stiffness,
            damping: ratio.max(0.0) * 2.0 * stiffness.sqrt(),
            mass: 1.0,
        }
    }

    pub fn critical_damping(&self) -> f32 {
        2.0 * (self.stiffness * self.mass).sqrt()
    }

    pub fn is_underdamped(&self) -> bool {
        self.damping < self.critical_damping()
    }
}

impl Default for SpringConfig {
    fn default() -> Self {
        SpringParams::default().config()
    }
}

/// A spring-driven scalar
#[derive(Clone, Copy, Debug)]
pub struct Spring {
    config: SpringConfig,
    value: f32,
    velocity: f32,
    target: f32,
}

impl Spring {
    pub fn new(config: SpringConfig, initial: f32) -> Self {
        Self {
            config,
            value: initial,
            velocity: 0.0,
            target: initial,
        }
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn set_target(&mut self, target: f32) {
        self.target = target;
    }

    /// Within a hundredth of a unit of the target and nearly at rest
    pub fn is_settled(&self) -> bool {
        (self.value - self.target).abs() < 0.01 && self.velocity.abs() < 0.1
    }

    /// Advance the simulation by `dt` seconds
    pub fn step(&mut self, dt: f32) {
        if self.is_settled() {
            self.value = self.target;
            self.velocity = 0.0;
            return;
        }

        let k1_v = self.acceleration(self.value, self.velocity);
        let k1_x = self.velocity;

        let k2_v = self.acceleration(
            self.value + k1_x * dt * 0.5,
            self.velocity + k1_v * dt * 0.5,
        );
        let k2_x = self.velocity + k1_v * dt * 0.5;

        let k3_v = self.acceleration(
            self.value + k2_x * dt * 0.5,
            self.velocity + k2_v * dt * 0.5,
        );
        let k3_x = self.velocity + k2_v * dt * 0.5;

        let k4_v = self.acceleration(self.value + k3_x * dt, self.velocity + k3_v * dt);
        let k4_x = self.velocity + k3_v * dt;

        self.velocity += (k1_v + 2.0 * k2_v + 2.0 * k3_v + k4_v) * dt / 6.0;
        self.value += (k1_x + 2.0 * k2_x + 2.0 * k3_x + k4_x) * dt / 6.0;
    }

    /// Value of a spring released at `from` toward `to`, after `elapsed`
    pub fn sample(config: SpringConfig, from: f32, to: f32, elapsed: Duration) -> f32 {
        let mut spring = Spring::new(config, from);
        spring.set_target(to);

        let mut remaining = elapsed.as_secs_f32();
        while remaining > 0.0 && !spring.is_settled() {
            let dt = remaining.min(SAMPLE_STEP);
            spring.step(dt);
            remaining -= dt;
        }
        if spring.is_settled() {
            spring.target
        } else {
            spring.value
        }
    }

    fn acceleration(&self, x: f32, v: f32) -> f32 {
        let spring_force = -self.config.stiffness * (x - self.target);
        let damping_force = -self.config.damping * v;
        (spring_force + damping_force) / self.config.mass
    }
}
