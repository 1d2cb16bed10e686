use std::time::Duration;

use crate::interpolate::clamp_frame_delta;

const SUBSTEP_SECONDS: f64 = 0.001;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpringConfig {
    pub stiffness: f64,
    pub damping: f64,
    pub mass: f64,
    /// Distance from the target under which the spring may come to rest.
    pub rest_delta: f64,
    /// Speed under which the spring may come to rest.
    pub rest_speed: f64,
}

impl SpringConfig {
    /// Smoothing applied to hero scroll progress. Damping ratio is well above
    /// one, so the filtered value never overshoots.
    pub const HERO_PROGRESS: Self = Self {
        stiffness: 80.0,
        damping: 40.0,
        mass: 1.0,
        rest_delta: 0.005,
        rest_speed: 0.01,
    };

    /// Smoothing applied to raw scroll velocity (pixels per second).
    pub const MARQUEE_VELOCITY: Self = Self {
        stiffness: 400.0,
        damping: 50.0,
        mass: 1.0,
        rest_delta: 0.5,
        rest_speed: 2.0,
    };

    pub fn damping_ratio(&self) -> f64 {
        self.damping / (2.0 * (self.stiffness * self.mass).sqrt())
    }
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self::HERO_PROGRESS
    }
}

/// Damped spring following a moving target.
#[derive(Debug, Clone, PartialEq)]
pub struct Spring {
    config: SpringConfig,
    position: f64,
    velocity: f64,
}

impl Spring {
    pub fn new(config: SpringConfig, initial: f64) -> Self {
        Self {
            config,
            position: initial,
            velocity: 0.0,
        }
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    pub fn is_at_rest(&self, target: f64) -> bool {
        self.position == target && self.velocity == 0.0
    }

    /// Moves straight to `value` and drops any velocity.
    pub fn jump_to(&mut self, value: f64) {
        self.position = value;
        self.velocity = 0.0;
    }

    /// Integrates towards `target` over `delta` and returns the new position.
    ///
    /// Semi-implicit Euler with fixed 1 ms substeps; the last partial substep
    /// uses the remainder so the total simulated time equals the clamped delta.
    /// If the integration overflows, the spring lands on `target` at rest.
    pub fn step(&mut self, target: f64, delta: Duration) -> f64 {
        let SpringConfig {
            stiffness,
            damping,
            mass,
            rest_delta,
            rest_speed,
        } = self.config;

        let mut remaining = clamp_frame_delta(delta).as_secs_f64();
        while remaining > 0.0 {
            let h = remaining.min(SUBSTEP_SECONDS);
            let spring_force = -stiffness * (self.position - target);
            let damping_force = -damping * self.velocity;
            self.velocity += (spring_force + damping_force) / mass * h;
            self.position += self.velocity * h;
            remaining -= h;
        }

        if !self.position.is_finite() || !self.velocity.is_finite() {
            self.jump_to(target);
            return self.position;
        }
        if (target - self.position).abs() < rest_delta && self.velocity.abs() < rest_speed {
            self.jump_to(target);
        }
        self.position
    }
}

#[cfg(test)]
#[path = "tests/spring_tests.rs"]
mod tests;
