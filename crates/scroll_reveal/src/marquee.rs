use std::time::Duration;

use crate::{
    interpolate::{clamp_frame_delta, interpolate, wrap},
    spring::{Spring, SpringConfig},
};

const WRAP_FROM: f64 = -20.0;
const WRAP_TO: f64 = -45.0;
/// Milliseconds over which the base velocity moves the text by one unit.
const VELOCITY_TIME_SCALE_MS: f64 = 1500.0;
const SCROLL_VELOCITY_RANGE: (f64, f64) = (0.0, 1000.0);
const VELOCITY_FACTOR_RANGE: (f64, f64) = (0.0, 5.0);

/// Horizontally scrolling "Request to Join" band.
///
/// The band drifts at `base_velocity` and speeds up with scroll velocity;
/// scrolling up flips its direction until the user scrolls down again.
#[derive(Debug, Clone, PartialEq)]
pub struct ParallaxMarquee {
    base_velocity: f64,
    base_x: f64,
    direction: f64,
    velocity: Spring,
}

impl ParallaxMarquee {
    pub fn new(base_velocity: f64) -> Self {
        Self {
            base_velocity,
            base_x: 0.0,
            direction: 1.0,
            velocity: Spring::new(SpringConfig::MARQUEE_VELOCITY, 0.0),
        }
    }

    pub fn base_x(&self) -> f64 {
        self.base_x
    }

    pub fn direction(&self) -> f64 {
        self.direction
    }

    /// Horizontal offset in percent of the band width.
    pub fn offset_percent(&self) -> f64 {
        wrap(WRAP_FROM, WRAP_TO, self.base_x)
    }

    /// Advances one animation frame given the page's raw scroll velocity in
    /// pixels per second, and returns the new offset.
    pub fn on_frame(&mut self, delta: Duration, scroll_velocity: f64) -> f64 {
        let delta = clamp_frame_delta(delta);
        let scroll_velocity = if scroll_velocity.is_finite() {
            scroll_velocity
        } else {
            0.0
        };
        let smoothed = self.velocity.step(scroll_velocity, delta);
        let velocity_factor = interpolate(
            smoothed,
            SCROLL_VELOCITY_RANGE,
            VELOCITY_FACTOR_RANGE,
            false,
        );

        let delta_ms = delta.as_secs_f64() * 1000.0;
        let mut move_by = self.direction * self.base_velocity * (delta_ms / VELOCITY_TIME_SCALE_MS);

        if velocity_factor < 0.0 {
            self.direction = -1.0;
        } else if velocity_factor > 0.0 {
            self.direction = 1.0;
        }

        move_by += self.direction * move_by * velocity_factor;
        let next = self.base_x + move_by;
        if next.is_finite() {
            self.base_x = next;
        }
        self.offset_percent()
    }
}

#[cfg(test)]
#[path = "tests/marquee_tests.rs"]
mod tests;
