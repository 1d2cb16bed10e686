//! Frame-driven state for the landing page hero and marquee.
//!
//! Everything here is synchronous and allocation-free per frame. The host
//! owns the frame loop and feeds scroll samples in; the crate never reads a
//! clock on its own.

mod controller;
mod cursor;
mod interpolate;
mod marquee;
mod spring;
mod typewriter;
mod visuals;

pub use controller::{
    advance, ProgressSample, RevealConfig, RevealConfigError, RevealFrame, ScrollRevealController,
    ScrollState, SubscriptionId,
};
pub use cursor::CursorBlink;
pub use interpolate::{clamp_frame_delta, interpolate, wrap, MAX_FRAME_DELTA};
pub use marquee::ParallaxMarquee;
pub use spring::{Spring, SpringConfig};
pub use typewriter::{typed_length, typed_text};
pub use visuals::{derive_visual_offsets, HeroLayout, VisualOffsets};
