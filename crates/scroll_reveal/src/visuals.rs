use serde::Serialize;

use crate::interpolate::interpolate;

/// Fixed ranges the hero animates over.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeroLayout {
    pub scale_from: f64,
    pub scale_to: f64,
    /// Vertical distance, in pixels, each mask travels over the full scroll.
    pub mask_travel: f64,
    /// Progress at which the centre divider has fully faded out.
    pub divider_fade_end: f64,
    /// Progress at which the typed text has fully faded in.
    pub text_fade_end: f64,
}

impl Default for HeroLayout {
    fn default() -> Self {
        Self {
            scale_from: 1.5,
            scale_to: 1.0,
            mask_travel: 1600.0,
            divider_fade_end: 0.001,
            text_fade_end: 0.05,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VisualOffsets {
    pub scale: f64,
    pub top_mask_offset: f64,
    pub bottom_mask_offset: f64,
    pub divider_opacity: f64,
    pub text_opacity: f64,
}

/// Geometry extrapolates past the nominal `[0, 1]` range; opacities clamp.
pub fn derive_visual_offsets(smoothed: f64, layout: &HeroLayout) -> VisualOffsets {
    let progress = if smoothed.is_finite() { smoothed } else { 0.0 };
    VisualOffsets {
        scale: interpolate(
            progress,
            (0.0, 1.0),
            (layout.scale_from, layout.scale_to),
            false,
        ),
        top_mask_offset: interpolate(progress, (0.0, 1.0), (0.0, -layout.mask_travel), false),
        bottom_mask_offset: interpolate(progress, (0.0, 1.0), (0.0, layout.mask_travel), false),
        divider_opacity: interpolate(progress, (0.0, layout.divider_fade_end), (1.0, 0.0), true),
        text_opacity: interpolate(progress, (0.0, layout.text_fade_end), (0.0, 1.0), true),
    }
}
