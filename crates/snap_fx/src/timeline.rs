//! Dissolve timeline: elapsed time in, visual parameters out.
//!
//! The timeline is a pure function of elapsed milliseconds. The host samples
//! it once per display frame and writes the resulting [`VisualParams`] to the
//! page; nothing here knows about frames, timers or the DOM.

use serde::{Deserialize, Serialize};

use crate::easing::Easing;
use crate::error::FxError;

/// Exclusive upper bound of the turbulence noise seed.
pub const NOISE_SEED_RANGE: u32 = 1000;

// ============================================================================
// Visual parameters
// ============================================================================

/// The three properties the dissolve animates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisualParams {
    /// `scale` attribute of the displacement map
    pub displacement: f32,
    /// Uniform scale applied to the image
    pub scale: f32,
    /// Image opacity
    pub opacity: f32,
}

impl VisualParams {
    /// Values the image has when no animation is running.
    pub fn resting() -> Self {
        Self {
            displacement: 0.0,
            scale: 1.0,
            opacity: 1.0,
        }
    }

    /// Whether these are the resting values.
    pub fn is_resting(&self) -> bool {
        *self == Self::resting()
    }

    /// CSS `transform` value for the image.
    pub fn transform_css(&self) -> String {
        format!("scale({})", self.scale)
    }

    /// Displacement map `scale` attribute value.
    pub fn displacement_attr(&self) -> String {
        self.displacement.to_string()
    }

    /// CSS `opacity` value.
    pub fn opacity_css(&self) -> String {
        self.opacity.to_string()
    }
}

impl Default for VisualParams {
    fn default() -> Self {
        Self::resting()
    }
}

// ============================================================================
// Settings
// ============================================================================

/// Tunable parameters of the dissolve.
///
/// Fields missing when deserializing take the [`DissolveSettings::cinematic`]
/// values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DissolveSettings {
    /// Total animation length in milliseconds
    pub duration_ms: f64,
    /// Displacement scale reached at the end of the animation
    pub max_displacement_scale: f32,
    /// Extra image scale reached at the end (`1 + delta`)
    pub scale_factor_delta: f32,
    /// Fraction of progress after which the image starts fading
    pub opacity_threshold: f32,
    /// Curve shaping displacement and scale
    pub easing: Easing,
    /// Curve shaping the fade after the threshold
    pub fade_easing: Easing,
}

impl DissolveSettings {
    /// Two second dissolve with symmetric easing and an eased late fade.
    pub fn cinematic() -> Self {
        Self {
            duration_ms: 2000.0,
            max_displacement_scale: 1500.0,
            scale_factor_delta: 0.15,
            opacity_threshold: 0.6,
            easing: Easing::CubicInOut,
            fade_easing: Easing::CubicInOut,
        }
    }

    /// One second dissolve with a fast start and a linear fade from halfway.
    pub fn classic() -> Self {
        Self {
            duration_ms: 1000.0,
            max_displacement_scale: 2000.0,
            scale_factor_delta: 0.1,
            opacity_threshold: 0.5,
            easing: Easing::CubicOut,
            fade_easing: Easing::Linear,
        }
    }

    /// Check that the settings describe a finite animation.
    pub fn validate(&self) -> Result<(), FxError> {
        if !self.duration_ms.is_finite() || self.duration_ms <= 0.0 {
            return Err(FxError::InvalidDuration {
                duration_ms: self.duration_ms,
            });
        }
        if !(0.0..1.0).contains(&self.opacity_threshold) {
            return Err(FxError::InvalidThreshold {
                threshold: self.opacity_threshold,
            });
        }
        if !self.max_displacement_scale.is_finite() || self.max_displacement_scale < 0.0 {
            return Err(FxError::InvalidScale {
                name: "max_displacement_scale",
                value: self.max_displacement_scale,
            });
        }
        if !self.scale_factor_delta.is_finite() {
            return Err(FxError::InvalidScale {
                name: "scale_factor_delta",
                value: self.scale_factor_delta,
            });
        }
        Ok(())
    }
}

impl Default for DissolveSettings {
    fn default() -> Self {
        Self::cinematic()
    }
}

// ============================================================================
// Timeline
// ============================================================================

/// One sample of the timeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    /// Linear progress in `[0, 1]`
    pub progress: f32,
    /// Eased progress
    pub eased: f32,
    /// Values to apply this frame
    pub params: VisualParams,
}

impl Frame {
    /// True once progress has reached the end.
    pub fn is_finished(&self) -> bool {
        self.progress >= 1.0
    }
}

/// A validated dissolve animation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DissolveTimeline {
    settings: DissolveSettings,
}

impl DissolveTimeline {
    /// Build a timeline, rejecting settings that cannot terminate.
    pub fn new(settings: DissolveSettings) -> Result<Self, FxError> {
        settings.validate()?;
        Ok(Self { settings })
    }

    pub fn settings(&self) -> &DissolveSettings {
        &self.settings
    }

    /// Linear progress after `elapsed_ms`. Negative elapsed time counts as zero.
    pub fn progress(&self, elapsed_ms: f64) -> f32 {
        (elapsed_ms / self.settings.duration_ms).clamp(0.0, 1.0) as f32
    }

    /// Sample the animation after `elapsed_ms`.
    pub fn sample(&self, elapsed_ms: f64) -> Frame {
        let s = &self.settings;
        let progress = self.progress(elapsed_ms);
        let eased = s.easing.apply(progress);

        let opacity = if progress < s.opacity_threshold {
            1.0
        } else {
            let fade = (progress - s.opacity_threshold) / (1.0 - s.opacity_threshold);
            1.0 - s.fade_easing.apply(fade)
        };

        Frame {
            progress,
            eased,
            params: VisualParams {
                displacement: eased * s.max_displacement_scale,
                scale: 1.0 + s.scale_factor_delta * eased,
                opacity,
            },
        }
    }
}

impl Default for DissolveTimeline {
    fn default() -> Self {
        Self {
            settings: DissolveSettings::default(),
        }
    }
}

/// Map a uniform roll in `[0, 1)` to a turbulence seed in `[0, NOISE_SEED_RANGE)`.
pub fn noise_seed(roll: f64) -> u32 {
    let seed = (roll.clamp(0.0, 1.0) * f64::from(NOISE_SEED_RANGE)).floor() as u32;
    seed.min(NOISE_SEED_RANGE - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 0.0001;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn test_start_is_resting() {
        for settings in [DissolveSettings::cinematic(), DissolveSettings::classic()] {
            let timeline = DissolveTimeline::new(settings).unwrap();
            let frame = timeline.sample(0.0);
            assert_eq!(frame.progress, 0.0);
            assert!(frame.params.is_resting());
            assert!(!frame.is_finished());
        }
    }

    #[test]
    fn test_end_reaches_maximum() {
        let timeline = DissolveTimeline::new(DissolveSettings::cinematic()).unwrap();
        let frame = timeline.sample(2000.0);
        assert!(frame.is_finished());
        assert!(approx_eq(frame.params.displacement, 1500.0));
        assert!(approx_eq(frame.params.scale, 1.15));
        assert!(approx_eq(frame.params.opacity, 0.0));
    }

    #[test]
    fn test_elapsed_past_duration_is_clamped() {
        let timeline = DissolveTimeline::new(DissolveSettings::classic()).unwrap();
        assert_eq!(timeline.sample(5000.0), timeline.sample(1000.0));
        assert_eq!(timeline.progress(-20.0), 0.0);
    }

    #[test]
    fn test_opacity_holds_until_threshold() {
        let timeline = DissolveTimeline::new(DissolveSettings::cinematic()).unwrap();
        // 0.59 of 2000ms
        assert_eq!(timeline.sample(1180.0).params.opacity, 1.0);
        assert_eq!(timeline.sample(1200.0).params.opacity, 1.0);
        assert!(timeline.sample(1400.0).params.opacity < 1.0);
    }

    #[test]
    fn test_classic_fade_is_linear() {
        let timeline = DissolveTimeline::new(DissolveSettings::classic()).unwrap();
        assert!(approx_eq(timeline.sample(750.0).params.opacity, 0.5));
        assert!(approx_eq(timeline.sample(500.0).params.opacity, 1.0));
    }

    #[test]
    fn test_classic_midpoint_uses_cubic_out() {
        let timeline = DissolveTimeline::new(DissolveSettings::classic()).unwrap();
        let frame = timeline.sample(500.0);
        assert!(approx_eq(frame.eased, 0.875));
        assert!(approx_eq(frame.params.displacement, 1750.0));
        assert!(approx_eq(frame.params.scale, 1.0875));
    }

    #[test]
    fn test_rejects_zero_duration() {
        let settings = DissolveSettings {
            duration_ms: 0.0,
            ..DissolveSettings::classic()
        };
        assert!(matches!(
            DissolveTimeline::new(settings),
            Err(FxError::InvalidDuration { .. })
        ));
    }

    #[test]
    fn test_rejects_threshold_of_one() {
        let settings = DissolveSettings {
            opacity_threshold: 1.0,
            ..DissolveSettings::classic()
        };
        assert!(matches!(
            settings.validate(),
            Err(FxError::InvalidThreshold { .. })
        ));
    }

    #[test]
    fn test_rejects_negative_displacement() {
        let settings = DissolveSettings {
            max_displacement_scale: -1.0,
            ..DissolveSettings::cinematic()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_css_values() {
        let params = VisualParams {
            displacement: 750.5,
            scale: 1.1,
            opacity: 0.25,
        };
        assert_eq!(params.transform_css(), "scale(1.1)");
        assert_eq!(params.displacement_attr(), "750.5");
        assert_eq!(params.opacity_css(), "0.25");
        assert_eq!(VisualParams::resting().transform_css(), "scale(1)");
        assert_eq!(VisualParams::resting().displacement_attr(), "0");
    }

    #[test]
    fn test_noise_seed_range() {
        assert_eq!(noise_seed(0.0), 0);
        assert_eq!(noise_seed(0.4567), 456);
        assert_eq!(noise_seed(0.99999), 999);
        assert_eq!(noise_seed(1.0), 999);
    }

    #[test]
    fn test_settings_from_json() {
        let json = r#"{
            "duration_ms": 1500.0,
            "max_displacement_scale": 1000.0,
            "scale_factor_delta": 0.12,
            "opacity_threshold": 0.55,
            "easing": "cubic_out",
            "fade_easing": "linear"
        }"#;
        let settings: DissolveSettings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.easing, Easing::CubicOut);
        assert!(DissolveTimeline::new(settings).is_ok());
    }

    #[test]
    fn test_partial_settings_fill_from_cinematic() {
        let settings: DissolveSettings = serde_json::from_str(r#"{"duration_ms": 500.0}"#).unwrap();
        assert_eq!(settings.duration_ms, 500.0);
        assert_eq!(settings.opacity_threshold, 0.6);
        assert_eq!(settings.fade_easing, Easing::CubicInOut);
    }
}
