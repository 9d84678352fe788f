use std::fmt;
use std::str::FromStr;

/// Shapes the blend scalar over the normalised transition time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EasingCurve {
    Linear,
    Smoothstep,
    EaseInOut,
    /// Cubic ease-out, fast start and gentle landing.
    #[default]
    EaseOut,
}

impl EasingCurve {
    /// Maps progress `t` to a blend value; input is clamped to `[0, 1]`.
    pub fn sample(self, t: f32) -> f32 {
        let clamped = t.clamp(0.0, 1.0);
        match self {
            EasingCurve::Linear => clamped,
            EasingCurve::Smoothstep => clamped * clamped * (3.0 - 2.0 * clamped),
            EasingCurve::EaseInOut => {
                if clamped < 0.5 {
                    2.0 * clamped * clamped
                } else {
                    -1.0 + (4.0 - 2.0 * clamped) * clamped
                }
            }
            EasingCurve::EaseOut => {
                let inverse = 1.0 - clamped;
                1.0 - inverse * inverse * inverse
            }
        }
    }
}

impl fmt::Display for EasingCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EasingCurve::Linear => f.write_str("linear"),
            EasingCurve::Smoothstep => f.write_str("smoothstep"),
            EasingCurve::EaseInOut => f.write_str("ease-in-out"),
            EasingCurve::EaseOut => f.write_str("ease-out"),
        }
    }
}

impl FromStr for EasingCurve {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase().replace('_', "-");
        match normalized.as_str() {
            "linear" => Ok(EasingCurve::Linear),
            "smoothstep" | "smooth" => Ok(EasingCurve::Smoothstep),
            "ease-in-out" | "easeinout" => Ok(EasingCurve::EaseInOut),
            "ease-out" | "easeout" | "power2" => Ok(EasingCurve::EaseOut),
            other => Err(format!(
                "unknown easing curve '{other}'; expected linear, smoothstep, ease-in-out, or ease-out"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [EasingCurve; 4] = [
        EasingCurve::Linear,
        EasingCurve::Smoothstep,
        EasingCurve::EaseInOut,
        EasingCurve::EaseOut,
    ];

    #[test]
    fn curves_pin_endpoints() {
        for curve in ALL {
            assert!(curve.sample(0.0).abs() < 1e-6, "{curve} at 0");
            assert!((curve.sample(1.0) - 1.0).abs() < 1e-6, "{curve} at 1");
        }
    }

    #[test]
    fn curves_increase_monotonically() {
        for curve in ALL {
            let mut last = 0.0;
            for step in 0..=20 {
                let sample = curve.sample(step as f32 / 20.0);
                assert!(sample >= last - f32::EPSILON, "{curve} dipped at step {step}");
                last = sample;
            }
        }
    }

    #[test]
    fn ease_out_front_loads_progress() {
        let curve = EasingCurve::EaseOut;
        assert!((curve.sample(0.5) - 0.875).abs() < 1e-6);
        assert!(curve.sample(0.25) > 0.25);
    }

    #[test]
    fn out_of_range_input_is_clamped() {
        assert_eq!(EasingCurve::Linear.sample(-3.0), 0.0);
        assert_eq!(EasingCurve::EaseOut.sample(7.0), 1.0);
    }

    #[test]
    fn parses_names_round_trip() {
        for curve in ALL {
            assert_eq!(curve.to_string().parse::<EasingCurve>(), Ok(curve));
        }
        assert_eq!("Ease_Out".parse::<EasingCurve>(), Ok(EasingCurve::EaseOut));
        assert!("bounce".parse::<EasingCurve>().is_err());
    }
}
