// Copyright (c) 2026 Pegasus Heavy Industries LLC
// Licensed under the MIT License

//! Fan curve definitions, interpolation, and sampling.
//!
//! A curve maps temperatures in degrees Celsius to fan speed percentages
//! (0-100). Two interpolation modes are supported: gradual (linear between
//! control points, clamped at the ends) and hard-cut (step function that
//! only changes speed at threshold crossings).

use serde::{Deserialize, Serialize};

/// A single control point on a fan curve.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ControlPoint {
    /// Temperature in degrees Celsius
    pub temperature: f64,
    /// Fan speed percentage (0-100)
    pub fan_speed: f64,
}

/// How speeds are derived between control points.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InterpolationMode {
    /// Linear interpolation between points, clamped at the ends.
    #[default]
    Gradual,
    /// Step function: speed changes only at threshold crossings.
    HardCut,
}

// Unknown mode strings fall back to gradual.
impl<'de> Deserialize<'de> for InterpolationMode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let mode = String::deserialize(deserializer)?;
        Ok(match mode.as_str() {
            "hardcut" => InterpolationMode::HardCut,
            _ => InterpolationMode::Gradual,
        })
    }
}

/// A complete fan curve configuration: the control points plus the
/// interpolation mode. Points may be stored in any order; every consumer
/// sorts a working copy by temperature before use.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FanCurve {
    /// Control points, in any order. Duplicate temperatures are tolerated.
    #[serde(default)]
    pub points: Vec<ControlPoint>,
    /// Interpolation mode selector.
    #[serde(rename = "interpolationMode", default)]
    pub mode: InterpolationMode,
}

impl FanCurve {
    pub fn new(points: Vec<ControlPoint>, mode: InterpolationMode) -> Self {
        Self { points, mode }
    }

    /// Evaluate the fan speed for a given temperature.
    ///
    /// Always returns a defined value: an empty curve evaluates to 0 for
    /// any temperature in either mode.
    pub fn evaluate(&self, temperature: f64) -> f64 {
        if self.points.is_empty() {
            return 0.0;
        }

        let points = self.sorted_points();
        match self.mode {
            InterpolationMode::Gradual => evaluate_gradual(&points, temperature),
            InterpolationMode::HardCut => evaluate_hard_cut(&points, temperature),
        }
    }

    /// Sample the curve at every integer temperature from 0 to 100
    /// inclusive, for visualization. Control points are echoed through in
    /// their original order.
    pub fn sample(&self) -> SampledCurve {
        let curve_data = (0..=100u8)
            .map(|t| SamplePoint {
                x: t,
                y: self.evaluate(f64::from(t)),
            })
            .collect();

        SampledCurve {
            curve_data,
            control_points: self.points.clone(),
        }
    }

    fn sorted_points(&self) -> Vec<ControlPoint> {
        let mut points = self.points.clone();
        points.sort_by(|a, b| a.temperature.total_cmp(&b.temperature));
        points
    }
}

/// The default curve shipped when nothing has been configured yet.
pub fn default_curve() -> FanCurve {
    FanCurve::new(
        vec![
            ControlPoint { temperature: 30.0, fan_speed: 25.0 },
            ControlPoint { temperature: 60.0, fan_speed: 50.0 },
            ControlPoint { temperature: 80.0, fan_speed: 100.0 },
        ],
        InterpolationMode::Gradual,
    )
}

/// Convert an evaluated speed to the integer percentage sent on the wire.
pub fn speed_percent(speed: f64) -> u8 {
    speed.round().clamp(0.0, 100.0) as u8
}

/// Linear interpolation with edge clamping. `points` must be sorted and
/// non-empty.
fn evaluate_gradual(points: &[ControlPoint], temperature: f64) -> f64 {
    if points.len() == 1 || temperature <= points[0].temperature {
        return points[0].fan_speed;
    }

    let last = &points[points.len() - 1];
    if temperature >= last.temperature {
        return last.fan_speed;
    }

    // First bracketing pair in ascending order wins. A zero-width bracket
    // (duplicate temperatures) yields the lower point's speed.
    for window in points.windows(2) {
        let p1 = &window[0];
        let p2 = &window[1];

        if temperature >= p1.temperature && temperature <= p2.temperature {
            let range_t = p2.temperature - p1.temperature;
            if range_t == 0.0 {
                return p1.fan_speed;
            }
            let ratio = (temperature - p1.temperature) / range_t;
            return p1.fan_speed + ratio * (p2.fan_speed - p1.fan_speed);
        }
    }

    last.fan_speed
}

/// Step interpolation: the last point at or below the temperature wins.
/// Below every threshold the fan is off; this deliberately differs from
/// gradual mode's clamp to the lowest point.
fn evaluate_hard_cut(points: &[ControlPoint], temperature: f64) -> f64 {
    let mut speed = 0.0;
    for p in points {
        if p.temperature <= temperature {
            speed = p.fan_speed;
        } else {
            break;
        }
    }
    speed
}

/// A single sampled point on the rendered curve.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SamplePoint {
    /// Temperature in degrees Celsius
    pub x: u8,
    /// Fan speed percentage
    pub y: f64,
}

/// A fan curve sampled across the full 0-100 degree domain. This is a
/// derived view: it is recomputed from the control points on demand and
/// never treated as authoritative state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SampledCurve {
    pub curve_data: Vec<SamplePoint>,
    pub control_points: Vec<ControlPoint>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(temperature: f64, fan_speed: f64) -> ControlPoint {
        ControlPoint { temperature, fan_speed }
    }

    #[test]
    fn test_gradual_linear_blend() {
        let curve = default_curve();
        assert_eq!(curve.evaluate(45.0), 37.5);
    }

    #[test]
    fn test_gradual_exact_points() {
        let curve = default_curve();
        assert_eq!(curve.evaluate(30.0), 25.0);
        assert_eq!(curve.evaluate(60.0), 50.0);
        assert_eq!(curve.evaluate(80.0), 100.0);
    }

    #[test]
    fn test_gradual_clamps_below_and_above() {
        let curve = default_curve();
        assert_eq!(curve.evaluate(10.0), 25.0);
        assert_eq!(curve.evaluate(95.0), 100.0);

        let two = FanCurve::new(
            vec![point(30.0, 25.0), point(60.0, 50.0)],
            InterpolationMode::Gradual,
        );
        assert_eq!(two.evaluate(10.0), 25.0);
        assert_eq!(two.evaluate(90.0), 50.0);
    }

    #[test]
    fn test_gradual_single_point() {
        let curve = FanCurve::new(vec![point(50.0, 42.0)], InterpolationMode::Gradual);
        assert_eq!(curve.evaluate(0.0), 42.0);
        assert_eq!(curve.evaluate(50.0), 42.0);
        assert_eq!(curve.evaluate(100.0), 42.0);
    }

    #[test]
    fn test_hard_cut_thresholds() {
        let curve = FanCurve::new(
            vec![point(30.0, 25.0), point(60.0, 50.0), point(80.0, 100.0)],
            InterpolationMode::HardCut,
        );
        assert_eq!(curve.evaluate(59.0), 25.0);
        assert_eq!(curve.evaluate(60.0), 50.0);
        assert_eq!(curve.evaluate(85.0), 100.0);
    }

    #[test]
    fn test_hard_cut_below_all_thresholds_is_off() {
        let curve = FanCurve::new(
            vec![point(30.0, 25.0), point(60.0, 50.0)],
            InterpolationMode::HardCut,
        );
        assert_eq!(curve.evaluate(10.0), 0.0);
    }

    #[test]
    fn test_empty_curve_is_zero() {
        for mode in [InterpolationMode::Gradual, InterpolationMode::HardCut] {
            let curve = FanCurve::new(Vec::new(), mode);
            assert_eq!(curve.evaluate(-10.0), 0.0);
            assert_eq!(curve.evaluate(50.0), 0.0);
            assert_eq!(curve.evaluate(200.0), 0.0);
        }
    }

    #[test]
    fn test_point_order_does_not_matter() {
        let sorted = default_curve();
        let shuffled = FanCurve::new(
            vec![point(80.0, 100.0), point(30.0, 25.0), point(60.0, 50.0)],
            InterpolationMode::Gradual,
        );
        for t in 0..=100 {
            assert_eq!(sorted.evaluate(f64::from(t)), shuffled.evaluate(f64::from(t)));
        }
        assert_eq!(sorted.sample().curve_data, shuffled.sample().curve_data);
    }

    #[test]
    fn test_duplicate_temperature_first_bracket_wins() {
        let curve = FanCurve::new(
            vec![
                point(30.0, 25.0),
                point(50.0, 20.0),
                point(50.0, 80.0),
                point(70.0, 100.0),
            ],
            InterpolationMode::Gradual,
        );
        // The ascending scan reaches the (30,25)-(50,20) bracket first.
        assert_eq!(curve.evaluate(50.0), 20.0);
    }

    #[test]
    fn test_unknown_mode_defaults_to_gradual() {
        let curve: FanCurve =
            serde_json::from_str(r#"{"points": [], "interpolationMode": "bezier"}"#).unwrap();
        assert_eq!(curve.mode, InterpolationMode::Gradual);

        let curve: FanCurve =
            serde_json::from_str(r#"{"points": [], "interpolationMode": "hardcut"}"#).unwrap();
        assert_eq!(curve.mode, InterpolationMode::HardCut);
    }

    #[test]
    fn test_wire_field_names() {
        let json = serde_json::to_string(&default_curve()).unwrap();
        assert!(json.contains("\"interpolationMode\":\"gradual\""));
        assert!(json.contains("\"fanSpeed\""));
        assert!(json.contains("\"temperature\""));
    }

    #[test]
    fn test_sample_covers_full_domain() {
        let curve = default_curve();
        let sampled = curve.sample();
        assert_eq!(sampled.curve_data.len(), 101);
        for (i, sample) in sampled.curve_data.iter().enumerate() {
            assert_eq!(usize::from(sample.x), i);
            assert_eq!(sample.y, curve.evaluate(f64::from(sample.x)));
        }
        assert_eq!(sampled.control_points, curve.points);
    }

    #[test]
    fn test_speed_percent_rounds_to_nearest() {
        assert_eq!(speed_percent(37.5), 38);
        assert_eq!(speed_percent(37.4), 37);
        assert_eq!(speed_percent(0.0), 0);
        assert_eq!(speed_percent(120.0), 100);
        assert_eq!(speed_percent(-5.0), 0);
    }
}
