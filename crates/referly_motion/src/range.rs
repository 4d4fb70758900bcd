//! Breakpoint mapping
//!
//! [`RangeMap`] maps a scalar through explicit `(input, output)` breakpoints:
//! clamped outside the input domain, linear (or eased) between neighbours.
//! [`ChannelMap`] fans one smoothed signal out to several transform
//! channels, each with its own breakpoints.

use crate::easing::Easing;
use crate::error::{MotionError, Result};
use crate::render::Transform;
use referly_core::Point;
use smallvec::SmallVec;

type Breakpoints = SmallVec<[f32; 4]>;

/// Piecewise-linear mapping between two scalar ranges
#[derive(Clone, Debug, PartialEq)]
pub struct RangeMap {
    input: Breakpoints,
    output: Breakpoints,
    easing: Easing,
}

impl RangeMap {
    /// Build a mapping from matching breakpoint lists.
    ///
    /// `input` must be non-empty, finite, and non-decreasing. Repeated input
    /// values are allowed and act as a step at that point.
    pub fn new(input: &[f32], output: &[f32]) -> Result<Self> {
        if input.is_empty() {
            return Err(MotionError::EmptyRange);
        }
        if input.len() != output.len() {
            return Err(MotionError::LengthMismatch {
                input: input.len(),
                output: output.len(),
            });
        }
        for (index, (x, y)) in input.iter().zip(output).enumerate() {
            if !x.is_finite() || !y.is_finite() {
                return Err(MotionError::NonFinite { index });
            }
        }
        if let Some(index) = input.windows(2).position(|w| w[1] < w[0]) {
            return Err(MotionError::Decreasing { index: index + 1 });
        }

        Ok(Self {
            input: SmallVec::from_slice(input),
            output: SmallVec::from_slice(output),
            easing: Easing::Linear,
        })
    }

    /// `[0, 1] -> [from, to]`
    pub fn linear(from: f32, to: f32) -> Result<Self> {
        Self::new(&[0.0, 1.0], &[from, to])
    }

    /// Builder: ease inside every segment
    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn input(&self) -> &[f32] {
        &self.input
    }

    pub fn output(&self) -> &[f32] {
        &self.output
    }

    /// Map `x` through the breakpoints
    pub fn map(&self, x: f32) -> f32 {
        let n = self.input.len();
        let (first, last) = (self.output[0], self.output[n - 1]);

        if x.is_nan() || x <= self.input[0] {
            return first;
        }
        if x >= self.input[n - 1] {
            return last;
        }

        // First breakpoint strictly greater than x. The one before it is
        // <= x, so the bracketing segment always has non-zero width; with
        // repeated inputs this lands after the step.
        let hi = self.input.partition_point(|&bp| bp <= x);
        let lo = hi - 1;

        let (x0, x1) = (self.input[lo], self.input[hi]);
        let (y0, y1) = (self.output[lo], self.output[hi]);
        let t = self.easing.apply((x - x0) / (x1 - x0));
        y0 + (y1 - y0) * t
    }
}

/// A transform property driven by a mapping
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Channel {
    Opacity,
    TranslateX,
    TranslateY,
    /// Uniform scale
    Scale,
    ScaleX,
    ScaleY,
    Rotate,
    RotateX,
    RotateY,
    Blur,
}

impl Channel {
    fn write(self, transform: &mut Transform, value: f32) {
        match self {
            Channel::Opacity => transform.opacity = value,
            Channel::TranslateX => transform.translate_x = value,
            Channel::TranslateY => transform.translate_y = value,
            Channel::Scale => {
                transform.scale_x = value;
                transform.scale_y = value;
            }
            Channel::ScaleX => transform.scale_x = value,
            Channel::ScaleY => transform.scale_y = value,
            Channel::Rotate => transform.rotate = value,
            Channel::RotateX => transform.rotate_x = value,
            Channel::RotateY => transform.rotate_y = value,
            Channel::Blur => transform.blur = value.max(0.0),
        }
    }
}

/// Which component of the smoothed signal feeds a channel
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Input {
    /// Scalar progress, or the X axis of a pointer offset
    #[default]
    Primary,
    /// The Y axis of a pointer offset
    Secondary,
}

/// One channel and the mapping that drives it
#[derive(Clone, Debug, PartialEq)]
pub struct ChannelBinding {
    pub channel: Channel,
    pub input: Input,
    pub map: RangeMap,
}

/// Fan-out from one smoothed signal to several channels
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChannelMap {
    bindings: SmallVec<[ChannelBinding; 4]>,
}

impl ChannelMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a channel to the primary input
    pub fn channel(self, channel: Channel, map: RangeMap) -> Self {
        self.bind(channel, Input::Primary, map)
    }

    /// Bind a channel to a specific input component
    pub fn bind(mut self, channel: Channel, input: Input, map: RangeMap) -> Self {
        self.bindings.push(ChannelBinding {
            channel,
            input,
            map,
        });
        self
    }

    pub fn bindings(&self) -> &[ChannelBinding] {
        &self.bindings
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Evaluate every binding. Channels without a binding keep their
    /// identity value; later bindings for the same channel win.
    pub fn map(&self, signal: Point) -> Transform {
        let mut transform = Transform::IDENTITY;
        for binding in &self.bindings {
            let x = match binding.input {
                Input::Primary => signal.x,
                Input::Secondary => signal.y,
            };
            binding.channel.write(&mut transform, binding.map.map(x));
        }
        transform
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn triangle_breakpoints() {
        let map = RangeMap::new(&[0.0, 0.5, 1.0], &[0.0, 1.0, 0.0]).unwrap();
        let cases = [
            (-1.0, 0.0),
            (0.0, 0.0),
            (0.25, 0.5),
            (0.5, 1.0),
            (0.75, 0.5),
            (1.0, 0.0),
            (2.0, 0.0),
        ];
        for (x, expected) in cases {
            assert!((map.map(x) - expected).abs() < 1e-6, "map({x})");
        }
    }

    #[test]
    fn zero_width_segment_is_a_step() {
        let map = RangeMap::new(&[0.0, 0.5, 0.5, 1.0], &[0.0, 0.0, 10.0, 10.0]).unwrap();
        assert_eq!(map.map(0.49), 0.0);
        assert_eq!(map.map(0.5), 10.0);
        assert_eq!(map.map(0.75), 10.0);
        assert!(map.map(0.5).is_finite());
    }

    #[test]
    fn leading_duplicate_breakpoint_clamps_to_first_output() {
        let map = RangeMap::new(&[0.0, 0.0, 1.0], &[5.0, 0.0, 1.0]).unwrap();
        assert_eq!(map.map(0.0), 5.0);
        assert!((map.map(0.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn single_breakpoint_is_constant() {
        let map = RangeMap::new(&[0.3], &[7.0]).unwrap();
        assert_eq!(map.map(-10.0), 7.0);
        assert_eq!(map.map(0.3), 7.0);
        assert_eq!(map.map(10.0), 7.0);
    }

    #[test]
    fn non_finite_inputs() {
        let map = RangeMap::linear(10.0, 20.0).unwrap();
        assert_eq!(map.map(f32::NAN), 10.0);
        assert_eq!(map.map(f32::NEG_INFINITY), 10.0);
        assert_eq!(map.map(f32::INFINITY), 20.0);
    }

    #[test]
    fn construction_errors() {
        assert_eq!(RangeMap::new(&[], &[]), Err(MotionError::EmptyRange));
        assert_eq!(
            RangeMap::new(&[0.0, 1.0], &[0.0]),
            Err(MotionError::LengthMismatch {
                input: 2,
                output: 1
            })
        );
        assert_eq!(
            RangeMap::new(&[0.0, 0.8, 0.4], &[0.0, 1.0, 2.0]),
            Err(MotionError::Decreasing { index: 2 })
        );
        assert_eq!(
            RangeMap::new(&[0.0, 1.0], &[0.0, f32::NAN]),
            Err(MotionError::NonFinite { index: 1 })
        );
    }

    #[test]
    fn easing_bends_segments_but_not_endpoints() {
        let map = RangeMap::linear(0.0, 100.0)
            .unwrap()
            .with_easing(Easing::EaseIn);
        assert_eq!(map.map(0.0), 0.0);
        assert_eq!(map.map(1.0), 100.0);
        assert!(map.map(0.5) < 50.0);
    }

    #[test]
    fn fan_out_shares_one_signal() {
        let channels = ChannelMap::new()
            .channel(
                Channel::Opacity,
                RangeMap::new(&[0.0, 0.3], &[0.0, 1.0]).unwrap(),
            )
            .channel(
                Channel::TranslateY,
                RangeMap::new(&[0.0, 0.3], &[60.0, 0.0]).unwrap(),
            )
            .bind(
                Channel::RotateX,
                Input::Secondary,
                RangeMap::linear(0.0, 10.0).unwrap(),
            );

        let t = channels.map(Point::new(0.15, 0.5));
        assert!((t.opacity - 0.5).abs() < 1e-6);
        assert!((t.translate_y - 30.0).abs() < 1e-4);
        assert!((t.rotate_x - 5.0).abs() < 1e-6);
        assert_eq!(t.scale_x, 1.0);
    }

    #[test]
    fn blur_never_negative() {
        let channels = ChannelMap::new().channel(Channel::Blur, RangeMap::linear(-4.0, 4.0).unwrap());
        assert_eq!(channels.map(Point::ZERO).blur, 0.0);
    }
}
