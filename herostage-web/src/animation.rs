use glam::{Quat, Vec3};

use crate::scene::{Node, Object3D};

/// Node property a channel drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetProperty {
    Translation,
    Rotation,
    Scale,
}

impl TargetProperty {
    /// Components per keyframe value.
    pub fn width(self) -> usize {
        match self {
            TargetProperty::Rotation => 4,
            TargetProperty::Translation | TargetProperty::Scale => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interpolation {
    Step,
    Linear,
    /// Each keyframe stores in-tangent, value, out-tangent.
    CubicSpline,
}

/// One animated property of one node.
#[derive(Debug, Clone)]
pub struct AnimationChannel {
    /// Index into the owning object's `nodes`.
    pub target_node: usize,
    pub property: TargetProperty,
    pub interpolation: Interpolation,
    pub times: Vec<f32>,
    /// Flat keyframe values; rotations are stored x, y, z, w.
    pub values: Vec<f32>,
}

/// Named, time-parameterized animation bundled with an asset.
#[derive(Debug, Clone)]
pub struct AnimationClip {
    pub name: String,
    pub duration: f32,
    pub channels: Vec<AnimationChannel>,
}

impl AnimationClip {
    /// Build a clip whose duration is the last keyframe time of any channel.
    pub fn new(name: impl Into<String>, channels: Vec<AnimationChannel>) -> Self {
        let duration = channels
            .iter()
            .filter_map(|c| c.times.last().copied())
            .fold(0.0, f32::max);
        Self {
            name: name.into(),
            duration,
            channels,
        }
    }
}

/// Plays a single clip on one object, advanced by wall-clock delta.
#[derive(Debug, Clone)]
pub struct AnimationDriver {
    clip: AnimationClip,
    current_time: f32,
    pub speed: f32,
    pub looping: bool,
    playing: bool,
}

impl AnimationDriver {
    /// Start playing `clip` from time 0, looping at speed 1.
    pub fn new(clip: AnimationClip) -> Self {
        Self {
            clip,
            current_time: 0.0,
            speed: 1.0,
            looping: true,
            playing: true,
        }
    }

    pub fn clip(&self) -> &AnimationClip {
        &self.clip
    }

    pub fn current_time(&self) -> f32 {
        self.current_time
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Advance playback by `dt` seconds and write the sampled pose into
    /// `object`'s nodes.
    pub fn update(&mut self, dt: f32, object: &mut Object3D) {
        if !self.playing {
            return;
        }

        self.current_time += dt * self.speed;

        let duration = self.clip.duration;
        if duration <= 0.0 {
            self.current_time = 0.0;
        } else if self.current_time > duration {
            if self.looping {
                self.current_time %= duration;
            } else {
                self.current_time = duration;
                self.playing = false;
            }
        }

        apply_clip(&self.clip, self.current_time, &mut object.nodes);
    }
}

/// Apply every channel of `clip` at `time` to `nodes`. Channels aimed at
/// missing nodes or carrying short value arrays are skipped.
pub fn apply_clip(clip: &AnimationClip, time: f32, nodes: &mut [Node]) {
    for channel in &clip.channels {
        let Some(node) = nodes.get_mut(channel.target_node) else {
            continue;
        };

        match channel.property {
            TargetProperty::Translation => {
                if let Some(v) = sample_vec3(channel, time) {
                    node.transform.translation = v;
                }
            }
            TargetProperty::Rotation => {
                if let Some(q) = sample_quat(channel, time) {
                    node.transform.rotation = q;
                }
            }
            TargetProperty::Scale => {
                if let Some(v) = sample_vec3(channel, time) {
                    node.transform.scale = v;
                }
            }
        }
    }
}

fn sample_vec3(channel: &AnimationChannel, time: f32) -> Option<Vec3> {
    let (i0, i1, t) = find_keyframe_index(&channel.times, time)?;
    let v0 = Vec3::from_slice(key_value(channel, i0)?);
    let v1 = Vec3::from_slice(key_value(channel, i1)?);

    Some(match channel.interpolation {
        Interpolation::Step => v0,
        Interpolation::Linear => v0.lerp(v1, t),
        Interpolation::CubicSpline => {
            let dt = channel.times[i1] - channel.times[i0];
            let m0 = Vec3::from_slice(out_tangent(channel, i0)?) * dt;
            let m1 = Vec3::from_slice(in_tangent(channel, i1)?) * dt;
            let [h00, h10, h01, h11] = hermite_basis(t);
            v0 * h00 + m0 * h10 + v1 * h01 + m1 * h11
        }
    })
}

fn sample_quat(channel: &AnimationChannel, time: f32) -> Option<Quat> {
    let (i0, i1, t) = find_keyframe_index(&channel.times, time)?;
    let q0 = Quat::from_slice(key_value(channel, i0)?).normalize();
    let q1 = Quat::from_slice(key_value(channel, i1)?).normalize();

    Some(match channel.interpolation {
        Interpolation::Step => q0,
        Interpolation::Linear => q0.slerp(q1, t),
        Interpolation::CubicSpline => {
            let dt = channel.times[i1] - channel.times[i0];
            let m0 = Quat::from_slice(out_tangent(channel, i0)?) * dt;
            let m1 = Quat::from_slice(in_tangent(channel, i1)?) * dt;
            let [h00, h10, h01, h11] = hermite_basis(t);
            (q0 * h00 + m0 * h10 + q1 * h01 + m1 * h11).normalize()
        }
    })
}

/// Hermite basis functions (h00, h10, h01, h11) at `t`.
fn hermite_basis(t: f32) -> [f32; 4] {
    let t2 = t * t;
    let t3 = t2 * t;
    [
        2.0 * t3 - 3.0 * t2 + 1.0,
        t3 - 2.0 * t2 + t,
        -2.0 * t3 + 3.0 * t2,
        t3 - t2,
    ]
}

/// Slice `slot` (0 = in-tangent, 1 = value, 2 = out-tangent) of keyframe
/// `index`. Non-spline channels only have the value slot.
fn keyframe_slot(channel: &AnimationChannel, index: usize, slot: usize) -> Option<&[f32]> {
    let width = channel.property.width();
    let start = match channel.interpolation {
        Interpolation::CubicSpline => (index * 3 + slot) * width,
        Interpolation::Step | Interpolation::Linear => index * width,
    };
    channel.values.get(start..start + width)
}

fn key_value(channel: &AnimationChannel, index: usize) -> Option<&[f32]> {
    keyframe_slot(channel, index, 1)
}

fn in_tangent(channel: &AnimationChannel, index: usize) -> Option<&[f32]> {
    keyframe_slot(channel, index, 0)
}

fn out_tangent(channel: &AnimationChannel, index: usize) -> Option<&[f32]> {
    keyframe_slot(channel, index, 2)
}

/// Binary search for the keyframe interval containing `time`.
/// Returns (index0, index1, interpolation_factor) or None.
fn find_keyframe_index(times: &[f32], time: f32) -> Option<(usize, usize, f32)> {
    if times.is_empty() {
        return None;
    }
    if times.len() == 1 || time <= times[0] {
        return Some((0, 0, 0.0));
    }
    let last = times.len() - 1;
    if time >= times[last] {
        return Some((last, last, 0.0));
    }

    // First keyframe strictly after `time`; its predecessor opens the interval
    let hi = times.partition_point(|&t| t <= time);
    let lo = hi - 1;

    let t0 = times[lo];
    let t1 = times[hi];
    let factor = if (t1 - t0).abs() < 1e-8 {
        0.0
    } else {
        (time - t0) / (t1 - t0)
    };

    Some((lo, hi, factor))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Transform;

    const EPSILON: f32 = 1e-5;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    fn object_with_nodes(count: usize) -> Object3D {
        let mut object = Object3D::new("animated");
        for _ in 0..count {
            object.nodes.push(Node::new(None, None, Transform::IDENTITY));
        }
        object
    }

    fn translation_channel(interpolation: Interpolation) -> AnimationChannel {
        AnimationChannel {
            target_node: 0,
            property: TargetProperty::Translation,
            interpolation,
            times: vec![0.0, 1.0, 2.0],
            values: vec![0.0, 0.0, 0.0, 10.0, 0.0, 0.0, 10.0, 20.0, 0.0],
        }
    }

    // ── find_keyframe_index ──

    #[test]
    fn test_keyframe_index_interior() {
        let (i0, i1, t) = find_keyframe_index(&[0.0, 1.0, 3.0], 2.0).unwrap();
        assert_eq!((i0, i1), (1, 2));
        assert!(approx_eq(t, 0.5));
    }

    #[test]
    fn test_keyframe_index_exact_key() {
        let (i0, i1, t) = find_keyframe_index(&[0.0, 1.0, 2.0], 1.0).unwrap();
        assert_eq!((i0, i1), (1, 2));
        assert!(approx_eq(t, 0.0));
    }

    #[test]
    fn test_keyframe_index_clamps_ends() {
        assert_eq!(find_keyframe_index(&[0.5, 1.0], 0.0), Some((0, 0, 0.0)));
        assert_eq!(find_keyframe_index(&[0.5, 1.0], 5.0), Some((1, 1, 0.0)));
        assert_eq!(find_keyframe_index(&[], 0.3), None);
    }

    // ── sampling ──

    #[test]
    fn test_linear_translation_midpoint() {
        let clip = AnimationClip::new("move", vec![translation_channel(Interpolation::Linear)]);
        let mut object = object_with_nodes(1);
        apply_clip(&clip, 1.5, &mut object.nodes);
        let t = object.nodes[0].transform.translation;
        assert!(t.abs_diff_eq(Vec3::new(10.0, 10.0, 0.0), EPSILON));
    }

    #[test]
    fn test_step_holds_previous_key() {
        let clip = AnimationClip::new("move", vec![translation_channel(Interpolation::Step)]);
        let mut object = object_with_nodes(1);
        apply_clip(&clip, 0.99, &mut object.nodes);
        assert!(object.nodes[0].transform.translation.abs_diff_eq(Vec3::ZERO, EPSILON));
    }

    #[test]
    fn test_linear_rotation_slerps() {
        let half = std::f32::consts::FRAC_PI_2;
        let end = Quat::from_rotation_y(half);
        let channel = AnimationChannel {
            target_node: 0,
            property: TargetProperty::Rotation,
            interpolation: Interpolation::Linear,
            times: vec![0.0, 1.0],
            values: vec![0.0, 0.0, 0.0, 1.0, end.x, end.y, end.z, end.w],
        };
        let clip = AnimationClip::new("turn", vec![channel]);
        let mut object = object_with_nodes(1);
        apply_clip(&clip, 0.5, &mut object.nodes);
        let expected = Quat::from_rotation_y(half * 0.5);
        assert!(object.nodes[0].transform.rotation.abs_diff_eq(expected, 1e-4));
    }

    #[test]
    fn test_cubic_spline_hits_keyframe_values() {
        // in-tangent, value, out-tangent per key
        let channel = AnimationChannel {
            target_node: 0,
            property: TargetProperty::Scale,
            interpolation: Interpolation::CubicSpline,
            times: vec![0.0, 1.0],
            values: vec![
                0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 0.0, 0.0, 0.0, //
                0.0, 0.0, 0.0, 3.0, 3.0, 3.0, 0.0, 0.0, 0.0,
            ],
        };
        let clip = AnimationClip::new("grow", vec![channel]);
        let mut object = object_with_nodes(1);

        apply_clip(&clip, 0.0, &mut object.nodes);
        assert!(object.nodes[0].transform.scale.abs_diff_eq(Vec3::ONE, EPSILON));

        // Zero tangents: smoothstep midpoint
        apply_clip(&clip, 0.5, &mut object.nodes);
        assert!(object.nodes[0].transform.scale.abs_diff_eq(Vec3::splat(2.0), EPSILON));
    }

    #[test]
    fn test_channel_for_missing_node_is_skipped() {
        let mut channel = translation_channel(Interpolation::Linear);
        channel.target_node = 9;
        let clip = AnimationClip::new("orphan", vec![channel]);
        let mut object = object_with_nodes(1);
        apply_clip(&clip, 1.0, &mut object.nodes);
        assert_eq!(object.nodes[0].transform, Transform::IDENTITY);
    }

    #[test]
    fn test_short_value_array_is_skipped() {
        let mut channel = translation_channel(Interpolation::Linear);
        channel.values.truncate(4);
        let clip = AnimationClip::new("truncated", vec![channel]);
        let mut object = object_with_nodes(1);
        apply_clip(&clip, 1.5, &mut object.nodes);
        assert_eq!(object.nodes[0].transform, Transform::IDENTITY);
    }

    // ── AnimationDriver ──

    #[test]
    fn test_clip_duration_is_last_keyframe() {
        let clip = AnimationClip::new("move", vec![translation_channel(Interpolation::Linear)]);
        assert!(approx_eq(clip.duration, 2.0));
    }

    #[test]
    fn test_driver_advances_by_delta() {
        let clip = AnimationClip::new("move", vec![translation_channel(Interpolation::Linear)]);
        let mut driver = AnimationDriver::new(clip);
        let mut object = object_with_nodes(1);

        driver.update(0.25, &mut object);
        assert!(approx_eq(driver.current_time(), 0.25));
        driver.update(0.5, &mut object);
        assert!(approx_eq(driver.current_time(), 0.75));
        let t = object.nodes[0].transform.translation;
        assert!(t.abs_diff_eq(Vec3::new(7.5, 0.0, 0.0), EPSILON));
    }

    #[test]
    fn test_driver_loops_past_duration() {
        let clip = AnimationClip::new("move", vec![translation_channel(Interpolation::Linear)]);
        let mut driver = AnimationDriver::new(clip);
        let mut object = object_with_nodes(1);

        driver.update(2.5, &mut object);
        assert!(approx_eq(driver.current_time(), 0.5));
        assert!(driver.is_playing());
    }

    #[test]
    fn test_driver_without_loop_clamps_and_stops() {
        let clip = AnimationClip::new("move", vec![translation_channel(Interpolation::Linear)]);
        let mut driver = AnimationDriver::new(clip);
        driver.looping = false;
        let mut object = object_with_nodes(1);

        driver.update(3.0, &mut object);
        assert!(approx_eq(driver.current_time(), 2.0));
        assert!(!driver.is_playing());

        driver.update(1.0, &mut object);
        assert!(approx_eq(driver.current_time(), 2.0));
    }

    #[test]
    fn test_driver_never_touches_object_root() {
        let clip = AnimationClip::new("move", vec![translation_channel(Interpolation::Linear)]);
        let mut driver = AnimationDriver::new(clip);
        let mut object = object_with_nodes(1);
        driver.update(0.5, &mut object);
        assert_eq!(object.rotation.y, 0.0);
        assert_eq!(object.position, Vec3::ZERO);
    }
}
