//! Shared geometry and identifier types
//!
//! These values appear in the payloads of both the render and hit channels.

use bytes::{Buf, BufMut};
use serde::{Deserialize, Serialize};

/// Scene element identifier
///
/// No two live elements of the same kind (mesh, point light, texture,
/// hitbox) within one scene may share an id. Ids are chosen by the caller.
pub type ElementId = u32;

/// Identifier meaning "no element"
pub const NULL_ELEMENT: ElementId = u32::MAX;

/// Three-component float vector
///
/// Used both as a position `(x, y, z)` and as a colour `(r, g, b)`; the
/// encoding is identical, only the call site naming differs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    /// Size of a `Vec3` on the wire
    pub const WIRE_SIZE: usize = 12;

    pub const ZERO: Vec3 = Vec3::new(0.0, 0.0, 0.0);
    pub const ONE: Vec3 = Vec3::new(1.0, 1.0, 1.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Build a colour value
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::new(r, g, b)
    }

    pub fn r(&self) -> f32 {
        self.x
    }

    pub fn g(&self) -> f32 {
        self.y
    }

    pub fn b(&self) -> f32 {
        self.z
    }
}

impl From<[f32; 3]> for Vec3 {
    fn from(v: [f32; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

/// Location, rotation and scale of an element
///
/// For hitboxes the scale components are the box width, height and depth.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub location: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Transform {
    /// Size of a `Transform` on the wire (9 floats)
    pub const WIRE_SIZE: usize = 3 * Vec3::WIRE_SIZE;

    pub fn new(location: Vec3, rotation: Vec3, scale: Vec3) -> Self {
        Self {
            location,
            rotation,
            scale,
        }
    }

    pub fn from_location(location: Vec3) -> Self {
        Self {
            location,
            ..Default::default()
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            location: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

/// Viewpoint placement: where the eye is and what it looks at
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewTransform {
    pub location: Vec3,
    pub look_at: Vec3,
}

impl ViewTransform {
    /// Size of a `ViewTransform` on the wire (6 floats)
    pub const WIRE_SIZE: usize = 2 * Vec3::WIRE_SIZE;

    pub fn new(location: Vec3, look_at: Vec3) -> Self {
        Self { location, look_at }
    }
}

// Native byte order throughout: the servers read the structs as laid out in
// memory by the host.

pub(crate) fn put_vec3(buf: &mut impl BufMut, v: &Vec3) {
    buf.put_f32_ne(v.x);
    buf.put_f32_ne(v.y);
    buf.put_f32_ne(v.z);
}

pub(crate) fn get_vec3(buf: &mut impl Buf) -> Vec3 {
    let x = buf.get_f32_ne();
    let y = buf.get_f32_ne();
    let z = buf.get_f32_ne();
    Vec3::new(x, y, z)
}

pub(crate) fn put_transform(buf: &mut impl BufMut, tf: &Transform) {
    put_vec3(buf, &tf.location);
    put_vec3(buf, &tf.rotation);
    put_vec3(buf, &tf.scale);
}

pub(crate) fn get_transform(buf: &mut impl Buf) -> Transform {
    let location = get_vec3(buf);
    let rotation = get_vec3(buf);
    let scale = get_vec3(buf);
    Transform::new(location, rotation, scale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;

    #[test]
    fn test_colour_accessors_alias_components() {
        let c = Vec3::rgb(1.0, 0.5, 0.0);
        assert_eq!(c.r(), c.x);
        assert_eq!(c.g(), c.y);
        assert_eq!(c.b(), c.z);
    }

    #[test]
    fn test_transform_default_has_unit_scale() {
        let tf = Transform::default();
        assert_eq!(tf.location, Vec3::ZERO);
        assert_eq!(tf.scale, Vec3::ONE);
    }

    #[test]
    fn test_transform_wire_layout() {
        let tf = Transform::new(
            Vec3::new(1.0, 2.0, 3.0),
            Vec3::new(4.0, 5.0, 6.0),
            Vec3::new(7.0, 8.0, 9.0),
        );
        let mut buf = BytesMut::new();
        put_transform(&mut buf, &tf);
        assert_eq!(buf.len(), Transform::WIRE_SIZE);

        // Fields are written in declaration order, no padding
        assert_eq!(&buf[0..4], &1.0f32.to_ne_bytes());
        assert_eq!(&buf[12..16], &4.0f32.to_ne_bytes());
        assert_eq!(&buf[32..36], &9.0f32.to_ne_bytes());

        let decoded = get_transform(&mut buf.freeze());
        assert_eq!(decoded, tf);
    }

    #[test]
    fn test_null_element_is_all_ones() {
        assert_eq!(NULL_ELEMENT.to_ne_bytes(), [0xFF; 4]);
    }
}
