//! Procedural generators for the town's building and ground meshes.

use crate::mesh::{MeshBuilder, MeshData};
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// A mesh described by parameters instead of literal vertex tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MeshShape {
    /// Plain box.
    Cuboid { min: Vec3, max: Vec3, uv_repeat: f32 },
    /// Unit block with two corner towers and a taller centre tower on the roof.
    SteppedBuilding { uv_repeat: f32 },
    /// Flat square on the XZ plane at height `y`.
    GroundPlane {
        half_extent: f32,
        y: f32,
        uv_repeat: f32,
    },
    /// Four walls under a pitched roof.
    GabledHouse {
        min: Vec3,
        max: Vec3,
        ridge_height: f32,
        uv_repeat: f32,
    },
}

impl MeshShape {
    pub fn build(&self) -> MeshData {
        match *self {
            Self::Cuboid { min, max, uv_repeat } => {
                let mut builder = MeshBuilder::new().with_uv_repeat(uv_repeat);
                builder.cuboid(min.min(max), min.max(max));
                builder.build()
            }
            Self::SteppedBuilding { uv_repeat } => stepped_building(uv_repeat),
            Self::GroundPlane {
                half_extent,
                y,
                uv_repeat,
            } => ground_plane(half_extent, y, uv_repeat),
            Self::GabledHouse {
                min,
                max,
                ridge_height,
                uv_repeat,
            } => gabled_house(min.min(max), min.max(max), ridge_height, uv_repeat),
        }
    }
}

/// Unit block centred on the origin with three add-ons on its roof.
pub fn stepped_building(uv_repeat: f32) -> MeshData {
    let mut builder = MeshBuilder::new().with_uv_repeat(uv_repeat);
    builder
        .cuboid(Vec3::splat(-0.5), Vec3::splat(0.5))
        .cuboid(Vec3::new(-0.5, 0.5, -0.5), Vec3::new(-0.25, 0.75, 0.0))
        .cuboid(Vec3::new(0.25, 0.5, -0.5), Vec3::new(0.5, 0.75, 0.0))
        .cuboid(Vec3::new(-0.125, 0.5, -0.25), Vec3::new(0.125, 1.0, 0.25));
    builder.build()
}

/// Square ground quad facing +Y.
pub fn ground_plane(half_extent: f32, y: f32, uv_repeat: f32) -> MeshData {
    let h = half_extent.abs();
    let mut builder = MeshBuilder::new().with_uv_repeat(uv_repeat);
    builder.quad(
        Vec3::new(-h, y, h),
        Vec3::new(h, y, h),
        Vec3::new(h, y, -h),
        Vec3::new(-h, y, -h),
    );
    builder.build()
}

/// Box walls from `min` to `max` topped by a roof rising `ridge_height`.
pub fn gabled_house(min: Vec3, max: Vec3, ridge_height: f32, uv_repeat: f32) -> MeshData {
    let mut builder = MeshBuilder::new().with_uv_repeat(uv_repeat);
    builder
        .cuboid(min, max)
        .gable_roof(Vec3::new(min.x, max.y, min.z), max, ridge_height);
    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds(mesh: &MeshData) -> (Vec3, Vec3) {
        mesh.vertices.iter().fold(
            (Vec3::splat(f32::MAX), Vec3::splat(f32::MIN)),
            |(lo, hi), v| {
                let p = Vec3::from_array(v.position);
                (lo.min(p), hi.max(p))
            },
        )
    }

    #[test]
    fn stepped_building_is_valid_and_tops_out_at_one() {
        let mesh = stepped_building(1.0);
        mesh.validate("building").unwrap();
        assert_eq!(mesh.triangle_count(), 4 * 12);
        let (lo, hi) = bounds(&mesh);
        assert_eq!(lo, Vec3::splat(-0.5));
        assert_eq!(hi, Vec3::new(0.5, 1.0, 0.5));
    }

    #[test]
    fn ground_plane_faces_up() {
        let mesh = ground_plane(3.0, -0.5, 2.0);
        mesh.validate("ground").unwrap();
        assert_eq!(mesh.triangle_count(), 2);
        let p = |i: usize| Vec3::from_array(mesh.vertices[mesh.indices[i] as usize].position);
        let normal = (p(1) - p(0)).cross(p(2) - p(0));
        assert!(normal.y > 0.0);
        assert!(mesh.vertices.iter().all(|v| v.position[1] == -0.5));
        assert_eq!(mesh.vertices[2].uv, [12.0, 12.0]);
    }

    #[test]
    fn gabled_house_is_valid() {
        let mesh = gabled_house(Vec3::new(0.75, -0.5, -0.5), Vec3::new(1.75, 0.0, 0.5), 0.4, 1.0);
        mesh.validate("house").unwrap();
        assert_eq!(mesh.triangle_count(), 12 + 6);
        let (_, hi) = bounds(&mesh);
        assert!((hi.y - 0.4).abs() < 1e-6);
    }

    #[test]
    fn cuboid_shape_accepts_swapped_corners() {
        let shape = MeshShape::Cuboid {
            min: Vec3::ONE,
            max: Vec3::ZERO,
            uv_repeat: 1.0,
        };
        let mesh = shape.build();
        assert_eq!(bounds(&mesh), (Vec3::ZERO, Vec3::ONE));
    }

    #[test]
    fn shape_json_is_tagged_by_kind() {
        let json = r#"{ "kind": "ground_plane", "half_extent": 2.0, "y": 0.0, "uv_repeat": 1.0 }"#;
        let shape: MeshShape = serde_json::from_str(json).unwrap();
        assert_eq!(
            shape,
            MeshShape::GroundPlane {
                half_extent: 2.0,
                y: 0.0,
                uv_repeat: 1.0
            }
        );
    }
}
