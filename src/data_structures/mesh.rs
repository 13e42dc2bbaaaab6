//! CPU-side meshes and the merge primitive used by the mesh combiner.
//!
//! A [`Mesh`] owns one vertex buffer and any number of sub-meshes. Each
//! sub-mesh is an index list into the shared vertex buffer and maps to one
//! material slot of the renderable that draws it.

use cgmath::{InnerSpace, Matrix, SquareMatrix};
use thiserror::Error;

/// Vertex layout shared by every mesh. Kept `Pod` so the buffer can be handed
/// to the GPU as raw bytes.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelVertex {
    pub position: [f32; 3],
    pub tex_coords: [f32; 2],
    pub normal: [f32; 3],
    pub tangent: [f32; 3],
    pub bitangent: [f32; 3],
}

impl ModelVertex {
    pub fn new(position: [f32; 3], normal: [f32; 3], tex_coords: [f32; 2]) -> Self {
        Self {
            position,
            tex_coords,
            normal,
            ..Default::default()
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SubMesh {
    pub indices: Vec<u32>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mesh {
    pub name: String,
    pub vertices: Vec<ModelVertex>,
    pub sub_meshes: Vec<SubMesh>,
}

/// Axis aligned bounding box in mesh space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: cgmath::Point3<f32>,
    pub max: cgmath::Point3<f32>,
}

impl Aabb {
    pub fn size(&self) -> cgmath::Vector3<f32> {
        self.max - self.min
    }

    pub fn center(&self) -> cgmath::Point3<f32> {
        cgmath::Point3::new(
            (self.min.x + self.max.x) * 0.5,
            (self.min.y + self.max.y) * 0.5,
            (self.min.z + self.max.z) * 0.5,
        )
    }
}

/// Mesh plus the matrix that moves its vertices into the shared frame of a merge.
#[derive(Clone, Debug)]
pub struct CombineInstance<'a> {
    pub mesh: &'a Mesh,
    pub transform: cgmath::Matrix4<f32>,
}

#[derive(Debug, Error, PartialEq)]
pub enum MergeError {
    #[error("merged mesh needs {0} vertices, which 32-bit indices cannot address")]
    TooManyVertices(usize),
    #[error("sub-mesh {sub_mesh} of mesh `{mesh}` references vertex {index}, but the mesh has {vertex_count}")]
    IndexOutOfBounds {
        mesh: String,
        sub_mesh: usize,
        index: u32,
        vertex_count: usize,
    },
}

impl Mesh {
    pub fn new(name: &str, vertices: Vec<ModelVertex>, indices: Vec<u32>) -> Self {
        Self {
            name: name.to_string(),
            vertices,
            sub_meshes: vec![SubMesh { indices }],
        }
    }

    pub fn sub_mesh_count(&self) -> usize {
        self.sub_meshes.len()
    }

    pub fn index_count(&self) -> usize {
        self.sub_meshes.iter().map(|s| s.indices.len()).sum()
    }

    /// Raw view of the vertex buffer, ready for upload.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn bounds(&self) -> Option<Aabb> {
        let first: cgmath::Point3<f32> = self.vertices.first()?.position.into();
        let aabb = self.vertices.iter().fold(
            Aabb {
                min: first,
                max: first,
            },
            |aabb, v| Aabb {
                min: cgmath::Point3::new(
                    aabb.min.x.min(v.position[0]),
                    aabb.min.y.min(v.position[1]),
                    aabb.min.z.min(v.position[2]),
                ),
                max: cgmath::Point3::new(
                    aabb.max.x.max(v.position[0]),
                    aabb.max.y.max(v.position[1]),
                    aabb.max.z.max(v.position[2]),
                ),
            },
        );
        Some(aabb)
    }

    /**
     * Merges all `instances` into a single new mesh.
     *
     * Vertex buffers are concatenated in instance order and every index is shifted by the
     * number of vertices emitted before its source mesh. With `merge_sub_meshes` all indices
     * end up in one sub-mesh, otherwise each instance contributes exactly one sub-mesh holding
     * all of its own sub-meshes. With `use_matrices` set the per-instance transform is applied
     * to positions, normals, tangents and bitangents; without it vertices are copied verbatim.
     *
     * Vertex attribute compatibility between the sources is not checked.
     */
    pub fn combine_meshes(
        instances: &[CombineInstance],
        merge_sub_meshes: bool,
        use_matrices: bool,
    ) -> Result<Mesh, MergeError> {
        let vertex_count: usize = instances.iter().map(|i| i.mesh.vertices.len()).sum();
        if vertex_count > u32::MAX as usize {
            return Err(MergeError::TooManyVertices(vertex_count));
        }

        let mut vertices = Vec::with_capacity(vertex_count);
        let mut sub_meshes: Vec<SubMesh> = Vec::new();
        if merge_sub_meshes && !instances.is_empty() {
            sub_meshes.push(SubMesh::default());
        }

        for instance in instances {
            let mesh = instance.mesh;
            let base = vertices.len() as u32;

            if use_matrices {
                let remap = VertexTransform::new(instance.transform);
                vertices.extend(mesh.vertices.iter().map(|v| remap.apply(v)));
            } else {
                vertices.extend_from_slice(&mesh.vertices);
            }

            if !merge_sub_meshes {
                sub_meshes.push(SubMesh::default());
            }
            // there is always at least one sub-mesh at this point
            let target = sub_meshes.last_mut().map(|s| &mut s.indices);
            let Some(target) = target else { continue };
            for (sub_idx, sub_mesh) in mesh.sub_meshes.iter().enumerate() {
                for &index in &sub_mesh.indices {
                    if index as usize >= mesh.vertices.len() {
                        return Err(MergeError::IndexOutOfBounds {
                            mesh: mesh.name.clone(),
                            sub_mesh: sub_idx,
                            index,
                            vertex_count: mesh.vertices.len(),
                        });
                    }
                    target.push(base + index);
                }
            }
        }

        Ok(Mesh {
            name: String::new(),
            vertices,
            sub_meshes,
        })
    }
}

/// Pre-computed matrices for moving vertex attributes into another frame.
struct VertexTransform {
    matrix: cgmath::Matrix4<f32>,
    normal: cgmath::Matrix3<f32>,
}

impl VertexTransform {
    fn new(matrix: cgmath::Matrix4<f32>) -> Self {
        let linear = cgmath::Matrix3::from_cols(
            matrix.x.truncate(),
            matrix.y.truncate(),
            matrix.z.truncate(),
        );
        // normals need the inverse transpose to survive non-uniform scale
        let normal = linear.invert().map(|m| m.transpose()).unwrap_or(linear);
        Self { matrix, normal }
    }

    fn apply(&self, v: &ModelVertex) -> ModelVertex {
        let position = self.matrix * cgmath::Vector3::from(v.position).extend(1.0);
        let tangent = self.matrix * cgmath::Vector3::from(v.tangent).extend(0.0);
        let bitangent = self.matrix * cgmath::Vector3::from(v.bitangent).extend(0.0);
        let normal = self.normal * cgmath::Vector3::from(v.normal);
        let normal = if normal.magnitude2() > 0.0 {
            normal.normalize()
        } else {
            normal
        };
        ModelVertex {
            position: position.truncate().into(),
            tex_coords: v.tex_coords,
            normal: normal.into(),
            tangent: tangent.truncate().into(),
            bitangent: bitangent.truncate().into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use cgmath::{Matrix4, Vector3};

    use super::*;

    fn triangle(name: &str, x: f32) -> Mesh {
        Mesh::new(
            name,
            vec![
                ModelVertex::new([x, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 0.0]),
                ModelVertex::new([x + 1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0]),
                ModelVertex::new([x, 1.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0]),
            ],
            vec![0, 1, 2],
        )
    }

    #[test]
    fn indices_are_rebased_per_source() {
        let a = triangle("a", 0.0);
        let b = triangle("b", 5.0);
        let instances = [
            CombineInstance { mesh: &a, transform: Matrix4::identity() },
            CombineInstance { mesh: &b, transform: Matrix4::identity() },
        ];
        let merged = Mesh::combine_meshes(&instances, true, true).unwrap();
        assert_eq!(merged.vertices.len(), 6);
        assert_eq!(merged.sub_meshes, vec![SubMesh { indices: vec![0, 1, 2, 3, 4, 5] }]);
    }

    #[test]
    fn keeps_one_sub_mesh_per_source_when_not_merging() {
        let a = triangle("a", 0.0);
        let mut b = triangle("b", 0.0);
        b.sub_meshes.push(SubMesh { indices: vec![2, 1, 0] });
        let instances = [
            CombineInstance { mesh: &a, transform: Matrix4::identity() },
            CombineInstance { mesh: &b, transform: Matrix4::identity() },
        ];
        let merged = Mesh::combine_meshes(&instances, false, true).unwrap();
        assert_eq!(merged.sub_mesh_count(), 2);
        assert_eq!(merged.sub_meshes[1].indices, vec![3, 4, 5, 5, 4, 3]);
    }

    #[test]
    fn transforms_positions_but_not_uvs() {
        let a = triangle("a", 0.0);
        let instances = [CombineInstance {
            mesh: &a,
            transform: Matrix4::from_translation(Vector3::new(0.0, 0.0, 4.0)),
        }];
        let merged = Mesh::combine_meshes(&instances, true, true).unwrap();
        assert_eq!(merged.vertices[1].position, [1.0, 0.0, 4.0]);
        assert_eq!(merged.vertices[1].tex_coords, [1.0, 0.0]);
        assert_eq!(merged.vertices[1].normal, [0.0, 0.0, 1.0]);
    }

    #[test]
    fn normals_stay_unit_length_under_scale() {
        let a = triangle("a", 0.0);
        let instances = [CombineInstance {
            mesh: &a,
            transform: Matrix4::from_nonuniform_scale(1.0, 1.0, 3.0),
        }];
        let merged = Mesh::combine_meshes(&instances, true, true).unwrap();
        let n = cgmath::Vector3::from(merged.vertices[0].normal);
        assert!((n.magnitude() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn rejects_dangling_indices() {
        let mut a = triangle("broken", 0.0);
        a.sub_meshes[0].indices.push(7);
        let instances = [CombineInstance { mesh: &a, transform: Matrix4::identity() }];
        let err = Mesh::combine_meshes(&instances, true, false).unwrap_err();
        assert_eq!(
            err,
            MergeError::IndexOutOfBounds {
                mesh: "broken".to_string(),
                sub_mesh: 0,
                index: 7,
                vertex_count: 3,
            }
        );
    }

    #[test]
    fn bounds_of_empty_mesh_is_none() {
        assert!(Mesh::default().bounds().is_none());
        let aabb = triangle("a", 2.0).bounds().unwrap();
        assert_eq!(aabb.size(), Vector3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn vertex_bytes_cover_whole_buffer() {
        let a = triangle("a", 0.0);
        assert_eq!(a.vertex_bytes().len(), 3 * std::mem::size_of::<ModelVertex>());
    }
}
