use cgmath::SquareMatrix;

pub trait TransformExt {
    /**
     * Matrix mapping points from the local space described by `self` (a local-to-world matrix)
     * into the local space of `target` (another local-to-world matrix): `inverse(target) * self`.
     *
     * Returns `None` when `target` cannot be inverted, e.g. a zero scale on some axis.
     */
    fn local_to_local(&self, target: &cgmath::Matrix4<f32>) -> Option<cgmath::Matrix4<f32>>;
}

impl TransformExt for cgmath::Matrix4<f32> {
    fn local_to_local(&self, target: &cgmath::Matrix4<f32>) -> Option<cgmath::Matrix4<f32>> {
        target.invert().map(|inverse| inverse * *self)
    }
}
