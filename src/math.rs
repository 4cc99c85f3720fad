use nalgebra as na;
use na::{matrix, vector, Matrix4, Vector2, Vector3, Vector4};

/// Transformation of a point to homogenous coordinates.
pub fn to_hom_point(v: Vector3<f32>) -> Vector4<f32> {
    return vector![v.x, v.y, v.z, 1.0];
}

/// Transformation of a direction to homogenous coordinates, translation won't touch it.
pub fn to_hom_vector(v: Vector3<f32>) -> Vector4<f32> {
    return vector![v.x, v.y, v.z, 0.0];
}

/// Drops the trailing component without any perspective division.
pub fn from_hom(v: Vector4<f32>) -> Vector3<f32> {
    return vector![v.x, v.y, v.z];
}

/// Screen plane part of a clip or screen space vertex.
pub fn xy(v: Vector4<f32>) -> Vector2<f32> {
    return vector![v.x, v.y];
}

/// Normalization that leaves a zero vector untouched instead of producing NaNs.
pub fn normalize_or_zero(v: Vector3<f32>) -> Vector3<f32> {
    let magnitude = v.norm();
    if magnitude == 0.0 {
        return v;
    }
    return v / magnitude;
}

/// z component of the 3D cross product of two vectors lying in the xy plane.
pub fn cross_2d(a: Vector2<f32>, b: Vector2<f32>) -> f32 {
    return a.x * b.y - a.y * b.x;
}

pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    return a + (b - a) * t;
}

pub fn identity() -> Matrix4<f32> {
    return Matrix4::identity();
}

pub fn scale(sx: f32, sy: f32, sz: f32) -> Matrix4<f32> {
    return matrix![sx,  0.0, 0.0, 0.0;
                   0.0, sy,  0.0, 0.0;
                   0.0, 0.0, sz,  0.0;
                   0.0, 0.0, 0.0, 1.0];
}

pub fn rotation_x(angle: f32) -> Matrix4<f32> {
    let (s, c) = angle.sin_cos();
    return matrix![1.0, 0.0, 0.0, 0.0;
                   0.0, c,   -s,  0.0;
                   0.0, s,   c,   0.0;
                   0.0, 0.0, 0.0, 1.0];
}

pub fn rotation_y(angle: f32) -> Matrix4<f32> {
    let (s, c) = angle.sin_cos();
    return matrix![c,   0.0, s,   0.0;
                   0.0, 1.0, 0.0, 0.0;
                   -s,  0.0, c,   0.0;
                   0.0, 0.0, 0.0, 1.0];
}

pub fn rotation_z(angle: f32) -> Matrix4<f32> {
    let (s, c) = angle.sin_cos();
    return matrix![c,   -s,  0.0, 0.0;
                   s,   c,   0.0, 0.0;
                   0.0, 0.0, 1.0, 0.0;
                   0.0, 0.0, 0.0, 1.0];
}

pub fn translation(tx: f32, ty: f32, tz: f32) -> Matrix4<f32> {
    return matrix![1.0, 0.0, 0.0, tx;
                   0.0, 1.0, 0.0, ty;
                   0.0, 0.0, 1.0, tz;
                   0.0, 0.0, 0.0, 1.0];
}

/// View matrix with the camera at `eye` looking towards `target`.
/// Rows are the camera basis, the view direction becomes +z.
pub fn look_at(eye: Vector3<f32>, target: Vector3<f32>, up: Vector3<f32>) -> Matrix4<f32> {
    let z = normalize_or_zero(target - eye);
    let x = normalize_or_zero(up.cross(&z));
    let y = normalize_or_zero(z.cross(&x));
    return matrix![x.x, x.y, x.z, -x.dot(&eye);
                   y.x, y.y, y.z, -y.dot(&eye);
                   z.x, z.y, z.z, -z.dot(&eye);
                   0.0, 0.0, 0.0, 1.0];
}

/// Perspective projection with vertical field of view in radians.
///
/// The last row copies view space z into w, so after the divide z/w lands in
/// [-1, 1] for depths between `near` and `far`.
pub fn perspective(fov_vertical: f32, aspect_ratio: f32, near: f32, far: f32) -> Matrix4<f32> {
    let top = near * (fov_vertical / 2.0).tan();
    let right = top * aspect_ratio;
    let a = (far + near) / (far - near);
    let b = (-2.0 * far * near) / (far - near);
    return matrix![near / right, 0.0,        0.0, 0.0;
                   0.0,          near / top, 0.0, 0.0;
                   0.0,          0.0,        a,   b;
                   0.0,          0.0,        1.0, 0.0];
}
