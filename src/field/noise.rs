//! Classic 3D gradient (Perlin) noise.
//!
//! Lattice hashing uses the permutation polynomial `(34x² + x) mod 289` and gradients are picked
//! on an octahedron, so the function is deterministic and needs no lookup tables. Output is
//! C2-continuous, zero on integer lattice points and roughly within `[-2.2, 2.2]`.

use crate::foundation::core::Vec3;
use crate::foundation::math::{fract, glsl_mod};

const OUTPUT_SCALE: f32 = 2.2;

/// Sample noise at `p`.
pub fn perlin3(p: Vec3) -> f32 {
    let cell = p.floor();
    let pi0 = mod289(cell);
    let pi1 = mod289(cell + Vec3::ONE);
    let pf0 = p - cell;
    let pf1 = pf0 - Vec3::ONE;

    let ix = [pi0.x, pi1.x, pi0.x, pi1.x];
    let iy = [pi0.y, pi0.y, pi1.y, pi1.y];
    let ixy: [f32; 4] = std::array::from_fn(|k| permute(permute(ix[k]) + iy[k]));
    let g0 = gradients(std::array::from_fn(|k| permute(ixy[k] + pi0.z)));
    let g1 = gradients(std::array::from_fn(|k| permute(ixy[k] + pi1.z)));

    let n000 = g0[0].dot(pf0);
    let n100 = g0[1].dot(Vec3::new(pf1.x, pf0.y, pf0.z));
    let n010 = g0[2].dot(Vec3::new(pf0.x, pf1.y, pf0.z));
    let n110 = g0[3].dot(Vec3::new(pf1.x, pf1.y, pf0.z));
    let n001 = g1[0].dot(Vec3::new(pf0.x, pf0.y, pf1.z));
    let n101 = g1[1].dot(Vec3::new(pf1.x, pf0.y, pf1.z));
    let n011 = g1[2].dot(Vec3::new(pf0.x, pf1.y, pf1.z));
    let n111 = g1[3].dot(pf1);

    let f = fade(pf0);
    let n00 = lerp(n000, n001, f.z);
    let n10 = lerp(n100, n101, f.z);
    let n01 = lerp(n010, n011, f.z);
    let n11 = lerp(n110, n111, f.z);
    let n0 = lerp(n00, n01, f.y);
    let n1 = lerp(n10, n11, f.y);
    OUTPUT_SCALE * lerp(n0, n1, f.x)
}

fn mod289(v: Vec3) -> Vec3 {
    Vec3::new(
        glsl_mod(v.x, 289.0),
        glsl_mod(v.y, 289.0),
        glsl_mod(v.z, 289.0),
    )
}

fn permute(x: f32) -> f32 {
    glsl_mod((x * 34.0 + 1.0) * x, 289.0)
}

fn taylor_inv_sqrt(r: f32) -> f32 {
    1.792_842_9 - 0.853_734_7 * r
}

fn fade(t: Vec3) -> Vec3 {
    t * t * t * (t * (t * 6.0 - Vec3::splat(15.0)) + Vec3::splat(10.0))
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

fn step(edge: f32, x: f32) -> f32 {
    if x < edge { 0.0 } else { 1.0 }
}

fn gradients(hash: [f32; 4]) -> [Vec3; 4] {
    std::array::from_fn(|k| {
        let h = hash[k] / 7.0;
        let mut gy = fract(h.floor() / 7.0) - 0.5;
        let mut gx = fract(h);
        let gz = 0.5 - gx.abs() - gy.abs();
        let sz = step(gz, 0.0);
        gx -= sz * (step(0.0, gx) - 0.5);
        gy -= sz * (step(0.0, gy) - 0.5);
        let g = Vec3::new(gx, gy, gz);
        g * taylor_inv_sqrt(g.dot(g))
    })
}

#[cfg(test)]
#[path = "../../tests/unit/field/noise.rs"]
mod tests;
