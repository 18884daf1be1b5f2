//! HDR resolve: exposure, tone mapping and sRGB encoding into premultiplied RGBA8.

use rayon::prelude::*;

use crate::foundation::core::{Mat3, Vec3, linear_to_srgb};
use crate::foundation::math::mul_div255_u8;
use crate::scene::stage::ToneMapping;

const ACES_INPUT: Mat3 = Mat3::from_cols_array(&[
    0.597_19, 0.076_00, 0.028_40, 0.354_58, 0.908_34, 0.133_83, 0.048_23, 0.015_66, 0.837_77,
]);

const ACES_OUTPUT: Mat3 = Mat3::from_cols_array(&[
    1.604_75, -0.102_08, -0.003_27, -0.531_08, 1.108_13, -0.072_76, -0.073_67, -0.006_05,
    1.076_02,
]);

fn rrt_and_odt_fit(v: Vec3) -> Vec3 {
    let a = v * (v + 0.024_578_6) - 0.000_090_537;
    let b = v * (0.983_729 * v + 0.432_951) + 0.238_081;
    a / b
}

/// ACES filmic fit (RRT + ODT) of a linear color, output clamped to `[0, 1]`.
pub fn aces_filmic(color: Vec3, exposure: f32) -> Vec3 {
    let c = ACES_INPUT * (color * (exposure / 0.6));
    let c = ACES_OUTPUT * rrt_and_odt_fit(c);
    c.clamp(Vec3::ZERO, Vec3::ONE)
}

/// Apply `mode` to a linear color.
pub fn tone_map(mode: ToneMapping, color: Vec3, exposure: f32) -> Vec3 {
    let color = color.max(Vec3::ZERO);
    match mode {
        ToneMapping::None => color.min(Vec3::ONE),
        ToneMapping::Linear => (color * exposure).min(Vec3::ONE),
        ToneMapping::AcesFilmic => aces_filmic(color, exposure),
    }
}

/// Resolve premultiplied linear `color` with coverage `alpha` into premultiplied sRGB RGBA8.
///
/// Rows are resolved on the rayon pool; each pixel depends only on its own inputs.
pub fn resolve_rgba8(
    color: &[Vec3],
    alpha: &[f32],
    width: usize,
    mode: ToneMapping,
    exposure: f32,
    out: &mut [u8],
) {
    debug_assert_eq!(color.len(), alpha.len());
    debug_assert_eq!(out.len(), color.len() * 4);
    let row_bytes = width * 4;
    out.par_chunks_mut(row_bytes)
        .zip(color.par_chunks(width))
        .zip(alpha.par_chunks(width))
        .for_each(|((dst, c), a)| {
            for ((px, c), a) in dst.chunks_exact_mut(4).zip(c).zip(a) {
                px.copy_from_slice(&resolve_pixel(*c, *a, mode, exposure));
            }
        });
}

fn resolve_pixel(premul: Vec3, alpha: f32, mode: ToneMapping, exposure: f32) -> [u8; 4] {
    let alpha = alpha.clamp(0.0, 1.0);
    if alpha <= 0.0 {
        return [0, 0, 0, 0];
    }
    let straight = tone_map(mode, premul / alpha, exposure);
    let a8 = (alpha * 255.0).round() as u16;
    let encode = |c: f32| (linear_to_srgb(c) * 255.0).round() as u16;
    [
        mul_div255_u8(encode(straight.x), a8),
        mul_div255_u8(encode(straight.y), a8),
        mul_div255_u8(encode(straight.z), a8),
        a8 as u8,
    ]
}

#[cfg(test)]
#[path = "../../tests/unit/render/tonemap.rs"]
mod tests;
