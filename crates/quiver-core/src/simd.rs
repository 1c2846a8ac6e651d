//! Distance kernels
//!
//! Portable slice kernels written over fixed-width chunks with independent
//! accumulators. LLVM lowers the chunk loop to packed instructions on every
//! target we build for (NEON on aarch64, SSE/AVX on x86_64), so there is no
//! per-architecture intrinsic code to maintain.
//!
//! For L2-normalized vectors (unit length), dot product equals cosine similarity:
//! ```text
//! cos(θ) = A · B  when ||A|| = ||B|| = 1
//! ```

/// Accumulator width. Eight f32 lanes fill one 256-bit register.
const LANES: usize = 8;

/// Dot product of two equal-length slices.
#[inline]
pub fn dot_product(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len(), "dot_product length mismatch");

    let chunks_a = a.chunks_exact(LANES);
    let chunks_b = b.chunks_exact(LANES);
    let tail: f32 = chunks_a
        .remainder()
        .iter()
        .zip(chunks_b.remainder())
        .map(|(x, y)| x * y)
        .sum();

    let mut acc = [0.0f32; LANES];
    for (ca, cb) in chunks_a.zip(chunks_b) {
        for lane in 0..LANES {
            acc[lane] += ca[lane] * cb[lane];
        }
    }

    acc.iter().sum::<f32>() + tail
}

/// Squared Euclidean distance. This is what the `l2` metric reports.
#[inline]
pub fn l2_distance_squared(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len(), "l2_distance_squared length mismatch");

    let chunks_a = a.chunks_exact(LANES);
    let chunks_b = b.chunks_exact(LANES);
    let tail: f32 = chunks_a
        .remainder()
        .iter()
        .zip(chunks_b.remainder())
        .map(|(x, y)| (x - y) * (x - y))
        .sum();

    let mut acc = [0.0f32; LANES];
    for (ca, cb) in chunks_a.zip(chunks_b) {
        for lane in 0..LANES {
            let diff = ca[lane] - cb[lane];
            acc[lane] += diff * diff;
        }
    }

    acc.iter().sum::<f32>() + tail
}

/// Euclidean distance.
#[inline]
pub fn l2_distance(a: &[f32], b: &[f32]) -> f32 {
    l2_distance_squared(a, b).sqrt()
}

/// Euclidean norm.
#[inline]
pub fn l2_norm(v: &[f32]) -> f32 {
    dot_product(v, v).sqrt()
}

/// Normalize a vector in place. Zero vectors are left untouched.
pub fn l2_normalize(v: &mut [f32]) {
    let norm = l2_norm(v);
    if norm > f32::EPSILON {
        let inv = 1.0 / norm;
        v.iter_mut().for_each(|x| *x *= inv);
    }
}

/// Return a normalized copy of `v`.
pub fn l2_normalized(v: &[f32]) -> Vec<f32> {
    let mut out = v.to_vec();
    l2_normalize(&mut out);
    out
}

/// Check whether `v` has unit length within `tolerance`.
pub fn is_normalized(v: &[f32], tolerance: f32) -> bool {
    (l2_norm(v) - 1.0).abs() <= tolerance
}
