//! 硬件向量通道
//!
//! - **x86_64**：SSE2（W = 16）、AVX2（W = 32）
//! - **aarch64**：NEON（W = 16）
//!
//! 每个 kernel 先处理 `floor(L/W)` 个整通道（非对齐 load/store），
//! 剩余 `L mod W` 字节交给 [`crate::scalar`]。
//!
//! 所有函数都是 `unsafe`：调用方必须保证对应指令集在运行时可用，
//! 且各操作数长度相等（由 [`crate::engine::Backend`] 保证）。

/// 二元运算 + 原地版本
macro_rules! binary_kernel {
    (
        $feature:literal, $width:expr, $elem:ty, $load:path, $store:path,
        $name:ident, $assign:ident, $tail:path, $tail_assign:path,
        |$x:ident, $y:ident| $body:expr
    ) => {
        #[target_feature(enable = $feature)]
        pub(crate) unsafe fn $name(a: &[u8], b: &[u8], dst: &mut [u8]) {
            debug_assert!(a.len() == dst.len() && b.len() == dst.len());
            let full = dst.len() / $width * $width;
            let (pa, pb, pd) = (a.as_ptr(), b.as_ptr(), dst.as_mut_ptr());
            let mut off = 0;
            while off < full {
                let $x = $load(pa.add(off) as *const $elem);
                let $y = $load(pb.add(off) as *const $elem);
                $store(pd.add(off) as *mut $elem, $body);
                off += $width;
            }
            $tail(&a[full..], &b[full..], &mut dst[full..]);
        }

        #[target_feature(enable = $feature)]
        pub(crate) unsafe fn $assign(acc: &mut [u8], b: &[u8]) {
            debug_assert_eq!(acc.len(), b.len());
            let full = acc.len() / $width * $width;
            let (pa, pb) = (acc.as_mut_ptr(), b.as_ptr());
            let mut off = 0;
            while off < full {
                // 同一通道先 load 再 store，原地写不会污染尚未读取的字节
                let $x = $load(pa.add(off) as *const $elem);
                let $y = $load(pb.add(off) as *const $elem);
                $store(pa.add(off) as *mut $elem, $body);
                off += $width;
            }
            $tail_assign(&mut acc[full..], &b[full..]);
        }
    };
}

/// NOT + 原地版本
macro_rules! unary_kernel {
    (
        $feature:literal, $width:expr, $elem:ty, $load:path, $store:path,
        $name:ident, $assign:ident, |$x:ident| $body:expr
    ) => {
        #[target_feature(enable = $feature)]
        pub(crate) unsafe fn $name(a: &[u8], dst: &mut [u8]) {
            debug_assert_eq!(a.len(), dst.len());
            let full = dst.len() / $width * $width;
            let (pa, pd) = (a.as_ptr(), dst.as_mut_ptr());
            let mut off = 0;
            while off < full {
                let $x = $load(pa.add(off) as *const $elem);
                $store(pd.add(off) as *mut $elem, $body);
                off += $width;
            }
            crate::scalar::not(&a[full..], &mut dst[full..]);
        }

        #[target_feature(enable = $feature)]
        pub(crate) unsafe fn $assign(acc: &mut [u8]) {
            let full = acc.len() / $width * $width;
            let pa = acc.as_mut_ptr();
            let mut off = 0;
            while off < full {
                let $x = $load(pa.add(off) as *const $elem);
                $store(pa.add(off) as *mut $elem, $body);
                off += $width;
            }
            crate::scalar::not_assign(&mut acc[full..]);
        }
    };
}

// ── x86_64 ────────────────────────────────────────────────────────────────────

#[cfg(target_arch = "x86_64")]
pub(crate) mod sse2 {
    use std::arch::x86_64::*;
    use crate::scalar;

    pub(crate) const WIDTH: usize = 16;

    // _mm_andnot_si128(x, y) = !x & y，所以 a & !b 需要交换参数
    binary_kernel!("sse2", WIDTH, __m128i, _mm_loadu_si128, _mm_storeu_si128,
        and, and_assign, scalar::and, scalar::and_assign, |x, y| _mm_and_si128(x, y));
    binary_kernel!("sse2", WIDTH, __m128i, _mm_loadu_si128, _mm_storeu_si128,
        or, or_assign, scalar::or, scalar::or_assign, |x, y| _mm_or_si128(x, y));
    binary_kernel!("sse2", WIDTH, __m128i, _mm_loadu_si128, _mm_storeu_si128,
        andnot, andnot_assign, scalar::andnot, scalar::andnot_assign, |x, y| _mm_andnot_si128(y, x));
    unary_kernel!("sse2", WIDTH, __m128i, _mm_loadu_si128, _mm_storeu_si128,
        not, not_assign, |x| _mm_xor_si128(x, _mm_set1_epi8(-1)));
}

#[cfg(target_arch = "x86_64")]
pub(crate) mod avx2 {
    use std::arch::x86_64::*;
    use crate::scalar;

    pub(crate) const WIDTH: usize = 32;

    binary_kernel!("avx2", WIDTH, __m256i, _mm256_loadu_si256, _mm256_storeu_si256,
        and, and_assign, scalar::and, scalar::and_assign, |x, y| _mm256_and_si256(x, y));
    binary_kernel!("avx2", WIDTH, __m256i, _mm256_loadu_si256, _mm256_storeu_si256,
        or, or_assign, scalar::or, scalar::or_assign, |x, y| _mm256_or_si256(x, y));
    binary_kernel!("avx2", WIDTH, __m256i, _mm256_loadu_si256, _mm256_storeu_si256,
        andnot, andnot_assign, scalar::andnot, scalar::andnot_assign, |x, y| _mm256_andnot_si256(y, x));
    unary_kernel!("avx2", WIDTH, __m256i, _mm256_loadu_si256, _mm256_storeu_si256,
        not, not_assign, |x| _mm256_xor_si256(x, _mm256_set1_epi8(-1)));
}

// ── aarch64 ───────────────────────────────────────────────────────────────────

#[cfg(target_arch = "aarch64")]
pub(crate) mod neon {
    use std::arch::aarch64::*;
    use crate::scalar;

    pub(crate) const WIDTH: usize = 16;

    binary_kernel!("neon", WIDTH, u8, vld1q_u8, vst1q_u8,
        and, and_assign, scalar::and, scalar::and_assign, |x, y| vandq_u8(x, y));
    binary_kernel!("neon", WIDTH, u8, vld1q_u8, vst1q_u8,
        or, or_assign, scalar::or, scalar::or_assign, |x, y| vorrq_u8(x, y));
    // vbicq_u8(x, y) = x & !y
    binary_kernel!("neon", WIDTH, u8, vld1q_u8, vst1q_u8,
        andnot, andnot_assign, scalar::andnot, scalar::andnot_assign, |x, y| vbicq_u8(x, y));
    unary_kernel!("neon", WIDTH, u8, vld1q_u8, vst1q_u8,
        not, not_assign, |x| vmvnq_u8(x));
}
