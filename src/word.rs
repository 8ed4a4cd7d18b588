//! 64-bit 字通道（W = 8）
//!
//! 不依赖任何指令集扩展的宽通道实现：每步按小端读出 8 字节为 `u64`，
//! 做一次按位运算后写回。没有 SIMD 的平台上作为最终回退目标。

use byteorder::{ByteOrder, LittleEndian};

use crate::scalar;

pub(crate) const WIDTH: usize = 8;

macro_rules! word_binary {
    ($name:ident, $assign:ident, $tail:path, $tail_assign:path, |$x:ident, $y:ident| $body:expr) => {
        pub(crate) fn $name(a: &[u8], b: &[u8], dst: &mut [u8]) {
            debug_assert!(a.len() == dst.len() && b.len() == dst.len());
            let full = dst.len() / WIDTH * WIDTH;
            let lanes = dst[..full]
                .chunks_exact_mut(WIDTH)
                .zip(a[..full].chunks_exact(WIDTH))
                .zip(b[..full].chunks_exact(WIDTH));
            for ((d, wa), wb) in lanes {
                let $x = LittleEndian::read_u64(wa);
                let $y = LittleEndian::read_u64(wb);
                LittleEndian::write_u64(d, $body);
            }
            $tail(&a[full..], &b[full..], &mut dst[full..]);
        }

        pub(crate) fn $assign(acc: &mut [u8], b: &[u8]) {
            debug_assert_eq!(acc.len(), b.len());
            let full = acc.len() / WIDTH * WIDTH;
            let lanes = acc[..full]
                .chunks_exact_mut(WIDTH)
                .zip(b[..full].chunks_exact(WIDTH));
            for (d, wb) in lanes {
                let $x = LittleEndian::read_u64(d);
                let $y = LittleEndian::read_u64(wb);
                LittleEndian::write_u64(d, $body);
            }
            $tail_assign(&mut acc[full..], &b[full..]);
        }
    };
}

word_binary!(and,    and_assign,    scalar::and,    scalar::and_assign,    |x, y| x & y);
word_binary!(or,     or_assign,     scalar::or,     scalar::or_assign,     |x, y| x | y);
word_binary!(andnot, andnot_assign, scalar::andnot, scalar::andnot_assign, |x, y| x & !y);

pub(crate) fn not(a: &[u8], dst: &mut [u8]) {
    debug_assert_eq!(a.len(), dst.len());
    let full = dst.len() / WIDTH * WIDTH;
    for (d, wa) in dst[..full].chunks_exact_mut(WIDTH).zip(a[..full].chunks_exact(WIDTH)) {
        LittleEndian::write_u64(d, !LittleEndian::read_u64(wa));
    }
    scalar::not(&a[full..], &mut dst[full..]);
}

pub(crate) fn not_assign(acc: &mut [u8]) {
    let full = acc.len() / WIDTH * WIDTH;
    for d in acc[..full].chunks_exact_mut(WIDTH) {
        let x = LittleEndian::read_u64(d);
        LittleEndian::write_u64(d, !x);
    }
    scalar::not_assign(&mut acc[full..]);
}
