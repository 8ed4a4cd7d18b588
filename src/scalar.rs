//! Scalar Engine：逐字节 AND / OR / AND-NOT / NOT
//!
//! 可移植基线实现，所有宽通道实现的正确性都以它为准，
//! 同时也是宽通道实现处理尾部字节（`L mod W`）的路径。
//!
//! 本模块的函数不做长度校验，调用方（[`crate::engine`]）负责。

macro_rules! scalar_binary {
    ($name:ident, $assign:ident, |$x:ident, $y:ident| $body:expr) => {
        #[inline]
        pub(crate) fn $name(a: &[u8], b: &[u8], dst: &mut [u8]) {
            debug_assert!(a.len() == dst.len() && b.len() == dst.len());
            for ((d, &$x), &$y) in dst.iter_mut().zip(a).zip(b) {
                *d = $body;
            }
        }

        #[inline]
        pub(crate) fn $assign(acc: &mut [u8], b: &[u8]) {
            debug_assert_eq!(acc.len(), b.len());
            for (d, &$y) in acc.iter_mut().zip(b) {
                let $x = *d;
                *d = $body;
            }
        }
    };
}

scalar_binary!(and,    and_assign,    |x, y| x & y);
scalar_binary!(or,     or_assign,     |x, y| x | y);
scalar_binary!(andnot, andnot_assign, |x, y| x & !y);

#[inline]
pub(crate) fn not(a: &[u8], dst: &mut [u8]) {
    debug_assert_eq!(a.len(), dst.len());
    for (d, &x) in dst.iter_mut().zip(a) {
        *d = !x;
    }
}

#[inline]
pub(crate) fn not_assign(acc: &mut [u8]) {
    for d in acc.iter_mut() {
        *d = !*d;
    }
}
