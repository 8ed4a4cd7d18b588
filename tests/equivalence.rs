//! 每个可用后端与 Scalar 逐字节一致，以及布尔代数恒等式

use bitmap_filter::{Backend, BitOps};
use proptest::prelude::*;

/// 长度覆盖 0、纯尾部、以及非 W 整数倍的情况
fn arb_pair() -> impl Strategy<Value = (Vec<u8>, Vec<u8>)> {
    (0usize..=200).prop_flat_map(|len| {
        (
            proptest::collection::vec(any::<u8>(), len),
            proptest::collection::vec(any::<u8>(), len),
        )
    })
}

fn run<F>(len: usize, f: F) -> Vec<u8>
where
    F: FnOnce(&mut [u8]),
{
    let mut dst = vec![0u8; len];
    f(&mut dst);
    dst
}

proptest! {
    #[test]
    fn backends_match_scalar((a, b) in arb_pair()) {
        let s = Backend::Scalar;
        let len = a.len();
        let want_and    = run(len, |d| s.and(&a, &b, d).unwrap());
        let want_or     = run(len, |d| s.or(&a, &b, d).unwrap());
        let want_andnot = run(len, |d| s.andnot(&a, &b, d).unwrap());
        let want_not    = run(len, |d| s.not(&a, d).unwrap());

        for backend in Backend::available() {
            prop_assert_eq!(&run(len, |d| backend.and(&a, &b, d).unwrap()), &want_and, "and on {}", backend);
            prop_assert_eq!(&run(len, |d| backend.or(&a, &b, d).unwrap()), &want_or, "or on {}", backend);
            prop_assert_eq!(&run(len, |d| backend.andnot(&a, &b, d).unwrap()), &want_andnot, "andnot on {}", backend);
            prop_assert_eq!(&run(len, |d| backend.not(&a, d).unwrap()), &want_not, "not on {}", backend);

            let mut acc = a.clone();
            backend.and_assign(&mut acc, &b).unwrap();
            prop_assert_eq!(&acc, &want_and, "and_assign on {}", backend);

            let mut acc = a.clone();
            backend.or_assign(&mut acc, &b).unwrap();
            prop_assert_eq!(&acc, &want_or, "or_assign on {}", backend);

            let mut acc = a.clone();
            backend.andnot_assign(&mut acc, &b).unwrap();
            prop_assert_eq!(&acc, &want_andnot, "andnot_assign on {}", backend);

            let mut acc = a.clone();
            backend.not_assign(&mut acc);
            prop_assert_eq!(&acc, &want_not, "not_assign on {}", backend);
        }
    }

    #[test]
    fn double_not_is_identity((a, _b) in arb_pair()) {
        for backend in Backend::available() {
            let once  = run(a.len(), |d| backend.not(&a, d).unwrap());
            let twice = run(a.len(), |d| backend.not(&once, d).unwrap());
            prop_assert_eq!(&twice, &a);
        }
    }

    #[test]
    fn de_morgan((a, b) in arb_pair()) {
        for backend in Backend::available() {
            let len = a.len();
            let and = run(len, |d| backend.and(&a, &b, d).unwrap());

            let na = run(len, |d| backend.not(&a, d).unwrap());
            let nb = run(len, |d| backend.not(&b, d).unwrap());
            let mut composed = run(len, |d| backend.or(&na, &nb, d).unwrap());
            backend.not_assign(&mut composed);

            prop_assert_eq!(composed, and);
        }
    }

    #[test]
    fn andnot_is_and_with_not((a, b) in arb_pair()) {
        for backend in Backend::available() {
            let len = a.len();
            let andnot = run(len, |d| backend.andnot(&a, &b, d).unwrap());
            let nb = run(len, |d| backend.not(&b, d).unwrap());
            let composed = run(len, |d| backend.and(&a, &nb, d).unwrap());
            prop_assert_eq!(andnot, composed);
        }
    }

    #[test]
    fn in_place_accumulation_matches_fresh_buffer((a, b) in arb_pair()) {
        for backend in Backend::available() {
            let fresh = run(a.len(), |d| backend.and(&a, &b, d).unwrap());

            // and(a, b, a)
            let mut acc = a.clone();
            backend.and_assign(&mut acc, &b).unwrap();
            prop_assert_eq!(&acc, &fresh);

            // and(a, b, b)
            let mut acc2 = b.clone();
            backend.and_assign(&mut acc2, &a).unwrap();
            prop_assert_eq!(&acc2, &fresh);
        }
    }
}
