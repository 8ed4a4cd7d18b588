//! 按密度随机填充位图，供测试与演示生成谓词数据

use rand::Rng;

use crate::bitmap::Bitmap;
use crate::common::{BitmapError, Result};

fn check_density(density: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&density) {
        return Err(BitmapError::Config(format!("density must be in [0, 1], got {density}")));
    }
    Ok(())
}

/// 覆盖 `bitmap` 的全部内容：每个 bit 以概率 `density` 独立置 1
pub fn fill<R: Rng>(bitmap: &mut [u8], density: f64, rng: &mut R) -> Result<()> {
    check_density(density)?;
    for byte in bitmap.iter_mut() {
        let mut v = 0u8;
        for bit in 0..8 {
            if rng.random_bool(density) {
                v |= 1 << bit;
            }
        }
        *byte = v;
    }
    Ok(())
}

/// 生成一个 N 个实体的随机谓词位图，尾部 bit 为 0
pub fn random_bitmap<R: Rng>(universe: usize, density: f64, rng: &mut R) -> Result<Bitmap> {
    let mut bm = Bitmap::new(universe);
    fill(bm.as_bytes_mut(), density, rng)?;
    bm.clear_tail();
    Ok(bm)
}
