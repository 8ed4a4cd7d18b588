//! 带 universe 大小的定长位图
//!
//! 引擎本身只处理 `&[u8]`；`Bitmap` 额外记住谓词覆盖的实体数 N，
//! 负责按位读写、清理 N 之后的尾部 bit，以及只报告 `< N` 的位置。

use crate::common::{BitmapError, Position, Result};
use crate::extract;

/// N 个实体所需的字节数 `ceil(N / 8)`
pub fn byte_len_for(universe: usize) -> usize {
    universe.div_ceil(8)
}

/// 把 `bytes` 最后一个字节中 `>= universe` 的 bit 清零
pub(crate) fn clear_tail_bits(bytes: &mut [u8], universe: usize) {
    let rem = universe % 8;
    if rem != 0 {
        if let Some(last) = bytes.last_mut() {
            *last &= (1u8 << rem) - 1;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    universe: usize,
    bytes:    Vec<u8>,
}

impl Bitmap {
    /// 全 0 位图
    pub fn new(universe: usize) -> Self {
        Self { universe, bytes: vec![0u8; byte_len_for(universe)] }
    }

    /// 全 1 位图（尾部 bit 为 0）
    pub fn full(universe: usize) -> Self {
        let mut bm = Self { universe, bytes: vec![0xFFu8; byte_len_for(universe)] };
        bm.clear_tail();
        bm
    }

    /// 包装外部字节；长度必须为 `ceil(universe / 8)`
    pub fn from_bytes(universe: usize, bytes: Vec<u8>) -> Result<Self> {
        let expected = byte_len_for(universe);
        if bytes.len() != expected {
            return Err(BitmapError::UniverseMismatch {
                universe,
                expected,
                actual: bytes.len(),
            });
        }
        Ok(Self { universe, bytes })
    }

    pub fn from_positions<I>(universe: usize, positions: I) -> Result<Self>
    where
        I: IntoIterator<Item = usize>,
    {
        let mut bm = Self::new(universe);
        for p in positions {
            bm.set(p)?;
        }
        Ok(bm)
    }

    pub fn universe(&self) -> usize { self.universe }
    pub fn byte_len(&self) -> usize { self.bytes.len() }
    pub fn as_bytes(&self) -> &[u8] { &self.bytes }
    pub fn as_bytes_mut(&mut self) -> &mut [u8] { &mut self.bytes }
    pub fn into_bytes(self) -> Vec<u8> { self.bytes }

    fn check(&self, position: usize) -> Result<()> {
        if position >= self.universe {
            return Err(BitmapError::OutOfRange { position, universe: self.universe });
        }
        Ok(())
    }

    pub fn get(&self, position: usize) -> Result<bool> {
        self.check(position)?;
        Ok(self.bytes[position / 8] & (1 << (position % 8)) != 0)
    }

    pub fn set(&mut self, position: usize) -> Result<()> {
        self.check(position)?;
        self.bytes[position / 8] |= 1 << (position % 8);
        Ok(())
    }

    pub fn clear(&mut self, position: usize) -> Result<()> {
        self.check(position)?;
        self.bytes[position / 8] &= !(1 << (position % 8));
        Ok(())
    }

    /// 将最后一个字节中 `>= N` 的 bit 清零（NOT 之后需要）
    pub fn clear_tail(&mut self) {
        clear_tail_bits(&mut self.bytes, self.universe);
    }

    /// 置位数（只统计 `< N` 的 bit）
    pub fn count_ones(&self) -> usize {
        let full = self.universe / 8;
        let rem  = self.universe % 8;
        let tail = match self.bytes.get(full) {
            Some(&b) if rem != 0 => (b & ((1u8 << rem) - 1)).count_ones() as usize,
            _ => 0,
        };
        extract::popcount(&self.bytes[..full]) + tail
    }

    /// 命中的实体位置；尾部 bit 即使为 1 也不会出现在结果中
    pub fn indexes(&self) -> Result<Vec<Position>> {
        let mut out = extract::indexes(&self.bytes)?;
        let cut = out.partition_point(|&p| (p as usize) < self.universe);
        out.truncate(cut);
        Ok(out)
    }
}

impl AsRef<[u8]> for Bitmap {
    fn as_ref(&self) -> &[u8] { &self.bytes }
}

impl AsMut<[u8]> for Bitmap {
    fn as_mut(&mut self) -> &mut [u8] { &mut self.bytes }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_len_for() {
        assert_eq!(byte_len_for(0), 0);
        assert_eq!(byte_len_for(1), 1);
        assert_eq!(byte_len_for(8), 1);
        assert_eq!(byte_len_for(9), 2);
        assert_eq!(byte_len_for(65536), 8192);
    }

    #[test]
    fn test_set_get_clear() {
        let mut bm = Bitmap::new(20);
        bm.set(0).unwrap();
        bm.set(19).unwrap();
        assert!(bm.get(0).unwrap());
        assert!(bm.get(19).unwrap());
        assert!(!bm.get(10).unwrap());
        bm.clear(0).unwrap();
        assert!(!bm.get(0).unwrap());
        assert_eq!(
            bm.set(20),
            Err(BitmapError::OutOfRange { position: 20, universe: 20 }),
        );
    }

    #[test]
    fn test_full_has_clean_tail() {
        let bm = Bitmap::full(13);
        assert_eq!(bm.as_bytes(), &[0xFF, 0b0001_1111]);
        assert_eq!(bm.count_ones(), 13);
        assert_eq!(bm.indexes().unwrap(), (0..13).collect::<Vec<Position>>());
    }

    #[test]
    fn test_indexes_clip_dirty_tail() {
        // 模拟 NOT 之后未清理尾部的情况
        let mut bm = Bitmap::from_bytes(10, vec![0x00, 0xFF]).unwrap();
        assert_eq!(bm.indexes().unwrap(), vec![8, 9]);
        assert_eq!(bm.count_ones(), 2);
        bm.clear_tail();
        assert_eq!(bm.as_bytes(), &[0x00, 0b0000_0011]);
    }

    #[test]
    fn test_from_bytes_rejects_wrong_length() {
        assert!(Bitmap::from_bytes(16, vec![0; 3]).is_err());
        assert!(Bitmap::from_bytes(0, vec![]).is_ok());
    }

    #[test]
    fn test_from_positions() {
        let bm = Bitmap::from_positions(64, [3, 8, 63]).unwrap();
        assert_eq!(bm.indexes().unwrap(), vec![3, 8, 63]);
        assert!(Bitmap::from_positions(64, [64]).is_err());
    }
}
