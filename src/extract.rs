//! Index Extractor：结果位图 → 命中的实体位置
//!
//! 位序约定：bit `i` 位于字节 `i / 8` 的第 `i % 8` 位（从最低位数起）。
//! 按小端把 8 字节读成一个 `u64` 后，字内第 `j` 位正好对应位置
//! `64 * k + j`，因此可以用 trailing_zeros 逐个取出置位，不需要逐 bit 分支。

use byteorder::{ByteOrder, LittleEndian};

use crate::common::{BitmapError, Position, Result, MAX_BITMAP_BYTES};

const WORD: usize = 8;

fn check_len(bitmap: &[u8]) -> Result<()> {
    if bitmap.len() > MAX_BITMAP_BYTES {
        return Err(BitmapError::TooLarge(bitmap.len()));
    }
    Ok(())
}

/// 位图的置位总数
pub fn popcount(bitmap: &[u8]) -> usize {
    let words = bitmap.chunks_exact(WORD);
    let tail: usize = words.remainder().iter().map(|b| b.count_ones() as usize).sum();
    words.map(|w| LittleEndian::read_u64(w).count_ones() as usize).sum::<usize>() + tail
}

/// 返回所有置位的位置，严格递增，长度等于 [`popcount`]
pub fn indexes(bitmap: &[u8]) -> Result<Vec<Position>> {
    let iter = iter_indexes(bitmap)?;
    let mut out = Vec::with_capacity(popcount(bitmap));
    out.extend(iter);
    Ok(out)
}

/// [`indexes`] 的惰性版本
pub fn iter_indexes(bitmap: &[u8]) -> Result<IndexIter<'_>> {
    check_len(bitmap)?;
    Ok(IndexIter { bytes: bitmap, next: 0, base: 0, word: 0 })
}

// ── IndexIter ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct IndexIter<'a> {
    bytes: &'a [u8],
    /// 下一个待装载字的起始字节
    next:  usize,
    /// 当前字 bit 0 对应的位置
    base:  usize,
    word:  u64,
}

impl Iterator for IndexIter<'_> {
    type Item = Position;

    fn next(&mut self) -> Option<Position> {
        loop {
            if self.word != 0 {
                let tz = self.word.trailing_zeros() as usize;
                self.word &= self.word - 1;
                return Some((self.base + tz) as Position);
            }
            if self.next >= self.bytes.len() {
                return None;
            }
            let end   = (self.next + WORD).min(self.bytes.len());
            let chunk = &self.bytes[self.next..end];
            self.word = if chunk.len() == WORD {
                LittleEndian::read_u64(chunk)
            } else {
                LittleEndian::read_uint(chunk, chunk.len())
            };
            self.base = self.next * 8;
            self.next = end;
        }
    }
}
