//! 谓词过滤累加器
//!
//! 典型用法是"排除贵的，再与有露台、可预订求交"：
//!
//! ```ignore
//! let hits = Filter::from_bitmap(&terrace)
//!     .andnot(expensive.as_bytes())?
//!     .and(reservations.as_bytes())?
//!     .matches()?;
//! ```
//!
//! 所有运算都在同一个累加缓冲区上原地完成，结果与写入新缓冲区一致。
//! 由 [`Bitmap`] 构造时记住 universe N：`not()` 后清理尾部，
//! `matches()` / `popcount()` 只报告 `< N` 的位置。

use crate::bitmap::{clear_tail_bits, Bitmap};
use crate::common::{Position, Result};
use crate::engine::{engine, Backend, BitOps};
use crate::extract;

#[derive(Debug, Clone)]
pub struct Filter {
    backend:  Backend,
    acc:      Vec<u8>,
    /// 已知时按 N 裁剪尾部
    universe: Option<usize>,
}

impl Filter {
    /// 以 `seed` 的副本作为初始累加值，使用进程级后端
    pub fn new(seed: &[u8]) -> Self {
        Self::with_backend(engine(), seed)
    }

    pub fn with_backend(backend: Backend, seed: &[u8]) -> Self {
        Self { backend, acc: seed.to_vec(), universe: None }
    }

    /// 以带 universe 的位图为种子，结果不会出现 `>= N` 的幻影位置
    pub fn from_bitmap(seed: &Bitmap) -> Self {
        Self::from_bitmap_with_backend(engine(), seed)
    }

    pub fn from_bitmap_with_backend(backend: Backend, seed: &Bitmap) -> Self {
        let mut f = Self {
            backend,
            acc:      seed.as_bytes().to_vec(),
            universe: Some(seed.universe()),
        };
        f.clear_tail();
        f
    }

    pub fn backend(&self) -> Backend { self.backend }

    pub fn universe(&self) -> Option<usize> { self.universe }

    fn clear_tail(&mut self) {
        if let Some(n) = self.universe {
            clear_tail_bits(&mut self.acc, n);
        }
    }

    /// `acc &= other`
    pub fn and(&mut self, other: &[u8]) -> Result<&mut Self> {
        self.backend.and_assign(&mut self.acc, other)?;
        Ok(self)
    }

    /// `acc |= other`
    pub fn or(&mut self, other: &[u8]) -> Result<&mut Self> {
        self.backend.or_assign(&mut self.acc, other)?;
        self.clear_tail();
        Ok(self)
    }

    /// `acc &= !other`
    pub fn andnot(&mut self, other: &[u8]) -> Result<&mut Self> {
        self.backend.andnot_assign(&mut self.acc, other)?;
        Ok(self)
    }

    /// `acc = !acc`；universe 未知时尾部 bit 会被置 1，提取前需由调用方清理
    pub fn not(&mut self) -> &mut Self {
        self.backend.not_assign(&mut self.acc);
        self.clear_tail();
        self
    }

    pub fn popcount(&self) -> usize {
        extract::popcount(&self.acc)
    }

    pub fn as_bytes(&self) -> &[u8] { &self.acc }

    pub fn into_inner(self) -> Vec<u8> { self.acc }

    /// 提取命中的实体位置
    pub fn matches(&self) -> Result<Vec<Position>> {
        let mut hits = extract::indexes(&self.acc)?;
        if let Some(n) = self.universe {
            let cut = hits.partition_point(|&p| (p as usize) < n);
            hits.truncate(cut);
        }
        tracing::debug!(
            backend = self.backend.name(),
            bytes = self.acc.len(),
            matches = hits.len(),
            "filter evaluated"
        );
        Ok(hits)
    }
}
