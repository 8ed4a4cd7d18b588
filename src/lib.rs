//! # bitmap-filter
//!
//! 基于位图的布尔过滤引擎：每个谓词（"靠近地铁"、"有露台"）是一张定长位图，
//! bit `i` 表示实体 `i` 是否满足该谓词。复合查询 = 若干位图做
//! AND / OR / AND-NOT / NOT，再把结果位图中置位的位置取出来（命中的实体 ID）。
//!
//! ## 整体架构
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  调用方：每个谓词一张 &[u8]，长度 L = ceil(N / 8)         │
//! └───────────────┬─────────────────────────────────────────┘
//!                 │
//! ┌───────────────▼─────────────────────────────────────────┐
//! │  BitOps 契约  (engine)                                   │
//! │   and / or / andnot / not   + *_assign 原地版本          │
//! │                                                          │
//! │   Backend  ── 初始化时按 CPU 能力选定，OnceLock 缓存     │
//! │   ├─ Avx2   (W=32)  ┐                                    │
//! │   ├─ Sse2   (W=16)  ├─ simd：整通道 + scalar 尾部        │
//! │   ├─ Neon   (W=16)  ┘                                    │
//! │   ├─ Word   (W=8)   ── word：u64 字通道                  │
//! │   └─ Scalar (W=1)   ── scalar：参考实现                  │
//! └───────────────┬─────────────────────────────────────────┘
//!                 │  Filter：累加缓冲区上的原地链式运算
//! ┌───────────────▼─────────────────────────────────────────┐
//! │  Index Extractor (extract)                               │
//! │   indexes / iter_indexes / popcount                      │
//! └─────────────────────────────────────────────────────────┘
//! ```

// ── 数据模型 ──────────────────────────────────────────────────────────────────
pub mod common;
pub mod bitmap;

// ── 组合引擎 ──────────────────────────────────────────────────────────────────
mod scalar;
mod word;
mod simd;
pub mod engine;
pub mod filter;

// ── 结果提取 ──────────────────────────────────────────────────────────────────
pub mod extract;

// ── 辅助工具 ──────────────────────────────────────────────────────────────────
pub mod random;

pub use bitmap::{byte_len_for, Bitmap};
pub use common::{BitmapError, OpKind, Position, Result};
pub use engine::{engine, Backend, BackendChoice, BitOps, EngineConfig};
pub use extract::{indexes, iter_indexes, popcount, IndexIter};
pub use filter::Filter;
