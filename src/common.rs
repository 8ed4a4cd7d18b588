//! 全局基础类型与错误定义

use thiserror::Error;

// ── 类型别名 ──────────────────────────────────────────────────────────────────

/// 实体位置（bit 下标），即 Index Extractor 返回的实体 ID
pub type Position = u32;

/// Position 为 u32 时 bitmap 允许的最大字节数（2^32 bit）
pub const MAX_BITMAP_BYTES: usize = u32::MAX as usize / 8 + 1;

// ── 操作名 ────────────────────────────────────────────────────────────────────

/// 出错时用于标识是哪一个布尔运算
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    And,
    Or,
    AndNot,
    Not,
}

impl std::fmt::Display for OpKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OpKind::And    => "and",
            OpKind::Or     => "or",
            OpKind::AndNot => "andnot",
            OpKind::Not    => "not",
        };
        f.write_str(s)
    }
}

// ── 错误 ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BitmapError {
    #[error("length mismatch in {op}: expected {expected} bytes, got {actual}")]
    LengthMismatch { op: OpKind, expected: usize, actual: usize },
    #[error("bitmap too large: {0} bytes exceeds the u32 position space")]
    TooLarge(usize),
    #[error("universe of {universe} needs {expected} bytes, got {actual}")]
    UniverseMismatch { universe: usize, expected: usize, actual: usize },
    #[error("position {position} out of range for universe of {universe}")]
    OutOfRange { position: usize, universe: usize },
    #[error("config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, BitmapError>;

// ── 前置条件校验 ──────────────────────────────────────────────────────────────

/// 二元运算：a / b / dst 必须等长，在写任何字节之前检查
pub(crate) fn check_binary(op: OpKind, a: usize, b: usize, dst: usize) -> Result<()> {
    if b != a {
        return Err(BitmapError::LengthMismatch { op, expected: a, actual: b });
    }
    if dst != a {
        return Err(BitmapError::LengthMismatch { op, expected: a, actual: dst });
    }
    Ok(())
}

/// 一元运算 / 原地运算：两个操作数等长
pub(crate) fn check_unary(op: OpKind, a: usize, dst: usize) -> Result<()> {
    if dst != a {
        return Err(BitmapError::LengthMismatch { op, expected: a, actual: dst });
    }
    Ok(())
}
