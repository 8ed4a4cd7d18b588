//! 运算契约与后端选择
//!
//! [`BitOps`] 定义一次四种布尔运算（外加原地版本）；[`Backend`] 是它的
//! 全部实现：`Scalar` 为参考实现，其余为宽通道实现。后端在初始化时按
//! CPU 能力选定（[`engine`]），调用方只依赖契约，不关心走的是哪条路径。
//!
//! ```text
//!   Avx2 (W=32) ─┐
//!                ├─► Sse2 (W=16) ─┐
//!   Neon (W=16) ─┼────────────────┴─► Word (W=8) ─► Scalar (W=1)
//! ```

use std::str::FromStr;
use std::sync::OnceLock;

use crate::common::{check_binary, check_unary, BitmapError, OpKind, Result};
use crate::{scalar, word};

#[cfg(target_arch = "aarch64")]
use crate::simd::neon;
#[cfg(target_arch = "x86_64")]
use crate::simd::{avx2, sse2};

/// 覆盖后端选择的环境变量
pub const BACKEND_ENV: &str = "BITMAP_FILTER_BACKEND";

// ── 契约 ──────────────────────────────────────────────────────────────────────

/// 位图布尔运算契约。
///
/// 所有操作数字节长度必须相等，否则在写入任何字节前返回
/// [`BitmapError::LengthMismatch`]。
///
/// `dst` 与某个源是同一块缓冲区（原地累积）时用 `*_assign`：
///
/// | 原始写法               | 原地写法                                 |
/// |------------------------|------------------------------------------|
/// | `and(acc, b, acc)`     | `and_assign(acc, b)`                     |
/// | `or(acc, b, acc)`      | `or_assign(acc, b)`                      |
/// | `andnot(acc, b, acc)`  | `andnot_assign(acc, b)`                  |
/// | `andnot(a, acc, acc)`  | `not_assign(acc); and_assign(acc, a)`    |
/// | `not(acc, acc)`        | `not_assign(acc)`                        |
pub trait BitOps {
    fn name(&self) -> &'static str;

    /// 每步处理的字节数 W
    fn lane_width(&self) -> usize;

    /// `dst[i] = a[i] & b[i]`
    fn and(&self, a: &[u8], b: &[u8], dst: &mut [u8]) -> Result<()>;
    /// `dst[i] = a[i] | b[i]`
    fn or(&self, a: &[u8], b: &[u8], dst: &mut [u8]) -> Result<()>;
    /// `dst[i] = a[i] & !b[i]`
    fn andnot(&self, a: &[u8], b: &[u8], dst: &mut [u8]) -> Result<()>;
    /// `dst[i] = !a[i]`
    fn not(&self, a: &[u8], dst: &mut [u8]) -> Result<()>;

    fn and_assign(&self, acc: &mut [u8], b: &[u8]) -> Result<()>;
    fn or_assign(&self, acc: &mut [u8], b: &[u8]) -> Result<()>;
    fn andnot_assign(&self, acc: &mut [u8], b: &[u8]) -> Result<()>;
    fn not_assign(&self, acc: &mut [u8]);
}

// ── Backend ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Backend {
    /// 逐字节
    Scalar,
    /// 64-bit 字通道，任意平台可用
    Word,
    /// x86_64 SSE2，128-bit
    Sse2,
    /// x86_64 AVX2，256-bit
    Avx2,
    /// aarch64 NEON，128-bit
    Neon,
}

impl Backend {
    pub const ALL: [Backend; 5] = [
        Backend::Scalar, Backend::Word, Backend::Sse2, Backend::Avx2, Backend::Neon,
    ];

    /// 运行时检测可用的最宽后端
    pub fn detect() -> Self {
        #[cfg(target_arch = "x86_64")]
        {
            if is_x86_feature_detected!("avx2") {
                return Backend::Avx2;
            }
            if is_x86_feature_detected!("sse2") {
                return Backend::Sse2;
            }
            return Backend::Word;
        }

        #[cfg(target_arch = "aarch64")]
        {
            if std::arch::is_aarch64_feature_detected!("neon") {
                return Backend::Neon;
            }
            return Backend::Word;
        }

        #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
        {
            Backend::Word
        }
    }

    pub fn is_available(self) -> bool {
        match self {
            Backend::Scalar | Backend::Word => true,
            #[cfg(target_arch = "x86_64")]
            Backend::Sse2 => is_x86_feature_detected!("sse2"),
            #[cfg(target_arch = "x86_64")]
            Backend::Avx2 => is_x86_feature_detected!("avx2"),
            #[cfg(target_arch = "aarch64")]
            Backend::Neon => std::arch::is_aarch64_feature_detected!("neon"),
            #[allow(unreachable_patterns)]
            _ => false,
        }
    }

    /// 下一个更窄的后端；`Scalar` 没有回退
    pub fn fallback(self) -> Option<Backend> {
        match self {
            Backend::Avx2   => Some(Backend::Sse2),
            Backend::Sse2   => Some(Backend::Word),
            Backend::Neon   => Some(Backend::Word),
            Backend::Word   => Some(Backend::Scalar),
            Backend::Scalar => None,
        }
    }

    /// 沿回退链找到第一个可用的后端
    pub fn or_available(self) -> Backend {
        let mut cur = self;
        while !cur.is_available() {
            // Word / Scalar 总是可用，循环必然终止
            cur = cur.fallback().unwrap_or(Backend::Scalar);
        }
        cur
    }

    /// 变体本身的名字，与是否可用无关
    pub fn label(self) -> &'static str {
        match self {
            Backend::Scalar => "scalar",
            Backend::Word   => "word",
            Backend::Sse2   => "sse2",
            Backend::Avx2   => "avx2",
            Backend::Neon   => "neon",
        }
    }

    /// 变体本身的通道宽度 W，与是否可用无关
    pub fn width(self) -> usize {
        match self {
            Backend::Scalar => 1,
            Backend::Word   => word::WIDTH,
            Backend::Sse2   => 16,
            Backend::Avx2   => 32,
            Backend::Neon   => 16,
        }
    }

    /// 所有在本机可用的后端
    pub fn available() -> Vec<Backend> {
        Self::ALL.into_iter().filter(|b| b.is_available()).collect()
    }
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.label())
    }
}

impl FromStr for Backend {
    type Err = BitmapError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "scalar" => Ok(Backend::Scalar),
            "word"   => Ok(Backend::Word),
            "sse2"   => Ok(Backend::Sse2),
            "avx2"   => Ok(Backend::Avx2),
            "neon"   => Ok(Backend::Neon),
            other    => Err(BitmapError::Config(format!("unknown backend: {other}"))),
        }
    }
}

// 每个方法先校验长度；后端不可用时（例如手工构造了 Avx2）退回更窄的实现，
// 保证不会执行本机不支持的指令。
macro_rules! dispatch_binary {
    ($self:ident, $fn:ident, $($arg:expr),*) => {
        match $self.or_available() {
            Backend::Scalar => scalar::$fn($($arg),*),
            Backend::Word   => word::$fn($($arg),*),
            #[cfg(target_arch = "x86_64")]
            Backend::Sse2   => unsafe { sse2::$fn($($arg),*) },
            #[cfg(target_arch = "x86_64")]
            Backend::Avx2   => unsafe { avx2::$fn($($arg),*) },
            #[cfg(target_arch = "aarch64")]
            Backend::Neon   => unsafe { neon::$fn($($arg),*) },
            #[allow(unreachable_patterns)]
            _               => word::$fn($($arg),*),
        }
    };
}

impl BitOps for Backend {
    /// 实际执行的后端名（不可用时为回退后的后端）
    fn name(&self) -> &'static str {
        self.or_available().label()
    }

    /// 实际执行的通道宽度
    fn lane_width(&self) -> usize {
        self.or_available().width()
    }

    fn and(&self, a: &[u8], b: &[u8], dst: &mut [u8]) -> Result<()> {
        check_binary(OpKind::And, a.len(), b.len(), dst.len())?;
        dispatch_binary!(self, and, a, b, dst);
        Ok(())
    }

    fn or(&self, a: &[u8], b: &[u8], dst: &mut [u8]) -> Result<()> {
        check_binary(OpKind::Or, a.len(), b.len(), dst.len())?;
        dispatch_binary!(self, or, a, b, dst);
        Ok(())
    }

    fn andnot(&self, a: &[u8], b: &[u8], dst: &mut [u8]) -> Result<()> {
        check_binary(OpKind::AndNot, a.len(), b.len(), dst.len())?;
        dispatch_binary!(self, andnot, a, b, dst);
        Ok(())
    }

    fn not(&self, a: &[u8], dst: &mut [u8]) -> Result<()> {
        check_unary(OpKind::Not, a.len(), dst.len())?;
        dispatch_binary!(self, not, a, dst);
        Ok(())
    }

    fn and_assign(&self, acc: &mut [u8], b: &[u8]) -> Result<()> {
        check_unary(OpKind::And, acc.len(), b.len())?;
        dispatch_binary!(self, and_assign, acc, b);
        Ok(())
    }

    fn or_assign(&self, acc: &mut [u8], b: &[u8]) -> Result<()> {
        check_unary(OpKind::Or, acc.len(), b.len())?;
        dispatch_binary!(self, or_assign, acc, b);
        Ok(())
    }

    fn andnot_assign(&self, acc: &mut [u8], b: &[u8]) -> Result<()> {
        check_unary(OpKind::AndNot, acc.len(), b.len())?;
        dispatch_binary!(self, andnot_assign, acc, b);
        Ok(())
    }

    fn not_assign(&self, acc: &mut [u8]) {
        dispatch_binary!(self, not_assign, acc);
    }
}

// ── 配置 ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendChoice {
    /// 按 CPU 能力自动选择
    #[default]
    Auto,
    Fixed(Backend),
}

impl FromStr for BackendChoice {
    type Err = BitmapError;

    fn from_str(s: &str) -> Result<Self> {
        if s.trim().eq_ignore_ascii_case("auto") {
            return Ok(BackendChoice::Auto);
        }
        s.parse::<Backend>().map(BackendChoice::Fixed)
    }
}

#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    pub backend: BackendChoice,
}

impl EngineConfig {
    pub fn new(backend: BackendChoice) -> Self {
        Self { backend }
    }

    /// 从 `BITMAP_FILTER_BACKEND` 读取；未设置或为空时为 `Auto`
    pub fn from_env() -> Result<Self> {
        Self::from_env_value(std::env::var(BACKEND_ENV).ok().as_deref())
    }

    /// 解析环境变量的取值；`None`、空串或全空白都视为 `Auto`
    pub fn from_env_value(value: Option<&str>) -> Result<Self> {
        match value {
            Some(v) if !v.trim().is_empty() => Ok(Self::new(v.parse()?)),
            _ => Ok(Self::default()),
        }
    }

    /// 解析为本机可用的后端
    pub fn resolve(&self) -> Backend {
        match self.backend {
            BackendChoice::Auto => Backend::detect(),
            BackendChoice::Fixed(want) => {
                let got = want.or_available();
                if got != want {
                    tracing::warn!(
                        "backend {} unavailable on this CPU, falling back to {}",
                        want, got
                    );
                }
                got
            }
        }
    }
}

// ── 全局后端 ──────────────────────────────────────────────────────────────────

static ENGINE: OnceLock<Backend> = OnceLock::new();

/// 进程级后端（首次调用时按环境变量 + CPU 能力选定，之后不变）
pub fn engine() -> Backend {
    *ENGINE.get_or_init(|| {
        let cfg = EngineConfig::from_env().unwrap_or_else(|e| {
            tracing::warn!("ignoring {}: {}", BACKEND_ENV, e);
            EngineConfig::default()
        });
        let backend = cfg.resolve();
        tracing::info!(
            backend = backend.name(),
            lane_width = backend.lane_width(),
            "bitmap engine selected"
        );
        backend
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_is_available() {
        let b = Backend::detect();
        assert!(b.is_available());
        assert!(Backend::available().contains(&Backend::Scalar));
        assert!(Backend::available().contains(&Backend::Word));
    }

    #[test]
    fn test_fallback_chain_ends_at_scalar() {
        for b in Backend::ALL {
            let mut cur = b;
            let mut steps = 0;
            while let Some(next) = cur.fallback() {
                assert!(next.width() < cur.width());
                cur = next;
                steps += 1;
            }
            assert_eq!(cur, Backend::Scalar);
            assert!(steps <= 3);
            assert!(b.or_available().is_available());
        }
    }

    #[test]
    fn test_unavailable_backend_reports_what_runs() {
        for b in Backend::ALL {
            let runs = b.or_available();
            assert_eq!(b.name(), runs.label());
            assert_eq!(b.lane_width(), runs.width());
            if b.is_available() {
                assert_eq!(b.name(), b.label());
            }
        }
        // 任何平台上 x86 与 NEON 至少有一个不可用
        let missing = Backend::ALL.into_iter().find(|b| !b.is_available()).unwrap();
        assert_ne!(missing.name(), missing.label());
        assert!(missing.lane_width() < missing.width());
    }

    #[test]
    fn test_parse_backend_choice() {
        assert_eq!("AUTO".parse::<BackendChoice>().unwrap(), BackendChoice::Auto);
        assert_eq!(" Avx2 ".parse::<BackendChoice>().unwrap(), BackendChoice::Fixed(Backend::Avx2));
        assert_eq!("word".parse::<Backend>().unwrap(), Backend::Word);
        assert!(matches!("avx512".parse::<Backend>(), Err(BitmapError::Config(_))));
    }

    #[test]
    fn test_env_value_parsing() {
        let auto = EngineConfig::default();
        assert_eq!(EngineConfig::from_env_value(None).unwrap().backend, auto.backend);
        assert_eq!(EngineConfig::from_env_value(Some("")).unwrap().backend, BackendChoice::Auto);
        assert_eq!(EngineConfig::from_env_value(Some(" \t ")).unwrap().backend, BackendChoice::Auto);
        assert_eq!(EngineConfig::from_env_value(Some("auto")).unwrap().backend, BackendChoice::Auto);
        assert_eq!(
            EngineConfig::from_env_value(Some("Scalar")).unwrap().backend,
            BackendChoice::Fixed(Backend::Scalar),
        );
        assert!(matches!(
            EngineConfig::from_env_value(Some("avx1024")),
            Err(BitmapError::Config(_)),
        ));
    }

    #[test]
    fn test_from_env_reads_variable() {
        // engine() 可能并发读取同一变量；这里只写入合法取值
        std::env::set_var(BACKEND_ENV, " word ");
        let cfg = EngineConfig::from_env().unwrap();
        std::env::remove_var(BACKEND_ENV);
        assert_eq!(cfg.backend, BackendChoice::Fixed(Backend::Word));
        assert_eq!(cfg.resolve(), Backend::Word);
    }

    #[test]
    fn test_resolve_fixed_and_auto() {
        assert_eq!(EngineConfig::new(BackendChoice::Fixed(Backend::Scalar)).resolve(), Backend::Scalar);
        assert_eq!(EngineConfig::new(BackendChoice::Auto).resolve(), Backend::detect());
        // 不可用的后端会退回到可用的
        let r = EngineConfig::new(BackendChoice::Fixed(Backend::Neon)).resolve();
        assert!(r.is_available());
    }

    #[test]
    fn test_length_mismatch_leaves_dst_untouched() {
        let a = [0xFFu8; 16];
        let b = [0xFFu8; 15];
        for backend in Backend::available() {
            let mut dst = [0xAAu8; 16];
            let err = backend.and(&a, &b, &mut dst).unwrap_err();
            assert_eq!(err, BitmapError::LengthMismatch { op: OpKind::And, expected: 16, actual: 15 });
            assert_eq!(dst, [0xAAu8; 16]);

            let mut short = [0u8; 15];
            assert!(backend.not(&a, &mut short).is_err());
            assert!(backend.andnot_assign(&mut dst, &b).is_err());
            assert_eq!(dst, [0xAAu8; 16]);
        }
    }

    #[test]
    fn test_engine_is_stable() {
        assert_eq!(engine(), engine());
        assert!(engine().is_available());
    }
}
