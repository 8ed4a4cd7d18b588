//! # bitmap-filter 完整使用案例
//!
//! 演示核心功能：
//!
//! 1. 选定运算后端（可用 `BITMAP_FILTER_BACKEND=scalar|word|sse2|avx2|neon` 覆盖）
//! 2. 为 65536 家餐厅生成六个谓词位图
//! 3. 直接调用 BitOps：不贵 ∧ 有露台 ∧ 可预订
//! 4. 用 Filter 链式累加得到同一结果
//! 5. 各后端结果一致性校验
//!
//! 运行：`RUST_LOG=debug cargo run --example basic_usage`

use bitmap_filter::{
    engine, indexes, random::random_bitmap, Backend, BitOps, Bitmap, Filter,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::EnvFilter;

const RESTAURANTS: usize = 65_536;

fn main() -> bitmap_filter::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("═══════════════════════════════════════════════════════════");
    println!("   bitmap-filter 餐厅过滤演示                               ");
    println!("═══════════════════════════════════════════════════════════\n");

    // =========================================================================
    // 1. 后端
    // =========================================================================
    println!("【1】选定运算后端 ...");
    let backend = engine();
    println!("    backend    = {}", backend);
    println!("    lane_width = {} bytes", backend.lane_width());
    println!("    available  = {:?}\n", Backend::available());

    // =========================================================================
    // 2. 谓词位图
    // =========================================================================
    println!("【2】生成谓词位图（{} 家餐厅）...", RESTAURANTS);
    let mut rng = StdRng::seed_from_u64(2024);
    let predicates: Vec<(&str, f64)> = vec![
        ("near_metro",      0.10),
        ("private_parking", 0.01),
        ("terrace",         0.05),
        ("reservations",    0.95),
        ("vegan_friendly",  0.20),
        ("expensive",       0.10),
    ];
    let mut bitmaps: Vec<Bitmap> = Vec::with_capacity(predicates.len());
    for (name, density) in &predicates {
        let bm = random_bitmap(RESTAURANTS, *density, &mut rng)?;
        println!("    {:<16} density={:.2}  set={}", name, density, bm.count_ones());
        bitmaps.push(bm);
    }
    let terrace      = &bitmaps[2];
    let reservations = &bitmaps[3];
    let expensive    = &bitmaps[5];
    println!();

    // =========================================================================
    // 3. 直接调用 BitOps
    // =========================================================================
    println!("【3】not(expensive) ∧ terrace ∧ reservations ...");
    let mut res = Bitmap::new(RESTAURANTS);
    backend.not(expensive.as_bytes(), res.as_bytes_mut())?;
    backend.and_assign(res.as_bytes_mut(), terrace.as_bytes())?;
    backend.and_assign(res.as_bytes_mut(), reservations.as_bytes())?;
    let simple = res.indexes()?;
    println!("    matches = {}", simple.len());
    println!("    first   = {:?}\n", &simple[..simple.len().min(8)]);

    // =========================================================================
    // 4. Filter 链式累加
    // =========================================================================
    println!("【4】Filter: terrace ∖ expensive ∧ reservations ...");
    let mut filter = Filter::from_bitmap(terrace);
    filter.andnot(expensive.as_bytes())?.and(reservations.as_bytes())?;
    let chained = filter.matches()?;
    println!("    matches = {}", chained.len());
    assert_eq!(chained, simple);
    println!("    ✓ 与【3】一致\n");

    // =========================================================================
    // 5. 各后端一致性
    // =========================================================================
    println!("【5】逐后端校验 ...");
    for b in Backend::available() {
        let mut out = vec![0u8; terrace.byte_len()];
        b.andnot(terrace.as_bytes(), expensive.as_bytes(), &mut out)?;
        b.and_assign(&mut out, reservations.as_bytes())?;
        let hits = indexes(&out)?;
        let ok = if hits == simple { "✓" } else { "✗" };
        println!("    {} {:<6} (W={:>2})  matches={}", ok, b, b.lane_width(), hits.len());
    }

    println!("\n═══════════════════════════════════════════════════════════");
    println!("   演示完成");
    println!("═══════════════════════════════════════════════════════════");
    Ok(())
}
