use std::collections::BTreeMap as StdBTreeMap;
use std::env;
use std::error::Error;
use std::str::FromStr;
use std::time::Instant;

use log::{info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rbmap::Map;

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let n: usize = env_or("RBMAP_BENCH_N", 100_000);
    let seed: u64 = env_or("STRESS_TEST_SEED", 0x5eed);
    info!("running with n={} seed={}", n, seed);

    // Benchmark our implementation
    let mut rng = StdRng::seed_from_u64(seed);
    let start = Instant::now();
    let mut map = Map::new();
    for _ in 0..n {
        let key: u32 = rng.gen();
        map.set(key, key.wrapping_add(1));
    }
    let inserted = start.elapsed();
    let height = map.height();
    let len = map.check_invariants()?;
    let bound = 2.0 * ((len + 1) as f64).log2();
    if height as f64 > bound {
        warn!("height {} exceeds 2*log2(n+1) = {:.1}", height, bound);
    }
    info!("rbmap: {} keys, height {} (bound {:.1})", len, height, bound);

    let keys: Vec<_> = map.iter().map(|(k, _)| *k).collect();
    for k in &keys {
        map.remove(k);
    }
    map.check_invariants()?;
    let our_time = start.elapsed();

    // Benchmark std implementation
    let mut rng = StdRng::seed_from_u64(seed);
    let start = Instant::now();
    let mut std_map = StdBTreeMap::new();
    for _ in 0..n {
        let key: u32 = rng.gen();
        std_map.insert(key, key.wrapping_add(1));
    }
    let keys: Vec<_> = std_map.keys().copied().collect();
    for k in keys {
        std_map.remove(&k);
    }
    let std_time = start.elapsed();

    info!("rbmap insert phase: {:?}", inserted);
    info!("rbmap total:        {:?}", our_time);
    info!("std BTreeMap total: {:?}", std_time);
    Ok(())
}
