//! Opt-in stage timing recorder, enabled with `AST_TIMINGS=1`
use once_cell::sync::Lazy;
use std::collections::BTreeMap;
use std::sync::Mutex;

static TIMINGS: Lazy<Mutex<BTreeMap<String, Vec<u128>>>> = Lazy::new(|| Mutex::new(BTreeMap::new()));

pub fn enabled() -> bool {
    std::env::var("AST_TIMINGS")
        .map(|v| !v.is_empty() && v != "0")
        .unwrap_or(false)
}

/// Record one duration (ms) under `label`
pub fn record(label: &str, dur_ms: u128) {
    if !enabled() {
        return;
    }
    if let Ok(mut guard) = TIMINGS.lock() {
        guard.entry(label.to_string()).or_default().push(dur_ms);
    }
}

fn percentiles(mut samples: Vec<u128>) -> (u128, u128, u128) {
    if samples.is_empty() {
        return (0, 0, 0);
    }
    samples.sort_unstable();
    let last = (samples.len() - 1) as f64;
    let at = |p: f64| samples[(p * last).round() as usize];
    let total: u128 = samples.iter().sum();
    (at(0.50), at(0.95), total / samples.len() as u128)
}

/// Per-label summary, empty when recording is disabled or nothing was recorded
pub fn summary() -> String {
    if !enabled() {
        return String::new();
    }
    let Ok(guard) = TIMINGS.lock() else {
        return String::new();
    };
    if guard.is_empty() {
        return String::new();
    }
    let mut out = String::from("=== TIMINGS (ms) ===\n");
    for (label, samples) in guard.iter() {
        let (p50, p95, avg) = percentiles(samples.clone());
        out.push_str(&format!(
            "{label}: count={} p50={p50} p95={p95} avg={avg}\n",
            samples.len()
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::percentiles;

    #[test]
    fn percentiles_of_empty_are_zero() {
        assert_eq!(percentiles(vec![]), (0, 0, 0));
    }

    #[test]
    fn percentiles_pick_sorted_samples() {
        let (p50, p95, avg) = percentiles(vec![5, 1, 3]);
        assert_eq!(p50, 3);
        assert_eq!(p95, 5);
        assert_eq!(avg, 3);
    }
}
