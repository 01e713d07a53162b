//! # Difficulty Normalization Module
//!
//! ## Purpose
//! Maps source-specific difficulty signals (acceptance percentage, solve count)
//! onto a common Elo-like scale in [800, 3500], and onward onto the coarse 1-10
//! bucket used for user-facing filtering.
//!
//! ## Input/Output Specification
//! - **Input**: optional acceptance percentage or solve count
//! - **Output**: Elo in [800, 3500]; bucket in [1, 10]
//! - **Determinism**: pure functions, no configuration, no I/O
//!
//! The same `elo_to_bucket` backs both ingestion-time display and query-time
//! filtering; the two must never diverge.

/// Lower bound of the unified Elo scale
pub const ELO_MIN: u32 = 800;
/// Upper bound of the unified Elo scale
pub const ELO_MAX: u32 = 3500;
/// Fallback when a problem carries no usable difficulty signal at all
pub const DEFAULT_ELO: u32 = 1500;
/// Fallback for acceptance-based sources when the rate is missing or invalid.
/// Distinct from `DEFAULT_ELO`: unknown acceptance usually means the problem
/// is obscure and likely hard.
pub const UNKNOWN_ACCEPTANCE_ELO: u32 = 2000;

const ELO_SPAN: f64 = (ELO_MAX - ELO_MIN) as f64;

/// Map an acceptance percentage in [0, 100] onto the Elo scale.
///
/// Higher acceptance means easier, so the mapping is inverted:
/// `800 + (1 - rate) * 2700`. Missing or non-finite input yields
/// [`UNKNOWN_ACCEPTANCE_ELO`].
pub fn acceptance_to_elo(acceptance_pct: Option<f64>) -> u32 {
    match acceptance_pct {
        Some(pct) if pct.is_finite() => {
            let rate = (pct / 100.0).clamp(0.0, 1.0);
            (ELO_MIN as f64 + (1.0 - rate) * ELO_SPAN).round() as u32
        }
        _ => UNKNOWN_ACCEPTANCE_ELO,
    }
}

/// Map a solve count onto the Elo scale via ordered popularity thresholds.
///
/// More solvers means easier. A missing or zero count yields [`DEFAULT_ELO`].
pub fn solved_count_to_elo(solved_count: Option<u64>) -> u32 {
    match solved_count {
        None | Some(0) => DEFAULT_ELO,
        Some(count) if count > 20_000 => 1200,
        Some(count) if count > 10_000 => 1400,
        Some(count) if count > 5_000 => 1600,
        Some(count) if count > 1_000 => 2000,
        Some(_) => 2300,
    }
}

/// Collapse an Elo value onto the 1-10 difficulty bucket.
pub fn elo_to_bucket(elo: u32) -> u8 {
    let scaled = ((elo as f64 - ELO_MIN as f64) / ELO_SPAN * 10.0).round();
    scaled.clamp(1.0, 10.0) as u8
}
