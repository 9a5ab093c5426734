//! Earned Value Management
//!
//! Standard EVM formula set over the static weekly PV/EV/AC series, plus the
//! RAG health classification derived from the performance indices.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One week of the earned value series
///
/// The series is static configuration. Weeks that have not reported yet carry
/// EV = AC = 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvmSnapshot {
    /// Project week, 1-based
    pub week: u32,
    /// Planned value (cumulative budgeted cost of scheduled work)
    pub pv: f64,
    /// Earned value (cumulative budgeted cost of completed work)
    pub ev: f64,
    /// Actual cost (cumulative spend)
    pub ac: f64,
}

/// Computed EVM metrics as of a given week
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EvmResult {
    /// Week the metrics were evaluated at
    pub week: u32,
    /// Budget at completion
    pub bac: f64,
    pub pv: f64,
    pub ev: f64,
    pub ac: f64,
    /// Schedule variance: EV - PV
    pub sv: f64,
    /// Cost variance: EV - AC
    pub cv: f64,
    /// Schedule performance index: EV / PV (0 when PV is 0)
    pub spi: f64,
    /// Cost performance index: EV / AC (0 when AC is 0)
    pub cpi: f64,
    /// Estimate at completion: BAC / CPI (BAC when CPI is 0)
    pub eac: f64,
    /// Variance at completion: BAC - EAC
    pub vac: f64,
}

impl EvmResult {
    /// The no-data result: the project has not reported for the requested
    /// week. EV = 0 is the sentinel callers use to tell this apart from a
    /// legitimately computed zero.
    pub fn no_data(week: u32, bac: f64) -> Self {
        Self {
            week,
            bac,
            pv: 0.0,
            ev: 0.0,
            ac: 0.0,
            sv: 0.0,
            cv: 0.0,
            spi: 0.0,
            cpi: 0.0,
            eac: bac,
            vac: 0.0,
        }
    }

    /// False when this is the no-data sentinel.
    pub fn has_data(&self) -> bool {
        self.ev > 0.0
    }

    /// RAG health classification of this result.
    pub fn rag(&self) -> RagStatus {
        classify(self.spi, self.cpi)
    }
}

/// Red/Amber/Green project health
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RagStatus {
    Green,
    Amber,
    Red,
}

impl fmt::Display for RagStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RagStatus::Green => write!(f, "GREEN"),
            RagStatus::Amber => write!(f, "AMBER"),
            RagStatus::Red => write!(f, "RED"),
        }
    }
}

/// Compute EVM metrics as of `as_of_week`.
///
/// Selects the series snapshot with the largest week not exceeding
/// `as_of_week`. If none exists, or the selected snapshot has EV = 0, the
/// result is [`EvmResult::no_data`] rather than an error.
pub fn compute_evm(series: &[EvmSnapshot], as_of_week: u32, bac: f64) -> EvmResult {
    let snapshot = series
        .iter()
        .filter(|s| s.week <= as_of_week)
        .max_by_key(|s| s.week);

    let Some(snapshot) = snapshot.filter(|s| s.ev > 0.0) else {
        return EvmResult::no_data(as_of_week, bac);
    };

    let spi = if snapshot.pv > 0.0 {
        snapshot.ev / snapshot.pv
    } else {
        0.0
    };
    let cpi = if snapshot.ac > 0.0 {
        snapshot.ev / snapshot.ac
    } else {
        0.0
    };
    let eac = if cpi > 0.0 { bac / cpi } else { bac };

    EvmResult {
        week: as_of_week,
        bac,
        pv: snapshot.pv,
        ev: snapshot.ev,
        ac: snapshot.ac,
        sv: snapshot.ev - snapshot.pv,
        cv: snapshot.ev - snapshot.ac,
        spi,
        cpi,
        eac,
        vac: bac - eac,
    }
}

/// RAG health from the two performance indices.
///
/// Green requires both indices at 0.95 or better; Amber both at 0.8 or
/// better; anything less is Red.
pub fn classify(spi: f64, cpi: f64) -> RagStatus {
    if spi >= 0.95 && cpi >= 0.95 {
        RagStatus::Green
    } else if spi >= 0.8 && cpi >= 0.8 {
        RagStatus::Amber
    } else {
        RagStatus::Red
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BAC: f64 = 500_000.0;

    fn series() -> Vec<EvmSnapshot> {
        vec![
            EvmSnapshot { week: 1, pv: 40_000.0, ev: 40_000.0, ac: 45_000.0 },
            EvmSnapshot { week: 2, pv: 80_000.0, ev: 75_000.0, ac: 85_000.0 },
            EvmSnapshot { week: 3, pv: 130_000.0, ev: 125_000.0, ac: 140_000.0 },
            EvmSnapshot { week: 4, pv: 180_000.0, ev: 170_000.0, ac: 195_000.0 },
            EvmSnapshot { week: 5, pv: 240_000.0, ev: 230_000.0, ac: 260_000.0 },
            EvmSnapshot { week: 6, pv: 300_000.0, ev: 290_000.0, ac: 330_000.0 },
            EvmSnapshot { week: 7, pv: 360_000.0, ev: 0.0, ac: 0.0 },
        ]
    }

    fn assert_close(actual: f64, expected: f64, tolerance: f64) {
        assert!(
            (actual - expected).abs() <= tolerance,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_week_six_standard_case() {
        let result = compute_evm(&series(), 6, BAC);
        assert!(result.has_data());
        assert_eq!(result.sv, -10_000.0);
        assert_eq!(result.cv, -40_000.0);
        assert_close(result.spi, 0.9667, 0.0001);
        assert_close(result.cpi, 0.8788, 0.0001);
        assert_close(result.eac, 568_965.5, 0.1);
        assert_close(result.vac, -68_965.5, 0.1);
        // Both indices clear 0.8 but neither clears 0.95
        assert_eq!(result.rag(), RagStatus::Amber);
    }

    #[test]
    fn test_unreported_week_is_no_data() {
        // Week 7 exists in the series but has EV = 0
        let result = compute_evm(&series(), 7, BAC);
        assert!(!result.has_data());
        assert_eq!(result.pv, 0.0);
        assert_eq!(result.ev, 0.0);
        assert_eq!(result.ac, 0.0);
        assert_eq!(result.spi, 0.0);
        assert_eq!(result.cpi, 0.0);
        assert_eq!(result.eac, BAC);
        assert_eq!(result.vac, 0.0);
    }

    #[test]
    fn test_empty_series_is_no_data() {
        let result = compute_evm(&[], 3, BAC);
        assert!(!result.has_data());
        assert_eq!(result.eac, BAC);
    }

    #[test]
    fn test_week_before_series_start_is_no_data() {
        let late_series = vec![EvmSnapshot { week: 4, pv: 100.0, ev: 90.0, ac: 95.0 }];
        assert!(!compute_evm(&late_series, 3, BAC).has_data());
    }

    #[test]
    fn test_selects_largest_week_not_exceeding() {
        let result = compute_evm(&series(), 4, BAC);
        assert_eq!(result.pv, 180_000.0);
        assert_eq!(result.ev, 170_000.0);
    }

    #[test]
    fn test_classification_thresholds() {
        assert_eq!(classify(1.0, 1.0), RagStatus::Green);
        assert_eq!(classify(0.95, 0.95), RagStatus::Green);
        assert_eq!(classify(0.94, 1.0), RagStatus::Amber);
        assert_eq!(classify(1.0, 0.94), RagStatus::Amber);
        assert_eq!(classify(0.8, 0.8), RagStatus::Amber);
        assert_eq!(classify(0.79, 1.0), RagStatus::Red);
        assert_eq!(classify(1.0, 0.79), RagStatus::Red);
        assert_eq!(classify(0.0, 0.0), RagStatus::Red);
    }

    #[test]
    fn test_zero_divisor_guards() {
        let odd = vec![EvmSnapshot { week: 1, pv: 0.0, ev: 10.0, ac: 0.0 }];
        let result = compute_evm(&odd, 1, BAC);
        assert_eq!(result.spi, 0.0);
        assert_eq!(result.cpi, 0.0);
        assert_eq!(result.eac, BAC);
    }
}
