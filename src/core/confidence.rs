// File: src/core/confidence.rs
//! Turns raw frequencies into confidence values comparable across
//! categories.
//!
//! For a token `t` and category `c`:
//!
//! - `lv(t,c) = (count / max_count)^(1 - s)`, 0 when unseen
//! - `sg(t,c)`: how far `lv(t,c)` sits above the median local value of `t`
//!   over all categories, measured in units of `l` times the mean absolute
//!   deviation from that median
//! - `gv(t,c) = lv * sg`
//! - `sn(t,c) = ((|C| - (k+1)) / ((|C|-1)(k+1)))^p`, where `k` is the sum of
//!   the local values of `t` in the other categories
//! - `sgv(t,c) = gv * sn`
//!
//! The spread is zero only when every category holds the same local value,
//! in which case no category stands out and `sg` is 0 for all of them. The
//! sanction reads local values, never `sg`, so it does not move with `l`.
//!
//! Every factor lies in [0, 1], so `sgv <= gv <= lv`. Nothing here is
//! cached: the values are a pure function of the store and the triple.

use crate::core::frequency::FrequencyStore;
use crate::core::types::{CategoryId, Hyperparameters, TokenValues, WordId};

/// Steepness of the significance curve; `squash(w, w) ~= 0.5`.
const SQUASH_STEEPNESS: f64 = 3.0;

/// Read-only view pairing a frequency store with one hyperparameter triple.
#[derive(Debug, Clone, Copy)]
pub struct ConfidenceEngine<'a> {
    store: &'a FrequencyStore,
    params: Hyperparameters,
}

impl<'a> ConfidenceEngine<'a> {
    pub fn new(store: &'a FrequencyStore, params: Hyperparameters) -> Self {
        Self { store, params }
    }

    pub fn params(&self) -> Hyperparameters {
        self.params
    }

    pub fn category_count(&self) -> usize {
        self.store.len()
    }

    /// Local value of `token` in one category.
    pub fn local_value(&self, category: CategoryId, token: &[WordId]) -> f64 {
        match self.store.table(category) {
            Some(table) => local_value(table.count(token), table.max_count(), self.params.s),
            None => 0.0,
        }
    }

    /// Local values of `token` in every category, in category order.
    pub fn local_values(&self, token: &[WordId]) -> Vec<f64> {
        (0..self.store.len())
            .map(|c| self.local_value(c, token))
            .collect()
    }

    pub fn global_value(&self, category: CategoryId, token: &[WordId]) -> f64 {
        self.breakdown(token)
            .get(category)
            .map(|v| v.gv)
            .unwrap_or(0.0)
    }

    pub fn sanctioned_value(&self, category: CategoryId, token: &[WordId]) -> f64 {
        self.breakdown(token)
            .get(category)
            .map(|v| v.sgv)
            .unwrap_or(0.0)
    }

    /// Sanctioned global values of `token` for every category. This is the
    /// scanner's hot path.
    pub fn sanctioned_values(&self, token: &[WordId]) -> Vec<f64> {
        self.breakdown(token).into_iter().map(|v| v.sgv).collect()
    }

    /// Full lv/sg/gv/sn/sgv breakdown for every category.
    pub fn breakdown(&self, token: &[WordId]) -> Vec<TokenValues> {
        let lvs = self.local_values(token);
        breakdown_from_local(&lvs, self.params)
    }
}

/// Normalized count, flattened by smoothness. Monotone in `count`.
pub fn local_value(count: u64, max_count: u64, smoothness: f64) -> f64 {
    if count == 0 || max_count == 0 {
        return 0.0;
    }
    let fr = count as f64 / max_count as f64;
    fr.min(1.0).powf(1.0 - smoothness)
}

/// Maps a positive deviation onto [0, 1]. Zero at `x <= 0`, a step when
/// `width` is zero (only reachable with `l = 0`), otherwise a shifted tanh that reaches ~0.5 at `x = width`.
pub fn squash(x: f64, width: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    if width <= 0.0 {
        return 1.0;
    }
    let floor = SQUASH_STEEPNESS.tanh();
    let raw = (SQUASH_STEEPNESS * x / width - SQUASH_STEEPNESS).tanh();
    ((raw + floor) / (1.0 + floor)).clamp(0.0, 1.0)
}

/// Median of a non-empty slice; sorts it in place.
fn median_in_place(values: &mut [f64]) -> f64 {
    values.sort_by(|a, b| a.total_cmp(b));
    let n = values.len();
    if n == 0 {
        0.0
    } else if n % 2 == 1 {
        values[n / 2]
    } else {
        (values[n / 2 - 1] + values[n / 2]) / 2.0
    }
}

/// Mean absolute deviation of `values` around `center`.
fn mean_deviation(values: &[f64], center: f64) -> f64 {
    values.iter().map(|v| (v - center).abs()).sum::<f64>() / values.len() as f64
}

/// Sanction factor for a token whose local values in the other categories
/// add up to `others_lv`. 1 when no other category knows the token, 0 when
/// every other category holds it at full strength.
pub fn sanction(others_lv: f64, categories: usize, p: f64) -> f64 {
    if categories < 2 {
        return 1.0;
    }
    let c = categories as f64;
    let k = others_lv.clamp(0.0, c - 1.0);
    let base = (c - (k + 1.0)) / ((c - 1.0) * (k + 1.0));
    base.clamp(0.0, 1.0).powf(p)
}

/// Derives the full breakdown from per-category local values.
pub fn breakdown_from_local(lvs: &[f64], params: Hyperparameters) -> Vec<TokenValues> {
    let n = lvs.len();
    if lvs.iter().all(|&v| v == 0.0) {
        return vec![TokenValues::default(); n];
    }
    if n == 1 {
        return vec![TokenValues {
            lv: lvs[0],
            sg: 1.0,
            gv: lvs[0],
            sn: 1.0,
            sgv: lvs[0],
        }];
    }

    let mut scratch = lvs.to_vec();
    let median = median_in_place(&mut scratch);
    let width = params.l * mean_deviation(lvs, median);
    let lv_sum: f64 = lvs.iter().sum();

    lvs.iter()
        .map(|&lv| {
            let sg = squash(lv - median, width);
            let gv = lv * sg;
            let sn = sanction(lv_sum - lv, n, params.p);
            TokenValues {
                lv,
                sg,
                gv,
                sn,
                sgv: gv * sn,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(s: f64, l: f64, p: f64) -> Hyperparameters {
        Hyperparameters::new(s, l, p).unwrap()
    }

    #[test]
    fn test_local_value_monotone() {
        for s in [0.0, 0.3, 0.45, 0.9, 1.0] {
            let mut last = 0.0;
            for count in 0..=10 {
                let v = local_value(count, 10, s);
                assert!(v >= last, "s={} count={}", s, count);
                last = v;
            }
            assert_eq!(local_value(10, 10, s), 1.0);
        }
        assert!((local_value(5, 10, 0.0) - 0.5).abs() < 1e-12);
        assert_eq!(local_value(0, 10, 0.5), 0.0);
    }

    #[test]
    fn test_squash_shape() {
        assert_eq!(squash(0.0, 1.0), 0.0);
        assert_eq!(squash(-1.0, 1.0), 0.0);
        assert_eq!(squash(0.2, 0.0), 1.0);
        assert!((squash(1.0, 1.0) - 0.4975).abs() < 0.01);
        assert!(squash(10.0, 1.0) > 0.999);
        assert!(squash(0.5, 2.0) < squash(0.5, 1.0));
    }

    #[test]
    fn test_unseen_is_zero() {
        let out = breakdown_from_local(&[0.0, 0.0, 0.0], Hyperparameters::default());
        assert!(out.iter().all(|v| *v == TokenValues::default()));
    }

    #[test]
    fn test_exclusive_token_keeps_local_value() {
        let out = breakdown_from_local(&[0.8, 0.0, 0.0, 0.0], Hyperparameters::default());
        assert!((out[0].gv - 0.8).abs() < 1e-12);
        assert!((out[0].sgv - 0.8).abs() < 1e-12);
        assert_eq!(out[1].sgv, 0.0);
    }

    #[test]
    fn test_shared_token_shrinks_with_significance() {
        let lvs = [0.9, 0.8, 0.85, 0.1];
        let low = breakdown_from_local(&lvs, params(0.45, 0.2, 1.0));
        let high = breakdown_from_local(&lvs, params(0.45, 3.0, 1.0));
        assert!(high[0].gv < low[0].gv);
        assert!(high[0].gv < 0.1);
    }

    #[test]
    fn test_penalties_compose() {
        let lvs = [0.9, 0.7, 0.2, 0.0, 0.6];
        for (l, p) in [(0.0, 0.0), (0.5, 1.0), (2.0, 3.0)] {
            for v in breakdown_from_local(&lvs, params(0.45, l, p)) {
                assert!(v.sgv <= v.gv + 1e-15);
                assert!(v.gv <= v.lv + 1e-15);
            }
        }
    }

    #[test]
    fn test_sanction_suppresses_common_tokens() {
        // Two categories sit well above the median.
        let lvs = [1.0, 1.0, 0.0, 0.0, 0.0];
        let mild = breakdown_from_local(&lvs, params(0.45, 0.5, 0.0));
        let harsh = breakdown_from_local(&lvs, params(0.45, 0.5, 4.0));
        assert_eq!(mild[0].sn, 1.0);
        assert!(harsh[0].sgv < mild[0].sgv);
    }

    #[test]
    fn test_near_uniform_token_shrinks_as_l_grows() {
        let lvs = [1.0, 0.9, 0.9];
        let mut last = f64::INFINITY;
        for l in [0.5, 5.0, 50.0, 500.0] {
            let out = breakdown_from_local(&lvs, params(0.45, l, 1.0));
            assert!(out[0].gv < last, "l={} gv={}", l, out[0].gv);
            last = out[0].gv;
        }
        assert!(last < 0.01);

        let out = breakdown_from_local(&lvs, params(0.45, 5.0, 1.0));
        assert!(out[0].gv < 0.2);
        assert_eq!(out[1].gv, 0.0);
    }

    #[test]
    fn test_tied_local_values_are_not_significant() {
        for lvs in [[0.7, 0.7, 0.7], [1.0, 1.0, 1.0]] {
            for l in [0.0, 0.5, 10.0] {
                let out = breakdown_from_local(&lvs, params(0.45, l, 1.0));
                assert!(out.iter().all(|v| v.sg == 0.0 && v.sgv == 0.0));
            }
        }
    }

    #[test]
    fn test_sanction_grows_with_category_spread() {
        let mut last = f64::INFINITY;
        for shared in 0..5 {
            let mut lvs = vec![0.0; 5];
            lvs[0] = 1.0;
            for lv in lvs.iter_mut().skip(1).take(shared) {
                *lv = 0.9;
            }
            let sn = breakdown_from_local(&lvs, params(0.45, 0.5, 1.0))[0].sn;
            assert!(sn < last, "shared={} sn={}", shared, sn);
            last = sn;
        }
        assert!(last < 0.05);
    }

    #[test]
    fn test_sanction_ignores_significance() {
        let lvs = [1.0, 0.9, 0.9, 0.9, 0.9];
        let sns: Vec<f64> = [0.0, 0.5, 5.0, 500.0]
            .iter()
            .map(|&l| breakdown_from_local(&lvs, params(0.45, l, 1.0))[0].sn)
            .collect();
        assert!(sns.windows(2).all(|w| w[0] == w[1]));

        let mild = breakdown_from_local(&lvs, params(0.45, 0.0, 1.0));
        let harsh = breakdown_from_local(&lvs, params(0.45, 0.0, 10.0));
        assert!(mild[0].sn < 0.05);
        assert!(harsh[0].sn < mild[0].sn);
        assert!(harsh[0].sgv < mild[0].sgv);
    }

    #[test]
    fn test_sanction_bounds() {
        assert_eq!(sanction(0.0, 4, 3.0), 1.0);
        assert_eq!(sanction(3.0, 4, 1.0), 0.0);
        assert_eq!(sanction(2.0, 1, 1.0), 1.0);
        assert_eq!(sanction(1.5, 4, 0.0), 1.0);
    }

    #[test]
    fn test_single_category_passthrough() {
        let out = breakdown_from_local(&[0.4], Hyperparameters::default());
        assert_eq!(out[0].sgv, 0.4);
    }
}
