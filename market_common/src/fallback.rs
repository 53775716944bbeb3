//! Tiered fallback resolution for the traded-amount series.
//!
//! Some trade dates come back from the vendor with the amount field zeroed
//! or missing for the whole board. The resolver then escalates through an
//! ordered chain of alternative field pairs, each backed by its own vendor
//! query, until at least one code resolves to a positive amount.
//!
//! The escalation trigger is global across codes: a single positive primary
//! amount suppresses every tier, even for codes that are themselves zero or
//! absent. Within a tier, substitution is per-code and only touches codes
//! that have not resolved yet. Exhausting the chain leaves the remaining
//! amounts absent or zero; values are never fabricated.
use log::debug;

/// How a tier combines its two candidate series into an amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combine {
    /// Take the first of the two values that is present and positive.
    FirstPositive,
    /// Multiply the two values; both must be present and positive.
    Product,
}

/// One escalation tier: the two vendor fields to query and how to combine
/// them into a per-code amount.
#[derive(Debug, Clone, Copy)]
pub struct TierSpec<'a> {
    /// First candidate field label.
    pub first: &'a str,
    /// Second candidate field label.
    pub second: &'a str,
    /// Combination rule for the two candidates.
    pub combine: Combine,
}

/// Fallback chain for the commodity-board amount: turnover/value first,
/// then close x volume as an approximation.
pub const AMOUNT_TIERS: [TierSpec<'static>; 2] = [
    TierSpec {
        first: "TURNOVER",
        second: "VALUE",
        combine: Combine::FirstPositive,
    },
    TierSpec {
        first: "CLOSE",
        second: "VOLUME",
        combine: Combine::Product,
    },
];

/// Candidate series pair fetched for one tier, aligned to the code list.
#[derive(Debug, Clone)]
pub struct TierSeries {
    /// Values of the tier's first field, one per code.
    pub first: Vec<Option<f64>>,
    /// Values of the tier's second field, one per code.
    pub second: Vec<Option<f64>>,
    /// Combination rule.
    pub combine: Combine,
}

fn positive(v: Option<f64>) -> Option<f64> {
    v.filter(|x| *x > 0.0)
}

impl TierSeries {
    /// Amount candidate this tier produces for code position `i`.
    fn amount_at(&self, i: usize) -> Option<f64> {
        let a = positive(self.first.get(i).copied().flatten());
        let b = positive(self.second.get(i).copied().flatten());
        match self.combine {
            Combine::FirstPositive => a.or(b),
            Combine::Product => match (a, b) {
                (Some(x), Some(y)) => Some(x * y),
                _ => None,
            },
        }
    }
}

/// True when no code has a present amount strictly greater than zero.
pub fn needs_escalation(amounts: &[Option<f64>]) -> bool {
    !amounts.iter().any(|a| matches!(a, Some(x) if *x > 0.0))
}

/// Resolve the amount series against an ordered chain of fallback tiers.
///
/// `fetch` runs the vendor query for one tier and is invoked only while
/// every code is still absent-or-zero; it may return `None` (failed query),
/// in which case the chain moves on to the next tier.
pub fn resolve<F>(amounts: &mut [Option<f64>], tiers: &[TierSpec<'_>], mut fetch: F)
where
    F: FnMut(&TierSpec<'_>) -> Option<TierSeries>,
{
    for spec in tiers {
        if !needs_escalation(amounts) {
            return;
        }
        debug!("no positive amount yet, trying {},{}", spec.first, spec.second);
        let Some(tier) = fetch(spec) else {
            continue;
        };
        for (i, slot) in amounts.iter_mut().enumerate() {
            if matches!(slot, Some(x) if *x > 0.0) {
                continue;
            }
            if let Some(candidate) = tier.amount_at(i) {
                *slot = Some(candidate);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tier(first: Vec<Option<f64>>, second: Vec<Option<f64>>, combine: Combine) -> TierSeries {
        TierSeries { first, second, combine }
    }

    #[test]
    fn one_positive_primary_suppresses_all_escalation() {
        let mut amounts = vec![Some(0.0), Some(123.0), None];
        let mut calls = 0;
        resolve(&mut amounts, &AMOUNT_TIERS, |_| {
            calls += 1;
            None
        });
        assert_eq!(calls, 0);
        assert_eq!(amounts, vec![Some(0.0), Some(123.0), None]);
    }

    #[test]
    fn turnover_then_value_substitution_is_per_code() {
        // Codes: C0.DCE, AU0.SHF, ZZZ9.XXX; primary all zero.
        let mut amounts = vec![Some(0.0), Some(0.0), Some(0.0)];
        resolve(&mut amounts, &AMOUNT_TIERS[..1], |_| {
            Some(tier(
                vec![Some(100.0), Some(0.0), Some(0.0)],
                vec![Some(0.0), Some(50.0), Some(0.0)],
                Combine::FirstPositive,
            ))
        });
        assert_eq!(amounts, vec![Some(100.0), Some(50.0), Some(0.0)]);
    }

    #[test]
    fn later_tiers_never_overwrite_resolved_codes() {
        let mut amounts = vec![None, Some(0.0)];
        let mut fetched: Vec<String> = Vec::new();
        resolve(&mut amounts, &AMOUNT_TIERS, |spec| {
            fetched.push(spec.first.to_string());
            match spec.combine {
                Combine::FirstPositive => Some(tier(
                    vec![Some(70.0), None],
                    vec![None, None],
                    Combine::FirstPositive,
                )),
                Combine::Product => panic!("tier two must not run once a code resolved"),
            }
        });
        assert_eq!(fetched, vec!["TURNOVER"]);
        assert_eq!(amounts, vec![Some(70.0), Some(0.0)]);
    }

    #[test]
    fn product_tier_requires_both_factors_positive() {
        let mut amounts = vec![None, None, None];
        resolve(&mut amounts, &AMOUNT_TIERS[1..], |_| {
            Some(tier(
                vec![Some(10.0), Some(10.0), None],
                vec![Some(3.0), Some(0.0), Some(3.0)],
                Combine::Product,
            ))
        });
        assert_eq!(amounts, vec![Some(30.0), None, None]);
    }

    #[test]
    fn failed_tier_queries_degrade_to_the_next_tier() {
        let mut amounts = vec![Some(0.0)];
        resolve(&mut amounts, &AMOUNT_TIERS, |spec| match spec.combine {
            Combine::FirstPositive => None,
            Combine::Product => Some(tier(
                vec![Some(2.0)],
                vec![Some(4.0)],
                Combine::Product,
            )),
        });
        assert_eq!(amounts, vec![Some(8.0)]);
    }

    #[test]
    fn exhausted_chains_leave_amounts_untouched() {
        let mut amounts = vec![Some(0.0), None];
        resolve(&mut amounts, &AMOUNT_TIERS, |_| {
            Some(tier(vec![None, None], vec![None, None], Combine::FirstPositive))
        });
        assert_eq!(amounts, vec![Some(0.0), None]);
    }
}
