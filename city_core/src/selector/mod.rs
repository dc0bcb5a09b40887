//! Moment Selector - weighted procedural choice of what the city shows next.
//!
//! Selection works as follows:
//! 1. **Pool**: moments for this act or earlier, not revealed, not destroyed, not excluded
//! 2. **Preference**: narrow by type, then by district, but never to an empty pool
//! 3. **Weighting**: pattern affinity × variety penalty × fragile boost
//! 4. **Sampling**: cumulative-weight walk over a uniform draw
//! 5. **Recency**: remember the chosen type for the variety window

mod destruction;

use std::collections::{HashSet, VecDeque};
use tracing::debug;

use city_rules::{ChoicePattern, Moment, MomentId, MomentLibrary, MomentType};

use crate::config::{DestructionConfig, SelectorConfig};
use crate::random::RandomSource;

/// What the caller wants from the next selection.
#[derive(Debug, Clone)]
pub struct SelectionRequest {
    pub act: u8,
    pub preferred_type: Option<MomentType>,
    pub preferred_district: Option<u8>,
    pub choice_pattern: Option<ChoicePattern>,
    pub exclude: HashSet<MomentId>,
    pub enforce_variety: bool,
}

impl SelectionRequest {
    pub fn for_act(act: u8) -> Self {
        Self {
            act,
            preferred_type: None,
            preferred_district: None,
            choice_pattern: None,
            exclude: HashSet::new(),
            enforce_variety: true,
        }
    }

    pub fn with_type(mut self, moment_type: Option<MomentType>) -> Self {
        self.preferred_type = moment_type;
        self
    }

    pub fn with_district(mut self, district: Option<u8>) -> Self {
        self.preferred_district = district;
        self
    }

    pub fn with_pattern(mut self, pattern: ChoicePattern) -> Self {
        self.choice_pattern = Some(pattern);
        self
    }

    pub fn excluding(mut self, ids: impl IntoIterator<Item = MomentId>) -> Self {
        self.exclude.extend(ids);
        self
    }

    pub fn without_variety(mut self) -> Self {
        self.enforce_variety = false;
        self
    }
}

pub struct MomentSelector {
    config: SelectorConfig,
    destruction: DestructionConfig,
    /// Most recently shown types, oldest first.
    recent: VecDeque<MomentType>,
}

impl MomentSelector {
    pub fn new(config: SelectorConfig, destruction: DestructionConfig) -> Self {
        Self {
            config,
            destruction,
            recent: VecDeque::new(),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(SelectorConfig::default(), DestructionConfig::default())
    }

    pub fn config(&self) -> &SelectorConfig {
        &self.config
    }

    pub fn destruction(&self) -> &DestructionConfig {
        &self.destruction
    }

    /// Pick the next moment to surface, or `None` when nothing is left.
    ///
    /// Never fails while the candidate pool is non-empty.
    pub fn select_moment<'a>(
        &mut self,
        library: &'a MomentLibrary,
        request: &SelectionRequest,
        rng: &mut dyn RandomSource,
    ) -> Option<&'a Moment> {
        let pool: Vec<&Moment> = library
            .iter()
            .filter(|m| {
                m.act <= request.act
                    && !m.revealed
                    && !m.destroyed
                    && !request.exclude.contains(&m.id)
            })
            .collect();

        if pool.is_empty() {
            debug!(act = request.act, "No moments left to select");
            return None;
        }

        let pool = narrow(pool, |m| {
            request
                .preferred_type
                .map_or(true, |preferred| m.moment_type == preferred)
        });
        let pool = narrow(pool, |m| {
            request
                .preferred_district
                .map_or(true, |district| m.district == district || m.is_citywide())
        });

        let weights: Vec<f64> = pool
            .iter()
            .map(|m| self.candidate_weight(m, request.choice_pattern, request.enforce_variety))
            .collect();

        let index = weighted_index(&weights, rng);
        let chosen = pool[index];

        debug!(
            candidates = pool.len(),
            total_weight = weights.iter().sum::<f64>(),
            chosen = %chosen.id,
            "Selected moment"
        );

        self.record_shown(chosen.moment_type);
        Some(chosen)
    }

    /// Effective sampling weight of a single candidate.
    pub fn candidate_weight(
        &self,
        moment: &Moment,
        pattern: Option<ChoicePattern>,
        enforce_variety: bool,
    ) -> f64 {
        let mut weight = 1.0;

        if let Some(pattern) = pattern {
            weight *= self.config.affinity(moment.moment_type, pattern);
        }

        if enforce_variety && self.recent.contains(&moment.moment_type) {
            weight *= self.config.variety_penalty;
        }

        if pattern == Some(ChoicePattern::Efficiency)
            && moment.fragility >= self.config.fragile_threshold
        {
            weight *= self.config.fragile_boost;
        }

        weight
    }

    /// Types currently inside the variety window, oldest first.
    pub fn recent_types(&self) -> impl Iterator<Item = &MomentType> {
        self.recent.iter()
    }

    /// Forget recently shown types (called on act transitions).
    pub fn reset_recency(&mut self) {
        self.recent.clear();
    }

    fn record_shown(&mut self, moment_type: MomentType) {
        self.recent.push_back(moment_type);
        while self.recent.len() > self.config.variety_window {
            self.recent.pop_front();
        }
    }
}

/// Keep only matching candidates, unless that would leave nothing.
fn narrow<'a, F>(pool: Vec<&'a Moment>, keep: F) -> Vec<&'a Moment>
where
    F: Fn(&Moment) -> bool,
{
    let narrowed: Vec<&Moment> = pool.iter().copied().filter(|m| keep(*m)).collect();
    if narrowed.is_empty() {
        pool
    } else {
        narrowed
    }
}

/// Walk cumulative weights against a uniform draw in [0, total).
///
/// Falls back to a uniform pick when the weights sum to zero. `weights` must
/// be non-empty.
pub fn weighted_index(weights: &[f64], rng: &mut dyn RandomSource) -> usize {
    let total: f64 = weights.iter().sum();
    if total <= 0.0 || !total.is_finite() {
        return rng.next_index(weights.len());
    }

    let draw = rng.next_f64() * total;
    let mut cumulative = 0.0;
    for (index, weight) in weights.iter().enumerate() {
        cumulative += weight;
        if cumulative > draw {
            return index;
        }
    }

    // Rounding can leave the draw at the very top; take the last weighted entry.
    weights
        .iter()
        .rposition(|w| *w > 0.0)
        .unwrap_or(weights.len() - 1)
}
