//! Adaptive operator selector (spec §4.H): roulette-wheel selection over a
//! pool of named operators whose weights adapt to observed performance.
//!
//! Grounded on the teacher's `solver::tabu_search::diversification` (a
//! small weighted-choice policy among move strategies), generalized from a
//! fixed two-way choice to an arbitrary-sized, named, scored pool.

use rand::Rng;
use rand_chacha::ChaCha8Rng;

/// One operator's adaptive bookkeeping. `func` is a plain function value —
/// the spec calls for a name→function table, not a trait hierarchy.
pub struct Operator<F> {
    pub name: &'static str,
    pub func: F,
    pub weight: f64,
    score: f64,
    times_used: u32,
}

impl<F> Operator<F> {
    pub fn new(name: &'static str, func: F) -> Self {
        Operator {
            name,
            func,
            weight: 1.0,
            score: 0.0,
            times_used: 0,
        }
    }
}

/// A pool of same-signature operators with roulette-wheel selection and
/// periodic adaptive weight updates (spec §4.H).
pub struct OperatorPool<F> {
    operators: Vec<Operator<F>>,
}

impl<F> OperatorPool<F> {
    pub fn new(operators: Vec<Operator<F>>) -> Self {
        OperatorPool { operators }
    }

    /// Draws `x` in `[0, sum_of_weights)` and returns the first operator
    /// whose running weight sum exceeds it.
    pub fn select(&mut self, rng: &mut ChaCha8Rng) -> usize {
        let total: f64 = self.operators.iter().map(|o| o.weight).sum();
        let x = rng.gen::<f64>() * total;
        let mut running = 0.0;
        let mut chosen = self.operators.len() - 1;
        for (idx, op) in self.operators.iter().enumerate() {
            running += op.weight;
            if running > x {
                chosen = idx;
                break;
            }
        }
        self.operators[chosen].times_used += 1;
        chosen
    }

    pub fn get(&self, idx: usize) -> &Operator<F> {
        &self.operators[idx]
    }

    /// Awards `sigma` to the operator at `idx` (spec §4.H scoring).
    pub fn reward(&mut self, idx: usize, sigma: f64) {
        self.operators[idx].score += sigma;
    }

    /// Applied every `SEGMENT_LENGTH` iterations (spec §4.H weight update):
    /// `w <- (1-rho)*w + rho*(score/times_used)` for operators used this
    /// segment; unused operators keep their weight unchanged.
    pub fn update_weights(&mut self, reaction_factor: f64) {
        for op in &mut self.operators {
            if op.times_used > 0 {
                let avg_score = op.score / op.times_used as f64;
                op.weight = (1.0 - reaction_factor) * op.weight + reaction_factor * avg_score;
                op.score = 0.0;
                op.times_used = 0;
            }
        }
    }

    pub fn weights(&self) -> Vec<(&'static str, f64)> {
        self.operators.iter().map(|o| (o.name, o.weight)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn operator_earning_score_gains_weight_relative_to_idle_one() {
        let mut pool = OperatorPool::new(vec![
            Operator::new("a", ()),
            Operator::new("b", ()),
        ]);
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let idx = pool.select(&mut rng);
        pool.reward(idx, 9.0);
        pool.update_weights(0.1);
        let weights = pool.weights();
        let (_, wa) = weights[idx];
        let (_, wb) = weights[1 - idx];
        assert!(wa > wb);
    }
}
