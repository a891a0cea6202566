//! Absorbing-chain conversion probability.

use std::collections::BTreeMap;

use super::transitions::{ChainState, TransitionCounts};
use crate::domain::foundation::ComputationError;

const PIVOT_EPSILON: f64 = 1e-12;

/// Transient-state view of the chain with one channel optionally removed.
#[derive(Debug, Clone, PartialEq)]
pub struct AbsorbingChain {
    states: Vec<ChainState>,
    /// Transient-to-transient probabilities, row-major.
    q: Vec<Vec<f64>>,
    /// Direct probability of reaching `conversion` from each transient state.
    r: Vec<f64>,
}

impl AbsorbingChain {
    /// Builds Q and the conversion vector, excluding `excluded` if given.
    ///
    /// Rows are normalized over each state's full outgoing count, so
    /// transitions into the removed channel (and into `null`) simply drop out
    /// of both Q and the conversion vector.
    pub fn build(counts: &TransitionCounts, excluded: Option<&str>) -> Self {
        let mut states = vec![ChainState::Start];
        states.extend(
            counts
                .channels()
                .iter()
                .filter(|c| Some(c.as_str()) != excluded)
                .map(|c| ChainState::Channel(c.clone())),
        );
        let index: BTreeMap<&ChainState, usize> =
            states.iter().enumerate().map(|(i, s)| (s, i)).collect();

        let n = states.len();
        let mut q = vec![vec![0.0; n]; n];
        let mut r = vec![0.0; n];

        for (row, state) in states.iter().enumerate() {
            let total = counts.outgoing_total(state);
            if total == 0 {
                continue;
            }
            let total = total as f64;
            for (to, count) in counts.transitions_from(state) {
                let p = count as f64 / total;
                if *to == ChainState::Conversion {
                    r[row] += p;
                } else if let Some(&col) = index.get(to) {
                    q[row][col] += p;
                }
            }
        }

        Self { states, q, r }
    }

    /// Number of transient states, `start` included.
    pub fn size(&self) -> usize {
        self.states.len()
    }

    /// Probability of absorbing in `conversion` when starting at `start`.
    ///
    /// Equivalent to `N[start, :] · r` with fundamental matrix
    /// `N = (I - Q)^-1`; computed by solving `(I - Q) x = r` directly.
    ///
    /// # Errors
    ///
    /// Returns `ComputationError::SingularMatrix` when `I - Q` has no
    /// inverse and `NonFiniteValue` if the solve overflows.
    pub fn conversion_probability(&self) -> Result<f64, ComputationError> {
        let n = self.size();
        let mut a: Vec<Vec<f64>> = (0..n)
            .map(|i| {
                (0..n)
                    .map(|j| {
                        let identity = if i == j { 1.0 } else { 0.0 };
                        identity - self.q[i][j]
                    })
                    .collect()
            })
            .collect();
        let x = solve_linear_system(&mut a, self.r.clone())?;

        let start = x[0];
        if !start.is_finite() {
            return Err(ComputationError::NonFiniteValue);
        }
        Ok(start.clamp(0.0, 1.0))
    }
}

/// Gaussian elimination with partial pivoting. Consumes `a` and `b`.
fn solve_linear_system(a: &mut [Vec<f64>], mut b: Vec<f64>) -> Result<Vec<f64>, ComputationError> {
    let n = b.len();

    for col in 0..n {
        let pivot = (col..n)
            .max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))
            .unwrap_or(col);
        if a[pivot][col].abs() < PIVOT_EPSILON {
            return Err(ComputationError::SingularMatrix { size: n });
        }
        a.swap(col, pivot);
        b.swap(col, pivot);

        for row in (col + 1)..n {
            let factor = a[row][col] / a[col][col];
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let tail: f64 = ((row + 1)..n).map(|k| a[row][k] * x[k]).sum();
        x[row] = (b[row] - tail) / a[row][row];
    }
    Ok(x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::journey::Journey;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{} != {}", a, b);
    }

    #[test]
    fn solves_small_system() {
        let mut a = vec![vec![2.0, 1.0], vec![1.0, 3.0]];
        let x = solve_linear_system(&mut a, vec![3.0, 5.0]).unwrap();
        assert_close(x[0], 0.8);
        assert_close(x[1], 1.4);
    }

    #[test]
    fn detects_singular_matrix() {
        let mut a = vec![vec![1.0, 2.0], vec![2.0, 4.0]];
        let err = solve_linear_system(&mut a, vec![1.0, 2.0]).unwrap_err();
        assert_eq!(err, ComputationError::SingularMatrix { size: 2 });
    }

    #[test]
    fn single_converting_path_has_probability_one() {
        let journeys = vec![Journey::from_channels("c1", &["A", "B"], 10.0, true)];
        let counts = TransitionCounts::from_journeys(&journeys);
        let chain = AbsorbingChain::build(&counts, None);

        assert_eq!(chain.size(), 3);
        assert_close(chain.conversion_probability().unwrap(), 1.0);
    }

    #[test]
    fn half_converting_population() {
        let journeys = vec![
            Journey::from_channels("c1", &["A"], 10.0, true),
            Journey::from_channels("c2", &["A"], 0.0, false),
        ];
        let counts = TransitionCounts::from_journeys(&journeys);
        let chain = AbsorbingChain::build(&counts, None);
        assert_close(chain.conversion_probability().unwrap(), 0.5);
    }

    #[test]
    fn removing_the_only_channel_drops_probability_to_zero() {
        let journeys = vec![Journey::from_channels("c1", &["A"], 10.0, true)];
        let counts = TransitionCounts::from_journeys(&journeys);
        let chain = AbsorbingChain::build(&counts, Some("A"));

        assert_eq!(chain.size(), 1);
        assert_close(chain.conversion_probability().unwrap(), 0.0);
    }

    #[test]
    fn loops_are_resolved_through_the_fundamental_matrix() {
        // A -> A self-loop then conversion: start->A (1), A->A (1), A->conv (1)
        let journeys = vec![Journey::from_channels("c1", &["A", "A"], 10.0, true)];
        let counts = TransitionCounts::from_journeys(&journeys);
        let chain = AbsorbingChain::build(&counts, None);
        assert_close(chain.conversion_probability().unwrap(), 1.0);
    }

    #[test]
    fn removal_redirects_to_null() {
        // start->A (2), A->B (1), A->conv (1), B->conv (1)
        let journeys = vec![
            Journey::from_channels("c1", &["A", "B"], 10.0, true),
            Journey::from_channels("c2", &["A"], 10.0, true),
        ];
        let counts = TransitionCounts::from_journeys(&journeys);

        let without_b = AbsorbingChain::build(&counts, Some("B"));
        assert_close(without_b.conversion_probability().unwrap(), 0.5);
    }
}
