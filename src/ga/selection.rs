//! Tournament selection.
//!
//! Each tournament samples `tournament_size` distinct individuals without
//! replacement and keeps the fittest. Tournaments are independent, so the
//! same individual can win several of them.
//!
//! # References
//!
//! - Blickle & Thiele (1996), "A Comparison of Selection Schemes used in
//!   Evolutionary Algorithms"

use super::types::{FitnessScore, Route};
use crate::error::{GaError, Result};
use rand::seq::index;
use rand::Rng;

/// Runs `num_tournaments` tournaments and returns the winners' indices.
///
/// # Errors
///
/// [`GaError::InvalidParameter`] if `tournament_size` is zero or exceeds the
/// population, or if `scores` does not match `population_len`.
pub fn tournament_indices<R: Rng + ?Sized>(
    population_len: usize,
    scores: &[FitnessScore],
    num_tournaments: usize,
    tournament_size: usize,
    rng: &mut R,
) -> Result<Vec<usize>> {
    if scores.len() != population_len {
        return Err(GaError::InvalidParameter(format!(
            "{} scores for a population of {population_len}",
            scores.len()
        )));
    }
    if tournament_size == 0 || tournament_size > population_len {
        return Err(GaError::InvalidParameter(format!(
            "tournament_size {tournament_size} must be in 1..={population_len}"
        )));
    }

    let winners = (0..num_tournaments)
        .map(|_| {
            index::sample(&mut *rng, population_len, tournament_size)
                .into_iter()
                .fold(None, |best: Option<usize>, idx| match best {
                    Some(b) if scores[b] >= scores[idx] => Some(b),
                    _ => Some(idx),
                })
                .unwrap_or(0)
        })
        .collect();
    Ok(winners)
}

/// Runs `num_tournaments` tournaments and returns copies of the winners.
///
/// # Examples
///
/// ```
/// use u_genroute::ga::{selection::tournament_select, Route};
/// use u_genroute::random::create_rng;
///
/// let pop = vec![
///     Route::new(vec![0, 1, 2]).unwrap(),
///     Route::new(vec![0, 2, 1]).unwrap(),
/// ];
/// let mut rng = create_rng(42);
/// // A tournament over the whole population always picks the best.
/// let winners = tournament_select(&pop, &[-10.0, -3.0], 4, 2, &mut rng).unwrap();
/// assert!(winners.iter().all(|r| r == &pop[1]));
/// ```
pub fn tournament_select<R: Rng + ?Sized>(
    population: &[Route],
    scores: &[FitnessScore],
    num_tournaments: usize,
    tournament_size: usize,
    rng: &mut R,
) -> Result<Vec<Route>> {
    let winners = tournament_indices(
        population.len(),
        scores,
        num_tournaments,
        tournament_size,
        rng,
    )?;
    Ok(winners.into_iter().map(|i| population[i].clone()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::create_rng;

    #[test]
    fn test_returns_requested_count() {
        let mut rng = create_rng(42);
        let scores = [-4.0, -3.0, -2.0, -1.0, -5.0];
        let winners = tournament_indices(5, &scores, 7, 2, &mut rng).expect("ok");
        assert_eq!(winners.len(), 7);
        assert!(winners.iter().all(|&i| i < 5));
    }

    #[test]
    fn test_full_tournament_always_picks_best() {
        let mut rng = create_rng(1);
        let scores = [-10.0, -5.0, -1.0, -8.0];
        let winners = tournament_indices(4, &scores, 100, 4, &mut rng).expect("ok");
        assert!(winners.iter().all(|&i| i == 2));
    }

    #[test]
    fn test_worst_never_wins_size_two() {
        // Sampling without replacement: the worst individual always faces
        // someone better when k = 2.
        let mut rng = create_rng(9);
        let scores = [-1.0, -2.0, -3.0, -100.0];
        let winners = tournament_indices(4, &scores, 1000, 2, &mut rng).expect("ok");
        assert!(winners.iter().all(|&i| i != 3));
    }

    #[test]
    fn test_size_one_is_uniform() {
        let mut rng = create_rng(42);
        let scores = [-10.0, -5.0, -1.0, -8.0];
        let mut counts = [0u32; 4];
        for i in tournament_indices(4, &scores, 10_000, 1, &mut rng).expect("ok") {
            counts[i] += 1;
        }
        for &c in &counts {
            assert!(c > 2000, "expected roughly uniform, got {counts:?}");
        }
    }

    #[test]
    fn test_tournament_too_large() {
        let mut rng = create_rng(42);
        let err = tournament_indices(3, &[-1.0, -2.0, -3.0], 2, 4, &mut rng).unwrap_err();
        assert!(matches!(err, GaError::InvalidParameter(_)));
    }

    #[test]
    fn test_zero_tournament_size() {
        let mut rng = create_rng(42);
        assert!(tournament_indices(3, &[-1.0, -2.0, -3.0], 2, 0, &mut rng).is_err());
    }

    #[test]
    fn test_score_length_mismatch() {
        let mut rng = create_rng(42);
        assert!(tournament_indices(3, &[-1.0], 2, 1, &mut rng).is_err());
    }

    #[test]
    fn test_select_clones_routes() {
        let mut rng = create_rng(3);
        let pop = vec![
            Route::new(vec![0, 1, 2, 3]).expect("valid"),
            Route::new(vec![0, 3, 2, 1]).expect("valid"),
            Route::new(vec![0, 2, 3, 1]).expect("valid"),
        ];
        let selected = tournament_select(&pop, &[-9.0, -7.0, -8.0], 5, 3, &mut rng).expect("ok");
        assert_eq!(selected.len(), 5);
        assert!(selected.iter().all(|r| r == &pop[1]));
    }
}
