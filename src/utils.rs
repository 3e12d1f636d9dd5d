//! This module provides a set of shared, low-level utility functions used
//! throughout the munging core.
//!
//! The helpers are parametric over an equality/ordering capability (or over
//! `num_traits::Float` for the numeric reductions) instead of being written once
//! per element type.

use num_traits::Float;

//==================================================================================
// 1. Collection Helpers
//==================================================================================

/// Returns `true` if `value` is present in `list`.
pub fn in_list<T: PartialEq>(value: &T, list: &[T]) -> bool {
    list.iter().any(|item| item == value)
}

/// Counts how many times `value` occurs in `items`.
pub fn count_occurrences<'a, T, I>(value: &T, items: I) -> usize
where
    T: PartialEq + 'a,
    I: IntoIterator<Item = &'a T>,
{
    items.into_iter().filter(|item| *item == value).count()
}

/// Sorts `values` and removes repeated entries in place.
pub fn sort_dedup<T: Ord>(values: &mut Vec<T>) {
    values.sort_unstable();
    values.dedup();
}

//==================================================================================
// 2. Numeric Reductions
//==================================================================================

/// Maximum over the non-NaN values of an iterator, or `None` if there are none.
pub fn max_of<F, I>(values: I) -> Option<F>
where
    F: Float,
    I: IntoIterator<Item = F>,
{
    values
        .into_iter()
        .filter(|v| !v.is_nan())
        .fold(None, |acc, v| match acc {
            Some(m) if m >= v => Some(m),
            _ => Some(v),
        })
}

/// Arithmetic mean of an iterator, or `None` if it is empty.
pub fn mean_of<F, I>(values: I) -> Option<F>
where
    F: Float,
    I: IntoIterator<Item = F>,
{
    let (sum, count) = values
        .into_iter()
        .fold((F::zero(), 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        return None;
    }
    F::from(count).map(|n| sum / n)
}

//==================================================================================
// 3. Unit Tests
//==================================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_list_and_count_over_strings() {
        let names = vec!["SNP".to_string(), "P".to_string(), "SNP".to_string()];
        assert!(in_list(&"P".to_string(), &names));
        assert!(!in_list(&"N".to_string(), &names));
        assert_eq!(count_occurrences(&"SNP".to_string(), &names), 2);
    }

    #[test]
    fn test_sort_dedup_indices() {
        let mut drops = vec![7usize, 2, 7, 0, 2];
        sort_dedup(&mut drops);
        assert_eq!(drops, vec![0, 2, 7]);
    }

    #[test]
    fn test_max_of_skips_nan_and_handles_empty() {
        assert_eq!(max_of(vec![1.0f64, f64::NAN, 3.5, 2.0]), Some(3.5));
        assert_eq!(max_of(Vec::<f64>::new()), None);
    }

    #[test]
    fn test_mean_of() {
        assert_eq!(mean_of(vec![50.0f64, 100.0]), Some(75.0));
        assert_eq!(mean_of(Vec::<f32>::new()), None);
    }
}
