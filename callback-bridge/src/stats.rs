//! Summary statistics over real-valued samples
//!
//! All three functions return `0.0` for an empty slice.

/// Arithmetic mean of `values`
pub fn calculate_average(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Largest element of `values`
pub fn find_max(values: &[f64]) -> f64 {
    match values.split_first() {
        Some((&first, rest)) => rest.iter().fold(first, |max, &v| if v > max { v } else { max }),
        None => 0.0,
    }
}

/// Smallest element of `values`
pub fn find_min(values: &[f64]) -> f64 {
    match values.split_first() {
        Some((&first, rest)) => rest.iter().fold(first, |min, &v| if v < min { v } else { min }),
        None => 0.0,
    }
}
