//! Miscellaneous volume-related functions

/// Decompose a sequence of labels into its sorted distinct values and,
/// for every position, the index of its value among them.
pub fn unique_with_inverse<I>(labels: I) -> (Vec<u32>, Vec<u32>)
where
    I: IntoIterator<Item = u32>,
{
    let values: Vec<u32> = labels.into_iter().collect();
    let mut unique = values.clone();
    unique.sort_unstable();
    unique.dedup();

    let inverse = values
        .iter()
        // always found, the insertion point is never used
        .map(|v| unique.binary_search(v).unwrap_or_else(|i| i) as u32)
        .collect();
    (unique, inverse)
}

/// Reconstruct a sequence of values by indexing `table` with `inverse`.
pub fn gather(table: &[u32], inverse: &[u32]) -> Vec<u32> {
    inverse.iter().map(|&i| table[i as usize]).collect()
}
