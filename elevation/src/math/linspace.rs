use num_traits::{AsPrimitive, Float};

/// Returns `n` evenly spaced values from `start` to `end`, both
/// included.
pub fn linspace<T>(start: T, end: T, n: usize) -> impl Iterator<Item = T>
where
    T: Float + 'static,
    usize: AsPrimitive<T>,
{
    let step = if n > 1 {
        (end - start) / (n - 1).as_()
    } else {
        T::zero()
    };
    (0..n).map(move |i| {
        if n > 1 && i == n - 1 {
            end
        } else {
            start + i.as_() * step
        }
    })
}

#[cfg(test)]
mod tests {
    use super::linspace;

    #[test]
    fn test_linspace() {
        let values: Vec<f64> = linspace(0.0, 1.0, 5).collect();
        assert_eq!(values, vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        let values: Vec<f64> = linspace(10.0, 0.0, 3).collect();
        assert_eq!(values, vec![10.0, 5.0, 0.0]);
        assert_eq!(linspace(3.0_f64, 9.0, 1).collect::<Vec<_>>(), vec![3.0]);
        assert_eq!(linspace(3.0_f64, 9.0, 0).count(), 0);
    }
}
