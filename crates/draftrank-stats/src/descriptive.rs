/// Population statistics over a set of raw scores.
///
/// Raw scores arrive as `f32` (the scoring model's tensor type) but are
/// accumulated in `f64` so that a vector of identical values produces exactly
/// zero spread.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PopulationStats {
    /// Number of values in the population.
    pub count: usize,
    /// The minimum value in the population.
    pub min: f64,
    /// The maximum value in the population.
    pub max: f64,
    /// The arithmetic mean of the population.
    pub mean: f64,
    /// The population variance (N denominator).
    pub variance: f64,
    /// The population standard deviation.
    pub std_dev: f64,
}

impl PopulationStats {
    /// Computes population statistics from raw values.
    ///
    /// # Returns
    ///
    /// * `Some(PopulationStats)` - if the population contains at least one value
    /// * `None` - if the population is empty
    ///
    /// # Examples
    ///
    /// ```
    /// # use draftrank_stats::descriptive::PopulationStats;
    /// let stats = PopulationStats::new(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
    /// assert_eq!(stats.min, 1.0);
    /// assert_eq!(stats.max, 5.0);
    /// assert_eq!(stats.mean, 3.0);
    /// assert_eq!(stats.variance, 2.0);
    ///
    /// assert!(PopulationStats::new(&[]).is_none());
    /// ```
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn new(values: &[f32]) -> Option<Self> {
        let first = f64::from(*values.first()?);
        let (min, max, sum) = values.iter().map(|v| f64::from(*v)).fold(
            (first, first, 0.0),
            |(min, max, sum), v| (min.min(v), max.max(v), sum + v),
        );
        let n = values.len() as f64;
        let mean = sum / n;
        let variance = if min == max {
            0.0
        } else {
            values
                .iter()
                .map(|v| (f64::from(*v) - mean).powi(2))
                .sum::<f64>()
                / n
        };

        Some(Self {
            count: values.len(),
            min,
            max,
            mean,
            variance,
            std_dev: variance.sqrt(),
        })
    }

    /// Returns `true` if every value in the population is identical.
    ///
    /// This is checked on the range rather than on `std_dev`, because the mean of
    /// identical `f32` values is not always bit-identical to the values themselves.
    #[must_use]
    pub fn is_constant(&self) -> bool {
        self.min == self.max
    }

    /// Standard score of `value` relative to this population.
    ///
    /// Returns `0.0` for a constant population.
    #[must_use]
    pub fn z_score(&self, value: f64) -> f64 {
        if self.is_constant() || self.std_dev == 0.0 {
            return 0.0;
        }
        (value - self.mean) / self.std_dev
    }
}
