//! GA configuration.
//!
//! [`GaConfig`] holds all parameters that control the NSGA-II loop.

/// Configuration for the NSGA-II search.
///
/// # Defaults
///
/// ```
/// use u_mdpdp::ga::GaConfig;
///
/// let config = GaConfig::default();
/// assert_eq!(config.population_size, 30);
/// assert_eq!(config.max_generations, 10);
/// ```
///
/// # Builder Pattern
///
/// ```
/// use u_mdpdp::ga::GaConfig;
///
/// let config = GaConfig::default()
///     .with_population_size(60)
///     .with_max_generations(40)
///     .with_mutation_rate(0.5)
///     .with_seed(7);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GaConfig {
    /// Number of individuals kept by survival selection.
    pub population_size: usize,

    /// Number of generations after the initial one.
    pub max_generations: usize,

    /// Fraction of the offspring produced by crossover (0.0–1.0). The rest
    /// are clones of selected parents.
    pub crossover_rate: f64,

    /// Fraction of the offspring pool that is mutated (0.0–1.0).
    pub mutation_rate: f64,

    /// Attempts per construction, crossover, or mutation before giving up.
    pub max_retries: usize,

    /// Share of the initial population seeded by random-depot assignment
    /// with best-insertion routes.
    pub insertion_share: f64,

    /// Share of the initial population seeded by random-depot assignment
    /// with greedy-next routes. The remainder uses nearest-depot seeding.
    pub greedy_share: f64,

    /// Whether to seed and mutate individuals in parallel using rayon.
    pub parallel: bool,

    /// Random seed for reproducibility.
    ///
    /// `None` uses a random seed.
    pub seed: Option<u64>,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            population_size: 30,
            max_generations: 10,
            crossover_rate: 0.7,
            mutation_rate: 0.3,
            max_retries: 50,
            insertion_share: 0.2,
            greedy_share: 0.3,
            parallel: true,
            seed: None,
        }
    }
}

impl GaConfig {
    /// Sets the population size.
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    /// Sets the number of generations.
    pub fn with_max_generations(mut self, n: usize) -> Self {
        self.max_generations = n;
        self
    }

    /// Sets the crossover rate.
    pub fn with_crossover_rate(mut self, rate: f64) -> Self {
        self.crossover_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Sets the mutation rate.
    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Sets the retry budget.
    pub fn with_max_retries(mut self, n: usize) -> Self {
        self.max_retries = n;
        self
    }

    /// Sets the initial-population strategy split.
    pub fn with_seeding_shares(mut self, insertion: f64, greedy: f64) -> Self {
        self.insertion_share = insertion.clamp(0.0, 1.0);
        self.greedy_share = greedy.clamp(0.0, 1.0);
        self
    }

    /// Enables or disables parallel seeding and mutation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Sets the random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validates the configuration.
    ///
    /// Returns `Err` with a description if any parameter is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.population_size < 2 {
            return Err("population_size must be at least 2".into());
        }
        if self.max_retries == 0 {
            return Err("max_retries must be at least 1".into());
        }
        for (name, rate) in [
            ("crossover_rate", self.crossover_rate),
            ("mutation_rate", self.mutation_rate),
            ("insertion_share", self.insertion_share),
            ("greedy_share", self.greedy_share),
        ] {
            if !(0.0..=1.0).contains(&rate) {
                return Err(format!("{name} must be within [0, 1]"));
            }
        }
        if self.insertion_share + self.greedy_share > 1.0 {
            return Err("insertion_share + greedy_share must not exceed 1".into());
        }
        Ok(())
    }
}
