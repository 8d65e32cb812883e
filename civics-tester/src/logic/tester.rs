use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use crate::logic::learner::{PlaythroughPlan, PlaythroughRunner, PlaythroughSummary};
use crate::scenario::TestScenario;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub scenario_name: String,
    pub seed: u64,
    pub passed: bool,
    pub iterations_run: usize,
    pub successful_iterations: usize,
    pub failures: Vec<String>,
    /// Mean quiz attempts per level across successful iterations.
    pub average_level_attempts: f64,
    #[serde(with = "duration_serde")]
    pub average_duration: Duration,
    #[serde(with = "duration_vec_serde")]
    pub performance_data: Vec<Duration>,
}

pub struct LogicTester {
    runner: PlaythroughRunner,
    verbose: bool,
}

impl LogicTester {
    #[must_use]
    pub fn new(verbose: bool) -> Self {
        Self {
            runner: PlaythroughRunner::new(verbose),
            verbose,
        }
    }

    pub async fn run_scenario(
        &self,
        scenario: &TestScenario,
        seeds: &[u64],
        iterations: usize,
    ) -> Vec<ScenarioResult> {
        let mut results = Vec::with_capacity(seeds.len());
        for &seed in seeds {
            if self.verbose {
                println!(
                    "🧪 Testing scenario: {} (accuracy: {:.2} seed: {})",
                    scenario.name.bright_white(),
                    scenario.plan.accuracy,
                    seed
                );
            }
            results.push(self.run_single_scenario(scenario, seed, iterations).await);
        }
        results
    }

    async fn run_single_scenario(
        &self,
        scenario: &TestScenario,
        seed: u64,
        iterations: usize,
    ) -> ScenarioResult {
        let mut successes = 0;
        let mut failures = Vec::new();
        let mut performance_data = Vec::new();
        let mut attempts_total = 0_u32;
        let mut levels_total = 0_usize;

        for i in 0..iterations {
            let start_time = Instant::now();
            let iteration_seed = seed.wrapping_add(u64::try_from(i).unwrap_or(u64::MAX));

            match self.run_iteration(&scenario.plan, iteration_seed).await {
                Ok(summary) => {
                    successes += 1;
                    let duration = start_time.elapsed();
                    performance_data.push(duration);
                    attempts_total += summary.level_attempts.iter().sum::<u32>();
                    levels_total += summary.level_attempts.len();
                    if self.verbose {
                        println!(
                            "  ✅ Iteration {}/{} passed ({duration:?}) score:{}/{} attempts:{:?} digest:{:016x}",
                            i + 1,
                            iterations,
                            summary.certificate.score,
                            summary.certificate.total,
                            summary.level_attempts,
                            summary.digest
                        );
                    }
                }
                Err(err) => {
                    let message = format!("Iteration {} (seed {iteration_seed}): {err:#}", i + 1);
                    if self.verbose {
                        println!(
                            "  ❌ Iteration {}/{} failed: {}",
                            i + 1,
                            iterations,
                            format!("{err:#}").red()
                        );
                    }
                    log::warn!("{} {message}", scenario.name);
                    failures.push(message);
                }
            }
        }

        #[allow(clippy::cast_precision_loss)]
        let average_level_attempts = if levels_total == 0 {
            0.0
        } else {
            f64::from(attempts_total) / levels_total as f64
        };

        ScenarioResult {
            scenario_name: scenario.name.clone(),
            seed,
            passed: failures.is_empty(),
            iterations_run: iterations,
            successful_iterations: successes,
            failures,
            average_level_attempts,
            average_duration: average(&performance_data),
            performance_data,
        }
    }

    async fn run_iteration(
        &self,
        plan: &PlaythroughPlan,
        seed: u64,
    ) -> anyhow::Result<PlaythroughSummary> {
        let summary = self.runner.run(plan, seed).await?;
        if plan.verify_determinism {
            let rerun = self.runner.run(plan, seed).await?;
            anyhow::ensure!(
                rerun.digest == summary.digest,
                "digest {:016x} changed to {:016x} on rerun",
                summary.digest,
                rerun.digest
            );
        }
        for expectation in &plan.expectations {
            expectation.check(&summary)?;
        }
        Ok(summary)
    }
}

fn average(durations: &[Duration]) -> Duration {
    if durations.is_empty() {
        return Duration::ZERO;
    }
    durations.iter().sum::<Duration>() / u32::try_from(durations.len()).unwrap_or(u32::MAX)
}

mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_millis().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u128::deserialize(deserializer)?;
        Ok(Duration::from_millis(u64::try_from(millis).unwrap_or(0)))
    }
}

mod duration_vec_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(durations: &[Duration], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let millis: Vec<u128> = durations.iter().map(Duration::as_millis).collect();
        millis.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = Vec::<u128>::deserialize(deserializer)?;
        Ok(millis
            .into_iter()
            .map(|m| Duration::from_millis(u64::try_from(m).unwrap_or(0)))
            .collect())
    }
}
