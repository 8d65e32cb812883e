use anyhow::ensure;

use crate::logic::{OutagePlan, PlaythroughPlan, PlaythroughSummary};
use civics_game::GameView;

pub const ALL_SCENARIOS: [&str; 7] = [
    "smoke",
    "perfect-run",
    "struggling-learner",
    "wardrobe",
    "replay",
    "flaky-provider",
    "deterministic",
];

// Logic test scenario
#[derive(Debug, Clone)]
pub struct TestScenario {
    pub name: String,
    pub plan: PlaythroughPlan,
}

impl TestScenario {
    #[must_use]
    pub fn playthrough(name: impl Into<String>, plan: PlaythroughPlan) -> Self {
        Self {
            name: name.into(),
            plan,
        }
    }
}

fn reaches_certificate(plan: PlaythroughPlan) -> PlaythroughPlan {
    plan.with_expectation(|summary: &PlaythroughSummary| {
        ensure!(
            summary.final_state.current_view() == GameView::Certificate,
            "ended on {} instead of the certificate",
            summary.final_state.current_view()
        );
        ensure!(
            summary.certificate.score <= summary.certificate.total,
            "score {} above total {}",
            summary.certificate.score,
            summary.certificate.total
        );
        Ok(())
    })
}

fn smoke() -> TestScenario {
    TestScenario::playthrough("Smoke", reaches_certificate(PlaythroughPlan::new("Ada", 0.9)))
}

fn perfect_run() -> TestScenario {
    let plan = reaches_certificate(PlaythroughPlan::new("Grace", 1.0)).with_expectation(
        |summary: &PlaythroughSummary| {
            ensure!(
                summary.level_attempts.iter().all(|attempts| *attempts == 1),
                "needed retries: {:?}",
                summary.level_attempts
            );
            ensure!(
                summary.review_correct == summary.review_total,
                "review sorted {}/{}",
                summary.review_correct,
                summary.review_total
            );
            ensure!(
                summary.certificate.score == summary.certificate.total,
                "final quiz {}/{}",
                summary.certificate.score,
                summary.certificate.total
            );
            ensure!(
                summary.certificate.percent == 100,
                "certificate shows {}%",
                summary.certificate.percent
            );
            Ok(())
        },
    );
    TestScenario::playthrough("Perfect Run", plan)
}

fn struggling_learner() -> TestScenario {
    let plan = reaches_certificate(PlaythroughPlan::new("Sam", 0.45)).with_expectation(
        |summary: &PlaythroughSummary| {
            ensure!(
                summary.final_state.completed_levels().len() == summary.level_attempts.len(),
                "only {} of {} levels completed",
                summary.final_state.completed_levels().len(),
                summary.level_attempts.len()
            );
            ensure!(
                summary.final_state.earned_upgrades().len() == summary.level_attempts.len(),
                "one upgrade per completed level"
            );
            Ok(())
        },
    );
    TestScenario::playthrough("Struggling Learner", plan)
}

fn wardrobe() -> TestScenario {
    let plan = reaches_certificate(
        PlaythroughPlan::new("Ada", 1.0).with_wardrobe(&[
            "top_hat",
            "sunglasses",
            "grad_cap",
            "monocle",
            "bowtie",
            "bowtie",
        ]),
    )
    .with_expectation(|summary: &PlaythroughSummary| {
        ensure!(
            summary.certificate.equipped == ["Graduation Cap", "Fancy Monocle"],
            "equipped {:?}",
            summary.certificate.equipped
        );
        Ok(())
    });
    TestScenario::playthrough("Wardrobe", plan)
}

fn replay() -> TestScenario {
    let plan = reaches_certificate(PlaythroughPlan::new("Lin", 0.8).with_replay())
        .with_expectation(|summary: &PlaythroughSummary| {
            let Some(state) = summary.replay_state.as_ref() else {
                anyhow::bail!("replay never ran");
            };
            ensure!(
                state.current_view() == GameView::GameScreen,
                "replay landed on {}",
                state.current_view()
            );
            ensure!(state.player_name() == "Lin", "name lost on replay");
            ensure!(
                state.completed_levels().is_empty() && state.earned_upgrades().is_empty(),
                "progress survived replay"
            );
            ensure!(state.score() == 0, "score survived replay");
            Ok(())
        });
    TestScenario::playthrough("Replay", plan)
}

fn flaky_provider() -> TestScenario {
    let outages = OutagePlan {
        level: 3,
        final_quiz: 2,
        review: 1,
    };
    let plan = reaches_certificate(PlaythroughPlan::new("Ada", 0.9).with_outages(outages))
        .with_expectation(move |summary: &PlaythroughSummary| {
            ensure!(
                summary.fetch_failures == outages.total(),
                "saw {} failed fetches, scheduled {}",
                summary.fetch_failures,
                outages.total()
            );
            Ok(())
        });
    TestScenario::playthrough("Flaky Provider", plan)
}

fn deterministic() -> TestScenario {
    let plan = reaches_certificate(PlaythroughPlan::new("Ada", 0.6).with_determinism_check());
    TestScenario::playthrough("Deterministic", plan)
}

pub fn get_scenario(name: &str) -> Option<TestScenario> {
    match name.to_lowercase().as_str() {
        "smoke" => Some(smoke()),
        "perfect-run" => Some(perfect_run()),
        "struggling-learner" => Some(struggling_learner()),
        "wardrobe" => Some(wardrobe()),
        "replay" => Some(replay()),
        "flaky-provider" => Some(flaky_provider()),
        "deterministic" => Some(deterministic()),
        _ => None,
    }
}

pub fn list_scenarios() -> Vec<(&'static str, &'static str)> {
    vec![
        ("smoke", "Mostly-correct learner reaches the certificate"),
        (
            "perfect-run",
            "Every quiz and review answered correctly on the first try",
        ),
        (
            "struggling-learner",
            "Low-accuracy learner retries level quizzes until done",
        ),
        ("wardrobe", "Slot exclusivity while equipping upgrades"),
        ("replay", "Play again resets progress but keeps the name"),
        (
            "flaky-provider",
            "Content fetches fail and are retried without losing progress",
        ),
        (
            "deterministic",
            "Same seed produces the same playthrough digest",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_listed_scenario_resolves() {
        let listed: Vec<&str> = list_scenarios().into_iter().map(|(key, _)| key).collect();
        assert_eq!(listed, ALL_SCENARIOS);
        for key in ALL_SCENARIOS {
            assert!(get_scenario(key).is_some(), "{key}");
        }
    }

    #[test]
    fn lookup_ignores_case() {
        let scenario = get_scenario("Perfect-Run").unwrap();
        assert_eq!(scenario.name, "Perfect Run");
        assert_eq!(scenario.plan.expectations.len(), 2);
        assert!(get_scenario("unknown").is_none());
    }

    #[test]
    fn deterministic_scenario_requests_a_rerun() {
        assert!(get_scenario("deterministic").unwrap().plan.verify_determinism);
        assert!(!get_scenario("smoke").unwrap().plan.verify_determinism);
    }
}
