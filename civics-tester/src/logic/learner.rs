use anyhow::{Context, Result, bail, ensure};
use colored::Colorize;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde::Serialize;
use std::hash::Hasher;
use std::sync::Arc;
use twox_hash::XxHash64;

use civics_game::{
    Bucket, CertificateSummary, Chamber, ContentKind, ContentPack, Delivery,
    FetchRequest, FinalQuizProgress, FixtureContentProvider, GameController, GameState,
    LevelQuizProgress, QuizRules, UpgradeId, default_engine,
};

/// Guard against a learner that can never pass.
const MAX_QUIZ_ATTEMPTS: u32 = 50;
const MAX_FETCH_ATTEMPTS: u32 = 10;

/// Scheduled provider outages for one playthrough.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OutagePlan {
    pub level: u32,
    pub final_quiz: u32,
    pub review: u32,
}

impl OutagePlan {
    #[must_use]
    pub const fn total(self) -> u32 {
        self.level + self.final_quiz + self.review
    }
}

/// How a simulated learner plays one game.
#[derive(Debug, Clone)]
pub struct PlaythroughPlan {
    pub player_name: String,
    /// Probability of choosing the right answer or bucket.
    pub accuracy: f64,
    pub outages: OutagePlan,
    /// Upgrades to toggle, in order, before the review.
    pub wardrobe: Vec<UpgradeId>,
    pub replay: bool,
    pub verify_determinism: bool,
    pub expectations: Vec<PlaythroughExpectation>,
}

impl PlaythroughPlan {
    #[must_use]
    pub fn new(player_name: impl Into<String>, accuracy: f64) -> Self {
        Self {
            player_name: player_name.into(),
            accuracy: accuracy.clamp(0.0, 1.0),
            outages: OutagePlan::default(),
            wardrobe: Vec::new(),
            replay: false,
            verify_determinism: false,
            expectations: Vec::new(),
        }
    }

    #[must_use]
    pub const fn with_outages(mut self, outages: OutagePlan) -> Self {
        self.outages = outages;
        self
    }

    #[must_use]
    pub fn with_wardrobe(mut self, upgrades: &[&str]) -> Self {
        self.wardrobe = upgrades.iter().copied().map(UpgradeId::from).collect();
        self
    }

    #[must_use]
    pub const fn with_replay(mut self) -> Self {
        self.replay = true;
        self
    }

    #[must_use]
    pub const fn with_determinism_check(mut self) -> Self {
        self.verify_determinism = true;
        self
    }

    #[must_use]
    pub fn with_expectation<F>(mut self, expectation: F) -> Self
    where
        F: Fn(&PlaythroughSummary) -> Result<()> + Send + Sync + 'static,
    {
        self.expectations.push(PlaythroughExpectation::new(expectation));
        self
    }
}

type PlaythroughExpectationFn =
    Arc<dyn Fn(&PlaythroughSummary) -> Result<()> + Send + Sync + 'static>;

/// Assertion hook run after a playthrough completes.
#[derive(Clone)]
pub struct PlaythroughExpectation(PlaythroughExpectationFn);

impl std::fmt::Debug for PlaythroughExpectation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaythroughExpectation").finish()
    }
}

impl PlaythroughExpectation {
    #[must_use]
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&PlaythroughSummary) -> Result<()> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// # Errors
    ///
    /// Whatever the wrapped check reports.
    pub fn check(&self, summary: &PlaythroughSummary) -> Result<()> {
        (self.0)(summary)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PlaythroughSummary {
    pub seed: u64,
    /// Quiz attempts needed per level, in catalog order.
    pub level_attempts: Vec<u32>,
    pub fetch_failures: u32,
    pub review_correct: usize,
    pub review_total: usize,
    pub certificate: CertificateSummary,
    /// State after the certificate, before any replay.
    pub final_state: GameState,
    pub replay_state: Option<GameState>,
    pub digest: u64,
}

/// A learner that answers correctly with a fixed probability.
pub struct SimulatedLearner {
    rng: ChaCha20Rng,
    accuracy: f64,
    verbose: bool,
}

impl SimulatedLearner {
    #[must_use]
    pub fn new(seed: u64, accuracy: f64, verbose: bool) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
            accuracy,
            verbose,
        }
    }

    fn knows_it(&mut self) -> bool {
        self.rng.gen_bool(self.accuracy)
    }

    /// Pick the correct option, or with `1 - accuracy` a different one.
    pub fn choose(&mut self, options: &[String], correct: &str) -> String {
        let wrong: Vec<&String> = options.iter().filter(|o| *o != correct).collect();
        let answerable = options.iter().any(|o| o == correct);
        if answerable && (wrong.is_empty() || self.knows_it()) {
            return correct.to_string();
        }
        if wrong.is_empty() {
            return options.first().cloned().unwrap_or_default();
        }
        wrong[self.rng.gen_range(0..wrong.len())].clone()
    }

    pub fn place(&mut self, chamber: Chamber) -> Bucket {
        if self.knows_it() {
            return Bucket::from(chamber);
        }
        let others: Vec<Chamber> = Chamber::ALL.into_iter().filter(|c| *c != chamber).collect();
        Bucket::from(others[self.rng.gen_range(0..others.len())])
    }

    fn note(&self, message: impl AsRef<str>) {
        if self.verbose {
            println!("     {}", message.as_ref().dimmed());
        }
    }
}

/// Drives one full game through the controller against the offline provider.
pub struct PlaythroughRunner {
    pack: ContentPack,
    rules: QuizRules,
    verbose: bool,
}

impl PlaythroughRunner {
    #[must_use]
    pub fn new(verbose: bool) -> Self {
        Self {
            pack: ContentPack::load_from_static(),
            rules: QuizRules::load_from_static(),
            verbose,
        }
    }

    /// # Errors
    ///
    /// Any controller rejection or a learner stuck beyond the attempt limits.
    pub async fn run(&self, plan: &PlaythroughPlan, seed: u64) -> Result<PlaythroughSummary> {
        let provider = FixtureContentProvider::new(self.pack.clone(), self.rules);
        provider.fail_next(ContentKind::Level, plan.outages.level);
        provider.fail_next(ContentKind::FinalQuiz, plan.outages.final_quiz);
        provider.fail_next(ContentKind::Review, plan.outages.review);

        let mut learner = SimulatedLearner::new(seed, plan.accuracy, self.verbose);
        let mut game = GameController::new(default_engine());
        let mut fetch_failures = 0;

        game.submit_name(&plan.player_name)?;

        let levels: Vec<_> = game.engine().catalog().level_ids().collect();
        let mut level_attempts = Vec::with_capacity(levels.len());
        for level in levels {
            let request = game.start_level(level)?;
            fetch_failures += load(&mut game, &provider, request).await?;
            let attempts = play_level(&mut game, &mut learner)
                .await
                .with_context(|| format!("level {level}"))?;
            learner.note(format!("level {level} passed after {attempts} attempt(s)"));
            level_attempts.push(attempts);
        }

        for upgrade in &plan.wardrobe {
            game.toggle_upgrade(upgrade)?;
        }

        let request = game.start_review()?;
        fetch_failures += load(&mut game, &provider, request).await?;
        let chambers: Vec<Chamber> = game
            .review()
            .context("review not ready")?
            .items()
            .iter()
            .map(|item| item.category)
            .collect();
        for (index, chamber) in chambers.into_iter().enumerate() {
            let bucket = learner.place(chamber);
            game.move_review_item(index, bucket)?;
        }
        let feedback = game.check_review()?;
        learner.note(format!(
            "review sorted {}/{} correctly",
            feedback.correct,
            feedback.total()
        ));

        let request = game.finish_review()?;
        fetch_failures += load(&mut game, &provider, request).await?;
        let certificate = play_final_quiz(&mut game, &mut learner)?;
        learner.note(certificate.to_string());

        let final_state = game.state().clone();
        let replay_state = if plan.replay {
            game.play_again()?;
            Some(game.state().clone())
        } else {
            None
        };

        let digest = digest(&final_state, &certificate)?;
        Ok(PlaythroughSummary {
            seed,
            level_attempts,
            fetch_failures,
            review_correct: feedback.correct,
            review_total: feedback.total(),
            certificate,
            final_state,
            replay_state,
            digest,
        })
    }
}

/// Run a fetch, retrying failed screens. Returns how many attempts failed.
async fn load(
    game: &mut GameController,
    provider: &FixtureContentProvider,
    mut request: FetchRequest,
) -> Result<u32> {
    let mut failures = 0;
    loop {
        let kind = request.kind();
        let response = request.run(provider).await;
        ensure!(
            game.deliver(response) == Delivery::Applied,
            "{kind} response was discarded"
        );
        let Some(screen) = game.screen() else {
            bail!("{kind} screen closed while loading");
        };
        if screen.failure().is_none() {
            return Ok(failures);
        }
        failures += 1;
        ensure!(
            failures < MAX_FETCH_ATTEMPTS,
            "{kind} still failing after {failures} attempts"
        );
        request = game.retry_fetch()?;
    }
}

async fn play_level(game: &mut GameController, learner: &mut SimulatedLearner) -> Result<u32> {
    let mut attempts = 1;
    loop {
        let question = game
            .level_quiz()
            .and_then(|quiz| quiz.current_question())
            .context("level quiz not ready")?
            .clone();
        let pick = learner.choose(&question.options, &question.correct_answer);
        game.select_answer(&pick)?;
        game.submit_answer()?;
        match game.next_question()? {
            LevelQuizProgress::Advanced { .. } => {}
            LevelQuizProgress::Completed { .. } => return Ok(attempts),
            LevelQuizProgress::Failed { score } => {
                learner.note(format!("attempt {attempts} failed with {score}"));
                ensure!(
                    attempts < MAX_QUIZ_ATTEMPTS,
                    "gave up after {attempts} attempts"
                );
                attempts += 1;
                game.retry_level_quiz()?;
            }
        }
        // Yield between answers the way a UI event loop would.
        tokio::task::yield_now().await;
    }
}

fn play_final_quiz(
    game: &mut GameController,
    learner: &mut SimulatedLearner,
) -> Result<CertificateSummary> {
    loop {
        let question = game
            .final_quiz()
            .and_then(|quiz| quiz.current_question())
            .context("final quiz not ready")?
            .clone();
        let pick = learner.choose(&question.options, &question.correct_answer);
        game.answer_final_question(&pick)?;
        if let FinalQuizProgress::Certified(summary) = game.next_final_question()? {
            return Ok(summary);
        }
    }
}

fn digest(state: &GameState, certificate: &CertificateSummary) -> Result<u64> {
    let canonical = serde_json::to_string(&(state, certificate))?;
    let mut hasher = XxHash64::with_seed(0);
    hasher.write(canonical.as_bytes());
    Ok(hasher.finish())
}
