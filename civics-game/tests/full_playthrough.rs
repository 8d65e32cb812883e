use civics_game::{
    ActiveScreen, Bucket, ContentKind, ControllerError, Delivery, FetchRequest,
    FinalQuizProgress, FixtureContentProvider, GameController, GameView, LevelId,
    LevelQuizProgress, SessionError, UpgradeId, default_engine,
};

async fn fetch(
    game: &mut GameController,
    provider: &FixtureContentProvider,
    request: FetchRequest,
) {
    let response = request.run(provider).await;
    assert_eq!(game.deliver(response), Delivery::Applied);
}

fn correct_level_answer(game: &GameController) -> String {
    game.level_quiz()
        .and_then(|quiz| quiz.current_question())
        .map(|question| question.correct_answer.clone())
        .unwrap()
}

async fn pass_level(
    game: &mut GameController,
    provider: &FixtureContentProvider,
    level: LevelId,
) -> LevelQuizProgress {
    let request = game.start_level(level).unwrap();
    fetch(game, provider, request).await;
    loop {
        let answer = correct_level_answer(game);
        game.select_answer(&answer).unwrap();
        assert!(game.submit_answer().unwrap());
        match game.next_question().unwrap() {
            LevelQuizProgress::Advanced { .. } => {}
            done => return done,
        }
    }
}

async fn sort_review(game: &mut GameController, provider: &FixtureContentProvider) {
    let request = game.start_review().unwrap();
    fetch(game, provider, request).await;
    let chambers: Vec<_> = game
        .review()
        .unwrap()
        .items()
        .iter()
        .map(|item| item.category)
        .collect();
    for (index, chamber) in chambers.into_iter().enumerate() {
        game.move_review_item(index, Bucket::from(chamber)).unwrap();
    }
    let feedback = game.check_review().unwrap();
    assert_eq!(feedback.correct, feedback.total());
}

#[tokio::test]
async fn learner_earns_a_certificate() {
    let provider = FixtureContentProvider::load_from_static();
    let mut game = GameController::new(default_engine());
    game.submit_name("  Ada  ").unwrap();
    assert_eq!(game.state().player_name(), "Ada");

    let level_ids: Vec<LevelId> = game.engine().catalog().level_ids().collect();
    for level in level_ids {
        let progress = pass_level(&mut game, &provider, level).await;
        assert!(
            matches!(progress, LevelQuizProgress::Completed { level: done, .. } if done == level),
            "{progress:?}"
        );
    }
    assert_eq!(game.engine().progress(game.state()).percent(), 100);

    game.toggle_upgrade(&UpgradeId::new("grad_cap")).unwrap();
    game.toggle_upgrade(&UpgradeId::new("sunglasses")).unwrap();

    sort_review(&mut game, &provider).await;
    let request = game.finish_review().unwrap();
    assert_eq!(game.state().current_view(), GameView::Quiz);
    fetch(&mut game, &provider, request).await;

    let mut certificate = None;
    for index in 0..10 {
        let question = game.final_quiz().unwrap().current_question().unwrap().clone();
        // Miss the first three on purpose.
        let pick = if index < 3 {
            question
                .options
                .iter()
                .find(|option| **option != question.correct_answer)
                .unwrap()
                .clone()
        } else {
            question.correct_answer.clone()
        };
        game.answer_final_question(&pick).unwrap();
        if let FinalQuizProgress::Certified(summary) = game.next_final_question().unwrap() {
            certificate = Some(summary);
        }
    }
    let certificate = certificate.unwrap();
    assert_eq!((certificate.score, certificate.total), (7, 10));
    assert_eq!(certificate.player_name, "Ada");
    assert_eq!(certificate.equipped, ["Graduation Cap", "Cool Shades"]);
    assert_eq!(game.state().current_view(), GameView::Certificate);
    assert_eq!(game.state().score(), 7);

    game.play_again().unwrap();
    assert_eq!(game.state().current_view(), GameView::GameScreen);
    assert_eq!(game.state().player_name(), "Ada");
    assert!(game.state().earned_upgrades().is_empty());
}

#[tokio::test]
async fn flaky_provider_only_affects_the_open_screen() {
    let provider = FixtureContentProvider::load_from_static();
    provider.fail_next(ContentKind::Level, 2);
    let mut game = GameController::new(default_engine());
    game.submit_name("Ada").unwrap();

    let request = game.start_level(LevelId(1)).unwrap();
    fetch(&mut game, &provider, request).await;
    let before = game.state().clone();
    assert!(game.screen().and_then(ActiveScreen::failure).is_some());

    let retry = game.retry_fetch().unwrap();
    fetch(&mut game, &provider, retry).await;
    assert!(game.screen().and_then(ActiveScreen::failure).is_some());
    assert_eq!(game.state(), &before);

    let retry = game.retry_fetch().unwrap();
    fetch(&mut game, &provider, retry).await;
    assert!(game.level_quiz().is_some());
}

#[tokio::test]
async fn review_must_be_sorted_and_checked_before_the_final_quiz() {
    let provider = FixtureContentProvider::load_from_static();
    let mut game = GameController::new(default_engine());
    game.submit_name("Ada").unwrap();
    let level_ids: Vec<LevelId> = game.engine().catalog().level_ids().collect();
    for level in level_ids {
        pass_level(&mut game, &provider, level).await;
    }

    let first = game.start_review().unwrap();
    assert_eq!(
        game.finish_review(),
        Err(ControllerError::NotReady(ContentKind::Review))
    );
    fetch(&mut game, &provider, first).await;
    game.move_review_item(0, Bucket::House).unwrap();
    assert_eq!(
        game.check_review(),
        Err(ControllerError::Session(SessionError::ItemsUnassigned {
            remaining: 9
        }))
    );
    assert_eq!(
        game.finish_review(),
        Err(ControllerError::Session(SessionError::NotChecked))
    );
}

#[tokio::test]
async fn failed_level_quiz_retries_without_refetching() {
    let provider = FixtureContentProvider::load_from_static();
    let mut game = GameController::new(default_engine());
    game.submit_name("Ada").unwrap();
    let request = game.start_level(LevelId(1)).unwrap();
    fetch(&mut game, &provider, request).await;

    let lesson = game.level_quiz().unwrap().lesson().to_string();
    let mut last = None;
    for _ in 0..3 {
        let question = game.level_quiz().unwrap().current_question().unwrap().clone();
        let wrong = question
            .options
            .iter()
            .find(|option| **option != question.correct_answer)
            .unwrap()
            .clone();
        game.select_answer(&wrong).unwrap();
        assert!(!game.submit_answer().unwrap());
        last = Some(game.next_question().unwrap());
    }
    assert_eq!(last, Some(LevelQuizProgress::Failed { score: 0 }));
    assert!(game.state().completed_levels().is_empty());

    game.retry_level_quiz().unwrap();
    assert_eq!(game.level_quiz().unwrap().lesson(), lesson);
    assert_eq!(game.state().current_view(), GameView::Level);
}
