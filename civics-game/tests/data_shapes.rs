use std::collections::{BTreeSet, HashSet};

use civics_game::{
    Catalog, Chamber, ContentPack, GameState, GameView, LevelId, QuizRules, SlotType,
    default_catalog,
};

fn load_pack() -> ContentPack {
    ContentPack::from_json(include_str!("../../static/assets/data/content.json")).unwrap()
}

#[test]
fn bundled_catalog_parses_and_is_sequential() {
    let catalog = Catalog::from_json(
        include_str!("../../static/assets/data/levels.json"),
        include_str!("../../static/assets/data/upgrades.json"),
    )
    .unwrap();
    assert_eq!(&catalog, default_catalog());
    let ids: Vec<u32> = catalog.level_ids().map(LevelId::get).collect();
    assert_eq!(ids, [1, 2, 3, 4, 5, 6]);
    for level in catalog.levels() {
        assert!(!level.title.trim().is_empty(), "level {} title", level.id);
        assert!(!level.topic.trim().is_empty(), "level {} topic", level.id);
    }
}

#[test]
fn upgrade_catalog_covers_every_slot() {
    let catalog = default_catalog();
    let slots: HashSet<SlotType> = catalog.upgrades().iter().map(|u| u.slot).collect();
    assert_eq!(slots.len(), 3);
    let order: Vec<&str> = catalog.upgrades().iter().map(|u| u.id.as_str()).collect();
    assert_eq!(
        order,
        ["top_hat", "sunglasses", "bowtie", "monocle", "grad_cap"]
    );
    for upgrade in catalog.upgrades() {
        assert!(!upgrade.asset.is_empty(), "{} has no asset", upgrade.id);
    }
}

#[test]
fn bundled_rules_match_builtin_defaults() {
    let rules = QuizRules::from_json(include_str!("../../static/assets/data/rules.json")).unwrap();
    assert_eq!(rules, QuizRules::builtin());
    assert!(rules.validate().is_ok());
}

#[test]
fn content_pack_has_a_lesson_for_every_level() {
    let pack = load_pack();
    let rules = QuizRules::builtin();
    for level in default_catalog().levels() {
        let packed = pack
            .level_by_title(&level.title)
            .unwrap_or_else(|| panic!("no lesson titled {}", level.title));
        assert_eq!(packed.level, level.id);
        assert!(!packed.content.trim().is_empty());
        assert_eq!(packed.questions.len(), rules.level_quiz_questions);
    }
    assert_eq!(pack.final_quiz.len(), rules.final_quiz_questions);
    assert_eq!(pack.review_items.len(), rules.review_item_count);
}

#[test]
fn packed_questions_are_answerable() {
    let pack = load_pack();
    let questions = pack
        .levels
        .iter()
        .flat_map(|level| level.questions.iter())
        .chain(pack.final_quiz.iter());
    for question in questions {
        assert!(
            question.has_option(&question.correct_answer),
            "answer missing for {:?}",
            question.question
        );
        let unique: BTreeSet<&String> = question.options.iter().collect();
        assert_eq!(
            unique.len(),
            question.options.len(),
            "duplicate options in {:?}",
            question.question
        );
    }
}

#[test]
fn review_items_use_every_chamber() {
    let pack = load_pack();
    for chamber in Chamber::ALL {
        assert!(
            pack.review_items.iter().any(|item| item.category == chamber),
            "no {chamber} items"
        );
    }
}

#[test]
fn game_state_serializes_with_view_names() {
    let state = GameState::default();
    let value = serde_json::to_value(&state).unwrap();
    assert_eq!(value["current_view"], "name_entry");
    assert_eq!(value["unlocked_levels"], serde_json::json!([1]));

    let restored: GameState = serde_json::from_value(value).unwrap();
    assert_eq!(restored, state);
    assert_eq!(restored.current_view(), GameView::NameEntry);
}
