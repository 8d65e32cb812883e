//! Prompts for generative content providers.
//!
//! The core never calls a generator itself; a provider implementation pairs
//! these prompts with the `payload::parse_*` functions.
use crate::rules::QuizRules;

const LESSON_WORD_LIMIT: usize = 200;

#[must_use]
pub fn lesson_prompt(topic: &str, title: &str) -> String {
    format!(
        "Explain the following topic from the US Constitution's Article I for a middle school \
         student in a fun and engaging way. Use markdown for formatting. The topic is: \
         \"{topic}\". The title of this level is \"{title}\". Keep it under {LESSON_WORD_LIMIT} words."
    )
}

#[must_use]
pub fn level_quiz_prompt(topic: &str, rules: &QuizRules) -> String {
    format!(
        "Create {} distinct multiple-choice questions to check understanding of this topic: \
         \"{topic}\". The questions should be simple and directly related to the main point of \
         the topic. Ensure the options are clear and there's only one correct answer for each \
         question.",
        count_word(rules.level_quiz_questions)
    )
}

#[must_use]
pub fn final_quiz_prompt(rules: &QuizRules) -> String {
    format!(
        "Create a {}-question multiple-choice quiz about the US Legislative Branch, covering the \
         House of Representatives, the Senate, the powers of Congress, and how a bill becomes a \
         law. The questions should be suitable for a middle school student who has just learned \
         these topics.",
        rules.final_quiz_questions
    )
}

#[must_use]
pub fn review_items_prompt(rules: &QuizRules) -> String {
    format!(
        "Generate {} distinct facts or characteristics about the U.S. Congress. For each one, \
         categorize it as belonging to the 'House' of Representatives, the 'Senate', or 'Both'. \
         Examples: 'Must be 25 years old' (House), 'Approves treaties' (Senate), 'Can declare \
         war' (Both). Provide a diverse mix.",
        rules.review_item_count
    )
}

fn count_word(count: usize) -> String {
    match count {
        1 => String::from("one"),
        2 => String::from("two"),
        3 => String::from("three"),
        4 => String::from("four"),
        5 => String::from("five"),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompts_embed_topic_and_counts() {
        let rules = QuizRules::builtin();
        let lesson = lesson_prompt("The Senate", "Upper Chamber");
        assert!(lesson.contains("\"The Senate\""));
        assert!(lesson.contains("\"Upper Chamber\""));
        assert!(lesson.contains("under 200 words"));

        assert!(level_quiz_prompt("The Senate", &rules).starts_with("Create three distinct"));
        assert!(final_quiz_prompt(&rules).contains("10-question"));
        assert!(review_items_prompt(&rules).starts_with("Generate 10 distinct"));
    }

    #[test]
    fn large_counts_fall_back_to_digits() {
        let rules = QuizRules {
            level_quiz_questions: 7,
            level_pass_threshold: 5,
            ..QuizRules::builtin()
        };
        assert!(level_quiz_prompt("t", &rules).starts_with("Create 7 distinct"));
    }
}
