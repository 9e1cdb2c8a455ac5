use fluxora_models::{
    QuestionOutcome, QuestionType, Quiz, QuizAnswers, QuizQuestion, QuizResult, PASS_THRESHOLD,
};
use fluxora_utils::{FluxoraError, FluxoraResult};
use std::collections::HashSet;

/// Share of the correct answer's words a free-text answer must contain
const FUZZY_MATCH_RATIO: f64 = 0.6;

pub fn evaluate_answer(question: &QuizQuestion, answer: &str) -> bool {
    let answer = answer.trim().to_lowercase();
    let correct = question.correct_answer.trim().to_lowercase();
    if answer.is_empty() {
        return false;
    }

    match question.question_type {
        QuestionType::MultipleChoice => match (option_letter(&answer), option_letter(&correct)) {
            (Some(given), Some(expected)) => given == expected,
            _ => answer == correct,
        },
        QuestionType::TrueFalse => answer == correct,
        QuestionType::FillBlank | QuestionType::ShortAnswer => fuzzy_match(&answer, &correct),
    }
}

/// `b` for answers written as `b`, `b)` or `b) some option text`.
fn option_letter(answer: &str) -> Option<char> {
    let mut chars = answer.chars();
    let letter = chars.next().filter(char::is_ascii_alphabetic)?;
    match chars.next() {
        None | Some(')') | Some('.') => Some(letter),
        _ => None,
    }
}

/// Word-overlap match: enough of the correct answer's distinct words appear in the answer.
pub fn fuzzy_match(answer: &str, correct: &str) -> bool {
    let answer_words: HashSet<String> = answer.split_whitespace().map(str::to_lowercase).collect();
    let correct_words: HashSet<String> = correct.split_whitespace().map(str::to_lowercase).collect();
    if answer_words.is_empty() || correct_words.is_empty() {
        return false;
    }

    let matches = answer_words.intersection(&correct_words).count() as f64;
    matches >= (correct_words.len() as f64 * FUZZY_MATCH_RATIO).max(1.0)
}

/// Score a fully answered quiz. Study recommendations are listed only for a failed attempt.
pub fn grade(quiz: &Quiz, answers: &QuizAnswers) -> FluxoraResult<QuizResult> {
    let total = quiz.questions.len();
    let answered = (0..total)
        .filter(|i| answers.get(i).map_or(false, |a| !a.trim().is_empty()))
        .count();
    if answered < total {
        return Err(FluxoraError::validation(
            "answers",
            format!(
                "Please answer all questions before submitting. You have {} unanswered question(s).",
                total - answered
            ),
        ));
    }

    let outcomes: Vec<QuestionOutcome> = quiz
        .questions
        .iter()
        .enumerate()
        .map(|(index, question)| {
            let user_answer = answers.get(&index).cloned().unwrap_or_default();
            QuestionOutcome {
                index,
                question: question.question.clone(),
                is_correct: evaluate_answer(question, &user_answer),
                user_answer,
                correct_answer: question.correct_answer.clone(),
                explanation: question.explanation.clone(),
                review_section: question.review_section.clone(),
            }
        })
        .collect();

    let correct = outcomes.iter().filter(|o| o.is_correct).count();
    let score = if total == 0 {
        0.0
    } else {
        correct as f64 * 100.0 / total as f64
    };
    let passed = score >= PASS_THRESHOLD;

    let mut recommendations: Vec<String> = Vec::new();
    if !passed {
        for outcome in outcomes.iter().filter(|o| !o.is_correct) {
            if !recommendations.contains(&outcome.review_section) {
                recommendations.push(outcome.review_section.clone());
            }
        }
    }

    Ok(QuizResult {
        quiz_id: quiz.id,
        topic: quiz.topic.clone(),
        score: (score * 10.0).round() / 10.0,
        correct,
        total,
        passed,
        outcomes,
        recommendations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use uuid::Uuid;

    fn question(question_type: QuestionType, correct: &str, review: &str) -> QuizQuestion {
        QuizQuestion {
            question_type,
            question: "q".to_string(),
            options: Vec::new(),
            correct_answer: correct.to_string(),
            explanation: "e".to_string(),
            review_section: review.to_string(),
        }
    }

    fn quiz() -> Quiz {
        Quiz::new(
            Uuid::new_v4(),
            "Sales",
            vec![
                question(QuestionType::MultipleChoice, "B", "Pricing section"),
                question(QuestionType::MultipleChoice, "A", "Pricing section"),
                question(QuestionType::TrueFalse, "True", "Growth chart"),
                question(QuestionType::FillBlank, "photosynthesis", "Biology basics"),
                question(QuestionType::ShortAnswer, "Revenue grew because north sales doubled", "Summary"),
            ],
        )
    }

    fn answers(values: &[&str]) -> QuizAnswers {
        values.iter().enumerate().map(|(i, v)| (i, v.to_string())).collect()
    }

    #[test]
    fn test_multiple_choice_letter_forms() {
        let q = question(QuestionType::MultipleChoice, "B", "");
        assert!(evaluate_answer(&q, "B"));
        assert!(evaluate_answer(&q, " b "));
        assert!(evaluate_answer(&q, "B) Second option"));
        assert!(!evaluate_answer(&q, "C"));
        assert!(!evaluate_answer(&q, ""));

        let spelled = question(QuestionType::MultipleChoice, "B) South", "");
        assert!(evaluate_answer(&spelled, "B"));
    }

    #[test]
    fn test_true_false_exact() {
        let q = question(QuestionType::TrueFalse, "True", "");
        assert!(evaluate_answer(&q, "true"));
        assert!(!evaluate_answer(&q, "False"));
        assert!(!evaluate_answer(&q, "t"));
    }

    #[test]
    fn test_fuzzy_threshold() {
        // five distinct words, three needed
        let correct = "light energy becomes chemical energy stored";
        assert!(fuzzy_match("light becomes chemical", correct));
        assert!(!fuzzy_match("light becomes", correct));
        assert!(fuzzy_match("Photosynthesis", "photosynthesis"));
        assert!(!fuzzy_match("anything", ""));
    }

    #[test]
    fn test_grade_requires_every_answer() {
        let err = grade(&quiz(), &answers(&["B", "A", "True"])).unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
        assert!(err.to_string().contains("2 unanswered"));

        let err = grade(&quiz(), &answers(&["B", "A", "True", " ", "x"])).unwrap_err();
        assert!(err.to_string().contains("1 unanswered"));
    }

    #[test]
    fn test_grade_pass() {
        let result = grade(
            &quiz(),
            &answers(&["B", "A", "True", "photosynthesis", "no idea"]),
        )
        .unwrap();
        assert_eq!(result.correct, 4);
        assert_eq!(result.score, 80.0);
        assert!(result.passed);
        assert!(result.recommendations.is_empty());
        assert!(!result.outcomes[4].is_correct);
    }

    #[test]
    fn test_grade_fail_lists_distinct_reviews_in_order() {
        let result = grade(&quiz(), &answers(&["C", "D", "True", "wrong", "wrong"])).unwrap();
        assert_eq!(result.correct, 1);
        assert_eq!(result.score, 20.0);
        assert!(!result.passed);
        assert_eq!(
            result.recommendations,
            vec!["Pricing section", "Biology basics", "Summary"]
        );
    }

    #[test]
    fn test_pass_threshold_is_inclusive() {
        let result = grade(&quiz(), &answers(&["B", "A", "True", "wrong", "wrong"])).unwrap();
        assert_eq!(result.score, 60.0);
        assert!(result.passed);
    }

    proptest! {
        #[test]
        fn prop_answer_equal_to_correct_always_matches(correct in "[a-z]{1,8}( [a-z]{1,8}){0,6}") {
            prop_assert!(fuzzy_match(&correct, &correct));
            let q = question(QuestionType::ShortAnswer, &correct, "");
            prop_assert!(evaluate_answer(&q, &correct.to_uppercase()));
        }
    }
}
