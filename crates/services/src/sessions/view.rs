use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

use quiz_core::model::{QuestionId, QuestionKind};
use quiz_core::render::{AssetLookup, RichBlock, render_rich_text};

use super::grading::{ChoiceMark, choice_marks};
use super::progress::SessionProgress;
use super::service::QuizSession;

//
// ─── QUESTION VIEW ─────────────────────────────────────────────────────────────
//

/// What the primary button does right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimaryAction {
    Grade,
    Next,
    Finish,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Feedback {
    Correct,
    /// The correct choice is carried by the marks.
    Wrong,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChoiceView {
    pub blocks: Vec<RichBlock>,
    pub selected: bool,
    /// Present once the question is graded.
    pub mark: Option<ChoiceMark>,
}

/// Read-model of one question, derived entirely from session state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionView {
    pub index: usize,
    pub total: usize,
    pub id: QuestionId,
    pub kind_label: &'static str,
    pub content: Vec<RichBlock>,
    pub choices: Vec<ChoiceView>,
    pub feedback: Option<Feedback>,
    pub can_go_back: bool,
    pub inputs_enabled: bool,
    pub primary_action: PrimaryAction,
    pub progress: SessionProgress,
}

impl QuestionView {
    /// Build the view of question `index`; building never mutates the session.
    #[must_use]
    pub fn build(session: &QuizSession, index: usize, assets: &dyn AssetLookup) -> Option<Self> {
        let question = session.question(index)?;
        let answer = session.answer(index)?;
        let marks = session.choice_marks(index);

        let choices = question
            .choices
            .iter()
            .enumerate()
            .map(|(idx, choice)| ChoiceView {
                blocks: render_rich_text(&choice.text, assets),
                selected: answer.is_selected(idx),
                mark: marks.as_ref().and_then(|m| m.get(idx).copied()),
            })
            .collect();

        let is_last = index + 1 == session.len();
        let primary_action = match (answer.checked, is_last) {
            (false, _) => PrimaryAction::Grade,
            (true, true) => PrimaryAction::Finish,
            (true, false) => PrimaryAction::Next,
        };

        Some(Self {
            index,
            total: session.len(),
            id: question.id.clone(),
            kind_label: question.kind.label(),
            content: render_rich_text(&question.content, assets),
            choices,
            feedback: answer.checked.then_some(if answer.correct {
                Feedback::Correct
            } else {
                Feedback::Wrong
            }),
            can_go_back: index > 0 && !session.is_finished(),
            inputs_enabled: !answer.checked && !session.is_finished(),
            primary_action,
            progress: session.progress(),
        })
    }

    /// 1-based position for display.
    #[must_use]
    pub fn position(&self) -> usize {
        self.index + 1
    }
}

//
// ─── FINAL REVIEW ──────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    Correct,
    Wrong,
    Skipped,
    Unanswered,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewChoice {
    pub blocks: Vec<RichBlock>,
    pub selected: bool,
    pub mark: ChoiceMark,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewItem {
    pub position: usize,
    pub id: QuestionId,
    pub kind: QuestionKind,
    pub status: ReviewStatus,
    pub content: Vec<RichBlock>,
    pub choices: Vec<ReviewChoice>,
}

/// Scored review of an attempt, in attempt order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionReport {
    pub correct: usize,
    pub total: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub elapsed_secs: Option<i64>,
    pub items: Vec<ReviewItem>,
}

impl SessionReport {
    /// Review every question in attempt order, rendering text through `assets`.
    #[must_use]
    pub fn from_session(session: &QuizSession, assets: &dyn AssetLookup) -> Self {
        let items = session
            .questions()
            .iter()
            .zip(session.answers())
            .enumerate()
            .map(|(i, (question, answer))| {
                let status = if answer.skipped {
                    ReviewStatus::Skipped
                } else if answer.correct {
                    ReviewStatus::Correct
                } else if answer.checked {
                    ReviewStatus::Wrong
                } else {
                    ReviewStatus::Unanswered
                };
                let choices = question
                    .choices
                    .iter()
                    .zip(choice_marks(question, answer))
                    .enumerate()
                    .map(|(idx, (choice, mark))| ReviewChoice {
                        blocks: render_rich_text(&choice.text, assets),
                        selected: answer.is_selected(idx),
                        mark,
                    })
                    .collect();
                ReviewItem {
                    position: i + 1,
                    id: question.id.clone(),
                    kind: question.kind,
                    status,
                    content: render_rich_text(&question.content, assets),
                    choices,
                }
            })
            .collect();

        let finished_at = session.finished_at();
        Self {
            correct: session.correct_count(),
            total: session.len(),
            started_at: session.started_at(),
            finished_at,
            elapsed_secs: finished_at.map(|end| (end - session.started_at()).num_seconds()),
            items,
        }
    }

    /// Serialize the report as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns `serde_json::Error` if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for SessionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.correct, self.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sessions::plan::SessionQuestion;
    use quiz_core::model::Choice;
    use chrono::Duration;
    use quiz_core::Clock;
    use quiz_core::render::{Inline, NoAssets};
    use std::collections::HashSet;
    use quiz_core::time::fixed_now;

    fn session() -> QuizSession {
        let q = |id: u64| SessionQuestion {
            id: QuestionId::from(id),
            kind: QuestionKind::Multi,
            content: format!("Q{id} $$x$$"),
            choices: vec![Choice::new("yes", true), Choice::new("no", false)],
            correct_idxs: vec![0],
        };
        QuizSession::new(vec![q(1), q(2), q(3)], fixed_now())
    }

    #[test]
    fn ungraded_view_offers_grading() {
        let mut s = session();
        s.select(1).unwrap();
        let view = QuestionView::build(&s, 0, &NoAssets).unwrap();
        assert_eq!(view.position(), 1);
        assert_eq!(view.kind_label, "A/B/C/D");
        assert_eq!(view.primary_action, PrimaryAction::Grade);
        assert!(view.inputs_enabled);
        assert!(!view.can_go_back);
        assert!(view.choices[1].selected);
        assert!(view.choices.iter().all(|c| c.mark.is_none()));
        assert_eq!(view.feedback, None);
    }

    #[test]
    fn graded_view_is_read_only_and_marked() {
        let mut s = session();
        s.select(1).unwrap();
        s.submit().unwrap();
        let view = QuestionView::build(&s, 0, &NoAssets).unwrap();
        assert_eq!(view.primary_action, PrimaryAction::Next);
        assert_eq!(view.feedback, Some(Feedback::Wrong));
        assert!(!view.inputs_enabled);
        assert_eq!(view.choices[0].mark, Some(ChoiceMark::Correct));
        assert_eq!(view.choices[1].mark, Some(ChoiceMark::Wrong));
    }

    #[test]
    fn redisplay_does_not_touch_answers() {
        let mut s = session();
        s.select(0).unwrap();
        s.submit().unwrap();
        s.submit().unwrap();
        s.back().unwrap();
        let before = s.answers().to_vec();
        let first = QuestionView::build(&s, 0, &NoAssets).unwrap();
        let second = QuestionView::build(&s, 0, &NoAssets).unwrap();
        assert_eq!(first, second);
        assert_eq!(s.answers(), before.as_slice());
    }

    #[test]
    fn report_lists_statuses_and_score() {
        let mut s = session();
        s.select(0).unwrap();
        s.submit().unwrap();
        s.submit().unwrap();
        s.skip().unwrap();
        s.select(1).unwrap();
        s.submit().unwrap();

        let report = SessionReport::from_session(&s, &NoAssets);
        assert_eq!(report.to_string(), "1/3");
        let statuses: Vec<_> = report.items.iter().map(|i| i.status).collect();
        assert_eq!(
            statuses,
            vec![ReviewStatus::Correct, ReviewStatus::Skipped, ReviewStatus::Wrong]
        );
        assert_eq!(report.items[1].choices[0].mark, ChoiceMark::Correct);
        assert_eq!(report.elapsed_secs, Some(0));
        assert!(report.to_json().unwrap().contains("\"status\": \"skipped\""));
    }

    #[test]
    fn report_renders_images_and_math() {
        let mut s = QuizSession::new(
            vec![SessionQuestion {
                id: QuestionId::from(1_u64),
                kind: QuestionKind::Multi,
                content: "See [img=a.png] and $$x$$".to_owned(),
                choices: vec![Choice::new("$$y$$ yes", true), Choice::new("no", false)],
                correct_idxs: vec![0],
            }],
            fixed_now(),
        );
        s.skip().unwrap();

        let assets: HashSet<String> = HashSet::from(["a.png".to_owned()]);
        let report = SessionReport::from_session(&s, &assets);
        let item = &report.items[0];
        assert_eq!(item.status, ReviewStatus::Skipped);
        assert_eq!(
            item.content,
            vec![
                RichBlock::Image {
                    path: "a.png".to_owned(),
                    available: true,
                },
                RichBlock::Paragraph {
                    inlines: vec![
                        Inline::Text("See  and ".to_owned()),
                        Inline::Math("x".to_owned()),
                    ],
                },
            ]
        );
        assert_eq!(
            item.choices[0].blocks,
            vec![RichBlock::Paragraph {
                inlines: vec![Inline::Math("y".to_owned()), Inline::Text(" yes".to_owned())],
            }]
        );
        assert_eq!(item.choices[0].mark, ChoiceMark::Correct);
    }

    #[test]
    fn report_measures_elapsed_time_from_the_clock() {
        let mut clock = Clock::fixed(fixed_now());
        clock.advance(Duration::seconds(75));
        let mut s = session().with_clock(clock);
        for _ in 0..3 {
            s.skip().unwrap();
        }

        let report = SessionReport::from_session(&s, &NoAssets);
        assert_eq!(report.finished_at, Some(fixed_now() + Duration::seconds(75)));
        assert_eq!(report.elapsed_secs, Some(75));
    }
}
