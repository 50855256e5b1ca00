//! Plain-text rendering of engine read-models for the terminal.

use std::fmt::Write as _;

use quiz_core::render::{Inline, RichBlock};
use services::{ChoiceMark, Feedback, PrimaryAction, QuestionView, ReviewStatus, SessionReport};

pub fn blocks_to_text(blocks: &[RichBlock]) -> String {
    let mut lines = Vec::with_capacity(blocks.len());
    for block in blocks {
        let line = match block {
            RichBlock::Image {
                path,
                available: true,
            } => format!("[image: {path}]"),
            RichBlock::Image {
                path,
                available: false,
            } => format!("[missing image: {path}]"),
            RichBlock::DisplayMath { source } => format!("    {source}"),
            RichBlock::Paragraph { inlines } => inlines
                .iter()
                .map(|inline| match inline {
                    Inline::Text(text) => text.clone(),
                    Inline::Math(math) => format!("\\({math}\\)"),
                })
                .collect(),
        };
        lines.push(line);
    }
    lines.join("\n")
}

fn mark_symbol(mark: Option<ChoiceMark>, selected: bool) -> &'static str {
    match (mark, selected) {
        (Some(ChoiceMark::Correct), _) => "✔",
        (Some(ChoiceMark::Wrong), _) => "✘",
        (_, true) => "●",
        _ => "○",
    }
}

pub fn question_screen(view: &QuestionView) -> String {
    let mut out = String::new();
    let p = &view.progress;
    let _ = writeln!(
        out,
        "── Question {}/{}  [{}]  id={}   graded {}/{} ({}%)",
        view.position(),
        view.total,
        view.kind_label,
        view.id,
        p.graded,
        p.total,
        p.percent
    );
    let _ = writeln!(out, "{}", blocks_to_text(&view.content));
    let _ = writeln!(out);

    for (idx, choice) in view.choices.iter().enumerate() {
        let text = blocks_to_text(&choice.blocks).replace('\n', "\n      ");
        let _ = writeln!(
            out,
            "  {} {}. {}",
            mark_symbol(choice.mark, choice.selected),
            idx + 1,
            text
        );
    }

    match view.feedback {
        Some(Feedback::Correct) => {
            let _ = writeln!(out, "\nCORRECT");
        }
        Some(Feedback::Wrong) => {
            let _ = writeln!(out, "\nWRONG: the correct answer is marked ✔");
        }
        None => {}
    }

    let primary = match view.primary_action {
        PrimaryAction::Grade => "grade",
        PrimaryAction::Next => "next question",
        PrimaryAction::Finish => "finish",
    };
    let mut help = Vec::new();
    if view.inputs_enabled {
        help.push("<number> select".to_owned());
    }
    help.push(format!("<enter> {primary}"));
    if view.can_go_back {
        help.push("b back".to_owned());
    }
    if view.inputs_enabled {
        help.push("s skip".to_owned());
    }
    help.push("r retry".to_owned());
    help.push("o <archive> open".to_owned());
    help.push("q quit".to_owned());
    let _ = write!(out, "\n{}", help.join(" · "));
    out
}

pub fn report_screen(report: &SessionReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "══ You got {report} correct (✔ = correct, ✘ = your wrong pick, ⏭ = skipped)"
    );
    if let Some(secs) = report.elapsed_secs {
        let _ = writeln!(out, "   time: {}m {:02}s", secs / 60, secs % 60);
    }

    for item in &report.items {
        let status = match item.status {
            ReviewStatus::Correct => "correct ✔",
            ReviewStatus::Wrong => "wrong ✘",
            ReviewStatus::Skipped => "skipped ⏭",
            ReviewStatus::Unanswered => "unanswered",
        };
        let _ = writeln!(
            out,
            "\n{}. (id={}) [{}] {}",
            item.position,
            item.id,
            item.kind.label(),
            status
        );
        let _ = writeln!(out, "   {}", blocks_to_text(&item.content).replace('\n', "\n   "));
        for choice in &item.choices {
            let text = blocks_to_text(&choice.blocks).replace('\n', "\n       ");
            let _ = writeln!(
                out,
                "     {} {}",
                mark_symbol(Some(choice.mark), choice.selected),
                text
            );
        }
    }

    let _ = write!(out, "\nr retry · o <archive> open another · q quit");
    out
}
