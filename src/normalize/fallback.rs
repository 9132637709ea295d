//! Line heuristics for replies that are not structured JSON

use crate::content::{FaqItem, Graph, TimelineItem};

fn content_lines(raw: &str) -> impl Iterator<Item = &str> {
    raw.lines().map(str::trim).filter(|l| !l.is_empty())
}

/// Split prose into question/answer pairs.
///
/// A line containing `?` opens a new question. The non-question lines that
/// follow it, joined with single spaces, form its answer. Questions left
/// without an answer are dropped, as are lines before the first question.
pub fn faq(raw: &str) -> Vec<FaqItem> {
    let mut items = Vec::new();
    let mut question: Option<&str> = None;
    let mut answer: Vec<&str> = Vec::new();

    for line in content_lines(raw) {
        if line.contains('?') {
            flush_faq(question.take(), &mut answer, &mut items);
            question = Some(line);
        } else if question.is_some() {
            answer.push(line);
        }
    }
    flush_faq(question, &mut answer, &mut items);

    items
}

fn flush_faq(question: Option<&str>, answer: &mut Vec<&str>, items: &mut Vec<FaqItem>) {
    if let Some(q) = question {
        if !answer.is_empty() {
            items.push(FaqItem::new(q, answer.join(" ")));
        }
    }
    answer.clear();
}

/// One entry per non-empty line, each stamped with `year`.
pub fn timeline(raw: &str, year: &str) -> Vec<TimelineItem> {
    content_lines(raw)
        .map(|line| TimelineItem::new(year, line))
        .collect()
}

/// The placeholder graph. Nothing in the reply is used.
pub fn graph(_raw: &str) -> Graph {
    Graph::placeholder()
}
