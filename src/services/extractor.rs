//! Splits a model reply into prose and a task list.
//!
//! The model is asked to answer with a `RESPONSE:` section followed by a
//! `TASKS:` JSON array. Replies routinely break that contract, so every step
//! degrades to the rule-based generators in [`super::fallback`] instead of
//! failing.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use tracing::{debug, warn};

use super::fallback::{fallback_narrative, fallback_tasks};
use crate::types::{ExtractionResult, SuggestionTask};

/// Narratives shorter than this are replaced with a canned paragraph.
pub const MIN_NARRATIVE_CHARS: usize = 50;

const LEAK_MARKERS: &[&str] = &["\"title\":", "\"description\":", "{", "}"];

static TASKS_ARRAY_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"(?i)TASKS:\s*\[").expect("tasks label regex")
});

static DANGLING_TASKS_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"(?im)^[ \t]*TASKS:").expect("dangling tasks label regex")
});

static RESPONSE_LABEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"(?i)RESPONSE:\s*").expect("response label regex")
});

/// The `TASKS: [...]` block located inside a reply.
#[derive(Debug, Clone, PartialEq, Eq)]
struct TaskSection<'a> {
    /// Byte range of the label and array within the reply
    span: Range<usize>,
    /// The bracketed JSON array
    json: &'a str,
}

#[derive(Debug, PartialEq)]
enum TaskParse {
    Parsed(Vec<SuggestionTask>),
    Empty,
    Invalid(String),
    Missing,
}

/// Turn a raw model reply into narrative plus tasks. Never fails.
pub fn extract(raw_text: &str, user_query: &str) -> ExtractionResult {
    let section = locate_task_section(raw_text);

    let parsed = match &section {
        Some(section) => parse_task_array(section.json),
        None => TaskParse::Missing,
    };

    let tasks = match parsed {
        TaskParse::Parsed(tasks) if !tasks.is_empty() => {
            debug!(target: "travel::extract", count = tasks.len(), "parsed tasks from reply");
            tasks
        }
        other => {
            match &other {
                TaskParse::Invalid(err) => {
                    warn!(target: "travel::extract", error = %err, "tasks JSON did not parse, generating fallback tasks")
                }
                TaskParse::Missing => {
                    debug!(target: "travel::extract", "no tasks section found, generating fallback tasks")
                }
                _ => debug!(target: "travel::extract", "tasks section empty, generating fallback tasks"),
            }
            fallback_tasks(user_query)
        }
    };

    let mut narrative = clean_narrative(raw_text, section.as_ref());
    if narrative.chars().count() < MIN_NARRATIVE_CHARS {
        debug!(
            target: "travel::extract",
            chars = narrative.chars().count(),
            "narrative too short, using canned response"
        );
        narrative = fallback_narrative(user_query);
    }
    debug_assert!(!has_leaked_json(&narrative));

    ExtractionResult { narrative, tasks }
}

/// Find `TASKS:` followed by a JSON array.
///
/// The array ends at its balanced closing bracket (brackets inside JSON
/// strings are ignored). A truncated array falls back to the first `]`
/// after the opening one.
fn locate_task_section(raw: &str) -> Option<TaskSection<'_>> {
    let label = TASKS_ARRAY_RE.find(raw)?;
    let open = label.end() - 1;

    let close = balanced_array_end(raw, open)
        .or_else(|| raw[open..].find(']').map(|offset| open + offset))?;

    Some(TaskSection {
        span: label.start()..close + 1,
        json: &raw[open..=close],
    })
}

fn balanced_array_end(text: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[open..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '[' | '{' => depth += 1,
            ']' | '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return (ch == ']').then_some(open + offset);
                }
            }
            _ => {}
        }
    }

    None
}

fn parse_task_array(json: &str) -> TaskParse {
    let trimmed = json.trim();
    if trimmed == "[]" {
        return TaskParse::Empty;
    }

    let values: Vec<Value> = match serde_json::from_str(trimmed) {
        Ok(values) => values,
        Err(err) => return TaskParse::Invalid(err.to_string()),
    };

    let total = values.len();
    let tasks: Vec<SuggestionTask> = values
        .iter()
        .filter_map(SuggestionTask::from_model_value)
        .collect();

    if tasks.len() < total {
        debug!(
            target: "travel::extract",
            dropped = total - tasks.len(),
            "skipped task entries without a usable title"
        );
    }

    TaskParse::Parsed(tasks)
}

fn clean_narrative(raw: &str, section: Option<&TaskSection<'_>>) -> String {
    let mut text = match section {
        Some(section) => {
            let mut remaining = String::with_capacity(raw.len());
            remaining.push_str(&raw[..section.span.start]);
            remaining.push_str(&raw[section.span.end..]);
            remaining
        }
        None => match DANGLING_TASKS_RE.find(raw) {
            Some(label) => raw[..label.start()].to_string(),
            None => raw.to_string(),
        },
    };

    text = RESPONSE_LABEL_RE.replace(&text, "").trim().to_string();

    if has_leaked_json(&text) {
        text = text
            .lines()
            .take_while(|line| !is_leaked_json_line(line))
            .collect::<Vec<_>>()
            .join("\n")
            .trim()
            .to_string();
    }

    text
}

fn is_leaked_json_line(line: &str) -> bool {
    LEAK_MARKERS.iter().any(|marker| line.contains(marker))
}

fn has_leaked_json(text: &str) -> bool {
    text.lines().any(is_leaked_json_line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{TaskCategory, TaskPriority};

    const LONG_PROSE: &str = "Kyoto rewards slow travel: temples at dawn, tea houses by afternoon, and quiet lantern-lit lanes after dark.";

    #[test]
    fn test_locates_balanced_array_with_nested_brackets() {
        let raw = r#"RESPONSE: hi
TASKS: [{"title": "Pack [carry-on]", "tips": "a ] b"}] trailing"#;
        let section = locate_task_section(raw).unwrap();
        assert_eq!(section.json, r#"[{"title": "Pack [carry-on]", "tips": "a ] b"}]"#);
        assert_eq!(&raw[section.span.end..], " trailing");
    }

    #[test]
    fn test_truncated_array_uses_first_close_bracket() {
        let raw = "TASKS: [ {\"title\": \"a [b] c\", \"descr";
        let section = locate_task_section(raw).unwrap();
        assert_eq!(section.json, "[ {\"title\": \"a [b]");
        assert!(matches!(parse_task_array(section.json), TaskParse::Invalid(_)));
    }

    #[test]
    fn test_label_is_case_insensitive() {
        assert!(locate_task_section("tasks:\n[]").is_some());
        assert!(locate_task_section("TASKS: none today").is_none());
    }

    #[test]
    fn test_parse_distinguishes_empty_and_invalid() {
        assert_eq!(parse_task_array(" [] "), TaskParse::Empty);
        assert!(matches!(parse_task_array("[{,}]"), TaskParse::Invalid(_)));
        assert_eq!(parse_task_array("[{\"nope\": 1}]"), TaskParse::Parsed(vec![]));
    }

    #[test]
    fn test_parsed_tasks_are_coerced() {
        let raw = format!(
            "RESPONSE:\n{}\nTASKS:\n[{{\"title\": \"Buy rail pass\", \"description\": \"JR pass\", \"category\": \"rail\", \"priority\": \"low\"}}]",
            LONG_PROSE
        );
        let result = extract(&raw, "visit Kyoto");

        assert_eq!(result.narrative, LONG_PROSE);
        assert_eq!(result.tasks.len(), 1);
        assert_eq!(result.tasks[0].category, TaskCategory::Preparation);
        assert_eq!(result.tasks[0].priority, TaskPriority::Low);
    }

    #[test]
    fn test_leaked_json_lines_are_cut() {
        let raw = format!(
            "RESPONSE:\n{}\nHere is more.\n  {{\n    \"title\": \"Book\",\n    \"description\": \"x\"\n  }}\nClosing remark.",
            LONG_PROSE
        );
        let narrative = clean_narrative(&raw, None);
        assert_eq!(narrative, format!("{}\nHere is more.", LONG_PROSE));
    }

    #[test]
    fn test_dangling_label_is_dropped_from_narrative() {
        let raw = format!("RESPONSE: {}\nTASKS:\n(none could be listed)", LONG_PROSE);
        assert_eq!(clean_narrative(&raw, None), LONG_PROSE);
    }

    #[test]
    fn test_response_label_removed_once() {
        let raw = format!("response: {}", LONG_PROSE);
        assert_eq!(clean_narrative(&raw, None), LONG_PROSE);
    }

    #[test]
    fn test_short_narrative_uses_canned_text() {
        let result = extract("RESPONSE:\nBali is great.\nTASKS:\n[]", "bali honeymoon");
        assert!(result.narrative.starts_with("Bali is an incredible destination!"));
    }
}
