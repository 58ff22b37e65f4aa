// Clean clinician free text before it is embedded in a model prompt, and
// unwrap model replies that arrive inside Markdown fences.

use std::sync::LazyLock;

use regex::Regex;

/// Maximum length of one free-text form field sent to the model (characters).
const MAX_FIELD_LENGTH: usize = 2_000;

/// A reply wrapped in a Markdown code fence, optionally tagged `json`.
static FENCED_REPLY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^\s*```[A-Za-z]*[ \t]*\r?\n?(.*?)\r?\n?```\s*$").unwrap()
});

/// Sanitize a free-text form field for prompt inclusion: strip invisible
/// characters, drop instruction-override lines, collapse whitespace and
/// truncate. Only the field name and removed-line count are logged.
pub fn sanitize_free_text(raw: &str, field: &str) -> String {
    let visible = remove_invisible_chars(raw);
    let (kept, removed) = drop_override_lines(&visible);

    if removed > 0 {
        tracing::warn!(
            field,
            removed_lines = removed,
            "Instruction-like lines removed from free-text field"
        );
    }

    truncate_chars(&collapse_whitespace(&kept), MAX_FIELD_LENGTH)
}

/// Remove a surrounding Markdown code fence, if any, and trim.
pub fn strip_code_fences(reply: &str) -> &str {
    match FENCED_REPLY.captures(reply).and_then(|c| c.get(1)) {
        Some(inner) => inner.as_str().trim(),
        None => reply.trim(),
    }
}

/// Best-effort isolation of the outermost JSON object in a reply that may
/// carry leading or trailing prose.
pub fn isolate_json_object(reply: &str) -> &str {
    let unfenced = strip_code_fences(reply);
    match (unfenced.find('{'), unfenced.rfind('}')) {
        (Some(start), Some(end)) if start < end => &unfenced[start..=end],
        _ => unfenced,
    }
}

fn remove_invisible_chars(text: &str) -> String {
    text.chars()
        .filter(|c| {
            if matches!(*c, ' ' | '\n' | '\t') {
                return true;
            }
            !matches!(
                *c,
                '\u{200B}'..='\u{200F}'
                    | '\u{202A}'..='\u{202E}'
                    | '\u{2060}'..='\u{2064}'
                    | '\u{FEFF}'
            ) && !c.is_control()
        })
        .collect()
}

fn is_override_line(lower: &str) -> bool {
    const ROLE_PREFIXES: &[&str] = &[
        "system:",
        "assistant:",
        "user:",
        "[system]",
        "[inst]",
        "<<sys>>",
        "<system",
        "</system",
        "<instruction",
        "</instruction",
    ];
    const OVERRIDE_PHRASES: &[&str] = &[
        "ignore previous instructions",
        "ignore all instructions",
        "ignore the above",
        "disregard your instructions",
        "disregard all instructions",
        "forget your instructions",
        "new instructions:",
        "override:",
        "忽略之前的指令",
        "忽略以上",
    ];

    ROLE_PREFIXES.iter().any(|p| lower.starts_with(p))
        || OVERRIDE_PHRASES.iter().any(|p| lower.contains(p))
}

fn drop_override_lines(text: &str) -> (String, usize) {
    let mut removed = 0usize;
    let kept: Vec<&str> = text
        .lines()
        .filter(|line| {
            let hit = is_override_line(&line.trim().to_lowercase());
            if hit {
                removed += 1;
            }
            !hit
        })
        .collect();
    (kept.join("\n"), removed)
}

/// Trim each line and drop blank lines; form fields carry no layout.
fn collapse_whitespace(text: &str) -> String {
    text.lines()
        .map(|l| l.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        None => text.to_string(),
        Some((cut, _)) => format!("{}…[TRUNCATED]", &text[..cut]),
    }
}
