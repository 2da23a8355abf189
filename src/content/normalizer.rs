use lazy_static::lazy_static;
use regex::{Captures, Regex};

use crate::text_utils::decode_entities;

/// Cleans up the content as stored by WordPress so it can be scanned for
/// images and links. The order matters: code blocks are restored on LF
/// content, and escaped lines are decoded after code blocks so entities
/// inside code are decoded only once.
pub fn normalize_content(content: &str) -> String {
    let content = normalize_line_endings(content);
    let content = restore_code_blocks(&content);
    restore_escaped_lines(&content)
}

pub fn normalize_line_endings(content: &str) -> String {
    content.replace("\r\n", "\n")
}

/// Jetpack markdown stores fenced code with its body HTML escaped:
///
/// ~~~text
/// ```rust
/// if a &lt; b {}
/// ```
/// ~~~
pub fn restore_code_blocks(content: &str) -> String {
    lazy_static! {
        static ref CODE_BLOCK_REGEX: Regex = Regex::new(
            r"(?m)^```(?P<lang>[^`\n]+)?\n(?P<body>[^`]+)```"
        ).unwrap();
    }

    let res = CODE_BLOCK_REGEX.replace_all(content, |caps: &Captures| {
        let lang = caps.name("lang").map(|m| m.as_str()).unwrap_or("");
        let body = caps.name("body").map(|m| m.as_str()).unwrap_or("");
        format!("```{}\n{}```", lang, decode_entities(body))
    });
    res.into_owned()
}

/// Raw HTML that ended up escaped, e.g. `&lt;a href="..."&gt;` on its own line
pub fn restore_escaped_lines(content: &str) -> String {
    lazy_static! {
        static ref ESCAPED_LINE_REGEX: Regex = Regex::new(r"(?m)^&lt;.*$").unwrap();
    }

    let res = ESCAPED_LINE_REGEX.replace_all(content, |caps: &Captures| {
        decode_entities(&caps[0])
    });
    res.into_owned()
}
