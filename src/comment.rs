//! Doc-comment parser for `/** ... */` blocks.
//!
//! Unwraps the leading `*` gutter and splits a block into a free-text
//! description followed by `@tag` entries:
//!
//! ```text
//! /**
//!  * Lists pets.
//!  *
//!  * @swagger
//!  * /pets:
//!  *   get:
//!  *     responses:
//!  *       200:
//!  *         description: ok
//!  */
//! ```
//!
//! yields one tag titled `swagger` whose description is the YAML below it,
//! with the common indentation removed.

use regex::Regex;
use std::sync::LazyLock;

static RE_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)/\*\*(.*?)\*/").unwrap());

static RE_GUTTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[ \t]*\*[ ]?").unwrap());

static RE_TAG_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[ \t]*@([A-Za-z_][\w.-]*)(?:[ \t]+(.*))?[ \t]*$").unwrap());

/// One parsed doc-comment block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentBlock {
    /// Text before the first tag.
    pub description: String,
    pub tags: Vec<CommentTag>,
}

/// A single `@title description...` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentTag {
    pub title: String,
    pub description: String,
}

/// Find every `/** ... */` block in `source` and parse its interior.
pub fn scan(source: &str) -> Vec<CommentBlock> {
    RE_BLOCK
        .captures_iter(source)
        .map(|caps| parse(&caps[1]))
        .collect()
}

/// Parse the interior of one block (the text between `/**` and `*/`).
pub fn parse(interior: &str) -> CommentBlock {
    let lines = unwrap_lines(interior);

    let mut description: Vec<&str> = Vec::new();
    let mut tags: Vec<CommentTag> = Vec::new();
    // Title, same-line text, continuation lines
    let mut current: Option<(String, String, Vec<&str>)> = None;

    for &line in &lines {
        if let Some(caps) = RE_TAG_LINE.captures(line) {
            if let Some(tag) = current.take() {
                tags.push(finish_tag(tag));
            }
            let rest = caps.get(2).map(|m| m.as_str().trim_end()).unwrap_or("");
            current = Some((caps[1].to_string(), rest.to_string(), Vec::new()));
            continue;
        }

        match current.as_mut() {
            Some((_, _, body)) => body.push(line),
            None => description.push(line),
        }
    }
    if let Some(tag) = current.take() {
        tags.push(finish_tag(tag));
    }

    CommentBlock {
        description: description.join("\n").trim().to_string(),
        tags,
    }
}

/// Strip the comment gutter from every line of a block interior.
fn unwrap_lines(interior: &str) -> Vec<&str> {
    interior
        .lines()
        .enumerate()
        .map(|(i, line)| {
            let line = match RE_GUTTER.find(line) {
                Some(m) => &line[m.end()..],
                // The first line sits right after `/**`
                None if i == 0 => line.trim_start(),
                None => line,
            };
            line.trim_end()
        })
        .collect()
}

fn finish_tag((title, first, body): (String, String, Vec<&str>)) -> CommentTag {
    let body = dedent(&body);
    let description = match (first.is_empty(), body.is_empty()) {
        (true, _) => body,
        (false, true) => first,
        (false, false) => format!("{}\n{}", first, body),
    };
    CommentTag { title, description }
}

/// Remove the indentation shared by all non-blank lines, then drop leading
/// and trailing blank lines.
fn dedent(lines: &[&str]) -> String {
    let indent = lines
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.len() - l.trim_start().len())
        .min()
        .unwrap_or(0);

    let stripped: Vec<&str> = lines
        .iter()
        .map(|l| match l.get(..indent) {
            Some(prefix) if prefix.trim().is_empty() => &l[indent..],
            _ => l.trim_start(),
        })
        .collect();

    let start = stripped.iter().position(|l| !l.trim().is_empty());
    let end = stripped.iter().rposition(|l| !l.trim().is_empty());
    match (start, end) {
        (Some(s), Some(e)) => stripped[s..=e].join("\n"),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_description_and_tag() {
        let block = parse(
            "\n * Lists pets.\n *\n * @swagger\n * /pets:\n *   get:\n *     summary: list\n ",
        );
        assert_eq!(block.description, "Lists pets.");
        assert_eq!(block.tags.len(), 1);
        assert_eq!(block.tags[0].title, "swagger");
        assert_eq!(block.tags[0].description, "/pets:\n  get:\n    summary: list");
    }

    #[test]
    fn parse_multiple_tags_in_order() {
        let block =
            parse("\n * @deprecated\n * @swagger\n * tag:\n *   name: pets\n * @see other\n");
        let titles: Vec<_> = block.tags.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["deprecated", "swagger", "see"]);
        assert_eq!(block.tags[0].description, "");
        assert_eq!(block.tags[1].description, "tag:\n  name: pets");
        assert_eq!(block.tags[2].description, "other");
    }

    #[test]
    fn parse_block_without_tags() {
        let block = parse("\n * Just prose.\n * More prose.\n");
        assert_eq!(block.description, "Just prose.\nMore prose.");
        assert!(block.tags.is_empty());
    }

    #[test]
    fn parse_single_line_block() {
        let block = parse(" @swagger {} ");
        assert_eq!(block.tags[0].title, "swagger");
        assert_eq!(block.tags[0].description, "{}");
    }

    #[test]
    fn at_sign_inside_text_is_not_a_tag() {
        let block = parse("\n * @swagger\n * /ping:\n *   get:\n *     description: ask @ops\n");
        assert_eq!(block.tags.len(), 1);
        assert!(block.tags[0].description.ends_with("description: ask @ops"));
    }

    #[test]
    fn dedent_keeps_relative_indentation() {
        assert_eq!(dedent(&["", "    a:", "      b: 1", ""]), "a:\n  b: 1");
        assert_eq!(dedent(&[]), "");
    }

    #[test]
    fn scan_finds_every_block() {
        let source = "/** first */\nfunction a() {}\n/* plain */\n/**\n * @swagger\n * {}\n */\n";
        let blocks = scan(source);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].description, "first");
        assert_eq!(blocks[1].tags[0].title, "swagger");
    }
}
