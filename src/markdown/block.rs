//! Block-level lexing.
//!
//! The lexer walks the input line by line. At each position it tries the
//! configured [`BlockRule`]s in order and takes the first one that matches, so
//! the rule list is the grammar's precedence. Block quotes are lexed with the
//! document rules and list items with the nested rules.
//!
//! Quotes and lists nest at most [`MAX_NESTING`] levels deep. Deeper markers
//! are kept as paragraph text.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use super::BlockRule;

static FENCE_OPEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^ {0,3}(`{3,}|~{3,})[ \t]*([^`\s]*)[^\n]*$").expect("valid fence regex")
});
static ATX_HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^ *(#{1,6}) *(.+?) *#* *$").expect("valid heading regex")
});
static SETEXT_UNDERLINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ *(=+|-+) *$").expect("valid setext regex"));
static HORIZONTAL_RULE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ {0,3}[-*_](?: *[-*_]){2,} *$").expect("valid rule regex"));
static PIPE_TABLE_ROW: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ *\|.+$").expect("valid table regex"));
static PIPE_TABLE_ALIGN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ *\|( *[-:]+[-| :]*)$").expect("valid table regex"));
static BARE_TABLE_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ *\S.*\|.*$").expect("valid table regex"));
static BARE_TABLE_ALIGN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ *[-:]+ *\|[-| :]*$").expect("valid table regex"));
static QUOTE_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ *>").expect("valid quote regex"));
static QUOTE_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ *> ?").expect("valid quote regex"));
static LIST_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^( *)([*+-]|\d+\.)( +|$)").expect("valid list regex")
});
static BLOCK_HTML_OPEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^ {0,3}<(!--|/?([A-Za-z][A-Za-z0-9-]*)(?:[\s/>]|$))").expect("valid html regex")
});
static LINK_DEFINITION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^ *\[([^^\]]+)\]: *<?([^\s>]+)>?(?: +["(]([^\n]+)[")])? *$"#)
        .expect("valid definition regex")
});

/// Deepest block quote or list nesting the lexer descends into.
pub const MAX_NESTING: usize = 32;

/// Tags that never start an HTML block; lines opening with them are inline.
const INLINE_TAGS: &[&str] = &[
    "a", "em", "strong", "small", "s", "cite", "q", "dfn", "abbr", "data", "time", "code", "var",
    "samp", "kbd", "sub", "sup", "i", "b", "u", "mark", "ruby", "rt", "rp", "bdi", "bdo", "span",
    "br", "wbr", "ins", "del", "img", "font",
];

/// Column alignment of a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

impl Align {
    pub const fn as_css(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub align: Vec<Option<Align>>,
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItem {
    pub loose: bool,
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Code {
        lang: Option<String>,
        code: String,
    },
    Heading {
        level: usize,
        text: String,
    },
    Rule,
    Table(Table),
    Quote(Vec<Block>),
    List {
        ordered: bool,
        items: Vec<ListItem>,
    },
    Html(String),
    Paragraph(String),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkDefinition {
    pub url: String,
    pub title: Option<String>,
}

/// Reference-style link targets keyed by lowercased label.
pub type LinkDefinitions = HashMap<String, LinkDefinition>;

/// Normalizes a reference label the way definitions are keyed.
pub fn definition_key(label: &str) -> String {
    label.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

type RuleMatch = Option<(Option<Block>, usize)>;

pub struct BlockLexer<'a> {
    document_rules: &'a [BlockRule],
    nested_rules: &'a [BlockRule],
    definitions: LinkDefinitions,
    depth: usize,
}

impl<'a> BlockLexer<'a> {
    pub fn new(document_rules: &'a [BlockRule], nested_rules: &'a [BlockRule]) -> Self {
        Self {
            document_rules,
            nested_rules,
            definitions: LinkDefinitions::new(),
            depth: 0,
        }
    }

    /// Lex a whole document with the document rules.
    pub fn tokenize(&mut self, text: &str) -> Vec<Block> {
        let text = preprocess(text);
        self.parse(&text, self.document_rules)
    }

    pub fn into_definitions(self) -> LinkDefinitions {
        self.definitions
    }

    fn parse(&mut self, text: &str, rules: &[BlockRule]) -> Vec<Block> {
        let lines: Vec<&str> = text.split('\n').collect();
        let mut blocks = Vec::new();
        let mut pos = 0;

        'lines: while pos < lines.len() {
            let rest = &lines[pos..];
            for rule in rules {
                if let Some((block, consumed)) = self.apply(*rule, rest) {
                    blocks.extend(block);
                    pos += consumed.max(1);
                    continue 'lines;
                }
            }

            // No rule claimed the line: keep it as text so the lexer always advances.
            if !is_blank(rest[0]) {
                blocks.push(Block::Text(rest[0].trim().to_string()));
            }
            pos += 1;
        }

        blocks
    }

    fn apply(&mut self, rule: BlockRule, lines: &[&str]) -> RuleMatch {
        match rule {
            BlockRule::Newline => newline(lines),
            BlockRule::IndentedCode => indented_code(lines),
            BlockRule::FencedCode => fenced_code(lines),
            BlockRule::AtxHeading => atx_heading(lines),
            BlockRule::SetextHeading => setext_heading(lines),
            BlockRule::HorizontalRule => {
                HORIZONTAL_RULE.is_match(lines[0]).then_some((Some(Block::Rule), 1))
            }
            BlockRule::PipeTable => pipe_table(lines),
            BlockRule::BareTable => bare_table(lines),
            BlockRule::BlockQuote => self.block_quote(lines),
            BlockRule::List => self.list(lines),
            BlockRule::BlockHtml => block_html(lines),
            BlockRule::LinkDefinition => self.link_definition(lines),
            BlockRule::Paragraph => {
                paragraph_lines(lines).map(|(text, n)| (Some(Block::Paragraph(text)), n))
            }
            BlockRule::Text => paragraph_lines(lines).map(|(text, n)| (Some(Block::Text(text)), n)),
        }
    }

    fn block_quote(&mut self, lines: &[&str]) -> RuleMatch {
        if self.depth >= MAX_NESTING || !QUOTE_LINE.is_match(lines[0]) {
            return None;
        }

        let mut end = 0;
        loop {
            while end < lines.len() && !is_blank(lines[end]) {
                end += 1;
            }
            let next = next_non_blank(lines, end);
            match next {
                Some(k) if QUOTE_LINE.is_match(lines[k]) => end = k,
                _ => break,
            }
        }

        let inner: Vec<String> =
            lines[..end].iter().map(|line| QUOTE_PREFIX.replace(line, "").into_owned()).collect();
        let blocks = self.parse_nested(&inner.join("\n"), self.document_rules);
        Some((Some(Block::Quote(blocks)), end))
    }

    fn list(&mut self, lines: &[&str]) -> RuleMatch {
        if self.depth >= MAX_NESTING {
            return None;
        }
        let first = LIST_MARKER.captures(lines[0])?;
        let base_indent = first[1].len();
        let ordered = first[2].ends_with('.');

        // Find where the list block ends.
        let mut end = 1;
        while end < lines.len() {
            let line = lines[end];
            if is_blank(line) {
                match next_non_blank(lines, end) {
                    Some(k) if indent_of(lines[k]) > base_indent
                        || is_item_start(lines[k], base_indent) =>
                    {
                        end = k;
                        continue;
                    }
                    _ => break,
                }
            }
            if HORIZONTAL_RULE.is_match(line) {
                break;
            }
            end += 1;
        }

        // Split into items at markers with the list's own indentation.
        let mut starts: Vec<usize> =
            (0..end).filter(|&i| is_item_start(lines[i], base_indent)).collect();
        starts.push(end);

        let mut items = Vec::new();
        let mut previous_ended_blank = false;
        let item_count = starts.len() - 1;
        for (n, window) in starts.windows(2).enumerate() {
            let item_lines = &lines[window[0]..window[1]];
            let is_last = n + 1 == item_count;
            let (text, inner_blank, ends_blank) = strip_item(item_lines);

            let mut loose = previous_ended_blank || inner_blank;
            if !is_last && ends_blank {
                loose = true;
            }
            previous_ended_blank = !is_last && ends_blank;

            let blocks = self.parse_nested(&text, self.nested_rules);
            items.push(ListItem {
                loose,
                blocks,
            });
        }

        Some((
            Some(Block::List {
                ordered,
                items,
            }),
            end,
        ))
    }

    fn parse_nested(&mut self, text: &str, rules: &[BlockRule]) -> Vec<Block> {
        self.depth += 1;
        let blocks = self.parse(text, rules);
        self.depth -= 1;
        blocks
    }

    fn link_definition(&mut self, lines: &[&str]) -> RuleMatch {
        let caps = LINK_DEFINITION.captures(lines[0])?;
        self.definitions.insert(
            definition_key(&caps[1]),
            LinkDefinition {
                url: caps[2].to_string(),
                title: caps.get(3).map(|m| m.as_str().to_string()),
            },
        );
        Some((None, 1))
    }
}

fn preprocess(text: &str) -> String {
    text.replace("\r\n", "\n")
        .replace('\r', "\n")
        .replace('\t', "    ")
        .replace('\u{00a0}', " ")
        .replace('\u{2424}', "\n")
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

fn indent_of(line: &str) -> usize {
    line.len() - line.trim_start_matches(' ').len()
}

fn next_non_blank(lines: &[&str], from: usize) -> Option<usize> {
    (from..lines.len()).find(|&i| !is_blank(lines[i]))
}

fn is_item_start(line: &str, indent: usize) -> bool {
    LIST_MARKER.captures(line).is_some_and(|caps| caps[1].len() == indent)
        && !HORIZONTAL_RULE.is_match(line)
}

/// Remove the marker from an item and dedent its continuation lines.
///
/// Returns the item text, whether a blank line separates content inside the
/// item, and whether the item ends with a blank line.
fn strip_item(lines: &[&str]) -> (String, bool, bool) {
    let Some(caps) = LIST_MARKER.captures(lines[0]) else {
        return (lines.join("\n"), false, false);
    };
    let width = caps[0].len();
    let first = &lines[0][width..];

    let mut stripped = vec![first.to_string()];
    for line in &lines[1..] {
        let remove = indent_of(line).min(width);
        stripped.push(line[remove..].to_string());
    }

    let ends_blank = stripped.len() > 1 && stripped.last().is_some_and(|l| is_blank(l));
    while stripped.len() > 1 && stripped.last().is_some_and(|l| is_blank(l)) {
        stripped.pop();
    }
    let inner_blank = stripped.iter().any(|l| is_blank(l));

    (stripped.join("\n"), inner_blank, ends_blank)
}

fn newline(lines: &[&str]) -> RuleMatch {
    let count = lines.iter().take_while(|line| is_blank(line)).count();
    (count > 0).then_some((None, count))
}

fn indented_code(lines: &[&str]) -> RuleMatch {
    if is_blank(lines[0]) || indent_of(lines[0]) < 4 {
        return None;
    }

    let mut end = 0;
    while end < lines.len() {
        if is_blank(lines[end]) {
            match next_non_blank(lines, end) {
                Some(k) if indent_of(lines[k]) >= 4 => end = k,
                _ => break,
            }
        } else if indent_of(lines[end]) >= 4 {
            end += 1;
        } else {
            break;
        }
    }

    let code = lines[..end]
        .iter()
        .map(|line| &line[indent_of(line).min(4)..])
        .collect::<Vec<_>>()
        .join("\n");
    Some((
        Some(Block::Code {
            lang: None,
            code,
        }),
        end,
    ))
}

fn fenced_code(lines: &[&str]) -> RuleMatch {
    let caps = FENCE_OPEN.captures(lines[0])?;
    let fence = &caps[1];
    let fence_char = fence.chars().next()?;
    let lang = caps.get(2).map(|m| m.as_str()).filter(|l| !l.is_empty()).map(str::to_string);

    let close = lines.iter().enumerate().skip(1).find_map(|(i, line)| {
        let trimmed = line.trim();
        (trimmed.len() >= fence.len() && trimmed.chars().all(|c| c == fence_char)).then_some(i)
    })?;

    let code = lines[1..close].join("\n");
    Some((
        Some(Block::Code {
            lang,
            code,
        }),
        close + 1,
    ))
}

fn atx_heading(lines: &[&str]) -> RuleMatch {
    let caps = ATX_HEADING.captures(lines[0])?;
    Some((
        Some(Block::Heading {
            level: caps[1].len(),
            text: caps[2].to_string(),
        }),
        1,
    ))
}

fn setext_heading(lines: &[&str]) -> RuleMatch {
    if lines.len() < 2 || is_blank(lines[0]) {
        return None;
    }
    let caps = SETEXT_UNDERLINE.captures(lines[1])?;
    let level = if caps[1].starts_with('=') { 1 } else { 2 };
    Some((
        Some(Block::Heading {
            level,
            text: lines[0].trim().to_string(),
        }),
        2,
    ))
}

fn pipe_table(lines: &[&str]) -> RuleMatch {
    if lines.len() < 2 || !PIPE_TABLE_ROW.is_match(lines[0]) {
        return None;
    }
    let align = PIPE_TABLE_ALIGN.captures(lines[1])?;
    let body = lines[2..].iter().take_while(|line| PIPE_TABLE_ROW.is_match(line)).count();

    let table = Table {
        align: parse_alignment(&align[1]),
        header: split_cells(lines[0]),
        rows: lines[2..2 + body].iter().map(|row| split_cells(row)).collect(),
    };
    Some((Some(Block::Table(table)), 2 + body))
}

fn bare_table(lines: &[&str]) -> RuleMatch {
    if lines.len() < 2
        || !BARE_TABLE_HEADER.is_match(lines[0])
        || !BARE_TABLE_ALIGN.is_match(lines[1])
    {
        return None;
    }
    let body = lines[2..]
        .iter()
        .take_while(|line| !is_blank(line) && line.contains('|'))
        .count();

    let table = Table {
        align: parse_alignment(lines[1]),
        header: split_cells(lines[0]),
        rows: lines[2..2 + body].iter().map(|row| split_cells(row)).collect(),
    };
    Some((Some(Block::Table(table)), 2 + body))
}

fn parse_alignment(row: &str) -> Vec<Option<Align>> {
    split_cells(row)
        .iter()
        .map(|cell| {
            let cell = cell.trim();
            match (cell.starts_with(':'), cell.ends_with(':')) {
                (true, true) => Some(Align::Center),
                (true, false) => Some(Align::Left),
                (false, true) => Some(Align::Right),
                (false, false) => None,
            }
        })
        .collect()
}

/// Split a table row on unescaped pipes, dropping the outer pipes.
fn split_cells(row: &str) -> Vec<String> {
    let row = row.trim();
    let row = row.strip_prefix('|').unwrap_or(row);
    let row = match row.strip_suffix('|') {
        Some(inner) if !inner.ends_with('\\') => inner,
        _ => row,
    };

    let mut cells = Vec::new();
    let mut current = String::new();
    let mut escaped = false;
    for c in row.chars() {
        match c {
            '|' if !escaped => cells.push(std::mem::take(&mut current).trim().to_string()),
            c => current.push(c),
        }
        escaped = c == '\\' && !escaped;
    }
    cells.push(current.trim().to_string());
    cells
}

fn block_html(lines: &[&str]) -> RuleMatch {
    let caps = BLOCK_HTML_OPEN.captures(lines[0])?;

    if &caps[1] == "!--" {
        let close = lines.iter().position(|line| line.contains("-->"))?;
        return Some((Some(Block::Html(lines[..=close].join("\n"))), close + 1));
    }

    let tag = caps.get(2)?.as_str().to_ascii_lowercase();
    if INLINE_TAGS.contains(&tag.as_str()) {
        return None;
    }

    let end = lines.iter().position(|line| is_blank(line)).unwrap_or(lines.len());
    Some((Some(Block::Html(lines[..end].join("\n"))), end))
}

fn starts_html_block(line: &str) -> bool {
    BLOCK_HTML_OPEN.captures(line).is_some_and(|caps| {
        &caps[1] == "!--"
            || caps
                .get(2)
                .is_some_and(|tag| !INLINE_TAGS.contains(&tag.as_str().to_ascii_lowercase().as_str()))
    })
}

/// Lines that end a running paragraph without a blank line in between.
fn interrupts_paragraph(lines: &[&str], i: usize) -> bool {
    let line = lines[i];
    HORIZONTAL_RULE.is_match(line)
        || ATX_HEADING.is_match(line)
        || FENCE_OPEN.is_match(line)
        || QUOTE_LINE.is_match(line)
        || LIST_MARKER.is_match(line)
        || LINK_DEFINITION.is_match(line)
        || starts_html_block(line)
        || lines.get(i + 1).is_some_and(|next| SETEXT_UNDERLINE.is_match(next))
}

fn paragraph_lines(lines: &[&str]) -> Option<(String, usize)> {
    if is_blank(lines[0]) {
        return None;
    }

    let mut end = 1;
    while end < lines.len() && !is_blank(lines[end]) && !interrupts_paragraph(lines, end) {
        end += 1;
    }

    let text = lines[..end].join("\n");
    Some((text.trim_matches(' ').to_string(), end))
}
