//! Span-level rendering inside paragraphs, headings, table cells and list text.
//!
//! Rules are tried at each position in a fixed order (escape, inline HTML,
//! autolink, link, reference link, bare URL, strong, emphasis, code span,
//! line break, strikethrough) and anything no rule claims is emitted as
//! escaped text up to the next character that could start a rule.
//!
//! Every call to [`InlineRenderer::render`] pairs brackets once and remembers
//! which closing-delimiter searches failed and where. A later search that can
//! only fail the same way is skipped, so rendering stays linear in the length
//! of the text. Nested spans stop at [`MAX_NESTING`] levels; deeper markup is
//! rendered as text.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;

use super::block::{LinkDefinitions, MAX_NESTING, definition_key};
use super::html::{escape, escape_link, escape_text};

static INLINE_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:<!--[\s\S]*?-->|</?([A-Za-z][A-Za-z0-9-]*)(?:\s+[^<>]*?)?\s*/?>)")
        .expect("valid inline tag regex")
});
static AUTOLINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^<([^ <>]+(@|:)[^ <>]+)>").expect("valid autolink regex"));
static BARE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^https?://[^\s<]+[^<.,:;"')\]\s]"#).expect("valid url regex")
});

const ESCAPABLE: &str = "\\`*{}[]()#+-.!_>~|";

/// Longest label looked up as a link reference.
const MAX_LABEL_LEN: usize = 999;

type Token = Option<(String, usize)>;

/// Closing-delimiter searches whose failure from one offset implies failure
/// from every later offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Scan {
    Strong(char),
    Strikethrough,
    CodeSpan(usize),
    LinkTitle,
}

/// Characters that end a link destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Stop {
    UrlEnd,
    AngleClose,
}

impl Stop {
    fn matches(self, c: char) -> bool {
        match self {
            Self::UrlEnd => c.is_whitespace() || c == ')',
            Self::AngleClose => c == '>',
        }
    }
}

/// Per-text lookup tables shared by the rules of one `render` call.
struct Scanned {
    /// Offset of each matched `[` to the offset just past its `]`.
    brackets: HashMap<usize, usize>,
    /// Offset of the last `-->`.
    last_comment_close: Option<usize>,
    /// Smallest offset a search has failed from, per search.
    exhausted: HashMap<Scan, usize>,
    /// Offsets visited by emphasis searches that failed, per delimiter.
    dead_emphasis: HashSet<(char, usize)>,
    /// Last lookup per stop: the offset searched from and what was found.
    stops: HashMap<Stop, (usize, Option<usize>)>,
}

impl Scanned {
    fn new(text: &str) -> Self {
        Self {
            brackets: pair_brackets(text),
            last_comment_close: text.rfind("-->"),
            exhausted: HashMap::new(),
            dead_emphasis: HashSet::new(),
            stops: HashMap::new(),
        }
    }

    fn is_exhausted(&self, scan: Scan, at: usize) -> bool {
        self.exhausted.get(&scan).is_some_and(|&from| at >= from)
    }

    fn exhaust(&mut self, scan: Scan, at: usize) {
        let from = self.exhausted.entry(scan).or_insert(at);
        *from = (*from).min(at);
    }

    /// Length of the bracket group opening at `at`, if its `[` is matched.
    fn bracket(&self, at: usize) -> Option<usize> {
        self.brackets.get(&at).map(|close| close - at)
    }

    /// Distance from `at` to the first `stop` character in `tail`, the text
    /// from `at` to the end.
    fn next_stop(&mut self, stop: Stop, tail: &str, at: usize) -> Option<usize> {
        if let Some(&(from, found)) = self.stops.get(&stop)
            && from <= at
            && found.is_none_or(|end| at <= end)
        {
            return found.map(|end| end - at);
        }

        let found = tail.find(|c: char| stop.matches(c)).map(|len| at + len);
        self.stops.insert(stop, (at, found));
        found.map(|end| end - at)
    }
}

/// Match brackets with a stack; backslash-escaped brackets are skipped.
fn pair_brackets(text: &str) -> HashMap<usize, usize> {
    let mut pairs = HashMap::new();
    let mut open = Vec::new();
    let mut escaped = false;

    for (k, c) in text.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '[' => open.push(k),
            ']' => {
                if let Some(start) = open.pop() {
                    pairs.insert(start, k + 1);
                }
            }
            _ => {}
        }
    }
    pairs
}

pub struct InlineRenderer<'a> {
    definitions: &'a LinkDefinitions,
    allow_html: bool,
    in_link: bool,
    depth: usize,
}

impl<'a> InlineRenderer<'a> {
    pub fn new(definitions: &'a LinkDefinitions, allow_html: bool) -> Self {
        Self {
            definitions,
            allow_html,
            in_link: false,
            depth: 0,
        }
    }

    pub fn render(&mut self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut scanned = Scanned::new(text);
        let mut pos = 0;

        while pos < text.len() {
            let prev = text[..pos].chars().next_back();
            let (html, consumed) = self.next_token(&text[pos..], pos, prev, &mut scanned);
            out.push_str(&html);
            pos += consumed;
        }

        out
    }

    fn nested(&mut self, text: &str) -> String {
        self.depth += 1;
        let html = self.render(text);
        self.depth -= 1;
        html
    }

    const fn can_nest(&self) -> bool {
        self.depth < MAX_NESTING
    }

    fn next_token(
        &mut self,
        rest: &str,
        pos: usize,
        prev: Option<char>,
        scanned: &mut Scanned,
    ) -> (String, usize) {
        let token = match rest.as_bytes()[0] {
            b'\\' => escaped_char(rest),
            b'<' => self.inline_html(rest, pos, scanned).or_else(|| autolink(rest)),
            b'!' | b'[' => {
                self.link(rest, pos, scanned).or_else(|| self.reference_link(rest, pos, scanned))
            }
            b'h' => self.bare_url(rest),
            b'*' | b'_' => self
                .strong(rest, pos, scanned)
                .or_else(|| self.emphasis(rest, pos, prev, scanned)),
            b'`' => code_span(rest, pos, scanned),
            b' ' => line_break(rest),
            b'~' => self.strikethrough(rest, pos, scanned),
            _ => None,
        };
        token.unwrap_or_else(|| text_run(rest))
    }

    fn inline_html(&mut self, rest: &str, pos: usize, scanned: &Scanned) -> Token {
        if rest.starts_with("<!--") && scanned.last_comment_close.is_none_or(|close| close < pos + 4)
        {
            return None;
        }

        let caps = INLINE_TAG.captures(rest)?;
        let raw = caps.get(0)?.as_str();

        if !self.allow_html {
            return Some((escape_text(raw), raw.len()));
        }
        if caps.get(1).is_some_and(|tag| tag.as_str().eq_ignore_ascii_case("a")) {
            self.in_link = !raw.starts_with("</");
        }
        Some((raw.to_string(), raw.len()))
    }

    fn link(&mut self, rest: &str, pos: usize, scanned: &mut Scanned) -> Token {
        let is_image = rest.starts_with('!');
        if self.in_link && !is_image {
            return None;
        }

        let offset = usize::from(is_image);
        let after_label = offset + scanned.bracket(pos + offset)?;
        let label = &rest[offset + 1..after_label - 1];
        let target = rest[after_label..].strip_prefix('(')?;
        let (url, title, used) = link_target(target, pos + after_label + 1, scanned)?;

        let html = self.render_link(is_image, label, url, title);
        Some((html, after_label + 1 + used))
    }

    fn reference_link(&mut self, rest: &str, pos: usize, scanned: &Scanned) -> Token {
        let is_image = rest.starts_with('!');
        if self.in_link && !is_image {
            return None;
        }

        let offset = usize::from(is_image);
        let mut end = offset + scanned.bracket(pos + offset)?;
        let label = &rest[offset + 1..end - 1];
        let mut key = label;

        let after = &rest[end..];
        let gap = after.len() - after.trim_start().len();
        if after[gap..].starts_with('[')
            && let Some(close) = after[gap..].find(']')
        {
            let reference = &after[gap + 1..gap + close];
            if !reference.is_empty() {
                key = reference;
            }
            end += gap + close + 1;
        }

        if self.definitions.is_empty() || key.len() > MAX_LABEL_LEN {
            return None;
        }
        let definitions = self.definitions;
        let definition = definitions.get(&definition_key(key))?;
        let html = self.render_link(is_image, label, &definition.url, definition.title.as_deref());
        Some((html, end))
    }

    fn render_link(&mut self, is_image: bool, label: &str, url: &str, title: Option<&str>) -> String {
        let title_attr = title
            .filter(|t| !t.is_empty())
            .map(|t| format!(" title=\"{}\"", escape(t, true, false)))
            .unwrap_or_default();

        if is_image {
            return format!(
                "<img src=\"{}\" alt=\"{}\"{}>",
                escape_link(url),
                escape(label, true, false),
                title_attr
            );
        }

        let text = if self.can_nest() {
            self.in_link = true;
            let text = self.nested(label);
            self.in_link = false;
            text
        } else {
            escape_text(label)
        };
        format!("<a href=\"{}\"{}>{}</a>", escape_link(url), title_attr, text)
    }

    fn bare_url(&self, rest: &str) -> Token {
        let url = BARE_URL.find(rest)?.as_str();
        if self.in_link {
            return Some((escape_text(url), url.len()));
        }
        let href = escape_link(url);
        Some((format!("<a href=\"{href}\">{href}</a>"), url.len()))
    }

    fn strong(&mut self, rest: &str, pos: usize, scanned: &mut Scanned) -> Token {
        let delim = rest.chars().next()?;
        if !self.can_nest() || scanned.is_exhausted(Scan::Strong(delim), pos) {
            return None;
        }
        let marker = if delim == '*' { "**" } else { "__" };
        let body = rest.strip_prefix(marker)?;
        let first = body.chars().next()?.len_utf8();

        let found = body
            .char_indices()
            .map(|(k, _)| k)
            .filter(|&k| k >= first)
            .find(|&k| body[k..].starts_with(marker) && !body[k + 2..].starts_with(delim));
        let Some(end) = found else {
            scanned.exhaust(Scan::Strong(delim), pos);
            return None;
        };

        let inner = self.nested(&body[..end]);
        Some((format!("<strong>{inner}</strong>"), end + 4))
    }

    fn emphasis(&mut self, rest: &str, pos: usize, prev: Option<char>, scanned: &mut Scanned) -> Token {
        let delim = rest.chars().next()?;
        if delim == '_' && prev.is_some_and(is_word_char) {
            return None;
        }
        if !self.can_nest() {
            return None;
        }

        // Where the scan goes next depends only on the offset it is at, so an
        // offset a failed scan passed through fails again.
        let body = &rest[1..];
        let mut visited = Vec::new();
        let mut k = 0;
        while k < body.len() {
            let at = pos + 1 + k;
            if scanned.dead_emphasis.contains(&(delim, at)) {
                break;
            }
            visited.push(at);

            let tail = &body[k..];
            if tail.starts_with(delim) {
                let next = tail[1..].chars().next();
                let doubled = next == Some(delim);
                let closes = !doubled && (delim == '*' || !next.is_some_and(is_word_char));
                if k > 0 && closes {
                    let inner = self.nested(&body[..k]);
                    return Some((format!("<em>{inner}</em>"), k + 2));
                }
                if !doubled {
                    break;
                }
                k += 2;
                continue;
            }
            k += tail.chars().next().map_or(1, char::len_utf8);
        }

        scanned.dead_emphasis.extend(visited.into_iter().map(|at| (delim, at)));
        None
    }

    fn strikethrough(&mut self, rest: &str, pos: usize, scanned: &mut Scanned) -> Token {
        if !self.can_nest() || scanned.is_exhausted(Scan::Strikethrough, pos) {
            return None;
        }
        let body = rest.strip_prefix("~~")?;
        if body.is_empty() || body.starts_with(char::is_whitespace) {
            return None;
        }

        let found = body
            .char_indices()
            .map(|(k, _)| k)
            .find(|&k| k > 0 && body[k..].starts_with("~~") && !body[..k].ends_with(char::is_whitespace));
        let Some(end) = found else {
            scanned.exhaust(Scan::Strikethrough, pos);
            return None;
        };

        let inner = self.nested(&body[..end]);
        Some((format!("<del>{inner}</del>"), end + 4))
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn escaped_char(rest: &str) -> Token {
    let c = rest[1..].chars().next()?;
    ESCAPABLE.contains(c).then(|| (escape_text(&c.to_string()), 1 + c.len_utf8()))
}

fn autolink(rest: &str) -> Token {
    let caps = AUTOLINK.captures(rest)?;
    let text = &caps[1];
    let href = if &caps[2] == "@" && !text.starts_with("mailto:") {
        format!("mailto:{text}")
    } else {
        text.to_string()
    };
    let html = format!("<a href=\"{}\">{}</a>", escape_link(&href), escape_link(text));
    Some((html, caps[0].len()))
}

fn code_span(rest: &str, pos: usize, scanned: &mut Scanned) -> Token {
    let ticks = rest.len() - rest.trim_start_matches('`').len();
    if scanned.is_exhausted(Scan::CodeSpan(ticks), pos) {
        return None;
    }
    let body = &rest[ticks..];

    let mut k = 0;
    while let Some(offset) = body[k..].find('`') {
        let start = k + offset;
        let run = body[start..].len() - body[start..].trim_start_matches('`').len();
        if run == ticks {
            let code = body[..start].trim();
            if code.is_empty() {
                return None;
            }
            let html = format!("<code>{}</code>", escape(code, false, false));
            return Some((html, ticks + start + run));
        }
        k = start + run;
    }

    scanned.exhaust(Scan::CodeSpan(ticks), pos);
    None
}

fn line_break(rest: &str) -> Token {
    let spaces = rest.len() - rest.trim_start_matches(' ').len();
    if spaces < 2 {
        return None;
    }
    let after = rest[spaces..].strip_prefix('\n')?;
    if after.trim().is_empty() {
        return None;
    }
    Some(("<br>\n".to_string(), spaces + 1))
}

fn text_run(rest: &str) -> (String, usize) {
    let end = rest
        .char_indices()
        .skip(1)
        .find(|&(k, c)| starts_rule(&rest[k..], c))
        .map_or(rest.len(), |(k, _)| k);
    (escape_text(&rest[..end]), end)
}

fn starts_rule(rest: &str, c: char) -> bool {
    match c {
        '\\' | '<' | '!' | '[' | '_' | '*' | '`' | '~' => true,
        'h' => rest.starts_with("http://") || rest.starts_with("https://"),
        ' ' => {
            let after = rest.trim_start_matches(' ');
            rest.len() - after.len() >= 2 && after.starts_with('\n')
        }
        _ => false,
    }
}

/// Parse `url "title")` after the opening parenthesis of an inline link.
///
/// `pos` is the offset of `target` in the text being rendered.
fn link_target<'t>(
    target: &'t str,
    pos: usize,
    scanned: &mut Scanned,
) -> Option<(&'t str, Option<&'t str>, usize)> {
    let mut used = target.len() - target.trim_start().len();

    let url = if let Some(angled) = target[used..].strip_prefix('<') {
        let close = scanned.next_stop(Stop::AngleClose, angled, pos + used + 1)?;
        used += close + 2;
        &angled[..close]
    } else {
        let len = scanned
            .next_stop(Stop::UrlEnd, &target[used..], pos + used)
            .unwrap_or(target.len() - used);
        let url = &target[used..used + len];
        used += len;
        url
    };

    let mut title = None;
    let gap = target[used..].len() - target[used..].trim_start().len();
    let after = &target[used + gap..];
    if gap > 0 && (after.starts_with('"') || after.starts_with('\'')) {
        let at = pos + used + gap;
        if scanned.is_exhausted(Scan::LinkTitle, at) {
            return None;
        }
        let found = after
            .char_indices()
            .filter(|&(_, c)| c == ')')
            .map(|(k, _)| k)
            .find(|&k| {
                let inner = after[..k].trim_end();
                inner.len() >= 2 && (inner.ends_with('"') || inner.ends_with('\''))
            });
        let Some(end) = found else {
            scanned.exhaust(Scan::LinkTitle, at);
            return None;
        };
        let inner = after[..end].trim_end();
        title = Some(&inner[1..inner.len() - 1]);
        used += gap + end;
    }

    let tail = &target[used..];
    let gap = tail.len() - tail.trim_start().len();
    tail[gap..].starts_with(')').then_some((url, title, used + gap + 1))
}
