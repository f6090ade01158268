//! Markdown handling for content documents.
//!
//! Two concerns live here:
//!
//! - [`frontmatter`] splits a document into its YAML metadata block and body.
//! - [`MarkdownConverter`] turns Markdown text into HTML.
//!
//! # Block precedence
//!
//! Block rules are tried in a fixed order and the first rule that matches at a
//! position wins. The order is data, not code: [`MarkdownOptions`] carries it as
//! two explicit lists, one for list items and one for the document body and
//! block quotes. Content authored against this converter relies on that order,
//! for example on tables being recognized before raw HTML blocks, so changing
//! the defaults changes rendered output.
//!
//! ```rust
//! use template_finder::markdown::markdown_to_html;
//!
//! assert_eq!(markdown_to_html("**index** file"), "<p><strong>index</strong> file</p>\n");
//! ```

mod block;
pub mod frontmatter;
mod html;
mod inline;

use block::{Block, BlockLexer, ListItem, Table};
use inline::InlineRenderer;

pub use frontmatter::{FrontMatter, split};
pub use html::{escape, escape_link, escape_text};

/// A block-level grammar rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockRule {
    /// One or more blank lines
    Newline,
    /// Lines indented by four or more spaces
    IndentedCode,
    /// ```` ``` ```` or `~~~` fenced code
    FencedCode,
    /// `# Heading`
    AtxHeading,
    /// A line underlined with `===` or `---`
    SetextHeading,
    /// `---`, `***` or `___`
    HorizontalRule,
    /// Table whose rows start with `|`
    PipeTable,
    /// Table without leading pipes
    BareTable,
    /// `> quoted`
    BlockQuote,
    /// Bulleted or numbered list
    List,
    /// Raw block-level HTML, passed through
    BlockHtml,
    /// `[label]: url "title"`
    LinkDefinition,
    /// Paragraph text
    Paragraph,
    /// Plain text inside a list item
    Text,
}

/// Rules used inside list items.
pub const NESTED_RULES: &[BlockRule] = &[
    BlockRule::Newline,
    BlockRule::IndentedCode,
    BlockRule::FencedCode,
    BlockRule::SetextHeading,
    BlockRule::HorizontalRule,
    BlockRule::PipeTable,
    BlockRule::BareTable,
    BlockRule::BlockQuote,
    BlockRule::List,
    BlockRule::BlockHtml,
    BlockRule::Text,
];

/// Rules used for the document body and inside block quotes.
pub const DOCUMENT_RULES: &[BlockRule] = &[
    BlockRule::Newline,
    BlockRule::IndentedCode,
    BlockRule::FencedCode,
    BlockRule::AtxHeading,
    BlockRule::SetextHeading,
    BlockRule::HorizontalRule,
    BlockRule::PipeTable,
    BlockRule::BareTable,
    BlockRule::BlockQuote,
    BlockRule::List,
    BlockRule::BlockHtml,
    BlockRule::LinkDefinition,
    BlockRule::Paragraph,
];

/// Converter configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkdownOptions {
    /// Precedence for the document body and block quotes
    pub document_rules: Vec<BlockRule>,
    /// Precedence inside list items
    pub nested_rules: Vec<BlockRule>,
    /// Pass inline HTML tags through instead of escaping them
    pub inline_html: bool,
    /// Pass HTML blocks through instead of escaping them
    pub block_html: bool,
}

impl Default for MarkdownOptions {
    fn default() -> Self {
        Self {
            document_rules: DOCUMENT_RULES.to_vec(),
            nested_rules: NESTED_RULES.to_vec(),
            inline_html: true,
            block_html: true,
        }
    }
}

/// Markdown to HTML converter.
///
/// The converter holds only its options; every call to [`convert`] builds its
/// own lexer state, so one converter can be shared across threads.
///
/// [`convert`]: MarkdownConverter::convert
#[derive(Debug, Clone, Default)]
pub struct MarkdownConverter {
    options: MarkdownOptions,
}

impl MarkdownConverter {
    #[must_use]
    pub const fn new(options: MarkdownOptions) -> Self {
        Self {
            options,
        }
    }

    #[must_use]
    pub const fn options(&self) -> &MarkdownOptions {
        &self.options
    }

    /// Convert `text` to HTML.
    #[must_use]
    pub fn convert(&self, text: &str) -> String {
        let mut lexer = BlockLexer::new(&self.options.document_rules, &self.options.nested_rules);
        let blocks = lexer.tokenize(text);
        let definitions = lexer.into_definitions();

        let mut writer = BlockWriter {
            inline: InlineRenderer::new(&definitions, self.options.inline_html),
            block_html: self.options.block_html,
            out: String::with_capacity(text.len() * 2),
        };
        writer.blocks(&blocks, true);
        writer.out
    }
}

/// Convert `text` with the default options.
#[must_use]
pub fn markdown_to_html(text: &str) -> String {
    MarkdownConverter::default().convert(text)
}

struct BlockWriter<'a> {
    inline: InlineRenderer<'a>,
    block_html: bool,
    out: String,
}

impl BlockWriter<'_> {
    fn blocks(&mut self, blocks: &[Block], loose: bool) {
        for block in blocks {
            self.block(block, loose);
        }
    }

    fn block(&mut self, block: &Block, loose: bool) {
        match block {
            Block::Paragraph(text) => self.paragraph(text),
            Block::Text(text) if loose => self.paragraph(text),
            Block::Text(text) => {
                let html = self.inline.render(text);
                self.out.push_str(&html);
            }
            Block::Heading {
                level,
                text,
            } => {
                let html = self.inline.render(text);
                self.out.push_str(&format!("<h{level}>{html}</h{level}>\n"));
            }
            Block::Rule => self.out.push_str("<hr>\n"),
            Block::Code {
                lang,
                code,
            } => self.code(lang.as_deref(), code),
            Block::Table(table) => self.table(table),
            Block::Quote(inner) => {
                let start = self.out.len();
                self.blocks(inner, true);
                let body = self.out.split_off(start);
                self.out.push_str(&format!("<blockquote>{}\n</blockquote>\n", body.trim_end_matches('\n')));
            }
            Block::List {
                ordered,
                items,
            } => self.list(*ordered, items),
            Block::Html(raw) if self.block_html => {
                self.out.push_str(raw);
                self.out.push('\n');
            }
            Block::Html(raw) => self.out.push_str(&format!("<p>{}</p>\n", escape_text(raw))),
        }
    }

    fn paragraph(&mut self, text: &str) {
        let html = self.inline.render(text);
        self.out.push_str(&format!("<p>{}</p>\n", html.trim_matches(' ')));
    }

    fn code(&mut self, lang: Option<&str>, code: &str) {
        let code = code.trim_end_matches('\n');
        match lang {
            Some(lang) => self.out.push_str(&format!(
                "<pre><code class=\"lang-{}\">{}\n</code></pre>\n",
                escape(lang, true, false),
                escape(code, true, false)
            )),
            None => self
                .out
                .push_str(&format!("<pre><code>{}\n</code></pre>\n", escape(code, false, false))),
        }
    }

    fn table(&mut self, table: &Table) {
        self.out.push_str("<table>\n<thead><tr>\n");
        for (i, cell) in table.header.iter().enumerate() {
            self.cell("th", cell, table.align.get(i).copied().flatten());
        }
        self.out.push_str("</tr>\n</thead>\n<tbody>\n");
        for row in &table.rows {
            self.out.push_str("<tr>\n");
            for (i, cell) in row.iter().enumerate() {
                self.cell("td", cell, table.align.get(i).copied().flatten());
            }
            self.out.push_str("</tr>\n");
        }
        self.out.push_str("</tbody>\n</table>\n");
    }

    fn cell(&mut self, tag: &str, text: &str, align: Option<block::Align>) {
        let html = self.inline.render(text);
        match align {
            Some(align) => self.out.push_str(&format!(
                "<{tag} style=\"text-align:{}\">{html}</{tag}>\n",
                align.as_css()
            )),
            None => self.out.push_str(&format!("<{tag}>{html}</{tag}>\n")),
        }
    }

    fn list(&mut self, ordered: bool, items: &[ListItem]) {
        let tag = if ordered { "ol" } else { "ul" };
        self.out.push_str(&format!("<{tag}>\n"));
        for item in items {
            self.out.push_str("<li>");
            self.blocks(&item.blocks, item.loose);
            self.out.push_str("</li>\n");
        }
        self.out.push_str(&format!("</{tag}>\n"));
    }
}
