//! Mustache - JSON view に対する logic-less テンプレート
//!
//! # 対応タグ
//! - `{{name}}`: HTML エスケープして出力
//! - `{{{name}}}` / `{{& name}}`: エスケープなしで出力
//! - `{{#name}}...{{/name}}`: セクション（配列は要素ごと、truthy 値は 1 回）
//! - `{{^name}}...{{/name}}`: 反転セクション（falsy または空配列のとき）
//! - `{{! comment}}`: 何も出力しない
//! - `{{> partial}}`: partial は登録できないので何も出力しない
//! - `{{=<% %>=}}`: 以降のデリミタを変更
//!
//! # 実装詳細
//! - 一度 tokenize して `Node` の木を作り、その木を view に対して描画する
//! - リテラルは元テキストの範囲 (`Range<usize>`) で持つ
//! - セクション系タグだけが行にある場合 (standalone)、その行ごと出力から消える

use std::ops::Range;

use serde_json::Value;
use thiserror::Error;

/// テンプレートの構文エラー（位置はバイトオフセット）
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("template delimiters must not be empty")]
    EmptyDelimiter,

    #[error("unclosed tag at byte {0}")]
    UnclosedTag(usize),

    #[error("unclosed section '{0}'")]
    UnclosedSection(String),

    #[error("unopened section '{name}' at byte {at}")]
    UnopenedSection { name: String, at: usize },

    #[error("section '{open}' closed by '{close}' at byte {at}")]
    MismatchedSection {
        open: String,
        close: String,
        at: usize,
    },

    #[error("invalid set-delimiter tag at byte {0}")]
    InvalidDelimiters(usize),
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Text(Range<usize>),
    Var {
        name: String,
        escape: bool,
    },
    Section {
        name: String,
        inverted: bool,
        children: Vec<Node>,
    },
}

/// Compiled は parse 済みのテンプレート（元テキストを借用する）
#[derive(Debug)]
pub struct Compiled<'a> {
    source: &'a str,
    nodes: Vec<Node>,
}

/// `source` を `open` / `close` デリミタで parse する
pub fn compile<'a>(source: &'a str, open: &str, close: &str) -> Result<Compiled<'a>, TemplateError> {
    Ok(Compiled {
        source,
        nodes: parse(source, open, close)?,
    })
}

/// parse して即座に描画する
pub fn render(source: &str, open: &str, close: &str, view: &Value) -> Result<String, TemplateError> {
    Ok(compile(source, open, close)?.render(view))
}

impl Compiled<'_> {
    pub fn render(&self, view: &Value) -> String {
        let mut out = String::with_capacity(self.source.len());
        let mut stack = vec![view];
        self.render_nodes(&self.nodes, &mut stack, &mut out);
        out
    }

    fn render_nodes<'v>(&self, nodes: &[Node], stack: &mut Vec<&'v Value>, out: &mut String) {
        for node in nodes {
            match node {
                Node::Text(range) => out.push_str(&self.source[range.clone()]),
                Node::Var { name, escape } => {
                    let text = lookup(stack, name).map(display).unwrap_or_default();
                    if *escape {
                        escape_html(&text, out);
                    } else {
                        out.push_str(&text);
                    }
                }
                Node::Section {
                    name,
                    inverted: true,
                    children,
                } => {
                    if !is_truthy(lookup(stack, name)) {
                        self.render_nodes(children, stack, out);
                    }
                }
                Node::Section { name, children, .. } => match lookup(stack, name) {
                    Some(Value::Array(items)) => {
                        for item in items {
                            stack.push(item);
                            self.render_nodes(children, stack, out);
                            stack.pop();
                        }
                    }
                    Some(Value::Bool(true)) => self.render_nodes(children, stack, out),
                    Some(value) if is_truthy(Some(value)) => {
                        stack.push(value);
                        self.render_nodes(children, stack, out);
                        stack.pop();
                    }
                    _ => {}
                },
            }
        }
    }
}

enum Kind {
    Var { escape: bool },
    Section { inverted: bool },
    Close,
    Comment,
    Partial,
    Delimiters(String, String),
}

impl Kind {
    fn can_stand_alone(&self) -> bool {
        !matches!(self, Kind::Var { .. })
    }
}

struct Tag {
    kind: Kind,
    name: String,
    /// タグ直後のバイト位置
    end: usize,
}

struct Frame {
    name: String,
    inverted: bool,
    nodes: Vec<Node>,
}

fn parse(source: &str, open: &str, close: &str) -> Result<Vec<Node>, TemplateError> {
    if open.is_empty() || close.is_empty() {
        return Err(TemplateError::EmptyDelimiter);
    }
    let mut open = open.to_string();
    let mut close = close.to_string();

    let mut root = Vec::new();
    let mut stack: Vec<Frame> = Vec::new();
    let mut pos = 0;

    while let Some(found) = source[pos..].find(open.as_str()) {
        let start = pos + found;
        let tag = scan_tag(source, start, &open, &close)?;

        let standalone = tag
            .kind
            .can_stand_alone()
            .then(|| standalone_line(source, start, tag.end))
            .flatten()
            .filter(|(line_start, _)| *line_start >= pos);
        let (text_end, next) = standalone.unwrap_or((start, tag.end));

        if text_end > pos {
            current(&mut stack, &mut root).push(Node::Text(pos..text_end));
        }
        pos = next;

        match tag.kind {
            Kind::Var { escape } => current(&mut stack, &mut root).push(Node::Var {
                name: tag.name,
                escape,
            }),
            Kind::Section { inverted } => stack.push(Frame {
                name: tag.name,
                inverted,
                nodes: Vec::new(),
            }),
            Kind::Close => {
                let frame = stack.pop().ok_or_else(|| TemplateError::UnopenedSection {
                    name: tag.name.clone(),
                    at: start,
                })?;
                if frame.name != tag.name {
                    return Err(TemplateError::MismatchedSection {
                        open: frame.name,
                        close: tag.name,
                        at: start,
                    });
                }
                current(&mut stack, &mut root).push(Node::Section {
                    name: frame.name,
                    inverted: frame.inverted,
                    children: frame.nodes,
                });
            }
            Kind::Comment | Kind::Partial => {}
            Kind::Delimiters(new_open, new_close) => {
                open = new_open;
                close = new_close;
            }
        }
    }

    if pos < source.len() {
        current(&mut stack, &mut root).push(Node::Text(pos..source.len()));
    }
    match stack.pop() {
        Some(frame) => Err(TemplateError::UnclosedSection(frame.name)),
        None => Ok(root),
    }
}

fn current<'s>(stack: &'s mut [Frame], root: &'s mut Vec<Node>) -> &'s mut Vec<Node> {
    match stack.last_mut() {
        Some(frame) => &mut frame.nodes,
        None => root,
    }
}

/// `start` にある開きデリミタから 1 タグ分を読む
fn scan_tag(source: &str, start: usize, open: &str, close: &str) -> Result<Tag, TemplateError> {
    let body_start = start + open.len();
    let body = &source[body_start..];

    // `{{{x}}}` と `{{=a b=}}` は閉じデリミタの前に 1 文字余分に付く
    let closing = match body.trim_start().chars().next() {
        Some('{') => format!("}}{close}"),
        Some('=') => format!("={close}"),
        _ => close.to_string(),
    };
    let found = body
        .find(closing.as_str())
        .ok_or(TemplateError::UnclosedTag(start))?;
    let end = body_start + found + closing.len();

    let inner = body[..found].trim();
    let mut chars = inner.chars();
    let sigil = chars.next();
    let rest = chars.as_str().trim();

    let (kind, name) = match sigil {
        Some('{') | Some('&') => (Kind::Var { escape: false }, rest),
        Some('#') => (Kind::Section { inverted: false }, rest),
        Some('^') => (Kind::Section { inverted: true }, rest),
        Some('/') => (Kind::Close, rest),
        Some('!') => (Kind::Comment, rest),
        Some('>') => (Kind::Partial, rest),
        Some('=') => {
            let mut parts = rest.split_whitespace();
            match (parts.next(), parts.next(), parts.next()) {
                (Some(open), Some(close), None) => {
                    (Kind::Delimiters(open.to_string(), close.to_string()), "")
                }
                _ => return Err(TemplateError::InvalidDelimiters(start)),
            }
        }
        _ => (Kind::Var { escape: true }, inner),
    };

    Ok(Tag {
        kind,
        name: name.to_string(),
        end,
    })
}

/// タグ以外に空白しかない行なら、その行の範囲（改行を含む）を返す
fn standalone_line(source: &str, start: usize, end: usize) -> Option<(usize, usize)> {
    let line_start = source[..start].rfind('\n').map_or(0, |i| i + 1);
    if !is_blank(&source[line_start..start]) {
        return None;
    }
    let rest = &source[end..];
    let (tail, line_end) = match rest.find('\n') {
        Some(i) => (&rest[..i], end + i + 1),
        None => (rest, source.len()),
    };
    is_blank(tail.strip_suffix('\r').unwrap_or(tail)).then_some((line_start, line_end))
}

fn is_blank(text: &str) -> bool {
    text.chars().all(|c| c == ' ' || c == '\t')
}

/// 名前を context stack の上から順に解決する
///
/// ドット区切りの名前は各 view の中で最後まで辿り、null でない値が見つかった
/// 最初の view を採用する。`.` は現在の view そのもの。
fn lookup<'v>(stack: &[&'v Value], name: &str) -> Option<&'v Value> {
    if name == "." {
        return stack.last().copied();
    }
    stack.iter().rev().find_map(|view| {
        name.split('.')
            .try_fold(*view, child)
            .filter(|value| !value.is_null())
    })
}

fn child<'v>(value: &'v Value, key: &str) -> Option<&'v Value> {
    match value {
        Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => value.get(key),
    }
}

/// JS 側の真偽判定: null / false / 0 / "" / 空配列は falsy
fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(items)) => !items.is_empty(),
        Some(Value::Object(_)) => true,
    }
}

fn display(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        // f64 の Display は 2.0 を "2" と書く
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() => f.to_string(),
            _ => n.to_string(),
        },
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(display).collect::<Vec<_>>().join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

fn escape_html(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            '/' => out.push_str("&#x2F;"),
            c => out.push(c),
        }
    }
}
