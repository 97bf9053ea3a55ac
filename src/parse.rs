//! Parse LaTeX markup into AST nodes
//!
//! Two passes: pest pairs become a flat-per-level token list, then argument
//! collection walks each level and attaches arguments to constructs according
//! to the signatures held in the [`MacroRegistry`].
//!
//! Both passes recurse once per nesting level. Nesting is bounded by the same
//! limit the renderer uses, and sources that could nest deeply are parsed on a
//! worker thread whose stack is sized for that limit.

use std::collections::VecDeque;
use std::ops::ControlFlow;
use std::thread;

use miette::SourceSpan;
use pest::Parser;
use pest::error::InputLocation;
use pest::iterators::Pair;

use crate::ast::*;
use crate::errors::{Error, ParseError, RenderError, SourceContext};
use crate::log;
use crate::macros::MacroRegistry;
use crate::render::defaults;
use crate::{LatexParser, Rule};

/// Sources that may nest deeper than this are parsed on a dedicated thread
const INLINE_LEVELS: usize = 64;
/// Worker stack: a fixed base plus an allowance per possible level
const STACK_BASE: usize = 1 << 20;
const STACK_PER_LEVEL: usize = 64 << 10;

/// Parse anonymous markup into a node tree
pub fn parse(source: &str, registry: &MacroRegistry) -> Result<NodeList, Error> {
    parse_source(&SourceContext::anonymous(source), registry)
}

/// Parse markup, naming the source in diagnostics
pub fn parse_source(source: &SourceContext, registry: &MacroRegistry) -> Result<NodeList, Error> {
    parse_bounded(source, registry, defaults::MAX_DEPTH)
}

/// Parse markup whose nesting may not reach `max_depth` levels.
///
/// Deeper input fails with [`RenderError::DepthExceeded`], the same error a
/// render of that tree would raise.
pub fn parse_bounded(source: &SourceContext, registry: &MacroRegistry, max_depth: usize) -> Result<NodeList, Error> {
    let nesting = Nesting::measure(&source.source);
    if nesting.scopes >= max_depth {
        log::debug!("{} nested scopes, limit {}", nesting.scopes, max_depth);
        return Err(RenderError::DepthExceeded { limit: max_depth }.into());
    }

    let levels = nesting.levels().min(max_depth);
    if levels <= INLINE_LEVELS {
        return assemble(source, registry, max_depth);
    }

    log::debug!("parsing on a worker thread, up to {} levels", levels);
    thread::scope(|scope| {
        let worker = thread::Builder::new()
            .name("varitex-parse".into())
            .stack_size(STACK_BASE + levels * STACK_PER_LEVEL)
            .spawn_scoped(scope, || assemble(source, registry, max_depth));
        match worker {
            Ok(handle) => handle.join().unwrap_or_else(|panic| std::panic::resume_unwind(panic)),
            Err(err) => {
                log::warn!("could not spawn parse thread: {}", err);
                assemble(source, registry, max_depth)
            }
        }
    })
}

fn assemble(source: &SourceContext, registry: &MacroRegistry, max_depth: usize) -> Result<NodeList, Error> {
    let pairs = LatexParser::parse(Rule::document, &source.source)
        .map_err(|err| syntax_error(err, source))?;

    let tokens = level(pairs.flat_map(|document| document.into_inner()));

    let assembler = Assembler {
        registry,
        source,
        limit: max_depth,
    };
    assembler.nodes(tokens, 1)
}

fn syntax_error(err: pest::error::Error<Rule>, source: &SourceContext) -> ParseError {
    let (offset, len) = match err.location {
        InputLocation::Pos(pos) => (pos, 0),
        InputLocation::Span((start, end)) => (start, end - start),
    };
    ParseError::Syntax {
        message: err.variant.message().into_owned(),
        src: source.named_source(),
        span: (offset, len).into(),
    }
}

/// Upper bounds on how deep a source can nest, from one pass over the text
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Nesting {
    /// Deepest run of open `{`, `\(` and `\[` scopes
    scopes: usize,
    /// Control words and script triggers; each may take a nested argument
    constructs: usize,
}

impl Nesting {
    fn measure(source: &str) -> Self {
        let mut nesting = Nesting::default();
        let mut open = 0usize;
        let mut chars = source.chars();
        while let Some(c) = chars.next() {
            match c {
                '%' => {
                    for c in chars.by_ref() {
                        if c == '\n' {
                            break;
                        }
                    }
                }
                '\\' => match chars.next() {
                    Some('(' | '[') => {
                        open += 1;
                        nesting.scopes = nesting.scopes.max(open);
                    }
                    Some(')' | ']') => open = open.saturating_sub(1),
                    Some(c) if c.is_ascii_alphabetic() => nesting.constructs += 1,
                    _ => {}
                },
                '{' => {
                    open += 1;
                    nesting.scopes = nesting.scopes.max(open);
                }
                '}' => open = open.saturating_sub(1),
                '^' | '_' => nesting.constructs += 1,
                _ => {}
            }
        }
        nesting
    }

    fn levels(self) -> usize {
        self.scopes + self.constructs + 1
    }
}

// ============================================================================
// Pass 1: pairs to tokens
// ============================================================================

#[derive(Debug)]
enum Token {
    Text(String),
    /// Control word or control symbol, without the backslash
    Word { name: String, span: SourceSpan },
    Script { trigger: char, span: SourceSpan },
    Special(String),
    /// `[` or `]`; `paired` is false for an opening bracket with no close
    /// later on its level
    Bracket { c: char, paired: bool },
    Star,
    Group {
        open: &'static str,
        close: &'static str,
        children: Vec<Token>,
    },
    Comment(String),
}

/// Tokens of one nesting level, with brackets paired up
fn level<'i>(pairs: impl Iterator<Item = Pair<'i, Rule>>) -> Vec<Token> {
    let mut tokens: Vec<Token> = pairs.filter_map(token).collect();

    let mut unclosed = Vec::new();
    for (index, token) in tokens.iter().enumerate() {
        match token {
            Token::Bracket { c: '[', .. } => unclosed.push(index),
            Token::Bracket { c: ']', .. } => {
                unclosed.pop();
            }
            _ => {}
        }
    }
    for index in unclosed {
        if let Some(Token::Bracket { paired, .. }) = tokens.get_mut(index) {
            *paired = false;
        }
    }
    tokens
}

fn token(pair: Pair<'_, Rule>) -> Option<Token> {
    let span = pair.as_span();
    let source_span: SourceSpan = (span.start(), span.end() - span.start()).into();

    let token = match pair.as_rule() {
        Rule::comment => {
            let body = pair.into_inner().next().map_or("", |body| body.as_str());
            Token::Comment(body.to_string())
        }
        Rule::display_math => group("$$", "$$", pair),
        Rule::inline_math => group("$", "$", pair),
        Rule::paren_math => group("\\(", "\\)", pair),
        Rule::bracket_math => group("\\[", "\\]", pair),
        Rule::group => group("{", "}", pair),
        Rule::escaped => Token::Text(pair.as_str()[1..].to_string()),
        Rule::angle | Rule::special => Token::Special(pair.as_str().to_string()),
        Rule::control_word | Rule::control_symbol => Token::Word {
            name: pair.as_str()[1..].to_string(),
            span: source_span,
        },
        Rule::script => Token::Script {
            trigger: pair.as_str().chars().next()?,
            span: source_span,
        },
        Rule::bracket => Token::Bracket {
            c: pair.as_str().chars().next()?,
            paired: true,
        },
        Rule::star => Token::Star,
        Rule::text => Token::Text(pair.as_str().to_string()),
        _ => return None,
    };
    Some(token)
}

fn group(open: &'static str, close: &'static str, pair: Pair<'_, Rule>) -> Token {
    Token::Group {
        open,
        close,
        children: level(pair.into_inner()),
    }
}

// ============================================================================
// Pass 2: argument collection
// ============================================================================

type Stream = VecDeque<Token>;

/// Location of one character in the stream
#[derive(Debug, Clone, Copy)]
struct Cursor {
    token: usize,
    /// Byte offset inside a text token, 0 for single-character tokens
    offset: usize,
}

struct Assembler<'a> {
    registry: &'a MacroRegistry,
    source: &'a SourceContext,
    limit: usize,
}

impl Assembler<'_> {
    /// The level below `depth`, if the limit allows one
    fn enter(&self, depth: usize) -> Result<usize, Error> {
        if depth >= self.limit {
            log::debug!("argument nesting reached the limit of {}", self.limit);
            return Err(RenderError::DepthExceeded { limit: self.limit }.into());
        }
        Ok(depth + 1)
    }

    fn nodes(&self, tokens: Vec<Token>, depth: usize) -> Result<NodeList, Error> {
        let mut stream = Stream::from(tokens);
        let mut nodes = NodeList::new();
        while let Some(token) = stream.pop_front() {
            let node = self.node(token, &mut stream, depth)?;
            push_node(&mut nodes, node);
        }
        Ok(nodes)
    }

    fn node(&self, token: Token, stream: &mut Stream, depth: usize) -> Result<Node, Error> {
        Ok(match token {
            Token::Text(text) => Node::Text(text),
            Token::Special(symbol) => Node::Special(symbol),
            Token::Comment(body) => Node::Comment(body),
            Token::Bracket { c, .. } => Node::Text(c.to_string()),
            Token::Star => Node::text("*"),
            Token::Group {
                open,
                close,
                children,
            } => Node::group(open, close, self.nodes(children, self.enter(depth)?)?),
            Token::Word { name, span } => self.construct(name, span, stream, depth)?,
            Token::Script { trigger, span } => {
                let name = trigger.to_string();
                if self.registry.contains(&name) {
                    self.construct(name, span, stream, depth)?
                } else {
                    Node::Text(name)
                }
            }
        })
    }

    fn construct(&self, name: String, span: SourceSpan, stream: &mut Stream, depth: usize) -> Result<Node, Error> {
        let Some(entry) = self.registry.get(&name) else {
            return Ok(Node::symbol(name));
        };

        let kinds = entry.signature.kinds();
        if kinds.is_empty() {
            return Ok(Node::construct(name, Vec::new()));
        }

        let depth = self.enter(depth)?;
        let mut arguments = Vec::with_capacity(kinds.len());
        let mut i = 0;
        while i < kinds.len() {
            let kind = kinds[i];
            match kind {
                ArgKind::Mandatory => {
                    let content = self
                        .mandatory(stream, depth)?
                        .ok_or_else(|| self.missing(&name, span))?;
                    arguments.push(ArgumentSlot::mandatory(content));
                }
                ArgKind::Optional => {
                    arguments.push(ArgumentSlot::optional(self.delimited(stream, '[', ']', depth)?));
                }
                ArgKind::AnyDelimited(open, close) => {
                    arguments.push(ArgumentSlot {
                        kind,
                        content: self.delimited(stream, open, close, depth)?,
                    });
                }
                ArgKind::Star => {
                    let present = matches!(stream.front(), Some(Token::Star));
                    if present {
                        stream.pop_front();
                    }
                    arguments.push(ArgumentSlot {
                        kind,
                        content: present.then(Vec::new),
                    });
                }
                ArgKind::Embellishment(_) => {
                    // Adjacent embellishment slots are filled in any order
                    let end = kinds[i..]
                        .iter()
                        .position(|k| !matches!(k, ArgKind::Embellishment(_)))
                        .map_or(kinds.len(), |n| i + n);
                    arguments.extend(self.embellishments(&kinds[i..end], stream, depth)?);
                    i = end;
                    continue;
                }
            }
            i += 1;
        }

        Ok(Node::construct(name, arguments))
    }

    /// A brace group's children, a single control sequence, or a single
    /// character split off the next text run
    fn mandatory(&self, stream: &mut Stream, depth: usize) -> Result<Option<NodeList>, Error> {
        skip_whitespace(stream);
        let Some(token) = stream.pop_front() else {
            return Ok(None);
        };

        let content = match token {
            Token::Group {
                open: "{",
                children,
                ..
            } => self.nodes(children, depth)?,
            Token::Text(text) => {
                let mut chars = text.chars();
                let Some(first) = chars.next() else {
                    return Ok(None);
                };
                let rest = chars.as_str();
                if !rest.is_empty() {
                    stream.push_front(Token::Text(rest.to_string()));
                }
                vec![Node::Text(first.to_string())]
            }
            Token::Script { trigger, .. } => vec![Node::Text(trigger.to_string())],
            token @ (Token::Group { .. } | Token::Comment(_)) => {
                stream.push_front(token);
                return Ok(None);
            }
            token => vec![self.node(token, stream, depth)?],
        };
        Ok(Some(content))
    }

    /// Content between `open` and a matching `close` at the same level.
    /// Nothing is consumed when the argument is absent.
    fn delimited(&self, stream: &mut Stream, open: char, close: char, depth: usize) -> Result<Option<NodeList>, Error> {
        let Some((start, end)) = scan_delimited(stream, open, close) else {
            return Ok(None);
        };

        let mut inner: Vec<Token> = stream.drain(..=end.token).collect();
        match inner.last_mut() {
            Some(Token::Text(text)) => {
                let rest = text.split_off(end.offset);
                let rest = &rest[close.len_utf8()..];
                if !rest.is_empty() {
                    stream.push_front(Token::Text(rest.to_string()));
                }
            }
            _ => {
                inner.pop();
            }
        }

        inner.drain(..start.token);
        match inner.first_mut() {
            Some(Token::Text(text)) => {
                text.drain(..start.offset + open.len_utf8());
            }
            Some(_) => {
                inner.remove(0);
            }
            None => {}
        }
        inner.retain(|token| !matches!(token, Token::Text(text) if text.is_empty()));

        Ok(Some(self.nodes(inner, depth)?))
    }

    fn embellishments(
        &self,
        kinds: &[ArgKind],
        stream: &mut Stream,
        depth: usize,
    ) -> Result<Vec<ArgumentSlot>, Error> {
        let mut slots: Vec<ArgumentSlot> = kinds.iter().map(|&kind| ArgumentSlot::absent(kind)).collect();

        while let Some(&Token::Script { trigger, span }) = stream.front() {
            let Some(slot) = slots
                .iter_mut()
                .find(|slot| slot.kind == ArgKind::Embellishment(trigger) && !slot.is_present())
            else {
                break;
            };
            stream.pop_front();

            let trigger = trigger.to_string();
            let content = self
                .mandatory(stream, depth)?
                .ok_or_else(|| self.missing(&trigger, span))?;
            slot.content = Some(vec![Node::group(trigger, "", content)]);
        }

        Ok(slots)
    }

    fn missing(&self, name: &str, span: SourceSpan) -> ParseError {
        ParseError::MissingArgument {
            name: name.to_string(),
            src: self.source.named_source(),
            span,
        }
    }
}

/// Drop leading whitespace from the stream
fn skip_whitespace(stream: &mut Stream) {
    while let Some(Token::Text(text)) = stream.front_mut() {
        let skip = text.len() - text.trim_start().len();
        if skip == text.len() {
            stream.pop_front();
        } else {
            text.drain(..skip);
            return;
        }
    }
}

/// Find an `open ... close` pair at the start of the stream, after optional
/// whitespace. Opaque tokens (groups, control sequences) count as content.
fn scan_delimited(stream: &Stream, open: char, close: char) -> Option<(Cursor, Cursor)> {
    let mut scan = Scan {
        open,
        close,
        opened: None,
        depth: 0,
    };

    for (index, token) in stream.iter().enumerate() {
        let at = |offset| Cursor { token: index, offset };
        let flow = match token {
            Token::Text(text) => text
                .char_indices()
                .try_for_each(|(offset, c)| scan.feed(at(offset), c)),
            // An opening bracket with no close on its level never starts an argument
            Token::Bracket { c, paired: false } if scan.opened.is_none() && *c == open => return None,
            Token::Bracket { c, .. } => scan.feed(at(0), *c),
            Token::Star => scan.feed(at(0), '*'),
            _ if scan.opened.is_none() => return None,
            _ => continue,
        };
        if let ControlFlow::Break(found) = flow {
            return found;
        }
    }
    None
}

/// Running state of [`scan_delimited`]
struct Scan {
    open: char,
    close: char,
    opened: Option<Cursor>,
    depth: usize,
}

impl Scan {
    /// Break with the result once it is known
    fn feed(&mut self, at: Cursor, c: char) -> ControlFlow<Option<(Cursor, Cursor)>> {
        match self.opened {
            None if c.is_whitespace() => {}
            None if c == self.open => self.opened = Some(at),
            None => return ControlFlow::Break(None),
            Some(start) if c == self.close && self.depth == 0 => return ControlFlow::Break(Some((start, at))),
            Some(_) if c == self.close => self.depth -= 1,
            Some(_) if c == self.open => self.depth += 1,
            Some(_) => {}
        }
        ControlFlow::Continue(())
    }
}

/// Append, merging adjacent text runs
fn push_node(nodes: &mut NodeList, node: Node) {
    if let (Some(Node::Text(last)), Node::Text(text)) = (nodes.last_mut(), &node) {
        last.push_str(text);
        return;
    }
    nodes.push(node);
}
