//! Reader and writer for the sectioned text format of preference graphs.
//!
//! ```text
//! @PartitionA
//! r1, r2 ;
//! @End
//! @PartitionB
//! h1 (2), h2 (1,3) ;
//! @End
//! @PreferenceListsA
//! r1 : h1, h2 ;
//! r2 : h1 ;
//! @End
//! @PreferenceListsB
//! h1 : r2, r1 ;
//! h2 : r1 ;
//! @End
//! ```
//!
//! `(u)` is shorthand for `(0,u)` and an undecorated vertex has `(0,1)`.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use hr_core::errors::{ErrorInfo, HrError};
use hr_core::{Quota, VertexId};

use crate::bipartite::BipartiteGraph;

/// Parses a graph from its text representation and validates it.
pub fn read_graph(input: &str) -> Result<BipartiteGraph, HrError> {
    let tokens = tokenize(input)?;
    let sections = Parser::new(tokens).parse()?;
    let proposers = sections.partition_a.ok_or_else(|| {
        format_error("missing-section", "@PartitionA section is required", 0)
    })?;
    let receivers = sections.partition_b.ok_or_else(|| {
        format_error("missing-section", "@PartitionB section is required", 0)
    })?;
    let mut preferences = BTreeMap::new();
    for (id, list, line) in sections.lists {
        if preferences.insert(id.clone(), list).is_some() {
            return Err(format_error(
                "duplicate-list",
                "vertex has more than one preference list",
                line,
            )
            .with_context("vertex", id));
        }
    }
    BipartiteGraph::new(proposers, receivers, preferences)
}

/// Reads and parses a graph file.
pub fn read_graph_file(path: &Path) -> Result<BipartiteGraph, HrError> {
    let text = fs::read_to_string(path).map_err(|err| {
        HrError::Serde(
            ErrorInfo::new("read-graph", err.to_string())
                .with_context("path", path.display().to_string()),
        )
    })?;
    read_graph(&text).map_err(|err| err.with_context("path", path.display()))
}

/// Renders a graph in the text format, quotas always as `(lower,upper)`.
pub fn write_graph(graph: &BipartiteGraph) -> String {
    let mut out = String::new();
    write_partition(&mut out, "@PartitionA", graph, graph.proposers());
    out.push('\n');
    write_partition(&mut out, "@PartitionB", graph, graph.receivers());
    out.push('\n');
    write_lists(&mut out, "@PreferenceListsA", graph, graph.proposers());
    out.push('\n');
    write_lists(&mut out, "@PreferenceListsB", graph, graph.receivers());
    out
}

fn write_partition(out: &mut String, header: &str, graph: &BipartiteGraph, ids: &[VertexId]) {
    let decls: Vec<String> = ids
        .iter()
        .map(|id| {
            let quota = graph.quota(id).unwrap_or_default();
            format!("{id} {quota}")
        })
        .collect();
    let _ = writeln!(out, "{header}\n{} ;\n@End", decls.join(", "));
}

fn write_lists(out: &mut String, header: &str, graph: &BipartiteGraph, ids: &[VertexId]) {
    let _ = writeln!(out, "{header}");
    for id in ids {
        let list: Vec<&str> = graph.preferences(id).iter().map(VertexId::as_str).collect();
        let _ = writeln!(out, "{id} : {} ;", list.join(", "));
    }
    let _ = writeln!(out, "@End");
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Keyword(String),
    Word(String),
    Punct(char),
}

#[derive(Debug, Clone)]
struct Spanned {
    token: Token,
    line: usize,
}

fn is_word_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, '_' | '-' | '.' | '@')
}

fn tokenize(input: &str) -> Result<Vec<Spanned>, HrError> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();
    let mut line = 1usize;
    while let Some(&ch) = chars.peek() {
        if ch == '\n' {
            line += 1;
            chars.next();
        } else if ch.is_whitespace() {
            chars.next();
        } else if matches!(ch, ',' | ';' | ':' | '(' | ')') {
            tokens.push(Spanned {
                token: Token::Punct(ch),
                line,
            });
            chars.next();
        } else if is_word_char(ch) {
            let mut word = String::new();
            while let Some(&next) = chars.peek() {
                if !is_word_char(next) {
                    break;
                }
                word.push(next);
                chars.next();
            }
            let token = if word.starts_with('@') {
                Token::Keyword(word)
            } else {
                Token::Word(word)
            };
            tokens.push(Spanned { token, line });
        } else {
            return Err(format_error("unexpected-character", "character not allowed", line)
                .with_context("character", ch));
        }
    }
    Ok(tokens)
}

#[derive(Debug, Default)]
struct Sections {
    partition_a: Option<Vec<(VertexId, Quota)>>,
    partition_b: Option<Vec<(VertexId, Quota)>>,
    lists: Vec<(VertexId, Vec<VertexId>, usize)>,
}

struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
}

impl Parser {
    fn new(tokens: Vec<Spanned>) -> Self {
        Self { tokens, pos: 0 }
    }

    fn line(&self) -> usize {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map(|spanned| spanned.line)
            .unwrap_or(0)
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|spanned| &spanned.token)
    }

    fn next(&mut self) -> Result<Token, HrError> {
        let line = self.line();
        let token = self
            .tokens
            .get(self.pos)
            .map(|spanned| spanned.token.clone())
            .ok_or_else(|| format_error("unexpected-eof", "input ended inside a section", line))?;
        self.pos += 1;
        Ok(token)
    }

    fn expect_punct(&mut self, expected: char) -> Result<(), HrError> {
        let line = self.line();
        match self.next()? {
            Token::Punct(ch) if ch == expected => Ok(()),
            other => Err(unexpected(&other, line).with_context("expected", expected)),
        }
    }

    fn expect_word(&mut self) -> Result<String, HrError> {
        let line = self.line();
        match self.next()? {
            Token::Word(word) => Ok(word),
            other => Err(unexpected(&other, line).with_context("expected", "identifier")),
        }
    }

    fn expect_int(&mut self) -> Result<usize, HrError> {
        let line = self.line();
        let word = self.expect_word()?;
        word.parse().map_err(|_| {
            format_error("invalid-integer", "quota is not a non-negative integer", line)
                .with_context("value", word)
        })
    }

    fn parse(mut self) -> Result<Sections, HrError> {
        let mut sections = Sections::default();
        while self.peek().is_some() {
            let line = self.line();
            let header = match self.next()? {
                Token::Keyword(keyword) => keyword,
                other => return Err(unexpected(&other, line).with_context("expected", "section")),
            };
            match header.as_str() {
                "@PartitionA" | "@PartitionB" => {
                    let slot = if header == "@PartitionA" {
                        &sections.partition_a
                    } else {
                        &sections.partition_b
                    };
                    if slot.is_some() {
                        return Err(format_error("duplicate-section", "section repeated", line)
                            .with_context("section", &header));
                    }
                    let partition = self.parse_partition()?;
                    if header == "@PartitionA" {
                        sections.partition_a = Some(partition);
                    } else {
                        sections.partition_b = Some(partition);
                    }
                }
                "@PreferenceListsA" | "@PreferenceListsB" => {
                    let lists = self.parse_lists()?;
                    sections.lists.extend(lists);
                }
                _ => {
                    return Err(format_error("unknown-section", "unknown section header", line)
                        .with_context("section", &header))
                }
            }
        }
        Ok(sections)
    }

    fn parse_partition(&mut self) -> Result<Vec<(VertexId, Quota)>, HrError> {
        let mut vertices = Vec::new();
        if self.peek() != Some(&Token::Punct(';')) {
            loop {
                vertices.push(self.parse_declaration()?);
                if self.peek() == Some(&Token::Punct(',')) {
                    self.pos += 1;
                } else {
                    break;
                }
            }
        }
        self.expect_punct(';')?;
        self.expect_end()?;
        Ok(vertices)
    }

    fn parse_declaration(&mut self) -> Result<(VertexId, Quota), HrError> {
        let id = VertexId::new(self.expect_word()?);
        if self.peek() != Some(&Token::Punct('(')) {
            return Ok((id, Quota::unit()));
        }
        self.pos += 1;
        let line = self.line();
        let first = self.expect_int()?;
        let quota = if self.peek() == Some(&Token::Punct(',')) {
            self.pos += 1;
            let upper = self.expect_int()?;
            Quota::new(first, upper).map_err(|err| err.with_context("line", line))?
        } else {
            Quota::upper_only(first)
        };
        self.expect_punct(')')?;
        Ok((id, quota))
    }

    fn parse_lists(&mut self) -> Result<Vec<(VertexId, Vec<VertexId>, usize)>, HrError> {
        let mut lists = Vec::new();
        loop {
            if let Some(Token::Keyword(keyword)) = self.peek() {
                if keyword == "@End" {
                    self.pos += 1;
                    return Ok(lists);
                }
            }
            let line = self.line();
            let owner = VertexId::new(self.expect_word()?);
            self.expect_punct(':')?;
            let mut list = Vec::new();
            if self.peek() != Some(&Token::Punct(';')) {
                loop {
                    list.push(VertexId::new(self.expect_word()?));
                    if self.peek() == Some(&Token::Punct(',')) {
                        self.pos += 1;
                    } else {
                        break;
                    }
                }
            }
            self.expect_punct(';')?;
            lists.push((owner, list, line));
        }
    }

    fn expect_end(&mut self) -> Result<(), HrError> {
        let line = self.line();
        match self.next()? {
            Token::Keyword(keyword) if keyword == "@End" => Ok(()),
            other => Err(unexpected(&other, line).with_context("expected", "@End")),
        }
    }
}

fn unexpected(token: &Token, line: usize) -> HrError {
    let found = match token {
        Token::Keyword(text) | Token::Word(text) => text.clone(),
        Token::Punct(ch) => ch.to_string(),
    };
    format_error("unexpected-token", "unexpected token", line).with_context("found", found)
}

fn format_error(code: &str, message: &str, line: usize) -> HrError {
    HrError::Format(ErrorInfo::new(code, message).with_context("line", line.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "@PartitionA\nr1, r2 (0,1) ;\n@End\n\n@PartitionB\nh1 (2), h2 (1,3) ;\n@End\n\
        @PreferenceListsA\nr1 : h1, h2 ;\nr2 : h1 ;\n@End\n\
        @PreferenceListsB\nh1 : r2, r1 ;\nh2 : r1 ;\n@End\n";

    #[test]
    fn reads_quotas_and_lists() {
        let graph = read_graph(SAMPLE).unwrap();
        assert_eq!(graph.proposers().len(), 2);
        assert_eq!(graph.quota(&"h1".into()).unwrap(), Quota::upper_only(2));
        assert_eq!(graph.quota(&"h2".into()).unwrap(), Quota::new(1, 3).unwrap());
        assert_eq!(graph.quota(&"r1".into()).unwrap(), Quota::unit());
        assert_eq!(
            graph.preferences(&"h1".into()),
            &[VertexId::from("r2"), VertexId::from("r1")]
        );
    }

    #[test]
    fn written_graph_reads_back_identically() {
        let graph = read_graph(SAMPLE).unwrap();
        let text = write_graph(&graph);
        assert_eq!(read_graph(&text).unwrap(), graph);
    }

    #[test]
    fn empty_lists_are_accepted() {
        let text = "@PartitionA\nr1 ;\n@End\n@PartitionB\nh1 ;\n@End\n\
            @PreferenceListsA\nr1 : ;\n@End\n@PreferenceListsB\nh1 : ;\n@End\n";
        let graph = read_graph(text).unwrap();
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn syntax_errors_carry_the_line() {
        let text = "@PartitionA\nr1 ;\n@End\n@PartitionB\nh1 (x) ;\n@End\n";
        let err = read_graph(text).unwrap_err();
        assert_eq!(err.code(), "invalid-integer");
        assert_eq!(err.info().context.get("line"), Some(&"5".to_string()));

        let err = read_graph("@PartitionA\nr1 ;\n").unwrap_err();
        assert_eq!(err.code(), "unexpected-eof");
    }

    #[test]
    fn asymmetric_files_are_rejected_by_validation() {
        let text = "@PartitionA\nr1 ;\n@End\n@PartitionB\nh1 ;\n@End\n\
            @PreferenceListsA\nr1 : h1 ;\n@End\n";
        let err = read_graph(text).unwrap_err();
        assert!(matches!(err, HrError::Graph(_)));
        assert_eq!(err.code(), "asymmetric-edge");
    }
}
