//! Statement reader: token stream → `QueryIntent`.
//!
//! Reads statement outlines only. Clauses it does not need (joins, ordering,
//! limits, sub-selects) are skipped by paren-depth scanning.

use crate::{
    analyze::{
        AnalyzeError,
        lexer::{Token, TokenKind},
    },
    intent::{QueryIntent, StatementKind},
    value::Value,
};
use std::collections::BTreeMap;

/// Keywords that end a WHERE clause at paren depth 0.
const CLAUSE_END: &[&str] = &[
    "GROUP",
    "ORDER",
    "LIMIT",
    "HAVING",
    "RETURNING",
    "OFFSET",
    "UNION",
    "EXCEPT",
    "INTERSECT",
    "WINDOW",
];

/// Keywords that end a FROM clause at paren depth 0.
const FROM_END: &[&str] = &[
    "WHERE",
    "GROUP",
    "ORDER",
    "LIMIT",
    "HAVING",
    "RETURNING",
    "OFFSET",
    "UNION",
    "EXCEPT",
    "INTERSECT",
    "WINDOW",
];

/// Keywords that start the main statement after a WITH prefix.
const STATEMENT_START: &[&str] = &["SELECT", "INSERT", "REPLACE", "UPDATE", "DELETE"];

/// Words never read as a bare table name.
const RESERVED: &[&str] = &[
    "SELECT", "FROM", "WHERE", "SET", "VALUES", "INTO", "AND", "OR", "NOT", "NULL", "JOIN", "ON",
    "ORDER", "GROUP", "LIMIT",
];

/// Replace placeholders with the bound argument values.
///
/// `?` binds positionally; `?NNN` and `$NNN` bind by 1-based index. The
/// argument count must equal the highest slot the statement references.
pub(crate) fn bind(tokens: Vec<Token>, args: &[Value]) -> Result<Vec<Token>, AnalyzeError> {
    let mut anonymous = 0usize;
    let mut numbered = 0usize;

    for tok in &tokens {
        match tok.kind {
            TokenKind::Placeholder(None) => anonymous += 1,
            TokenKind::Placeholder(Some(n)) => numbered = numbered.max(n as usize),
            _ => {}
        }
    }

    let expected = anonymous.max(numbered);
    if expected != args.len() {
        return Err(AnalyzeError::ArgumentCount {
            expected,
            found: args.len(),
        });
    }

    let mut next = 0usize;
    let bound = tokens
        .into_iter()
        .map(|mut tok| {
            match tok.kind {
                TokenKind::Placeholder(None) => {
                    tok.kind = TokenKind::Literal(args[next].clone());
                    next += 1;
                }
                TokenKind::Placeholder(Some(n)) => {
                    tok.kind = TokenKind::Literal(args[n as usize - 1].clone());
                }
                _ => {}
            }
            tok
        })
        .collect();

    Ok(bound)
}

///
/// Reader
///

pub(crate) struct Reader<'a> {
    sql: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl<'a> Reader<'a> {
    pub(crate) const fn new(sql: &'a str, tokens: Vec<Token>) -> Self {
        Self {
            sql,
            tokens,
            pos: 0,
        }
    }

    pub(crate) fn read(mut self) -> Result<QueryIntent, AnalyzeError> {
        while matches!(self.peek(), TokenKind::Semicolon) {
            self.pos += 1;
        }

        if self.eat_keyword("WITH") {
            self.skip_with_clause();
        }

        let kind = self.peek().clone();
        if kind == TokenKind::Eof {
            return Err(AnalyzeError::EmptyStatement);
        }

        if kind.is_keyword("SELECT") {
            self.read_select()
        } else if kind.is_keyword("INSERT") || kind.is_keyword("REPLACE") {
            self.read_insert()
        } else if kind.is_keyword("UPDATE") {
            self.read_update()
        } else if kind.is_keyword("DELETE") {
            self.read_delete()
        } else {
            Ok(QueryIntent::new(StatementKind::Other))
        }
    }

    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------

    fn read_select(&mut self) -> Result<QueryIntent, AnalyzeError> {
        let mut intent = QueryIntent::new(StatementKind::Select);
        self.pos += 1;
        let _ = self.eat_keyword("DISTINCT") || self.eat_keyword("ALL");

        let mut any_columns = false;
        let mut columns = Vec::new();
        let mut stops = vec!["FROM"];
        stops.extend_from_slice(FROM_END);

        for (start, end) in self.scan_list(&stops) {
            match self.item_name(&self.tokens[start..end]) {
                ItemName::Star => any_columns = true,
                ItemName::Named(name) => columns.push(name),
            }
        }
        if !any_columns {
            intent.columns = columns;
        }

        if self.eat_keyword("FROM") {
            intent.table = self.source_name()?;
            self.scan_list(FROM_END);
            self.read_where(&mut intent);
        }

        Ok(intent)
    }

    fn read_insert(&mut self) -> Result<QueryIntent, AnalyzeError> {
        let mut intent = QueryIntent::new(StatementKind::Insert);
        let replace = self.peek().is_keyword("REPLACE");
        self.pos += 1;

        // INSERT OR <conflict> INTO
        if !replace && self.eat_keyword("OR") {
            self.bump();
        }
        if !self.eat_keyword("INTO") && !replace {
            return Err(self.expected("INTO"));
        }
        intent.table = Some(self.table_name()?);

        if matches!(self.peek(), TokenKind::LeftParen) {
            for (start, end) in self.paren_items()? {
                let name = column_name(&self.tokens[start..end])
                    .ok_or_else(|| self.expected_at("column name", start))?;
                intent.columns.push(name);
            }
        }

        if self.eat_keyword("VALUES") && matches!(self.peek(), TokenKind::LeftParen) {
            let items = self.paren_items()?;
            for (column, (start, end)) in intent.columns.iter().zip(items) {
                if let Some(value) = operand(&self.tokens[start..end]) {
                    intent.values.insert(column.clone(), value);
                }
            }
        }

        Ok(intent)
    }

    fn read_update(&mut self) -> Result<QueryIntent, AnalyzeError> {
        let mut intent = QueryIntent::new(StatementKind::Update);
        self.pos += 1;
        if self.eat_keyword("OR") {
            self.bump();
        }
        intent.table = Some(self.table_name()?);

        if !self.eat_keyword("SET") {
            return Err(self.expected("SET"));
        }

        for (start, end) in self.scan_list(FROM_END) {
            let assignment = &self.tokens[start..end];
            let Some(eq) = top_level_eq(assignment) else {
                return Err(self.expected_at("assignment", start));
            };
            let column = column_name(&assignment[..eq])
                .ok_or_else(|| self.expected_at("column name", start))?;

            if let Some(value) = operand(&assignment[eq + 1..]) {
                intent.values.insert(column.clone(), value);
            }
            intent.columns.push(column);
        }

        self.read_where(&mut intent);

        Ok(intent)
    }

    fn read_delete(&mut self) -> Result<QueryIntent, AnalyzeError> {
        let mut intent = QueryIntent::new(StatementKind::Delete);
        self.pos += 1;

        if !self.eat_keyword("FROM") {
            return Err(self.expected("FROM"));
        }
        intent.table = Some(self.table_name()?);
        self.scan_list(FROM_END);
        self.read_where(&mut intent);

        Ok(intent)
    }

    fn read_where(&mut self, intent: &mut QueryIntent) {
        if !self.eat_keyword("WHERE") {
            return;
        }

        let start = self.pos;
        self.scan_list(CLAUSE_END);
        collect_predicates(&self.tokens[start..self.pos], &mut intent.predicates);
    }

    // ------------------------------------------------------------------
    // Cursor
    // ------------------------------------------------------------------

    fn peek(&self) -> &TokenKind {
        &self.tokens[self.pos].kind
    }

    fn bump(&mut self) {
        if !matches!(self.peek(), TokenKind::Eof) {
            self.pos += 1;
        }
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        if self.peek().is_keyword(keyword) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expected(&self, expected: &'static str) -> AnalyzeError {
        self.expected_at(expected, self.pos)
    }

    fn expected_at(&self, expected: &'static str, index: usize) -> AnalyzeError {
        AnalyzeError::Expected {
            expected,
            offset: self.tokens[index].start,
        }
    }

    /// Skip common table expressions up to the main statement keyword.
    /// CTE bodies are parenthesized, so only depth-0 keywords count.
    fn skip_with_clause(&mut self) {
        let mut depth = 0usize;

        loop {
            match self.peek() {
                TokenKind::Eof => return,
                TokenKind::LeftParen => depth += 1,
                TokenKind::RightParen => depth = depth.saturating_sub(1),
                kind if depth == 0 && STATEMENT_START.iter().any(|kw| kind.is_keyword(kw)) => {
                    return;
                }
                _ => {}
            }
            self.pos += 1;
        }
    }

    /// SELECT source: a table name, or None for a derived table or any
    /// other source that is not a plain name.
    fn source_name(&mut self) -> Result<Option<String>, AnalyzeError> {
        let named = match self.peek() {
            TokenKind::Ident(s) => !RESERVED.iter().any(|kw| s.eq_ignore_ascii_case(kw)),
            TokenKind::QuotedIdent(_) => true,
            _ => false,
        };

        if named {
            self.table_name().map(Some)
        } else {
            Ok(None)
        }
    }

    /// Read a possibly-qualified name and return its last segment.
    fn table_name(&mut self) -> Result<String, AnalyzeError> {
        let mut name = match self.peek() {
            TokenKind::Ident(s) if !RESERVED.iter().any(|kw| s.eq_ignore_ascii_case(kw)) => {
                s.clone()
            }
            TokenKind::QuotedIdent(s) => s.clone(),
            _ => return Err(self.expected("table name")),
        };
        self.pos += 1;

        while matches!(self.peek(), TokenKind::Dot) {
            match &self.tokens[self.pos + 1].kind {
                TokenKind::Ident(s) | TokenKind::QuotedIdent(s) => {
                    name.clone_from(s);
                    self.pos += 2;
                }
                _ => return Err(self.expected_at("table name", self.pos + 1)),
            }
        }

        Ok(name)
    }

    /// Split tokens on depth-0 commas until a stop keyword, `;`, or EOF.
    /// Leaves the cursor on the stopping token.
    fn scan_list(&mut self, stops: &[&str]) -> Vec<(usize, usize)> {
        let mut ranges = Vec::new();
        let mut depth = 0usize;
        let mut start = self.pos;

        loop {
            match &self.tokens[self.pos].kind {
                TokenKind::Eof => break,
                TokenKind::Semicolon if depth == 0 => break,
                TokenKind::LeftParen => depth += 1,
                TokenKind::RightParen => depth = depth.saturating_sub(1),
                TokenKind::Comma if depth == 0 => {
                    ranges.push((start, self.pos));
                    start = self.pos + 1;
                }
                kind if depth == 0 && stops.iter().any(|s| kind.is_keyword(s)) => break,
                _ => {}
            }
            self.pos += 1;
        }
        ranges.push((start, self.pos));
        ranges.retain(|(s, e)| s < e);

        ranges
    }

    /// Read a parenthesized, comma-separated group; cursor ends past `)`.
    fn paren_items(&mut self) -> Result<Vec<(usize, usize)>, AnalyzeError> {
        let open = self.pos;
        self.pos += 1;

        let mut ranges = Vec::new();
        let mut depth = 0usize;
        let mut start = self.pos;

        loop {
            match &self.tokens[self.pos].kind {
                TokenKind::Eof => return Err(self.expected_at("')'", open)),
                TokenKind::LeftParen => depth += 1,
                TokenKind::RightParen if depth == 0 => break,
                TokenKind::RightParen => depth -= 1,
                TokenKind::Comma if depth == 0 => {
                    ranges.push((start, self.pos));
                    start = self.pos + 1;
                }
                _ => {}
            }
            self.pos += 1;
        }
        ranges.push((start, self.pos));
        ranges.retain(|(s, e)| s < e);
        self.pos += 1;

        Ok(ranges)
    }

    fn item_name(&self, item: &[Token]) -> ItemName {
        let n = item.len();
        let is_star = matches!(item[n - 1].kind, TokenKind::Star)
            && (n == 1 || matches!(item[n - 2].kind, TokenKind::Dot));
        if is_star {
            return ItemName::Star;
        }

        if let Some(name) = column_name(item) {
            return ItemName::Named(name);
        }

        // trailing alias: `expr AS alias` or `expr alias`
        if n >= 2
            && let Some(alias) = ident_text(&item[n - 1])
            && (item[n - 2].kind.is_keyword("AS")
                || matches!(
                    item[n - 2].kind,
                    TokenKind::RightParen | TokenKind::Literal(_)
                ))
        {
            return ItemName::Named(alias);
        }

        ItemName::Named(self.sql[item[0].start..item[n - 1].end].to_string())
    }
}

///
/// ItemName
///

enum ItemName {
    Star,
    Named(String),
}

fn ident_text(tok: &Token) -> Option<String> {
    match &tok.kind {
        TokenKind::QuotedIdent(s) => Some(s.clone()),
        TokenKind::Ident(s)
            if !["NULL", "TRUE", "FALSE"]
                .iter()
                .any(|kw| s.eq_ignore_ascii_case(kw)) =>
        {
            Some(s.clone())
        }
        _ => None,
    }
}

/// `name` or `qualifier.name` → `name`.
fn column_name(tokens: &[Token]) -> Option<String> {
    let (last, rest) = tokens.split_last()?;
    let name = ident_text(last)?;

    let mut rest = rest;
    while let [head @ .., qualifier, dot] = rest {
        if !matches!(dot.kind, TokenKind::Dot) {
            return None;
        }
        ident_text(qualifier)?;
        rest = head;
    }

    rest.is_empty().then_some(name)
}

/// Literal operand of an equality: literal, negated number, NULL, TRUE/FALSE.
fn operand(tokens: &[Token]) -> Option<Value> {
    match tokens {
        [tok] => match &tok.kind {
            TokenKind::Literal(v) => Some(v.clone()),
            kind if kind.is_keyword("NULL") => Some(Value::Null),
            kind if kind.is_keyword("TRUE") => Some(Value::Int(1)),
            kind if kind.is_keyword("FALSE") => Some(Value::Int(0)),
            _ => None,
        },
        [minus, tok] if matches!(minus.kind, TokenKind::Minus) => match &tok.kind {
            TokenKind::Literal(Value::Int(v)) => v.checked_neg().map(Value::Int),
            TokenKind::Literal(Value::Float(v)) => Some(Value::Float(-v)),
            _ => None,
        },
        _ => None,
    }
}

fn top_level_eq(tokens: &[Token]) -> Option<usize> {
    let mut depth = 0usize;
    for (i, tok) in tokens.iter().enumerate() {
        match tok.kind {
            TokenKind::LeftParen => depth += 1,
            TokenKind::RightParen => depth = depth.saturating_sub(1),
            TokenKind::Eq if depth == 0 => return Some(i),
            _ => {}
        }
    }

    None
}

/// Drop parens that wrap the whole slice.
fn strip_parens(mut tokens: &[Token]) -> &[Token] {
    loop {
        let [first, inner @ .., last] = tokens else {
            return tokens;
        };
        if !matches!(first.kind, TokenKind::LeftParen)
            || !matches!(last.kind, TokenKind::RightParen)
        {
            return tokens;
        }

        // the opening paren must close at the very end
        let mut depth = 0usize;
        for tok in inner {
            match tok.kind {
                TokenKind::LeftParen => depth += 1,
                TokenKind::RightParen if depth == 0 => return tokens,
                TokenKind::RightParen => depth -= 1,
                _ => {}
            }
        }
        tokens = inner;
    }
}

/// Split on depth-0 AND. Returns None when the slice has a depth-0 OR,
/// since no single term is then guaranteed to hold.
fn conjuncts(tokens: &[Token]) -> Option<Vec<&[Token]>> {
    let mut terms = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    let mut in_between = false;

    for (i, tok) in tokens.iter().enumerate() {
        match &tok.kind {
            TokenKind::LeftParen => depth += 1,
            TokenKind::RightParen => depth = depth.saturating_sub(1),
            kind if depth == 0 && kind.is_keyword("OR") => return None,
            kind if depth == 0 && kind.is_keyword("BETWEEN") => in_between = true,
            kind if depth == 0 && kind.is_keyword("AND") => {
                if in_between {
                    in_between = false;
                } else {
                    terms.push(&tokens[start..i]);
                    start = i + 1;
                }
            }
            _ => {}
        }
    }
    terms.push(&tokens[start..]);

    Some(terms)
}

fn collect_predicates(tokens: &[Token], out: &mut BTreeMap<String, Value>) {
    let tokens = strip_parens(tokens);
    let Some(terms) = conjuncts(tokens) else {
        return;
    };

    if terms.len() > 1 {
        for term in terms {
            collect_predicates(term, out);
        }
        return;
    }

    let Some(eq) = top_level_eq(tokens) else {
        return;
    };
    let (left, right) = (&tokens[..eq], &tokens[eq + 1..]);

    if let (Some(column), Some(value)) = (column_name(left), operand(right)) {
        out.insert(column, value);
    } else if let (Some(value), Some(column)) = (operand(left), column_name(right)) {
        out.insert(column, value);
    }
}
