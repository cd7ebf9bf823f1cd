use serde::Serialize;

/// A matched character, or the wildcard standing for any character.
///
/// `.` and a bare escaped control character both reduce to this type;
/// codegen special-cases `Wildcard` to emit `char 0 INF` instead of a
/// single-codepoint `char`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CharValue {
    Char(char),
    Wildcard,
}

/// The `*`, `+`, `?` duplication operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DupKind {
    Star,
    Plus,
    Qmark,
}

impl DupKind {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '*' => Some(Self::Star),
            '+' => Some(Self::Plus),
            '?' => Some(Self::Qmark),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Self::Star => '*',
            Self::Plus => '+',
            Self::Qmark => '?',
        }
    }
}

/// The tagged AST produced by the parser. One arm per grammar production;
/// codegen dispatches on this directly (see `hvm-codegen`).
///
/// `full_graph=false` (the default) collapses unit productions: `Regex::Alt`
/// is the only `Regex` shape ever constructed, `ReExpr::Concat` the only
/// `ReExpr` shape, and `SimpleRe::Dup` the only non-passthrough `SimpleRe`
/// shape — a bare `T`, `S`, or `N` is returned directly instead of being
/// wrapped. `full_graph=true` always wraps, using the `Plain` variants, so
/// every production is visible in the diagram. Codegen must treat both
/// shapes identically (`Plain` delegates to its child).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Ast {
    /// `E -> T | E '|' T`.
    Regex(RegexNode),
    /// `T -> S | T S`.
    ReExpr(ReExprNode),
    /// `S -> N | N U`.
    SimpleRe(SimpleReNode),
    /// `N -> one_char | '(' E ')'`.
    NonDupRe(NonDupReNode),
    /// The resolved value of a `one_char` production. Always present inside
    /// `NonDupRe::Char` (directly, for codegen); additionally materialized
    /// as an explicit child node when `full_graph=true`.
    OneChar(CharValue),
    /// `'[' matching_list ']'` / `'[' nonmatching_list ']'`.
    BrackExpr(BrackExprNode),
    /// A `start_range end_range` or `start_range '-'` pair inside a bracket
    /// expression.
    RangeExpr(char, char),
    /// A single character inside a bracket expression.
    EndRange(char),
    /// A bare `\w \W \d \D \s \S`, inside or outside a bracket expression.
    CharClass(char),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum RegexNode {
    Plain(Box<Ast>),
    Alt(Box<Ast>, Box<Ast>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ReExprNode {
    Plain(Box<Ast>),
    Concat(Box<Ast>, Box<Ast>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SimpleReNode {
    Plain(Box<Ast>),
    Dup(DupKind, Box<Ast>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum NonDupReNode {
    /// `children` is empty unless `full_graph=true`, in which case it holds
    /// exactly one `Ast::OneChar(value)` for display.
    Char {
        value: CharValue,
        children: Vec<Ast>,
    },
    Group(Box<Ast>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BrackExprNode {
    pub matching: bool,
    /// Follow-list of `EndRange`, `RangeExpr`, and `CharClass` nodes.
    pub children: Vec<Ast>,
}

impl Ast {
    /// This node's direct children, for tree-walking (diagram emission).
    pub fn children(&self) -> Vec<&Ast> {
        match self {
            Ast::Regex(RegexNode::Plain(c)) => vec![c],
            Ast::Regex(RegexNode::Alt(l, r)) => vec![l, r],
            Ast::ReExpr(ReExprNode::Plain(c)) => vec![c],
            Ast::ReExpr(ReExprNode::Concat(l, r)) => vec![l, r],
            Ast::SimpleRe(SimpleReNode::Plain(c)) => vec![c],
            Ast::SimpleRe(SimpleReNode::Dup(_, c)) => vec![c],
            Ast::NonDupRe(NonDupReNode::Char { children, .. }) => children.iter().collect(),
            Ast::NonDupRe(NonDupReNode::Group(c)) => vec![c],
            Ast::OneChar(_) => vec![],
            Ast::BrackExpr(b) => b.children.iter().collect(),
            Ast::RangeExpr(..) => vec![],
            Ast::EndRange(_) => vec![],
            Ast::CharClass(_) => vec![],
        }
    }

    /// Printable label for this node, used by the diagram emitter. Mirrors
    /// the original AST node's `__repr__`: the node's name, plus its
    /// character data rendered as a literal (or an escape letter for
    /// control characters).
    pub fn label(&self) -> String {
        match self {
            Ast::Regex(RegexNode::Plain(_)) => "regex".to_string(),
            Ast::Regex(RegexNode::Alt(..)) => "regex_alt".to_string(),
            Ast::ReExpr(ReExprNode::Plain(_)) => "re_expr".to_string(),
            Ast::ReExpr(ReExprNode::Concat(..)) => "re_expr_concat".to_string(),
            Ast::SimpleRe(SimpleReNode::Plain(_)) => "simple_re".to_string(),
            Ast::SimpleRe(SimpleReNode::Dup(k, _)) => format!("simple_re_dup: {}", k.as_char()),
            Ast::NonDupRe(NonDupReNode::Char { value, .. }) => {
                format!("nondup_re_char: {}", render_char_value(*value))
            }
            Ast::NonDupRe(NonDupReNode::Group(_)) => "nondup_re_group".to_string(),
            Ast::OneChar(v) => format!("one_char: {}", render_char_value(*v)),
            Ast::BrackExpr(b) if b.matching => "brack_expr_matching_list".to_string(),
            Ast::BrackExpr(_) => "brack_expr_nonmatching_list".to_string(),
            Ast::RangeExpr(lo, hi) => format!("range_expr: {lo}-{hi}"),
            Ast::EndRange(c) => format!("end_range: {}", render_char(*c)),
            Ast::CharClass(letter) => format!("char_class: {letter}"),
        }
    }
}

fn render_char_value(v: CharValue) -> String {
    match v {
        CharValue::Char(c) => render_char(c),
        CharValue::Wildcard => "WILDCARD".to_string(),
    }
}

fn render_char(c: char) -> String {
    match c {
        '\n' => "\\n".to_string(),
        '\r' => "\\r".to_string(),
        '\t' => "\\t".to_string(),
        '\u{000C}' => "\\f".to_string(),
        '\u{000B}' => "\\v".to_string(),
        c => c.to_string(),
    }
}
