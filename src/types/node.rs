use std::collections::BTreeSet;
use std::fmt;

use super::Value;

/// Comparison operators supported in rule expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
}

/// Logical connective joining two subtrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Connective {
    And,
    Or,
}

/// A leaf test of one record attribute against one literal.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub attribute: String,
    pub op: CompareOp,
    pub literal: Value,
}

/// Rule AST.
///
/// Every `Logical` node owns both of its children, so a tree is always
/// complete and acyclic. Trees are immutable once built and can be shared
/// across threads for evaluation.
///
/// Serializes to the persisted document shape described in [`crate::document`].
///
/// Cloning, comparing, displaying and dropping walk the tree with an
/// explicit stack, so arbitrarily deep trees (e.g. long `AND` chains) never
/// exhaust the call stack.
#[derive(Debug)]
pub enum Node {
    Comparison(Comparison),
    Logical {
        connective: Connective,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl CompareOp {
    /// The canonical operator token, e.g. `">="`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            CompareOp::Eq => "==",
            CompareOp::Neq => "!=",
            CompareOp::Gt => ">",
            CompareOp::Gte => ">=",
            CompareOp::Lt => "<",
            CompareOp::Lte => "<=",
        }
    }

    /// Parse one of the six canonical operator tokens. A bare `=` is not
    /// accepted here; it only exists as rule-text sugar.
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        Some(match token {
            "==" => CompareOp::Eq,
            "!=" => CompareOp::Neq,
            ">" => CompareOp::Gt,
            ">=" => CompareOp::Gte,
            "<" => CompareOp::Lt,
            "<=" => CompareOp::Lte,
            _ => return None,
        })
    }
}

impl Connective {
    /// The keyword used in rule text, `"AND"` or `"OR"`.
    #[must_use]
    pub fn keyword(self) -> &'static str {
        match self {
            Connective::And => "AND",
            Connective::Or => "OR",
        }
    }

    #[must_use]
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "AND" => Some(Connective::And),
            "OR" => Some(Connective::Or),
            _ => None,
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Connective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.attribute, self.op, self.literal)
    }
}

/// Fully parenthesized rule text. Parsing the output yields an identical tree.
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        enum Piece<'a> {
            Node(&'a Node),
            Text(&'static str),
        }

        let mut work = vec![Piece::Node(self)];
        while let Some(piece) = work.pop() {
            match piece {
                Piece::Text(text) => f.write_str(text)?,
                Piece::Node(Node::Comparison(cmp)) => write!(f, "{cmp}")?,
                Piece::Node(Node::Logical {
                    connective,
                    left,
                    right,
                }) => {
                    f.write_str("(")?;
                    work.push(Piece::Text(")"));
                    work.push(Piece::Node(right.as_ref()));
                    work.push(Piece::Text(match connective {
                        Connective::And => " AND ",
                        Connective::Or => " OR ",
                    }));
                    work.push(Piece::Node(left.as_ref()));
                }
            }
        }
        Ok(())
    }
}

impl Clone for Node {
    fn clone(&self) -> Self {
        enum Frame<'a> {
            Visit(&'a Node),
            Join(Connective),
        }

        let mut work = vec![Frame::Visit(self)];
        let mut built: Vec<Node> = Vec::new();
        while let Some(frame) = work.pop() {
            match frame {
                Frame::Visit(Node::Comparison(cmp)) => built.push(Node::Comparison(cmp.clone())),
                Frame::Visit(Node::Logical {
                    connective,
                    left,
                    right,
                }) => {
                    work.push(Frame::Join(*connective));
                    work.push(Frame::Visit(right.as_ref()));
                    work.push(Frame::Visit(left.as_ref()));
                }
                Frame::Join(connective) => {
                    let right = built.pop().expect("right subtree cloned before join");
                    let left = built.pop().expect("left subtree cloned before join");
                    built.push(Node::logical(connective, left, right));
                }
            }
        }
        built.pop().expect("root cloned")
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        let mut pending: Vec<(&Node, &Node)> = vec![(self, other)];
        while let Some(pair) = pending.pop() {
            match pair {
                (Node::Comparison(a), Node::Comparison(b)) => {
                    if a != b {
                        return false;
                    }
                }
                (
                    Node::Logical {
                        connective: ca,
                        left: la,
                        right: ra,
                    },
                    Node::Logical {
                        connective: cb,
                        left: lb,
                        right: rb,
                    },
                ) => {
                    if ca != cb {
                        return false;
                    }
                    pending.push((ra.as_ref(), rb.as_ref()));
                    pending.push((la.as_ref(), lb.as_ref()));
                }
                _ => return false,
            }
        }
        true
    }
}

impl Drop for Node {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        detach_logical_children(self, &mut pending);
        // Each detached node has only leaf children left by the time it drops.
        while let Some(mut node) = pending.pop() {
            detach_logical_children(&mut node, &mut pending);
        }
    }
}

/// Move `Logical` children out of `node`, leaving empty leaves behind.
fn detach_logical_children(node: &mut Node, out: &mut Vec<Node>) {
    if let Node::Logical { left, right, .. } = node {
        for child in [left, right] {
            if matches!(**child, Node::Logical { .. }) {
                out.push(std::mem::replace(&mut **child, Node::empty_leaf()));
            }
        }
    }
}

impl Node {
    /// Build a `Logical` node owning both subtrees.
    #[must_use]
    pub fn logical(connective: Connective, left: Node, right: Node) -> Node {
        Node::Logical {
            connective,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    #[must_use]
    pub fn and(self, other: Node) -> Node {
        Node::logical(Connective::And, self, other)
    }

    #[must_use]
    pub fn or(self, other: Node) -> Node {
        Node::logical(Connective::Or, self, other)
    }

    /// The connective of the root, or `None` when the root is a comparison.
    #[must_use]
    pub fn top_connective(&self) -> Option<Connective> {
        match self {
            Node::Comparison(_) => None,
            Node::Logical { connective, .. } => Some(*connective),
        }
    }

    /// Number of nodes on the longest root-to-leaf path. A lone comparison has depth 1.
    #[must_use]
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut pending = vec![(self, 1_usize)];
        while let Some((node, level)) = pending.pop() {
            deepest = deepest.max(level);
            if let Node::Logical { left, right, .. } = node {
                pending.push((right.as_ref(), level + 1));
                pending.push((left.as_ref(), level + 1));
            }
        }
        deepest
    }

    /// Number of comparison leaves.
    #[must_use]
    pub fn comparison_count(&self) -> usize {
        self.comparisons().count()
    }

    /// Distinct attribute names referenced anywhere in the tree, sorted.
    #[must_use]
    pub fn attributes(&self) -> BTreeSet<&str> {
        self.comparisons()
            .map(|cmp| cmp.attribute.as_str())
            .collect()
    }

    /// Comparison leaves in left-to-right order.
    pub fn comparisons(&self) -> impl Iterator<Item = &Comparison> {
        let mut pending = vec![self];
        std::iter::from_fn(move || {
            while let Some(node) = pending.pop() {
                match node {
                    Node::Comparison(cmp) => return Some(cmp),
                    Node::Logical { left, right, .. } => {
                        pending.push(right.as_ref());
                        pending.push(left.as_ref());
                    }
                }
            }
            None
        })
    }

    fn empty_leaf() -> Node {
        Node::Comparison(Comparison {
            attribute: String::new(),
            op: CompareOp::Eq,
            literal: Value::Bool(false),
        })
    }
}

impl From<Comparison> for Node {
    fn from(cmp: Comparison) -> Self {
        Node::Comparison(cmp)
    }
}

/// Intermediate builder for comparison leaves.
/// Created by [`attr()`]; requires a comparison method to produce a [`Node`].
#[derive(Debug, Clone)]
pub struct AttrExpr {
    name: String,
}

impl AttrExpr {
    fn compare(self, op: CompareOp, literal: impl Into<Value>) -> Node {
        Node::Comparison(Comparison {
            attribute: self.name,
            op,
            literal: literal.into(),
        })
    }

    #[must_use]
    pub fn eq(self, literal: impl Into<Value>) -> Node {
        self.compare(CompareOp::Eq, literal)
    }

    #[must_use]
    pub fn neq(self, literal: impl Into<Value>) -> Node {
        self.compare(CompareOp::Neq, literal)
    }

    #[must_use]
    pub fn gt(self, literal: impl Into<Value>) -> Node {
        self.compare(CompareOp::Gt, literal)
    }

    #[must_use]
    pub fn gte(self, literal: impl Into<Value>) -> Node {
        self.compare(CompareOp::Gte, literal)
    }

    #[must_use]
    pub fn lt(self, literal: impl Into<Value>) -> Node {
        self.compare(CompareOp::Lt, literal)
    }

    #[must_use]
    pub fn lte(self, literal: impl Into<Value>) -> Node {
        self.compare(CompareOp::Lte, literal)
    }
}

#[must_use]
pub fn attr(name: &str) -> AttrExpr {
    AttrExpr {
        name: name.to_owned(),
    }
}
