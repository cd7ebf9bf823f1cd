//! Emits a directed-graph document from a compiled AST: nodes grouped by
//! depth into same-rank subgraphs, edges from each node to its children.
//!
//! Grounded on `rajax/visualize.py`'s `ast_walk_tree`/`ast_dot`: ids are
//! assigned in DFS preorder (not level order) but bucketed by depth for
//! layout, exactly as that module does.

use std::io::{self, Write};

use hvm_parser::Ast;

struct WalkedNode<'a> {
    id: usize,
    node: &'a Ast,
    depth: usize,
}

fn walk<'a>(
    node: &'a Ast,
    depth: usize,
    counter: &mut usize,
    nodes: &mut Vec<WalkedNode<'a>>,
    edges: &mut Vec<(usize, usize)>,
) -> usize {
    *counter += 1;
    let id = *counter;
    nodes.push(WalkedNode { id, node, depth });

    for child in node.children() {
        let child_id = walk(child, depth + 1, counter, nodes, edges);
        edges.push((id, child_id));
    }

    id
}

fn escape_label(label: &str) -> String {
    label.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Write `root`'s diagram to `sink` as a directed-graph document named
/// `name`. Node IDs are an implementation detail of traversal order; callers
/// that want structural equality should compare depth partitions and edge
/// sets, not raw output bytes.
pub fn render_ast<W: Write>(root: &Ast, sink: &mut W, name: &str) -> io::Result<()> {
    let mut counter = 0usize;
    let mut nodes = Vec::new();
    let mut edges = Vec::new();
    walk(root, 0, &mut counter, &mut nodes, &mut edges);

    let max_depth = nodes.iter().map(|n| n.depth).max().unwrap_or(0);
    let mut ranks: Vec<Vec<&WalkedNode>> = (0..=max_depth).map(|_| Vec::new()).collect();
    for n in &nodes {
        ranks[n.depth].push(n);
    }

    writeln!(sink, "digraph {name} {{")?;
    writeln!(sink, "    node [shape=box];")?;

    for rank in &ranks {
        writeln!(sink, "    {{")?;
        writeln!(sink, "        rank=same;")?;
        for n in rank {
            writeln!(sink, "        {} [label=\"{}\"];", n.id, escape_label(&n.node.label()))?;
        }
        writeln!(sink, "    }}")?;
    }

    for (parent, child) in &edges {
        writeln!(sink, "    {parent} -> {child};")?;
    }

    writeln!(sink, "}}")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hvm_parser::{CharValue, NonDupReNode, ReExprNode};

    fn char_node(c: char) -> Ast {
        Ast::NonDupRe(NonDupReNode::Char { value: CharValue::Char(c), children: vec![] })
    }

    fn render(root: &Ast) -> String {
        let mut buf = Vec::new();
        render_ast(root, &mut buf, "AST").unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn single_node_has_no_edges() {
        let doc = render(&char_node('a'));
        assert!(!doc.contains("->"));
        assert!(doc.contains("nondup_re_char: a"));
    }

    #[test]
    fn depth_partition_groups_parent_and_children_separately() {
        let ast = Ast::ReExpr(ReExprNode::Concat(Box::new(char_node('a')), Box::new(char_node('b'))));
        let doc = render(&ast);

        let rank_blocks: Vec<&str> = doc.split("rank=same;").skip(1).collect();
        assert_eq!(rank_blocks.len(), 2);
        assert!(rank_blocks[0].contains("re_expr_concat"));
        assert!(rank_blocks[1].contains("nondup_re_char: a"));
        assert!(rank_blocks[1].contains("nondup_re_char: b"));
    }

    #[test]
    fn edge_set_connects_root_to_both_children() {
        let ast = Ast::ReExpr(ReExprNode::Concat(Box::new(char_node('a')), Box::new(char_node('b'))));
        let doc = render(&ast);
        let edge_lines: Vec<&str> = doc.lines().filter(|l| l.contains("->")).collect();
        assert_eq!(edge_lines.len(), 2);
        assert!(edge_lines.iter().all(|l| l.trim_start().starts_with("1 ->")));
    }

    #[test]
    fn header_names_the_graph() {
        let doc = render(&char_node('a'));
        assert!(doc.starts_with("digraph AST {"));
        assert!(doc.trim_end().ends_with('}'));
    }

    #[test]
    fn label_with_quote_is_escaped() {
        // Not reachable via normal labels, but escape_label must be safe
        // against arbitrary content if a future label embeds one.
        assert_eq!(escape_label("a\"b\\c"), "a\\\"b\\\\c");
    }
}
