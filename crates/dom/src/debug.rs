use crate::tree::Tree;
use crate::types::{NodeId, NodeKind};

/// Indented outline of the subtree under `root`, capped at `cap` lines.
pub fn outline(tree: &Tree, root: NodeId, cap: usize) -> Vec<String> {
    fn walk(tree: &Tree, node: NodeId, depth: usize, out: &mut Vec<String>, left: &mut usize) {
        if *left == 0 {
            return;
        }
        *left -= 1;
        let indent = "  ".repeat(depth);
        match tree.kind(node) {
            NodeKind::Document => out.push(format!("{indent}#document")),
            NodeKind::Element { name, attributes, shadow_root } => {
                let mut line = format!("{indent}<{name}");
                for key in ["id", "is"] {
                    if let Some(value) = attributes.iter().find(|(k, _)| k == key).map(|(_, v)| v)
                    {
                        line.push_str(&format!(r#" {key}="{value}""#));
                    }
                }
                line.push('>');
                out.push(line);
                if let Some(shadow) = shadow_root {
                    walk(tree, *shadow, depth + 1, out, left);
                }
            }
            NodeKind::ShadowRoot { .. } => out.push(format!("{indent}#shadow-root")),
            NodeKind::Text { text } => {
                let t = text.replace('\n', " ").trim().to_string();
                if !t.is_empty() {
                    out.push(format!("{indent}\"{t}\""));
                }
            }
            NodeKind::Comment { text } => {
                let t = text.replace('\n', " ");
                out.push(format!("{indent}<!-- {t} -->"));
            }
        }
        for &child in tree.children(node) {
            walk(tree, child, depth + 1, out, left);
        }
    }

    let mut out = Vec::new();
    let mut left = cap;
    walk(tree, root, 0, &mut out, &mut left);
    out
}
