// Structural JSON diff for the compare command.
//
// Walks remote and local documents in lockstep and reports differences as
// JSON-pointer paths. Purely presentational; geometry is compared as plain
// JSON, never geometrically.

use std::fmt;

use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffKind {
    Add,
    Remove,
    Replace,
}

impl fmt::Display for DiffKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Add => write!(f, "add"),
            Self::Remove => write!(f, "remove"),
            Self::Replace => write!(f, "replace"),
        }
    }
}

/// One difference between the remote (old) and local (new) documents.
#[derive(Debug, Clone)]
pub struct DiffOp {
    pub kind: DiffKind,
    /// JSON pointer into the document ("/geometry/coordinates/0/1").
    pub path: String,
    pub old: Option<Value>,
    pub new: Option<Value>,
}

/// Differences turning `remote` into `local`. Empty means identical.
pub fn diff(remote: &Value, local: &Value) -> Vec<DiffOp> {
    let mut ops = Vec::new();
    walk(remote, local, String::new(), &mut ops);
    ops
}

fn walk(old: &Value, new: &Value, path: String, ops: &mut Vec<DiffOp>) {
    match (old, new) {
        (Value::Object(old_map), Value::Object(new_map)) => {
            for (key, old_val) in old_map {
                let child = format!("{path}/{}", escape_pointer(key));
                match new_map.get(key) {
                    Some(new_val) => walk(old_val, new_val, child, ops),
                    None => ops.push(DiffOp {
                        kind: DiffKind::Remove,
                        path: child,
                        old: Some(old_val.clone()),
                        new: None,
                    }),
                }
            }
            for (key, new_val) in new_map {
                if !old_map.contains_key(key) {
                    ops.push(DiffOp {
                        kind: DiffKind::Add,
                        path: format!("{path}/{}", escape_pointer(key)),
                        old: None,
                        new: Some(new_val.clone()),
                    });
                }
            }
        }
        (Value::Array(old_arr), Value::Array(new_arr)) => {
            let shared = old_arr.len().min(new_arr.len());
            for i in 0..shared {
                walk(&old_arr[i], &new_arr[i], format!("{path}/{i}"), ops);
            }
            for (i, old_val) in old_arr.iter().enumerate().skip(shared) {
                ops.push(DiffOp {
                    kind: DiffKind::Remove,
                    path: format!("{path}/{i}"),
                    old: Some(old_val.clone()),
                    new: None,
                });
            }
            for (i, new_val) in new_arr.iter().enumerate().skip(shared) {
                ops.push(DiffOp {
                    kind: DiffKind::Add,
                    path: format!("{path}/{i}"),
                    old: None,
                    new: Some(new_val.clone()),
                });
            }
        }
        (old_val, new_val) => {
            if old_val != new_val {
                ops.push(DiffOp {
                    kind: DiffKind::Replace,
                    path,
                    old: Some(old_val.clone()),
                    new: Some(new_val.clone()),
                });
            }
        }
    }
}

/// JSON pointer escaping: "~" -> "~0", "/" -> "~1".
fn escape_pointer(key: &str) -> String {
    key.replace('~', "~0").replace('/', "~1")
}

/// Render ops as a unified-style report, one hunk per difference.
pub fn render(ops: &[DiffOp]) -> String {
    let mut out = String::new();
    for op in ops {
        out.push_str(&format!("@@ {} @@ ({})\n", op.path, op.kind));
        if let Some(old) = &op.old {
            out.push_str(&format!("- {old}\n"));
        }
        if let Some(new) = &op.new {
            out.push_str(&format!("+ {new}\n"));
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn identical_documents_diff_empty() {
        let doc = json!({"type": "Feature", "properties": {"code": "31"}});
        assert!(diff(&doc, &doc).is_empty());
    }

    #[test]
    fn scalar_change_is_replace_with_pointer_path() {
        let remote = json!({"properties": {"name": "Aceh"}});
        let local = json!({"properties": {"name": "ACEH"}});
        let ops = diff(&remote, &local);
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].kind, DiffKind::Replace);
        assert_eq!(ops[0].path, "/properties/name");
    }

    #[test]
    fn array_growth_and_shrink() {
        let remote = json!({"coords": [1, 2, 3]});
        let local = json!({"coords": [1, 9]});
        let ops = diff(&remote, &local);
        assert_eq!(ops.len(), 2);
        assert_eq!(ops[0].path, "/coords/1");
        assert_eq!(ops[0].kind, DiffKind::Replace);
        assert_eq!(ops[1].path, "/coords/2");
        assert_eq!(ops[1].kind, DiffKind::Remove);
    }

    #[test]
    fn added_and_removed_keys() {
        let remote = json!({"a": 1});
        let local = json!({"b": 2});
        let ops = diff(&remote, &local);
        let kinds: Vec<_> = ops.iter().map(|o| o.kind).collect();
        assert!(kinds.contains(&DiffKind::Remove));
        assert!(kinds.contains(&DiffKind::Add));
    }

    #[test]
    fn render_is_hunk_per_op() {
        let remote = json!({"name": "Aceh"});
        let local = json!({"name": "Bali"});
        let report = render(&diff(&remote, &local));
        assert!(report.contains("@@ /name @@ (replace)"));
        assert!(report.contains("- \"Aceh\""));
        assert!(report.contains("+ \"Bali\""));
    }

    #[test]
    fn pointer_keys_are_escaped() {
        let remote = json!({"a/b": 1});
        let local = json!({"a/b": 2});
        let ops = diff(&remote, &local);
        assert_eq!(ops[0].path, "/a~1b");
    }
}
