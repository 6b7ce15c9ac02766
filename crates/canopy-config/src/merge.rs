//! Collision detection and merging of configuration fragments.
//!
//! Fragments may share tables (several files can each add keys under
//! `[core]`), but no leaf value may be defined twice. All collisions across
//! all fragment pairs are gathered before failing.

use serde_json::{Map, Value};
use tracing::info;

use crate::error::ConfigError;
use crate::parse::Fragment;

/// Dotted paths of keys defined in both `a` and `b`, in `a`'s key order.
///
/// A key present in both only escapes conflict when both values are
/// tables, in which case the search continues inside them.
pub fn check_dict_leaves(a: &Map<String, Value>, b: &Map<String, Value>) -> Vec<String> {
    let mut conflicts = Vec::new();
    collect_conflicts(a, b, "", &mut conflicts);
    conflicts
}

fn collect_conflicts(
    a: &Map<String, Value>,
    b: &Map<String, Value>,
    prefix: &str,
    out: &mut Vec<String>,
) {
    for (key, a_val) in a {
        let Some(b_val) = b.get(key) else { continue };
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match (a_val, b_val) {
            (Value::Object(a_sub), Value::Object(b_sub)) => {
                collect_conflicts(a_sub, b_sub, &path, out);
            }
            _ => out.push(path),
        }
    }
}

/// Recursively merge `src` into `dest`, descending into shared tables.
pub fn deep_merge(dest: &mut Map<String, Value>, src: Map<String, Value>) {
    for (key, value) in src {
        match (dest.get_mut(&key), value) {
            (Some(Value::Object(d)), Value::Object(s)) => deep_merge(d, s),
            (_, value) => {
                dest.insert(key, value);
            }
        }
    }
}

/// Merge `fragments` into a single configuration tree.
///
/// # Errors
///
/// Returns [`ConfigError::Collisions`] with one line per shared leaf,
/// naming the later fragment first.
pub fn merge_fragments(fragments: Vec<Fragment>) -> Result<Map<String, Value>, ConfigError> {
    let mut collisions = Vec::new();
    for (i, later) in fragments.iter().enumerate() {
        for earlier in fragments.iter().take(i) {
            collisions.extend(
                check_dict_leaves(&later.tree, &earlier.tree)
                    .into_iter()
                    .map(|path| {
                        format!("{path} defined in both {} and {}", later.label, earlier.label)
                    }),
            );
        }
    }
    if !collisions.is_empty() {
        return Err(ConfigError::Collisions(collisions).logged());
    }

    let count = fragments.len();
    let mut merged = Map::new();
    for fragment in fragments {
        deep_merge(&mut merged, fragment.tree);
    }
    info!(fragments = count, "Configuration fragments merged");
    Ok(merged)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn obj(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    #[test]
    fn leaf_against_table_conflicts() {
        let a = obj(json!({"d1": 1}));
        let b = obj(json!({"d1": {"d2": 1}}));
        assert_eq!(check_dict_leaves(&a, &b), vec!["d1".to_owned()]);
    }

    #[test]
    fn nested_conflicts_use_dotted_paths() {
        let a = obj(json!({"d1": {"d2": {"d3": 1, "d4": 2, "d5": 3}}}));
        let b = obj(json!({"d1": {"d2": {"d3": 4, "d4": 5}, "d6": 6}}));
        assert_eq!(
            check_dict_leaves(&a, &b),
            vec!["d1.d2.d3".to_owned(), "d1.d2.d4".to_owned()]
        );
    }

    #[test]
    fn disjoint_tables_do_not_conflict() {
        let a = obj(json!({"core": {"grid": {"cell_nx": 3}}}));
        let b = obj(json!({"core": {"grid": {"cell_ny": 2}}, "plants": {}}));
        assert!(check_dict_leaves(&a, &b).is_empty());
    }

    #[test]
    fn merge_combines_shared_tables() {
        let fragments = vec![
            Fragment { label: "a".to_owned(), tree: obj(json!({"core": {"grid": {"cell_nx": 3}}})) },
            Fragment { label: "b".to_owned(), tree: obj(json!({"core": {"grid": {"cell_ny": 2}}})) },
        ];
        let merged = merge_fragments(fragments).unwrap();
        assert_eq!(
            Value::Object(merged),
            json!({"core": {"grid": {"cell_nx": 3, "cell_ny": 2}}})
        );
    }

    #[test]
    fn collision_names_later_file_first() {
        let fragments = vec![
            Fragment {
                label: "fake_file1.toml".to_owned(),
                tree: obj(json!({"core": {"grid": {"nx": 10}}})),
            },
            Fragment {
                label: "fake_file2.toml".to_owned(),
                tree: obj(json!({"core": {"grid": {"nx": 12}}})),
            },
        ];
        let message = merge_fragments(fragments).err().map(|e| e.to_string());
        assert_eq!(
            message.as_deref(),
            Some(
                "The following tags are defined in multiple config files:\n\
                 core.grid.nx defined in both fake_file2.toml and fake_file1.toml"
            )
        );
    }
}
