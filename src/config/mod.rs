//! Configuration module for DECLARE constraint definitions
//!
//! Constraints arrive either as JSON (deserialized with serde) or as single
//! `.decl` constraint lines.

mod constraint;

pub use constraint::*;

use crate::error::Result;

/// Deserialize a JSON array of constraint definitions
/// Expected format: [{"template": "Response", "activities": ["a", "b"], "activation": "A.x > 1"}, ...]
pub fn load_constraints_json(json: &str) -> Result<Vec<ConstraintConfig>> {
    Ok(serde_json::from_str(json)?)
}

/// Compile a batch of constraints, sharing one cache across them
pub fn compile_constraints(
    configs: &[ConstraintConfig],
    cache: &crate::condition::ConditionCache,
) -> Result<Vec<CompiledConstraint>> {
    configs.iter().map(|config| config.compile(cache)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::ConditionCache;
    use crate::error::ConditionError;

    #[test]
    fn test_load_constraints_json() {
        let json = r#"[
            {"template": "Response", "activities": ["a", "b"], "activation": "A.grade > 8", "time": "0,5,h"},
            {"template": "Existence", "activities": ["c"]}
        ]"#;

        let configs = load_constraints_json(json).unwrap();
        assert_eq!(configs.len(), 2);
        assert_eq!(configs[0].activation.as_deref(), Some("A.grade > 8"));
        assert_eq!(configs[1].activation, None);
        assert_eq!(configs[1].correlation, None);
    }

    #[test]
    fn test_load_constraints_json_rejects_malformed_input() {
        let err = load_constraints_json(r#"[{"activities": ["a"]}]"#).unwrap_err();
        assert!(matches!(err, ConditionError::Json(_)));
    }

    #[test]
    fn test_compile_constraints_shares_cache() {
        let configs = vec![
            ConstraintConfig::from_decl_line("Response[a, b] |A.x > 1 |T.y = 2 |").unwrap(),
            ConstraintConfig::from_decl_line("Precedence[b, c] |A.x > 1 | |").unwrap(),
        ];
        let cache = ConditionCache::new();

        let compiled = compile_constraints(&configs, &cache).unwrap();
        assert_eq!(compiled.len(), 2);
        assert_eq!(cache.len(), 2);
        assert_eq!(
            compiled[0].activation.as_ref().map(|t| t.tree_to_string()),
            compiled[1].activation.as_ref().map(|t| t.tree_to_string())
        );
    }
}
