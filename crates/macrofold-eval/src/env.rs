//! Local environment.
//! 局部环境。

use crate::Confident;
use std::collections::HashMap;

/// Names assigned by evaluated `name = value` expressions.
///
/// The namespace is flat: it records what the evaluator has seen written,
/// not lexical scopes.
#[derive(Clone, Default)]
pub struct Environment {
    bindings: HashMap<String, Confident>,
}

impl Environment {
    /// Create a new empty environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name`, replacing any earlier binding.
    pub fn define(&mut self, name: impl Into<String>, value: Confident) {
        self.bindings.insert(name.into(), value);
    }

    /// Look up a name.
    pub fn get(&self, name: &str) -> Option<Confident> {
        self.bindings.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl std::fmt::Debug for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.bindings.keys().collect();
        names.sort();
        f.debug_set().entries(names).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Value;

    #[test]
    fn test_define_and_shadow() {
        let mut env = Environment::new();
        assert!(env.get("x").is_none());
        env.define("x", Confident::new(Value::Number(1.0)));
        env.define("x", Confident::new(Value::Number(2.0)));
        assert_eq!(env.len(), 1);
        assert_eq!(env.get("x").unwrap().get(), Ok(Value::Number(2.0)));
    }

    #[test]
    fn test_clone_is_independent() {
        let mut env = Environment::new();
        env.define("a", Confident::new(Value::Null));
        let mut copy = env.clone();
        copy.define("b", Confident::new(Value::Null));
        assert!(!env.contains("b"));
        assert!(copy.contains("a"));
        assert_eq!(format!("{:?}", copy), r#"{"a", "b"}"#);
    }
}
