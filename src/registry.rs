//! The name → builtin table.
//!
//! Built once at startup by [`Registry::with_builtins`] and passed around by
//! shared reference afterward; nothing mutates it after construction.

use std::collections::BTreeMap;

use crate::builtin;
use crate::command::Builtin;

/// Immutable-after-init mapping from command names to builtin handlers.
pub struct Registry {
    table: BTreeMap<String, Box<dyn Builtin>>,
}

impl Registry {
    /// An empty registry. Useful for embedding a reduced command set.
    pub fn new() -> Self {
        Registry {
            table: BTreeMap::new(),
        }
    }

    /// The full builtin set of the shell, assembled in one step.
    pub fn with_builtins() -> Self {
        let mut registry = Registry::new();
        registry.register("exit", Box::new(builtin::Exit));
        registry.register("echo", Box::new(builtin::Echo));
        registry.register("type", Box::new(builtin::Type));
        registry.register("pwd", Box::new(builtin::Pwd));
        registry.register("cd", Box::new(builtin::Cd));
        registry.register("ls", Box::new(builtin::Ls));
        registry.register("help", Box::new(builtin::Help));
        registry.register("mkdir", Box::new(builtin::Mkdir));
        registry.register("rm", Box::new(builtin::Rm));
        registry.register("cp", Box::new(builtin::Cp));
        registry.register("mv", Box::new(builtin::Mv));
        registry.register("cat", Box::new(builtin::Cat));
        registry.register("touch", Box::new(builtin::Touch));
        registry.register("head", Box::new(builtin::Head));
        registry.register("tail", Box::new(builtin::Tail));
        registry.register("chmod", Box::new(builtin::Chmod));
        registry.register("find", Box::new(builtin::Find));
        registry.register("source", Box::new(builtin::Source));
        registry
    }

    /// Inserts the mapping, replacing any previous handler for `name`.
    pub fn register(&mut self, name: impl Into<String>, handler: Box<dyn Builtin>) {
        self.table.insert(name.into(), handler);
    }

    /// The handler bound to `name`, if any.
    pub fn lookup(&self, name: &str) -> Option<&dyn Builtin> {
        self.table.get(name).map(Box::as_ref)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.table.keys().map(String::as_str)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Context;
    use crate::env::Environment;

    fn run_lookup(registry: &Registry, name: &str, args: &[&str]) -> String {
        let mut env = Environment::new();
        let mut out = Vec::new();
        let mut err = Vec::new();
        let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        let mut ctx = Context {
            registry,
            env: &mut env,
            out: &mut out,
            err: &mut err,
        };
        registry
            .lookup(name)
            .expect("name should be registered")
            .run(&mut ctx, &args)
            .unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_all_builtins_are_registered() {
        let registry = Registry::with_builtins();
        for name in [
            "exit", "echo", "type", "pwd", "cd", "ls", "help", "mkdir", "rm", "cp", "mv",
            "cat", "touch", "head", "tail", "chmod", "find", "source",
        ] {
            assert!(registry.lookup(name).is_some(), "{name} missing");
        }
        assert!(registry.lookup("bogus").is_none());
    }

    #[test]
    fn test_names_iterate_sorted() {
        let registry = Registry::with_builtins();
        let names: Vec<&str> = registry.names().collect();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        assert_eq!(names, sorted);
        assert_eq!(names.len(), 18);
    }

    #[test]
    fn test_distinct_names_resolve_to_distinct_handlers() {
        let registry = Registry::with_builtins();
        // behavioral check: each name runs its own command
        let echoed = run_lookup(&registry, "echo", &["marker"]);
        assert_eq!(echoed, "marker\n");
        let helped = run_lookup(&registry, "help", &["marker"]);
        assert!(helped.contains("echo\n"));
        assert_ne!(echoed, helped);
    }

    #[test]
    fn test_register_overwrites_previous_handler() {
        let mut registry = Registry::new();
        registry.register("say", Box::new(builtin::Help));
        registry.register("say", Box::new(builtin::Echo));
        let out = run_lookup(&registry, "say", &["now", "echo"]);
        assert_eq!(out, "now echo\n");
    }
}
