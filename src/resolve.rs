//! Suite resolution pass
//!
//! Resolves one execution config per scope in a single synchronous pass:
//!
//! 1. Validate required facts (any miss aborts the whole pass).
//! 2. Root scope: name, sanitizer options, substitutions, parallelism
//!    group, then the support gate.
//! 3. Each sub-suite: clone the parent's resolved config, apply local
//!    rules in order against the root's facts, then the support gate.

use psan_contract::{ExecutionConfig, DEFAULT_PARALLELISM_GROUP, SUITE_NAME_PREFIX};
use std::path::Path;

use crate::error::ResolveError;
use crate::facts::{ConfigFacts, SuiteFacts};
use crate::options::{append_options, SanitizerOptions};
use crate::scope::{LocalRule, ScopeId, ScopeTree, ROOT_SCOPE};
use crate::substitution::register_substitutions;
use crate::support::apply_support_gate;

/// Execution configs for every scope of a tree, in tree order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuiteResolution {
    pub configs: Vec<ExecutionConfig>,
}

impl SuiteResolution {
    /// Config for the named scope
    pub fn get(&self, scope: &str) -> Option<&ExecutionConfig> {
        self.configs.iter().find(|c| c.scope == scope)
    }

    pub fn root(&self) -> Option<&ExecutionConfig> {
        self.get(ROOT_SCOPE)
    }
}

/// Resolves execution configs for a scope tree from root facts
#[derive(Debug)]
pub struct Resolver<'a> {
    facts: SuiteFacts,
    tree: &'a ScopeTree,
}

impl<'a> Resolver<'a> {
    /// Validate `facts` for resolving `tree`.
    pub fn new(facts: &ConfigFacts, tree: &'a ScopeTree) -> Result<Self, ResolveError> {
        Ok(Self {
            facts: facts.validate()?,
            tree,
        })
    }

    pub fn facts(&self) -> &SuiteFacts {
        &self.facts
    }

    /// Resolve the scope with no parent.
    pub fn resolve_root(&self) -> Result<ExecutionConfig, ResolveError> {
        let facts = &self.facts;
        tracing::debug!(host = %facts.host_os, compiler = %facts.compiler_id, arch = %facts.target_arch, "resolving root scope");

        let name = format!("{}{}", SUITE_NAME_PREFIX, facts.name_suffix);
        let mut config = ExecutionConfig::new(ROOT_SCOPE, name, facts.test_source_root.clone());

        SanitizerOptions::for_host(&facts.host_os).apply(&mut config)?;
        register_substitutions(facts, &mut config.substitutions)?;

        config.parallelism_group = match &facts.parallelism_group {
            Some(group) if !group.is_empty() => group.clone(),
            _ => DEFAULT_PARALLELISM_GROUP.to_string(),
        };

        apply_support_gate(facts, &mut config);
        Ok(config)
    }

    /// Resolve a sub-suite from its parent's resolved config.
    fn resolve_child(&self, id: ScopeId, parent: &ExecutionConfig) -> Result<ExecutionConfig, ResolveError> {
        let node = self.tree.node(id)?;
        let source_root = Path::new(&parent.test_source_root)
            .join(&node.name)
            .to_string_lossy()
            .to_string();
        let mut config = parent.for_child(node.name.clone(), source_root);
        // A child inherits its parent's verdict but reports its own reasons.
        config.unsupported_reasons.clear();
        if parent.unsupported {
            config.unsupported_reasons.push(format!("parent scope '{}' is unsupported", parent.scope));
        }

        for rule in &node.rules {
            config = self.apply_rule(rule, config);
        }

        apply_support_gate(&self.facts, &mut config);
        tracing::debug!(scope = %config.scope, unsupported = config.unsupported, "resolved sub-suite");
        Ok(config)
    }

    fn apply_rule(&self, rule: &LocalRule, mut config: ExecutionConfig) -> ExecutionConfig {
        let host = &self.facts.host_os;
        match rule {
            LocalRule::RequireFeature(requirement) => requirement
                .evaluate(&self.facts.available_features, host)
                .apply(config),
            LocalRule::HostOnly(required_host) => {
                if host != required_host {
                    config.mark_unsupported(format!("only runs on {}", required_host));
                }
                config
            }
            LocalRule::AppendOptions { host: on, fragment } => {
                if host == on {
                    append_options(&mut config, fragment);
                }
                config
            }
        }
    }

    /// Resolve one scope, resolving its ancestors on the way down.
    pub fn resolve_scope(&self, id: ScopeId) -> Result<ExecutionConfig, ResolveError> {
        let chain = self.tree.ancestors(id)?;
        let mut config = self.resolve_root()?;
        for &scope in chain.iter().rev().skip(1) {
            config = self.resolve_child(scope, &config)?;
        }
        Ok(config)
    }

    /// Resolve every scope in the tree.
    pub fn resolve_all(&self) -> Result<SuiteResolution, ResolveError> {
        let mut resolved: Vec<Option<ExecutionConfig>> = vec![None; self.tree.len()];

        for id in self.tree.ids() {
            let chain = self.tree.ancestors(id)?;
            // Walk from the root down, reusing anything already resolved.
            let mut parent: Option<ExecutionConfig> = None;
            for &scope in chain.iter().rev() {
                let cached = resolved[scope.index()].clone();
                let config = match cached {
                    Some(done) => done,
                    None => {
                        let config = match &parent {
                            None => self.resolve_root()?,
                            Some(p) => self.resolve_child(scope, p)?,
                        };
                        resolved[scope.index()] = Some(config.clone());
                        config
                    }
                };
                parent = Some(config);
            }
        }

        let configs = resolved.into_iter().flatten().collect::<Vec<_>>();
        tracing::info!(
            scopes = configs.len(),
            unsupported = configs.iter().filter(|c| c.unsupported).count(),
            "suite resolved"
        );
        Ok(SuiteResolution { configs })
    }
}

/// Resolve the standard psan layout from raw facts.
pub fn resolve_suite(facts: &ConfigFacts) -> Result<SuiteResolution, ResolveError> {
    let tree = ScopeTree::standard();
    Resolver::new(facts, &tree)?.resolve_all()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facts::fixtures::{facts_on, linux_facts};
    use crate::facts::HostOs;
    use crate::scope::SubSuite;

    #[test]
    fn test_root_name_and_defaults() {
        let mut facts = linux_facts();
        facts.name_suffix = "-x86_64".to_string();
        let tree = ScopeTree::new();
        let config = Resolver::new(&facts, &tree).unwrap().resolve_root().unwrap();

        assert_eq!(config.name, "PredictiveSanitizer-x86_64");
        assert_eq!(config.parallelism_group, "shadow-memory");
        assert_eq!(config.substitutions.position("%env_psan_opts="), Some(0));
    }

    #[test]
    fn test_explicit_parallelism_group() {
        let mut facts = linux_facts();
        facts.parallelism_group = Some("psan-serial".to_string());
        let resolution = resolve_suite(&facts).unwrap();
        assert!(resolution.configs.iter().all(|c| c.parallelism_group == "psan-serial"));
    }

    #[test]
    fn test_missing_attribute_yields_no_config() {
        let mut facts = linux_facts();
        facts.clang = None;
        let err = resolve_suite(&facts).unwrap_err();
        assert!(matches!(err, ResolveError::MissingAttribute { ref name } if name == "clang"));
    }

    #[test]
    fn test_host_only_sub_suites() {
        let resolution = resolve_suite(&facts_on(HostOs::Darwin)).unwrap();
        assert!(!resolution.get("Darwin").unwrap().unsupported);
        assert!(resolution.get("Linux").unwrap().unsupported);

        let darwin = resolution.get("Darwin").unwrap();
        assert!(darwin
            .sanitizer_options()
            .unwrap()
            .ends_with(":ignore_interceptors_accesses=0:ignore_noninstrumented_modules=1"));
        assert_eq!(darwin.test_source_root, "/src/compiler-rt/test/psan/Darwin");
    }

    #[test]
    fn test_child_of_unsupported_parent_stays_unsupported() {
        let mut facts = linux_facts();
        facts.android = true;
        let resolution = resolve_suite(&facts).unwrap();
        let libdispatch = resolution.get("libdispatch").unwrap();
        assert!(libdispatch.unsupported);
        assert_eq!(libdispatch.unsupported_reasons[0], "parent scope 'root' is unsupported");
    }

    #[test]
    fn test_resolve_scope_matches_resolve_all() {
        let facts = facts_on(HostOs::Darwin);
        let tree = ScopeTree::standard();
        let resolver = Resolver::new(&facts, &tree).unwrap();
        let all = resolver.resolve_all().unwrap();

        for id in tree.ids() {
            assert_eq!(&resolver.resolve_scope(id).unwrap(), &all.configs[id.index()]);
        }
    }

    #[test]
    fn test_nested_sub_suite_inherits_augmentation() {
        let mut tree = ScopeTree::new();
        let dispatch = tree.add_child(tree.root(), SubSuite::libdispatch()).unwrap();
        tree.add_child(dispatch, SubSuite::new("nested", Vec::new())).unwrap();

        let resolution = Resolver::new(&linux_facts(), &tree).unwrap().resolve_all().unwrap();
        let nested = resolution.get("nested").unwrap();
        assert!(nested.substitutions.get("%clang_psan ").unwrap().ends_with(" -fblocks "));
        assert_eq!(nested.test_source_root, "/src/compiler-rt/test/psan/libdispatch/nested");
    }

    #[test]
    fn test_cyclic_tree_fails() {
        use crate::scope::ScopeNode;
        let nodes = vec![
            ScopeNode { name: "root".into(), parent: None, rules: Vec::new() },
            ScopeNode { name: "a".into(), parent: Some(ScopeId::from_index(2)), rules: Vec::new() },
            ScopeNode { name: "b".into(), parent: Some(ScopeId::from_index(1)), rules: Vec::new() },
        ];
        let tree = ScopeTree::from_nodes(nodes).unwrap();
        let err = Resolver::new(&linux_facts(), &tree).unwrap().resolve_all().unwrap_err();
        assert!(matches!(err, ResolveError::ScopeChain { .. }));
    }
}
