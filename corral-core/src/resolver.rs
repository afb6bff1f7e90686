//! Configuration slice resolution.
//!
//! Finds the sub-node of a configuration tree whose type equals a handler's
//! declared configuration type. The shallowest occurrence wins: the root
//! itself, then its direct properties, then a depth-first search of each
//! property's subtree. Ties at the same depth go to the first-declared
//! property.

use crate::config::{ConfigChild, ConfigNode};
use std::any::TypeId;

/// Default bound on how deep [`ConfigTreeResolver`] descends.
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Resolves configuration slices by exact type match.
#[derive(Debug, Clone, Copy)]
pub struct ConfigTreeResolver {
    max_depth: usize,
}

impl Default for ConfigTreeResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigTreeResolver {
    /// Create a resolver with [`DEFAULT_MAX_DEPTH`].
    pub const fn new() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Set how many nested levels the depth-first pass may enter.
    ///
    /// The root and its direct properties are always examined.
    pub const fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// The configured depth bound.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Find the node of type `target` in the tree rooted at `root`.
    ///
    /// Returns `None` when nothing matches, and also when the shallowest
    /// match is an unset optional property.
    pub fn resolve<'a>(
        &self,
        root: &'a dyn ConfigNode,
        target: TypeId,
    ) -> Option<&'a dyn ConfigNode> {
        let found = self.search(root, target, 0);

        tracing::trace!(
            root = root.type_name(),
            found = found.map(|node| node.type_name()),
            "resolved configuration slice"
        );

        found
    }

    /// Typed variant of [`resolve`](Self::resolve).
    pub fn resolve_as<'a, T: ConfigNode>(&self, root: &'a dyn ConfigNode) -> Option<&'a T> {
        self.resolve(root, TypeId::of::<T>())
            .and_then(|node| node.downcast_ref::<T>())
    }

    fn search<'a>(
        &self,
        node: &'a dyn ConfigNode,
        target: TypeId,
        depth: usize,
    ) -> Option<&'a dyn ConfigNode> {
        if node.node_type() == target {
            return Some(node);
        }

        let children = node.children();

        // Direct properties first: a depth-1 match beats any deeper one.
        if let Some(child) = children
            .iter()
            .find(|child| child.declared_type() == target)
        {
            return child.value();
        }

        if depth >= self.max_depth {
            if has_values(&children) {
                tracing::warn!(
                    node = node.type_name(),
                    max_depth = self.max_depth,
                    "configuration tree deeper than resolver bound, branch skipped"
                );
            }
            return None;
        }

        children
            .iter()
            .filter_map(|child| child.value())
            .find_map(|value| self.search(value, target, depth + 1))
    }
}

/// Whether any child has a value to descend into.
fn has_values(children: &[ConfigChild<'_>]) -> bool {
    children.iter().any(|child| child.value().is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::any::Any;

    #[derive(Debug, PartialEq)]
    struct Mail {
        host: &'static str,
    }

    struct Storage {
        mail: Mail,
    }

    struct Root {
        storage: Storage,
        mail: Option<Mail>,
    }

    impl ConfigNode for Mail {
        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    impl ConfigNode for Storage {
        fn children(&self) -> Vec<ConfigChild<'_>> {
            vec![ConfigChild::required("mail", &self.mail)]
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    impl ConfigNode for Root {
        fn children(&self) -> Vec<ConfigChild<'_>> {
            vec![
                ConfigChild::required("storage", &self.storage),
                ConfigChild::optional("mail", self.mail.as_ref()),
            ]
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    fn root(mail: Option<Mail>) -> Root {
        Root {
            storage: Storage {
                mail: Mail { host: "deep" },
            },
            mail,
        }
    }

    #[test]
    fn root_matches_itself() {
        let root = root(None);
        let found = ConfigTreeResolver::new().resolve_as::<Root>(&root);
        assert!(found.is_some());
    }

    #[test]
    fn direct_property_beats_deeper_occurrence() {
        let root = root(Some(Mail { host: "shallow" }));
        let found = ConfigTreeResolver::new().resolve_as::<Mail>(&root);
        assert_eq!(found, Some(&Mail { host: "shallow" }));
    }

    #[test]
    fn unset_direct_property_stops_the_search() {
        let root = root(None);
        let found = ConfigTreeResolver::new().resolve_as::<Mail>(&root);
        assert!(found.is_none());
    }

    #[test]
    fn depth_bound_cuts_off_search() {
        let storage = Storage {
            mail: Mail { host: "deep" },
        };
        struct Outer {
            storage: Storage,
        }
        impl ConfigNode for Outer {
            fn children(&self) -> Vec<ConfigChild<'_>> {
                vec![ConfigChild::required("storage", &self.storage)]
            }
            fn as_any(&self) -> &dyn Any {
                self
            }
        }
        let outer = Outer { storage };

        let shallow = ConfigTreeResolver::new().with_max_depth(0);
        assert!(shallow.resolve_as::<Mail>(&outer).is_none());

        let deep = ConfigTreeResolver::new().with_max_depth(1);
        assert_eq!(
            deep.resolve_as::<Mail>(&outer),
            Some(&Mail { host: "deep" })
        );
    }

    #[test]
    fn bound_is_only_reported_when_something_is_cut_off() {
        let leaf = Mail { host: "leaf" };
        assert!(!has_values(&leaf.children()));

        let root = root(None);
        let children = root.children();
        assert!(!has_values(&children[1..]));
        assert!(has_values(&children));
    }
}
