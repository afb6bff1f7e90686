//! # Configuration Tree
//!
//! The host application owns a configuration object graph. Corral only reads
//! it: each node exposes its structured properties (the ones whose type is
//! itself a configuration node) as [`ConfigChild`] edges, in declaration
//! order. Primitive properties are not edges and are never visited.
//!
//! Nodes are usually described with `#[derive(ConfigNode)]`; a manual
//! implementation looks like this:
//!
//! ```rust,ignore
//! struct Root {
//!     name: String,
//!     storage: Storage,
//!     mail: Option<Mail>,
//! }
//!
//! impl ConfigNode for Root {
//!     fn children(&self) -> Vec<ConfigChild<'_>> {
//!         vec![
//!             ConfigChild::required("storage", &self.storage),
//!             ConfigChild::optional("mail", self.mail.as_ref()),
//!         ]
//!     }
//!
//!     fn as_any(&self) -> &dyn Any {
//!         self
//!     }
//! }
//! ```

use std::any::{Any, TypeId, type_name};
use std::fmt;

/// A node in the host's configuration tree.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a configuration node",
    label = "missing `ConfigNode` implementation",
    note = "Derive it with `#[derive(ConfigNode)]` or implement `children` and `as_any`."
)]
pub trait ConfigNode: Any + Send + Sync {
    /// Structured properties of this node, in declaration order.
    fn children(&self) -> Vec<ConfigChild<'_>> {
        Vec::new()
    }

    /// Upcast for downcasting to the concrete node type.
    fn as_any(&self) -> &dyn Any;

    /// Fully-qualified name of the node's concrete type.
    fn type_name(&self) -> &'static str {
        type_name::<Self>()
    }
}

impl dyn ConfigNode {
    /// The concrete type of this node.
    pub fn node_type(&self) -> TypeId {
        self.as_any().type_id()
    }

    /// Returns `true` if the node is a `T`.
    pub fn is<T: ConfigNode>(&self) -> bool {
        self.node_type() == TypeId::of::<T>()
    }

    /// Downcast to a concrete node type.
    pub fn downcast_ref<T: ConfigNode>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}

impl fmt::Debug for dyn ConfigNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigNode")
            .field("type", &self.type_name())
            .finish_non_exhaustive()
    }
}

/// A named edge from a configuration node to one of its structured properties.
///
/// The declared type is what matching uses, so an optional property still
/// declares its type when it currently holds no value.
#[derive(Clone, Copy)]
pub struct ConfigChild<'a> {
    name: &'static str,
    declared_type: TypeId,
    declared_type_name: &'static str,
    value: Option<&'a dyn ConfigNode>,
}

impl<'a> ConfigChild<'a> {
    /// An edge to a property that always holds a value.
    pub fn required<T: ConfigNode>(name: &'static str, value: &'a T) -> Self {
        Self {
            name,
            declared_type: TypeId::of::<T>(),
            declared_type_name: type_name::<T>(),
            value: Some(value),
        }
    }

    /// An edge to a property that may be unset.
    pub fn optional<T: ConfigNode>(name: &'static str, value: Option<&'a T>) -> Self {
        Self {
            name,
            declared_type: TypeId::of::<T>(),
            declared_type_name: type_name::<T>(),
            value: value.map(|v| v as &dyn ConfigNode),
        }
    }

    /// Property name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The property's declared type.
    pub fn declared_type(&self) -> TypeId {
        self.declared_type
    }

    /// Name of the property's declared type.
    pub fn declared_type_name(&self) -> &'static str {
        self.declared_type_name
    }

    /// The property's current value, if set.
    pub fn value(&self) -> Option<&'a dyn ConfigNode> {
        self.value
    }
}

impl fmt::Debug for ConfigChild<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigChild")
            .field("name", &self.name)
            .field("declared_type", &self.declared_type_name)
            .field("set", &self.value.is_some())
            .finish()
    }
}

/// The unit configuration, for handlers that need no configuration slice.
///
/// No tree contains `()` unless a node declares it, so jobs using it are
/// bound to `None` and validators using it are skipped.
impl ConfigNode for () {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Leaf;

    impl ConfigNode for Leaf {
        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    struct Branch {
        leaf: Leaf,
        spare: Option<Leaf>,
    }

    impl ConfigNode for Branch {
        fn children(&self) -> Vec<ConfigChild<'_>> {
            vec![
                ConfigChild::required("leaf", &self.leaf),
                ConfigChild::optional("spare", self.spare.as_ref()),
            ]
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[test]
    fn node_type_is_concrete_type() {
        let branch = Branch {
            leaf: Leaf,
            spare: None,
        };
        let node: &dyn ConfigNode = &branch;

        assert_eq!(node.node_type(), TypeId::of::<Branch>());
        assert!(node.is::<Branch>());
        assert!(node.downcast_ref::<Leaf>().is_none());
        assert!(node.type_name().ends_with("Branch"));
    }

    #[test]
    fn optional_child_declares_type_without_value() {
        let branch = Branch {
            leaf: Leaf,
            spare: None,
        };
        let children = branch.children();

        assert_eq!(children.len(), 2);
        assert_eq!(children[0].name(), "leaf");
        assert!(children[0].value().is_some());
        assert_eq!(children[1].declared_type(), TypeId::of::<Leaf>());
        assert!(children[1].value().is_none());
    }
}
