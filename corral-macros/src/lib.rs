//! Procedural macros for Corral.
//!
//! Use these through the `corral` crate (feature `macros`); generated code
//! refers to `::corral` paths.

mod config_node;
mod operation;

use proc_macro::TokenStream;

/// Derive macro for implementing the `ConfigNode` trait.
///
/// Mark structured properties with `#[config(node)]`; `Option<T>` fields are
/// optional children. Rename a child with `#[config(node, name = "...")]`.
///
/// ```rust,ignore
/// #[derive(Clone, ConfigNode)]
/// struct Root {
///     name: String,
///     #[config(node)]
///     storage: Storage,
///     #[config(node)]
///     mail: Option<Mail>,
/// }
/// ```
#[proc_macro_derive(ConfigNode, attributes(config))]
pub fn derive_config_node(input: TokenStream) -> TokenStream {
    config_node::derive_config_node_impl(input)
}

/// Tag a type as a background operation.
///
/// `name` is the operation name registered with the scheduler (defaults to
/// the type name). `interval_minutes = N` makes it recurring; otherwise it
/// runs on demand.
///
/// ```rust,ignore
/// #[background_operation(name = "Cleanup", interval_minutes = 10)]
/// struct Cleanup { /* ... */ }
/// ```
#[proc_macro_attribute]
pub fn background_operation(attr: TokenStream, item: TokenStream) -> TokenStream {
    operation::background_operation_impl(attr, item)
}
