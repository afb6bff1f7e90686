//! Dispatcher core trait.

/// Discovers the handlers of one extension point and dispatches them.
///
/// Hosts construct a dispatcher once per extension point and call
/// [`dispatch`](Self::dispatch) at startup. What dispatching produces depends
/// on the extension point: background tasks are registered with a scheduler,
/// validators are run and their findings returned.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a dispatcher",
    label = "missing `Dispatcher` implementation",
    note = "Implement `Dispatcher` to discover and dispatch handlers."
)]
pub trait Dispatcher {
    /// What a dispatch produces.
    type Output<'a>
    where
        Self: 'a;

    /// Discover handlers and dispatch them.
    fn dispatch(&self) -> Self::Output<'_>;
}
