//! Item-level handler self-registration.
//!
//! Handler types register themselves next to their definition instead of in
//! a central module list. A crate's registrations are gathered into one
//! [`HandlerModule`](crate::HandlerModule) with [`crate_module!`], or straight
//! into a [`HandlerCatalog`](crate::HandlerCatalog) with [`catalog!`].

/// Registers a background task for the given vault type.
///
/// The task must implement `BackgroundTask<Vault> + BackgroundOperation`.
///
/// # Example
/// ```rust,ignore
/// #[background_operation(name = "Cleanup", interval_minutes = 10)]
/// struct Cleanup { /* ... */ }
///
/// impl BackgroundTask<Vault> for Cleanup { /* ... */ }
///
/// corral::register_job!(Vault, Cleanup);
/// ```
#[macro_export]
macro_rules! register_job {
    ($vault:ty, $task:ty) => {
        $crate::inventory::submit! {
            $crate::Registration::job::<$vault, $task>(
                ::core::module_path!(),
                ::core::file!(),
                ::core::line!(),
            )
        }
    };
}

/// Registers a validator for the given vault type.
///
/// # Example
/// ```rust,ignore
/// corral::register_validator!(Vault, MailValidator);
/// ```
#[macro_export]
macro_rules! register_validator {
    ($vault:ty, $validator:ty) => {
        $crate::inventory::submit! {
            $crate::Registration::validator::<$vault, $validator>(
                ::core::module_path!(),
                ::core::file!(),
                ::core::line!(),
            )
        }
    };
}

/// Collects every handler registered in the calling crate.
///
/// The vault type is inferred from use, or can be given explicitly.
///
/// # Example
/// ```rust,ignore
/// let module = corral::crate_module!(Vault);
/// let catalog = HandlerCatalog::with_module(module);
/// ```
#[macro_export]
macro_rules! crate_module {
    () => {
        $crate::HandlerModule::of_crate(::core::module_path!())
    };
    ($vault:ty) => {
        $crate::HandlerModule::<$vault>::of_crate(::core::module_path!())
    };
}

/// Builds a catalog that scans the calling crate's registered handlers.
///
/// Further modules are scanned after the crate's own, in the order given.
///
/// # Example
/// ```rust,ignore
/// let catalog: HandlerCatalog<Vault> = corral::catalog!();
/// let catalog = corral::catalog!(Vault; HandlerModule::new("extra").job::<Purge>());
/// ```
#[macro_export]
macro_rules! catalog {
    () => {
        $crate::HandlerCatalog::for_crate(::core::module_path!())
    };
    ($vault:ty) => {
        $crate::HandlerCatalog::<$vault>::for_crate(::core::module_path!())
    };
    ($vault:ty; $($module:expr),+ $(,)?) => {
        $crate::HandlerCatalog::<$vault>::for_crate(::core::module_path!())
            $(.including($module))+
    };
}
