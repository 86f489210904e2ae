//! Macros for sub-extension modules.

/// Exports `$factory` as the module's factory symbol.
///
/// `$factory` is any `fn(&ExtensionContext) -> Option<ExtensionBox>`. A panic
/// inside it is contained at the boundary and aborts the host process with
/// a logged error instead of unwinding across it.
///
/// # Example
/// ```rust,ignore
/// fn create(ctx: &ExtensionContext) -> Option<ExtensionBox> {
///     Some(Box::new(MyExtension::new(ctx)))
/// }
///
/// declare_extension!(create);
/// ```
#[macro_export]
macro_rules! declare_extension {
    ($factory:path) => {
        /// Factory entry point looked up by the proxy.
        ///
        /// # Safety
        /// `ctx` must point to a live context for the duration of the call.
        #[unsafe(no_mangle)]
        pub unsafe extern "C" fn modproxy_create_extension(
            ctx: *const $crate::ExtensionContext,
        ) -> *mut $crate::ExtensionBox {
            $crate::export_extension(ctx, $factory)
        }
    };
}
