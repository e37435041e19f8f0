//! Public macros for constructing option structs without relying on struct literal syntax.
//!
//! These macros keep call sites ergonomic while allowing the crate to add
//! fields to its option structs without breaking users.

/// Construct [`crate::Options`] from `Default` and a list of field assignments.
///
/// Example:
///
/// ```rust
/// use serde_zpl::options::DuplicateValuePolicy;
///
/// let options = serde_zpl::options! {
///     duplicate_values: DuplicateValuePolicy::Error,
///     strict_booleans: true,
/// };
/// ```
#[macro_export]
macro_rules! options {
    ( $( $field:ident : $value:expr ),* $(,)? ) => {{
        let mut opt = $crate::Options::default();
        $(
            #[allow(deprecated)]
            {
                opt.$field = $value;
            }
        )*
        opt
    }};
}
