use serde::{Deserialize, Serialize};

/// What to do when a scalar slot receives a repeated property.
///
/// Sequence slots (`Vec<T>`, sets, tuples) and self-describing targets always
/// receive every value in order; this policy only affects fields that can hold
/// a single value.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DuplicateValuePolicy {
    /// Last value wins: later occurrences overwrite earlier ones (the default).
    LastWins,
    /// First value wins: later occurrences are ignored.
    FirstWins,
    /// Error out when a scalar slot sees more than one value.
    Error,
}

/// Decoder configuration options.
///
/// Example: parse a small `Config` using custom `Options`.
///
/// ```rust
/// use serde::Deserialize;
///
/// use serde_zpl::options::DuplicateValuePolicy;
/// use serde_zpl::from_str_with_options;
///
/// #[derive(Deserialize)]
/// struct Config {
///     name: String,
///     enabled: bool,
///     retries: i32,
/// }
///
/// let zpl = "name = My Application\nenabled = 1\nretries = 5\nretries = 6\n";
///
/// let options = serde_zpl::options! {
///     duplicate_values: DuplicateValuePolicy::FirstWins,
/// };
///
/// let cfg: Config = from_str_with_options(zpl, options).unwrap();
/// assert_eq!(cfg.retries, 5);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Options {
    /// Policy for scalar slots that receive more than one value.
    pub duplicate_values: DuplicateValuePolicy,
    /// If true, only `1`, `0`, `true` and `false` are accepted as booleans.
    /// Default: false (also accept `t`, `T`, `TRUE`, `True`, `f`, `F`, `FALSE`, `False`).
    pub strict_booleans: bool,
    /// If true, a line indented more than one level deeper than the section
    /// it belongs to is a syntax error. Default: false (such lines are accepted
    /// and nest one level).
    pub strict_nesting: bool,
    /// Maximum length of a single logical line in bytes. `None` (default) means
    /// unlimited. Exceeding the limit is a syntax error on that line.
    pub max_line_bytes: Option<usize>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            duplicate_values: DuplicateValuePolicy::LastWins,
            strict_booleans: false,
            strict_nesting: false,
            max_line_bytes: None,
        }
    }
}
