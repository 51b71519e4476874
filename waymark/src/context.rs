//! The ambient registration context.

/// Prefix and middlewares applied to every route registered right now.
///
/// The dispatcher owns one; groups swap it for the duration of their
/// callback and put the previous one back afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationContext {
    /// Path prefix, already normalized. Empty at the root.
    pub prefix: String,
    /// Middlewares attached to new routes, in order.
    pub middlewares: Vec<String>,
}

impl RegistrationContext {
    /// The root context: no prefix, no middlewares.
    pub fn new() -> Self {
        Self::default()
    }
}
