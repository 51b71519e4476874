//! Attribute-discovered routes, collected via `inventory`.
//!
//! `#[route(...)]` submits one [`RouteRegistration`] per annotated function.
//! Everything in a registration is `'static` data, so it can be built in a
//! `const` context by the macro.

use waymark_core::{BoxError, Params, Reply, RouteDefinition};

/// One route declared with `#[route(...)]`.
#[derive(Debug, Clone, Copy)]
pub struct RouteRegistration {
    /// Module path of the annotated function.
    pub controller: &'static str,
    /// Name of the annotated function.
    pub method: &'static str,
    /// Declared path, not yet normalized.
    pub path: &'static str,
    /// Declared methods. Empty means `HEAD` + `GET`.
    pub methods: &'static [&'static str],
    /// Declared middlewares.
    pub middlewares: &'static [&'static str],
    /// Declared route name.
    pub name: Option<&'static str>,
    /// Declared placeholder patterns.
    pub patterns: &'static [(&'static str, &'static str)],
    /// Declared string attributes.
    pub attributes: &'static [(&'static str, &'static str)],
    /// Generated wrapper around the annotated function.
    pub handler: fn(&Params) -> Result<Reply, BoxError>,
}

inventory::collect!(RouteRegistration);

impl RouteRegistration {
    /// Build the route for this registration, with `path` as its final
    /// (normalized) path.
    ///
    /// The action is the `(controller, method)` pair, so the route survives
    /// a cache round trip.
    pub fn definition(&self, path: impl Into<String>) -> RouteDefinition {
        let mut builder = RouteDefinition::builder(path, (self.controller, self.method))
            .middlewares(self.middlewares.iter().copied())
            .patterns(self.patterns.iter().copied())
            .attributes(self.attributes.iter().copied());

        if !self.methods.is_empty() {
            builder = builder.methods(self.methods.iter().copied());
        }
        if let Some(name) = self.name {
            builder = builder.name(name);
        }
        builder.build()
    }
}

/// Every submitted registration, in link order.
pub fn registrations() -> impl Iterator<Item = &'static RouteRegistration> {
    inventory::iter::<RouteRegistration>.into_iter()
}
