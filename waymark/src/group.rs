//! # Route Groups
//!
//! A group composes an ambient prefix and middleware list for the routes
//! registered inside it.
//!
//! - **Prefix**: joined onto the prefix active when the group starts
//! - **Middlewares**: *replace* the active list for the group's routes; an
//!   inner group must repeat outer middlewares it wants to keep
//! - **Name**: stored, not applied to nested routes
//!
//! The context active before the group is restored when it ends, also when
//! the callback panics.
//!
//! # Example
//!
//! ```rust,ignore
//! // Explicit form
//! router.with_group(Group::new("/api").middleware("auth"), |router| {
//!     router.get("/users", list_users);
//! });
//!
//! // Scope form: runs when the returned context is dropped
//! router
//!     .group(|router| {
//!         router.get("/users", list_users);
//!     })
//!     .prefix("/api")
//!     .middleware("auth");
//! ```

use crate::{Dispatcher, context::RegistrationContext, path::group_prefix};

/// Prefix, middlewares and name of a route group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Group {
    /// Prefix joined onto the outer prefix.
    pub prefix: String,
    /// Middlewares replacing the outer list.
    pub middlewares: Vec<String>,
    /// Group name. Not composed into route names.
    pub name: Option<String>,
}

impl Group {
    /// A group with `prefix`.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            ..Self::default()
        }
    }

    /// Set the prefix.
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Append a middleware.
    pub fn middleware(mut self, middleware: impl Into<String>) -> Self {
        self.middlewares.push(middleware.into());
        self
    }

    /// Set the name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// The context active inside this group when entered from `outer`.
    pub fn compose(&self, outer: &RegistrationContext) -> RegistrationContext {
        RegistrationContext {
            prefix: group_prefix(&outer.prefix, &self.prefix),
            middlewares: self.middlewares.clone(),
        }
    }
}

/// A group whose callback runs when the context is finished or dropped.
///
/// Returned by [`Dispatcher::group`]. Configure it with the fluent setters;
/// the callback runs exactly once, at the end of the statement that created
/// it (or at [`finish`](Self::finish)).
pub struct GroupContext<'a> {
    dispatcher: &'a mut Dispatcher,
    group: Group,
    callback: Option<Box<dyn FnOnce(&mut Dispatcher) + 'a>>,
}

impl<'a> GroupContext<'a> {
    pub(crate) fn new<F>(dispatcher: &'a mut Dispatcher, callback: F) -> Self
    where
        F: FnOnce(&mut Dispatcher) + 'a,
    {
        Self {
            dispatcher,
            group: Group::default(),
            callback: Some(Box::new(callback)),
        }
    }

    /// Set the prefix.
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.group.prefix = prefix.into();
        self
    }

    /// Append a middleware.
    pub fn middleware(mut self, middleware: impl Into<String>) -> Self {
        self.group.middlewares.push(middleware.into());
        self
    }

    /// Set the name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.group.name = Some(name.into());
        self
    }

    /// Run the callback now.
    pub fn finish(mut self) {
        self.run();
    }

    fn run(&mut self) {
        if let Some(callback) = self.callback.take() {
            let group = std::mem::take(&mut self.group);
            self.dispatcher.with_group(group, callback);
        }
    }
}

impl Drop for GroupContext<'_> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            return;
        }
        self.run();
    }
}
