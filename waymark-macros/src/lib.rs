//! Attribute macros for waymark.
//!
//! - `#[route]` - declare a route on a free function for attribute discovery

use proc_macro::TokenStream;
use syn::{ItemFn, parse_macro_input};

mod route;

/// Declare a route on a free function.
///
/// ```rust,ignore
/// #[waymark::route("/users/{id}", methods = ["GET"], name = "users.show",
///                  middleware = ["auth"], patterns(id = "\\d+"))]
/// fn show(params: &Params) -> Result<String, ExtractError> {
///     let id: u64 = params.parse("id")?;
///     Ok(format!("user {id}"))
/// }
/// ```
///
/// The function takes `&Params` or nothing and returns anything implementing
/// `IntoReply`. It is registered under `(module_path!(), "<fn name>")`.
///
/// # Arguments
///
/// - first, the path (string literal)
/// - `methods = [..]`: verbs, default `HEAD` + `GET`
/// - `name = ".."`: route name
/// - `middleware = [..]`: middleware identifiers
/// - `patterns(name = "regex", ..)`: placeholder patterns
/// - `attributes(name = "value", ..)`: string attributes
#[proc_macro_attribute]
pub fn route(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr as route::RouteArgs);
    let input = parse_macro_input!(item as ItemFn);

    route::expand(args, input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
