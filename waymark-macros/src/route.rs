//! `#[route]` expansion.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{
    FnArg, Ident, ItemFn, LitStr, Token, bracketed, parenthesized,
    parse::{Parse, ParseStream},
    punctuated::Punctuated,
};

/// Arguments for the `#[route]` macro.
pub(crate) struct RouteArgs {
    path: LitStr,
    methods: Vec<LitStr>,
    middlewares: Vec<LitStr>,
    name: Option<LitStr>,
    patterns: Vec<(LitStr, LitStr)>,
    attributes: Vec<(LitStr, LitStr)>,
}

fn parse_list(input: ParseStream) -> syn::Result<Vec<LitStr>> {
    let content;
    bracketed!(content in input);
    let items = Punctuated::<LitStr, Token![,]>::parse_terminated(&content)?;
    Ok(items.into_iter().collect())
}

fn parse_pairs(input: ParseStream) -> syn::Result<Vec<(LitStr, LitStr)>> {
    let content;
    parenthesized!(content in input);

    let mut pairs = Vec::new();
    while !content.is_empty() {
        let key: Ident = content.parse()?;
        content.parse::<Token![=]>()?;
        let value: LitStr = content.parse()?;
        pairs.push((LitStr::new(&key.to_string(), key.span()), value));

        if content.peek(Token![,]) {
            content.parse::<Token![,]>()?;
        }
    }
    Ok(pairs)
}

impl Parse for RouteArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut args = RouteArgs {
            path: input.parse()?,
            methods: Vec::new(),
            middlewares: Vec::new(),
            name: None,
            patterns: Vec::new(),
            attributes: Vec::new(),
        };

        while !input.is_empty() {
            input.parse::<Token![,]>()?;
            if input.is_empty() {
                break;
            }

            let ident: Ident = input.parse()?;
            match ident.to_string().as_str() {
                "methods" => {
                    input.parse::<Token![=]>()?;
                    args.methods = parse_list(input)?;
                }
                "middleware" | "middlewares" => {
                    input.parse::<Token![=]>()?;
                    args.middlewares = parse_list(input)?;
                }
                "name" => {
                    input.parse::<Token![=]>()?;
                    args.name = Some(input.parse()?);
                }
                "patterns" => args.patterns = parse_pairs(input)?,
                "attributes" => args.attributes = parse_pairs(input)?,
                other => {
                    return Err(syn::Error::new(
                        ident.span(),
                        format!("unknown attribute: {}", other),
                    ));
                }
            }
        }

        Ok(args)
    }
}

pub(crate) fn expand(args: RouteArgs, input: ItemFn) -> syn::Result<TokenStream> {
    let fn_name = &input.sig.ident;

    if let Some(asyncness) = &input.sig.asyncness {
        return Err(syn::Error::new_spanned(
            asyncness,
            "route handlers are synchronous",
        ));
    }

    let call = match input.sig.inputs.len() {
        0 => quote! { #fn_name() },
        1 => match &input.sig.inputs[0] {
            FnArg::Typed(_) => quote! { #fn_name(__params) },
            FnArg::Receiver(receiver) => {
                return Err(syn::Error::new_spanned(
                    receiver,
                    "#[route] must be placed on a free function",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input.sig.inputs,
                "route handlers take `&Params` or no argument",
            ));
        }
    };

    let wrapper = format_ident!("__waymark_route_{}", fn_name);
    let method = LitStr::new(&fn_name.to_string(), fn_name.span());

    let RouteArgs {
        path,
        methods,
        middlewares,
        name,
        patterns,
        attributes,
    } = args;

    let name = match name {
        Some(name) => quote! { ::core::option::Option::Some(#name) },
        None => quote! { ::core::option::Option::None },
    };
    let patterns = patterns.iter().map(|(k, v)| quote! { (#k, #v) });
    let attributes = attributes.iter().map(|(k, v)| quote! { (#k, #v) });

    Ok(quote! {
        #input

        #[doc(hidden)]
        #[allow(non_snake_case)]
        fn #wrapper(
            __params: &::waymark::Params,
        ) -> ::core::result::Result<::waymark::Reply, ::waymark::BoxError> {
            ::waymark::IntoReply::into_reply(#call)
        }

        ::waymark::inventory::submit! {
            ::waymark::discovery::RouteRegistration {
                controller: ::core::module_path!(),
                method: #method,
                path: #path,
                methods: &[#(#methods),*],
                middlewares: &[#(#middlewares),*],
                name: #name,
                patterns: &[#(#patterns),*],
                attributes: &[#(#attributes),*],
                handler: #wrapper,
            }
        }
    })
}
