//! Proc-macro for generating per-resource canonical error facades.
//!
//! `#[resource_error("<gts type>")]` turns a unit struct into a namespace of
//! constructors, one per error category. Every error built through the facade
//! is tagged with the resource type, and the resource-identifying categories
//! fill their `ResourceInfo` from it.
//!
//! ## Usage
//!
//! ```rust,ignore
//! #[resource_error("gts.cf.core.users.user.v1")]
//! pub struct UserError;
//!
//! let err = UserError::not_found("42");
//! ```

use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::{format_ident, quote};
use syn::{Fields, ItemStruct, LitStr, Visibility, parse_macro_input};

/// Constructors whose single argument is the category's context value.
const CONTEXT_CONSTRUCTORS: [(&str, &str); 12] = [
    ("cancelled", "RequestInfo"),
    ("invalid_argument", "Validation"),
    ("deadline_exceeded", "RequestInfo"),
    ("permission_denied", "ErrorInfo"),
    ("resource_exhausted", "QuotaFailure"),
    ("failed_precondition", "PreconditionFailure"),
    ("aborted", "ErrorInfo"),
    ("out_of_range", "Validation"),
    ("unimplemented", "ErrorInfo"),
    ("internal", "DebugInfo"),
    ("service_unavailable", "RetryInfo"),
    ("unauthenticated", "ErrorInfo"),
];

/// Constructors that identify a resource by name, with the description set on
/// their `ResourceInfo`.
const RESOURCE_CONSTRUCTORS: [(&str, Option<&str>); 3] = [
    ("not_found", None),
    ("already_exists", Some("Resource already exists")),
    ("data_loss", Some("Data loss detected")),
];

/// Attribute entry point
#[proc_macro_attribute]
pub fn resource_error(attr: TokenStream, item: TokenStream) -> TokenStream {
    let resource_type = parse_macro_input!(attr as LitStr);
    let item = parse_macro_input!(item as ItemStruct);

    match expand(&resource_type, &item) {
        Ok(tokens) => tokens.into(),
        Err(e) => e.to_compile_error().into(),
    }
}

fn expand(resource_type: &LitStr, item: &ItemStruct) -> syn::Result<TokenStream2> {
    if !matches!(item.fields, Fields::Unit) {
        return Err(syn::Error::new_spanned(
            &item.fields,
            "#[resource_error] expects a unit struct, e.g. `pub struct UserError;`",
        ));
    }
    if !item.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &item.generics,
            "#[resource_error] does not support generic structs",
        ));
    }

    validate_gts_format(&resource_type.value())
        .map_err(|msg| syn::Error::new(resource_type.span(), msg))?;

    let ident = &item.ident;
    let vis = &item.vis;
    let resource_ctors = RESOURCE_CONSTRUCTORS
        .iter()
        .map(|(name, description)| resource_constructor(vis, name, *description));
    let context_ctors = CONTEXT_CONSTRUCTORS
        .iter()
        .map(|(name, ty)| context_constructor(vis, name, ty));

    Ok(quote! {
        #item

        impl #ident {
            /// GTS type of the resource this facade raises errors for.
            #vis const RESOURCE_TYPE: &'static str = #resource_type;

            #(#resource_ctors)*

            /// Unknown error for this resource; `detail` is kept as debug context.
            #vis fn unknown(detail: impl ::core::convert::Into<::std::string::String>)
                -> ::canonical_errors::CanonicalError
            {
                ::canonical_errors::CanonicalError::unknown(detail)
                    .with_resource_type(Self::RESOURCE_TYPE)
            }

            #(#context_ctors)*
        }
    })
}

fn resource_constructor(vis: &Visibility, name: &str, description: Option<&str>) -> TokenStream2 {
    let method = format_ident!("{}", name);
    let doc = format!("`{name}` error for the resource with the given name.");
    let description = description.map(|d| quote! { .with_description(#d) });
    quote! {
        #[doc = #doc]
        #vis fn #method(name: impl ::core::convert::Into<::std::string::String>)
            -> ::canonical_errors::CanonicalError
        {
            ::canonical_errors::CanonicalError::#method(
                ::canonical_errors::ResourceInfo::new(Self::RESOURCE_TYPE, name) #description,
            )
            .with_resource_type(Self::RESOURCE_TYPE)
        }
    }
}

fn context_constructor(vis: &Visibility, name: &str, context: &str) -> TokenStream2 {
    let method = format_ident!("{}", name);
    let context = syn::Ident::new(context, Span::call_site());
    quote! {
        #vis fn #method(
            ctx: ::canonical_errors::#context,
        ) -> ::canonical_errors::CanonicalError {
            ::canonical_errors::CanonicalError::#method(ctx)
                .with_resource_type(Self::RESOURCE_TYPE)
        }
    }
}

/// Strict GTS format validation
///
/// Valid format: `gts.vendor.package.namespace.type.version~chain1~...`.
/// Every GTX in the chain must have at least 5 segments after `gts`
/// (vendor.package.namespace.type.version) and end with a `vN` version.
fn validate_gts_format(code: &str) -> Result<(), String> {
    if !code.starts_with("gts.") {
        return Err(format!("GTS type '{code}' must start with 'gts.'"));
    }

    for (idx, gtx) in code.split('~').enumerate() {
        let segments: Vec<&str> = gtx.split('.').collect();

        for segment in &segments {
            if segment.is_empty() {
                return Err(format!("GTS type '{code}' contains empty segment"));
            }
            if !segment
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
            {
                return Err(format!(
                    "GTS type '{code}' has invalid segment '{segment}': \
                     only lowercase letters, digits and underscores are allowed"
                ));
            }
        }

        // The first GTX carries the 'gts' prefix on top of its 5 segments
        let meaningful_segments = if idx == 0 {
            segments.len() - 1
        } else {
            segments.len()
        };
        if meaningful_segments < 5 {
            return Err(format!(
                "GTS type '{code}' is expected to have at least 5 segments per GTX: \
                 vendor.package.namespace.type.version (found {meaningful_segments} segments)"
            ));
        }

        if let Some(last) = segments.last() {
            let version = last.strip_prefix('v').unwrap_or_default();
            if version.is_empty() || !version.chars().all(|c| c.is_ascii_digit()) {
                return Err(format!(
                    "GTS type '{code}' must end each GTX with version 'vN' (found '{last}')"
                ));
            }
        }
    }

    Ok(())
}
