//! Procedural macros for offline-dispatch

use darling::{FromDeriveInput, FromVariant};
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, DeriveInput};

/// Container-level attributes for #[derive(Action)]
#[derive(Debug, FromDeriveInput)]
#[darling(attributes(action), supports(enum_any))]
struct ActionOpts {
    ident: syn::Ident,
    data: darling::ast::Data<ActionVariant, ()>,
}

/// Variant-level attributes
#[derive(Debug, FromVariant)]
#[darling(attributes(action))]
struct ActionVariant {
    ident: syn::Ident,

    /// Explicit action type, instead of the SCREAMING_SNAKE variant name
    #[darling(default)]
    name: Option<String>,

    /// Mark the variant for retry
    #[darling(default)]
    retry: bool,

    /// Action types that drop a queued instance of this variant
    #[darling(multiple)]
    dismiss: Vec<String>,
}

/// Convert PascalCase to SCREAMING_SNAKE_CASE
///
/// Runs of capitals stay together: `HTTPRequest` becomes `HTTP_REQUEST`.
fn to_screaming_snake_case(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::with_capacity(s.len() + 4);

    for (i, &ch) in chars.iter().enumerate() {
        if ch.is_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|c| c.is_lowercase());
            if prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_is_lower)
            {
                result.push('_');
            }
        }
        result.extend(ch.to_uppercase());
    }
    result
}

/// Derive macro for the Action trait
///
/// Generates:
/// - `name()` returning the variant name in SCREAMING_SNAKE_CASE, or the
///   value of `#[action(name = "...")]`
/// - `retry()` returning `true` for variants marked `#[action(retry)]`
/// - `dismissed_by()` matching the types listed with `#[action(dismiss = "...")]`
///   (repeat the attribute for several types)
/// - `From<Self> for Dispatchable<Self>`, so the enum can be passed straight
///   to `OfflineStore::dispatch`
///
/// # Example
/// ```ignore
/// #[derive(Action, Clone, Debug)]
/// enum AppAction {
///     #[action(retry, dismiss = "NAVIGATE_BACK")]
///     FetchFeedRequest { page: u32 },
///     NavigateBack,
///     #[action(name = "auth/logout")]
///     Logout,
/// }
///
/// let action = AppAction::FetchFeedRequest { page: 1 };
/// assert_eq!(action.name(), "FETCH_FEED_REQUEST");
/// assert!(action.retry());
/// assert!(action.dismissed_by("NAVIGATE_BACK"));
/// assert_eq!(AppAction::Logout.name(), "auth/logout");
/// ```
#[proc_macro_derive(Action, attributes(action))]
pub fn derive_action(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let opts = match ActionOpts::from_derive_input(&input) {
        Ok(opts) => opts,
        Err(e) => return e.write_errors().into(),
    };

    let name = &opts.ident;

    let variants = match &opts.data {
        darling::ast::Data::Enum(variants) => variants,
        _ => {
            return syn::Error::new_spanned(&input, "Action can only be derived for enums")
                .to_compile_error()
                .into();
        }
    };

    let mut name_arms: Vec<TokenStream2> = Vec::with_capacity(variants.len());
    let mut retry_arms: Vec<TokenStream2> = Vec::with_capacity(variants.len());
    let mut dismiss_arms: Vec<TokenStream2> = Vec::with_capacity(variants.len());

    for v in variants {
        let variant_name = &v.ident;
        let pattern = quote! { #name::#variant_name { .. } };

        let action_type = v
            .name
            .clone()
            .unwrap_or_else(|| to_screaming_snake_case(&variant_name.to_string()));
        name_arms.push(quote! { #pattern => #action_type });

        let retry = v.retry;
        retry_arms.push(quote! { #pattern => #retry });

        let dismiss = &v.dismiss;
        dismiss_arms.push(if dismiss.is_empty() {
            quote! { #pattern => false }
        } else {
            quote! { #pattern => matches!(action_type, #(#dismiss)|*) }
        });
    }

    let expanded = quote! {
        impl offline_dispatch::Action for #name {
            fn name(&self) -> &str {
                match self {
                    #(#name_arms),*
                }
            }

            fn retry(&self) -> bool {
                match self {
                    #(#retry_arms),*
                }
            }

            fn dismissed_by(&self, action_type: &str) -> bool {
                let _ = action_type;
                match self {
                    #(#dismiss_arms),*
                }
            }
        }

        impl ::core::convert::From<#name> for offline_dispatch::Dispatchable<#name> {
            fn from(action: #name) -> Self {
                offline_dispatch::Dispatchable::Action(action)
            }
        }
    };

    TokenStream::from(expanded)
}
