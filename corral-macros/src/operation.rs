//! `#[background_operation]`.

use proc_macro::TokenStream;
use quote::quote;
use syn::{
    DeriveInput, Ident, LitInt, LitStr, Token,
    parse::{Parse, ParseStream},
    parse_macro_input,
};

/// Arguments for the `#[background_operation]` macro.
pub(crate) struct OperationArgs {
    pub name: Option<String>,
    /// The recurring interval, converted to seconds.
    pub interval_secs: Option<u64>,
}

impl Parse for OperationArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut name = None;
        let mut interval_secs = None;

        while !input.is_empty() {
            let ident: Ident = input.parse()?;
            input.parse::<Token![=]>()?;

            match ident.to_string().as_str() {
                "name" => {
                    let lit: LitStr = input.parse()?;
                    name = Some(lit.value());
                }
                "interval_minutes" => {
                    let lit: LitInt = input.parse()?;
                    let minutes: u64 = lit.base10_parse()?;
                    if minutes == 0 {
                        return Err(syn::Error::new(
                            lit.span(),
                            "interval_minutes must be greater than zero",
                        ));
                    }
                    let Some(secs) = minutes.checked_mul(60) else {
                        return Err(syn::Error::new(lit.span(), "interval_minutes is too large"));
                    };
                    interval_secs = Some(secs);
                }
                other => {
                    return Err(syn::Error::new(
                        ident.span(),
                        format!("unknown attribute: {}", other),
                    ));
                }
            }

            if input.peek(Token![,]) {
                input.parse::<Token![,]>()?;
            }
        }

        Ok(OperationArgs {
            name,
            interval_secs,
        })
    }
}

/// Implementation of the `#[background_operation]` attribute macro.
///
/// The item is emitted unchanged, followed by its `BackgroundOperation`
/// impl. Without `name`, the type's own name is the operation name.
pub fn background_operation_impl(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr as OperationArgs);
    let input = parse_macro_input!(item as DeriveInput);

    let type_name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let operation = args.name.unwrap_or_else(|| type_name.to_string());
    let schedule = match args.interval_secs {
        Some(secs) => quote! {
            ::corral::Schedule::Recurring(::core::time::Duration::from_secs(#secs))
        },
        None => quote! { ::corral::Schedule::OnDemand },
    };
    let tag = quote! { ::corral::BackgroundOperation };

    let expanded = quote! {
        #input

        impl #impl_generics #tag for #type_name #ty_generics #where_clause {
            const NAME: &'static str = #operation;
            const SCHEDULE: ::corral::Schedule = #schedule;
        }
    };

    TokenStream::from(expanded)
}
