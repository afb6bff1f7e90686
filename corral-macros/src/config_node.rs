//! `#[derive(ConfigNode)]`.
//!
//! Fields marked `#[config(node)]` become children in declaration order. A
//! field written as `Option<T>` becomes an optional child of type `T`; every
//! other marked field is a required child. Unmarked fields are primitive
//! properties and are not visited.

use proc_macro::TokenStream;
use quote::quote;
use syn::{
    Data, DeriveInput, Field, Fields, GenericArgument, Ident, LitStr, PathArguments, Type,
    parse_macro_input,
};

struct NodeField<'a> {
    ident: &'a Ident,
    name: String,
    optional: bool,
}

/// Implementation of `#[derive(ConfigNode)]`.
pub fn derive_config_node_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            Fields::Unit => {
                return TokenStream::from(quote! {
                    impl #impl_generics ::corral::ConfigNode for #name #ty_generics #where_clause {
                        fn as_any(&self) -> &dyn ::std::any::Any {
                            self
                        }
                    }
                });
            }
            Fields::Unnamed(_) => {
                return syn::Error::new_spanned(
                    name,
                    "ConfigNode can only be derived for structs with named fields",
                )
                .to_compile_error()
                .into();
            }
        },
        _ => {
            return syn::Error::new_spanned(name, "ConfigNode can only be derived for structs")
                .to_compile_error()
                .into();
        }
    };

    let mut nodes = Vec::new();
    for field in fields {
        match node_field(field) {
            Ok(Some(node)) => nodes.push(node),
            Ok(None) => {}
            Err(err) => return err.to_compile_error().into(),
        }
    }

    let children = nodes.iter().map(|node| {
        let ident = node.ident;
        let child_name = &node.name;
        if node.optional {
            quote! { ::corral::ConfigChild::optional(#child_name, self.#ident.as_ref()) }
        } else {
            quote! { ::corral::ConfigChild::required(#child_name, &self.#ident) }
        }
    });

    let expanded = quote! {
        impl #impl_generics ::corral::ConfigNode for #name #ty_generics #where_clause {
            fn children(&self) -> ::std::vec::Vec<::corral::ConfigChild<'_>> {
                ::std::vec![#(#children),*]
            }

            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }
        }
    };

    TokenStream::from(expanded)
}

/// Parse `#[config(node)]` / `#[config(node, name = "...")]` on a field.
fn node_field(field: &Field) -> syn::Result<Option<NodeField<'_>>> {
    let Some(ident) = field.ident.as_ref() else {
        return Ok(None);
    };

    let mut is_node = false;
    let mut name = None;

    for attr in &field.attrs {
        if !attr.path().is_ident("config") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("node") {
                is_node = true;
                Ok(())
            } else if meta.path.is_ident("name") {
                let lit: LitStr = meta.value()?.parse()?;
                name = Some(lit.value());
                Ok(())
            } else {
                Err(meta.error("expected `node` or `name`"))
            }
        })?;
    }

    if !is_node {
        return Ok(None);
    }

    Ok(Some(NodeField {
        ident,
        name: name.unwrap_or_else(|| ident.to_string()),
        optional: option_inner(&field.ty).is_some(),
    }))
}

/// `T` if `ty` is spelled `Option<T>` (or a path ending in `Option<T>`).
fn option_inner(ty: &Type) -> Option<&Type> {
    let Type::Path(path) = ty else {
        return None;
    };
    let segment = path.path.segments.last()?;
    if segment.ident != "Option" {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    match args.args.first()? {
        GenericArgument::Type(inner) => Some(inner),
        _ => None,
    }
}
