use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{Data, DeriveInput, Field, Fields, LitStr, parse_macro_input, parse_quote};

/// Reads the `#[js("key")]` tag of a field, if any.
fn parse_tag(field: &Field) -> syn::Result<Option<String>> {
    let mut tag = None;
    for attr in &field.attrs {
        if !attr.path().is_ident("js") {
            continue;
        }
        if tag.is_some() {
            return Err(syn::Error::new_spanned(attr, "duplicate #[js(...)] tag"));
        }
        let lit: LitStr = attr.parse_args()?;
        tag = Some(lit.value());
    }
    Ok(tag)
}

/// Derive macro for `weft_core::Reflect` on structs with named fields.
///
/// Fields carrying a `#[js("key")]` attribute are marshaled under `key`.
/// Fields without one are invisible to both the decoder and the encoder.
///
/// ```ignore
/// #[derive(Debug, Default, Reflect)]
/// struct Person {
///     #[js("name")]
///     name: String,
///     #[js("age")]
///     age: i64,
///     secret: String,
/// }
/// ```
#[proc_macro_derive(Reflect, attributes(js))]
pub fn derive_reflect(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand(mut input: DeriveInput) -> syn::Result<TokenStream2> {
    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => named.named.iter().cloned().collect::<Vec<_>>(),
            _ => {
                return Err(syn::Error::new_spanned(
                    &input.ident,
                    "Reflect can only be derived for structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "Reflect can only be derived for structs",
            ));
        }
    };

    let name = &input.ident;
    let type_name = name.to_string();

    let mut descriptors = Vec::with_capacity(fields.len());
    let mut field_refs = Vec::with_capacity(fields.len());
    let mut field_muts = Vec::with_capacity(fields.len());
    for (index, field) in fields.iter().enumerate() {
        let Some(ident) = &field.ident else {
            continue;
        };
        let field_name = ident.to_string();
        let tag = match parse_tag(field)? {
            Some(tag) => quote! { ::core::option::Option::Some(#tag) },
            None => quote! { ::core::option::Option::None },
        };
        descriptors.push(quote! {
            ::weft_core::reflect::Field::new(#field_name, #tag)
        });
        field_refs.push(quote! {
            #index => ::core::option::Option::Some(&self.#ident as &dyn ::weft_core::reflect::Reflect),
        });
        field_muts.push(quote! {
            #index => ::core::option::Option::Some(&mut self.#ident as &mut dyn ::weft_core::reflect::Reflect),
        });
    }

    // every type parameter has to be reflectable itself
    let type_params: Vec<_> = input.generics.type_params().map(|p| p.ident.clone()).collect();
    {
        let where_clause = input.generics.make_where_clause();
        for param in &type_params {
            where_clause
                .predicates
                .push(parse_quote! { #param: ::weft_core::reflect::Reflect });
        }
    }
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::weft_core::reflect::Record for #name #ty_generics #where_clause {
            fn fields(&self) -> &'static [::weft_core::reflect::Field] {
                const FIELDS: &[::weft_core::reflect::Field] = &[#(#descriptors),*];
                FIELDS
            }

            fn field(&self, index: usize) -> ::core::option::Option<&dyn ::weft_core::reflect::Reflect> {
                match index {
                    #(#field_refs)*
                    _ => ::core::option::Option::None,
                }
            }

            fn field_mut(&mut self, index: usize) -> ::core::option::Option<&mut dyn ::weft_core::reflect::Reflect> {
                match index {
                    #(#field_muts)*
                    _ => ::core::option::Option::None,
                }
            }
        }

        impl #impl_generics ::weft_core::reflect::Reflect for #name #ty_generics #where_clause {
            fn kind(&self) -> ::weft_core::reflect::Kind {
                ::weft_core::reflect::Kind::Record
            }

            fn type_name(&self) -> &'static str {
                #type_name
            }

            fn reflect_ref(&self) -> ::weft_core::reflect::ReflectRef<'_> {
                ::weft_core::reflect::ReflectRef::Record(self)
            }

            fn reflect_mut(&mut self) -> ::weft_core::reflect::ReflectMut<'_> {
                ::weft_core::reflect::ReflectMut::Record(self)
            }
        }
    })
}
