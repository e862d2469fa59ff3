use proc_macro::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields, LitStr, parse_macro_input};

#[proc_macro_derive(Nbt, attributes(nbt))]
pub fn derive_nbt(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    derive_nbt_expand(input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn derive_nbt_expand(input: DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    match &input.data {
        Data::Struct(data_struct) => impl_nbt_struct(&input, data_struct),
        Data::Enum(_) => Err(syn::Error::new_spanned(
            &input.ident,
            "Enum types are not supported",
        )),
        Data::Union(_) => Err(syn::Error::new_spanned(
            &input.ident,
            "Union types are not supported",
        )),
    }
}

/// Resolved `#[nbt(...)]` directives of one field.
#[derive(Default)]
struct FieldDirectives {
    rename: Option<String>,
    skip: bool,
    omitempty: bool,
    default: bool,
}

impl FieldDirectives {
    fn from_field(field: &syn::Field) -> syn::Result<Self> {
        let mut directives = FieldDirectives::default();

        for attr in &field.attrs {
            if !attr.path().is_ident("nbt") {
                continue;
            }

            // Tag-string form: `#[nbt("name,omitempty")]`.
            if let Ok(lit) = attr.parse_args::<LitStr>() {
                directives.apply_tag_string(&lit.value());
                continue;
            }

            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("skip") {
                    directives.skip = true;
                } else if meta.path.is_ident("omitempty") {
                    directives.omitempty = true;
                } else if meta.path.is_ident("default") {
                    directives.default = true;
                } else if meta.path.is_ident("rename") {
                    let lit: LitStr = meta.value()?.parse()?;
                    directives.rename = Some(lit.value());
                } else {
                    return Err(meta.error("unsupported nbt directive"));
                }
                Ok(())
            })?;
        }

        Ok(directives)
    }

    fn apply_tag_string(&mut self, tag: &str) {
        for token in tag.split(',').map(str::trim) {
            match token {
                "" => {}
                "-" => self.skip = true,
                "omitempty" => self.omitempty = true,
                name => self.rename = Some(name.to_string()),
            }
        }
    }
}

fn impl_nbt_struct(
    input: &DeriveInput,
    data: &syn::DataStruct,
) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;
    let fields = match &data.fields {
        Fields::Named(fields) => &fields.named,
        _ => {
            return Err(syn::Error::new_spanned(
                name,
                "Only named fields are supported",
            ));
        }
    };

    let mut field_info: Vec<(syn::Ident, syn::Type, String, FieldDirectives)> = Vec::new();
    let mut skipped_fields = Vec::new();

    for field in fields {
        let Some(field_name) = field.ident.as_ref() else {
            return Err(syn::Error::new_spanned(field, "Field must be named"));
        };
        let directives = FieldDirectives::from_field(field)?;

        if directives.skip {
            skipped_fields.push(field_name.clone());
            continue;
        }

        let key = directives
            .rename
            .clone()
            .unwrap_or_else(|| field_name.to_string());
        if field_info.iter().any(|(_, _, other, _)| *other == key) {
            return Err(syn::Error::new_spanned(
                field_name,
                format!("Duplicate key: {key}"),
            ));
        }
        field_info.push((field_name.clone(), field.ty.clone(), key, directives));
    }

    let field_writes = field_info.iter().map(|(ident, _ty, key, directives)| {
        let write = quote! {
            if let Some(__nbt_field) = nbt::FieldValue::as_nbt(&self.#ident) {
                let __nbt_field = nbt::Nbt::to_value(__nbt_field)
                    .map_err(|__nbt_err| __nbt_err.with_context(nbt::Context::Field(#key.to_string())))?;
                __nbt_compound.insert(#key, __nbt_field);
            }
        };
        if directives.omitempty {
            quote! {
                if !nbt::FieldValue::is_zero(&self.#ident) {
                    #write
                }
            }
        } else {
            write
        }
    });

    let field_reads = field_info.iter().map(|(ident, ty, key, directives)| {
        let read = quote! {
            let #ident = __nbt_compound
                .take(#key)
                .map(<<#ty as nbt::FieldValue>::T as nbt::Nbt>::from_value)
                .transpose()
                .map_err(|__nbt_err| __nbt_err.with_context(nbt::Context::Field(#key.to_string())))?;
        };
        if directives.default {
            quote! {
                #read
                let #ident: #ty = match #ident {
                    Some(__nbt_field) => nbt::FieldValue::from_option(Some(__nbt_field), #key)?,
                    None => nbt::absent_field_default(#key),
                };
            }
        } else {
            quote! {
                #read
                let #ident: #ty = nbt::FieldValue::from_option(#ident, #key)?;
            }
        }
    });

    let field_names: Vec<_> = field_info.iter().map(|(ident, _, _, _)| ident).collect();

    let skipped_field_init = skipped_fields.iter().map(|ident| {
        quote! {
            #ident: Default::default()
        }
    });

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let expanded = quote! {
        impl #impl_generics nbt::Nbt for #name #ty_generics #where_clause {
            fn to_value(&self) -> nbt::WriteResult<nbt::Value> {
                let mut __nbt_compound = nbt::Compound::new();
                #(#field_writes)*
                Ok(nbt::Value::Compound(__nbt_compound))
            }

            fn from_value(__nbt_value: nbt::Value) -> nbt::ParseResult<Self> {
                let mut __nbt_compound = <nbt::Compound as nbt::Nbt>::from_value(__nbt_value)?;
                #(#field_reads)*

                Ok(Self {
                    #(#field_names,)*
                    #(#skipped_field_init,)*
                })
            }

            fn is_zero(&self) -> bool {
                true #(&& nbt::FieldValue::is_zero(&self.#field_names))*
            }
        }
    };

    Ok(expanded)
}
