//! Derive macro for rowcraft records.
//!
//! This crate provides the `#[derive(Record)]` macro, generating the
//! explicit field/column mapping consumed by the query builder, the
//! materializer and the ORM layer.

use std::collections::HashSet;

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, Attribute, Data, DeriveInput, Expr, Fields, Ident, Lit, Meta, Type};

/// Derives the `Record` trait for a struct with named fields.
///
/// The struct must implement `Default` and have no generic parameters.
/// Only annotated fields are mapped; every other field is invisible to
/// queries and keeps its default when a row is materialized.
///
/// # Field Attributes
///
/// - `#[column]` - Maps the field to a column of the same name
/// - `#[column(name = "column_name")]` - Maps the field to `column_name`
/// - `#[column(alias)]` - Marks the column as computed or alias-only: it is
///   read from results but never written by insert or update
///
/// Mapped fields must be `bool`, `i16`, `i32`, `i64`, `f32`, `f64`,
/// `String`, or an `Option` of one of them.
///
/// # Example
///
/// ```rust
/// use rowcraft_core::{FieldKind, Record};
/// use rowcraft_derive::Record;
///
/// #[derive(Default, Record)]
/// struct Post {
///     #[column]
///     id: i64,
///     #[column(name = "title")]
///     heading: String,
///     #[column(name = "comment_count", alias)]
///     comments: Option<i32>,
/// }
///
/// let columns = Post::columns();
/// assert_eq!(columns[1].name, "title");
/// assert_eq!(columns[1].field, "heading");
/// assert_eq!(columns[2].kind, FieldKind::Int);
/// assert!(!columns[2].table_column);
/// ```
#[proc_macro_derive(Record, attributes(column))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    derive_record_impl(&input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

fn derive_record_impl(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let struct_name = &input.ident;

    // Column kinds live in a `const` table, which cannot name impl generics.
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Record derive does not support generic structs",
        ));
    }

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    input,
                    "Record derive only supports structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "Record derive only supports structs",
            ));
        }
    };

    let mut mapped: Vec<MappedField> = Vec::new();
    let mut seen = HashSet::new();
    for field in fields {
        let Some(field_name) = field.ident.as_ref() else {
            continue;
        };
        let Some(attrs) = parse_column_attrs(&field.attrs)? else {
            continue;
        };
        let column_name = attrs.name.unwrap_or_else(|| field_name.to_string());
        if !seen.insert(column_name.clone()) {
            return Err(syn::Error::new_spanned(
                field,
                format!("column `{column_name}` is mapped more than once"),
            ));
        }
        mapped.push(MappedField {
            field_name: field_name.clone(),
            field_type: field.ty.clone(),
            column_name,
            table_column: !attrs.alias,
        });
    }

    let column_entries = mapped.iter().map(|info| {
        let column_name = &info.column_name;
        let field_str = info.field_name.to_string();
        let field_type = &info.field_type;
        let table_column = info.table_column;
        quote! {
            ::rowcraft_core::record::ColumnInfo {
                name: #column_name,
                field: #field_str,
                kind: <#field_type as ::rowcraft_core::record::FieldValue>::KIND,
                table_column: #table_column,
            }
        }
    });

    let value_arms = mapped.iter().map(|info| {
        let column_name = &info.column_name;
        let field_name = &info.field_name;
        quote! {
            #column_name => ::core::option::Option::Some(
                ::rowcraft_core::record::FieldValue::to_sql_value(&self.#field_name)
            ),
        }
    });

    let set_value_arms = mapped.iter().map(|info| {
        let column_name = &info.column_name;
        let field_name = &info.field_name;
        let field_type = &info.field_type;
        quote! {
            #column_name => {
                match <#field_type as ::rowcraft_core::record::FieldValue>::from_sql_value(
                    ::core::clone::Clone::clone(&value),
                ) {
                    ::core::option::Option::Some(converted) => {
                        self.#field_name = converted;
                        ::core::result::Result::Ok(())
                    }
                    ::core::option::Option::None => {
                        ::core::result::Result::Err(::rowcraft_core::record::FieldError::Mismatch {
                            column: ::std::string::String::from(#column_name),
                            kind: <#field_type as ::rowcraft_core::record::FieldValue>::KIND,
                            value,
                        })
                    }
                }
            }
        }
    });

    let expanded = quote! {
        impl ::rowcraft_core::record::Record for #struct_name {
            fn columns() -> &'static [::rowcraft_core::record::ColumnInfo] {
                const COLUMNS: &[::rowcraft_core::record::ColumnInfo] = &[#(#column_entries),*];
                COLUMNS
            }

            #[allow(unused_variables)]
            fn value(&self, column: &str) -> ::core::option::Option<::rowcraft_core::value::SqlValue> {
                match column {
                    #(#value_arms)*
                    _ => ::core::option::Option::None,
                }
            }

            #[allow(unused_variables)]
            fn set_value(
                &mut self,
                column: &str,
                value: ::rowcraft_core::value::SqlValue,
            ) -> ::core::result::Result<(), ::rowcraft_core::record::FieldError> {
                match column {
                    #(#set_value_arms)*
                    _ => ::core::result::Result::Err(
                        ::rowcraft_core::record::FieldError::UnknownColumn(
                            ::std::string::String::from(column),
                        ),
                    ),
                }
            }
        }
    };

    Ok(expanded)
}

struct MappedField {
    field_name: Ident,
    field_type: Type,
    column_name: String,
    table_column: bool,
}

struct ColumnAttrs {
    name: Option<String>,
    alias: bool,
}

/// Returns `None` when the field carries no `#[column]` attribute.
fn parse_column_attrs(attrs: &[Attribute]) -> syn::Result<Option<ColumnAttrs>> {
    let mut result = None;

    for attr in attrs {
        if !attr.path().is_ident("column") {
            continue;
        }
        let current = result.get_or_insert(ColumnAttrs {
            name: None,
            alias: false,
        });
        // Bare `#[column]`
        if matches!(attr.meta, Meta::Path(_)) {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("alias") {
                current.alias = true;
            } else if meta.path.is_ident("name") {
                let value: Expr = meta.value()?.parse()?;
                match value {
                    Expr::Lit(lit) => match lit.lit {
                        Lit::Str(s) => current.name = Some(s.value()),
                        other => return Err(syn::Error::new_spanned(other, "expected a string literal")),
                    },
                    other => return Err(syn::Error::new_spanned(other, "expected a string literal")),
                }
            } else {
                return Err(meta.error("unsupported column attribute, expected `name` or `alias`"));
            }
            Ok(())
        })?;
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use syn::parse_quote;

    use super::*;

    #[test]
    fn test_generic_struct_is_rejected() {
        let input: DeriveInput = parse_quote! {
            struct Wrapper<T> {
                #[column]
                value: T,
            }
        };
        let err = derive_record_impl(&input).unwrap_err();
        assert_eq!(err.to_string(), "Record derive does not support generic structs");
    }

    #[test]
    fn test_lifetime_parameter_is_rejected() {
        let input: DeriveInput = parse_quote! {
            struct Borrowed<'a> {
                #[column]
                name: &'a str,
            }
        };
        assert!(derive_record_impl(&input).is_err());
    }

    #[test]
    fn test_plain_struct_expands() {
        let input: DeriveInput = parse_quote! {
            struct Plain {
                #[column]
                id: i64,
                skipped: u8,
            }
        };
        let tokens = derive_record_impl(&input).unwrap().to_string();
        assert!(tokens.contains("Record for Plain"));
        assert!(tokens.contains("\"id\""));
    }
}
