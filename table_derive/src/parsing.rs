//! Parsing utilities for table and field attributes
//!
//! This module handles the parsing of `#[table]`, `#[primary_key]`, `#[version]`
//! and `#[field]` attributes and validation of table and field names.

use quote::quote;
use syn::{
    parse::Parse, parse::ParseStream, Attribute, Data, Error, Fields, GenericArgument, Ident,
    LitStr, Meta, PathArguments, Result, Token, Type,
};
use type_mapping::{
    check_identifier, identity_column_type, option_inner_type, unsupported_column_type,
};

/// Validate table name and return syn::Error for better proc macro error handling
pub fn validate_table_name_syn(name: &str, span: proc_macro2::Span) -> Result<()> {
    check_identifier(name)
        .map_err(|e| Error::new(span, format!("Invalid table name '{}': {}", name, e)))
}

/// Validate field name and return syn::Error for better proc macro error handling
pub fn validate_field_name_syn(name: &str, span: proc_macro2::Span) -> Result<()> {
    check_identifier(name)
        .map_err(|e| Error::new(span, format!("Invalid field name '{}': {}", name, e)))
}

/// Comma separated identifiers inside `#[field(...)]`, `#[index(...)]` and `#[unique(...)]`
#[derive(Debug)]
struct IdentList {
    idents: Vec<Ident>,
}

impl Parse for IdentList {
    fn parse(input: ParseStream) -> Result<Self> {
        let idents = input.parse_terminated(Ident::parse, Token![,])?;
        Ok(IdentList {
            idents: idents.into_iter().collect(),
        })
    }
}

#[derive(Debug)]
pub struct TableInfo {
    pub name: String,
    pub composite_indexes: Vec<Vec<String>>,        // #[index(field1, field2)]
    pub composite_unique_indexes: Vec<Vec<String>>, // #[unique(field1, field2)]
}

/// A persisted model field other than the key and the version
pub struct ColumnInfo {
    pub ident: Ident,
    pub name: String,
    pub ty: Type,
    pub rust_type: String, // whitespace-free type string
    pub required: bool,
    pub non_negative: bool,
    pub indexed: bool,
    pub unique: bool,
}

pub struct FieldInfo {
    pub primary_key: Ident,
    pub primary_key_type: Type, // the T of Option<T>
    pub primary_key_rust_type: String,
    pub version: Option<Ident>,
    pub columns: Vec<ColumnInfo>,
}

impl FieldInfo {
    /// Every column name of the model, key first and version last
    pub fn all_column_names(&self) -> Vec<String> {
        let mut names = vec![self.primary_key.to_string()];
        names.extend(self.columns.iter().map(|c| c.name.clone()));
        if let Some(version) = &self.version {
            names.push(version.to_string());
        }
        names
    }
}

pub fn parse_table_attributes(attrs: &[Attribute]) -> Result<TableInfo> {
    let mut table_name = None;
    let mut composite_indexes = Vec::new();
    let mut composite_unique_indexes = Vec::new();

    for attr in attrs {
        if attr.path().is_ident("table") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("name") {
                    let value: LitStr = meta.value()?.parse()?;
                    validate_table_name_syn(&value.value(), value.span())?;
                    table_name = Some(value.value());
                    Ok(())
                } else {
                    Err(meta.error("unsupported table attribute, expected `name = \"...\"`"))
                }
            })?;
        } else if attr.path().is_ident("index") {
            composite_indexes.push(parse_field_list(attr)?);
        } else if attr.path().is_ident("unique") {
            composite_unique_indexes.push(parse_field_list(attr)?);
        }
    }

    let name = table_name.ok_or_else(|| {
        Error::new(
            proc_macro2::Span::call_site(),
            "table attribute is required: add #[table(name = \"table_name\")] to your struct",
        )
    })?;

    Ok(TableInfo {
        name,
        composite_indexes,
        composite_unique_indexes,
    })
}

/// Parse a list of field names from an attribute like #[index(field1, field2)]
fn parse_field_list(attr: &Attribute) -> Result<Vec<String>> {
    let list: IdentList = attr.parse_args()?;
    if list.idents.is_empty() {
        return Err(Error::new_spanned(
            attr,
            "index or unique attribute requires at least one field name",
        ));
    }
    Ok(list.idents.iter().map(|i| i.to_string()).collect())
}

pub fn parse_field_attributes(data: &Data, table_info: &TableInfo) -> Result<FieldInfo> {
    let fields_named = match data {
        Data::Struct(data_struct) => match &data_struct.fields {
            Fields::Named(fields_named) => fields_named,
            _ => return Err(named_fields_error()),
        },
        _ => return Err(named_fields_error()),
    };

    let mut primary_key: Option<(Ident, Type, String)> = None;
    let mut version = None;
    let mut columns = Vec::new();

    for field in &fields_named.named {
        let field_name = field
            .ident
            .as_ref()
            .ok_or_else(|| Error::new_spanned(field, "Field must have a name"))?;
        let field_name_str = field_name.to_string();
        validate_field_name_syn(&field_name_str, field_name.span())?;

        let ty = &field.ty;
        let type_string = quote!(#ty).to_string().replace(' ', "");

        if has_attribute(&field.attrs, "primary_key") {
            if primary_key.is_some() {
                return Err(Error::new_spanned(field, "only one #[primary_key] field is allowed"));
            }
            let inner = option_inner(ty).ok_or_else(|| {
                Error::new_spanned(
                    ty,
                    "#[primary_key] field must be an Option: the store assigns the identifier",
                )
            })?;
            let inner_string = option_inner_type(&type_string).unwrap_or_default().to_string();
            if identity_column_type(&inner_string).is_none() {
                return Err(Error::new_spanned(
                    ty,
                    "#[primary_key] must be Option<i32>, Option<i64> or Option<Uuid>",
                ));
            }
            primary_key = Some((field_name.clone(), inner.clone(), inner_string));
            continue;
        }

        if has_attribute(&field.attrs, "version") {
            if version.is_some() {
                return Err(Error::new_spanned(field, "only one #[version] field is allowed"));
            }
            if type_string != "i64" {
                return Err(Error::new_spanned(ty, "#[version] field must be i64"));
            }
            version = Some(field_name.clone());
            continue;
        }

        if let Some(reason) = unsupported_column_type(&type_string) {
            return Err(Error::new_spanned(
                ty,
                format!("field '{}' cannot be stored: {}", field_name_str, reason),
            ));
        }

        let options = parse_field_options(&field.attrs)?;
        let required = options.iter().any(|o| o == "required");
        let non_negative = options.iter().any(|o| o == "non_negative");

        if required && type_string != "String" {
            return Err(Error::new_spanned(ty, "`required` applies to String fields"));
        }
        if non_negative && !is_signed_number(&type_string) {
            return Err(Error::new_spanned(
                ty,
                "`non_negative` applies to i16, i32, i64, f32 and f64 fields",
            ));
        }

        columns.push(ColumnInfo {
            ident: field_name.clone(),
            name: field_name_str,
            ty: ty.clone(),
            rust_type: type_string,
            required,
            non_negative,
            indexed: has_attribute(&field.attrs, "index") || options.iter().any(|o| o == "index"),
            unique: has_attribute(&field.attrs, "unique") || options.iter().any(|o| o == "unique"),
        });
    }

    let (primary_key, primary_key_type, primary_key_rust_type) = primary_key.ok_or_else(|| {
        Error::new(
            proc_macro2::Span::call_site(),
            "a #[primary_key] field is required",
        )
    })?;

    let info = FieldInfo {
        primary_key,
        primary_key_type,
        primary_key_rust_type,
        version,
        columns,
    };

    // Composite indexes may only name persisted columns
    let known = info.all_column_names();
    for group in table_info
        .composite_indexes
        .iter()
        .chain(&table_info.composite_unique_indexes)
    {
        if let Some(unknown) = group.iter().find(|f| !known.contains(f)) {
            return Err(Error::new(
                proc_macro2::Span::call_site(),
                format!("index references unknown field '{}'", unknown),
            ));
        }
    }

    Ok(info)
}

fn named_fields_error() -> Error {
    Error::new(
        proc_macro2::Span::call_site(),
        "TableMetadata can only be derived for structs with named fields",
    )
}

fn is_signed_number(type_string: &str) -> bool {
    matches!(type_string, "i16" | "i32" | "i64" | "f32" | "f64")
}

/// Extract `T` from a `Option<T>` type
fn option_inner(ty: &Type) -> Option<&Type> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    let segment = type_path.path.segments.last()?;
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

pub fn has_attribute(attrs: &[Attribute], name: &str) -> bool {
    attrs.iter().any(|attr| attr.path().is_ident(name))
}

/// Options listed in `#[field(...)]`; `#[field]` alone has none
fn parse_field_options(attrs: &[Attribute]) -> Result<Vec<String>> {
    let mut options = Vec::new();
    for attr in attrs.iter().filter(|a| a.path().is_ident("field")) {
        match &attr.meta {
            Meta::Path(_) => {}
            Meta::List(_) => {
                let list: IdentList = attr.parse_args()?;
                for ident in list.idents {
                    match ident.to_string().as_str() {
                        "required" | "non_negative" | "index" | "unique" => {
                            options.push(ident.to_string())
                        }
                        other => {
                            return Err(Error::new(
                                ident.span(),
                                format!("unknown field option '{}'", other),
                            ))
                        }
                    }
                }
            }
            Meta::NameValue(_) => {
                return Err(Error::new_spanned(attr, "#[field = ...] is not supported"));
            }
        }
    }
    Ok(options)
}
