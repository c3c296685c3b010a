//! SQL code generation for database operations
//!
//! This module generates SQL statements and the `TableMetadata` implementation
//! from parsed table and field metadata. All SQL text is assembled at expansion
//! time, so the generated methods return static strings.

use proc_macro2::TokenStream;
use quote::quote;
use syn::Ident;
use type_mapping::{identity_column_type, is_optional_type, quote_identifier, rust_type_to_pg_type};

use crate::parsing::{FieldInfo, TableInfo};

/// Every SQL statement the store needs for one table
struct Statements {
    insert: String,
    update: String,
    get_by_id: String,
    find_all_by_id: String,
    exists_by_id: String,
    delete_by_id: String,
    delete_entity: String,
    delete_all_by_id: String,
    delete_all: String,
    count_all: String,
    select_base: String,
}

fn build_statements(table_info: &TableInfo, field_info: &FieldInfo) -> Statements {
    let table = quote_identifier(&table_info.name);
    let pk = quote_identifier(&field_info.primary_key.to_string());
    let version = field_info
        .version
        .as_ref()
        .map(|v| quote_identifier(&v.to_string()));
    let columns: Vec<String> = field_info
        .columns
        .iter()
        .map(|c| quote_identifier(&c.name))
        .collect();

    // The key is always store-assigned and the version starts at its column default
    let insert = if columns.is_empty() {
        format!("INSERT INTO {} DEFAULT VALUES RETURNING *", table)
    } else {
        let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("${}", i)).collect();
        format!(
            "INSERT INTO {} ({}) VALUES ({}) RETURNING *",
            table,
            columns.join(", "),
            placeholders.join(", ")
        )
    };

    let mut assignments: Vec<String> = columns
        .iter()
        .enumerate()
        .map(|(i, column)| format!("{} = ${}", column, i + 1))
        .collect();
    if let Some(version) = &version {
        assignments.push(format!("{} = {} + 1", version, version));
    }
    if assignments.is_empty() {
        assignments.push(format!("{} = {}", pk, pk));
    }
    let key_param = columns.len() + 1;
    let update = match &version {
        Some(version) => format!(
            "UPDATE {} SET {} WHERE {} = ${} AND {} = ${} RETURNING *",
            table,
            assignments.join(", "),
            pk,
            key_param,
            version,
            key_param + 1
        ),
        None => format!(
            "UPDATE {} SET {} WHERE {} = ${} RETURNING *",
            table,
            assignments.join(", "),
            pk,
            key_param
        ),
    };

    let delete_by_id = format!("DELETE FROM {} WHERE {} = $1", table, pk);
    let delete_entity = match &version {
        Some(version) => format!(
            "DELETE FROM {} WHERE {} = $1 AND {} = $2",
            table, pk, version
        ),
        None => delete_by_id.clone(),
    };

    Statements {
        insert,
        update,
        get_by_id: format!("SELECT * FROM {} WHERE {} = $1", table, pk),
        find_all_by_id: format!(
            "SELECT * FROM {} WHERE {} = ANY($1) ORDER BY {}",
            table, pk, pk
        ),
        exists_by_id: format!("SELECT EXISTS(SELECT 1 FROM {} WHERE {} = $1)", table, pk),
        delete_by_id,
        delete_entity,
        delete_all_by_id: format!(
            "DELETE FROM {} WHERE {} = ANY($1) RETURNING {}",
            table, pk, pk
        ),
        delete_all: format!("DELETE FROM {}", table),
        count_all: format!("SELECT COUNT(*) AS total FROM {}", table),
        select_base: format!("SELECT * FROM {}", table),
    }
}

/// CREATE TABLE statement, including the store-managed timestamp columns
fn build_create_table_sql(table_info: &TableInfo, field_info: &FieldInfo) -> String {
    let mut definitions = Vec::new();

    // Parsing guarantees the key type has an identity column type
    let (pk_type, pk_default) =
        identity_column_type(&field_info.primary_key_rust_type).unwrap_or(("BIGSERIAL", ""));
    let mut pk_definition = format!(
        "{} {} PRIMARY KEY",
        quote_identifier(&field_info.primary_key.to_string()),
        pk_type
    );
    if !pk_default.is_empty() {
        pk_definition.push(' ');
        pk_definition.push_str(pk_default);
    }
    definitions.push(pk_definition);

    for column in &field_info.columns {
        let mut definition = format!(
            "{} {}",
            quote_identifier(&column.name),
            rust_type_to_pg_type(&column.rust_type)
        );
        if !is_optional_type(&column.rust_type) {
            definition.push_str(" NOT NULL");
        }
        if column.unique {
            definition.push_str(" UNIQUE");
        }
        definitions.push(definition);
    }

    if let Some(version) = &field_info.version {
        definitions.push(format!(
            "{} BIGINT NOT NULL DEFAULT 0",
            quote_identifier(&version.to_string())
        ));
    }

    definitions.push("\"__created_at__\" TIMESTAMP WITH TIME ZONE DEFAULT NOW()".to_string());
    definitions.push("\"__updated_at__\" TIMESTAMP WITH TIME ZONE DEFAULT NOW()".to_string());

    format!(
        "CREATE TABLE IF NOT EXISTS {} ({})",
        quote_identifier(&table_info.name),
        definitions.join(", ")
    )
}

fn build_indexes_sql(table_info: &TableInfo, field_info: &FieldInfo) -> Vec<String> {
    let table_name = &table_info.name;
    let safe_table_name = quote_identifier(table_name);
    let mut indexes = Vec::new();

    for column in field_info.columns.iter().filter(|c| c.indexed && !c.unique) {
        indexes.push(format!(
            "CREATE INDEX IF NOT EXISTS idx_{}_{} ON {} ({})",
            table_name,
            column.name,
            safe_table_name,
            quote_identifier(&column.name)
        ));
    }

    for (fields, unique) in table_info
        .composite_indexes
        .iter()
        .map(|f| (f, false))
        .chain(table_info.composite_unique_indexes.iter().map(|f| (f, true)))
    {
        let quoted: Vec<String> = fields.iter().map(|f| quote_identifier(f)).collect();
        indexes.push(format!(
            "CREATE {}INDEX IF NOT EXISTS {}_{}_{} ON {} ({})",
            if unique { "UNIQUE " } else { "" },
            if unique { "uq" } else { "idx" },
            table_name,
            fields.join("_"),
            safe_table_name,
            quoted.join(", ")
        ));
    }

    indexes.push(format!(
        "CREATE INDEX IF NOT EXISTS idx_{}_created_at ON {} (\"__created_at__\")",
        table_name, safe_table_name
    ));

    indexes
}

pub fn generate_table_metadata_impl(
    name: &Ident,
    table_info: &TableInfo,
    field_info: &FieldInfo,
) -> TokenStream {
    let table_name = &table_info.name;
    let statements = build_statements(table_info, field_info);
    let Statements {
        insert,
        update,
        get_by_id,
        find_all_by_id,
        exists_by_id,
        delete_by_id,
        delete_entity,
        delete_all_by_id,
        delete_all,
        count_all,
        select_base,
    } = statements;
    let create_table_sql = build_create_table_sql(table_info, field_info);
    let indexes_sql = build_indexes_sql(table_info, field_info);

    let pk_ident = &field_info.primary_key;
    let pk_name = pk_ident.to_string();
    let pk_type = &field_info.primary_key_type;
    let column_names = field_info.all_column_names();

    let column_idents: Vec<&Ident> = field_info.columns.iter().map(|c| &c.ident).collect();

    // field_value arms: key, data columns, version
    let mut value_idents: Vec<&Ident> = vec![pk_ident];
    value_idents.extend(column_idents.iter().copied());
    if let Some(version) = &field_info.version {
        value_idents.push(version);
    }
    let value_names: Vec<String> = value_idents.iter().map(|i| i.to_string()).collect();

    let version_methods = match &field_info.version {
        Some(version) => {
            let version_name = version.to_string();
            quote! {
                fn version_field() -> Option<&'static str> {
                    Some(#version_name)
                }

                fn version(&self) -> Option<i64> {
                    Some(self.#version)
                }

                fn set_version(&mut self, version: i64) {
                    self.#version = version;
                }
            }
        }
        None => quote! {},
    };

    let version_bind = match &field_info.version {
        Some(version) => quote! { .bind(self.#version) },
        None => quote! {},
    };

    let validations: Vec<TokenStream> = field_info
        .columns
        .iter()
        .filter_map(|column| {
            let ident = &column.ident;
            let field_name = &column.name;
            let ty = &column.ty;
            if column.required {
                Some(quote! {
                    if self.#ident.trim().is_empty() {
                        return Err(::availit::store_object::ValidationError::Required {
                            field: #field_name.to_string(),
                        });
                    }
                })
            } else if column.non_negative {
                Some(quote! {
                    if self.#ident < (0 as #ty) {
                        return Err(::availit::store_object::ValidationError::Negative {
                            field: #field_name.to_string(),
                        });
                    }
                })
            } else {
                None
            }
        })
        .collect();

    quote! {
        impl ::availit::store_object::TableMetadata for #name {
            type Id = #pk_type;

            fn table_name() -> &'static str {
                #table_name
            }

            fn primary_key_field() -> &'static str {
                #pk_name
            }

            fn columns() -> &'static [&'static str] {
                &[#(#column_names),*]
            }

            fn insert_sql() -> &'static str {
                #insert
            }

            fn update_sql() -> &'static str {
                #update
            }

            fn get_by_id_sql() -> &'static str {
                #get_by_id
            }

            fn find_all_by_id_sql() -> &'static str {
                #find_all_by_id
            }

            fn exists_by_id_sql() -> &'static str {
                #exists_by_id
            }

            fn delete_by_id_sql() -> &'static str {
                #delete_by_id
            }

            fn delete_entity_sql() -> &'static str {
                #delete_entity
            }

            fn delete_all_by_id_sql() -> &'static str {
                #delete_all_by_id
            }

            fn delete_all_sql() -> &'static str {
                #delete_all
            }

            fn count_all_sql() -> &'static str {
                #count_all
            }

            fn select_base_sql() -> &'static str {
                #select_base
            }

            fn create_table_sql() -> String {
                #create_table_sql.to_string()
            }

            fn create_indexes_sql() -> Vec<String> {
                vec![#(#indexes_sql.to_string()),*]
            }

            fn id(&self) -> Option<Self::Id> {
                self.#pk_ident.clone()
            }

            fn set_id(&mut self, id: Self::Id) {
                self.#pk_ident = Some(id);
            }

            #version_methods

            fn field_value(&self, column: &str) -> Option<::availit::serde_json::Value> {
                match column {
                    #(#value_names => ::availit::serde_json::to_value(&self.#value_idents).ok(),)*
                    _ => None,
                }
            }

            fn validate(&self) -> Result<(), ::availit::store_object::ValidationError> {
                #(#validations)*
                Ok(())
            }

            fn bind_insert<'q>(
                &'q self,
                query: ::availit::sqlx::query::QueryAs<
                    'q,
                    ::availit::sqlx::Postgres,
                    Self,
                    ::availit::sqlx::postgres::PgArguments,
                >,
            ) -> ::availit::sqlx::query::QueryAs<
                'q,
                ::availit::sqlx::Postgres,
                Self,
                ::availit::sqlx::postgres::PgArguments,
            > {
                query #(.bind(&self.#column_idents))*
            }

            fn bind_update<'q>(
                &'q self,
                query: ::availit::sqlx::query::QueryAs<
                    'q,
                    ::availit::sqlx::Postgres,
                    Self,
                    ::availit::sqlx::postgres::PgArguments,
                >,
            ) -> ::availit::sqlx::query::QueryAs<
                'q,
                ::availit::sqlx::Postgres,
                Self,
                ::availit::sqlx::postgres::PgArguments,
            > {
                query #(.bind(&self.#column_idents))* .bind(&self.#pk_ident) #version_bind
            }
        }
    }
}
