//! Row hydration.
//!
//! Hydration maps one raw row onto a fresh [`Entity`]: each row field's
//! database-convention name is converted to the host convention and, if it
//! matches a declared column, the value is coerced to the column's
//! semantic type and assigned. Fields with no matching declared column
//! land in the overflow bag under their original database name. Requested
//! dynamic columns are resolved afterwards, against the finished instance.
//!
//! Hydration never mutates the metadata and never shares instances across
//! rows.

use quell_core::{Entity, EntityInfo, Error, Result, Row, SqlType, TypeError, Value};

/// Hydrate a single row.
pub fn hydrate(info: &EntityInfo, row: &Row) -> Result<Entity> {
    let mut entity = Entity::new();
    for (name, value) in row.iter() {
        let field = info.field_of(name);
        match info.column(&field) {
            Some(def) => {
                let coerced = coerce(def.sql_type, value.clone()).map_err(|e| match e {
                    Error::Type(mut te) => {
                        te.column = Some(name.to_string());
                        Error::Type(te)
                    }
                    e => e,
                })?;
                entity.set(field, coerced);
            }
            None => entity.set_extra(name.to_string(), value.clone()),
        }
    }
    Ok(entity)
}

/// Hydrate a row sequence and resolve the requested dynamic columns on
/// each instance.
pub fn hydrate_all(info: &EntityInfo, rows: &[Row], dynamic: &[String]) -> Result<Vec<Entity>> {
    let mut entities = Vec::with_capacity(rows.len());
    for row in rows {
        let mut entity = hydrate(info, row)?;
        for name in dynamic {
            let column = info.dynamic_column(name).ok_or_else(|| {
                Error::Custom(format!(
                    "unknown dynamic column '{name}' on '{}'",
                    info.table
                ))
            })?;
            let value = (column.resolve)(&entity);
            entity.set_extra(name.clone(), value);
        }
        entities.push(entity);
    }
    Ok(entities)
}

/// Coerce a driver value to a declared column's semantic type.
///
/// Drivers differ in how they surface booleans, JSON, and UUIDs; this is
/// where those shapes converge. Values that already match, and shapes with
/// no defined conversion, pass through untouched.
fn coerce(sql_type: SqlType, value: Value) -> Result<Value> {
    if value.is_null() {
        return Ok(Value::Null);
    }
    let coerced = match (sql_type, value) {
        (SqlType::Bool, Value::Int(v)) => Value::Bool(v != 0),
        (SqlType::Bool, Value::BigInt(v)) => Value::Bool(v != 0),
        (SqlType::BigInt, Value::Int(v)) => Value::BigInt(i64::from(v)),
        (SqlType::Double, Value::Int(v)) => Value::Double(f64::from(v)),
        (SqlType::Double, Value::BigInt(v)) => Value::Double(v as f64),
        (SqlType::Timestamp, Value::Int(v)) => Value::Timestamp(i64::from(v)),
        (SqlType::Timestamp, Value::BigInt(v)) => Value::Timestamp(v),
        (SqlType::Json, Value::Text(s)) => {
            let json = serde_json::from_str(&s).map_err(|e| {
                Error::Type(TypeError {
                    expected: "valid JSON",
                    actual: format!("invalid JSON: {e}"),
                    column: None,
                })
            })?;
            Value::Json(json)
        }
        (SqlType::Uuid, Value::Text(s)) => {
            let parsed = uuid::Uuid::try_parse(&s).map_err(|_| {
                Error::Type(TypeError {
                    expected: "UUID",
                    actual: format!("unparseable UUID text '{s}'"),
                    column: None,
                })
            })?;
            Value::Uuid(*parsed.as_bytes())
        }
        (SqlType::Uuid, Value::Bytes(b)) if b.len() == 16 => {
            let mut arr = [0u8; 16];
            arr.copy_from_slice(&b);
            Value::Uuid(arr)
        }
        (_, value) => value,
    };
    Ok(coerced)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quell_core::{ColumnDef, DynamicColumn, NameStyle};

    static USER: EntityInfo = EntityInfo::new("users")
        .primary_key("id")
        .columns(&[
            ColumnDef::new("id", SqlType::BigInt),
            ColumnDef::new("name", SqlType::Text),
            ColumnDef::new("active", SqlType::Bool),
            ColumnDef::new("meta", SqlType::Json),
        ])
        .dynamic(&[DynamicColumn::new("display_name", display_name)]);

    fn display_name(entity: &Entity) -> Value {
        match entity.get("name") {
            Some(Value::Text(name)) => Value::Text(format!("~{name}~")),
            _ => Value::Null,
        }
    }

    fn user_row() -> Row {
        Row::new(
            vec![
                "id".to_string(),
                "name".to_string(),
                "active".to_string(),
                "row_total".to_string(),
            ],
            vec![
                Value::BigInt(1),
                Value::Text("Ada".to_string()),
                Value::Int(1),
                Value::BigInt(42),
            ],
        )
    }

    #[test]
    fn declared_columns_are_assigned() {
        let entity = hydrate(&USER, &user_row()).unwrap();
        assert_eq!(entity.get_named::<i64>("id").unwrap(), 1);
        assert_eq!(entity.get_named::<String>("name").unwrap(), "Ada");
    }

    #[test]
    fn driver_ints_coerce_to_declared_bools() {
        let entity = hydrate(&USER, &user_row()).unwrap();
        assert_eq!(entity.get("active"), Some(&Value::Bool(true)));
    }

    #[test]
    fn unmatched_fields_land_in_the_overflow_bag() {
        let entity = hydrate(&USER, &user_row()).unwrap();
        assert_eq!(entity.get("row_total"), None);
        assert_eq!(entity.extra("row_total"), Some(&Value::BigInt(42)));
    }

    #[test]
    fn naming_conversion_bridges_conventions() {
        static CAMEL_DB: EntityInfo = EntityInfo::new("users")
            .conventions(NameStyle::Snake, NameStyle::Camel)
            .columns(&[ColumnDef::new("created_at", SqlType::Timestamp)]);

        let row = Row::new(vec!["createdAt".to_string()], vec![Value::BigInt(99)]);
        let entity = hydrate(&CAMEL_DB, &row).unwrap();
        assert_eq!(entity.get("created_at"), Some(&Value::Timestamp(99)));
    }

    #[test]
    fn json_text_is_parsed() {
        let row = Row::new(
            vec!["meta".to_string()],
            vec![Value::Text("{\"tags\":[1,2]}".to_string())],
        );
        let entity = hydrate(&USER, &row).unwrap();
        match entity.get("meta") {
            Some(Value::Json(json)) => assert_eq!(json["tags"][0], 1),
            other => panic!("expected parsed JSON, got {other:?}"),
        }
    }

    #[test]
    fn invalid_json_text_is_a_type_error() {
        let row = Row::new(
            vec!["meta".to_string()],
            vec![Value::Text("{not json".to_string())],
        );
        assert!(matches!(hydrate(&USER, &row), Err(Error::Type(_))));
    }

    #[test]
    fn uuid_shapes_converge() {
        static DOC: EntityInfo =
            EntityInfo::new("docs").columns(&[ColumnDef::new("id", SqlType::Uuid)]);

        let text_row = Row::new(
            vec!["id".to_string()],
            vec![Value::Text(
                "00000000-0000-0000-0000-000000000001".to_string(),
            )],
        );
        let entity = hydrate(&DOC, &text_row).unwrap();
        let mut expected = [0u8; 16];
        expected[15] = 1;
        assert_eq!(entity.get("id"), Some(&Value::Uuid(expected)));

        let byte_row = Row::new(vec!["id".to_string()], vec![Value::Bytes(vec![7u8; 16])]);
        let entity = hydrate(&DOC, &byte_row).unwrap();
        assert_eq!(entity.get("id"), Some(&Value::Uuid([7u8; 16])));
    }

    #[test]
    fn nulls_stay_null() {
        let row = Row::new(vec!["active".to_string()], vec![Value::Null]);
        let entity = hydrate(&USER, &row).unwrap();
        assert_eq!(entity.get("active"), Some(&Value::Null));
    }

    #[test]
    fn requested_dynamic_columns_resolve_after_assignment() {
        let entities = hydrate_all(&USER, &[user_row()], &["display_name".to_string()]).unwrap();
        assert_eq!(
            entities[0].extra("display_name"),
            Some(&Value::Text("~Ada~".to_string()))
        );
    }

    #[test]
    fn unrequested_dynamic_columns_are_not_resolved() {
        let entities = hydrate_all(&USER, &[user_row()], &[]).unwrap();
        assert_eq!(entities[0].extra("display_name"), None);
    }

    #[test]
    fn unknown_dynamic_column_errors() {
        let result = hydrate_all(&USER, &[user_row()], &["nope".to_string()]);
        assert!(matches!(result, Err(Error::Custom(_))));
    }

    #[test]
    fn instances_are_independent_across_rows() {
        let rows = vec![user_row(), user_row()];
        let mut entities = hydrate_all(&USER, &rows, &[]).unwrap();
        entities[0].set("name", Value::Text("changed".to_string()));
        assert_eq!(entities[1].get_named::<String>("name").unwrap(), "Ada");
    }
}
