//! YAML reader/writer for file-backed projects (SPEC_FULL.md §4.F): each
//! element round-trips through `SchemaObject`'s own tagged `Serialize`/
//! `Deserialize` impl, so persistence never needs a bespoke per-kind format.

use serde::de::Error as _;

use ddlsync_core::{Error, KindTag, ObjectReader, ObjectWriter, Result, SchemaObject};

#[derive(Debug, Default, Clone, Copy)]
pub struct YamlReader;

impl ObjectReader for YamlReader {
    fn parse(&self, kind: KindTag, bytes: &[u8]) -> Result<SchemaObject> {
        let object: SchemaObject = serde_yaml::from_slice(bytes).map_err(|source| Error::SerializationError {
            path: format!("<{kind}>"),
            source,
        })?;
        if object.kind() != kind {
            return Err(Error::SerializationError {
                path: format!("<{kind}>"),
                source: serde_yaml::Error::custom(format!(
                    "expected a `{kind}` element, file contains a `{}`",
                    object.kind()
                )),
            });
        }
        Ok(object)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct YamlWriter;

impl ObjectWriter for YamlWriter {
    fn serialize(&self, object: &SchemaObject) -> Result<Vec<u8>> {
        serde_yaml::to_string(object)
            .map(String::into_bytes)
            .map_err(|source| Error::SerializationError {
                path: format!("<{}>", object.name()),
                source,
            })
    }

    fn extension(&self) -> &'static str {
        "yml"
    }
}

#[cfg(test)]
mod tests {
    use ddlsync_core::{Column, Table};

    use super::*;

    #[test]
    fn table_round_trips_through_yaml() {
        let table = Table::new("engines").with_columns(vec![Column::new("id", "int", 0).not_null(true)]);
        let object = SchemaObject::Table(table);

        let bytes = YamlWriter.serialize(&object).unwrap();
        let parsed = YamlReader.parse(KindTag::Table, &bytes).unwrap();

        assert!(object.equals(&parsed));
    }

    #[test]
    fn parsing_under_the_wrong_kind_is_an_error() {
        let object = SchemaObject::Table(Table::new("engines"));
        let bytes = YamlWriter.serialize(&object).unwrap();
        assert!(YamlReader.parse(KindTag::View, &bytes).is_err());
    }
}
