use crate::error::{Error, ErrorKind};
use crate::value::DynamicValue;

/// How a sub-value is addressed inside its container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field<'a> {
    /// Use the container itself. Sequence elements are addressed by position,
    /// so the element is already the value.
    Direct,
    Named(&'a str),
}

/// Identifier form shared by schema names and host field names: underscores
/// dropped, ASCII case folded. `account_id`, `accountId` and `AccountId` agree.
pub fn canonical_name(name: &str) -> String {
    name.chars()
        .filter(|&c| c != '_')
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

pub fn resolve<'v>(field: Field<'_>, container: &'v DynamicValue) -> Result<&'v DynamicValue, Error> {
    let name = match field {
        Field::Direct => return Ok(container),
        Field::Named(name) => name,
    };

    match container {
        DynamicValue::Map(entries) => {
            if let Some(v) = entries.get(name) {
                return Ok(v);
            }
            let want = canonical_name(name);
            entries
                .iter()
                .find(|(k, _)| canonical_name(k) == want)
                .map(|(_, v)| v)
                .ok_or_else(|| missing(format!("map has no key {name:?}")))
        }
        DynamicValue::Record {
            name: record,
            fields,
        } => {
            if let Some((_, v)) = fields.iter().find(|(k, _)| k == name) {
                return Ok(v);
            }
            let want = canonical_name(name);
            fields
                .iter()
                .find(|(k, _)| canonical_name(k) == want)
                .map(|(_, v)| v)
                .ok_or_else(|| missing(format!("record {record} has no field {name:?}")))
        }
        DynamicValue::Optional(Some(inner)) => resolve(field, inner),
        DynamicValue::Optional(None) => Err(missing(format!(
            "cannot look up {name:?} in an absent optional"
        ))),
        DynamicValue::Opaque(what) => Err(missing(format!(
            "cannot look up {name:?} in opaque handle {what}"
        ))),
        other => Err(missing(format!(
            "cannot look up {name:?} in a {} value",
            other.kind_str()
        ))),
    }
}

fn missing(message: String) -> Error {
    Error::new(ErrorKind::MissingField, message)
}
