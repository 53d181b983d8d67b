use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde_json::{Map, Value};

use crate::entities::{EntityId, EntityRef, Field, FieldKind, Kind};

/// Raw form body, one list of values per input name.
pub type FormValues = HashMap<String, Vec<String>>;
/// Reference collections fetched for a form, by kind.
pub type References = HashMap<Kind, Vec<EntityRef>>;
pub type FieldErrors = BTreeMap<&'static str, &'static str>;

pub const REQUIRED: &str = "This field is required.";
pub const NOT_A_NUMBER: &str = "This field should be a number.";
pub const NOT_A_DATE: &str = "This field should be a date.";
pub const UNKNOWN_CHOICE: &str = "This value isn't one of the choices.";
pub const UNKNOWN_ENTITY: &str = "This entity doesn't exist.";

const INPUT_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M";

pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

/// Everything a template needs to render one input.
pub struct FormInput {
    pub name: &'static str,
    pub label: &'static str,
    /// `text`, `number` and `datetime-local` inputs, `select` for choices,
    /// `reference` and `multiselect` for relationships.
    pub widget: &'static str,
    pub required: bool,
    pub value: String,
    pub options: Vec<SelectOption>,
    pub error: Option<&'static str>,
}

fn first_value<'v>(values: &'v FormValues, name: &str) -> &'v str {
    values
        .get(name)
        .and_then(|values| values.first())
        .map(|value| value.trim())
        .unwrap_or("")
}

fn format_input_date(date: &DateTime<Utc>) -> String {
    date.format(INPUT_DATE_FORMAT).to_string()
}

fn parse_input_date(value: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(value, INPUT_DATE_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S"))
        .ok()
        .map(|naive| Utc.from_utc_datetime(&naive))
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn reference_id(value: &Value) -> Option<String> {
    value.get("id").map(scalar_to_string)
}

/// Values of a blank form: today at midnight for dates, the first choice
/// for enumerations, nothing for the rest.
pub fn default_values(fields: &[Field]) -> FormValues {
    let midnight = Utc::now()
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .map(|naive| Utc.from_utc_datetime(&naive));

    let mut values = FormValues::new();
    for field in fields {
        match field.kind {
            FieldKind::DateTime => {
                if let Some(midnight) = midnight {
                    values.insert(field.name.to_string(), vec![format_input_date(&midnight)]);
                }
            }
            FieldKind::Choice(choices) => {
                if let Some(first) = choices.first() {
                    values.insert(field.name.to_string(), vec![first.to_string()]);
                }
            }
            _ => {}
        }
    }
    values
}

/// Form values pre-populating an edit form, relationships reduced to ids.
pub fn values_from_entity(fields: &[Field], entity: &Value) -> FormValues {
    let mut values = FormValues::new();
    for field in fields {
        let value = entity.get(field.name).unwrap_or(&Value::Null);
        let field_values = match field.kind {
            FieldKind::Text | FieldKind::Number | FieldKind::Choice(_) => {
                vec![scalar_to_string(value)]
            }
            FieldKind::DateTime => value
                .as_str()
                .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                .map(|date| vec![format_input_date(&date.with_timezone(&Utc))])
                .unwrap_or_default(),
            FieldKind::Reference(_) => reference_id(value).into_iter().collect(),
            FieldKind::References(_) => value
                .as_array()
                .map(|related| related.iter().filter_map(reference_id).collect())
                .unwrap_or_default(),
        };
        values.insert(field.name.to_string(), field_values);
    }
    values
}

pub fn inputs(
    fields: &[Field],
    values: &FormValues,
    references: &References,
    errors: &FieldErrors,
) -> Vec<FormInput> {
    fields
        .iter()
        .map(|field| {
            let current = values.get(field.name).cloned().unwrap_or_default();
            let value = current.first().cloned().unwrap_or_default();

            let (widget, options) = match field.kind {
                FieldKind::Text => ("text", vec![]),
                FieldKind::Number => ("number", vec![]),
                FieldKind::DateTime => ("datetime-local", vec![]),
                FieldKind::Choice(choices) => (
                    "select",
                    choices
                        .iter()
                        .map(|choice| SelectOption {
                            value: choice.to_string(),
                            label: choice.to_string(),
                            selected: *choice == value,
                        })
                        .collect(),
                ),
                FieldKind::Reference(kind) | FieldKind::References(kind) => {
                    let widget = if matches!(field.kind, FieldKind::Reference(_)) {
                        "reference"
                    } else {
                        "multiselect"
                    };
                    let options = references
                        .get(&kind)
                        .map(|collection| {
                            collection
                                .iter()
                                .map(|related| {
                                    let id = related.id.to_string();
                                    SelectOption {
                                        selected: current.contains(&id),
                                        label: id.clone(),
                                        value: id,
                                    }
                                })
                                .collect()
                        })
                        .unwrap_or_default();
                    (widget, options)
                }
            };

            FormInput {
                name: field.name,
                label: field.label,
                widget,
                required: field.required,
                value,
                options,
                error: errors.get(field.name).copied(),
            }
        })
        .collect()
}

fn find_reference_id(references: &References, kind: Kind, raw: &str) -> Option<EntityId> {
    let id = EntityId::from_str(raw).ok()?;
    references
        .get(&kind)?
        .iter()
        .any(|related| related.id == id)
        .then_some(id)
}

fn find_reference(references: &References, kind: Kind, raw: &str) -> Option<Value> {
    let id = EntityId::from_str(raw).ok()?;
    references
        .get(&kind)?
        .iter()
        .find(|related| related.id == id)
        .and_then(|related| serde_json::to_value(related).ok())
}

/// Applies submitted values over `base`, the entity as last fetched (or a
/// blank one). Single relationships become the full entity picked from its
/// reference collection, many-to-many ones become `{id}` objects. Fields the
/// form doesn't know about are left alone.
pub fn merge(
    fields: &[Field],
    base: Value,
    values: &FormValues,
    references: &References,
) -> Result<Value, FieldErrors> {
    let mut entity = match base {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    let mut errors = FieldErrors::new();

    for field in fields {
        let raw = first_value(values, field.name);
        if field.required && raw.is_empty() {
            errors.insert(field.name, REQUIRED);
            continue;
        }

        let value = match field.kind {
            FieldKind::Text if raw.is_empty() => Value::Null,
            FieldKind::Text => Value::String(raw.to_string()),
            FieldKind::Number if raw.is_empty() => Value::Null,
            FieldKind::Number => match raw.parse::<i64>() {
                Ok(number) => Value::from(number),
                Err(_) => {
                    errors.insert(field.name, NOT_A_NUMBER);
                    continue;
                }
            },
            FieldKind::DateTime if raw.is_empty() => Value::Null,
            FieldKind::DateTime => match parse_input_date(raw) {
                Some(date) => Value::String(date.to_rfc3339_opts(chrono::SecondsFormat::Secs, true)),
                None => {
                    errors.insert(field.name, NOT_A_DATE);
                    continue;
                }
            },
            FieldKind::Choice(_) if raw.is_empty() => Value::Null,
            FieldKind::Choice(choices) => {
                if !choices.contains(&raw) {
                    errors.insert(field.name, UNKNOWN_CHOICE);
                    continue;
                }
                Value::String(raw.to_string())
            }
            FieldKind::Reference(_) if raw.is_empty() => Value::Null,
            FieldKind::Reference(kind) => match find_reference(references, kind, raw) {
                Some(related) => related,
                None => {
                    errors.insert(field.name, UNKNOWN_ENTITY);
                    continue;
                }
            },
            FieldKind::References(kind) => {
                let ids = values
                    .get(field.name)
                    .into_iter()
                    .flatten()
                    .map(|raw_id| raw_id.trim())
                    .filter(|raw_id| !raw_id.is_empty())
                    .map(|raw_id| find_reference_id(references, kind, raw_id))
                    .collect::<Option<Vec<_>>>();
                match ids {
                    Some(ids) => Value::Array(
                        ids.into_iter()
                            .map(|id| serde_json::json!({ "id": id }))
                            .collect(),
                    ),
                    None => {
                        errors.insert(field.name, UNKNOWN_ENTITY);
                        continue;
                    }
                }
            }
        };

        entity.insert(field.name.to_string(), value);
    }

    if errors.is_empty() {
        Ok(Value::Object(entity))
    } else {
        Err(errors)
    }
}
