use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::entities::{Field, FieldKind, Kind};

const DISPLAY_DATE_FORMAT: &str = "%d/%m/%y %H:%M";

pub struct Link {
    pub href: String,
    pub text: String,
}

/// One rendered property. Relationships render as links to the related
/// entity's detail page.
pub struct Cell {
    pub label: &'static str,
    pub text: String,
    pub links: Vec<Link>,
}

pub struct Row {
    pub id: String,
    pub cells: Vec<Cell>,
}

fn link_to(kind: Kind, related: &Value) -> Option<Link> {
    let id = match related.get("id")? {
        Value::String(id) => id.clone(),
        other => other.to_string(),
    };

    Some(Link {
        href: format!("/{}/{}", kind.slug(), id),
        text: id,
    })
}

fn display_scalar(field: &Field, value: &Value) -> String {
    match (field.kind, value) {
        (_, Value::Null) => String::new(),
        (FieldKind::DateTime, Value::String(raw)) => DateTime::parse_from_rfc3339(raw)
            .map(|date| {
                date.with_timezone(&Utc)
                    .format(DISPLAY_DATE_FORMAT)
                    .to_string()
            })
            .unwrap_or_else(|_| raw.clone()),
        (_, Value::String(raw)) => raw.clone(),
        (_, other) => other.to_string(),
    }
}

pub fn cell(field: &Field, entity: &Value) -> Cell {
    let value = entity.get(field.name).unwrap_or(&Value::Null);

    let (text, links) = match field.kind {
        FieldKind::Reference(kind) => (String::new(), link_to(kind, value).into_iter().collect()),
        FieldKind::References(kind) => (
            String::new(),
            value
                .as_array()
                .map(|related| related.iter().filter_map(|r| link_to(kind, r)).collect())
                .unwrap_or_default(),
        ),
        _ => (display_scalar(field, value), vec![]),
    };

    Cell {
        label: field.label,
        text,
        links,
    }
}

pub fn row(fields: &[Field], entity: &Value) -> Row {
    let id = match entity.get("id") {
        Some(Value::String(id)) => id.clone(),
        _ => String::new(),
    };

    Row {
        id,
        cells: fields.iter().map(|field| cell(field, entity)).collect(),
    }
}
