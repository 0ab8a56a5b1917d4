//! Template form trees.
//!
//! Metric and filter definitions, and the clauses of an assembled query,
//! are forms: s-expression-like arrays in the wire format, `["count"]` or
//! `["sum", ["dimension", "Income"]]`. Two node kinds are special-cased
//! out of the generic operator application: dimension references (the
//! placeholders templates are parametrized over) and field references (the
//! concrete form a placeholder materializes into).

use serde::de::{self, Deserializer};
use serde::ser::{SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::metadata::FieldId;

/// A concrete column reference in the execution-query dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldReference {
    /// Direct reference: `["field-id", id]`.
    Field(FieldId),
    /// Foreign-key-chained reference: `["fk->", fk_field, target_field]`.
    ForeignKey(FieldId, FieldId),
}

/// One node of a template form tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Form {
    /// Operator application: `[op, arg...]`.
    Op(String, Vec<Form>),
    /// Placeholder for a bound dimension: `["dimension", name]`.
    DimensionRef(String),
    /// Concrete field reference, present only after instantiation.
    FieldRef(FieldReference),
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl Form {
    pub fn op(name: impl Into<String>, args: Vec<Form>) -> Self {
        Form::Op(name.into(), args)
    }

    pub fn dimension(name: impl Into<String>) -> Self {
        Form::DimensionRef(name.into())
    }

    /// All dimension identifiers referenced anywhere in this form, in
    /// first-seen order, deduplicated.
    pub fn dimension_refs(&self) -> Vec<String> {
        let mut refs = Vec::new();
        self.collect_dimension_refs(&mut refs);
        refs
    }

    fn collect_dimension_refs(&self, refs: &mut Vec<String>) {
        match self {
            Form::DimensionRef(name) => {
                if !refs.iter().any(|seen| seen == name) {
                    refs.push(name.clone());
                }
            }
            Form::Op(_, args) => {
                for arg in args {
                    arg.collect_dimension_refs(refs);
                }
            }
            _ => {}
        }
    }

    /// Replace every dimension-reference node using `resolve`. Returns
    /// `None` if any referenced identifier fails to resolve - a form with
    /// an unbound placeholder has no concrete meaning.
    pub fn instantiate<F>(&self, resolve: &F) -> Option<Form>
    where
        F: Fn(&str) -> Option<Form>,
    {
        match self {
            Form::DimensionRef(name) => resolve(name),
            Form::Op(op, args) => {
                let mut instantiated = Vec::with_capacity(args.len());
                for arg in args {
                    instantiated.push(arg.instantiate(resolve)?);
                }
                Some(Form::Op(op.clone(), instantiated))
            }
            other => Some(other.clone()),
        }
    }

    /// Parse a form from its JSON value representation.
    pub fn from_value(value: &Value) -> Result<Form, String> {
        match value {
            Value::String(s) => Ok(Form::Str(s.clone())),
            Value::Bool(b) => Ok(Form::Bool(*b)),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(Form::Int(i))
                } else if let Some(f) = n.as_f64() {
                    Ok(Form::Float(f))
                } else {
                    Err(format!("number out of range: {n}"))
                }
            }
            Value::Array(items) => Self::from_array(items),
            Value::Null => Err("null is not a valid form".to_string()),
            Value::Object(_) => Err("objects are not valid forms".to_string()),
        }
    }

    fn from_array(items: &[Value]) -> Result<Form, String> {
        let Some(Value::String(head)) = items.first() else {
            return Err("a form array must start with an operator name".to_string());
        };
        let args = &items[1..];
        match head.as_str() {
            "dimension" => match args {
                [Value::String(name)] => Ok(Form::DimensionRef(name.clone())),
                _ => Err("[\"dimension\", ...] takes exactly one name".to_string()),
            },
            "field-id" => match args {
                [id] => Ok(Form::FieldRef(FieldReference::Field(field_id(id)?))),
                _ => Err("[\"field-id\", ...] takes exactly one id".to_string()),
            },
            "fk->" => match args {
                [fk, target] => Ok(Form::FieldRef(FieldReference::ForeignKey(
                    field_id(fk)?,
                    field_id(target)?,
                ))),
                _ => Err("[\"fk->\", ...] takes exactly two ids".to_string()),
            },
            _ => {
                let args = args
                    .iter()
                    .map(Form::from_value)
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Form::Op(head.clone(), args))
            }
        }
    }
}

fn field_id(value: &Value) -> Result<FieldId, String> {
    value
        .as_u64()
        .map(FieldId)
        .ok_or_else(|| format!("expected a field id, got {value}"))
}

impl Serialize for Form {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Form::Op(op, args) => {
                let mut seq = serializer.serialize_seq(Some(args.len() + 1))?;
                seq.serialize_element(op)?;
                for arg in args {
                    seq.serialize_element(arg)?;
                }
                seq.end()
            }
            Form::DimensionRef(name) => {
                let mut seq = serializer.serialize_seq(Some(2))?;
                seq.serialize_element("dimension")?;
                seq.serialize_element(name)?;
                seq.end()
            }
            Form::FieldRef(FieldReference::Field(id)) => {
                let mut seq = serializer.serialize_seq(Some(2))?;
                seq.serialize_element("field-id")?;
                seq.serialize_element(id)?;
                seq.end()
            }
            Form::FieldRef(FieldReference::ForeignKey(fk, target)) => {
                let mut seq = serializer.serialize_seq(Some(3))?;
                seq.serialize_element("fk->")?;
                seq.serialize_element(fk)?;
                seq.serialize_element(target)?;
                seq.end()
            }
            Form::Str(s) => serializer.serialize_str(s),
            Form::Int(i) => serializer.serialize_i64(*i),
            Form::Float(f) => serializer.serialize_f64(*f),
            Form::Bool(b) => serializer.serialize_bool(*b),
        }
    }
}

impl<'de> Deserialize<'de> for Form {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Form::from_value(&value).map_err(de::Error::custom)
    }
}
