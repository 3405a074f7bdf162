#![deny(unsafe_code)]

//! On-disk schema config documents.
//!
//! One JSON file per platform. Declaration order inside `field_mappings` and
//! `computed_fields` is meaningful (it drives mapping order and computed
//! tie-breaks), so objects deserialize into ordered entry lists instead of
//! serde_json's sorted map type.

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::fmt;
use std::marker::PhantomData;

/// A JSON object captured as an ordered list of entries in document order.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedEntries<T>(pub Vec<(String, T)>);

impl<T> Default for OrderedEntries<T> {
    fn default() -> Self {
        OrderedEntries(Vec::new())
    }
}

impl<T> OrderedEntries<T> {
    pub fn iter(&self) -> impl Iterator<Item = &(String, T)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for OrderedEntries<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntriesVisitor<T>(PhantomData<T>);

        impl<'de, T: Deserialize<'de>> Visitor<'de> for EntriesVisitor<T> {
            type Value = OrderedEntries<T>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a JSON object")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((key, value)) = map.next_entry::<String, T>()? {
                    entries.push((key, value));
                }
                Ok(OrderedEntries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor(PhantomData))
    }
}

/// Top-level schema config document.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaDoc {
    pub platform: String,
    #[serde(default)]
    pub schema_version: Option<String>,
    #[serde(default)]
    pub table: Option<TableDoc>,
    pub field_mappings: OrderedEntries<OrderedEntries<FieldMappingDoc>>,
    #[serde(default)]
    pub computed_fields: OrderedEntries<ComputedDoc>,
    #[serde(default)]
    pub expected_fields: Vec<String>,
}

/// Target table declaration; every part is optional and defaults per
/// platform.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TableDoc {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub partition_field: Option<String>,
    #[serde(default)]
    pub cluster_fields: Option<Vec<String>>,
}

/// One declarative field mapping. Type, steps and function names stay raw
/// strings here; they parse into model enums during verification so load
/// errors can name the platform and field.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldMappingDoc {
    pub source_field: String,
    pub target_field: String,
    pub target_type: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub preprocessing: Vec<String>,
    #[serde(default)]
    pub default_value: Option<Value>,
}

/// One computed field declaration. `function` defaults to the entry's own
/// field name.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ComputedDoc {
    pub target_field: String,
    pub target_type: String,
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub function: Option<String>,
}
