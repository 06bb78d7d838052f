//! Loading and writing json / toml documents, chosen by file extension.

use std::{fmt, fs, path::Path};

use anyhow::{Context, bail};
use serde::de::{self, DeserializeSeed, Deserializer, MapAccess, SeqAccess, Visitor};
use serde_json::{Map, Number, Value};

use crate::{
    data::SettingPath,
    error::{Checked, ConstructionError},
};

/// Read `path` into a JSON value. `.json` and `.toml` are supported.
///
/// A key repeated within one JSON object keeps its first value; later ones are
/// dropped with a warning.
pub fn read(path: &Path) -> anyhow::Result<Value> {
    Ok(logged(read_checked(path)?))
}

/// Like [`read`], reporting every repeated key as a [`ConstructionError::DuplicatePath`].
pub fn read_checked(path: &Path) -> anyhow::Result<Checked<Value>> {
    if !path.exists() {
        bail!("File does not exist: {}", path.display());
    }
    let content =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    parse_checked(&content, extension(path))
        .with_context(|| format!("parsing {}", path.display()))
}

/// Parse `content` in the format named by `ext` (`json`, `toml` or `tml`).
pub fn parse(content: &str, ext: &str) -> anyhow::Result<Value> {
    Ok(logged(parse_checked(content, ext)?))
}

/// Like [`parse`], reporting every repeated key as a [`ConstructionError::DuplicatePath`].
///
/// TOML refuses repeated keys itself, so only JSON can report any.
pub fn parse_checked(content: &str, ext: &str) -> anyhow::Result<Checked<Value>> {
    let checked = match ext {
        "json" => {
            let mut duplicates = Vec::new();
            let mut deserializer = serde_json::Deserializer::from_str(content);
            let value = Tree {
                path: Vec::new(),
                duplicates: &mut duplicates,
            }
            .deserialize(&mut deserializer)?;
            deserializer.end()?;

            let mut checked = Checked::new(value);
            checked.errors = duplicates
                .into_iter()
                .map(|path| ConstructionError::DuplicatePath { path })
                .collect();
            checked
        }
        "toml" | "tml" => {
            let v: toml::Value = toml::from_str(content)?;
            Checked::new(serde_json::to_value(v)?)
        }
        _ => {
            bail!("Unsupported file extension: {ext:?}");
        }
    };
    Ok(checked)
}

fn logged(checked: Checked<Value>) -> Value {
    for error in &checked.errors {
        warn!("{error}");
    }
    checked.value
}

/// JSON decoder that keeps the first value of a repeated object key and
/// records the key's path.
struct Tree<'a> {
    path: Vec<String>,
    duplicates: &'a mut Vec<SettingPath>,
}

impl<'de> DeserializeSeed<'de> for Tree<'_> {
    type Value = Value;

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<Value, D::Error> {
        deserializer.deserialize_any(self)
    }
}

impl<'de> Visitor<'de> for Tree<'_> {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("any JSON value")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Value, E> {
        Ok(Value::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Value, E> {
        Ok(Value::from(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Value, E> {
        Ok(Value::from(v))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Value, E> {
        Ok(Number::from_f64(v).map_or(Value::Null, Value::Number))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Value, E> {
        Ok(Value::String(v.to_owned()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Value, E> {
        Ok(Value::String(v))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Value, A::Error> {
        let mut items = Vec::new();
        while let Some(item) = seq.next_element::<Value>()? {
            items.push(item);
        }
        Ok(Value::Array(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Value, A::Error> {
        let mut map = Map::new();
        while let Some(key) = access.next_key::<String>()? {
            let mut path = self.path.clone();
            path.push(key.clone());
            let value = access.next_value_seed(Tree {
                path: path.clone(),
                duplicates: &mut *self.duplicates,
            })?;
            if map.contains_key(&key) {
                self.duplicates.push(SettingPath::new(path));
            } else {
                map.insert(key, value);
            }
        }
        Ok(Value::Object(map))
    }
}

/// Render `value` in the format named by `ext`.
pub fn render(value: &Value, ext: &str) -> anyhow::Result<String> {
    let s = match ext {
        "toml" | "tml" => toml::to_string_pretty(value)?,
        "json" => serde_json::to_string_pretty(value)?,
        _ => {
            bail!("Unsupported file extension: {ext:?}");
        }
    };
    Ok(s)
}

pub fn extension(path: &Path) -> &str {
    path.extension().and_then(|s| s.to_str()).unwrap_or("")
}
