//! 绑定值
//!
//! `BindValue` 是可绑定到命名占位符上的标量（或列表）值；`BindMap` 按插入顺序
//! 保存占位符名称到值的映射；`Bind` 是条件重写时使用的输入，可以是普通值，
//! 也可以是一个嵌入的子查询。

use serde::{Deserialize, Serialize};

use crate::select::Select;

/// 绑定值，用于安全地传递参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BindValue {
    Null,
    Bool(bool),
    Int64(i64),
    Int32(i32),
    Int16(i16),
    Float64(f64),
    Float32(f32),
    String(String),
    /// 列表值，导出为位置参数时展开为多个占位符（用于 `IN (:ids)`）
    Array(Vec<BindValue>),
    Bytes(Vec<u8>),
}

impl BindValue {
    pub fn is_null(&self) -> bool {
        matches!(self, BindValue::Null)
    }
}

impl From<String> for BindValue {
    fn from(s: String) -> Self {
        BindValue::String(s)
    }
}

impl From<&str> for BindValue {
    fn from(s: &str) -> Self {
        BindValue::String(s.to_string())
    }
}

impl From<&String> for BindValue {
    fn from(s: &String) -> Self {
        BindValue::String(s.clone())
    }
}

impl From<i64> for BindValue {
    fn from(i: i64) -> Self {
        BindValue::Int64(i)
    }
}

impl From<i32> for BindValue {
    fn from(i: i32) -> Self {
        BindValue::Int32(i)
    }
}

impl From<i16> for BindValue {
    fn from(i: i16) -> Self {
        BindValue::Int16(i)
    }
}

impl From<u32> for BindValue {
    fn from(i: u32) -> Self {
        BindValue::Int64(i as i64)
    }
}

impl From<f64> for BindValue {
    fn from(f: f64) -> Self {
        BindValue::Float64(f)
    }
}

impl From<f32> for BindValue {
    fn from(f: f32) -> Self {
        BindValue::Float32(f)
    }
}

impl From<bool> for BindValue {
    fn from(b: bool) -> Self {
        BindValue::Bool(b)
    }
}

impl From<Vec<u8>> for BindValue {
    fn from(b: Vec<u8>) -> Self {
        BindValue::Bytes(b)
    }
}

impl<T: Into<BindValue>> From<Option<T>> for BindValue {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => BindValue::Null,
        }
    }
}

// 列表值：逐个元素转换
macro_rules! impl_array_from {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<Vec<$ty>> for BindValue {
                fn from(items: Vec<$ty>) -> Self {
                    BindValue::Array(items.into_iter().map(BindValue::from).collect())
                }
            }

            impl From<&[$ty]> for BindValue {
                fn from(items: &[$ty]) -> Self {
                    BindValue::Array(items.iter().cloned().map(BindValue::from).collect())
                }
            }
        )*
    };
}

impl_array_from!(BindValue, String, &str, i64, i32, i16, f64, bool);

impl<const N: usize> From<[&str; N]> for BindValue {
    fn from(items: [&str; N]) -> Self {
        BindValue::Array(items.into_iter().map(BindValue::from).collect())
    }
}

impl<const N: usize> From<[i64; N]> for BindValue {
    fn from(items: [i64; N]) -> Self {
        BindValue::Array(items.into_iter().map(BindValue::from).collect())
    }
}

impl From<chrono::NaiveDate> for BindValue {
    fn from(d: chrono::NaiveDate) -> Self {
        BindValue::String(d.format("%Y-%m-%d").to_string())
    }
}

impl From<chrono::NaiveDateTime> for BindValue {
    fn from(dt: chrono::NaiveDateTime) -> Self {
        BindValue::String(dt.format("%Y-%m-%d %H:%M:%S%.f").to_string())
    }
}

impl From<chrono::DateTime<chrono::Utc>> for BindValue {
    fn from(dt: chrono::DateTime<chrono::Utc>) -> Self {
        BindValue::String(dt.to_rfc3339())
    }
}

impl From<bigdecimal::BigDecimal> for BindValue {
    fn from(d: bigdecimal::BigDecimal) -> Self {
        BindValue::String(d.to_string())
    }
}

impl From<serde_json::Value> for BindValue {
    fn from(v: serde_json::Value) -> Self {
        use serde_json::Value;

        match v {
            Value::Null => BindValue::Null,
            Value::Bool(b) => BindValue::Bool(b),
            Value::Number(n) => n
                .as_i64()
                .map(BindValue::Int64)
                .or_else(|| n.as_f64().map(BindValue::Float64))
                .unwrap_or(BindValue::Null),
            Value::String(s) => BindValue::String(s),
            Value::Array(items) => {
                BindValue::Array(items.into_iter().map(BindValue::from).collect())
            }
            other @ Value::Object(_) => BindValue::String(other.to_string()),
        }
    }
}

/// 按插入顺序保存的 占位符名称 -> 值 映射
///
/// 对已存在的名称重新绑定时原地覆盖，保留其原有位置。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BindMap {
    entries: Vec<(String, BindValue)>,
}

impl BindMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<BindValue>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == name) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&BindValue> {
        self.entries.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == name)
    }

    pub fn remove(&mut self, name: &str) -> Option<BindValue> {
        let index = self.entries.iter().position(|(k, _)| k == name)?;
        Some(self.entries.remove(index).1)
    }

    /// 合并另一个映射：同名覆盖（保留原位置），新名称追加到末尾
    pub fn merge(&mut self, other: BindMap) {
        for (name, value) in other.entries {
            self.insert(name, value);
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &BindValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<BindValue>> FromIterator<(K, V)> for BindMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = BindMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl IntoIterator for BindMap {
    type Item = (String, BindValue);
    type IntoIter = std::vec::IntoIter<(String, BindValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// 条件中的一个绑定：普通值，或在渲染时展开为子查询文本的 `Select`
#[derive(Debug, Clone)]
pub enum Bind {
    Value(BindValue),
    Select(Box<Select>),
}

impl From<Select> for Bind {
    fn from(select: Select) -> Self {
        Bind::Select(Box::new(select))
    }
}

impl From<BindValue> for Bind {
    fn from(v: BindValue) -> Self {
        Bind::Value(v)
    }
}

macro_rules! impl_bind_from {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Bind {
                fn from(v: $ty) -> Self {
                    Bind::Value(BindValue::from(v))
                }
            }
        )*
    };
}

impl_bind_from!(
    String,
    &str,
    &String,
    i64,
    i32,
    i16,
    u32,
    f64,
    f32,
    bool,
    Vec<u8>,
    Vec<BindValue>,
    Vec<String>,
    Vec<&str>,
    Vec<i64>,
    Vec<i32>,
    chrono::NaiveDate,
    chrono::NaiveDateTime,
    chrono::DateTime<chrono::Utc>,
    bigdecimal::BigDecimal,
    serde_json::Value,
);

impl<T: Into<BindValue>> From<Option<T>> for Bind {
    fn from(v: Option<T>) -> Self {
        Bind::Value(BindValue::from(v))
    }
}

impl<const N: usize> From<[&str; N]> for Bind {
    fn from(items: [&str; N]) -> Self {
        Bind::Value(BindValue::from(items))
    }
}

impl<const N: usize> From<[i64; N]> for Bind {
    fn from(items: [i64; N]) -> Self {
        Bind::Value(BindValue::from(items))
    }
}

/// 有序的绑定列表，通常由 [`binds!`](crate::binds) 构造
pub type Binds = Vec<(String, Bind)>;

/// 构造有序绑定列表
///
/// ```
/// use sqlquery::binds;
///
/// let b = binds! { "id" => 1i64, "name" => "foo" };
/// assert_eq!(b.len(), 2);
/// ```
#[macro_export]
macro_rules! binds {
    () => {
        ::std::vec::Vec::<(::std::string::String, $crate::Bind)>::new()
    };
    ($($name:expr => $value:expr),+ $(,)?) => {
        ::std::vec![$((::std::string::String::from($name), $crate::Bind::from($value))),+]
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_map_overwrite_keeps_position() {
        let mut map = BindMap::new();
        map.insert("a", 1i64);
        map.insert("b", 2i64);
        map.insert("a", 3i64);
        let keys: Vec<&str> = map.keys().collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(map.get("a"), Some(&BindValue::Int64(3)));
    }

    #[test]
    fn test_bind_map_merge() {
        let mut map: BindMap = vec![("foo", "bar"), ("baz", "dib")].into_iter().collect();
        let other: BindMap = vec![("baz", "zim"), ("gir", "irk")].into_iter().collect();
        map.merge(other);
        let pairs: Vec<(&str, &BindValue)> = map.iter().collect();
        assert_eq!(
            pairs,
            vec![
                ("foo", &BindValue::from("bar")),
                ("baz", &BindValue::from("zim")),
                ("gir", &BindValue::from("irk")),
            ]
        );
    }

    #[test]
    fn test_from_json_value() {
        let v: BindValue = serde_json::json!([1, "a", null, true, 1.5]).into();
        assert_eq!(
            v,
            BindValue::Array(vec![
                BindValue::Int64(1),
                BindValue::from("a"),
                BindValue::Null,
                BindValue::Bool(true),
                BindValue::Float64(1.5),
            ])
        );
    }

    #[test]
    fn test_option_and_dates() {
        assert!(BindValue::from(None::<i64>).is_null());
        let d = chrono::NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(BindValue::from(d), BindValue::from("2024-02-29"));
    }

    #[test]
    fn test_binds_macro() {
        let b = crate::binds! { "a" => 1i64, "b" => vec!["x", "y"] };
        assert_eq!(b[0].0, "a");
        assert!(matches!(b[1].1, Bind::Value(BindValue::Array(_))));
    }
}
