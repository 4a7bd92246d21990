use serde_json::Value;

/// Лист JSON-документа, интересный словарю термов.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Leaf<'a> {
    Str(&'a str),
    Number,
    Bool,
}

/// Обход документа: вложенные объекты через точку, элементы массива
/// принадлежат полю-родителю (`tags: ["a","b"]` → два терма поля `tags`).
/// `_id` и null пропускаются.
pub fn collect_fields<'a>(json: &'a Value, f: &mut impl FnMut(&str, Leaf<'a>)) {
    if let Some(obj) = json.as_object() {
        for (k, v) in obj {
            if k == "_id" {
                continue;
            }
            collect_inner(k, v, f);
        }
    }
}

fn collect_inner<'a>(path: &str, v: &'a Value, f: &mut impl FnMut(&str, Leaf<'a>)) {
    match v {
        Value::String(s) => f(path, Leaf::Str(s)),
        Value::Number(_) => f(path, Leaf::Number),
        Value::Bool(_) => f(path, Leaf::Bool),
        Value::Object(map) => {
            for (k, vv) in map {
                let key = format!("{path}.{k}");
                collect_inner(&key, vv, f);
            }
        }
        Value::Array(arr) => {
            for vv in arr {
                collect_inner(path, vv, f);
            }
        }
        Value::Null => {}
    }
}
