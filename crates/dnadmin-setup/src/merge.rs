//! Deep merge with a fixed policy: object keys merge recursively; arrays
//! and scalars are replaced wholesale by the source operand. Arrays are
//! never concatenated or unioned.

use serde_json::Value;

pub fn deep_merge(dst: &mut Value, src: &Value) {
    match (dst, src) {
        (Value::Object(d), Value::Object(s)) => {
            for (k, v) in s.iter() {
                match d.get_mut(k) {
                    Some(dv) => deep_merge(dv, v),
                    None => {
                        d.insert(k.clone(), v.clone());
                    }
                }
            }
        }
        (d, v) => {
            *d = v.clone();
        }
    }
}

/// Non-destructive form of [`deep_merge`]: `over` wins on overlap.
pub fn merged(base: &Value, over: &Value) -> Value {
    let mut out = base.clone();
    deep_merge(&mut out, over);
    out
}
