use serde::Serialize;
use serde_json::Value;

use course_portal::utils::media_url::resolve_media_url;

/// Prints `value` as pretty JSON, with every media `url` made absolute
/// against `media_origin`.
pub fn print_json<T: Serialize>(value: &T, media_origin: &str) -> anyhow::Result<()> {
    let mut value = serde_json::to_value(value)?;
    absolutize_media(&mut value, media_origin);
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

pub fn absolutize_media(value: &mut Value, media_origin: &str) {
    match value {
        Value::Object(map) => {
            for (key, child) in map.iter_mut() {
                if key == "media" {
                    if let Value::Array(items) = child {
                        for item in items.iter_mut() {
                            rewrite_url(item, media_origin);
                        }
                    }
                }
                absolutize_media(child, media_origin);
            }
        }
        Value::Array(items) => items.iter_mut().for_each(|item| absolutize_media(item, media_origin)),
        _ => {}
    }
}

fn rewrite_url(item: &mut Value, media_origin: &str) {
    let Some(Value::String(url)) = item.get_mut("url") else {
        return;
    };
    *url = resolve_media_url(Some(url.as_str()), media_origin);
}
