use core::num::NonZeroU32;

use serde_json::Value;

use crate::repositories::{Filter, Gravity, ImageFormat};
use crate::utils::LetChain;

pub fn parse_nonzero_num(
    s: &str,
) -> ::core::result::Result<u32, <NonZeroU32 as ::core::str::FromStr>::Err> {
    Ok(s.parse::<::core::num::NonZeroU32>()?.get())
}

/// same shape as the backend's json queries.
pub fn parse_filter(s: &str) -> ::core::result::Result<Filter, String> {
    #[derive(::serde::Deserialize)]
    #[serde(rename_all = "camelCase")]
    enum Method {
        Equal,
        NotEqual,
        Contains,
        Search,
        And,
        Or,
    }
    #[derive(::serde::Deserialize)]
    struct FilterModel {
        method: Method,
        attribute: Option<String>,
        #[serde(default)]
        values: Vec<Value>,
    }

    fn convert(m: FilterModel) -> ::core::result::Result<Filter, String> {
        let FilterModel {
            method,
            attribute,
            values,
        } = m;

        let attribute = || attribute.clone().ok_or_else(|| "`attribute` is required".to_string());

        match method {
            Method::Equal => Filter::Equal(attribute()?, values),
            Method::NotEqual => Filter::NotEqual(attribute()?, values),
            Method::Contains => Filter::Contains(attribute()?, values),
            Method::Search => {
                let term = match values.as_slice() {
                    [Value::String(s)] => s.clone(),
                    _ => return Err("`search` takes exactly one string".to_string()),
                };

                Filter::Search(attribute()?, term)
            },
            Method::And | Method::Or => {
                let nested = values
                    .into_iter()
                    .map(|v| {
                        serde_json::from_value::<FilterModel>(v)
                            .map_err(|e| e.to_string())
                            .and_then(convert)
                    })
                    .collect::<::core::result::Result<Vec<_>, _>>()?;

                match method {
                    Method::And => Filter::And(nested),
                    _ => Filter::Or(nested),
                }
            },
        }
        .let_(Ok)
    }

    // --- parsing json ---

    let model: FilterModel = serde_json::from_str(s).map_err(|e| e.to_string())?;

    // --- converting ---

    convert(model)
}

pub fn parse_gravity(s: &str) -> ::core::result::Result<Gravity, String> {
    let g = match s {
        "center" => Gravity::Center,
        "top-left" => Gravity::TopLeft,
        "top" => Gravity::Top,
        "top-right" => Gravity::TopRight,
        "left" => Gravity::Left,
        "right" => Gravity::Right,
        "bottom-left" => Gravity::BottomLeft,
        "bottom" => Gravity::Bottom,
        "bottom-right" => Gravity::BottomRight,
        s => return Err(format!("unknown gravity: {}", s)),
    };

    Ok(g)
}

pub fn parse_image_format(s: &str) -> ::core::result::Result<ImageFormat, String> {
    let f = match s.to_lowercase().as_str() {
        "jpg" | "jpeg" => ImageFormat::Jpg,
        "png" => ImageFormat::Png,
        "webp" => ImageFormat::Webp,
        "gif" => ImageFormat::Gif,
        s => return Err(format!("unknown image format: {}", s)),
    };

    Ok(f)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn page_must_be_positive() {
        assert_eq!(parse_nonzero_num("3"), Ok(3));
        assert!(parse_nonzero_num("0").is_err());
        assert!(parse_nonzero_num("-1").is_err());
    }

    #[test]
    fn nested_filter() {
        let f = parse_filter(
            r#"{"method":"or","values":[
                {"method":"equal","attribute":"category","values":["rust"]},
                {"method":"search","attribute":"title","values":["tokio"]}
            ]}"#,
        )
        .unwrap();

        assert_eq!(
            f,
            Filter::Or(vec![
                Filter::Equal("category".to_string(), vec![json!("rust")]),
                Filter::Search("title".to_string(), "tokio".to_string()),
            ])
        );
    }

    #[test]
    fn filter_needs_attribute() {
        assert!(parse_filter(r#"{"method":"equal","values":[1]}"#).is_err());
        assert!(parse_filter(r#"{"method":"between","attribute":"a","values":[1, 2]}"#).is_err());
    }

    #[test]
    fn gravity_and_format_names() {
        assert_eq!(parse_gravity("bottom-right"), Ok(Gravity::BottomRight));
        assert_eq!(parse_image_format("JPEG"), Ok(ImageFormat::Jpg));
        assert!(parse_gravity("middle").is_err());
    }
}
