//! Theme layer: Tera engine and rendering helpers.

mod engine;

pub use engine::ThemeEngine;

/// Inline style attribute for a background image, or an empty string when
/// there is none.
pub fn background_style(url: Option<&str>) -> String {
    match url {
        Some(url) => format!("style=\"background-image: url({url});\""),
        None => String::new(),
    }
}

#[cfg(test)]
// Tests are allowed to use unwrap/expect freely.
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn background_style_renders_only_with_url() {
        assert_eq!(
            background_style(Some("/img/hero.jpg")),
            "style=\"background-image: url(/img/hero.jpg);\""
        );
        assert_eq!(background_style(None), "");
    }
}
