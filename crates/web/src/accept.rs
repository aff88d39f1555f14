//! `Accept` header checking against a response's media type.

use reactor_http::protocol::QList;

/// Whether `content_type` satisfies the request's `Accept` preferences.
///
/// An empty list accepts everything; `*/*` accepts everything; `text/*` and
/// `image/*` accept their whole top-level type. Parameters on the response
/// media type (`;charset=...`) are ignored for the comparison.
pub fn acceptable(accept: &QList, content_type: &str) -> bool {
    if accept.is_empty() {
        return true;
    }

    let essence = content_type.split(';').next().unwrap_or("").trim_ascii();

    let mut text_all = false;
    let mut image_all = false;

    for entry in accept.iter() {
        match entry.value() {
            "*/*" => return true,
            "text/*" => text_all = true,
            "image/*" => image_all = true,
            value if value == essence => return true,
            _ => {}
        }
    }

    if text_all && essence.starts_with("text/") {
        return true;
    }

    if image_all && essence.starts_with("image/") {
        return true;
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(values: &[&str]) -> QList {
        let mut list = QList::new();
        for (i, value) in values.iter().enumerate() {
            list.add(value, 1.0 - (i as f32) * 0.1);
        }
        list
    }

    #[test]
    fn wildcard_accepts_anything() {
        assert!(acceptable(&list(&["*/*"]), "application/json"));
        assert!(acceptable(&QList::new(), "application/json"));
    }

    #[test]
    fn exact_match_is_accepted() {
        assert!(acceptable(&list(&["text/html"]), "text/html;charset=utf-8"));
    }

    #[test]
    fn type_wildcards_cover_their_type() {
        assert!(acceptable(&list(&["text/*"]), "text/css"));
        assert!(acceptable(&list(&["image/*"]), "image/png"));
        assert!(!acceptable(&list(&["image/*"]), "text/css"));
    }

    #[test]
    fn mismatch_is_rejected() {
        assert!(!acceptable(&list(&["application/json"]), "text/html"));
    }
}
