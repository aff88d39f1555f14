/// Coarse classification of a request body's `Content-Type`.
///
/// Only the media types the engine cares about are distinguished; anything
/// unrecognized (or an absent header) collapses into [`MediaKind::All`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MediaKind {
    #[default]
    All,
    Text,
    Json,
    Xml,
    Form,
    Image,
}

impl MediaKind {
    /// Maps a `Content-Type` value to its kind, ignoring any parameters
    /// after a `;` (charset and friends).
    pub fn parse(value: &[u8]) -> MediaKind {
        let Ok(value) = std::str::from_utf8(value) else {
            return MediaKind::All;
        };

        let essence = value.split(';').next().unwrap_or("").trim_ascii();

        if essence.starts_with("text/") {
            return MediaKind::Text;
        }
        if essence.starts_with("image/") {
            return MediaKind::Image;
        }

        match essence {
            "application/json" => MediaKind::Json,
            "application/xml" => MediaKind::Xml,
            "application/x-www-form-urlencoded" => MediaKind::Form,
            _ => MediaKind::All,
        }
    }
}
