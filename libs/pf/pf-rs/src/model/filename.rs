use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
    Heic,
    Webp,
    Raw,
    Other,
}

// todo: be more exhaustive with camera raw extensions
impl ImageFormat {
    pub fn from_file_name(name: &str) -> ImageFormat {
        let Some((_, extension)) = name.rsplit_once('.') else {
            return ImageFormat::Other;
        };
        match extension.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => ImageFormat::Jpeg,
            "png" => ImageFormat::Png,
            "heic" | "heif" => ImageFormat::Heic,
            "webp" => ImageFormat::Webp,
            "dng" | "nef" | "cr2" | "cr3" | "arw" | "raf" | "orf" | "rw2" => ImageFormat::Raw,
            _ => ImageFormat::Other,
        }
    }

    pub fn from_mime_type(mime_type: &str) -> ImageFormat {
        match mime_type {
            "image/jpeg" => ImageFormat::Jpeg,
            "image/png" => ImageFormat::Png,
            "image/heic" | "image/heif" => ImageFormat::Heic,
            "image/webp" => ImageFormat::Webp,
            "image/x-adobe-dng" | "image/x-nikon-nef" | "image/x-canon-cr2" => ImageFormat::Raw,
            _ => ImageFormat::Other,
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Png => "image/png",
            ImageFormat::Heic => "image/heic",
            ImageFormat::Webp => "image/webp",
            ImageFormat::Raw => "image/x-adobe-dng",
            ImageFormat::Other => "application/octet-stream",
        }
    }
}

/// A file name split as `<stem>-<variant>.<extension>`, used to pick a free
/// name when an export lands two images with the same name in one folder.
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct NameComponents {
    pub stem: String,
    pub variant: Option<usize>,
    pub extension: Option<String>,
}

impl NameComponents {
    pub fn from(file_name: &str) -> NameComponents {
        let (base, extension) = match file_name.rfind('.') {
            Some(dot) if dot + 1 < file_name.len() => {
                (&file_name[..dot], Some(file_name[dot + 1..].to_string()))
            }
            _ => (file_name, None),
        };

        let (stem, variant) = match base.rsplit_once('-') {
            Some((stem, variant)) => match variant.parse::<usize>() {
                Ok(variant) => (stem, Some(variant)),
                Err(_) => (base, None),
            },
            None => (base, None),
        };

        NameComponents { stem: stem.to_string(), variant, extension }
    }

    pub fn generate_next(&self) -> NameComponents {
        let mut next = self.clone();
        next.variant = Some(self.variant.unwrap_or(0) + 1);
        next
    }

    /// Smallest variant of this name not present in `taken`.
    pub fn next_available(&self, taken: &HashSet<String>) -> NameComponents {
        let mut candidate = self.clone();
        while taken.contains(&candidate.to_name()) {
            candidate = candidate.generate_next();
        }
        candidate
    }

    pub fn to_name(&self) -> String {
        match (&self.variant, &self.extension) {
            (Some(variant), Some(extension)) => format!("{}-{}.{}", self.stem, variant, extension),
            (Some(variant), None) => format!("{}-{}", self.stem, variant),
            (None, Some(extension)) => format!("{}.{}", self.stem, extension),
            (None, None) => self.stem.to_string(),
        }
    }
}

/// A drive name made usable as a single local path component.
pub fn sanitize_component(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if matches!(c, '/' | '\\') || c.is_control() { '_' } else { c })
        .collect();
    match cleaned.as_str() {
        "" | "." | ".." => "_".to_string(),
        _ => cleaned,
    }
}

#[cfg(test)]
mod unit_tests {
    use std::collections::HashSet;

    use super::{sanitize_component, ImageFormat, NameComponents};

    fn components(stem: &str, variant: Option<usize>, extension: Option<&str>) -> NameComponents {
        NameComponents {
            stem: stem.to_string(),
            variant,
            extension: extension.map(|s| s.to_string()),
        }
    }

    #[test]
    fn test_name_components() {
        assert_eq!(NameComponents::from("DSC-1.jpg"), components("DSC", Some(1), Some("jpg")));
        assert_eq!(NameComponents::from("DSC-.jpg"), components("DSC-", None, Some("jpg")));
        assert_eq!(NameComponents::from(".jpg"), components("", None, Some("jpg")));
        assert_eq!(NameComponents::from("img."), components("img.", None, None));
        assert_eq!(NameComponents::from("IMG_0001"), components("IMG_0001", None, None));
        assert_eq!(
            NameComponents::from("wedding-day-12.CR2"),
            components("wedding-day", Some(12), Some("CR2"))
        );
    }

    #[test]
    fn test_back_to_name() {
        for name in ["DSC-1.jpg", "DSC-.jpg", ".jpg", "img.", "", "a-b-3", "x.y.z"] {
            assert_eq!(NameComponents::from(name).to_name(), name);
        }
    }

    #[test]
    fn test_next_available() {
        let taken: HashSet<String> =
            ["a.jpg", "a-1.jpg", "a-2.jpg"].iter().map(|s| s.to_string()).collect();
        assert_eq!(NameComponents::from("a.jpg").next_available(&taken).to_name(), "a-3.jpg");
        assert_eq!(NameComponents::from("b.jpg").next_available(&taken).to_name(), "b.jpg");
    }

    #[test]
    fn test_formats() {
        assert_eq!(ImageFormat::from_file_name("x.JPG"), ImageFormat::Jpeg);
        assert_eq!(ImageFormat::from_file_name("x.nef"), ImageFormat::Raw);
        assert_eq!(ImageFormat::from_file_name("README"), ImageFormat::Other);
        assert_eq!(ImageFormat::from_mime_type("image/png"), ImageFormat::Png);
    }

    #[test]
    fn test_sanitize_component() {
        assert_eq!(sanitize_component("Day 1/Ceremony"), "Day 1_Ceremony");
        assert_eq!(sanitize_component(".."), "_");
        assert_eq!(sanitize_component(""), "_");
        assert_eq!(sanitize_component("Reception"), "Reception");
    }
}
