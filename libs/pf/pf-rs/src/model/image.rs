use serde::{Deserialize, Serialize};

use crate::model::filename::ImageFormat;

pub static THUMBNAIL_SERVICE: &str = "https://drive.google.com/thumbnail";

/// One leaf image inside a synced folder, as written by the ingestion pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageObject {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub mime_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    /// Folder names from a local root down to the folder holding this image. Filled in when
    /// images are collected from a subtree, see [crate::model::tree_like::TreeLike::all_images].
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub folder_path_list: Vec<String>,
}

impl ImageObject {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        let name = name.into();
        let mime_type = ImageFormat::from_file_name(&name).mime_type().to_string();
        Self {
            id: id.into(),
            name,
            mime_type,
            thumbnail_link: None,
            modified_time: None,
            src: None,
            folder_path_list: vec![],
        }
    }

    pub fn thumbnail_src(id: &str, width: u32) -> String {
        format!("{THUMBNAIL_SERVICE}?id={id}&sz=w{width}")
    }

    /// The url a viewer should display. Blobs synced before `src` existed lack it, so it is
    /// derived from the id.
    pub fn display_src(&self, width: u32) -> String {
        self.src
            .clone()
            .unwrap_or_else(|| Self::thumbnail_src(&self.id, width))
    }

    pub fn with_derived_src(mut self, width: u32) -> Self {
        if self.src.is_none() {
            self.src = Some(Self::thumbnail_src(&self.id, width));
        }
        self
    }

    pub fn format(&self) -> ImageFormat {
        match ImageFormat::from_mime_type(&self.mime_type) {
            ImageFormat::Other => ImageFormat::from_file_name(&self.name),
            format => format,
        }
    }
}

#[test]
fn derived_src_uses_id_and_width() {
    let image = ImageObject::new("abc123", "DSC_0001.jpg");
    assert_eq!(image.display_src(640), "https://drive.google.com/thumbnail?id=abc123&sz=w640");

    let image = ImageObject { src: Some("https://cdn/x.jpg".into()), ..image };
    assert_eq!(image.clone().with_derived_src(640).src.as_deref(), Some("https://cdn/x.jpg"));
    assert_eq!(image.display_src(640), "https://cdn/x.jpg");
}
