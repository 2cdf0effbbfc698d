use sqlx::FromRow;

/// Database model for section images
///
/// `img_des` is unset at creation and may be filled in later; `img_src` and
/// the owning section never change after creation.
#[derive(Debug, Clone, FromRow)]
pub struct Image {
    pub id: i32,
    pub img_src: String,
    pub img_des: Option<String>,
    pub section_id: i32,
}

/// Insert payload for an image row
#[derive(Debug, Clone)]
pub struct NewImage {
    pub img_src: String,
    pub section_id: i32,
}
