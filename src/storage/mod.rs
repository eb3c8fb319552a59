pub mod supabase;
pub mod traits;

use uuid::Uuid;

pub use supabase::SupabaseStore;
pub use traits::ArtifactStore;

/// Logical folder all generated artifacts live under.
pub const GENERATED_PREFIX: &str = "generated";

pub fn extension_for(mime_type: &str) -> &'static str {
    match mime_type.trim().to_ascii_lowercase().as_str() {
        "image/jpeg" | "image/jpg" => "jpg",
        "image/webp" => "webp",
        "image/gif" => "gif",
        _ => "png",
    }
}

/// Fresh object path `generated/<uuid>.<ext>`. Collisions are not checked for.
pub fn object_path(mime_type: &str) -> String {
    format!(
        "{}/{}.{}",
        GENERATED_PREFIX,
        Uuid::new_v4(),
        extension_for(mime_type)
    )
}
