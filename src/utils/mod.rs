pub mod validation;

pub use validation::validate_upload;

/// Mint a globally unique identifier for a validated upload.
/// Used as the filesystem key for both the stored image and its result.
pub fn generate_image_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_ids_are_unique() {
        let a = generate_image_id();
        let b = generate_image_id();
        assert_ne!(a, b);
        assert_eq!(a.len(), 36);
    }
}
