use chrono::Utc;
use uuid::Uuid;

/// Builds an id like `sub_20261018_6f1c...`: kind prefix, UTC date, v4 uuid.
pub fn generate_record_id(prefix: &str) -> String {
    format!(
        "{}_{}_{}",
        prefix,
        Utc::now().format("%Y%m%d"),
        Uuid::new_v4().simple()
    )
}
