// Sapling schema - local key-value table for Diesel ORM

diesel::table! {
    kv_entries (key) {
        key -> Text,
        value -> Text,
        updated_at -> Text,
    }
}
