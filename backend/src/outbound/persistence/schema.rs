//! Diesel schema definition for the campus profile store.

diesel::table! {
    /// Campus user profiles.
    ///
    /// One row per identity-provider subject; `user_id` carries the subject
    /// UUID and is unique. Credentials never live here.
    profiles (id) {
        /// Primary key: UUID v4 row identifier.
        id -> Uuid,
        /// Identity-provider subject this profile belongs to (unique).
        user_id -> Uuid,
        /// Given name.
        first_name -> Varchar,
        /// Family name.
        last_name -> Varchar,
        /// Campus role: student, faculty, or administrator.
        role -> Varchar,
        /// Department or school, where applicable.
        department -> Nullable<Varchar>,
        /// Student registration number.
        student_id -> Nullable<Varchar>,
        /// Staff registration number.
        faculty_id -> Nullable<Varchar>,
        /// Free-form biography.
        bio -> Nullable<Text>,
        /// Avatar image location.
        avatar_url -> Nullable<Text>,
        /// Interface language code: ar, fr, or en.
        language_preference -> Varchar,
        /// False once the user has been soft-deleted.
        is_active -> Bool,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}
