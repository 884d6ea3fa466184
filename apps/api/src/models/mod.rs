// Row types mapped straight off the upstream store's tables.
// The schema is owned by the ingestion pipeline; everything here is read-only.

pub mod resume;
pub mod skill;
pub mod user;
