//! sea-orm entities for the sentibot schema.

pub mod messages;
pub mod sessions;
