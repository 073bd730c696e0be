//! The Project → Company → Stage resource hierarchy.

pub mod companies;
pub mod handlers;
pub mod payload;
pub mod projects;
pub mod stages;
