//! CSV bulk import and export for a whole project subtree.

pub mod dates;
pub mod export;
pub mod handlers;
pub mod import;
