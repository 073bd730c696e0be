pub mod company;
pub mod project;
pub mod stage;
