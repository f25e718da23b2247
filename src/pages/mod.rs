mod about;
mod projects;
mod spin;

pub use about::About;
pub use projects::Projects;
pub use spin::Spin;
