mod projects;

pub use projects::{
    built_in_projects, custom_project_id, filter_by_category, search, select_random, Category,
    Project,
};
