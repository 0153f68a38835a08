pub mod controllers;
pub mod filters;
pub mod mapping;
