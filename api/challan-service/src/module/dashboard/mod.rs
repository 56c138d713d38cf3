pub mod controller;
pub mod crud;
pub mod route;
pub mod schema;
