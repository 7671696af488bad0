//! Session authentication: registration, login/logout and the request
//! guards the rest of the application uses to identify the viewer.

pub mod dtos;
pub mod guards;
pub mod handlers;
pub mod model;
pub mod routes;
pub mod services;
