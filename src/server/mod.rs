pub mod app;
pub mod deserializers;
pub mod routes;
