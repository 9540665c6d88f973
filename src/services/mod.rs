pub mod form_controller;
pub mod registry;
pub mod submission;
pub mod validator;
