pub mod dashboard;
pub mod form;
pub mod loading;
pub mod login;
pub mod reports;
