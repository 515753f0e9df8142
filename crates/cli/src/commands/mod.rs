pub mod run;
pub mod sessions;
