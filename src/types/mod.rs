pub mod observation;
pub mod parameter;
pub mod station;
