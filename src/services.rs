pub mod constraints;
pub mod notes;
pub mod objectives;
pub mod planning;
pub mod reset;
pub mod tasks;
