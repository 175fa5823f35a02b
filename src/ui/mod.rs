/// UI module exports
pub mod components;
pub mod forms;
pub mod options;
pub mod popup;
