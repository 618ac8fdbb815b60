pub mod content;
pub mod output;
pub mod search;
