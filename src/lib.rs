pub mod chat;
pub mod command;
pub mod config;
pub mod console;
pub mod driver;
pub mod jira;
pub mod openai;
pub mod pipeline;
pub mod prompts;
pub mod selection;
pub mod stage;
pub mod store;
pub mod ticket;
pub mod tools;
pub mod util;
