pub mod assistant;
pub mod conversation;
pub mod document;
pub mod history;
pub mod shell;

#[cfg(test)]
pub mod test_helpers;
