pub mod jql;
pub mod refresh;
pub mod update;

#[cfg(test)]
mod testing;
