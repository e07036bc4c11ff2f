mod card;
mod registers;

#[cfg(test)]
pub(crate) mod mock;

pub use card::{BusyPolicy, Card};
