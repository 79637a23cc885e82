//! Small self-contained building blocks shared by the header and origin code.

mod sorted_set;
mod token;

pub use sorted_set::SortedSet;
pub use token::is_token;
