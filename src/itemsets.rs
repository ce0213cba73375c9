//! Level construction: seeding level 1, counting candidates against the
//! corpus and generating the next level's candidates.

pub mod count;
pub mod search;
pub mod seed;
