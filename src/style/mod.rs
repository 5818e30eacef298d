//! Document styling: the pure rule table and the stylist that applies it.

mod entities;
mod rules;
mod stylist;

pub use rules::StyleSheet;
pub use stylist::Stylist;

pub(crate) use entities::decode_entities;
