//! Catalog input shared between fit_cli and fit_daemon: JSON files, dogma
//! decoding, chat links and seeded random rolls.

mod builder;
mod chat;
pub mod dogma;
mod files;
mod roll;

pub use builder::{AddOutcome, CatalogBuilder};
pub use chat::{parse_chat_links, ChatLink};
pub use dogma::{decode, DecodeError, DogmaAttribute, DogmaItem};
pub use files::{
    load_catalog, load_dogma_items, load_find_request, load_results, load_roll_templates,
    write_json,
};
pub use roll::{make_rng, roll_pool, RollTemplate};
