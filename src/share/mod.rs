pub mod query;

pub use query::{
    decode_state_from_query, encode_state_to_query, restore_or_default, share_url, SharedQuery,
};
