//! Paginate Token - Stateless pagination tokens for Tablewerk
//!
//! A paged query is resumed from an opaque token instead of server-side
//! session state. The token is the encrypted serialization of a [`PageState`]
//! (table, page size, where-conditions): the first page request encodes the
//! state, the client holds the resulting `(cipher_text, iv)` pair, and every
//! subsequent page request decodes it to rebuild an identical query.
//!
//! Serialization is length-prefixed, so condition values may contain any
//! byte sequence and still round-trip. Encryption is ChaCha20-Poly1305 with
//! a fresh random nonce per call; two tokens for the same state are never
//! bit-identical, but both decrypt to the same state. Any alteration of the
//! cipher text or nonce fails closed.

pub mod codec;
pub mod errors;
pub mod state;

pub use codec::{PageToken, TokenCodec};
pub use errors::TokenError;
pub use state::PageState;
