/// Identity of a participant (or of the local end of a pipe). The referee is
/// always [`REFEREE_ID`].
pub type Identity = u32;
/// Identity of a token, unique within one authoritative id-space.
pub type TokenId = u64;
/// Per-origin monotonic sequence number stamped on every packet.
pub type Ticker = u64;
/// Wire discriminator of a registered message kind, token kind, or letter.
pub type Flavor = u16;

/// Identity reserved for the authoritative referee.
pub const REFEREE_ID: Identity = 0;
/// Id of the root token, which every world registers on construction.
pub const ROOT_TOKEN_ID: TokenId = 0;
