/// Derives the short identifier for a byte sequence.
///
/// Deterministic by design: the same input always yields the same id, so
/// re-submitting a URL reproduces its existing short link instead of
/// minting a new one.
pub fn encode<T: AsRef<[u8]>>(bytes: T) -> String {
    bs58::encode(bytes).into_string()
}
