#![forbid(unsafe_code)]

use grievance_contracts::complaint::{ComplaintId, COMPLAINT_ID_LEN};
use rand::Rng;

const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// New tracking code from the thread-local RNG.
///
/// Uniqueness against stored complaints is not checked here; the store
/// rejects duplicate keys and the portal retries.
pub fn generate() -> ComplaintId {
    generate_with(&mut rand::thread_rng())
}

pub fn generate_with<R: Rng + ?Sized>(rng: &mut R) -> ComplaintId {
    let code: String = (0..COMPLAINT_ID_LEN)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect();
    ComplaintId::new(code).expect("generated tracking code must satisfy ComplaintId format")
}
