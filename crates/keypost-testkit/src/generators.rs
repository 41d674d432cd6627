//! Proptest generators for property-based testing.

use proptest::prelude::*;

use keypost_core::{KeyId, Keypair, PublicKey, Record, RecordBuilder};

/// Generate a random keypair.
pub fn keypair() -> impl Strategy<Value = Keypair> {
    any::<[u8; 32]>().prop_map(|seed| Keypair::from_seed(&seed))
}

/// Generate a random public key.
pub fn public_key() -> impl Strategy<Value = PublicKey> {
    keypair().prop_map(|kp| kp.public_key())
}

/// Generate a random key ID.
pub fn key_id() -> impl Strategy<Value = KeyId> {
    public_key().prop_map(|pk| KeyId::from_public_key(&pk))
}

/// Generate a target value of specified max length.
pub fn value(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..=max_len)
}

/// Generate a reasonable expiry timestamp.
pub fn expires_at() -> impl Strategy<Value = i64> {
    0i64..=i64::MAX / 2
}

/// Parameters for generating a signed record.
#[derive(Debug, Clone)]
pub struct RecordParams {
    pub keypair: Keypair,
    pub value: Vec<u8>,
    pub prev: Option<(Vec<u8>, u64)>,
    pub expires_at: i64,
    pub embed_public_key: bool,
}

impl Arbitrary for RecordParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (
            any::<[u8; 32]>(), // seed
            value(1000),
            prop::option::of((value(1000), 0u64..=1000u64)),
            0i64..=1_700_000_000_000i64,
            any::<bool>(),
        )
            .prop_map(|(seed, value, prev, expires_at, embed)| RecordParams {
                keypair: Keypair::from_seed(&seed),
                value,
                prev,
                expires_at,
                embed_public_key: embed,
            })
            .boxed()
    }
}

/// Generate a signed record from parameters.
pub fn record_from_params(params: &RecordParams) -> Record {
    let mut builder = RecordBuilder::new(params.value.clone()).expires_at(params.expires_at);

    if let Some((prev_value, prev_seq)) = &params.prev {
        // Synthesize the previous record the builder would have seen.
        let prev = RecordBuilder::new(prev_value.clone())
            .expires_at(params.expires_at)
            .sign(&params.keypair);
        let prev = Record {
            sequence: *prev_seq,
            ..prev
        };
        builder = builder.prev(&prev);
    }

    if params.embed_public_key {
        builder = builder.embed_public_key();
    }

    builder.sign(&params.keypair)
}
