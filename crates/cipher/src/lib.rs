//! `netgate-cipher` — reversible block encoding of stored credentials.
//!
//! A symmetric 64-bit block cipher in the TEA family: 32 Feistel-style
//! rounds, golden-ratio round constant, four 32-bit subkeys drawn from a
//! 128-bit key. Plaintext is consumed two characters at a time; each
//! character pair becomes a pair of 32-bit words and every encrypted word is
//! wrapped in freshly randomized decimal padding, so encrypting the same
//! credential twice yields different tokens that decode identically.
//!
//! All round arithmetic is `u32` wrapping. Widening to an arbitrary-precision
//! type without explicit masking silently breaks round-trip correctness.

pub mod error;
pub mod key;

pub use error::CipherError;
pub use key::KeyMaterial;

use rand::Rng;

/// Joins the two halves of one encrypted block.
const WORD_DELIMITER: char = '.';
/// Joins encrypted blocks.
const BLOCK_DELIMITER: char = '|';

const DELTA: u32 = 0x9E37_79B9;
const ROUNDS: u32 = 32;
/// Decryption starts from the forward schedule's final sum: `DELTA * 32`.
const DECRYPT_SUM: u32 = 0xC6EF_3720;

fn rounds_forward(v: (u32, u32), k: [u32; 4]) -> (u32, u32) {
    let (mut y, mut z) = v;
    let mut sum: u32 = 0;
    for _ in 0..ROUNDS {
        sum = sum.wrapping_add(DELTA);
        y = y.wrapping_add(
            (z << 4).wrapping_add(k[0])
                ^ z.wrapping_add(sum)
                ^ (z >> 5).wrapping_add(k[1]),
        );
        z = z.wrapping_add(
            (y << 4).wrapping_add(k[2])
                ^ y.wrapping_add(sum)
                ^ (y >> 5).wrapping_add(k[3]),
        );
    }
    (y, z)
}

fn rounds_inverse(v: (u32, u32), k: [u32; 4]) -> (u32, u32) {
    let (mut y, mut z) = v;
    let mut sum: u32 = DECRYPT_SUM;
    for _ in 0..ROUNDS {
        z = z.wrapping_sub(
            (y << 4).wrapping_add(k[2])
                ^ y.wrapping_add(sum)
                ^ (y >> 5).wrapping_add(k[3]),
        );
        y = y.wrapping_sub(
            (z << 4).wrapping_add(k[0])
                ^ z.wrapping_add(sum)
                ^ (z >> 5).wrapping_add(k[1]),
        );
        sum = sum.wrapping_sub(DELTA);
    }
    (y, z)
}

/// Random decimal padding of exactly `len` digits; empty when `len == 0`.
fn pad_digits(len: usize, rng: &mut impl Rng) -> String {
    (0..len).map(|_| char::from(b'0' + rng.gen_range(0..10u8))).collect()
}

/// Encrypt an even-length plaintext into a padded, delimited token.
pub fn encrypt(plaintext: &str, key: &KeyMaterial) -> Result<String, CipherError> {
    encrypt_with(plaintext, key, &mut rand::thread_rng())
}

/// [`encrypt`] with an injected randomness source.
pub fn encrypt_with(
    plaintext: &str,
    key: &KeyMaterial,
    rng: &mut impl Rng,
) -> Result<String, CipherError> {
    let chars: Vec<char> = plaintext.chars().collect();
    if chars.len() % 2 != 0 {
        return Err(CipherError::invalid_input(
            "plaintext length must be divisible by 2",
        ));
    }
    let mut blocks = Vec::with_capacity(chars.len() / 2);
    for (block, pair) in chars.chunks(2).enumerate() {
        let k = key.subkeys(block);
        let (w0, w1) = rounds_forward((pair[0] as u32, pair[1] as u32), k);
        let first_pad = pad_digits(key.padding(), rng);
        let second_pad = pad_digits(key.padding(), rng);
        blocks.push(format!(
            "{first_pad}{w0}{WORD_DELIMITER}{second_pad}{w1}"
        ));
    }
    Ok(blocks
        .iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(&BLOCK_DELIMITER.to_string()))
}

/// Strip the padding prefix from one token field and parse the word.
fn parse_word(field: &str, padding: usize) -> Result<u32, CipherError> {
    // `get` also rejects offsets inside a multibyte character, so a corrupt
    // document token cannot panic the caller.
    let word = field
        .get(padding..)
        .ok_or_else(|| CipherError::malformed_token("padding does not fit the field"))?;
    word.parse::<u32>()
        .map_err(|_| CipherError::malformed_token("non-numeric word"))
}

/// Decrypt a token produced by [`encrypt`].
pub fn decrypt(token: &str, key: &KeyMaterial) -> Result<String, CipherError> {
    if token.is_empty() {
        return Ok(String::new());
    }
    let mut plaintext = String::new();
    for (block, item) in token.split(BLOCK_DELIMITER).enumerate() {
        let mut fields = item.split(WORD_DELIMITER);
        let (first, second) = match (fields.next(), fields.next(), fields.next()) {
            (Some(a), Some(b), None) => (a, b),
            _ => {
                return Err(CipherError::malformed_token(
                    "block must contain exactly two fields",
                ));
            }
        };
        let w0 = parse_word(first, key.padding())?;
        let w1 = parse_word(second, key.padding())?;
        let k = key.subkeys(block);
        let (c0, c1) = rounds_inverse((w0, w1), k);
        for word in [c0, c1] {
            let c = char::from_u32(word)
                .ok_or_else(|| CipherError::malformed_token("recovered non-character value"))?;
            plaintext.push(c);
        }
    }
    Ok(plaintext)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn key(pad: usize) -> KeyMaterial {
        KeyMaterial::parse(&format!("{pad}:abcdefghijklmnop")).unwrap()
    }

    #[test]
    fn round_trip_without_padding() {
        let k = key(0);
        let token = encrypt("correcthorse", &k).unwrap();
        assert_eq!(decrypt(&token, &k).unwrap(), "correcthorse");
    }

    #[test]
    fn round_trip_with_padding() {
        let k = key(5);
        let token = encrypt("aB09zZ", &k).unwrap();
        assert_eq!(decrypt(&token, &k).unwrap(), "aB09zZ");
    }

    #[test]
    fn encryption_is_randomized_but_decodes_identically() {
        let k = key(6);
        let a = encrypt("secretvalue9", &k).unwrap();
        let b = encrypt("secretvalue9", &k).unwrap();
        // 12 random digits per block; collision here means a broken RNG hookup.
        assert_ne!(a, b);
        assert_eq!(decrypt(&a, &k).unwrap(), decrypt(&b, &k).unwrap());
    }

    #[test]
    fn odd_length_plaintext_is_rejected() {
        let err = encrypt("abc", &key(0)).unwrap_err();
        assert!(matches!(err, CipherError::InvalidInput(_)));
    }

    #[test]
    fn empty_plaintext_round_trips_as_empty_token() {
        let k = key(3);
        let token = encrypt("", &k).unwrap();
        assert_eq!(token, "");
        assert_eq!(decrypt(&token, &k).unwrap(), "");
    }

    #[test]
    fn token_with_wrong_field_count_is_rejected() {
        let k = key(0);
        assert!(matches!(
            decrypt("12345", &k).unwrap_err(),
            CipherError::MalformedToken(_)
        ));
        assert!(matches!(
            decrypt("1.2.3", &k).unwrap_err(),
            CipherError::MalformedToken(_)
        ));
    }

    #[test]
    fn token_with_field_shorter_than_padding_is_rejected() {
        let k = key(8);
        assert!(matches!(
            decrypt("123.456", &k).unwrap_err(),
            CipherError::MalformedToken(_)
        ));
    }

    #[test]
    fn token_with_multibyte_field_is_rejected() {
        // Padding offset lands inside the two-byte 'é'; must error, not panic.
        let k = key(4);
        assert!(matches!(
            decrypt("123é5.123456", &k).unwrap_err(),
            CipherError::MalformedToken(_)
        ));
    }

    #[test]
    fn token_with_non_numeric_word_is_rejected() {
        let k = key(0);
        assert!(matches!(
            decrypt("12x.34", &k).unwrap_err(),
            CipherError::MalformedToken(_)
        ));
    }

    #[test]
    fn long_plaintexts_wrap_the_key_window() {
        // 40 characters: block offsets run past 16 and wrap.
        let k = key(2);
        let plain = "a".repeat(40);
        let token = encrypt(&plain, &k).unwrap();
        assert_eq!(decrypt(&token, &k).unwrap(), plain);
    }

    proptest! {
        #[test]
        fn round_trip_any_even_ascii(
            s in proptest::collection::vec("[ -~]", 0..32usize)
                .prop_map(|v| v.concat())
                .prop_filter("even length", |s| s.chars().count() % 2 == 0),
            pad in 0usize..9,
        ) {
            let k = key(pad);
            let token = encrypt(&s, &k).unwrap();
            prop_assert_eq!(decrypt(&token, &k).unwrap(), s);
        }
    }
}
