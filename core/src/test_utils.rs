use fake::{Fake, Faker};

/// Characters the random values are built from; reserved ones are over-represented
const VALUE_ALPHABET: &[char] = &[
    'a', 'b', 'c', 'x', 'y', 'z', '0', '7', '.', '_', ':', '@', '&', '|', ' ',
    '\\', '+', '-', '!', '(', ')', '{', '}', '[', ']', '^', '"', '~', '*', '?', '/',
];

/// Generates a value of `len` characters that is likely to contain reserved characters
pub fn fake_value(len: usize) -> String {
    (0..len)
        .map(|_| VALUE_ALPHABET[(0..VALUE_ALPHABET.len()).fake::<usize>()])
        .collect()
}

/// Generates a lowercase field name made of ASCII letters
pub fn fake_key() -> String {
    let name: String = Faker.fake();
    let key = name.chars()
                  .filter(|c| c.is_ascii_alphabetic())
                  .take(12)
                  .collect::<String>()
                  .to_ascii_lowercase();

    // "type" is only valid as the leading clause
    if key.is_empty() || key == "type" {
        "field".to_string()
    } else {
        key
    }
}
