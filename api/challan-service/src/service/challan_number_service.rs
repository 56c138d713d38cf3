use uuid::Uuid;

const BASE36: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const RANDOM_SUFFIX_LEN: usize = 4;

/// `ECH-<prefix>-<base36 millis>-<random>`. Uniqueness is probabilistic; callers
/// check the store index and regenerate on collision.
pub fn generate_challan_number(prefix: &str, now_millis: i64) -> String {
    format!(
        "ECH-{}-{}-{}",
        prefix,
        to_base36(now_millis.max(0) as u64),
        random_base36(RANDOM_SUFFIX_LEN)
    )
}

pub fn generate_public_token() -> String {
    Uuid::new_v4().simple().to_string()
}

pub fn to_base36(mut n: u64) -> String {
    if n == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while n > 0 {
        digits.push(BASE36[(n % 36) as usize]);
        n /= 36;
    }
    digits.reverse();
    String::from_utf8(digits).unwrap_or_default()
}

fn random_base36(len: usize) -> String {
    Uuid::new_v4()
        .as_bytes()
        .iter()
        .take(len)
        .map(|b| BASE36[(*b as usize) % 36] as char)
        .collect()
}
