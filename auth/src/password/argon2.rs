use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::rand_core::RngCore;
use argon2::Algorithm;
use argon2::Argon2;
use argon2::Params;
use argon2::Version;
use base64::engine::general_purpose::STANDARD_NO_PAD;
use base64::Engine;
use subtle::ConstantTimeEq;

use super::errors::PasswordError;

/// Memory cost in KiB (64 MiB).
const MEMORY_COST: u32 = 64 * 1024;
/// Largest memory cost accepted from a stored hash, in KiB (1 GiB).
const MAX_MEMORY_COST: u32 = 1024 * 1024;
const TIME_COST: u32 = 1;
const PARALLELISM: u32 = 4;
const DIGEST_LENGTH: usize = 32;
const SALT_LENGTH: usize = 16;

/// Password hashing implementation.
///
/// Produces self-describing encoded hashes of the form
/// `$argon2id$v=19$m=65536,t=1,p=4$<salt>$<digest>` and verifies hashes in the
/// same format, re-deriving every cost parameter from the encoded string so
/// that hashes produced by other tooling (or with other costs) still verify.
pub struct PasswordHasher;

/// Decoded form of an encoded hash string.
struct EncodedHash {
    algorithm: Algorithm,
    memory: u32,
    time: u32,
    threads: u32,
    salt: Vec<u8>,
    digest: Vec<u8>,
}

impl PasswordHasher {
    /// Create a new password hasher instance.
    pub fn new() -> Self {
        Self
    }

    /// Hash a plaintext password with argon2id and a random 16-byte salt.
    ///
    /// # Errors
    /// * `HashingFailed` - Parameter construction or hashing failed
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let mut salt = [0u8; SALT_LENGTH];
        OsRng.fill_bytes(&mut salt);

        let params = Params::new(MEMORY_COST, TIME_COST, PARALLELISM, Some(DIGEST_LENGTH))
            .map_err(|e| PasswordError::HashingFailed(e.to_string()))?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        let mut digest = [0u8; DIGEST_LENGTH];
        argon2
            .hash_password_into(password.as_bytes(), &salt, &mut digest)
            .map_err(|e| PasswordError::HashingFailed(e.to_string()))?;

        Ok(format!(
            "${}$v={}$m={},t={},p={}${}${}",
            Algorithm::Argon2id.as_str(),
            Version::V0x13 as u32,
            MEMORY_COST,
            TIME_COST,
            PARALLELISM,
            STANDARD_NO_PAD.encode(salt),
            STANDARD_NO_PAD.encode(digest),
        ))
    }

    /// Verify a password against an encoded hash.
    ///
    /// # Returns
    /// `Ok(true)` if the password matches, `Ok(false)` if it does not.
    ///
    /// # Errors
    /// Any structural problem with the encoded hash (field count, variant,
    /// version, parameters, base64) is an error; it never yields `Ok(true)`.
    pub fn verify(&self, password: &str, encoded: &str) -> Result<bool, PasswordError> {
        let decoded = EncodedHash::parse(encoded)?;

        let params = Params::new(
            decoded.memory,
            decoded.time,
            decoded.threads,
            Some(decoded.digest.len()),
        )
        .map_err(|e| PasswordError::InvalidParameters(e.to_string()))?;
        let argon2 = Argon2::new(decoded.algorithm, Version::V0x13, params);

        let mut computed = vec![0u8; decoded.digest.len()];
        argon2
            .hash_password_into(password.as_bytes(), &decoded.salt, &mut computed)
            .map_err(|e| PasswordError::VerificationFailed(e.to_string()))?;

        Ok(computed.ct_eq(&decoded.digest).into())
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl EncodedHash {
    fn parse(encoded: &str) -> Result<Self, PasswordError> {
        let fields: Vec<&str> = encoded.split('$').collect();
        if fields.len() != 6 {
            return Err(PasswordError::MalformedHash(format!(
                "expected 6 fields, got {}",
                fields.len()
            )));
        }
        if !fields[0].is_empty() {
            return Err(PasswordError::MalformedHash(
                "hash must start with '$'".to_string(),
            ));
        }

        let algorithm = match fields[1] {
            "argon2id" => Algorithm::Argon2id,
            "argon2i" => Algorithm::Argon2i,
            other => return Err(PasswordError::UnsupportedVariant(other.to_string())),
        };

        let version = fields[2]
            .strip_prefix("v=")
            .and_then(|v| v.parse::<u32>().ok())
            .ok_or_else(|| PasswordError::MalformedHash(format!("bad version field '{}'", fields[2])))?;
        if version != Version::V0x13 as u32 {
            return Err(PasswordError::IncompatibleVersion(version.to_string()));
        }

        let (memory, time, threads) = parse_parameters(fields[3])?;
        let salt = decode_base64(fields[4])?;
        let digest = decode_base64(fields[5])?;
        if digest.is_empty() {
            return Err(PasswordError::InvalidEncoding("empty digest".to_string()));
        }

        Ok(Self {
            algorithm,
            memory,
            time,
            threads,
            salt,
            digest,
        })
    }
}

/// Parse `m=<memory>,t=<time>,p=<threads>`; every value must be positive.
fn parse_parameters(field: &str) -> Result<(u32, u32, u32), PasswordError> {
    let values: Vec<&str> = field.split(',').collect();
    let [memory, time, threads] = values.as_slice() else {
        return Err(PasswordError::InvalidParameters(format!(
            "expected m,t,p in '{}'",
            field
        )));
    };

    let memory = parse_parameter(memory, "m")?;
    if memory > MAX_MEMORY_COST {
        return Err(PasswordError::InvalidParameters(format!(
            "m exceeds {} KiB, got {}",
            MAX_MEMORY_COST, memory
        )));
    }

    Ok((
        memory,
        parse_parameter(time, "t")?,
        parse_parameter(threads, "p")?,
    ))
}

fn parse_parameter(pair: &str, key: &str) -> Result<u32, PasswordError> {
    let raw = pair
        .strip_prefix(key)
        .and_then(|rest| rest.strip_prefix('='))
        .ok_or_else(|| PasswordError::InvalidParameters(format!("expected '{}=' in '{}'", key, pair)))?;

    let value: i64 = raw
        .parse()
        .map_err(|_| PasswordError::InvalidParameters(format!("'{}' is not a number", raw)))?;
    if value <= 0 {
        return Err(PasswordError::InvalidParameters(format!(
            "{} must be positive, got {}",
            key, value
        )));
    }

    u32::try_from(value)
        .map_err(|_| PasswordError::InvalidParameters(format!("{} out of range: {}", key, value)))
}

/// Decode standard base64, with or without trailing padding.
fn decode_base64(value: &str) -> Result<Vec<u8>, PasswordError> {
    STANDARD_NO_PAD
        .decode(value.trim_end_matches('='))
        .map_err(|e| PasswordError::InvalidEncoding(e.to_string()))
}

#[cfg(test)]
mod tests {
    use base64::engine::general_purpose::STANDARD;

    use super::*;

    /// Encode a cheap hash with explicit parameters, as external tooling would.
    fn encode_with(algorithm: Algorithm, password: &str, padded: bool) -> String {
        let salt = b"0123456789abcdef";
        let params = Params::new(64, 2, 1, Some(24)).unwrap();
        let mut digest = [0u8; 24];
        Argon2::new(algorithm, Version::V0x13, params)
            .hash_password_into(password.as_bytes(), salt, &mut digest)
            .unwrap();

        let engine = if padded { &STANDARD } else { &STANDARD_NO_PAD };
        format!(
            "${}$v=19$m=64,t=2,p=1${}${}",
            algorithm.as_str(),
            engine.encode(salt),
            engine.encode(digest)
        )
    }

    #[test]
    fn test_hash_and_verify() {
        let hasher = PasswordHasher::new();
        let hash = hasher.hash("my_secure_password").expect("Failed to hash password");

        assert!(hasher
            .verify("my_secure_password", &hash)
            .expect("Failed to verify password"));
        assert!(!hasher
            .verify("wrong_password", &hash)
            .expect("Failed to verify password"));
    }

    #[test]
    fn test_hash_format() {
        let hash = PasswordHasher::new().hash("password123").unwrap();
        let fields: Vec<&str> = hash.split('$').collect();

        assert_eq!(fields.len(), 6);
        assert_eq!(fields[1], "argon2id");
        assert_eq!(fields[2], "v=19");
        assert_eq!(fields[3], "m=65536,t=1,p=4");
        assert!(!fields[4].ends_with('='));
        assert_eq!(STANDARD_NO_PAD.decode(fields[4]).unwrap().len(), 16);
        assert_eq!(STANDARD_NO_PAD.decode(fields[5]).unwrap().len(), 32);
    }

    #[test]
    fn test_verify_uses_encoded_parameters() {
        let hasher = PasswordHasher::new();
        let hash = encode_with(Algorithm::Argon2id, "external", false);

        assert!(hasher.verify("external", &hash).unwrap());
        assert!(!hasher.verify("internal", &hash).unwrap());
    }

    #[test]
    fn test_verify_argon2i_with_padded_base64() {
        let hasher = PasswordHasher::new();
        let hash = encode_with(Algorithm::Argon2i, "legacy-pass", true);
        assert!(hash.contains('='));

        assert!(hasher.verify("legacy-pass", &hash).unwrap());
    }

    #[test]
    fn test_verify_rejects_wrong_field_count() {
        let hasher = PasswordHasher::new();
        let result = hasher.verify("password", "$argon2id$v=19$m=64,t=2,p=1$c2FsdHNhbHQ");
        assert!(matches!(result, Err(PasswordError::MalformedHash(_))));

        let result = hasher.verify("password", "invalid_hash");
        assert!(matches!(result, Err(PasswordError::MalformedHash(_))));
    }

    #[test]
    fn test_verify_rejects_leading_field() {
        let hash = encode_with(Algorithm::Argon2id, "password", false);
        let result = PasswordHasher::new().verify("password", &format!("x{}", hash));
        assert!(matches!(result, Err(PasswordError::MalformedHash(_))));
    }

    #[test]
    fn test_verify_rejects_unsupported_variant() {
        let hash = encode_with(Algorithm::Argon2id, "password", false).replacen("argon2id", "argon2d", 1);
        let result = PasswordHasher::new().verify("password", &hash);
        assert!(matches!(result, Err(PasswordError::UnsupportedVariant(_))));
    }

    #[test]
    fn test_verify_rejects_version_mismatch() {
        let hash = encode_with(Algorithm::Argon2id, "password", false).replacen("v=19", "v=16", 1);
        let result = PasswordHasher::new().verify("password", &hash);
        assert!(matches!(result, Err(PasswordError::IncompatibleVersion(_))));
    }

    #[test]
    fn test_verify_rejects_non_positive_parameters() {
        let hasher = PasswordHasher::new();
        let base = encode_with(Algorithm::Argon2id, "password", false);

        for bad in ["m=0,t=2,p=1", "m=64,t=-1,p=1", "m=64,t=2,p=0"] {
            let hash = base.replacen("m=64,t=2,p=1", bad, 1);
            let result = hasher.verify("password", &hash);
            assert!(
                matches!(result, Err(PasswordError::InvalidParameters(_))),
                "expected rejection for {}",
                bad
            );
        }
    }

    #[test]
    fn test_verify_rejects_excessive_memory_cost() {
        let base = encode_with(Algorithm::Argon2id, "password", false);

        for bad in ["m=4294967295,t=2,p=1", "m=1048577,t=2,p=1"] {
            let hash = base.replacen("m=64,t=2,p=1", bad, 1);
            let result = PasswordHasher::new().verify("password", &hash);
            assert!(
                matches!(result, Err(PasswordError::InvalidParameters(_))),
                "expected rejection for {}",
                bad
            );
        }
    }

    #[test]
    fn test_verify_rejects_malformed_parameters() {
        let hash = encode_with(Algorithm::Argon2id, "password", false).replacen("m=64,t=2,p=1", "m=64;t=2", 1);
        let result = PasswordHasher::new().verify("password", &hash);
        assert!(matches!(result, Err(PasswordError::InvalidParameters(_))));
    }

    #[test]
    fn test_verify_rejects_bad_base64() {
        let hash = encode_with(Algorithm::Argon2id, "password", false);
        let fields: Vec<&str> = hash.split('$').collect();
        let broken = format!("${}${}${}$!!not-base64!!${}", fields[1], fields[2], fields[3], fields[5]);

        let result = PasswordHasher::new().verify("password", &broken);
        assert!(matches!(result, Err(PasswordError::InvalidEncoding(_))));
    }
}
